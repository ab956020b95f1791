//! Level catalogue and unlock progress
//!
//! Persisted through a `ProgressStore` under a single JSON key. Stored
//! progress is merged over the built-in catalogue, so levels added later
//! still show up for existing players.

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::persistence::{ProgressStore, load_json, save_json};
use crate::sim::state::Objective;

/// Storage key for level progress
pub const STORAGE_KEY: &str = "dartdart_levels";

/// What a level asks of the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelKind {
    /// Clear a number of waves
    Waves { target_waves: u32 },
    /// Stay alive for a number of seconds
    Timed { target_seconds: f32 },
    /// Endless; never completes
    Survival,
    /// Boss stage, completed after a number of waves
    Boss { target_waves: u32 },
}

impl LevelKind {
    /// Objective for the simulation, `None` for endless levels
    pub fn objective(self) -> Option<Objective> {
        match self {
            LevelKind::Waves { target_waves } | LevelKind::Boss { target_waves } => {
                Some(Objective::ClearWaves(target_waves))
            }
            LevelKind::Timed { target_seconds } => Some(Objective::Survive(target_seconds)),
            LevelKind::Survival => None,
        }
    }
}

/// A level in the catalogue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelDef {
    pub id: u32,
    pub name: &'static str,
    pub kind: LevelKind,
    pub description: &'static str,
    /// 1 (easy) to 5 (hard)
    pub difficulty: u8,
}

const fn level(id: u32, name: &'static str, kind: LevelKind, description: &'static str, difficulty: u8) -> LevelDef {
    LevelDef {
        id,
        name,
        kind,
        description,
        difficulty,
    }
}

/// Built-in levels, in unlock order
pub const LEVELS: [LevelDef; 10] = [
    level(1, "Level 1", LevelKind::Waves { target_waves: 10 }, "Survive 10 waves", 1),
    level(2, "Level 2", LevelKind::Waves { target_waves: 15 }, "Survive 15 waves", 2),
    level(3, "Level 3", LevelKind::Timed { target_seconds: 180.0 }, "Survive 3 minutes", 2),
    level(4, "Level 4", LevelKind::Waves { target_waves: 20 }, "Survive 20 waves", 3),
    level(5, "Level 5", LevelKind::Boss { target_waves: 5 }, "Defeat the boss", 4),
    level(6, "Level 6", LevelKind::Waves { target_waves: 25 }, "Survive 25 waves", 3),
    level(7, "Level 7", LevelKind::Timed { target_seconds: 300.0 }, "Survive 5 minutes", 4),
    level(8, "Level 8", LevelKind::Survival, "Endless survival", 5),
    level(9, "Level 9", LevelKind::Waves { target_waves: 30 }, "Survive 30 waves", 4),
    level(10, "Level 10", LevelKind::Boss { target_waves: 10 }, "Final boss battle", 5),
];

pub fn level_def(id: u32) -> Option<&'static LevelDef> {
    LEVELS.iter().find(|l| l.id == id)
}

/// Per-level progress (what gets persisted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub id: u32,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub completed: bool,
    /// Best star rating (0-3)
    #[serde(default)]
    pub stars: u8,
}

impl LevelProgress {
    fn initial(def: &LevelDef) -> Self {
        Self {
            id: def.id,
            unlocked: def.id == LEVELS[0].id,
            completed: false,
            stars: 0,
        }
    }
}

/// Tracks unlocks and the level being played
#[derive(Debug, Clone, PartialEq)]
pub struct LevelManager {
    progress: Vec<LevelProgress>,
    current: Option<u32>,
}

impl Default for LevelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelManager {
    /// Fresh progress: only the first level unlocked
    pub fn new() -> Self {
        Self {
            progress: LEVELS.iter().map(LevelProgress::initial).collect(),
            current: None,
        }
    }

    /// Load stored progress, falling back to fresh progress if it is corrupt
    pub fn load(store: &dyn ProgressStore) -> Self {
        match Self::try_load(store) {
            Ok(manager) => manager,
            Err(err) => {
                log::warn!("Failed to load level progress: {err}");
                Self::new()
            }
        }
    }

    pub fn try_load(store: &dyn ProgressStore) -> Result<Self, PersistenceError> {
        let mut manager = Self::new();
        let Some(saved) = load_json::<Vec<LevelProgress>>(store, STORAGE_KEY)? else {
            log::info!("No level progress found, starting fresh");
            return Ok(manager);
        };
        // Unknown ids in storage are dropped
        for entry in &mut manager.progress {
            if let Some(stored) = saved.iter().find(|s| s.id == entry.id) {
                *entry = *stored;
            }
        }
        log::info!(
            "Loaded level progress ({} of {} completed)",
            manager.completed().count(),
            manager.progress.len()
        );
        Ok(manager)
    }

    pub fn save(&self, store: &mut dyn ProgressStore) -> Result<(), PersistenceError> {
        save_json(store, STORAGE_KEY, &self.progress)
    }

    pub fn progress(&self, id: u32) -> Option<&LevelProgress> {
        self.progress.iter().find(|p| p.id == id)
    }

    pub fn is_unlocked(&self, id: u32) -> bool {
        self.progress(id).is_some_and(|p| p.unlocked)
    }

    /// Mark a level completed, keep the best star rating, unlock the next
    /// level, and save. Returns false for unknown ids.
    pub fn complete_level(
        &mut self,
        id: u32,
        stars: u8,
        store: &mut dyn ProgressStore,
    ) -> Result<bool, PersistenceError> {
        let Some(entry) = self.progress.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        entry.completed = true;
        entry.stars = entry.stars.max(stars);

        if let Some(next) = self.progress.iter_mut().find(|p| p.id == id + 1) {
            next.unlocked = true;
        }
        log::info!("Level {id} completed with {stars} stars");
        self.save(store)?;
        Ok(true)
    }

    pub fn reset(&mut self, store: &mut dyn ProgressStore) -> Result<(), PersistenceError> {
        self.progress = LEVELS.iter().map(LevelProgress::initial).collect();
        self.current = None;
        self.save(store)
    }

    /// Select the level to play. Locked or unknown levels are refused.
    pub fn set_current(&mut self, id: u32) -> Option<&'static LevelDef> {
        if !self.is_unlocked(id) {
            return None;
        }
        let def = level_def(id)?;
        self.current = Some(id);
        Some(def)
    }

    pub fn current(&self) -> Option<&'static LevelDef> {
        self.current.and_then(level_def)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &LevelProgress> {
        self.progress.iter().filter(|p| p.unlocked)
    }

    pub fn completed(&self) -> impl Iterator<Item = &LevelProgress> {
        self.progress.iter().filter(|p| p.completed)
    }
}
