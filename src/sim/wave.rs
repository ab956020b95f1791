//! Wave progression and enemy spawning
//!
//! Each wave has a kill quota. Spawns come in small bursts, capped by the
//! remaining quota and an alive cap, and every spawn is telegraphed for a
//! short time before the enemy materializes.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Arena;
use super::enemy::{EnemyKind, EnemySpawn};
use crate::consts::{SPAWN_ATTEMPTS, SPAWN_CLEARANCE, SPAWN_EDGE_PADDING};
use crate::tuning::WaveTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Counting down the start delay
    Starting,
    /// Spawning bursts
    Active,
    /// Whole quota scheduled; waiting for the last kills
    AwaitingClear,
}

/// A telegraphed spawn that has not materialized yet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingSpawn {
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Seconds until the enemy appears
    pub remaining: f32,
}

/// Drives wave pacing. Owned by `GameState`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    pub tuning: WaveTuning,
    /// Current wave (1-based; 0 before the first wave)
    pub index: u32,
    /// Kill quota for the current wave
    pub total_enemies: u32,
    /// Spawns queued so far (telegraphed or materialized)
    pub scheduled: u32,
    /// Enemies that have materialized
    pub spawned: u32,
    pub kills: u32,
    pub spawn_cooldown: f32,
    pub start_delay: f32,
    pub phase: WavePhase,
    pending: Vec<PendingSpawn>,
}

impl WaveDirector {
    pub fn new(tuning: WaveTuning) -> Self {
        Self {
            tuning,
            index: 0,
            total_enemies: 0,
            scheduled: 0,
            spawned: 0,
            kills: 0,
            spawn_cooldown: 0.0,
            start_delay: 0.0,
            phase: WavePhase::Starting,
            pending: Vec::new(),
        }
    }

    /// Advance to the next wave, dropping any telegraphs still pending
    pub fn start_next(&mut self) {
        self.index += 1;
        self.total_enemies = self.quota_for(self.index);
        self.scheduled = 0;
        self.spawned = 0;
        self.kills = 0;
        self.spawn_cooldown = 0.0;
        self.start_delay = self.tuning.start_delay;
        self.phase = WavePhase::Starting;
        self.pending.clear();
        log::info!("Wave {} starting (quota {})", self.index, self.total_enemies);
    }

    /// Back to the state before wave 1
    pub fn reset(&mut self) {
        *self = Self::new(self.tuning.clone());
    }

    pub fn quota_for(&self, wave: u32) -> u32 {
        self.tuning.base_quota + wave.saturating_sub(1) * self.tuning.quota_per_wave
    }

    pub fn cooldown_for(&self, wave: u32) -> f32 {
        (self.tuning.base_spawn_cooldown - self.tuning.spawn_cooldown_per_wave * wave as f32)
            .max(self.tuning.min_spawn_cooldown)
    }

    pub fn alive_cap_for(&self, wave: u32) -> u32 {
        (self.tuning.base_alive_cap + wave / 2).min(self.tuning.max_alive_cap)
    }

    pub fn pending(&self) -> &[PendingSpawn] {
        &self.pending
    }

    pub fn is_cleared(&self) -> bool {
        self.kills >= self.total_enemies && self.spawned >= self.total_enemies
    }

    /// Advance telegraphs and spawn pacing.
    ///
    /// `alive` is the number of living enemies; materialized spawns are
    /// pushed to `out`.
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        rng: &mut R,
        arena: &Arena,
        alive: usize,
        out: &mut Vec<EnemySpawn>,
    ) {
        let before = out.len();
        self.advance_telegraphs(dt, out);
        let materialized = out.len() - before;

        match self.phase {
            WavePhase::Starting => {
                self.start_delay -= dt;
                if self.start_delay <= 0.0 {
                    self.phase = WavePhase::Active;
                    self.spawn_cooldown = 0.0;
                }
            }
            WavePhase::Active => {
                self.spawn_cooldown -= dt;
                if self.spawn_cooldown > 0.0 {
                    return;
                }
                let cap = self.alive_cap_for(self.index) as usize;
                let occupied = alive + materialized + self.pending.len();
                let room = cap.saturating_sub(occupied) as u32;
                if room == 0 {
                    return;
                }
                let remaining = self.total_enemies.saturating_sub(self.scheduled);
                let burst = rng
                    .random_range(1..=self.tuning.max_burst.max(1))
                    .min(remaining)
                    .min(room);

                for _ in 0..burst {
                    let kind = select_kind(self.index, rng.random::<f32>());
                    let pos = edge_spawn_point(arena, rng);
                    log::debug!("Telegraphing {kind:?} at ({:.0}, {:.0})", pos.x, pos.y);
                    self.pending.push(PendingSpawn {
                        kind,
                        pos,
                        remaining: self.tuning.telegraph_time,
                    });
                }
                self.scheduled += burst;
                self.spawn_cooldown = self.cooldown_for(self.index);
                if self.scheduled >= self.total_enemies {
                    self.phase = WavePhase::AwaitingClear;
                }
            }
            WavePhase::AwaitingClear => {}
        }
    }

    fn advance_telegraphs(&mut self, dt: f32, out: &mut Vec<EnemySpawn>) {
        let mut i = 0;
        while i < self.pending.len() {
            self.pending[i].remaining -= dt;
            if self.pending[i].remaining <= 0.0 {
                let spawn = self.pending.remove(i);
                out.push(EnemySpawn {
                    kind: spawn.kind,
                    pos: spawn.pos,
                });
                self.spawned += 1;
            } else {
                i += 1;
            }
        }
    }

    /// Record a quota kill. Returns the cleared wave's index when this kill
    /// finishes it; the director has then already moved on to the next wave.
    pub fn on_enemy_killed(&mut self) -> Option<u32> {
        self.kills += 1;
        if self.is_cleared() {
            let cleared = self.index;
            log::info!("Wave {cleared} cleared");
            self.start_next();
            return Some(cleared);
        }
        None
    }
}

/// Enemy kind for a wave from a single roll in [0, 1)
pub fn select_kind(wave: u32, roll: f32) -> EnemyKind {
    if wave >= 5 && roll < 0.15 {
        EnemyKind::Tank
    } else if wave >= 3 && roll < 0.35 {
        EnemyKind::Fast
    } else if wave >= 4 && roll < 0.55 {
        EnemyKind::Splitter { is_split: false }
    } else {
        EnemyKind::Basic
    }
}

/// Random point along a padded arena edge, avoiding obstacles when possible
pub fn edge_spawn_point<R: Rng>(arena: &Arena, rng: &mut R) -> Vec2 {
    let pad = SPAWN_EDGE_PADDING;
    let along = |rng: &mut R, len: f32| {
        if len > pad * 2.0 {
            rng.random_range(pad..len - pad)
        } else {
            len / 2.0
        }
    };

    let mut pos = arena.center();
    for _ in 0..SPAWN_ATTEMPTS {
        pos = match rng.random_range(0..4) {
            0 => Vec2::new(along(rng, arena.width), pad),
            1 => Vec2::new(arena.width - pad, along(rng, arena.height)),
            2 => Vec2::new(along(rng, arena.width), arena.height - pad),
            _ => Vec2::new(pad, along(rng, arena.height)),
        };
        if !arena.collides(pos, SPAWN_CLEARANCE) {
            return pos;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::Obstacle;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn director() -> WaveDirector {
        let mut d = WaveDirector::new(WaveTuning::default());
        d.start_next();
        d
    }

    /// Run the director until `count` enemies have materialized
    fn spawn_all(d: &mut WaveDirector, rng: &mut Pcg32, arena: &Arena) -> Vec<EnemySpawn> {
        let mut out = Vec::new();
        for _ in 0..10_000 {
            if d.spawned >= d.total_enemies {
                break;
            }
            // Nothing alive: kills are tracked separately
            d.update(1.0 / 60.0, rng, arena, 0, &mut out);
        }
        out
    }

    #[test]
    fn test_wave_formulas() {
        let d = director();
        assert_eq!(d.index, 1);
        assert_eq!(d.quota_for(1), 6);
        assert_eq!(d.quota_for(3), 12);
        assert_eq!(d.alive_cap_for(1), 3);
        assert_eq!(d.alive_cap_for(4), 5);
        assert_eq!(d.alive_cap_for(40), 10);
        assert!((d.cooldown_for(1) - 1.52).abs() < 1e-5);
        assert_eq!(d.cooldown_for(20), 0.5);
    }

    #[test]
    fn test_select_kind_thresholds() {
        assert_eq!(select_kind(1, 0.0), EnemyKind::Basic);
        assert_eq!(select_kind(3, 0.1), EnemyKind::Fast);
        assert_eq!(select_kind(3, 0.5), EnemyKind::Basic);
        assert_eq!(select_kind(4, 0.5), EnemyKind::Splitter { is_split: false });
        assert_eq!(select_kind(5, 0.1), EnemyKind::Tank);
        assert_eq!(select_kind(5, 0.2), EnemyKind::Fast);
        assert_eq!(select_kind(5, 0.9), EnemyKind::Basic);
    }

    #[test]
    fn test_start_delay_then_telegraph() {
        let mut d = director();
        let mut rng = Pcg32::seed_from_u64(5);
        let arena = Arena::new(800.0, 600.0);
        let mut out = Vec::new();

        d.update(0.5, &mut rng, &arena, 0, &mut out);
        assert_eq!(d.phase, WavePhase::Starting);
        d.update(0.5, &mut rng, &arena, 0, &mut out);
        assert_eq!(d.phase, WavePhase::Active);
        assert!(d.pending().is_empty());

        d.update(1.0 / 60.0, &mut rng, &arena, 0, &mut out);
        let queued = d.pending().len();
        assert!((1..=2).contains(&queued));
        assert!(out.is_empty());
        assert_eq!(d.scheduled, queued as u32);

        d.update(0.76, &mut rng, &arena, 0, &mut out);
        assert_eq!(out.len(), queued);
        assert_eq!(d.spawned, queued as u32);
    }

    #[test]
    fn test_alive_cap_blocks_bursts() {
        let mut d = director();
        let mut rng = Pcg32::seed_from_u64(5);
        let arena = Arena::new(800.0, 600.0);
        let mut out = Vec::new();
        d.phase = WavePhase::Active;
        for _ in 0..600 {
            d.update(1.0 / 60.0, &mut rng, &arena, 3, &mut out);
        }
        assert_eq!(d.scheduled, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_quota_eight_advances_only_on_eighth_kill() {
        let mut d = WaveDirector::new(WaveTuning {
            base_quota: 8,
            ..WaveTuning::default()
        });
        d.start_next();
        let mut rng = Pcg32::seed_from_u64(11);
        let arena = Arena::new(800.0, 600.0);
        let spawns = spawn_all(&mut d, &mut rng, &arena);
        assert_eq!(spawns.len(), 8);
        assert_eq!(d.phase, WavePhase::AwaitingClear);

        for _ in 0..7 {
            assert_eq!(d.on_enemy_killed(), None);
        }
        assert_eq!(d.index, 1);
        assert_eq!(d.on_enemy_killed(), Some(1));
        assert_eq!(d.index, 2);
        assert_eq!(d.kills, 0);
        assert_eq!(d.phase, WavePhase::Starting);
    }

    #[test]
    fn test_kills_before_full_spawn_do_not_clear() {
        let mut d = director();
        d.kills = 5;
        d.spawned = 5;
        assert_eq!(d.on_enemy_killed(), None);
        assert_eq!(d.index, 1);
    }

    #[test]
    fn test_clear_cancels_pending() {
        let mut d = director();
        d.pending.push(PendingSpawn {
            kind: EnemyKind::Basic,
            pos: Vec2::ZERO,
            remaining: 0.5,
        });
        d.spawned = d.total_enemies;
        d.kills = d.total_enemies - 1;
        assert!(d.on_enemy_killed().is_some());
        assert!(d.pending().is_empty());
    }

    #[test]
    fn test_reset_cancels_pending() {
        let mut rng = Pcg32::seed_from_u64(4);
        let arena = Arena::new(800.0, 600.0);
        let mut d = director();
        let mut out = Vec::new();
        for _ in 0..600 {
            d.update(1.0 / 60.0, &mut rng, &arena, 0, &mut out);
            if !d.pending().is_empty() {
                break;
            }
        }
        assert!(!d.pending().is_empty());

        d.reset();
        assert!(d.pending().is_empty());
        assert_eq!(d.index, 0);
        out.clear();
        for _ in 0..600 {
            d.update(1.0 / 60.0, &mut rng, &arena, 0, &mut out);
        }
        assert!(out.is_empty());
        assert_eq!(d.spawned, 0);
    }

    #[test]
    fn test_spawn_point_on_padded_edge() {
        let mut rng = Pcg32::seed_from_u64(9);
        let arena = Arena::new(800.0, 600.0);
        for _ in 0..200 {
            let p = edge_spawn_point(&arena, &mut rng);
            let on_edge = p.x == SPAWN_EDGE_PADDING
                || p.x == 800.0 - SPAWN_EDGE_PADDING
                || p.y == SPAWN_EDGE_PADDING
                || p.y == 600.0 - SPAWN_EDGE_PADDING;
            assert!(on_edge);
        }
    }

    #[test]
    fn test_spawn_point_avoids_obstacles() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut arena = Arena::new(800.0, 600.0);
        // Cover the whole top edge
        arena.obstacles.push(Obstacle::new(0.0, 0.0, 800.0, 30.0));
        for _ in 0..20 {
            let p = edge_spawn_point(&arena, &mut rng);
            assert!(!arena.collides(p, SPAWN_CLEARANCE));
        }
    }
}
