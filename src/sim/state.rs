//! Game state and the records the simulation hands to the outside
//!
//! `GameState` owns every collection in the world. Entities only ever see
//! borrowed views of it during a tick.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Arena;
use super::enemy::{Enemy, EnemyKind, EnemySpawn};
use super::layout::{self, Layout};
use super::player::Player;
use super::pool::Projectiles;
use super::upgrade::{Upgrade, generate_offer};
use super::wave::WaveDirector;
use crate::error::UpgradeError;
use crate::tuning::Tuning;

/// Screen shake applied when an enemy dies
pub const DEATH_SHAKE: f32 = 3.0;
/// Screen shake decay (units per second)
pub const SHAKE_DECAY: f32 = 15.0;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Paused by the player
    Paused,
    /// Waiting for `choose_upgrade`; cannot be toggled away
    ChoosingUpgrade,
}

/// Visual effect kinds (not gameplay-affecting)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    Muzzle,
    Impact,
    Death,
    /// Arc from the effect position to `to`
    LightningArc { to: Vec2 },
}

/// A short-lived visual effect record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    /// Seconds left
    pub ttl: f32,
}

impl Effect {
    pub fn muzzle(pos: Vec2) -> Self {
        Self {
            kind: EffectKind::Muzzle,
            pos,
            ttl: 0.08,
        }
    }

    pub fn impact(pos: Vec2) -> Self {
        Self {
            kind: EffectKind::Impact,
            pos,
            ttl: 0.2,
        }
    }

    pub fn death(pos: Vec2) -> Self {
        Self {
            kind: EffectKind::Death,
            pos,
            ttl: 0.4,
        }
    }

    pub fn lightning(from: Vec2, to: Vec2) -> Self {
        Self {
            kind: EffectKind::LightningArc { to },
            pos: from,
            ttl: 0.15,
        }
    }
}

/// Events emitted for audio, UI, and persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32 },
    LevelUp { level: u32 },
    EnemyKilled { id: u32, kind: EnemyKind },
    /// An enemy shot reached the player (hp is not reduced)
    PlayerHit { damage: f32 },
    /// The active objective was reached
    LevelComplete,
    UpgradeApplied(Upgrade),
}

/// Why an upgrade choice was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeReason {
    LevelUp,
    WaveCleared,
}

/// The upgrade choice currently on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeOffer {
    pub reason: UpgradeReason,
    pub choices: Vec<Upgrade>,
}

/// Goal of the level being played
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Objective {
    /// Clear this many waves
    ClearWaves(u32),
    /// Stay alive for this many seconds of play
    Survive(f32),
}

impl Objective {
    pub fn is_met(self, waves_cleared: u32, seconds: f32) -> bool {
        match self {
            Objective::ClearWaves(target) => waves_cleared >= target,
            Objective::Survive(target) => seconds >= target,
        }
    }
}

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Bounds and obstacles
    pub arena: Arena,
    pub layout: Option<Layout>,
    pub player: Player,
    /// Living enemies, in spawn order
    pub enemies: Vec<Enemy>,
    pub projectiles: Projectiles,
    pub director: WaveDirector,
    /// Visual effects (not gameplay-affecting)
    pub effects: Vec<Effect>,
    pub screen_shake: f32,
    /// Seconds of unpaused play
    pub time: f32,
    pub time_ticks: u64,
    pub kills: u32,
    pub waves_cleared: u32,
    pub objective: Option<Objective>,
    pub objective_met: bool,
    offer: Option<UpgradeOffer>,
    upgrade_queue: VecDeque<UpgradeReason>,
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// New run with the stock tuning
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        Self::with_tuning(seed, width, height, Tuning::default())
    }

    pub fn with_tuning(seed: u64, width: f32, height: f32, tuning: Tuning) -> Self {
        let arena = Arena::new(width, height);
        let player = Player::new(arena.center(), &tuning.player);
        let director = WaveDirector::new(tuning.waves.clone());
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::Playing,
            arena,
            layout: None,
            player,
            enemies: Vec::new(),
            projectiles: Projectiles::new(),
            director,
            effects: Vec::new(),
            screen_shake: 0.0,
            time: 0.0,
            time_ticks: 0,
            kills: 0,
            waves_cleared: 0,
            objective: None,
            objective_met: false,
            offer: None,
            upgrade_queue: VecDeque::new(),
            events: Vec::new(),
            next_id: 1,
        };

        state.director.start_next();
        state.regenerate_obstacles();
        state.events.push(GameEvent::WaveStarted {
            wave: state.director.index,
        });
        state
    }

    /// Start the run over with the same seed, arena size and objective.
    ///
    /// Live projectiles go back to the pool, which is kept.
    pub fn restart(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.phase = GamePhase::Playing;
        self.player = Player::new(self.arena.center(), &self.tuning.player);
        self.enemies.clear();
        self.projectiles.clear();
        self.director.reset();
        self.effects.clear();
        self.screen_shake = 0.0;
        self.time = 0.0;
        self.time_ticks = 0;
        self.kills = 0;
        self.waves_cleared = 0;
        self.objective_met = false;
        self.offer = None;
        self.upgrade_queue.clear();
        self.events.clear();
        self.next_id = 1;
        log::info!("Restarting run (seed {})", self.seed);

        self.director.start_next();
        self.regenerate_obstacles();
        self.events.push(GameEvent::WaveStarted {
            wave: self.director.index,
        });
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Change the world bounds. Non-positive sizes are ignored.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
            log::warn!("Ignoring resize to {width}x{height}");
            return;
        }
        self.arena.width = width;
        self.arena.height = height;
    }

    pub fn set_objective(&mut self, objective: Option<Objective>) {
        self.objective = objective;
        self.objective_met = false;
    }

    /// The choice waiting on the player, if any
    pub fn upgrade_offer(&self) -> Option<&UpgradeOffer> {
        self.offer.as_ref()
    }

    /// Upgrade choices still queued behind the current offer
    pub fn queued_upgrades(&self) -> usize {
        self.upgrade_queue.len()
    }

    /// Apply one of the offered upgrades.
    ///
    /// On error the offer stays on screen unchanged.
    pub fn choose_upgrade(&mut self, index: usize) -> Result<Upgrade, UpgradeError> {
        let Some(offer) = &self.offer else {
            return Err(UpgradeError::NoOfferPending);
        };
        let Some(&upgrade) = offer.choices.get(index) else {
            let available = offer.choices.len();
            log::warn!("Rejected upgrade choice {index} ({available} offered)");
            return Err(UpgradeError::ChoiceOutOfRange { index, available });
        };

        if let Err(err) = upgrade.apply(&mut self.player, &self.tuning.pet, &mut self.rng) {
            log::warn!("Rejected upgrade {upgrade:?}: {err}");
            return Err(err);
        }

        self.events.push(GameEvent::UpgradeApplied(upgrade));
        self.offer = None;
        self.present_next_offer();
        Ok(upgrade)
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queue an upgrade choice; the simulation halts until it is made
    pub fn queue_upgrade(&mut self, reason: UpgradeReason) {
        self.upgrade_queue.push_back(reason);
        if self.offer.is_none() {
            self.present_next_offer();
        }
    }

    fn present_next_offer(&mut self) {
        match self.upgrade_queue.pop_front() {
            Some(reason) => {
                let choices = generate_offer(&self.player, &mut self.rng);
                self.offer = Some(UpgradeOffer { reason, choices });
                self.phase = GamePhase::ChoosingUpgrade;
            }
            None => {
                self.phase = GamePhase::Playing;
            }
        }
    }

    /// Materialize an enemy
    pub fn spawn_enemy(&mut self, spawn: EnemySpawn, counts_for_wave: bool) -> u32 {
        let id = self.next_entity_id();
        let pos = self.arena.clamp_inside(spawn.pos, spawn.kind.stats().radius);
        let mut enemy = Enemy::new(id, spawn.kind, pos);
        enemy.counts_for_wave = counts_for_wave;
        log::debug!("Spawned {:?} #{id}", spawn.kind);
        self.enemies.push(enemy);
        id
    }

    /// Wave transition: the director has already moved to the next wave
    pub fn handle_wave_cleared(&mut self, cleared: u32) {
        self.waves_cleared += 1;
        self.projectiles.clear();
        self.regenerate_obstacles();
        self.events.push(GameEvent::WaveCleared { wave: cleared });
        self.events.push(GameEvent::WaveStarted {
            wave: self.director.index,
        });
        self.queue_upgrade(UpgradeReason::WaveCleared);
        self.check_objective();
    }

    fn regenerate_obstacles(&mut self) {
        let keep_clear = [self.arena.center(), self.player.pos];
        let (layout, obstacles) = layout::generate(
            self.director.index,
            &self.tuning.obstacles,
            self.arena.width,
            self.arena.height,
            &keep_clear,
            &mut self.rng,
        );
        if let Some(layout) = layout {
            log::info!("Wave {} layout: {layout:?} ({} obstacles)", self.director.index, obstacles.len());
        }
        self.layout = layout;
        self.arena.obstacles = obstacles;
    }

    /// Emit `LevelComplete` the first time the objective is reached
    pub fn check_objective(&mut self) {
        if self.objective_met {
            return;
        }
        let met = self
            .objective
            .is_some_and(|objective| objective.is_met(self.waves_cleared, self.time));
        if met {
            log::info!("Objective reached after {} waves, {:.1}s", self.waves_cleared, self.time);
            self.objective_met = true;
            self.events.push(GameEvent::LevelComplete);
        }
    }

    /// Count down effect lifetimes and screen shake
    pub fn decay_effects(&mut self, dt: f32) {
        for fx in &mut self.effects {
            fx.ttl -= dt;
        }
        self.effects.retain(|fx| fx.ttl > 0.0);
        self.screen_shake = (self.screen_shake - SHAKE_DECAY * dt).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::perks::Perk;

    #[test]
    fn test_new_state_starts_wave_one() {
        let mut state = GameState::new(1, 800.0, 600.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.director.index, 1);
        assert_eq!(state.player.pos, Vec2::new(400.0, 300.0));
        assert!(state.arena.obstacles.is_empty());
        assert_eq!(state.drain_events(), vec![GameEvent::WaveStarted { wave: 1 }]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_choose_without_offer_fails() {
        let mut state = GameState::new(1, 800.0, 600.0);
        assert_eq!(state.choose_upgrade(0), Err(UpgradeError::NoOfferPending));
    }

    #[test]
    fn test_queued_offers_drain_in_order() {
        let mut state = GameState::new(1, 800.0, 600.0);
        state.queue_upgrade(UpgradeReason::LevelUp);
        state.queue_upgrade(UpgradeReason::WaveCleared);
        assert_eq!(state.phase, GamePhase::ChoosingUpgrade);
        assert_eq!(state.upgrade_offer().unwrap().reason, UpgradeReason::LevelUp);
        assert_eq!(state.upgrade_offer().unwrap().choices.len(), 3);
        assert_eq!(state.queued_upgrades(), 1);

        assert_eq!(
            state.choose_upgrade(3),
            Err(UpgradeError::ChoiceOutOfRange { index: 3, available: 3 })
        );
        assert_eq!(state.phase, GamePhase::ChoosingUpgrade);

        state.choose_upgrade(0).unwrap();
        assert_eq!(state.upgrade_offer().unwrap().reason, UpgradeReason::WaveCleared);
        state.choose_upgrade(2).unwrap();
        assert!(state.upgrade_offer().is_none());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_maxed_perk_choice_keeps_offer() {
        let mut state = GameState::new(1, 800.0, 600.0);
        state.offer = Some(UpgradeOffer {
            reason: UpgradeReason::LevelUp,
            choices: vec![Upgrade::Perk(Perk::Split)],
        });
        state.phase = GamePhase::ChoosingUpgrade;
        state.player.perks.set_level(Perk::Split, 1).unwrap();
        assert!(matches!(state.choose_upgrade(0), Err(UpgradeError::PerkMaxed { .. })));
        assert!(state.upgrade_offer().is_some());
        assert_eq!(state.phase, GamePhase::ChoosingUpgrade);
    }

    #[test]
    fn test_wave_clear_transition() {
        let mut state = GameState::new(1, 800.0, 600.0);
        state.drain_events();
        state.projectiles.fire(&crate::sim::projectile::ShotRequest::new(
            Vec2::ZERO,
            Vec2::X,
            100.0,
            10.0,
            crate::sim::projectile::Owner::Player,
        ));
        state.director.start_next();
        state.handle_wave_cleared(1);

        assert!(state.projectiles.is_empty());
        assert_eq!(state.waves_cleared, 1);
        assert_eq!(state.phase, GamePhase::ChoosingUpgrade);
        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::WaveCleared { wave: 1 });
        assert_eq!(events[1], GameEvent::WaveStarted { wave: 2 });
    }

    #[test]
    fn test_objective_fires_once() {
        let mut state = GameState::new(1, 800.0, 600.0);
        state.drain_events();
        state.set_objective(Some(Objective::ClearWaves(1)));
        state.check_objective();
        assert!(state.drain_events().is_empty());

        state.waves_cleared = 1;
        state.check_objective();
        state.check_objective();
        assert_eq!(state.drain_events(), vec![GameEvent::LevelComplete]);
    }

    #[test]
    fn test_resize_rejects_degenerate_bounds() {
        let mut state = GameState::new(1, 800.0, 600.0);
        state.resize(0.0, 300.0);
        assert_eq!((state.arena.width, state.arena.height), (800.0, 600.0));
        state.resize(400.0, 300.0);
        assert_eq!((state.arena.width, state.arena.height), (400.0, 300.0));
    }

    #[test]
    fn test_effects_and_shake_decay() {
        let mut state = GameState::new(1, 800.0, 600.0);
        state.effects.push(Effect::muzzle(Vec2::ZERO));
        state.effects.push(Effect::death(Vec2::ZERO));
        state.screen_shake = DEATH_SHAKE;
        state.decay_effects(0.1);
        assert_eq!(state.effects.len(), 1);
        assert!((state.screen_shake - 1.5).abs() < 1e-5);
        state.decay_effects(0.5);
        assert!(state.effects.is_empty());
        assert_eq!(state.screen_shake, 0.0);
    }
}
