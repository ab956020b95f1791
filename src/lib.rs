//! dartdart - combat simulation core for a top-down survival shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, projectiles, waves, upgrades)
//! - `platform`: Host frame scheduling (fixed timestep driver)
//! - `persistence`: Storage port for progress data
//! - `levels`: Level catalogue and unlock progress
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod levels;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, PersistenceError, UpgradeError};
pub use levels::{LevelDef, LevelKind, LevelManager};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// A single host frame longer than this (ms) is treated as a tab resume
    pub const FRAME_SPIKE_MS: f64 = 1000.0;

    /// Collision radius of every projectile
    pub const PROJECTILE_RADIUS: f32 = 6.0;
    /// Projectile lifetime (seconds)
    pub const PROJECTILE_LIFETIME: f32 = 3.0;
    /// Distance from the arena edge at which bouncing shots reflect
    pub const BOUNCE_MARGIN: f32 = 12.0;

    /// Homing blend: fraction of the old velocity kept per tick
    pub const HOMING_RETAIN: f32 = 0.92;
    /// Homing blend: fraction of the desired velocity mixed in per tick
    pub const HOMING_STEER: f32 = 0.08;
    /// Homing never lets a shot drop below this fraction of its base speed
    pub const HOMING_MIN_SPEED_FRACTION: f32 = 0.95;

    /// Split children fan out at ±30°
    pub const SPLIT_ANGLE: f32 = std::f32::consts::PI / 6.0;
    /// Split children carry this fraction of the parent's damage
    pub const SPLIT_DAMAGE_FRACTION: f32 = 0.7;

    /// Enemy shot parameters
    pub const ENEMY_SHOT_SPEED: f32 = 240.0;
    pub const ENEMY_SHOT_DAMAGE: f32 = 25.0;
    /// Chase phase length (seconds)
    pub const ENEMY_CHASE_TIME: f32 = 1.0;
    /// Chase speed is this fraction of the enemy's base speed
    pub const ENEMY_CHASE_FACTOR: f32 = 0.8;
    /// First cooldown after an enemy appears
    pub const ENEMY_INITIAL_COOLDOWN: f32 = 0.5;

    /// Splitter children appear this far from the parent
    pub const SPLIT_SPAWN_OFFSET: f32 = 20.0;

    /// Padding from the arena edge for enemy spawn points
    pub const SPAWN_EDGE_PADDING: f32 = 40.0;
    /// Attempts at finding an obstacle-free spawn point
    pub const SPAWN_ATTEMPTS: u32 = 8;
    /// Largest enemy radius, used when testing spawn points against obstacles
    pub const SPAWN_CLEARANCE: f32 = 16.0;

    /// Keep-out radius around the player spawn when placing obstacles
    pub const OBSTACLE_CLEAR_RADIUS: f32 = 120.0;

    /// Number of upgrades offered per choice
    pub const UPGRADE_OFFER_COUNT: usize = 3;
}

/// Normalize a vector, returning the unit vector and the original length.
///
/// A zero vector is treated as having length 1 so the division is always
/// finite: `normalize(Vec2::ZERO)` yields `(Vec2::ZERO, 1.0)`.
#[inline]
pub fn normalize(v: Vec2) -> (Vec2, f32) {
    let len = v.length();
    let len = if len > 0.0 && len.is_finite() { len } else { 1.0 };
    (v / len, len)
}

/// Squared distance between two points
#[inline]
pub fn dist2(a: Vec2, b: Vec2) -> f32 {
    (b - a).length_squared()
}

/// Index of the candidate closest to `origin`.
///
/// Linear scan; ties keep the first candidate found. Returns `None` for an
/// empty candidate list.
pub fn pick_nearest<I>(origin: Vec2, candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = (usize, Vec2)>,
{
    let mut best = None;
    let mut best_d2 = f32::INFINITY;
    for (index, pos) in candidates {
        let d2 = dist2(origin, pos);
        if d2 < best_d2 {
            best_d2 = d2;
            best = Some(index);
        }
    }
    best
}

/// Unit direction for an angle in radians
#[inline]
pub fn from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_zero_is_finite() {
        let (dir, len) = normalize(Vec2::ZERO);
        assert!(dir.x.is_finite() && dir.y.is_finite());
        assert_eq!(len, 1.0);
        assert_eq!(dir, Vec2::ZERO);
    }

    #[test]
    fn test_normalize_returns_length() {
        let (dir, len) = normalize(Vec2::new(3.0, 4.0));
        assert!((len - 5.0).abs() < 1e-6);
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pick_nearest_ties_keep_first() {
        let origin = Vec2::ZERO;
        let candidates = [
            (0, Vec2::new(10.0, 0.0)),
            (1, Vec2::new(0.0, 10.0)),
            (2, Vec2::new(20.0, 0.0)),
        ];
        assert_eq!(pick_nearest(origin, candidates), Some(0));
    }

    #[test]
    fn test_pick_nearest_empty() {
        assert_eq!(pick_nearest(Vec2::ZERO, std::iter::empty()), None);
    }

    proptest! {
        #[test]
        fn prop_normalize_never_nan(x in -1.0e6f32..1.0e6, y in -1.0e6f32..1.0e6) {
            let (dir, len) = normalize(Vec2::new(x, y));
            prop_assert!(dir.x.is_finite() && dir.y.is_finite());
            prop_assert!(len > 0.0);
            prop_assert!(dir.length() <= 1.0 + 1e-4);
        }
    }
}
