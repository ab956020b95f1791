//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, monotonically increasing ids)
//! - No rendering or platform dependencies

pub mod collision;
pub mod enemy;
pub mod layout;
pub mod perks;
pub mod player;
pub mod pool;
pub mod projectile;
pub mod state;
pub mod status;
pub mod tick;
pub mod upgrade;
pub mod wave;

pub use collision::{Arena, CollisionResult, Obstacle, circle_rect_collision};
pub use enemy::{AiState, Enemy, EnemyKind, EnemySpawn, EnemyStats};
pub use layout::Layout;
pub use perks::{Perk, PerkSet, ProjectilePerks};
pub use player::{Pet, Player};
pub use pool::{PoolStats, ProjectilePool, Projectiles};
pub use projectile::{Owner, Projectile, ShotRequest};
pub use state::{
    Effect, EffectKind, GameEvent, GamePhase, GameState, Objective, UpgradeOffer, UpgradeReason,
};
pub use status::{StatusEffect, StatusEffects, StatusKind};
pub use tick::{TickInput, tick};
pub use upgrade::Upgrade;
pub use wave::{PendingSpawn, WaveDirector, WavePhase};
