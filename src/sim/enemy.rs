//! Enemy kinds, stat table, and the cooldown/chase AI

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Arena;
use super::projectile::{Owner, ShotRequest};
use super::state::Effect;
use super::status::StatusEffects;
use crate::consts::*;
use crate::{from_angle, normalize};

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    /// Fast, low-HP
    Fast,
    /// Slow and tanky
    Tank,
    /// Splits into two children on death unless it is itself a child
    Splitter { is_split: bool },
}

/// Per-kind stats shared by every enemy of that kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub speed: f32,
    pub max_hp: f32,
    pub radius: f32,
    /// Cooldown between shots (seconds)
    pub fire_interval: f32,
}

impl EnemyKind {
    pub const fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Basic => EnemyStats {
                speed: 90.0,
                max_hp: 25.0,
                radius: 12.0,
                fire_interval: 1.6,
            },
            EnemyKind::Fast => EnemyStats {
                speed: 160.0,
                max_hp: 15.0,
                radius: 10.0,
                fire_interval: 2.0,
            },
            EnemyKind::Tank => EnemyStats {
                speed: 50.0,
                max_hp: 60.0,
                radius: 16.0,
                fire_interval: 2.5,
            },
            EnemyKind::Splitter { is_split: false } => EnemyStats {
                speed: 100.0,
                max_hp: 30.0,
                radius: 14.0,
                fire_interval: 1.8,
            },
            EnemyKind::Splitter { is_split: true } => EnemyStats {
                speed: 100.0,
                max_hp: 12.0,
                radius: 10.0,
                fire_interval: 1.8,
            },
        }
    }
}

/// AI state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    /// Standing still, waiting to fire
    Cooldown,
    /// Closing in on the player
    Chase,
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: f32,
    pub state: AiState,
    /// Time left in the current AI state
    pub timer: f32,
    pub statuses: StatusEffects,
    pub dead: bool,
    /// Quota enemies count toward the wave's kill tally; splitter children don't
    pub counts_for_wave: bool,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            hp: kind.stats().max_hp,
            state: AiState::Cooldown,
            timer: ENEMY_INITIAL_COOLDOWN,
            statuses: StatusEffects::new(),
            dead: false,
            counts_for_wave: true,
        }
    }

    #[inline]
    pub fn stats(&self) -> EnemyStats {
        self.kind.stats()
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.stats().radius
    }

    /// Apply raw damage. Returns true only on the hit that kills.
    pub fn hit(&mut self, damage: f32) -> bool {
        if self.dead {
            return false;
        }
        self.hp -= damage;
        if self.hp <= 0.0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Advance statuses and AI by one tick
    pub fn update(
        &mut self,
        dt: f32,
        target: Vec2,
        arena: &Arena,
        shots: &mut Vec<ShotRequest>,
        effects: &mut Vec<Effect>,
    ) {
        if self.dead {
            return;
        }

        let status = self.statuses.tick(dt);
        self.hp -= status.damage;
        if self.hp <= 0.0 {
            self.dead = true;
            return;
        }

        let stats = self.stats();
        match self.state {
            AiState::Cooldown => {
                self.vel = Vec2::ZERO;
                self.timer -= dt;
                if self.timer <= 0.0 {
                    shots.push(ShotRequest::new(
                        self.pos,
                        target - self.pos,
                        ENEMY_SHOT_SPEED,
                        ENEMY_SHOT_DAMAGE,
                        Owner::Enemy,
                    ));
                    effects.push(Effect::muzzle(self.pos));
                    self.state = AiState::Chase;
                    self.timer = ENEMY_CHASE_TIME;
                }
            }
            AiState::Chase => {
                let (dir, _) = normalize(target - self.pos);
                self.vel = dir * stats.speed * ENEMY_CHASE_FACTOR * status.speed_mod;
                self.pos = arena.slide(self.pos, self.vel * dt, stats.radius);

                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.state = AiState::Cooldown;
                    self.timer = stats.fire_interval;
                }
            }
        }

        self.pos = arena.clamp_inside(self.pos, stats.radius);
    }
}

/// A request to materialize an enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub pos: Vec2,
}

/// Enemies to create when `enemy` dies: two children for a parent splitter,
/// nothing otherwise.
pub fn death_spawns<R: Rng>(enemy: &Enemy, rng: &mut R) -> Vec<EnemySpawn> {
    match enemy.kind {
        EnemyKind::Splitter { is_split: false } => (0..2)
            .map(|_| {
                let angle = rng.random::<f32>() * std::f32::consts::TAU;
                EnemySpawn {
                    kind: EnemyKind::Splitter { is_split: true },
                    pos: enemy.pos + from_angle(angle) * SPLIT_SPAWN_OFFSET,
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Living enemies as (index, position) pairs, in list order
pub fn living(enemies: &[Enemy]) -> impl Iterator<Item = (usize, Vec2)> + '_ {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.dead)
        .map(|(i, e)| (i, e.pos))
}
