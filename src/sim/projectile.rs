//! Projectile update and hit resolution
//!
//! The densest part of the simulation: homing, integration, obstacle and wall
//! interaction, enemy/player hits, and the perk effects a hit triggers
//! (statuses, lightning chains, splitting, piercing).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Arena;
use super::enemy::{Enemy, living};
use super::perks::{Perk, ProjectilePerks, lightning_chain};
use super::player::Player;
use super::state::{Effect, GameEvent};
use crate::consts::*;
use crate::{from_angle, normalize, pick_nearest};

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// Everything needed to (re)initialize a projectile
#[derive(Debug, Clone, PartialEq)]
pub struct ShotRequest {
    pub pos: Vec2,
    /// Direction of travel (any length; normalized on reset)
    pub dir: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub owner: Owner,
    pub perks: ProjectilePerks,
    /// Enemy ids the shot must not hit
    pub struck: Vec<u32>,
}

impl ShotRequest {
    pub fn new(pos: Vec2, dir: Vec2, speed: f32, damage: f32, owner: Owner) -> Self {
        Self {
            pos,
            dir,
            speed,
            damage,
            owner,
            perks: ProjectilePerks::NONE,
            struck: Vec::new(),
        }
    }
}

/// World view a projectile reads and writes during its update
pub struct HitContext<'a> {
    pub arena: &'a Arena,
    pub enemies: &'a mut [Enemy],
    pub player: &'a Player,
    /// Shots spawned by hits (split children, lightning hops)
    pub shots: &'a mut Vec<ShotRequest>,
    pub effects: &'a mut Vec<Effect>,
    pub events: &'a mut Vec<GameEvent>,
}

/// A projectile (pooled; see `ProjectilePool`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Stable across reuse
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Speed at fire time; homing never lets the shot fall far below it
    pub base_speed: f32,
    pub damage: f32,
    pub owner: Owner,
    /// Seconds left before expiring
    pub life: f32,
    pub dead: bool,
    pub perks: ProjectilePerks,
    pub has_split: bool,
    pub bounce_count: u8,
    pub pierce_count: u8,
    /// Enemies already damaged by this shot
    pub struck: Vec<u32>,
}

impl Projectile {
    /// A blank, dead projectile waiting for `reset`
    pub fn new(id: u32) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            base_speed: 0.0,
            damage: 0.0,
            owner: Owner::Player,
            life: 0.0,
            dead: true,
            perks: ProjectilePerks::NONE,
            has_split: false,
            bounce_count: 0,
            pierce_count: 0,
            struck: Vec::new(),
        }
    }

    /// Reinitialize every field from `shot`. Nothing from a previous use
    /// survives except the id and the `struck` buffer's capacity.
    pub fn reset(&mut self, shot: &ShotRequest) {
        let (dir, _) = normalize(shot.dir);
        self.pos = shot.pos;
        self.vel = dir * shot.speed;
        self.base_speed = shot.speed;
        self.damage = shot.damage;
        self.owner = shot.owner;
        self.life = PROJECTILE_LIFETIME;
        self.dead = false;
        self.perks = shot.perks;
        self.has_split = false;
        self.bounce_count = 0;
        self.pierce_count = 0;
        self.struck.clear();
        self.struck.extend_from_slice(&shot.struck);
    }

    /// Current heading in radians
    pub fn heading(&self) -> f32 {
        self.vel.y.atan2(self.vel.x)
    }

    pub fn update(&mut self, dt: f32, ctx: &mut HitContext<'_>) {
        if self.dead {
            return;
        }

        if self.owner == Owner::Player && self.perks.homing {
            self.steer(ctx.enemies);
        }

        self.pos += self.vel * dt;
        self.life -= dt;
        if self.life <= 0.0 {
            self.dead = true;
            return;
        }

        // Obstacles absorb shots
        if let Some(contact) = ctx.arena.first_contact(self.pos, PROJECTILE_RADIUS) {
            self.dead = true;
            ctx.effects.push(Effect::impact(contact));
            return;
        }

        if self.owner == Owner::Player && self.bounce_count < self.perks.max_bounces {
            self.bounce_off_walls(ctx.arena);
        }

        match self.owner {
            Owner::Player => self.strike_enemy(ctx),
            Owner::Enemy => self.strike_player(ctx),
        }
    }

    /// Bend toward the nearest living enemy, never turning more than 90°
    fn steer(&mut self, enemies: &[Enemy]) {
        let Some(target) = pick_nearest(self.pos, living(enemies)) else {
            return;
        };
        let target_speed = self.vel.length().max(self.base_speed);
        let (desired, _) = normalize(enemies[target].pos - self.pos);
        let (current, _) = normalize(self.vel);
        if current.dot(desired) <= 0.0 {
            return;
        }

        self.vel = self.vel * HOMING_RETAIN + desired * target_speed * HOMING_STEER;
        let speed = self.vel.length();
        if speed > 0.0 && speed < self.base_speed * HOMING_MIN_SPEED_FRACTION {
            self.vel *= self.base_speed / speed;
        }
    }

    /// Reflect each axis that crossed the bounce margin
    fn bounce_off_walls(&mut self, arena: &Arena) {
        let mut bounced = false;
        if self.pos.x < BOUNCE_MARGIN || self.pos.x > arena.width - BOUNCE_MARGIN {
            self.vel.x = -self.vel.x;
            self.bounce_count = self.bounce_count.saturating_add(1);
            bounced = true;
        }
        if self.pos.y < BOUNCE_MARGIN || self.pos.y > arena.height - BOUNCE_MARGIN {
            self.vel.y = -self.vel.y;
            self.bounce_count = self.bounce_count.saturating_add(1);
            bounced = true;
        }
        if bounced {
            self.pos = arena.clamp_inside(self.pos, BOUNCE_MARGIN);
        }
    }

    /// Resolve at most one enemy hit this tick
    fn strike_enemy(&mut self, ctx: &mut HitContext<'_>) {
        let pos = self.pos;
        let struck = &self.struck;
        let Some(index) = ctx.enemies.iter().position(|e| {
            let reach = e.radius() + PROJECTILE_RADIUS;
            !e.dead && !struck.contains(&e.id) && (e.pos - pos).length_squared() <= reach * reach
        }) else {
            return;
        };

        // Elemental magnitudes follow the player's current perk levels
        let player_perks = ctx.player.perks;
        for perk in self.perks.status_perks() {
            if let Some((kind, duration, magnitude)) = perk.status_for_level(player_perks.level(perk)) {
                ctx.enemies[index].statuses.apply(kind, duration, magnitude);
            }
        }

        if self.perks.lightning {
            let level = match player_perks.level(Perk::Lightning) {
                0 => self.perks.lightning_level,
                level => level,
            };
            self.chain_lightning(index, level, ctx);
        }

        let enemy = &mut ctx.enemies[index];
        enemy.hit(self.damage);
        self.struck.push(enemy.id);
        ctx.effects.push(Effect::impact(self.pos));

        if self.perks.split && !self.has_split {
            self.split(ctx.shots);
        }

        if self.pierce_count < self.perks.max_pierce {
            self.pierce_count += 1;
        } else {
            self.dead = true;
        }
    }

    /// Direct-chain lightning: hop from the hit enemy to the nearest living
    /// enemy not yet touched, spawning one lightning-free shot per hop.
    fn chain_lightning(&self, entry: usize, level: u8, ctx: &mut HitContext<'_>) {
        let (hops, fraction) = lightning_chain(level);
        let speed = self.vel.length();
        let mut touched = vec![ctx.enemies[entry].id];
        let mut from = ctx.enemies[entry].pos;

        for _ in 0..hops {
            let candidates = ctx
                .enemies
                .iter()
                .enumerate()
                .filter(|(_, e)| !e.dead && !touched.contains(&e.id))
                .map(|(i, e)| (i, e.pos));
            let Some(next) = pick_nearest(from, candidates) else {
                break;
            };
            let target = &ctx.enemies[next];

            let mut shot = ShotRequest::new(from, target.pos - from, speed, self.damage * fraction, self.owner);
            shot.struck = touched.clone();
            ctx.shots.push(shot);
            ctx.effects.push(Effect::lightning(from, target.pos));

            touched.push(target.id);
            from = target.pos;
        }
    }

    /// Two children at ±30° of the current heading, split disabled
    fn split(&mut self, shots: &mut Vec<ShotRequest>) {
        let heading = self.heading();
        let speed = self.vel.length();
        for offset in [SPLIT_ANGLE, -SPLIT_ANGLE] {
            shots.push(ShotRequest {
                pos: self.pos,
                dir: from_angle(heading + offset),
                speed,
                damage: self.damage * SPLIT_DAMAGE_FRACTION,
                owner: self.owner,
                perks: ProjectilePerks {
                    split: false,
                    ..self.perks
                },
                struck: self.struck.clone(),
            });
        }
        self.has_split = true;
    }

    /// Enemy shots only produce an impact; player hp is left untouched
    fn strike_player(&mut self, ctx: &mut HitContext<'_>) {
        let reach = ctx.player.radius + PROJECTILE_RADIUS;
        if (ctx.player.pos - self.pos).length_squared() <= reach * reach {
            ctx.effects.push(Effect::impact(self.pos));
            ctx.events.push(GameEvent::PlayerHit { damage: self.damage });
            self.dead = true;
        }
    }
}
