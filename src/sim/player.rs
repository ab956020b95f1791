//! The player and their orbiting pets

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Arena;
use super::enemy::{Enemy, living};
use super::perks::PerkSet;
use super::projectile::{Owner, ShotRequest};
use super::state::Effect;
use crate::tuning::{PetTuning, PlayerTuning};
use crate::{from_angle, pick_nearest};

/// XP threshold after a level-up: ×1.25, rounded up so it always grows
/// (10 → 13 → 17 → 22)
pub fn next_xp_threshold(current: u32) -> u32 {
    let grown = (current as f32 * 1.25).ceil() as u32;
    grown.max(current + 1)
}

/// The player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Movement speed (units per second)
    pub speed: f32,
    pub fire_cooldown: f32,
    /// Seconds between shots
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_for_next: u32,
    pub pets: Vec<Pet>,
    pub hp: f32,
    pub max_hp: f32,
    pub perks: PerkSet,
    /// Gap kept between the player's edge and the arena edge
    pub bounds_margin: f32,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &PlayerTuning) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: tuning.radius,
            speed: tuning.speed,
            fire_cooldown: 0.0,
            fire_rate: tuning.fire_rate,
            projectile_speed: tuning.projectile_speed,
            projectile_damage: tuning.projectile_damage,
            level: 1,
            xp: 0,
            xp_for_next: tuning.xp_for_first_level,
            pets: Vec::new(),
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            perks: PerkSet::new(),
            bounds_margin: tuning.bounds_margin,
        }
    }

    /// Move, auto-fire, and update pets
    pub fn update(
        &mut self,
        dt: f32,
        movement: Vec2,
        arena: &Arena,
        enemies: &[Enemy],
        shots: &mut Vec<ShotRequest>,
        effects: &mut Vec<Effect>,
    ) {
        let movement = movement.clamp_length_max(1.0);
        self.vel = movement * self.speed;
        self.pos = arena.slide(self.pos, self.vel * dt, self.radius);
        self.pos = arena.clamp_inside(self.pos, self.radius + self.bounds_margin);

        self.fire_cooldown -= dt;
        if self.fire_cooldown <= 0.0 {
            if let Some(i) = pick_nearest(self.pos, living(enemies)) {
                let mut shot = ShotRequest::new(
                    self.pos,
                    enemies[i].pos - self.pos,
                    self.projectile_speed,
                    self.projectile_damage,
                    Owner::Player,
                );
                shot.perks = self.perks.snapshot();
                shots.push(shot);
                effects.push(Effect::muzzle(self.pos));
                self.fire_cooldown += self.fire_rate;
            } else {
                // Nothing to shoot at: stay ready without banking shots
                self.fire_cooldown = 0.0;
            }
        }

        for pet in &mut self.pets {
            pet.update(dt, self.pos, self.radius, &self.perks, enemies, shots, effects);
        }
    }

    /// Add XP, resolving every level-up it pays for. Returns levels gained.
    ///
    /// Afterwards `xp < xp_for_next` always holds.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.xp_for_next {
            self.xp -= self.xp_for_next;
            self.level += 1;
            self.xp_for_next = next_xp_threshold(self.xp_for_next);
            gained += 1;
            log::info!("Level up! Now level {} (next at {} xp)", self.level, self.xp_for_next);
        }
        gained
    }

    pub fn add_pet(&mut self, angle: f32, tuning: &PetTuning) {
        self.pets.push(Pet::new(angle, tuning));
    }
}

/// A companion orbiting the player and firing on its own timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub pos: Vec2,
    pub radius: f32,
    /// Orbit distance beyond the player's radius
    pub orbit_radius: f32,
    /// Radians per second
    pub orbit_speed: f32,
    pub angle: f32,
    pub fire_cooldown: f32,
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub hp: f32,
    pub max_hp: f32,
}

impl Pet {
    pub fn new(angle: f32, tuning: &PetTuning) -> Self {
        Self {
            pos: Vec2::ZERO,
            radius: tuning.radius,
            orbit_radius: tuning.orbit_radius,
            orbit_speed: tuning.orbit_speed,
            angle,
            fire_cooldown: 0.0,
            fire_rate: tuning.fire_rate,
            projectile_speed: tuning.projectile_speed,
            projectile_damage: tuning.projectile_damage,
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
        }
    }

    /// Orbit the owner and fire with the owner's current perks
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        owner_pos: Vec2,
        owner_radius: f32,
        perks: &PerkSet,
        enemies: &[Enemy],
        shots: &mut Vec<ShotRequest>,
        effects: &mut Vec<Effect>,
    ) {
        self.angle += dt * self.orbit_speed;
        self.pos = owner_pos + from_angle(self.angle) * (owner_radius + self.orbit_radius);

        self.fire_cooldown -= dt;
        if self.fire_cooldown <= 0.0 {
            if let Some(i) = pick_nearest(self.pos, living(enemies)) {
                let mut shot = ShotRequest::new(
                    self.pos,
                    enemies[i].pos - self.pos,
                    self.projectile_speed,
                    self.projectile_damage,
                    Owner::Player,
                );
                shot.perks = perks.snapshot();
                shots.push(shot);
                effects.push(Effect::muzzle(self.pos));
                self.fire_cooldown += self.fire_rate;
            } else {
                self.fire_cooldown = 0.0;
            }
        }
    }
}
