//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::enemy::death_spawns;
use super::projectile::HitContext;
use super::state::{DEATH_SHAKE, Effect, GameEvent, GamePhase, GameState, UpgradeReason};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement; clamped to unit length
    pub movement: Vec2,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::ChoosingUpgrade => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    state.time += dt;
    state.time_ticks += 1;

    // Entities fire into a shared request buffer
    let mut shots = Vec::new();
    state.player.update(
        dt,
        input.movement,
        &state.arena,
        &state.enemies,
        &mut shots,
        &mut state.effects,
    );
    let target = state.player.pos;
    for enemy in &mut state.enemies {
        enemy.update(dt, target, &state.arena, &mut shots, &mut state.effects);
    }
    for shot in shots.drain(..) {
        state.projectiles.fire(&shot);
    }

    // Projectiles; children spawned by hits start moving next tick
    {
        let mut ctx = HitContext {
            arena: &state.arena,
            enemies: &mut state.enemies,
            player: &state.player,
            shots: &mut shots,
            effects: &mut state.effects,
            events: &mut state.events,
        };
        for projectile in &mut state.projectiles.active {
            projectile.update(dt, &mut ctx);
        }
    }
    for shot in shots.drain(..) {
        state.projectiles.fire(&shot);
    }
    state.projectiles.reap();

    reap_enemies(state);

    // A wave clear above may have paused for an upgrade
    if state.phase == GamePhase::Playing {
        let mut spawns = Vec::new();
        let alive = state.enemies.len();
        state
            .director
            .update(dt, &mut state.rng, &state.arena, alive, &mut spawns);
        for spawn in spawns {
            state.spawn_enemy(spawn, true);
        }
    }

    state.check_objective();
    state.decay_effects(dt);
}

/// Remove dead enemies, paying out XP and wave progress for each
fn reap_enemies(state: &mut GameState) {
    if state.enemies.iter().all(|e| !e.dead) {
        return;
    }
    let (dead, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|e| e.dead);
    state.enemies = alive;

    for enemy in dead {
        state.effects.push(Effect::death(enemy.pos));
        state.screen_shake = state.screen_shake.max(DEATH_SHAKE);
        state.kills += 1;
        state.events.push(GameEvent::EnemyKilled {
            id: enemy.id,
            kind: enemy.kind,
        });

        let gained = state.player.gain_xp(1);
        // One event per level passed, oldest first
        let reached = state.player.level;
        for level in reached + 1 - gained..=reached {
            state.events.push(GameEvent::LevelUp { level });
            state.queue_upgrade(UpgradeReason::LevelUp);
        }

        for spawn in death_spawns(&enemy, &mut state.rng) {
            state.spawn_enemy(spawn, false);
        }

        if enemy.counts_for_wave {
            if let Some(cleared) = state.director.on_enemy_killed() {
                state.handle_wave_cleared(cleared);
            }
        }
    }
}
