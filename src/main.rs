//! dartdart entry point
//!
//! Runs a headless session: a seeded game driven through the fixed-step
//! scheduler with scripted movement, always taking the first upgrade offered.
//! Natively the seed, level and duration come from the command line:
//!
//! ```text
//! dartdart [seed] [level] [seconds]
//! ```
//!
//! Set `DARTDART_TUNING` to a JSON file to override balance values.

use dartdart::consts::SIM_DT;
use dartdart::levels::{LevelManager, level_def};
use dartdart::persistence::ProgressStore;
use dartdart::platform::{FixedStepScheduler, FrameHandler};
use dartdart::sim::{GameEvent, GameState, TickInput, tick};
use dartdart::Tuning;
use glam::Vec2;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

const ARENA_WIDTH: f32 = 960.0;
const ARENA_HEIGHT: f32 = 640.0;
/// Host frame interval for the headless loop (ms)
const FRAME_MS: f64 = 1000.0 / 60.0;

/// One run of a level
struct Session<'a, S: ProgressStore> {
    state: GameState,
    levels: LevelManager,
    store: &'a mut S,
    level_id: u32,
    frames: u64,
    finished: bool,
}

impl<'a, S: ProgressStore> Session<'a, S> {
    fn new(seed: u64, level_id: u32, tuning: Tuning, store: &'a mut S) -> Self {
        let mut levels = LevelManager::load(&*store);
        let mut state = GameState::with_tuning(seed, ARENA_WIDTH, ARENA_HEIGHT, tuning);
        match levels.set_current(level_id) {
            Some(def) => {
                log::info!("Playing {}: {}", def.name, def.description);
                state.set_objective(def.kind.objective());
            }
            None => log::warn!("Level {level_id} is locked or unknown; playing without an objective"),
        }
        Self {
            state,
            levels,
            store,
            level_id,
            frames: 0,
            finished: false,
        }
    }

    /// Wander in a slow circle around the arena
    fn scripted_input(&self) -> TickInput {
        let t = self.state.time * 0.5;
        TickInput {
            movement: Vec2::new(t.cos(), t.sin()),
            pause: false,
        }
    }

    fn handle_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::WaveStarted { wave } => log::info!("Wave {wave} started"),
                GameEvent::WaveCleared { wave } => {
                    let total = self.store.increment("dartdart_waves_cleared");
                    log::info!("Wave {wave} cleared ({total} all-time)");
                }
                GameEvent::LevelUp { level } => log::info!("Player reached level {level}"),
                GameEvent::EnemyKilled { id, kind } => log::debug!("Enemy #{id} ({kind:?}) killed"),
                GameEvent::PlayerHit { damage } => log::debug!("Player hit for {damage}"),
                GameEvent::UpgradeApplied(upgrade) => log::info!("Took upgrade {upgrade:?}"),
                GameEvent::LevelComplete => {
                    self.finished = true;
                    match self.levels.complete_level(self.level_id, 1, &mut *self.store) {
                        Ok(_) => log::info!("Level {} complete", self.level_id),
                        Err(err) => log::error!("Failed to save level progress: {err}"),
                    }
                }
            }
        }
    }
}

impl<S: ProgressStore> FrameHandler for Session<'_, S> {
    fn simulate(&mut self, dt: f32) {
        let input = self.scripted_input();
        tick(&mut self.state, &input, dt);

        while let Some(offer) = self.state.upgrade_offer() {
            let label = offer
                .choices
                .first()
                .map(|u| u.describe(&self.state.player))
                .unwrap_or_default();
            log::debug!("Offer ({:?}): taking {label}", offer.reason);
            if let Err(err) = self.state.choose_upgrade(0) {
                log::error!("Upgrade failed: {err}");
                break;
            }
        }
        self.handle_events();
    }

    fn render(&mut self) {
        self.frames += 1;
        if self.frames % 600 == 0 {
            let s = &self.state;
            log::info!(
                "t={:.0}s wave={} kills={} level={} enemies={} shots={} pool={:?}",
                s.time,
                s.director.index,
                s.kills,
                s.player.level,
                s.enemies.len(),
                s.projectiles.len(),
                s.projectiles.pool().stats()
            );
        }
    }
}

/// Drive a session until its objective is met or `seconds` of play elapse
fn run_session<S: ProgressStore>(seed: u64, level_id: u32, seconds: f32, tuning: Tuning, store: &mut S) {
    let mut session = Session::new(seed, level_id, tuning, store);
    let mut scheduler = FixedStepScheduler::new();
    let mut now = 0.0;
    scheduler.start(now);

    let max_frames = (seconds / SIM_DT).ceil() as u64 + 1;
    for _ in 0..max_frames {
        now += FRAME_MS;
        scheduler.frame(now, &mut session);
        if session.finished {
            break;
        }
    }
    scheduler.stop();

    let s = &session.state;
    log::info!(
        "Session over: {:.0}s, {} waves cleared, {} kills, player level {}",
        s.time,
        s.waves_cleared,
        s.kills,
        s.player.level
    );
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("dartdart starting...");

    let seed = getrandom::u64().unwrap_or(0x5eed);
    let mut store = dartdart::persistence::LocalStorage;
    run_session(seed, 1, 60.0, Tuning::default(), &mut store);
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("dartdart (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|a| a.parse().ok()).unwrap_or(1);
    let level_id = args
        .next()
        .and_then(|a| a.parse().ok())
        .filter(|id| level_def(*id).is_some())
        .unwrap_or(1);
    let seconds = args.next().and_then(|a| a.parse().ok()).unwrap_or(120.0);

    let mut store = dartdart::persistence::MemoryStore::new();
    run_session(seed, level_id, seconds, load_tuning(), &mut store);
}

/// Balance overrides from the JSON file named by `DARTDART_TUNING`, if set
#[cfg(not(target_arch = "wasm32"))]
fn load_tuning() -> Tuning {
    let Ok(path) = std::env::var("DARTDART_TUNING") else {
        return Tuning::default();
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(|err| err.to_string())
        .and_then(|json| Tuning::from_json(&json).map_err(|err| err.to_string()));
    match loaded {
        Ok(tuning) => {
            log::info!("Loaded tuning from {path}");
            tuning
        }
        Err(err) => {
            log::warn!("Ignoring tuning file {path}: {err}");
            Tuning::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
