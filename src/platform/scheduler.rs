//! Fixed timestep frame scheduler
//!
//! Host frames arrive at whatever rate the platform delivers them; the
//! simulation always advances in `SIM_DT` steps.

use crate::consts::{FRAME_SPIKE_MS, MAX_SUBSTEPS, SIM_DT};

/// Callbacks driven by the scheduler
pub trait FrameHandler {
    /// Advance the simulation by one fixed step
    fn simulate(&mut self, dt: f32);
    /// Draw the current state (once per host frame)
    fn render(&mut self);
}

#[derive(Debug, Clone)]
pub struct FixedStepScheduler {
    step: f32,
    accumulator: f32,
    last_time: Option<f64>,
    running: bool,
}

impl Default for FixedStepScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedStepScheduler {
    pub fn new() -> Self {
        Self {
            step: SIM_DT,
            accumulator: 0.0,
            last_time: None,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin accepting frames. Does nothing if already running.
    pub fn start(&mut self, now_ms: f64) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_time = Some(now_ms);
        self.accumulator = 0.0;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.last_time = None;
    }

    /// Handle one host frame at `now_ms`. Returns the number of simulation
    /// steps run.
    pub fn frame<H: FrameHandler>(&mut self, now_ms: f64, handler: &mut H) -> u32 {
        if !self.running {
            return 0;
        }

        let elapsed_ms = self.last_time.map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_time = Some(now_ms);

        // Tab resume or debugger stall: run a single step instead of catching up
        if elapsed_ms > FRAME_SPIKE_MS {
            self.accumulator += self.step;
        } else {
            self.accumulator += (elapsed_ms / 1000.0) as f32;
        }

        let mut steps = 0;
        while self.accumulator >= self.step && steps < MAX_SUBSTEPS {
            handler.simulate(self.step);
            self.accumulator -= self.step;
            steps += 1;
        }
        if self.accumulator >= self.step {
            log::debug!("Dropping {:.1} ms of simulation backlog", self.accumulator * 1000.0);
            self.accumulator %= self.step;
        }

        handler.render();
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Counter {
        steps: u32,
        renders: u32,
    }

    impl FrameHandler for Counter {
        fn simulate(&mut self, dt: f32) {
            assert_eq!(dt, SIM_DT);
            self.steps += 1;
        }

        fn render(&mut self) {
            self.renders += 1;
        }
    }

    #[test]
    fn test_stopped_scheduler_does_nothing() {
        let mut scheduler = FixedStepScheduler::new();
        let mut counter = Counter::default();
        assert_eq!(scheduler.frame(100.0, &mut counter), 0);
        assert_eq!(counter.renders, 0);
    }

    #[test]
    fn test_runs_whole_steps() {
        let mut scheduler = FixedStepScheduler::new();
        let mut counter = Counter::default();
        scheduler.start(0.0);
        assert_eq!(scheduler.frame(55.0, &mut counter), 3);
        assert_eq!(counter.renders, 1);
        // 5 ms carried over plus 12 ms: one more step
        assert_eq!(scheduler.frame(67.0, &mut counter), 1);
    }

    #[test]
    fn test_spike_runs_at_most_one_step() {
        let mut scheduler = FixedStepScheduler::new();
        let mut counter = Counter::default();
        scheduler.start(0.0);
        scheduler.frame(10.0, &mut counter);
        assert!(scheduler.frame(5010.0, &mut counter) <= 1);
    }

    #[test]
    fn test_backlog_capped() {
        let mut scheduler = FixedStepScheduler::new();
        let mut counter = Counter::default();
        scheduler.start(0.0);
        assert_eq!(scheduler.frame(900.0, &mut counter), MAX_SUBSTEPS);
        // Backlog dropped: a normal frame afterwards does not keep catching up
        assert!(scheduler.frame(917.0, &mut counter) <= 2);
    }

    #[test]
    fn test_start_is_idempotent_and_stop_halts() {
        let mut scheduler = FixedStepScheduler::new();
        let mut counter = Counter::default();
        scheduler.start(0.0);
        scheduler.start(40.0);
        assert_eq!(scheduler.frame(55.0, &mut counter), 3);

        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.frame(200.0, &mut counter), 0);
        assert_eq!(counter.renders, 1);
    }

    proptest! {
        #[test]
        fn prop_steps_bounded(gaps in proptest::collection::vec(0.0f64..10_000.0, 1..50)) {
            let mut scheduler = FixedStepScheduler::new();
            let mut counter = Counter::default();
            let mut now = 0.0;
            scheduler.start(now);
            for gap in gaps {
                now += gap;
                let steps = scheduler.frame(now, &mut counter);
                prop_assert!(steps <= MAX_SUBSTEPS);
                if gap > FRAME_SPIKE_MS {
                    prop_assert!(steps <= 1);
                }
            }
        }
    }
}
