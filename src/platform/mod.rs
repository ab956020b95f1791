//! Platform abstraction layer
//!
//! Host-facing pieces that are not part of the deterministic simulation:
//! - Frame scheduling (fixed timestep over variable host frames)

pub mod scheduler;

pub use scheduler::{FixedStepScheduler, FrameHandler};
