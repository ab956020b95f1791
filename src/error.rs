//! Error types for the mutation and configuration boundaries
//!
//! The simulation tick itself never fails: numeric edge cases are handled by
//! policy branches. Errors only surface where outside data enters the core.

use thiserror::Error;

use crate::sim::perks::Perk;

/// Errors raised when applying an upgrade choice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpgradeError {
    #[error("no upgrade choice is pending")]
    NoOfferPending,
    #[error("choice {index} is out of range ({available} offered)")]
    ChoiceOutOfRange { index: usize, available: usize },
    #[error("perk {perk:?} is already at its maximum level {max}")]
    PerkMaxed { perk: Perk, max: u8 },
    #[error("perk {perk:?} does not support level {level} (max {max})")]
    InvalidLevel { perk: Perk, level: u8, max: u8 },
}

/// Errors raised while loading balance configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(&'static str),
}

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("stored data for key {key:?} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode data for key {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
