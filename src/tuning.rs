//! Data-driven game balance
//!
//! Stock values live in the `Default` impls. A tuning file only needs the
//! fields it overrides; everything else falls back to the defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Player base stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub radius: f32,
    /// Movement speed (units per second)
    pub speed: f32,
    /// Seconds between shots
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub max_hp: f32,
    /// XP needed for the first level-up
    pub xp_for_first_level: u32,
    /// Gap kept between the player's edge and the arena edge
    pub bounds_margin: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 12.0,
            speed: 140.0,
            fire_rate: 1.0,
            projectile_speed: 320.0,
            projectile_damage: 25.0,
            max_hp: 100.0,
            xp_for_first_level: 10,
            bounds_margin: 8.0,
        }
    }
}

/// Pet companion stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetTuning {
    pub radius: f32,
    /// Orbit distance beyond the player's radius
    pub orbit_radius: f32,
    /// Orbit angular velocity (radians per second)
    pub orbit_speed: f32,
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub max_hp: f32,
}

impl Default for PetTuning {
    fn default() -> Self {
        Self {
            radius: 8.0,
            orbit_radius: 28.0,
            orbit_speed: 1.2,
            fire_rate: 1.8,
            projectile_speed: 280.0,
            projectile_damage: 20.0,
            max_hp: 30.0,
        }
    }
}

/// Wave pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Delay before the first spawn of a wave (seconds)
    pub start_delay: f32,
    /// Quota of wave 1
    pub base_quota: u32,
    /// Extra quota per wave
    pub quota_per_wave: u32,
    /// Spawn cooldown before wave scaling
    pub base_spawn_cooldown: f32,
    /// Cooldown reduction per wave index
    pub spawn_cooldown_per_wave: f32,
    pub min_spawn_cooldown: f32,
    /// Alive cap of wave 0 (grows by one every second wave)
    pub base_alive_cap: u32,
    pub max_alive_cap: u32,
    /// Largest burst spawned at once
    pub max_burst: u32,
    /// Warning shown before an enemy materializes (seconds)
    pub telegraph_time: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            start_delay: 1.0,
            base_quota: 6,
            quota_per_wave: 3,
            base_spawn_cooldown: 1.6,
            spawn_cooldown_per_wave: 0.08,
            min_spawn_cooldown: 0.5,
            base_alive_cap: 3,
            max_alive_cap: 10,
            max_burst: 2,
            telegraph_time: 0.75,
        }
    }
}

/// Obstacle layout generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    /// First wave that may have obstacles
    pub first_wave: u32,
    /// Chance per wave of getting a layout
    pub chance: f64,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            first_wave: 3,
            chance: 0.4,
        }
    }
}

/// Complete balance configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub pet: PetTuning,
    pub waves: WaveTuning,
    pub obstacles: ObstacleTuning,
}

impl Tuning {
    /// Parse a tuning file, filling unspecified fields with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player.fire_rate <= 0.0 || self.pet.fire_rate <= 0.0 {
            return Err(ConfigError::Invalid("fire rates must be positive"));
        }
        if self.player.radius <= 0.0 || self.pet.radius <= 0.0 {
            return Err(ConfigError::Invalid("radii must be positive"));
        }
        if self.player.xp_for_first_level == 0 {
            return Err(ConfigError::Invalid("xp_for_first_level must be positive"));
        }
        if self.waves.base_quota == 0 {
            return Err(ConfigError::Invalid("base_quota must be positive"));
        }
        if self.waves.max_burst == 0 {
            return Err(ConfigError::Invalid("max_burst must be positive"));
        }
        if self.waves.min_spawn_cooldown <= 0.0 {
            return Err(ConfigError::Invalid("min_spawn_cooldown must be positive"));
        }
        if !(0.0..=1.0).contains(&self.obstacles.chance) {
            return Err(ConfigError::Invalid("obstacle chance must be within [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "player": { "speed": 200.0 } }"#).unwrap();
        assert_eq!(tuning.player.speed, 200.0);
        assert_eq!(tuning.player.fire_rate, 1.0);
        assert_eq!(tuning.waves, WaveTuning::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = Tuning::from_json(r#"{ "player": { "fire_rate": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
