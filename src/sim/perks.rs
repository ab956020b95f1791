//! Perk configuration
//!
//! The player owns a `PerkSet` (one level per perk). Every shot carries a
//! `ProjectilePerks` snapshot taken when it was fired.

use serde::{Deserialize, Serialize};

use super::status::StatusKind;
use crate::error::UpgradeError;

/// Projectile-modifying perks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Perk {
    Split,
    Homing,
    Bounce,
    Piercing,
    Fire,
    Ice,
    Lightning,
    Poison,
}

impl Perk {
    pub const ALL: [Perk; 8] = [
        Perk::Split,
        Perk::Homing,
        Perk::Bounce,
        Perk::Piercing,
        Perk::Fire,
        Perk::Ice,
        Perk::Lightning,
        Perk::Poison,
    ];

    fn index(self) -> usize {
        match self {
            Perk::Split => 0,
            Perk::Homing => 1,
            Perk::Bounce => 2,
            Perk::Piercing => 3,
            Perk::Fire => 4,
            Perk::Ice => 5,
            Perk::Lightning => 6,
            Perk::Poison => 7,
        }
    }

    /// Highest level this perk can reach
    pub fn max_level(self) -> u8 {
        match self {
            Perk::Split | Perk::Homing => 1,
            Perk::Bounce | Perk::Piercing => 3,
            Perk::Fire | Perk::Ice | Perk::Lightning | Perk::Poison => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Perk::Split => "Split",
            Perk::Homing => "Homing",
            Perk::Bounce => "Bounce",
            Perk::Piercing => "Piercing",
            Perk::Fire => "Fire",
            Perk::Ice => "Ice",
            Perk::Lightning => "Lightning",
            Perk::Poison => "Poison",
        }
    }

    /// Status inflicted on hit at the given level: (kind, duration, magnitude).
    ///
    /// Level 0 is treated as level 1 since a shot only carries an elemental
    /// flag when the perk was active.
    pub fn status_for_level(self, level: u8) -> Option<(StatusKind, f32, f32)> {
        let upgraded = level >= 2;
        match self {
            Perk::Fire if upgraded => Some((StatusKind::Burn, 4.0, 7.0)),
            Perk::Fire => Some((StatusKind::Burn, 2.5, 4.0)),
            // 70% slow
            Perk::Ice if upgraded => Some((StatusKind::Slow, 4.0, 0.3)),
            Perk::Ice => Some((StatusKind::Slow, 2.5, 0.5)),
            Perk::Poison if upgraded => Some((StatusKind::Poison, 6.0, 4.0)),
            Perk::Poison => Some((StatusKind::Poison, 4.0, 2.0)),
            _ => None,
        }
    }
}

/// Lightning chain reach at a level: (hops, damage fraction per hop)
pub fn lightning_chain(level: u8) -> (usize, f32) {
    if level >= 2 { (2, 0.85) } else { (1, 0.7) }
}

/// Per-perk levels owned by the player (0 = inactive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerkSet {
    levels: [u8; 8],
}

impl PerkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, perk: Perk) -> u8 {
        self.levels[perk.index()]
    }

    pub fn is_active(&self, perk: Perk) -> bool {
        self.level(perk) > 0
    }

    pub fn is_maxed(&self, perk: Perk) -> bool {
        self.level(perk) >= perk.max_level()
    }

    /// Set a perk level directly, rejecting levels the perk does not have
    pub fn set_level(&mut self, perk: Perk, level: u8) -> Result<(), UpgradeError> {
        let max = perk.max_level();
        if level > max {
            return Err(UpgradeError::InvalidLevel { perk, level, max });
        }
        self.levels[perk.index()] = level;
        Ok(())
    }

    /// Raise a perk by one level, returning the new level
    pub fn raise(&mut self, perk: Perk) -> Result<u8, UpgradeError> {
        if self.is_maxed(perk) {
            return Err(UpgradeError::PerkMaxed {
                perk,
                max: perk.max_level(),
            });
        }
        let level = self.level(perk) + 1;
        self.levels[perk.index()] = level;
        Ok(level)
    }

    /// Snapshot the active perks for a new shot
    pub fn snapshot(&self) -> ProjectilePerks {
        ProjectilePerks {
            split: self.is_active(Perk::Split),
            homing: self.is_active(Perk::Homing),
            max_bounces: self.level(Perk::Bounce),
            max_pierce: self.level(Perk::Piercing),
            fire: self.is_active(Perk::Fire),
            ice: self.is_active(Perk::Ice),
            lightning: self.is_active(Perk::Lightning),
            poison: self.is_active(Perk::Poison),
            lightning_level: self.level(Perk::Lightning).max(1),
        }
    }
}

/// Perk options carried by a single projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectilePerks {
    pub split: bool,
    pub homing: bool,
    /// Wall bounces allowed (0 = no bounce)
    pub max_bounces: u8,
    /// Extra enemies the shot may pass through (0 = no piercing)
    pub max_pierce: u8,
    pub fire: bool,
    pub ice: bool,
    pub lightning: bool,
    pub poison: bool,
    pub lightning_level: u8,
}

impl Default for ProjectilePerks {
    fn default() -> Self {
        Self::NONE
    }
}

impl ProjectilePerks {
    pub const NONE: ProjectilePerks = ProjectilePerks {
        split: false,
        homing: false,
        max_bounces: 0,
        max_pierce: 0,
        fire: false,
        ice: false,
        lightning: false,
        poison: false,
        lightning_level: 1,
    };

    /// Elemental perks that inflict a status on hit, in application order
    pub fn status_perks(&self) -> impl Iterator<Item = Perk> + '_ {
        [(Perk::Fire, self.fire), (Perk::Ice, self.ice), (Perk::Poison, self.poison)]
            .into_iter()
            .filter_map(|(perk, on)| on.then_some(perk))
    }
}
