//! Timed per-enemy modifiers (burn, poison, slow)

use serde::{Deserialize, Serialize};

/// Status effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    /// Damage over time (hp per second)
    Burn,
    /// Movement speed multiplier
    Slow,
    /// Damage over time (hp per second)
    Poison,
}

/// An active status effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Seconds left
    pub remaining: f32,
    /// Damage per second for burn/poison, speed multiplier for slow
    pub magnitude: f32,
}

/// Result of advancing statuses by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusTick {
    /// Total damage dealt this tick
    pub damage: f32,
    /// Product of all active slow multipliers (1.0 = unaffected)
    pub speed_mod: f32,
}

/// Set of statuses on one enemy; at most one entry per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a status. An existing entry of the same kind is refreshed with
    /// the new duration and magnitude instead of stacking.
    pub fn apply(&mut self, kind: StatusKind, duration: f32, magnitude: f32) {
        if let Some(existing) = self.effects.iter_mut().find(|s| s.kind == kind) {
            existing.remaining = duration;
            existing.magnitude = magnitude;
        } else {
            self.effects.push(StatusEffect {
                kind,
                remaining: duration,
                magnitude,
            });
        }
    }

    /// Advance every effect by `dt`, removing the expired ones.
    ///
    /// Walks the list back to front so removal keeps earlier indices valid.
    /// An effect contributes for the tick in which it expires.
    pub fn tick(&mut self, dt: f32) -> StatusTick {
        let mut result = StatusTick {
            damage: 0.0,
            speed_mod: 1.0,
        };
        for i in (0..self.effects.len()).rev() {
            let effect = &mut self.effects[i];
            effect.remaining -= dt;
            match effect.kind {
                StatusKind::Burn | StatusKind::Poison => result.damage += effect.magnitude * dt,
                StatusKind::Slow => result.speed_mod *= effect.magnitude,
            }
            if effect.remaining <= 0.0 {
                self.effects.remove(i);
            }
        }
        result
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|s| s.kind == kind)
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reapply_refreshes_instead_of_stacking() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusKind::Burn, 2.5, 4.0);
        statuses.tick(0.5);
        statuses.apply(StatusKind::Burn, 4.0, 7.0);

        assert_eq!(statuses.len(), 1);
        let burn = statuses.get(StatusKind::Burn).unwrap();
        assert_eq!(burn.remaining, 4.0);
        assert_eq!(burn.magnitude, 7.0);
    }

    #[test]
    fn test_slows_compound() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusKind::Slow, 2.0, 0.5);
        let tick = statuses.tick(0.1);
        assert!((tick.speed_mod - 0.5).abs() < 1e-6);
        assert_eq!(tick.damage, 0.0);
    }

    #[test]
    fn test_damage_sums_burn_and_poison() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusKind::Burn, 2.0, 4.0);
        statuses.apply(StatusKind::Poison, 2.0, 2.0);
        let tick = statuses.tick(0.5);
        assert!((tick.damage - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_expired_effects_removed() {
        let mut statuses = StatusEffects::new();
        statuses.apply(StatusKind::Burn, 0.1, 4.0);
        statuses.apply(StatusKind::Slow, 1.0, 0.5);
        statuses.tick(0.2);
        assert!(!statuses.has(StatusKind::Burn));
        assert!(statuses.has(StatusKind::Slow));
    }

    proptest! {
        #[test]
        fn prop_one_entry_per_kind(applications in proptest::collection::vec((0u8..3, 0.1f32..5.0, 0.1f32..10.0), 1..40)) {
            let mut statuses = StatusEffects::new();
            for (kind, duration, magnitude) in applications {
                let kind = match kind {
                    0 => StatusKind::Burn,
                    1 => StatusKind::Slow,
                    _ => StatusKind::Poison,
                };
                statuses.apply(kind, duration, magnitude);
            }
            prop_assert!(statuses.len() <= 3);
            for kind in [StatusKind::Burn, StatusKind::Slow, StatusKind::Poison] {
                prop_assert!(statuses.iter().filter(|s| s.kind == kind).count() <= 1);
            }
        }
    }
}
