//! Upgrade offers and their application to the player

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::perks::Perk;
use super::player::Player;
use crate::consts::UPGRADE_OFFER_COUNT;
use crate::error::UpgradeError;
use crate::tuning::PetTuning;

/// Fire rate never drops below this many seconds between shots
const MIN_FIRE_RATE: f32 = 0.2;

/// A single upgrade the player can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Upgrade {
    /// Projectile speed ×1.2
    BulletSpeed,
    /// Fire interval ×0.85
    FireRate,
    ExtraPet,
    Perk(Perk),
}

impl Upgrade {
    /// Every upgrade, in presentation order
    pub fn all() -> impl Iterator<Item = Upgrade> {
        [Upgrade::BulletSpeed, Upgrade::FireRate, Upgrade::ExtraPet]
            .into_iter()
            .chain(Perk::ALL.into_iter().map(Upgrade::Perk))
    }

    /// Short label for an upgrade menu, reflecting the player's current stats
    pub fn describe(&self, player: &Player) -> String {
        match self {
            Upgrade::BulletSpeed => format!(
                "Bullet Speed +20% (now {})",
                (player.projectile_speed * 1.2).round()
            ),
            Upgrade::FireRate => "Fire Rate +15% (faster)".to_string(),
            Upgrade::ExtraPet => "+1 Pet Companion".to_string(),
            Upgrade::Perk(perk) => {
                let next = player.perks.level(*perk) + 1;
                if perk.max_level() > 1 {
                    format!("{} {}/{}", perk.name(), next, perk.max_level())
                } else {
                    perk.name().to_string()
                }
            }
        }
    }

    pub fn is_eligible(&self, player: &Player) -> bool {
        match self {
            Upgrade::Perk(perk) => !player.perks.is_maxed(*perk),
            _ => true,
        }
    }

    /// Apply to the player. Fails without changes if the perk is maxed.
    pub fn apply<R: Rng>(
        &self,
        player: &mut Player,
        pet_tuning: &PetTuning,
        rng: &mut R,
    ) -> Result<(), UpgradeError> {
        match self {
            Upgrade::BulletSpeed => {
                player.projectile_speed = (player.projectile_speed * 1.2).round();
            }
            Upgrade::FireRate => {
                let rate = (player.fire_rate * 0.85 * 100.0).round() / 100.0;
                player.fire_rate = rate.max(MIN_FIRE_RATE);
            }
            Upgrade::ExtraPet => {
                let angle = rng.random::<f32>() * std::f32::consts::TAU;
                player.add_pet(angle, pet_tuning);
            }
            Upgrade::Perk(perk) => {
                player.perks.raise(*perk)?;
            }
        }
        log::info!("Applied upgrade {self:?}");
        Ok(())
    }
}

/// Upgrades the player can currently take
pub fn eligible(player: &Player) -> Vec<Upgrade> {
    Upgrade::all().filter(|u| u.is_eligible(player)).collect()
}

/// Up to three distinct eligible upgrades in random order
pub fn generate_offer<R: Rng>(player: &Player, rng: &mut R) -> Vec<Upgrade> {
    let mut pool = eligible(player);
    pool.shuffle(rng);
    pool.truncate(UPGRADE_OFFER_COUNT);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::PlayerTuning;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn player() -> Player {
        Player::new(Vec2::new(100.0, 100.0), &PlayerTuning::default())
    }

    #[test]
    fn test_bullet_speed_rounds() {
        let mut p = player();
        let mut rng = Pcg32::seed_from_u64(0);
        Upgrade::BulletSpeed.apply(&mut p, &PetTuning::default(), &mut rng).unwrap();
        assert_eq!(p.projectile_speed, 384.0);
        Upgrade::BulletSpeed.apply(&mut p, &PetTuning::default(), &mut rng).unwrap();
        assert_eq!(p.projectile_speed, 461.0);
    }

    #[test]
    fn test_fire_rate_floor() {
        let mut p = player();
        let mut rng = Pcg32::seed_from_u64(0);
        Upgrade::FireRate.apply(&mut p, &PetTuning::default(), &mut rng).unwrap();
        assert!((p.fire_rate - 0.85).abs() < 1e-6);
        for _ in 0..30 {
            Upgrade::FireRate.apply(&mut p, &PetTuning::default(), &mut rng).unwrap();
        }
        assert_eq!(p.fire_rate, MIN_FIRE_RATE);
    }

    #[test]
    fn test_extra_pet_is_unbounded() {
        let mut p = player();
        let mut rng = Pcg32::seed_from_u64(0);
        for _ in 0..5 {
            Upgrade::ExtraPet.apply(&mut p, &PetTuning::default(), &mut rng).unwrap();
        }
        assert_eq!(p.pets.len(), 5);
        assert!(Upgrade::ExtraPet.is_eligible(&p));
    }

    #[test]
    fn test_maxed_perk_rejected_and_ineligible() {
        let mut p = player();
        let mut rng = Pcg32::seed_from_u64(0);
        let homing = Upgrade::Perk(Perk::Homing);
        homing.apply(&mut p, &PetTuning::default(), &mut rng).unwrap();
        assert!(!homing.is_eligible(&p));
        assert!(homing.apply(&mut p, &PetTuning::default(), &mut rng).is_err());
        assert!(!eligible(&p).contains(&homing));
    }

    #[test]
    fn test_offer_is_three_distinct_eligible() {
        let mut p = player();
        p.perks.set_level(Perk::Split, 1).unwrap();
        p.perks.set_level(Perk::Fire, 2).unwrap();
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..50 {
            let offer = generate_offer(&p, &mut rng);
            assert_eq!(offer.len(), 3);
            for (i, u) in offer.iter().enumerate() {
                assert!(u.is_eligible(&p));
                assert!(!offer[i + 1..].contains(u));
            }
        }
    }

    #[test]
    fn test_describe_shows_next_level() {
        let mut p = player();
        p.perks.set_level(Perk::Bounce, 1).unwrap();
        assert_eq!(Upgrade::Perk(Perk::Bounce).describe(&p), "Bounce 2/3");
        assert_eq!(Upgrade::Perk(Perk::Split).describe(&p), "Split");
        assert_eq!(Upgrade::BulletSpeed.describe(&p), "Bullet Speed +20% (now 384)");
    }
}
