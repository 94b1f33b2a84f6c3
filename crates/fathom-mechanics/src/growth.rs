//! Diminishing-returns growth from eating.
//!
//! The same curve governs growth from a direct kill and from collecting meat
//! chunks, so eating something much smaller is worth proportionally less.

use serde::{Deserialize, Serialize};

use fathom_core::{Actor, MAX_SIZE, safe_div};

use crate::error::{MechResult, ensure_non_negative};

/// Tuning of the growth curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Fraction of the prey's size gained at efficiency 1.
    pub size_gain_ratio: f32,
    /// Steepness of the diminishing-returns curve.
    pub efficiency_constant: f32,
    /// Floor of the efficiency.
    pub min_efficiency: f32,
    /// Hunger restored per unit of prey size.
    pub hunger_per_size: f32,
    /// Size ceiling.
    pub max_size: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            size_gain_ratio: 0.2,
            efficiency_constant: 0.5,
            min_efficiency: 0.1,
            hunger_per_size: 1.0,
            max_size: MAX_SIZE,
        }
    }
}

impl GrowthConfig {
    /// Check every value is usable.
    pub fn validate(&self) -> MechResult<()> {
        ensure_non_negative("growth.size_gain_ratio", self.size_gain_ratio)?;
        ensure_non_negative("growth.efficiency_constant", self.efficiency_constant)?;
        ensure_non_negative("growth.min_efficiency", self.min_efficiency)?;
        ensure_non_negative("growth.hunger_per_size", self.hunger_per_size)?;
        ensure_non_negative("growth.max_size", self.max_size)
    }
}

/// `max(min_efficiency, 1 / (1 + (eater/prey) × k))`.
pub fn efficiency(eater_size: f32, prey_size: f32, config: &GrowthConfig) -> f32 {
    let ratio = safe_div(eater_size, prey_size);
    let curve = safe_div(1.0, 1.0 + ratio * config.efficiency_constant);
    curve.max(config.min_efficiency)
}

/// Size an eater of `eater_size` gains from prey of `prey_size`.
pub fn growth_from_prey(eater_size: f32, prey_size: f32, config: &GrowthConfig) -> f32 {
    prey_size.max(0.0) * config.size_gain_ratio * efficiency(eater_size, prey_size, config)
}

/// Hunger restored by eating prey of `prey_size`.
pub fn hunger_from_prey(prey_size: f32, config: &GrowthConfig) -> f32 {
    prey_size.max(0.0) * config.hunger_per_size
}

/// Grow an actor, capped at the size ceiling. Max health scales with size and
/// the added capacity is healed. Returns the size actually gained.
pub fn apply_growth<A: Actor + ?Sized>(actor: &mut A, amount: f32, config: &GrowthConfig) -> f32 {
    let before = actor.size();
    let after = (before + amount.max(0.0)).clamp(0.0, config.max_size);
    actor.body_mut().size = after;

    if before > 0.0 && after > before {
        let vitals = actor.vitals_mut();
        let new_max = vitals.max_health * (after / before);
        let added = new_max - vitals.max_health;
        vitals.max_health = new_max;
        vitals.health = (vitals.health + added).clamp(0.0, new_max);
    }
    after - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::{Player, Vec2, Vitals};

    #[test]
    fn efficiency_falls_with_size_gap() {
        let config = GrowthConfig::default();
        let even = efficiency(20.0, 20.0, &config);
        let double = efficiency(40.0, 20.0, &config);
        let huge = efficiency(400.0, 2.0, &config);
        assert!((even - 1.0 / 1.5).abs() < 1e-6);
        assert!((double - 0.5).abs() < 1e-6);
        assert!((huge - 0.1).abs() < 1e-6);
    }

    #[test]
    fn growth_matches_formula() {
        let config = GrowthConfig::default();
        let g = growth_from_prey(40.0, 20.0, &config);
        assert!((g - 20.0 * 0.2 * 0.5).abs() < 1e-6);
    }

    #[test]
    fn growth_caps_and_scales_health() {
        let config = GrowthConfig {
            max_size: 25.0,
            ..GrowthConfig::default()
        };
        let mut p = Player::new(Vec2::ZERO, 20.0, Vitals::full(100.0, 1.0, 100.0));
        p.vitals.health = 50.0;
        let gained = apply_growth(&mut p, 10.0, &config);
        assert!((gained - 5.0).abs() < 1e-6);
        assert!((p.body.size - 25.0).abs() < 1e-6);
        assert!((p.vitals.max_health - 125.0).abs() < 1e-4);
        assert!((p.vitals.health - 75.0).abs() < 1e-4);
    }

    #[test]
    fn zero_prey_gives_nothing() {
        let config = GrowthConfig::default();
        assert_eq!(growth_from_prey(30.0, 0.0, &config), 0.0);
        assert_eq!(hunger_from_prey(-4.0, &config), 0.0);
    }
}
