use serde::{Deserialize, Serialize};

use fathom_core::{Actor, HUNGER_MAX};

use crate::error::{MechResult, ensure_non_negative};

/// Tuning for stamina drain and regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    /// Stamina drained per second while dashing, before multipliers.
    pub drain_rate: f32,
    /// Stamina regained per second while not dashing.
    pub regen_rate: f32,
    /// Fraction of the ceiling below which recovery is boosted.
    pub exhaustion_threshold: f32,
    /// Regeneration multiplier below the exhaustion threshold.
    pub exhaustion_recovery_multiplier: f32,
    /// Seconds of continuous dashing until the drain ramp peaks.
    pub ramp_seconds: f32,
    /// Drain multiplier at the peak of the ramp.
    pub ramp_max: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            drain_rate: 30.0,
            regen_rate: 14.0,
            exhaustion_threshold: 0.25,
            exhaustion_recovery_multiplier: 1.6,
            ramp_seconds: 1.5,
            ramp_max: 1.75,
        }
    }
}

impl StaminaConfig {
    /// Check every rate is usable.
    pub fn validate(&self) -> MechResult<()> {
        ensure_non_negative("stamina.drain_rate", self.drain_rate)?;
        ensure_non_negative("stamina.regen_rate", self.regen_rate)?;
        ensure_non_negative("stamina.exhaustion_threshold", self.exhaustion_threshold)?;
        ensure_non_negative(
            "stamina.exhaustion_recovery_multiplier",
            self.exhaustion_recovery_multiplier,
        )?;
        ensure_non_negative("stamina.ramp_seconds", self.ramp_seconds)?;
        ensure_non_negative("stamina.ramp_max", self.ramp_max)
    }

    /// Drain multiplier after `dash_seconds` of continuous dashing.
    pub fn ramp_multiplier(&self, dash_seconds: f32) -> f32 {
        if self.ramp_seconds <= 0.0 {
            return self.ramp_max.max(1.0);
        }
        let t = (dash_seconds / self.ramp_seconds).clamp(0.0, 1.0);
        1.0 + (self.ramp_max - 1.0) * t
    }
}

/// Per-call drain modifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaminaUpdate {
    /// Grows the longer a dash lasts.
    pub ramp_multiplier: f32,
    /// Applied while dashing away from a threat.
    pub flee_multiplier: f32,
}

impl Default for StaminaUpdate {
    fn default() -> Self {
        Self {
            ramp_multiplier: 1.0,
            flee_multiplier: 1.0,
        }
    }
}

/// What happened to stamina during an update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StaminaReport {
    /// Stamina is at zero after the update.
    pub depleted: bool,
    /// Stamina is at its (possibly zero) ceiling after the update.
    pub at_ceiling: bool,
}

/// Stamina ceiling for a given hunger level. Hunger caps the ceiling; it
/// never drains stamina directly.
pub fn effective_max_stamina(base_max_stamina: f32, hunger: f32) -> f32 {
    base_max_stamina.max(0.0) * (hunger.clamp(0.0, HUNGER_MAX) / HUNGER_MAX)
}

/// Current stamina ceiling of an actor.
pub fn stamina_ceiling<A: Actor + ?Sized>(actor: &A) -> f32 {
    let v = actor.vitals();
    effective_max_stamina(v.base_max_stamina, v.hunger)
}

/// Drain stamina while dashing, otherwise regenerate toward the ceiling.
///
/// Dashing with no stamina left is cancelled and regenerates instead.
pub fn update_stamina<A: Actor + ?Sized>(
    actor: &mut A,
    dt: f32,
    config: &StaminaConfig,
    update: StaminaUpdate,
) -> StaminaReport {
    let dt = dt.max(0.0);
    let vitals = actor.vitals_mut();
    let ceiling = effective_max_stamina(vitals.base_max_stamina, vitals.hunger);

    if vitals.is_dashing && vitals.stamina > 0.0 {
        let drain = config.drain_rate * update.ramp_multiplier * update.flee_multiplier * dt;
        vitals.stamina -= drain;
        if vitals.stamina <= 0.0 {
            vitals.stamina = 0.0;
            vitals.is_dashing = false;
        }
    } else {
        vitals.is_dashing = false;
        if vitals.stamina < ceiling {
            let boosted = vitals.stamina < ceiling * config.exhaustion_threshold;
            let rate = if boosted {
                config.regen_rate * config.exhaustion_recovery_multiplier
            } else {
                config.regen_rate
            };
            vitals.stamina += rate * dt;
        }
    }

    vitals.stamina = vitals.stamina.clamp(0.0, ceiling);
    StaminaReport {
        depleted: vitals.stamina <= 0.0,
        at_ceiling: vitals.stamina >= ceiling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::{Player, Vec2, Vitals};

    fn player(stamina: f32, hunger: f32, dashing: bool) -> Player {
        let mut vitals = Vitals::full(100.0, 1.0, 100.0);
        vitals.stamina = stamina;
        vitals.hunger = hunger;
        vitals.is_dashing = dashing;
        Player::new(Vec2::ZERO, 20.0, vitals)
    }

    #[test]
    fn ceiling_scales_with_hunger() {
        assert!((effective_max_stamina(100.0, 50.0) - 50.0).abs() < 1e-5);
        assert_eq!(effective_max_stamina(100.0, 0.0), 0.0);
        assert!((effective_max_stamina(100.0, 150.0) - 100.0).abs() < 1e-5);
    }

    #[test]
    fn dashing_drains_with_multipliers() {
        let config = StaminaConfig::default();
        let mut p = player(80.0, 100.0, true);
        update_stamina(
            &mut p,
            0.5,
            &config,
            StaminaUpdate {
                ramp_multiplier: 2.0,
                flee_multiplier: 1.5,
            },
        );
        let expected = 80.0 - 30.0 * 2.0 * 1.5 * 0.5;
        assert!((p.vitals.stamina - expected).abs() < 1e-4);
        assert!(p.vitals.is_dashing);
    }

    #[test]
    fn dash_ends_when_stamina_runs_out() {
        let config = StaminaConfig::default();
        let mut p = player(1.0, 100.0, true);
        let report = update_stamina(&mut p, 1.0, &config, StaminaUpdate::default());
        assert!(report.depleted);
        assert_eq!(p.vitals.stamina, 0.0);
        assert!(!p.vitals.is_dashing);
    }

    #[test]
    fn recovery_is_boosted_when_low() {
        let config = StaminaConfig::default();
        let mut low = player(10.0, 100.0, false);
        let mut high = player(60.0, 100.0, false);
        update_stamina(&mut low, 1.0, &config, StaminaUpdate::default());
        update_stamina(&mut high, 1.0, &config, StaminaUpdate::default());
        let low_gain = low.vitals.stamina - 10.0;
        let high_gain = high.vitals.stamina - 60.0;
        assert!((low_gain - 14.0 * 1.6).abs() < 1e-4);
        assert!((high_gain - 14.0).abs() < 1e-4);
    }

    #[test]
    fn regeneration_stops_at_hunger_ceiling() {
        let config = StaminaConfig::default();
        let mut p = player(39.0, 40.0, false);
        let report = update_stamina(&mut p, 5.0, &config, StaminaUpdate::default());
        assert!((p.vitals.stamina - 40.0).abs() < 1e-5);
        assert!(report.at_ceiling);
    }

    #[test]
    fn ramp_multiplier_saturates() {
        let config = StaminaConfig::default();
        assert!((config.ramp_multiplier(0.0) - 1.0).abs() < 1e-6);
        assert!((config.ramp_multiplier(10.0) - 1.75).abs() < 1e-6);
        assert!(config.ramp_multiplier(0.75) > 1.0);
    }

    #[test]
    fn negative_rates_fail_validation() {
        let config = StaminaConfig {
            regen_rate: -1.0,
            ..StaminaConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(StaminaConfig::default().validate().is_ok());
    }
}
