use serde::{Deserialize, Serialize};

use fathom_core::{Actor, HUNGER_MAX, safe_div};

use super::stamina::effective_max_stamina;
use crate::error::{MechResult, ensure_non_negative};

/// Tuning for hunger drain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HungerConfig {
    /// Movement factor of an idle actor.
    pub idle_fraction: f32,
    /// Speeds at or below this count as idle.
    pub idle_speed: f32,
    /// Upper bound of the movement factor.
    pub max_movement_factor: f32,
    /// Movement factor multiplier while dashing.
    pub dash_multiplier: f32,
}

impl Default for HungerConfig {
    fn default() -> Self {
        Self {
            idle_fraction: 0.35,
            idle_speed: 4.0,
            max_movement_factor: 1.6,
            dash_multiplier: 1.5,
        }
    }
}

impl HungerConfig {
    /// Check every value is usable.
    pub fn validate(&self) -> MechResult<()> {
        ensure_non_negative("hunger.idle_fraction", self.idle_fraction)?;
        ensure_non_negative("hunger.idle_speed", self.idle_speed)?;
        ensure_non_negative("hunger.max_movement_factor", self.max_movement_factor)?;
        ensure_non_negative("hunger.dash_multiplier", self.dash_multiplier)
    }
}

/// Per-call movement information.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HungerUpdate {
    /// Current speed of the actor.
    pub speed: f32,
    /// Speed that counts as a movement factor of 1.
    pub max_speed: f32,
}

/// Hunger drain multiplier for the given movement.
pub fn movement_factor(config: &HungerConfig, update: HungerUpdate, dashing: bool) -> f32 {
    if update.speed <= config.idle_speed {
        return config.idle_fraction;
    }
    let mut factor = safe_div(update.speed, update.max_speed.max(0.0));
    if dashing {
        factor *= config.dash_multiplier;
    }
    let upper = config.max_movement_factor.max(config.idle_fraction);
    factor.clamp(config.idle_fraction, upper)
}

/// Drain hunger for `dt` seconds of movement. Returns the amount drained.
///
/// Stamina is re-clamped to the lowered ceiling.
pub fn update_hunger<A: Actor + ?Sized>(
    actor: &mut A,
    dt: f32,
    config: &HungerConfig,
    update: HungerUpdate,
) -> f32 {
    let vitals = actor.vitals_mut();
    let factor = movement_factor(config, update, vitals.is_dashing);
    let before = vitals.hunger;
    let drain = vitals.hunger_drain_rate.max(0.0) * factor * dt.max(0.0);
    vitals.hunger = (vitals.hunger - drain).clamp(0.0, HUNGER_MAX);

    let ceiling = effective_max_stamina(vitals.base_max_stamina, vitals.hunger);
    vitals.stamina = vitals.stamina.clamp(0.0, ceiling);
    before - vitals.hunger
}

/// Restore hunger from eating, clamped to the top of the scale.
pub fn restore_hunger<A: Actor + ?Sized>(actor: &mut A, amount: f32) {
    let vitals = actor.vitals_mut();
    vitals.hunger = (vitals.hunger + amount.max(0.0)).clamp(0.0, HUNGER_MAX);
}

/// Starved: hunger is gone or the stamina ceiling has collapsed to zero.
pub fn is_starved<A: Actor + ?Sized>(actor: &A) -> bool {
    let vitals = actor.vitals();
    vitals.hunger <= 0.0 || effective_max_stamina(vitals.base_max_stamina, vitals.hunger) <= 0.0
}
