//! Size-ratio combat resolution.
//!
//! Damage scales with the attacker's absolute size and, more steeply, with
//! its size relative to the target. The health-based model is authoritative;
//! the older stamina battle survives in [`legacy`] behind
//! [`CombatModel::StaminaBattle`].

pub mod legacy;

use serde::{Deserialize, Serialize};

use fathom_core::{Actor, safe_div};

use crate::error::{MechResult, ensure_non_negative};

/// Attacker size that deals exactly the base damage at an even matchup.
pub const REFERENCE_SIZE: f32 = 40.0;

/// Which combat rules the simulation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatModel {
    /// Bites deal size-scaled damage; zero health means death.
    #[default]
    HealthBased,
    /// Legacy: contact drains stamina; the loser is knocked out and eaten.
    StaminaBattle,
}

/// Combat timings and legacy-model tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Duration of the victim's hit flash.
    pub hit_flash_ms: f64,
    /// Duration of the attacker's attack flash.
    pub attack_flash_ms: f64,
    /// Duration of the attacker's forward lunge.
    pub lunge_ms: f64,
    /// Minimum time between two attacks by the same attacker.
    pub attack_cooldown_ms: f64,
    /// Attacker size at which damage is not scaled.
    pub reference_size: f32,
    /// Stamina drained per second by an equally sized opponent (legacy).
    pub battle_drain_rate: f32,
    /// Time after which an untouched knocked-out fish recovers (legacy).
    pub knockout_recovery_ms: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            hit_flash_ms: 180.0,
            attack_flash_ms: 220.0,
            lunge_ms: 140.0,
            attack_cooldown_ms: 450.0,
            reference_size: REFERENCE_SIZE,
            battle_drain_rate: 35.0,
            knockout_recovery_ms: 3000.0,
        }
    }
}

impl CombatConfig {
    /// Check every value is usable.
    pub fn validate(&self) -> MechResult<()> {
        ensure_non_negative("combat.hit_flash_ms", self.hit_flash_ms as f32)?;
        ensure_non_negative("combat.attack_flash_ms", self.attack_flash_ms as f32)?;
        ensure_non_negative("combat.lunge_ms", self.lunge_ms as f32)?;
        ensure_non_negative("combat.attack_cooldown_ms", self.attack_cooldown_ms as f32)?;
        ensure_non_negative("combat.reference_size", self.reference_size)?;
        ensure_non_negative("combat.battle_drain_rate", self.battle_drain_rate)
    }
}

/// Result of a single bite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Health removed (before clamping to the remaining health).
    pub damage: u32,
    /// The bite took the target from positive health to zero.
    pub died: bool,
    /// Damage beyond what was needed to kill.
    pub overkill: u32,
}

/// Damage multiplier for an attacker/target size ratio.
///
/// Soft-capped above 2.0; a small attacker against a big target is halved.
pub fn size_ratio_multiplier(ratio: f32) -> f32 {
    if ratio >= 2.0 {
        2.0 + (ratio - 2.0) * 0.5
    } else if ratio >= 1.5 {
        1.5
    } else if ratio >= 1.2 {
        1.2
    } else if ratio >= 0.8 {
        1.0
    } else {
        0.5
    }
}

/// Integer damage for a bite between the given sizes.
pub fn compute_damage(base_damage: f32, attacker_size: f32, target_size: f32, reference_size: f32) -> u32 {
    let ratio = safe_div(attacker_size, target_size);
    let scale = safe_div(attacker_size, reference_size);
    let raw = base_damage * scale * size_ratio_multiplier(ratio);
    if raw.is_finite() {
        raw.max(0.0).round() as u32
    } else {
        0
    }
}

/// Whether the attacker's cooldown has elapsed at `now_ms`.
///
/// The cooldown is measured from the start of the last attack flash.
pub fn can_attack<A: Actor + ?Sized>(attacker: &A, now_ms: f64, config: &CombatConfig) -> bool {
    match attacker.timers().attack_flash_until {
        None => true,
        Some(until) => now_ms >= until - config.attack_flash_ms + config.attack_cooldown_ms,
    }
}

/// Apply one bite from `attacker` to `target`.
pub fn resolve_attack<A, T>(
    attacker: &mut A,
    target: &mut T,
    base_damage: f32,
    now_ms: f64,
    config: &CombatConfig,
) -> AttackOutcome
where
    A: Actor + ?Sized,
    T: Actor + ?Sized,
{
    let damage = compute_damage(base_damage, attacker.size(), target.size(), config.reference_size);

    let vitals = target.vitals_mut();
    let before = vitals.health;
    vitals.health = (vitals.health - damage as f32).max(0.0);
    let died = before > 0.0 && vitals.health <= 0.0;
    let overkill = if died {
        (damage as f32 - before).max(0.0).round() as u32
    } else {
        0
    };

    target.timers_mut().hit_flash_until = Some(now_ms + config.hit_flash_ms);
    let timers = attacker.timers_mut();
    timers.attack_flash_until = Some(now_ms + config.attack_flash_ms);
    timers.lunge_until = Some(now_ms + config.lunge_ms);

    AttackOutcome {
        damage,
        died,
        overkill,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::{CreatureClass, CreatureTemplate, Fish, Player, Vec2, Vitals};
    use proptest::prelude::*;

    fn player(size: f32) -> Player {
        Player::new(Vec2::ZERO, size, Vitals::full(100.0, 1.0, 100.0))
    }

    fn fish(size: f32, health: f32) -> Fish {
        let t = CreatureTemplate::new("test", CreatureClass::Prey, size, 80.0).with_health(health);
        Fish::spawn(t, Vec2::ZERO, 0.0, 0.0)
    }

    #[test]
    fn multiplier_table() {
        assert_eq!(size_ratio_multiplier(3.0), 2.5);
        assert_eq!(size_ratio_multiplier(2.0), 2.0);
        assert_eq!(size_ratio_multiplier(1.6), 1.5);
        assert_eq!(size_ratio_multiplier(1.2), 1.2);
        assert_eq!(size_ratio_multiplier(1.0), 1.0);
        assert_eq!(size_ratio_multiplier(0.79), 0.5);
    }

    #[test]
    fn double_size_example_deals_twenty() {
        let mut attacker = player(40.0);
        let mut target = fish(20.0, 100.0);
        let outcome = resolve_attack(&mut attacker, &mut target, 10.0, 0.0, &CombatConfig::default());
        assert_eq!(outcome.damage, 20);
        assert!(!outcome.died);
        assert!((target.vitals().health - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn killing_blow_reports_overkill() {
        let mut attacker = player(80.0);
        let mut target = fish(20.0, 10.0);
        let outcome = resolve_attack(&mut attacker, &mut target, 10.0, 0.0, &CombatConfig::default());
        assert!(outcome.died);
        assert_eq!(target.vitals().health, 0.0);
        assert_eq!(outcome.overkill, outcome.damage - 10);
    }

    #[test]
    fn already_dead_target_does_not_die_twice() {
        let mut attacker = player(40.0);
        let mut target = fish(40.0, 10.0);
        target.vitals_mut().health = 0.0;
        let outcome = resolve_attack(&mut attacker, &mut target, 10.0, 0.0, &CombatConfig::default());
        assert!(!outcome.died);
        assert_eq!(outcome.overkill, 0);
    }

    #[test]
    fn attack_stamps_timers() {
        let config = CombatConfig::default();
        let mut attacker = player(40.0);
        let mut target = fish(40.0, 100.0);
        resolve_attack(&mut attacker, &mut target, 5.0, 1000.0, &config);
        assert_eq!(target.timers.hit_flash_until, Some(1180.0));
        assert_eq!(attacker.timers.attack_flash_until, Some(1220.0));
        assert_eq!(attacker.timers.lunge_until, Some(1140.0));
    }

    #[test]
    fn cooldown_follows_attack_flash() {
        let config = CombatConfig::default();
        let mut attacker = player(40.0);
        assert!(can_attack(&attacker, 0.0, &config));
        let mut target = fish(40.0, 100.0);
        resolve_attack(&mut attacker, &mut target, 5.0, 1000.0, &config);
        assert!(!can_attack(&attacker, 1200.0, &config));
        assert!(can_attack(&attacker, 1450.0, &config));
    }

    #[test]
    fn zero_sized_target_is_safe() {
        let dmg = compute_damage(10.0, 40.0, 0.0, REFERENCE_SIZE);
        assert!(dmg > 0);
    }

    proptest! {
        #[test]
        fn double_size_beats_even_match(base in 5.0f32..50.0, target in 10.0f32..150.0) {
            let even = compute_damage(base, target, target, REFERENCE_SIZE);
            let double = compute_damage(base, target * 2.0, target, REFERENCE_SIZE);
            prop_assert!(double > even);
        }

        #[test]
        fn health_never_negative(base in 0.0f32..500.0, size in 1.0f32..300.0, health in 1.0f32..500.0) {
            let mut attacker = player(size);
            let mut victim = fish(30.0, health);
            let outcome = resolve_attack(&mut attacker, &mut victim, base, 0.0, &CombatConfig::default());
            let expected = (health - outcome.damage as f32).max(0.0);
            prop_assert!((victim.vitals().health - expected).abs() < 1e-3);
        }
    }
}
