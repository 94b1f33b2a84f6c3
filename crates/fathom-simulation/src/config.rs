use serde::{Deserialize, Serialize};

use fathom_mechanics::{
    CombatConfig, CombatModel, GrowthConfig, HungerConfig, MechError, MechResult, StaminaConfig,
};

use crate::ai::AiConfig;
use crate::loot::LootConfig;
use crate::motion::MotionConfig;
use crate::player::PlayerConfig;

/// Reject negative or non-finite tuning values.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> MechResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MechError::InvalidTuning {
            field,
            reason: format!("expected a finite value >= 0, got {value}"),
        })
    }
}

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Largest step a single frame may take.
    pub max_delta_ms: f64,
    /// Step used for the first frame.
    pub default_delta_ms: f64,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Which combat rules apply between fish.
    pub combat_model: CombatModel,
    /// Player handling.
    pub player: PlayerConfig,
    /// Stamina economy.
    pub stamina: StaminaConfig,
    /// Hunger economy.
    pub hunger: HungerConfig,
    /// Combat timings.
    pub combat: CombatConfig,
    /// Growth curve.
    pub growth: GrowthConfig,
    /// Fish behavior.
    pub ai: AiConfig,
    /// Carcass and chunk economy.
    pub loot: LootConfig,
    /// Facing, tilt and animation.
    pub motion: MotionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_delta_ms: 100.0,
            default_delta_ms: 1000.0 / 60.0,
            max_events: 2000,
            combat_model: CombatModel::default(),
            player: PlayerConfig::default(),
            stamina: StaminaConfig::default(),
            hunger: HungerConfig::default(),
            combat: CombatConfig::default(),
            growth: GrowthConfig::default(),
            ai: AiConfig::default(),
            loot: LootConfig::default(),
            motion: MotionConfig::default(),
        }
    }
}

impl SimConfig {
    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the largest step a single frame may take.
    pub fn with_max_delta_ms(mut self, ms: f64) -> Self {
        self.max_delta_ms = ms;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Choose the combat rules.
    pub fn with_combat_model(mut self, model: CombatModel) -> Self {
        self.combat_model = model;
        self
    }

    /// Replace the player tuning.
    pub fn with_player(mut self, player: PlayerConfig) -> Self {
        self.player = player;
        self
    }

    /// Replace the fish behavior tuning.
    pub fn with_ai(mut self, ai: AiConfig) -> Self {
        self.ai = ai;
        self
    }

    /// Replace the loot tuning.
    pub fn with_loot(mut self, loot: LootConfig) -> Self {
        self.loot = loot;
        self
    }

    /// Check every nested tuning block.
    pub fn validate(&self) -> MechResult<()> {
        if !self.max_delta_ms.is_finite() || self.max_delta_ms <= 0.0 {
            return Err(MechError::InvalidTuning {
                field: "max_delta_ms",
                reason: format!("expected a positive step, got {}", self.max_delta_ms),
            });
        }
        if !self.default_delta_ms.is_finite() || self.default_delta_ms < 0.0 {
            return Err(MechError::InvalidTuning {
                field: "default_delta_ms",
                reason: format!("expected a step >= 0, got {}", self.default_delta_ms),
            });
        }
        self.player.validate()?;
        self.motion.validate()?;
        self.stamina.validate()?;
        self.hunger.validate()?;
        self.combat.validate()?;
        self.growth.validate()?;
        self.ai.validate()?;
        self.loot.validate()
    }
}
