//! Game rules for Fathom.
//!
//! Pure functions over [`fathom_core::Actor`]s: the stamina/hunger resource
//! economy, size-ratio combat resolution (with the legacy stamina battle kept
//! as a disabled variant), and the diminishing-returns growth curve. Nothing
//! here owns state or reads a clock; callers pass `dt` and `now_ms`.

pub mod combat;
pub mod error;
pub mod growth;
pub mod resource;

pub use combat::{AttackOutcome, CombatConfig, CombatModel, can_attack, resolve_attack};
pub use error::{MechError, MechResult};
pub use growth::{GrowthConfig, apply_growth, efficiency, growth_from_prey};
pub use resource::{
    HungerConfig, HungerUpdate, StaminaConfig, StaminaReport, StaminaUpdate,
    effective_max_stamina, is_starved, restore_hunger, update_hunger, update_stamina,
};
