//! Stamina and hunger: the resource economy every actor runs on.
//!
//! Hunger sets the stamina ceiling (`base × hunger / 100`), dashing drains
//! stamina, and resting regenerates it. All functions are pure updates on an
//! [`Actor`](fathom_core::Actor) given a time step in seconds.

mod hunger;
mod stamina;

pub use hunger::{HungerConfig, HungerUpdate, is_starved, movement_factor, restore_hunger, update_hunger};
pub use stamina::{
    StaminaConfig, StaminaReport, StaminaUpdate, effective_max_stamina, stamina_ceiling,
    update_stamina,
};
