//! Per-frame entity simulation for Fathom.
//!
//! A [`Simulation`] owns the [`Ocean`](state::Ocean) and runs a fixed
//! pipeline of systems once per rendered frame: player steering, spawning,
//! presence lifecycle, AI, combat, and the loot economy. Rendering, audio and
//! input devices stay outside; they hand in an [`InputFrame`] and a frame
//! timestamp and read back the world state and visual events. Run progress
//! goes through an injected [`RunStore`].

/// AI decision-making: chase, flee, wander, exhaustion.
pub mod ai;
/// Frame clock with clamped steps.
pub mod clock;
/// Contact combat and death processing.
pub mod combat;
/// Tuning for every system.
pub mod config;
/// Mutable context passed to systems each frame.
pub mod context;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Player intent for one frame.
pub mod input;
/// Fade-in, despawn scheduling, fade-out, knockout recovery.
pub mod lifecycle;
/// Carcasses, chunks, and collection.
pub mod loot;
/// Shared kinematics helpers.
pub mod motion;
/// Player steering and resources.
pub mod player;
/// Top-level simulation orchestrator.
pub mod simulation;
/// Initial population and respawning.
pub mod spawn;
/// World state owned by a run.
pub mod state;
/// Run statistics and milestone callbacks.
pub mod stats;
/// Persistence collaborator.
pub mod store;
/// The trait that all simulation systems implement.
pub mod system;

#[cfg(test)]
mod testkit;

/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-export of [`context::SimContext`].
pub use context::SimContext;
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of the event types.
pub use event::{Combatant, EventLog, SimEvent, SimEventKind};
/// Re-exports of [`input::Control`] and [`input::InputFrame`].
pub use input::{Control, InputFrame};
/// Re-exports of [`simulation::Simulation`] and [`simulation::RunEnd`].
pub use simulation::{RunEnd, Simulation};
/// Re-export of [`state::Ocean`].
pub use state::Ocean;
/// Re-exports of the stats and callback types.
pub use stats::{NoCallbacks, RunCallbacks, RunStats};
/// Re-exports of the persistence types.
pub use store::{MemoryStore, RunRecord, RunStore, StoreError};
/// Re-export of [`system::System`].
pub use system::System;
