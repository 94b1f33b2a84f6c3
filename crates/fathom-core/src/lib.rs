//! Core types for Fathom.
//!
//! Holds the data model shared by the mechanics and the simulation: the
//! [`Actor`](actor::Actor) capability set, the player, fish with their
//! lifecycle state machine, carcass and chunk loot, and the read-only level
//! configuration. Nothing in this crate advances time.

/// Shared actor capability set: body, vitals, combat timers.
pub mod actor;
/// Unique entity identifiers.
pub mod entity;
/// Error types for the core crate.
pub mod error;
/// AI-controlled fish and the lifecycle state machine.
pub mod fish;
/// Vectors, bounds, and safe division.
pub mod geometry;
/// Level configuration: bounds, creature pool, spawn policy.
pub mod level;
/// Carcasses and collectible chunks.
pub mod loot;
/// The player-controlled creature.
pub mod player;

pub use actor::{Actor, Body, CombatTimers, Facing, HUNGER_MAX, MAX_SIZE, Vitals};
pub use entity::EntityId;
pub use error::{CoreError, CoreResult};
pub use fish::{AiMemory, Fish, Lifecycle};
pub use geometry::{Bounds, MIN_EPSILON, Vec2, safe_div};
pub use level::{CreatureClass, CreatureTemplate, DepthBand, EssenceYield, LevelConfig, SpawnPolicy};
pub use loot::{Carcass, Chunk, ChunkKind, bob_offset};
pub use player::Player;
