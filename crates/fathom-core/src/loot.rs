//! Carcasses and the collectible chunks scattered around them.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::geometry::Vec2;

/// A decaying marker left where a fish died.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carcass {
    /// Identity referenced by its chunks.
    pub id: EntityId,
    /// Species of the dead fish, for rendering.
    pub species: String,
    /// Center position.
    pub position: Vec2,
    /// Slow drift velocity.
    pub drift: Vec2,
    /// Size of the dead fish.
    pub size: f32,
    /// Creation time.
    pub spawned_ms: f64,
    /// Render opacity in `0..=1`.
    pub opacity: f32,
    /// Chunks not yet collected or expired.
    pub remaining_chunks: u32,
    /// Phase offset of the bob animation.
    pub bob_phase: f32,
}

impl Carcass {
    /// Time since creation.
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.spawned_ms).max(0.0)
    }

    /// Whether every chunk has been taken.
    pub fn is_picked_clean(&self) -> bool {
        self.remaining_chunks == 0
    }

    /// Whether the carcass has faded out.
    pub fn is_retired(&self) -> bool {
        self.opacity <= 0.0
    }
}

/// What a chunk grants when collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChunkKind {
    /// Grows the collector and restores hunger.
    Meat {
        /// Size gained.
        growth_amount: f32,
        /// Hunger restored.
        hunger_restore: f32,
    },
    /// Currency credited to the run record.
    Essence {
        /// Currency type.
        essence_type: String,
        /// Amount credited.
        amount: u32,
    },
}

/// A collectible loot fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Identity.
    pub id: EntityId,
    /// Payload.
    pub kind: ChunkKind,
    /// Center position.
    pub position: Vec2,
    /// Scatter velocity, decays with friction.
    pub velocity: Vec2,
    /// Render size.
    pub size: f32,
    /// Creation time.
    pub spawned_ms: f64,
    /// Originating carcass; may no longer exist.
    pub carcass: Option<EntityId>,
    /// Phase offset of the bob animation.
    pub bob_phase: f32,
    /// Render opacity in `0..=1`.
    pub opacity: f32,
    /// Set when collected or expired; purged at the end of the loot phase.
    pub retired: bool,
}

impl Chunk {
    /// Time since creation.
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.spawned_ms).max(0.0)
    }

    /// Whether the pickup grace delay has passed.
    pub fn is_collectible(&self, now_ms: f64, grace_ms: f64) -> bool {
        !self.retired && self.age_ms(now_ms) >= grace_ms
    }

    /// Whether this is a meat chunk.
    pub fn is_meat(&self) -> bool {
        matches!(self.kind, ChunkKind::Meat { .. })
    }
}

/// Vertical render offset of a bobbing loot item.
pub fn bob_offset(age_ms: f64, phase: f32, amplitude: f32, period_ms: f64) -> f32 {
    if period_ms <= 0.0 {
        return 0.0;
    }
    let t = (age_ms / period_ms) as f32 * std::f32::consts::TAU;
    (t + phase).sin() * amplitude
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(spawned_ms: f64) -> Chunk {
        Chunk {
            id: EntityId::new(),
            kind: ChunkKind::Meat {
                growth_amount: 1.0,
                hunger_restore: 2.0,
            },
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: 4.0,
            spawned_ms,
            carcass: None,
            bob_phase: 0.0,
            opacity: 1.0,
            retired: false,
        }
    }

    #[test]
    fn chunk_grace_delay() {
        let c = chunk(1000.0);
        assert!(!c.is_collectible(1100.0, 300.0));
        assert!(c.is_collectible(1300.0, 300.0));
    }

    #[test]
    fn retired_chunk_is_not_collectible() {
        let mut c = chunk(0.0);
        c.retired = true;
        assert!(!c.is_collectible(10_000.0, 0.0));
    }

    #[test]
    fn bob_offset_is_bounded() {
        for i in 0..50 {
            let y = bob_offset(i as f64 * 37.0, 0.4, 3.0, 1200.0);
            assert!(y.abs() <= 3.0 + 1e-5);
        }
        assert_eq!(bob_offset(100.0, 0.0, 3.0, 0.0), 0.0);
    }

    #[test]
    fn chunk_kind_serializes_tagged() {
        let json = serde_json::to_value(&chunk(0.0).kind).unwrap();
        assert_eq!(json["kind"], "meat");
    }
}
