//! Carcass and chunk economy: dropping remains, drift and fade, and batched
//! collection by the player.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use fathom_core::{Carcass, Chunk, ChunkKind, EntityId, Fish, Vec2, bob_offset};
use fathom_mechanics::growth::hunger_from_prey;
use fathom_mechanics::{MechResult, apply_growth, growth_from_prey, restore_hunger};

use crate::config::{SimConfig, ensure_non_negative};
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::spawn::sample;
use crate::state::Ocean;
use crate::system::System;

/// Carcass and chunk tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootConfig {
    /// How long an untouched carcass lasts.
    pub carcass_lifetime_ms: f64,
    /// Fade at the end of the carcass lifetime.
    pub carcass_fade_ms: f64,
    /// Fade once every chunk is gone.
    pub carcass_fast_fade_ms: f64,
    /// Sinking speed of a carcass.
    pub carcass_drift_speed: f32,
    /// Bob height.
    pub bob_amplitude: f32,
    /// Bob period.
    pub bob_period_ms: f64,
    /// How long a chunk lasts.
    pub chunk_lifetime_ms: f64,
    /// Fade at the end of the chunk lifetime.
    pub chunk_fade_ms: f64,
    /// Chunks cannot be collected until this old.
    pub chunk_grace_ms: f64,
    /// Per-frame velocity retention of a scattered chunk.
    pub chunk_friction: f32,
    /// Slowest scatter speed.
    pub scatter_speed_min: f32,
    /// Fastest scatter speed.
    pub scatter_speed_max: f32,
    /// Meat chunks every fish drops.
    pub base_meat_chunks: u32,
    /// One extra meat chunk per this much size.
    pub meat_chunk_per_size: f32,
    /// Upper bound on meat chunks.
    pub max_meat_chunks: u32,
    /// Render size of a chunk.
    pub chunk_size: f32,
    /// Minimum time between two collected batches.
    pub collect_cooldown_ms: f64,
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            carcass_lifetime_ms: 20_000.0,
            carcass_fade_ms: 3_000.0,
            carcass_fast_fade_ms: 600.0,
            carcass_drift_speed: 8.0,
            bob_amplitude: 3.0,
            bob_period_ms: 1_800.0,
            chunk_lifetime_ms: 12_000.0,
            chunk_fade_ms: 2_000.0,
            chunk_grace_ms: 350.0,
            chunk_friction: 0.92,
            scatter_speed_min: 40.0,
            scatter_speed_max: 120.0,
            base_meat_chunks: 2,
            meat_chunk_per_size: 15.0,
            max_meat_chunks: 8,
            chunk_size: 6.0,
            collect_cooldown_ms: 120.0,
        }
    }
}

impl LootConfig {
    /// Check every value is usable.
    pub fn validate(&self) -> MechResult<()> {
        ensure_non_negative("loot.carcass_lifetime_ms", self.carcass_lifetime_ms)?;
        ensure_non_negative("loot.carcass_fade_ms", self.carcass_fade_ms)?;
        ensure_non_negative("loot.carcass_fast_fade_ms", self.carcass_fast_fade_ms)?;
        ensure_non_negative("loot.chunk_lifetime_ms", self.chunk_lifetime_ms)?;
        ensure_non_negative("loot.chunk_fade_ms", self.chunk_fade_ms)?;
        ensure_non_negative("loot.chunk_grace_ms", self.chunk_grace_ms)?;
        ensure_non_negative("loot.chunk_friction", self.chunk_friction.into())?;
        ensure_non_negative("loot.scatter_speed_min", self.scatter_speed_min.into())?;
        ensure_non_negative("loot.scatter_speed_max", self.scatter_speed_max.into())?;
        ensure_non_negative("loot.meat_chunk_per_size", self.meat_chunk_per_size.into())?;
        ensure_non_negative("loot.collect_cooldown_ms", self.collect_cooldown_ms)
    }

    /// Meat chunks dropped by a fish of `size`.
    pub fn meat_chunks_for(&self, size: f32) -> u32 {
        let extra = if self.meat_chunk_per_size > 0.0 {
            (size.max(0.0) / self.meat_chunk_per_size).floor() as u32
        } else {
            0
        };
        self.base_meat_chunks
            .saturating_add(extra)
            .clamp(1, self.max_meat_chunks.max(1))
    }
}

/// Leave a carcass at `at` and scatter the victim's chunks inside its
/// silhouette. Meat payloads are computed against the player's current size.
/// Returns the number of chunks dropped.
pub fn drop_remains(
    ocean: &mut Ocean,
    rng: &mut StdRng,
    config: &SimConfig,
    victim: &Fish,
    at: Vec2,
    now_ms: f64,
) -> u32 {
    let loot = &config.loot;
    let size = victim.body.size;
    let meat = loot.meat_chunks_for(size);
    let total_growth = growth_from_prey(ocean.player.body.size, size, &config.growth);
    let total_hunger = hunger_from_prey(size, &config.growth);
    let (essence_type, essence_amount, essence_chunks) = match &victim.template.essence {
        Some(e) if e.amount > 0 && e.chunks > 0 => (e.essence_type.clone(), e.amount, e.chunks.min(e.amount)),
        _ => (String::new(), 0, 0),
    };

    let carcass = Carcass {
        id: EntityId::new(),
        species: victim.template.species.clone(),
        position: at,
        drift: Vec2::new(sample(rng, -0.3, 0.3) * loot.carcass_drift_speed, loot.carcass_drift_speed),
        size,
        spawned_ms: now_ms,
        opacity: 1.0,
        remaining_chunks: meat + essence_chunks,
        bob_phase: sample(rng, 0.0, TAU),
    };

    let per_growth = total_growth / meat as f32;
    let per_hunger = total_hunger / meat as f32;
    for _ in 0..meat {
        let kind = ChunkKind::Meat {
            growth_amount: per_growth,
            hunger_restore: per_hunger,
        };
        ocean.chunks.push(scatter(rng, victim, kind, carcass.id, now_ms, loot));
    }
    if essence_chunks > 0 {
        let base = essence_amount / essence_chunks;
        let extra = essence_amount % essence_chunks;
        for k in 0..essence_chunks {
            let kind = ChunkKind::Essence {
                essence_type: essence_type.clone(),
                amount: base + u32::from(k < extra),
            };
            ocean.chunks.push(scatter(rng, victim, kind, carcass.id, now_ms, loot));
        }
    }
    ocean.carcasses.push(carcass);
    meat + essence_chunks
}

fn scatter(rng: &mut StdRng, victim: &Fish, kind: ChunkKind, carcass: EntityId, now_ms: f64, loot: &LootConfig) -> Chunk {
    let angle = sample(rng, 0.0, TAU);
    let dir = Vec2::new(angle.cos(), angle.sin());
    let reach = victim.body.radius() * 0.6 * rng.random::<f32>().sqrt();
    Chunk {
        id: EntityId::new(),
        kind,
        position: victim.body.position + dir * reach,
        velocity: dir * sample(rng, loot.scatter_speed_min, loot.scatter_speed_max),
        size: loot.chunk_size,
        spawned_ms: now_ms,
        carcass: Some(carcass),
        bob_phase: sample(rng, 0.0, TAU),
        opacity: 1.0,
        retired: false,
    }
}

#[derive(Debug, Default)]
struct Batch {
    growth: f32,
    hunger: f32,
    meat: u32,
    essence: BTreeMap<String, u64>,
    carcasses: Vec<EntityId>,
}

impl Batch {
    fn is_empty(&self) -> bool {
        self.meat == 0 && self.essence.is_empty()
    }
}

/// Ages loot and lets the player eat it.
#[derive(Debug, Default)]
pub struct LootSystem {
    last_collect_ms: Option<f64>,
}

impl LootSystem {
    /// Create the loot phase.
    pub fn new() -> Self {
        Self::default()
    }

    fn age(&mut self, ctx: &mut SimContext<'_>) -> Vec<EntityId> {
        let now = ctx.now_ms();
        let dt = ctx.dt();
        let prev = now - f64::from(dt) * 1000.0;
        let config = ctx.config;
        let loot = &config.loot;
        let ocean = &mut *ctx.ocean;
        let bounds = ocean.bounds;

        let mut expired_from = Vec::new();
        for chunk in ocean.chunks.iter_mut().filter(|c| !c.retired) {
            let bob = bob_offset(chunk.age_ms(now), chunk.bob_phase, loot.bob_amplitude, loot.bob_period_ms)
                - bob_offset(chunk.age_ms(prev), chunk.bob_phase, loot.bob_amplitude, loot.bob_period_ms);
            chunk.position += chunk.velocity * dt + Vec2::new(0.0, bob);
            chunk.position = bounds.clamp(chunk.position);
            chunk.velocity = chunk.velocity * loot.chunk_friction.clamp(0.0, 1.0).powf(dt * 60.0);

            let age = chunk.age_ms(now);
            if age >= loot.chunk_lifetime_ms {
                chunk.retired = true;
                chunk.opacity = 0.0;
                expired_from.extend(chunk.carcass);
            } else if age > loot.chunk_lifetime_ms - loot.chunk_fade_ms {
                chunk.opacity = ((loot.chunk_lifetime_ms - age) / loot.chunk_fade_ms).clamp(0.0, 1.0) as f32;
            }
        }
        for id in expired_from {
            if let Some(carcass) = ocean.carcass_mut(id) {
                carcass.remaining_chunks = carcass.remaining_chunks.saturating_sub(1);
            }
        }

        let mut retired = Vec::new();
        for carcass in ocean.carcasses.iter_mut() {
            let bob = bob_offset(carcass.age_ms(now), carcass.bob_phase, loot.bob_amplitude, loot.bob_period_ms)
                - bob_offset(carcass.age_ms(prev), carcass.bob_phase, loot.bob_amplitude, loot.bob_period_ms);
            carcass.position += carcass.drift * dt + Vec2::new(0.0, bob);
            carcass.position = bounds.clamp(carcass.position);

            let age = carcass.age_ms(now);
            if carcass.is_picked_clean() {
                let step = if loot.carcass_fast_fade_ms > 0.0 {
                    (f64::from(dt) * 1000.0 / loot.carcass_fast_fade_ms) as f32
                } else {
                    1.0
                };
                carcass.opacity = (carcass.opacity - step).max(0.0);
            } else if age >= loot.carcass_lifetime_ms {
                carcass.opacity = 0.0;
            } else if age > loot.carcass_lifetime_ms - loot.carcass_fade_ms {
                let remaining = ((loot.carcass_lifetime_ms - age) / loot.carcass_fade_ms).clamp(0.0, 1.0) as f32;
                carcass.opacity = carcass.opacity.min(remaining);
            }
            if carcass.is_retired() {
                retired.push(carcass.id);
            }
        }
        retired
    }

    fn collect(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        let config = ctx.config;
        if let Some(last) = self.last_collect_ms {
            if now - last < config.loot.collect_cooldown_ms {
                return Ok(());
            }
        }

        let ocean = &mut *ctx.ocean;
        let head = ocean.player.head_position();
        let reach = ocean.player.collection_radius();
        let mut batch = Batch::default();
        for chunk in ocean.chunks.iter_mut() {
            if !chunk.is_collectible(now, config.loot.chunk_grace_ms)
                || chunk.position.distance(head) > reach + chunk.size * 0.5
            {
                continue;
            }
            chunk.retired = true;
            match &chunk.kind {
                ChunkKind::Meat {
                    growth_amount,
                    hunger_restore,
                } => {
                    batch.growth += growth_amount;
                    batch.hunger += hunger_restore;
                    batch.meat += 1;
                }
                ChunkKind::Essence { essence_type, amount } => {
                    *batch.essence.entry(essence_type.clone()).or_default() += u64::from(*amount);
                }
            }
            batch.carcasses.extend(chunk.carcass);
        }
        if batch.is_empty() {
            return Ok(());
        }
        self.last_collect_ms = Some(now);

        let gained = apply_growth(&mut ocean.player, batch.growth, &config.growth);
        restore_hunger(&mut ocean.player, batch.hunger);
        for id in &batch.carcasses {
            if let Some(carcass) = ocean.carcass_mut(*id) {
                carcass.remaining_chunks = carcass.remaining_chunks.saturating_sub(1);
            }
        }
        ocean.tally.meat_collected += batch.meat;
        let essence_total: u64 = batch.essence.values().sum();
        for (kind, amount) in &batch.essence {
            *ocean.essence.entry(kind.clone()).or_default() += amount;
        }
        ocean.tally.essence_collected += essence_total;
        let at = head;
        tracing::debug!(meat = batch.meat, essence = essence_total, gained, "collected chunks");

        if essence_total > 0 {
            let balance = ctx.ocean.essence.clone();
            ctx.persist("essence", &balance);
        }
        ctx.emit(
            SimEventKind::ChunksCollected {
                meat: batch.meat,
                essence: essence_total,
                growth: gained,
                at,
            },
            format!("ate {} chunks (+{gained:.2} size, +{essence_total} essence)", batch.meat),
        );
        Ok(())
    }
}

impl System for LootSystem {
    fn name(&self) -> &str {
        "loot"
    }

    fn reset(&mut self) {
        self.last_collect_ms = None;
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let retired = self.age(ctx);
        self.collect(ctx)?;

        ctx.ocean.chunks.retain(|c| !c.retired);
        ctx.ocean.carcasses.retain(|c| !c.is_retired());
        for id in retired {
            ctx.emit(SimEventKind::CarcassRetired { carcass: id }, "a carcass faded away");
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
