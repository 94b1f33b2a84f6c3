//! Population manager: initial fill, timed respawns, and schools.

use std::f32::consts::TAU;

use rand::Rng;
use rand::rngs::StdRng;

use fathom_core::{Bounds, CreatureClass, CreatureTemplate, Facing, Fish, LevelConfig, Vec2};

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

const ANCHOR_ATTEMPTS: usize = 16;

/// Fraction of template speed a fresh fish starts drifting at.
const SPAWN_DRIFT: f32 = 0.25;

/// Uniform sample in `[lo, hi)`, or `lo` for an empty range.
pub(crate) fn sample(rng: &mut StdRng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        lo + (hi - lo) * rng.random::<f32>()
    } else {
        lo
    }
}

/// Keeps the fish population topped up.
#[derive(Debug, Default)]
pub struct SpawnSystem {
    last_attempt_ms: Option<f64>,
    spawned: u64,
}

impl SpawnSystem {
    /// Create the spawn phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fish created since the run started.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Fill the world up to the base population. Returns how many fish were
    /// created.
    pub fn populate(&mut self, ctx: &mut SimContext<'_>) -> usize {
        let level = ctx.level;
        let policy = &level.spawn;
        let target = policy.base_max.min(policy.hard_cap());
        let mut created = 0;
        let mut attempts = 0;
        while ctx.ocean.live_count() < target && attempts < target * 4 {
            attempts += 1;
            created += self.spawn_batch(ctx, target);
        }
        tracing::debug!(created, live = ctx.ocean.live_count(), "populated level");
        created
    }

    /// Pick a template and spawn one fish or a school, never taking the
    /// population past `limit` or the class cap.
    fn spawn_batch(&mut self, ctx: &mut SimContext<'_>, limit: usize) -> usize {
        let level = ctx.level;
        let policy = &level.spawn;
        let live = ctx.ocean.live_count();
        let Some(template) = pick_template(level, live, ctx.rng).cloned() else {
            return 0;
        };
        let room = policy.cap_for(template.class).min(limit).saturating_sub(live);
        if room == 0 {
            return 0;
        }
        let wanted = if template.class == CreatureClass::SmallPrey {
            let lo = policy.school_min.max(1);
            let hi = policy.school_max.max(lo);
            ctx.rng.random_range(lo..=hi)
        } else {
            1
        };
        let count = wanted.min(room);

        let now = ctx.now_ms();
        let player = ctx.ocean.player.body.position;
        let bounds = ctx.ocean.bounds;
        let anchor = pick_anchor(ctx.rng, &bounds, &template, player, policy.min_player_distance);
        for k in 0..count {
            let position = if k == 0 {
                anchor
            } else {
                let angle = sample(ctx.rng, 0.0, TAU);
                let dist = policy.school_spread * ctx.rng.random::<f32>().sqrt();
                let p = bounds.clamp(anchor + Vec2::new(angle.cos(), angle.sin()) * dist);
                push_away(p, player, policy.min_player_distance, &bounds)
            };
            let fish = self.make_fish(ctx.rng, &template, position, now + k as f64 * policy.stagger_ms, level);
            let id = fish.id;
            ctx.ocean.fish.push(fish);
            self.spawned += 1;
            tracing::debug!(%id, species = %template.species, "spawned fish");
            ctx.emit(
                SimEventKind::FishSpawned {
                    fish: id,
                    species: template.species.clone(),
                },
                format!("a {} appeared", template.species),
            );
        }
        count
    }

    fn make_fish(
        &self,
        rng: &mut StdRng,
        template: &CreatureTemplate,
        position: Vec2,
        spawn_at_ms: f64,
        level: &LevelConfig,
    ) -> Fish {
        let mut fish = Fish::spawn(template.clone(), position, spawn_at_ms, level.spawn.fade_in_ms);
        fish.fade_out_ms = level.spawn.fade_out_ms;
        if let Some([lo, hi]) = template.lifespan_ms {
            let span = if hi > lo {
                lo + (hi - lo) * rng.random::<f64>()
            } else {
                lo
            };
            fish.despawn_at_ms = Some(spawn_at_ms + span);
        }
        let heading = sample(rng, 0.0, TAU);
        fish.body.velocity = Vec2::new(heading.cos(), heading.sin()) * (template.speed * SPAWN_DRIFT);
        fish.body.facing = if fish.body.velocity.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        };
        fish
    }
}

/// Weighted pick among the templates whose class cap still has room.
pub fn pick_template<'a>(level: &'a LevelConfig, live: usize, rng: &mut StdRng) -> Option<&'a CreatureTemplate> {
    let eligible: Vec<(&CreatureTemplate, u32)> = level
        .pool
        .iter()
        .filter(|t| live < level.spawn.cap_for(t.class))
        .map(|t| (t, level.spawn.weight_for(t.class)))
        .filter(|(_, w)| *w > 0)
        .collect();
    let total = eligible.iter().fold(0u32, |acc, (_, w)| acc.saturating_add(*w));
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for (template, weight) in eligible {
        if roll < weight {
            return Some(template);
        }
        roll -= weight;
    }
    None
}

/// A spawn point in the template's depth band, away from the player when
/// possible.
fn pick_anchor(
    rng: &mut StdRng,
    bounds: &Bounds,
    template: &CreatureTemplate,
    player: Vec2,
    min_distance: f32,
) -> Vec2 {
    let r = template.size * 0.5;
    let y_lo = bounds.depth_at(template.depth.min).max(bounds.min_y + r);
    let y_hi = bounds.depth_at(template.depth.max).min(bounds.max_y - r);
    let mut farthest = bounds.center();
    let mut farthest_d = -1.0;
    for _ in 0..ANCHOR_ATTEMPTS {
        let p = Vec2::new(
            sample(rng, bounds.min_x + r, bounds.max_x - r),
            sample(rng, y_lo, y_hi),
        );
        let d = p.distance(player);
        if d >= min_distance {
            return p;
        }
        if d > farthest_d {
            farthest = p;
            farthest_d = d;
        }
    }
    push_away(farthest, player, min_distance, bounds)
}

/// Move `p` radially out to `min_distance` from the player, staying inside
/// the bounds. Falls back to the opposite side when the edge is in the way.
fn push_away(p: Vec2, player: Vec2, min_distance: f32, bounds: &Bounds) -> Vec2 {
    if p.distance(player) >= min_distance {
        return p;
    }
    let dir = (p - player).normalized();
    let dir = if dir == Vec2::ZERO { Vec2::new(1.0, 0.0) } else { dir };
    let forward = bounds.clamp(player + dir * min_distance);
    if forward.distance(player) >= min_distance {
        return forward;
    }
    let backward = bounds.clamp(player + dir * -min_distance);
    if backward.distance(player) > forward.distance(player) {
        backward
    } else {
        forward
    }
}

impl System for SpawnSystem {
    fn name(&self) -> &str {
        "spawn"
    }

    fn init(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.populate(ctx);
        self.last_attempt_ms = Some(ctx.now_ms());
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        let hard_cap = ctx.level.spawn.hard_cap();
        if ctx.ocean.live_count() >= hard_cap {
            return Ok(());
        }
        if let Some(last) = self.last_attempt_ms {
            if now - last < ctx.level.spawn.respawn_interval_ms {
                return Ok(());
            }
        }
        self.last_attempt_ms = Some(now);
        self.spawn_batch(ctx, hard_cap);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::Harness;
    use rand::SeedableRng;

    #[test]
    fn populate_fills_to_base_max_away_from_player() {
        let mut h = Harness::new();
        let mut spawn = SpawnSystem::new();
        spawn.populate(&mut h.ctx());
        let policy = &h.level.spawn;
        assert!(h.ocean.live_count() >= policy.base_max);
        assert!(h.ocean.live_count() <= policy.hard_cap());
        let player = h.ocean.player.body.position;
        for fish in &h.ocean.fish {
            assert!(fish.body.position.distance(player) >= policy.min_player_distance - 0.01);
            assert_eq!(fish.opacity, 0.0);
        }
    }

    #[test]
    fn respawn_never_exceeds_hard_cap() {
        let mut h = Harness::new();
        let mut spawn = SpawnSystem::new();
        for frame in 0..400 {
            h.advance(frame as f64 * 100.0);
            spawn.tick(&mut h.ctx()).unwrap();
            assert!(h.ocean.live_count() <= h.level.spawn.hard_cap());
        }
        assert_eq!(h.ocean.live_count(), h.level.spawn.hard_cap());
    }

    #[test]
    fn schools_get_staggered_spawn_times() {
        let mut h = Harness::new();
        h.level.pool.retain(|t| t.class == CreatureClass::SmallPrey);
        h.level.spawn.school_min = 3;
        h.level.spawn.school_max = 3;
        let mut spawn = SpawnSystem::new();
        let made = spawn.spawn_batch(&mut h.ctx(), 10);
        assert_eq!(made, 3);
        let times: Vec<f64> = h.ocean.fish.iter().map(|f| f.spawn_at_ms).collect();
        assert_eq!(times, vec![0.0, 120.0, 240.0]);
    }

    #[test]
    fn pick_respects_class_caps() {
        let level = LevelConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let t = pick_template(&level, level.spawn.base_max, &mut rng).unwrap();
            assert_eq!(t.class, CreatureClass::SmallPrey);
        }
        assert!(pick_template(&level, level.spawn.hard_cap(), &mut rng).is_none());
    }

    #[test]
    fn zero_weights_pick_nothing() {
        let mut level = LevelConfig::default();
        level.spawn.small_prey_weight = 0;
        level.spawn.prey_weight = 0;
        level.spawn.other_weight = 0;
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_template(&level, 0, &mut rng).is_none());
    }

    #[test]
    fn extreme_weights_do_not_overflow() {
        let mut level = LevelConfig::default();
        level.spawn.small_prey_weight = u32::MAX;
        level.spawn.prey_weight = u32::MAX;
        level.spawn.other_weight = u32::MAX;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert!(pick_template(&level, 0, &mut rng).is_some());
        }
    }

    #[test]
    fn push_away_reaches_min_distance() {
        let bounds = Bounds::sized(1000.0, 1000.0);
        let player = Vec2::new(500.0, 500.0);
        let p = push_away(Vec2::new(510.0, 500.0), player, 200.0, &bounds);
        assert!(p.distance(player) >= 199.99);
        let edge_player = Vec2::new(50.0, 500.0);
        let q = push_away(Vec2::new(40.0, 500.0), edge_player, 200.0, &bounds);
        assert!(q.distance(edge_player) >= 199.99);
    }
}
