//! Fish behavior: predators chase, prey flee, everyone else wanders.
//!
//! Decisions are made against a snapshot of the collidable fish taken at the
//! start of the phase, so every fish sees the same world regardless of update
//! order. Targets are held by id and re-resolved through that snapshot each
//! tick; a target that is gone simply means "no target".

use std::collections::HashMap;
use std::f32::consts::TAU;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use fathom_core::{Actor, Bounds, EntityId, Fish, Lifecycle, MIN_EPSILON, Vec2};
use fathom_mechanics::{
    HungerUpdate, MechResult, StaminaUpdate, is_starved, update_hunger, update_stamina,
};

use crate::config::{SimConfig, ensure_non_negative};
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::lifecycle::begin_despawn;
use crate::motion::{animate, apply_drag, bounce_off_bounds, ease_toward, orient};
use crate::spawn::sample;
use crate::system::System;

/// Fish behavior tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// How far predators look for prey.
    pub detection_radius: f32,
    /// How close a threat must be before prey flee.
    pub flee_radius: f32,
    /// A predator hunts things at most `1 / prey_size_ratio` of its size.
    pub prey_size_ratio: f32,
    /// Prey flee from things larger by this ratio.
    pub threat_size_ratio: f32,
    /// Chase speed as a fraction of template speed.
    pub chase_speed_factor: f32,
    /// Flee speed as a fraction of template speed.
    pub flee_speed_factor: f32,
    /// Speed multiplier while dashing.
    pub dash_multiplier: f32,
    /// Predators dash within this many body lengths of their target.
    pub chase_dash_range: f32,
    /// Prey dash within this many threat body lengths.
    pub flee_dash_range: f32,
    /// Stamina needed to start a dash.
    pub min_dash_stamina: f32,
    /// Extra stamina drain while dashing away from a threat.
    pub flee_drain_multiplier: f32,
    /// Give up a chase that has not closed in for this long.
    pub chase_timeout_ms: f64,
    /// Distance improvement that counts as progress.
    pub progress_epsilon: f32,
    /// No chasing for this long after giving up.
    pub give_up_cooldown_ms: f64,
    /// Random steering added while wandering.
    pub wander_jitter: f32,
    /// Wander speed cap as a fraction of template speed.
    pub wander_speed_fraction: f32,
    /// Speed multiplier while exhausted.
    pub exhausted_speed_multiplier: f32,
    /// Steering responsiveness per second.
    pub responsiveness: f32,
    /// Per-frame velocity retention for fish not steering.
    pub passive_drag: f32,
    /// Fish this far outside the bounds are despawned.
    pub despawn_margin: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            detection_radius: 320.0,
            flee_radius: 220.0,
            prey_size_ratio: 1.25,
            threat_size_ratio: 1.2,
            chase_speed_factor: 1.0,
            flee_speed_factor: 1.1,
            dash_multiplier: 1.8,
            chase_dash_range: 3.0,
            flee_dash_range: 2.5,
            min_dash_stamina: 20.0,
            flee_drain_multiplier: 1.3,
            chase_timeout_ms: 4000.0,
            progress_epsilon: 4.0,
            give_up_cooldown_ms: 2500.0,
            wander_jitter: 60.0,
            wander_speed_fraction: 0.35,
            exhausted_speed_multiplier: 0.5,
            responsiveness: 3.5,
            passive_drag: 0.95,
            despawn_margin: 200.0,
        }
    }
}

impl AiConfig {
    /// Check every value is usable.
    pub fn validate(&self) -> MechResult<()> {
        let checks: [(&'static str, f64); 20] = [
            ("ai.detection_radius", self.detection_radius.into()),
            ("ai.flee_radius", self.flee_radius.into()),
            ("ai.prey_size_ratio", self.prey_size_ratio.into()),
            ("ai.threat_size_ratio", self.threat_size_ratio.into()),
            ("ai.chase_speed_factor", self.chase_speed_factor.into()),
            ("ai.flee_speed_factor", self.flee_speed_factor.into()),
            ("ai.dash_multiplier", self.dash_multiplier.into()),
            ("ai.chase_dash_range", self.chase_dash_range.into()),
            ("ai.flee_dash_range", self.flee_dash_range.into()),
            ("ai.min_dash_stamina", self.min_dash_stamina.into()),
            ("ai.flee_drain_multiplier", self.flee_drain_multiplier.into()),
            ("ai.chase_timeout_ms", self.chase_timeout_ms),
            ("ai.progress_epsilon", self.progress_epsilon.into()),
            ("ai.give_up_cooldown_ms", self.give_up_cooldown_ms),
            ("ai.wander_jitter", self.wander_jitter.into()),
            ("ai.wander_speed_fraction", self.wander_speed_fraction.into()),
            ("ai.exhausted_speed_multiplier", self.exhausted_speed_multiplier.into()),
            ("ai.responsiveness", self.responsiveness.into()),
            ("ai.passive_drag", self.passive_drag.into()),
            ("ai.despawn_margin", self.despawn_margin.into()),
        ];
        for (field, value) in checks {
            ensure_non_negative(field, value)?;
        }
        Ok(())
    }
}

/// What one fish can see of another.
#[derive(Debug, Clone, Copy)]
struct Sighting {
    id: EntityId,
    position: Vec2,
    size: f32,
    knocked_out: bool,
}

/// The world as seen at the start of the AI phase.
struct Surroundings {
    sightings: Vec<Sighting>,
    index: HashMap<EntityId, usize>,
    player_position: Vec2,
    player_size: f32,
    player_alive: bool,
}

impl Surroundings {
    fn capture(ctx: &SimContext<'_>) -> Self {
        let sightings: Vec<Sighting> = ctx
            .ocean
            .fish
            .iter()
            .filter(|f| f.lifecycle().is_collidable())
            .map(|f| Sighting {
                id: f.id,
                position: f.body.position,
                size: f.body.size,
                knocked_out: f.lifecycle() == Lifecycle::KnockedOut,
            })
            .collect();
        let index = sightings.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        let player = &ctx.ocean.player;
        Self {
            sightings,
            index,
            player_position: player.body.position,
            player_size: player.body.size,
            player_alive: player.vitals.health > 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Quarry {
    Fish(EntityId),
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Intent {
    Chase { toward: Vec2, distance: f32 },
    Flee { away: Vec2, nearest: f32, threat_size: f32 },
    Wander,
}

/// Steers every thinking fish and keeps its resources ticking.
#[derive(Debug, Default)]
pub struct AiSystem;

impl AiSystem {
    /// Create the AI phase.
    pub fn new() -> Self {
        Self
    }
}

impl System for AiSystem {
    fn name(&self) -> &str {
        "ai"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        let dt = ctx.dt();
        let config = ctx.config;
        let bounds = ctx.ocean.bounds;
        let seen = Surroundings::capture(ctx);
        let mut notes = Vec::new();

        for fish in ctx.ocean.fish.iter_mut() {
            if fish.lifecycle().is_thinking() {
                think(fish, &seen, config, &bounds, ctx.rng, now, dt, &mut notes)?;
            } else {
                drift(fish, config, &bounds, dt);
            }
        }

        for (kind, description) in notes {
            ctx.emit(kind, description);
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

#[allow(clippy::too_many_arguments)]
fn think(
    fish: &mut Fish,
    seen: &Surroundings,
    config: &SimConfig,
    bounds: &Bounds,
    rng: &mut StdRng,
    now: f64,
    dt: f32,
    notes: &mut Vec<(SimEventKind, String)>,
) -> SimResult<()> {
    let ai = &config.ai;
    let intent = if fish.class().is_predator() {
        fish.ai.clear_flee();
        choose_chase(fish, seen, ai, now)
    } else {
        fish.ai.clear_chase();
        choose_flight(fish, seen, ai)
    };

    let speed = fish.template.speed;
    let (mut desired, mut limit, wants_dash, fleeing) = match intent {
        Intent::Chase { toward, distance } => {
            let dir = (toward - fish.body.position).normalized();
            let cap = speed * ai.chase_speed_factor;
            (dir * cap, cap, distance <= fish.body.size * ai.chase_dash_range, false)
        }
        Intent::Flee {
            away,
            nearest,
            threat_size,
        } => {
            let cap = speed * ai.flee_speed_factor;
            (away.normalized() * cap, cap, nearest <= threat_size * ai.flee_dash_range, true)
        }
        Intent::Wander => {
            let cap = speed * ai.wander_speed_fraction;
            let heading = sample(rng, 0.0, TAU);
            let jitter = Vec2::new(heading.cos(), heading.sin()) * ai.wander_jitter;
            let base = if fish.body.velocity.length_sq() < MIN_EPSILON {
                jitter
            } else {
                fish.body.velocity + jitter
            };
            (base.clamp_length(cap), cap, false, false)
        }
    };

    let exhausted = fish.lifecycle() == Lifecycle::Exhausted;
    let recovering = fish.recovering_from_exhausted;
    let vitals = fish.vitals_mut();
    let may_dash = vitals.stamina > 0.0 && (vitals.is_dashing || vitals.stamina > ai.min_dash_stamina);
    vitals.is_dashing = wants_dash && may_dash && !exhausted && !recovering;
    let dashing = vitals.is_dashing;

    if dashing {
        desired = desired * ai.dash_multiplier;
        limit *= ai.dash_multiplier;
    }
    if exhausted {
        desired = desired * ai.exhausted_speed_multiplier;
        limit *= ai.exhausted_speed_multiplier;
    }
    fish.ai.dash_time = if dashing { fish.ai.dash_time + dt } else { 0.0 };

    let body = &mut fish.body;
    body.velocity = ease_toward(body.velocity, desired, ai.responsiveness, dt).clamp_length(limit);
    let step = body.velocity * dt;
    body.position += step;
    bounce_off_bounds(body, bounds);
    orient(body, &config.motion, dt);
    let current_speed = body.speed();
    animate(body, &config.motion, dt, current_speed / speed.max(1.0));

    let drain = StaminaUpdate {
        ramp_multiplier: config.stamina.ramp_multiplier(fish.ai.dash_time),
        flee_multiplier: if fleeing && dashing {
            ai.flee_drain_multiplier
        } else {
            1.0
        },
    };
    let report = update_stamina(fish, dt, &config.stamina, drain);
    update_hunger(
        fish,
        dt,
        &config.hunger,
        HungerUpdate {
            speed: current_speed,
            max_speed: speed,
        },
    );

    let species = fish.template.species.clone();
    if is_starved(fish) {
        if begin_despawn(fish, now)? {
            tracing::debug!(id = %fish.id, %species, "fish starved");
            notes.push((
                SimEventKind::DespawnStarted {
                    fish: fish.id,
                    reason: "starved".into(),
                },
                format!("a {species} starved"),
            ));
        }
        return Ok(());
    }

    match fish.lifecycle() {
        Lifecycle::Active if report.depleted && !fish.timers.is_hit_flashing(now) => {
            fish.transition(Lifecycle::Exhausted)?;
            fish.recovering_from_exhausted = true;
            tracing::debug!(id = %fish.id, %species, "fish exhausted");
            notes.push((
                SimEventKind::Exhausted { fish: fish.id },
                format!("a {species} is exhausted"),
            ));
        }
        Lifecycle::Active if report.depleted => {
            // Emptied mid hit flash: no exhaustion, but no dashing until full.
            fish.recovering_from_exhausted = true;
        }
        Lifecycle::Exhausted if report.at_ceiling => {
            fish.transition(Lifecycle::Active)?;
            fish.recovering_from_exhausted = false;
            notes.push((
                SimEventKind::Recovered { fish: fish.id },
                format!("a {species} recovered"),
            ));
        }
        Lifecycle::Active if fish.recovering_from_exhausted && report.at_ceiling => {
            fish.recovering_from_exhausted = false;
        }
        _ => {}
    }
    Ok(())
}

/// Predator targeting with progress tracking and give-up cooldown.
fn choose_chase(fish: &mut Fish, seen: &Surroundings, ai: &AiConfig, now: f64) -> Intent {
    if now < fish.ai.give_up_until_ms {
        fish.ai.clear_chase();
        return Intent::Wander;
    }
    let me = fish.body.position;
    let size = fish.body.size;
    let edible = |other_size: f32, knocked_out: bool| knocked_out || other_size * ai.prey_size_ratio <= size;

    let current = if fish.ai.chasing_player {
        Some(Quarry::Player)
    } else {
        fish.ai.chase_target.map(Quarry::Fish)
    };
    let locate = |quarry: Quarry| -> Option<(Vec2, f32)> {
        match quarry {
            Quarry::Player => (seen.player_alive && edible(seen.player_size, false))
                .then_some((seen.player_position, seen.player_size)),
            Quarry::Fish(id) => {
                let s = seen.sightings.get(*seen.index.get(&id)?)?;
                (s.id != fish.id && edible(s.size, s.knocked_out)).then_some((s.position, s.size))
            }
        }
    };

    let held = current
        .and_then(|q| locate(q).map(|(p, _)| (q, p)))
        .filter(|(_, p)| p.distance(me) <= ai.detection_radius);

    let pick = held.or_else(|| {
        let mut best: Option<(Quarry, Vec2, f32)> = None;
        for s in &seen.sightings {
            if s.id == fish.id || !edible(s.size, s.knocked_out) {
                continue;
            }
            let d = s.position.distance(me);
            if d <= ai.detection_radius && best.is_none_or(|(_, _, bd)| d < bd) {
                best = Some((Quarry::Fish(s.id), s.position, d));
            }
        }
        if seen.player_alive && edible(seen.player_size, false) {
            let d = seen.player_position.distance(me);
            if d <= ai.detection_radius && best.is_none_or(|(_, _, bd)| d < bd) {
                best = Some((Quarry::Player, seen.player_position, d));
            }
        }
        best.map(|(q, p, _)| (q, p))
    });

    let Some((quarry, position)) = pick else {
        fish.ai.clear_chase();
        return Intent::Wander;
    };
    let distance = position.distance(me);

    if current != Some(quarry) {
        fish.ai.chase_target = match quarry {
            Quarry::Fish(id) => Some(id),
            Quarry::Player => None,
        };
        fish.ai.chasing_player = quarry == Quarry::Player;
        fish.ai.best_chase_distance = distance;
        fish.ai.last_progress_ms = now;
    } else if distance < fish.ai.best_chase_distance - ai.progress_epsilon {
        fish.ai.best_chase_distance = distance;
        fish.ai.last_progress_ms = now;
    } else if now - fish.ai.last_progress_ms >= ai.chase_timeout_ms {
        tracing::debug!(id = %fish.id, "predator gave up the chase");
        fish.ai.clear_chase();
        fish.ai.give_up_until_ms = now + ai.give_up_cooldown_ms;
        return Intent::Wander;
    }
    Intent::Chase {
        toward: position,
        distance,
    }
}

/// Prey flight: inverse-square repulsion from every larger threat in range.
fn choose_flight(fish: &mut Fish, seen: &Surroundings, ai: &AiConfig) -> Intent {
    let me = fish.body.position;
    let size = fish.body.size;
    let threshold = size * ai.threat_size_ratio;
    let mut away = Vec2::ZERO;
    let mut nearest: Option<(Quarry, f32, f32)> = None;

    let mut consider = |quarry: Quarry, position: Vec2, threat_size: f32| {
        let d = position.distance(me);
        if d > ai.flee_radius {
            return;
        }
        let d2 = (d * d).max(MIN_EPSILON);
        away += (me - position) * (1.0 / d2);
        if nearest.is_none_or(|(_, nd, _)| d < nd) {
            nearest = Some((quarry, d, threat_size));
        }
    };
    for s in &seen.sightings {
        if s.id != fish.id && !s.knocked_out && s.size > threshold {
            consider(Quarry::Fish(s.id), s.position, s.size);
        }
    }
    if seen.player_alive && seen.player_size > threshold {
        consider(Quarry::Player, seen.player_position, seen.player_size);
    }

    let Some((quarry, distance, threat_size)) = nearest else {
        fish.ai.clear_flee();
        return Intent::Wander;
    };
    fish.ai.flee_target = match quarry {
        Quarry::Fish(id) => Some(id),
        Quarry::Player => None,
    };
    fish.ai.fleeing_player = quarry == Quarry::Player;
    if away.length_sq() < MIN_EPSILON * MIN_EPSILON {
        away = Vec2::new(fish.body.facing.sign(), 0.0);
    }
    Intent::Flee {
        away,
        nearest: distance,
        threat_size,
    }
}

/// Passive motion for fish that are not steering: fading in or out, or
/// knocked out.
fn drift(fish: &mut Fish, config: &SimConfig, bounds: &Bounds, dt: f32) {
    let body = &mut fish.body;
    body.velocity = apply_drag(body.velocity, config.ai.passive_drag, dt);
    let step = body.velocity * dt;
    body.position += step;
    bounce_off_bounds(body, bounds);
    orient(body, &config.motion, dt);
    animate(body, &config.motion, dt, 0.0);
    if fish.lifecycle() == Lifecycle::KnockedOut {
        update_stamina(fish, dt, &config.stamina, StaminaUpdate::default());
    }
}
