//! The capability set shared by the player and every fish.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

/// Global upper bound for any actor's size.
pub const MAX_SIZE: f32 = 400.0;

/// Upper bound of the hunger scale.
pub const HUNGER_MAX: f32 = 100.0;

/// Which way a creature's sprite faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Facing toward negative x.
    Left,
    /// Facing toward positive x.
    #[default]
    Right,
}

impl Facing {
    /// `-1.0` for left, `1.0` for right.
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Kinematic state plus the render hints the simulation keeps current.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center position in world units.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Growth-linear body length.
    pub size: f32,
    /// Horizontal facing.
    pub facing: Facing,
    /// Smoothed vertical tilt in radians.
    pub tilt: f32,
    /// Swim animation accumulator.
    pub anim_time: f32,
}

impl Body {
    /// Create a body at rest.
    pub fn at(position: Vec2, size: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size: size.clamp(0.0, MAX_SIZE),
            facing: Facing::Right,
            tilt: 0.0,
            anim_time: 0.0,
        }
    }

    /// Collision radius: half the body length.
    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }

    /// Current speed.
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Whether the circles of two bodies overlap.
    pub fn touches(&self, other: &Body) -> bool {
        let reach = self.radius() + other.radius();
        (self.position - other.position).length_sq() < reach * reach
    }
}

/// Stamina, hunger, and health of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// Current stamina, bounded by the hunger-derived ceiling.
    pub stamina: f32,
    /// Stamina ceiling at full hunger.
    pub base_max_stamina: f32,
    /// Satiation on a 0..=100 scale.
    pub hunger: f32,
    /// Hunger lost per second at a movement factor of 1.
    pub hunger_drain_rate: f32,
    /// Whether the actor is dashing this tick.
    pub is_dashing: bool,
    /// Current health.
    pub health: f32,
    /// Health ceiling.
    pub max_health: f32,
}

impl Vitals {
    /// Fully rested, fully fed vitals.
    pub fn full(base_max_stamina: f32, hunger_drain_rate: f32, max_health: f32) -> Self {
        Self {
            stamina: base_max_stamina,
            base_max_stamina,
            hunger: HUNGER_MAX,
            hunger_drain_rate,
            is_dashing: false,
            health: max_health,
            max_health,
        }
    }

    /// Whether health has run out.
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// End times (simulation milliseconds) of combat animations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatTimers {
    /// Flash shown on the victim of a hit.
    pub hit_flash_until: Option<f64>,
    /// Flash shown on the attacker; also drives the attack cooldown.
    pub attack_flash_until: Option<f64>,
    /// Forward lunge of the attacker.
    pub lunge_until: Option<f64>,
}

impl CombatTimers {
    /// Whether the hit flash is still showing at `now_ms`.
    pub fn is_hit_flashing(&self, now_ms: f64) -> bool {
        self.hit_flash_until.is_some_and(|t| now_ms < t)
    }

    /// Whether the lunge is still playing at `now_ms`.
    pub fn is_lunging(&self, now_ms: f64) -> bool {
        self.lunge_until.is_some_and(|t| now_ms < t)
    }
}

/// Shared capability set of the player and every fish.
///
/// `vitals()` returns a copy so that implementors may default their vitals
/// lazily; mutation always goes through `vitals_mut()`.
pub trait Actor {
    /// Kinematic state.
    fn body(&self) -> &Body;
    /// Mutable kinematic state.
    fn body_mut(&mut self) -> &mut Body;
    /// Snapshot of the current vitals.
    fn vitals(&self) -> Vitals;
    /// Mutable vitals, initializing defaults on first touch.
    fn vitals_mut(&mut self) -> &mut Vitals;
    /// Combat animation timers.
    fn timers(&self) -> &CombatTimers;
    /// Mutable combat animation timers.
    fn timers_mut(&mut self) -> &mut CombatTimers;

    /// Body length.
    fn size(&self) -> f32 {
        self.body().size
    }

    /// Center position.
    fn position(&self) -> Vec2 {
        self.body().position
    }

    /// Collision radius.
    fn radius(&self) -> f32 {
        self.body().radius()
    }
}
