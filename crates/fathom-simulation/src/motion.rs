//! Kinematics shared by the player and the fish: steering, drag, facing,
//! tilt, animation, and world edges.

use serde::{Deserialize, Serialize};

use fathom_core::{Body, Bounds, Facing, Vec2};
use fathom_mechanics::MechResult;

use crate::config::ensure_non_negative;

/// Render-hint tuning shared by every swimmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Horizontal speed needed before facing flips.
    pub facing_flip_threshold: f32,
    /// Largest tilt in radians.
    pub max_tilt: f32,
    /// Tilt easing rate per second.
    pub tilt_smoothing: f32,
    /// Animation rate at rest.
    pub anim_base_rate: f32,
    /// Extra animation rate at full speed.
    pub anim_speed_rate: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            facing_flip_threshold: 5.0,
            max_tilt: 0.6,
            tilt_smoothing: 6.0,
            anim_base_rate: 1.0,
            anim_speed_rate: 3.0,
        }
    }
}

impl MotionConfig {
    /// Check every value is usable.
    pub fn validate(&self) -> MechResult<()> {
        ensure_non_negative("motion.facing_flip_threshold", self.facing_flip_threshold.into())?;
        ensure_non_negative("motion.max_tilt", self.max_tilt.into())?;
        ensure_non_negative("motion.tilt_smoothing", self.tilt_smoothing.into())?;
        ensure_non_negative("motion.anim_base_rate", self.anim_base_rate.into())?;
        ensure_non_negative("motion.anim_speed_rate", self.anim_speed_rate.into())
    }
}

/// Ease `current` toward `desired` with exponential smoothing.
pub fn ease_toward(current: Vec2, desired: Vec2, rate: f32, dt: f32) -> Vec2 {
    let t = 1.0 - (-rate.max(0.0) * dt.max(0.0)).exp();
    current + (desired - current) * t
}

/// Frame-rate independent drag, tuned per 60 Hz frame.
pub fn apply_drag(velocity: Vec2, drag: f32, dt: f32) -> Vec2 {
    velocity * drag.clamp(0.0, 1.0).powf(dt.max(0.0) * 60.0)
}

/// Update facing and tilt from the current velocity.
pub fn orient(body: &mut Body, config: &MotionConfig, dt: f32) {
    let v = body.velocity;
    if v.x > config.facing_flip_threshold {
        body.facing = Facing::Right;
    } else if v.x < -config.facing_flip_threshold {
        body.facing = Facing::Left;
    }
    let target = v.y.atan2(v.x.abs().max(1e-3)).clamp(-config.max_tilt, config.max_tilt);
    let t = 1.0 - (-config.tilt_smoothing.max(0.0) * dt.max(0.0)).exp();
    body.tilt += (target - body.tilt) * t;
}

/// Advance the swim animation. `normalized_speed` is speed over top speed.
pub fn animate(body: &mut Body, config: &MotionConfig, dt: f32, normalized_speed: f32) {
    let rate = config.anim_base_rate + config.anim_speed_rate * normalized_speed.clamp(0.0, 2.0);
    body.anim_time += rate * dt.max(0.0);
}

fn clamp_axis(v: f32, lo: f32, hi: f32) -> f32 {
    if lo > hi { (lo + hi) * 0.5 } else { v.clamp(lo, hi) }
}

/// Keep the body inside the world, stopping motion into the wall.
pub fn clamp_to_bounds(body: &mut Body, bounds: &Bounds) {
    let r = body.radius();
    let p = body.position;
    let x = clamp_axis(p.x, bounds.min_x + r, bounds.max_x - r);
    let y = clamp_axis(p.y, bounds.min_y + r, bounds.max_y - r);
    if x != p.x {
        body.velocity.x = 0.0;
    }
    if y != p.y {
        body.velocity.y = 0.0;
    }
    body.position = Vec2::new(x, y);
}

/// Keep the body inside the world, reflecting the offending velocity
/// component. Returns whether a wall was hit.
pub fn bounce_off_bounds(body: &mut Body, bounds: &Bounds) -> bool {
    let r = body.radius();
    let mut hit = false;
    if body.position.x < bounds.min_x + r {
        body.velocity.x = body.velocity.x.abs();
        hit = true;
    } else if body.position.x > bounds.max_x - r {
        body.velocity.x = -body.velocity.x.abs();
        hit = true;
    }
    if body.position.y < bounds.min_y + r {
        body.velocity.y = body.velocity.y.abs();
        hit = true;
    } else if body.position.y > bounds.max_y - r {
        body.velocity.y = -body.velocity.y.abs();
        hit = true;
    }
    body.position = Vec2::new(
        clamp_axis(body.position.x, bounds.min_x + r, bounds.max_x - r),
        clamp_axis(body.position.y, bounds.min_y + r, bounds.max_y - r),
    );
    hit
}
