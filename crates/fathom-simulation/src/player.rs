//! Player phase: steering, dashing, movement, and resource upkeep.

use serde::{Deserialize, Serialize};

use fathom_core::Actor;
use fathom_mechanics::{
    HungerUpdate, MechError, MechResult, StaminaUpdate, update_hunger, update_stamina,
};

use crate::config::ensure_non_negative;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::motion::{animate, apply_drag, clamp_to_bounds, ease_toward, orient};
use crate::system::System;

/// Player handling and starting resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Cruising speed.
    pub base_speed: f32,
    /// Speed multiplier while dashing.
    pub dash_multiplier: f32,
    /// Steering responsiveness per second.
    pub acceleration: f32,
    /// Per-frame velocity retention when not steering.
    pub drag: f32,
    /// Bite damage before size scaling.
    pub base_damage: f32,
    /// Bite damage multiplier while dashing.
    pub dash_damage_multiplier: f32,
    /// Stamina ceiling at full hunger.
    pub base_stamina: f32,
    /// Hunger lost per second at a movement factor of 1.
    pub hunger_drain_rate: f32,
    /// Starting health.
    pub max_health: f32,
    /// Stamina needed to start a dash.
    pub min_dash_stamina: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_speed: 180.0,
            dash_multiplier: 1.9,
            acceleration: 6.0,
            drag: 0.9,
            base_damage: 10.0,
            dash_damage_multiplier: 1.5,
            base_stamina: 100.0,
            hunger_drain_rate: 0.6,
            max_health: 100.0,
            min_dash_stamina: 10.0,
        }
    }
}

impl PlayerConfig {
    /// Check every value is usable. Speed must be positive and drag is a
    /// retention fraction in `0..=1`.
    pub fn validate(&self) -> MechResult<()> {
        if !self.base_speed.is_finite() || self.base_speed <= 0.0 {
            return Err(MechError::InvalidTuning {
                field: "player.base_speed",
                reason: format!("expected a positive speed, got {}", self.base_speed),
            });
        }
        if !(0.0..=1.0).contains(&self.drag) {
            return Err(MechError::InvalidTuning {
                field: "player.drag",
                reason: format!("expected a retention fraction in 0..=1, got {}", self.drag),
            });
        }
        let checks: [(&'static str, f32); 8] = [
            ("player.dash_multiplier", self.dash_multiplier),
            ("player.acceleration", self.acceleration),
            ("player.base_damage", self.base_damage),
            ("player.dash_damage_multiplier", self.dash_damage_multiplier),
            ("player.base_stamina", self.base_stamina),
            ("player.hunger_drain_rate", self.hunger_drain_rate),
            ("player.max_health", self.max_health),
            ("player.min_dash_stamina", self.min_dash_stamina),
        ];
        for (field, value) in checks {
            ensure_non_negative(field, value.into())?;
        }
        Ok(())
    }
}

/// Moves the player according to this frame's input.
#[derive(Debug, Default)]
pub struct PlayerSystem;

impl PlayerSystem {
    /// Create the player phase.
    pub fn new() -> Self {
        Self
    }
}

impl System for PlayerSystem {
    fn name(&self) -> &str {
        "player"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let dt = ctx.dt();
        let cfg = &ctx.config.player;
        let direction = ctx.input.direction();
        let steering = direction.length_sq() > 0.0;
        let player = &mut ctx.ocean.player;

        let vitals = player.vitals_mut();
        let can_start = vitals.is_dashing || vitals.stamina > cfg.min_dash_stamina;
        vitals.is_dashing = ctx.input.dash && steering && vitals.stamina > 0.0 && can_start;
        let dashing = vitals.is_dashing;
        player.dash_time = if dashing { player.dash_time + dt } else { 0.0 };

        let top_speed = if dashing {
            cfg.base_speed * cfg.dash_multiplier
        } else {
            cfg.base_speed
        };
        let body = &mut player.body;
        body.velocity = if steering {
            ease_toward(body.velocity, direction * top_speed, cfg.acceleration, dt)
        } else {
            apply_drag(body.velocity, cfg.drag, dt)
        };
        body.velocity = body.velocity.clamp_length(top_speed);
        let step = body.velocity * dt;
        body.position += step;
        clamp_to_bounds(body, &ctx.ocean.bounds);
        orient(body, &ctx.config.motion, dt);
        let speed = body.speed();
        animate(body, &ctx.config.motion, dt, speed / cfg.base_speed.max(1.0));

        let ramp = ctx.config.stamina.ramp_multiplier(player.dash_time);
        update_stamina(
            player,
            dt,
            &ctx.config.stamina,
            StaminaUpdate {
                ramp_multiplier: ramp,
                ..StaminaUpdate::default()
            },
        );
        update_hunger(
            player,
            dt,
            &ctx.config.hunger,
            HungerUpdate {
                speed,
                max_speed: cfg.base_speed,
            },
        );
        tracing::trace!(
            x = player.body.position.x,
            y = player.body.position.y,
            stamina = player.vitals.stamina,
            hunger = player.vitals.hunger,
            "player moved"
        );
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
    use crate::input::InputFrame;
    use crate::testkit::Harness;
    use fathom_core::Vec2;

    fn step(h: &mut Harness, frames: usize) {
        let mut player = PlayerSystem::new();
        for _ in 0..frames {
            let next = h.clock.now_ms() + 16.0;
            h.advance(next);
            player.tick(&mut h.ctx()).unwrap();
        }
    }

    #[test]
    fn steers_toward_input_at_base_speed() {
        let mut h = Harness::new();
        h.input = InputFrame::steering(Vec2::new(1.0, 0.0), false);
        let start = h.ocean.player.body.position;
        step(&mut h, 120);
        let player = &h.ocean.player;
        let base = h.config.player.base_speed;
        assert!((player.body.velocity.x - base).abs() < 1.0);
        assert!(player.body.velocity.y.abs() < 1e-3);
        assert!(player.body.position.x > start.x);
        assert!(!player.vitals.is_dashing);
    }

    #[test]
    fn dashing_raises_top_speed_and_drains_stamina() {
        let mut h = Harness::new();
        h.input = InputFrame::steering(Vec2::new(1.0, 0.0), true);
        step(&mut h, 60);
        let player = &h.ocean.player;
        let cfg = &h.config.player;
        assert!(player.vitals.is_dashing);
        assert!(player.body.velocity.x > cfg.base_speed * 1.5);
        assert!(player.body.velocity.x <= cfg.base_speed * cfg.dash_multiplier + 1e-3);
        assert!(player.vitals.stamina < cfg.base_stamina);
        assert!(player.dash_time > 0.0);
    }

    #[test]
    fn dash_needs_stamina_above_the_minimum_to_start() {
        let mut h = Harness::new();
        h.input = InputFrame::steering(Vec2::new(1.0, 0.0), true);
        h.ocean.player.vitals.stamina = h.config.player.min_dash_stamina;
        step(&mut h, 1);
        assert!(!h.ocean.player.vitals.is_dashing);
        assert_eq!(h.ocean.player.dash_time, 0.0);
    }

    #[test]
    fn started_dash_continues_below_the_minimum() {
        let mut h = Harness::new();
        h.input = InputFrame::steering(Vec2::new(1.0, 0.0), true);
        h.ocean.player.vitals.stamina = 5.0;
        h.ocean.player.vitals.is_dashing = true;
        step(&mut h, 1);
        let vitals = h.ocean.player.vitals;
        assert!(vitals.is_dashing);
        assert!(vitals.stamina < 5.0 && vitals.stamina > 0.0);
    }

    #[test]
    fn dash_without_steering_is_ignored() {
        let mut h = Harness::new();
        h.input = InputFrame {
            dash: true,
            ..InputFrame::idle()
        };
        step(&mut h, 1);
        assert!(!h.ocean.player.vitals.is_dashing);
    }

    #[test]
    fn drag_slows_the_player_without_input() {
        let mut h = Harness::new();
        h.ocean.player.body.velocity = Vec2::new(100.0, 0.0);
        step(&mut h, 1);
        let expected = 100.0 * h.config.player.drag;
        assert!((h.ocean.player.body.velocity.x - expected).abs() < 0.05);

        step(&mut h, 120);
        assert!(h.ocean.player.body.velocity.x < 1.0);
    }

    #[test]
    fn bounds_keep_the_head_inside_the_level() {
        let mut h = Harness::new();
        let bounds = h.ocean.bounds;
        h.ocean.player.body.position = Vec2::new(bounds.max_x - 30.0, bounds.center().y);
        h.input = InputFrame::steering(Vec2::new(1.0, 0.0), false);
        step(&mut h, 60);
        let player = &h.ocean.player;
        assert!(player.body.position.x + player.body.radius() <= bounds.max_x + 1e-3);
        assert!(player.head_position().x <= bounds.max_x);
        assert_eq!(player.body.velocity.x, 0.0);
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        assert!(PlayerConfig::default().validate().is_ok());
        let stalled = PlayerConfig {
            base_speed: 0.0,
            ..PlayerConfig::default()
        };
        assert!(stalled.validate().is_err());
        let sticky = PlayerConfig {
            drag: -0.5,
            ..PlayerConfig::default()
        };
        assert!(sticky.validate().is_err());
    }
}
