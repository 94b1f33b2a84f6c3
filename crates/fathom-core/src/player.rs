use serde::{Deserialize, Serialize};

use crate::actor::{Actor, Body, CombatTimers, Vitals};
use crate::geometry::Vec2;

/// How far ahead of the body center the head sits, as a fraction of size.
const HEAD_OFFSET: f32 = 0.35;

/// Radius of the mouth, as a fraction of size.
const MOUTH_RADIUS: f32 = 0.3;

/// The player-controlled creature. One per run; reset between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Kinematics and render hints.
    pub body: Body,
    /// Resources.
    pub vitals: Vitals,
    /// Combat animation timers.
    pub timers: CombatTimers,
    /// Continuous dash time, feeds the drain ramp.
    pub dash_time: f32,
}

impl Player {
    /// Create a player at rest with full resources.
    pub fn new(position: Vec2, size: f32, vitals: Vitals) -> Self {
        Self {
            body: Body::at(position, size),
            vitals,
            timers: CombatTimers::default(),
            dash_time: 0.0,
        }
    }

    /// Restore the start-of-run state in place.
    pub fn reset(&mut self, position: Vec2, size: f32, vitals: Vitals) {
        *self = Self::new(position, size, vitals);
    }

    /// Center of the mouth, in front of the body along the facing direction.
    pub fn head_position(&self) -> Vec2 {
        let offset = self.body.size * HEAD_OFFSET * self.body.facing.sign();
        Vec2::new(self.body.position.x + offset, self.body.position.y)
    }

    /// Reach of the mouth for picking up chunks.
    pub fn collection_radius(&self) -> f32 {
        self.body.size * MOUTH_RADIUS
    }
}

impl Actor for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn vitals(&self) -> Vitals {
        self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn timers(&self) -> &CombatTimers {
        &self.timers
    }

    fn timers_mut(&mut self) -> &mut CombatTimers {
        &mut self.timers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Facing;

    fn player() -> Player {
        Player::new(Vec2::new(100.0, 100.0), 20.0, Vitals::full(100.0, 1.0, 100.0))
    }

    #[test]
    fn head_follows_facing() {
        let mut p = player();
        assert!(p.head_position().x > 100.0);
        p.body.facing = Facing::Left;
        assert!(p.head_position().x < 100.0);
        assert!((p.head_position().y - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn collection_radius_scales_with_size() {
        let mut p = player();
        let small = p.collection_radius();
        p.body.size = 40.0;
        assert!((p.collection_radius() - small * 2.0).abs() < 1e-5);
    }

    #[test]
    fn reset_restores_start_state() {
        let mut p = player();
        p.body.size = 90.0;
        p.vitals.hunger = 3.0;
        p.dash_time = 2.0;
        p.reset(Vec2::new(5.0, 5.0), 20.0, Vitals::full(100.0, 1.0, 100.0));
        assert!((p.body.size - 20.0).abs() < f32::EPSILON);
        assert!((p.vitals.hunger - 100.0).abs() < f32::EPSILON);
        assert_eq!(p.dash_time, 0.0);
    }
}
