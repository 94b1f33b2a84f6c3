//! Per-frame player input.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use fathom_core::Vec2;

/// A digital steering control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// Swim toward the surface.
    Up,
    /// Swim deeper.
    Down,
    /// Swim left.
    Left,
    /// Swim right.
    Right,
}

/// Input state for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Held digital controls.
    pub pressed: BTreeSet<Control>,
    /// Analog steering; wins over digital controls when non-zero.
    pub steer: Vec2,
    /// Dash held.
    pub dash: bool,
}

impl InputFrame {
    /// No input at all.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Analog steering toward `direction`.
    pub fn steering(direction: Vec2, dash: bool) -> Self {
        Self {
            steer: direction,
            dash,
            ..Self::default()
        }
    }

    /// Hold a digital control.
    pub fn press(mut self, control: Control) -> Self {
        self.pressed.insert(control);
        self
    }

    /// Steering direction with length at most 1.
    pub fn direction(&self) -> Vec2 {
        if self.steer.length_sq() > 0.0 {
            return self.steer.clamp_length(1.0);
        }
        let mut dir = Vec2::ZERO;
        for control in &self.pressed {
            match control {
                Control::Up => dir.y -= 1.0,
                Control::Down => dir.y += 1.0,
                Control::Left => dir.x -= 1.0,
                Control::Right => dir.x += 1.0,
            }
        }
        dir.normalized()
    }
}
