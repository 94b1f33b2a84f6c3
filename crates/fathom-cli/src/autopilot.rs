//! Scripted input source for headless runs.

use fathom_core::{Fish, Vec2};
use fathom_simulation::{InputFrame, Ocean};

/// Steers the player: run from anything bigger, otherwise eat the nearest
/// chunk or smaller fish, otherwise drift back toward the middle.
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Threats farther than this are ignored.
    pub alarm_radius: f32,
    /// Fish at least this much bigger than the player count as threats.
    pub threat_ratio: f32,
    /// Fish at most this fraction of the player's size count as prey.
    pub prey_ratio: f32,
    /// No dashing below this much stamina.
    pub min_dash_stamina: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            alarm_radius: 260.0,
            threat_ratio: 1.1,
            prey_ratio: 0.9,
            min_dash_stamina: 20.0,
        }
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input for the next frame given the current world.
    pub fn steer(&self, ocean: &Ocean) -> InputFrame {
        let me = &ocean.player;
        let pos = me.body.position;
        let size = me.body.size;

        let threat = nearest(ocean, pos, |f| f.body.size >= size * self.threat_ratio);
        if let Some(threat) = threat {
            let distance = threat.body.position.distance(pos);
            if distance < self.alarm_radius {
                let away = (pos - threat.body.position).normalized();
                let close = distance < threat.body.radius() + me.body.radius() + 80.0;
                return InputFrame::steering(away, close && me.vitals.stamina > self.min_dash_stamina);
            }
        }

        let chunk = ocean
            .chunks
            .iter()
            .filter(|c| !c.retired)
            .min_by(|a, b| a.position.distance(pos).total_cmp(&b.position.distance(pos)));
        if let Some(chunk) = chunk {
            return InputFrame::steering((chunk.position - me.head_position()).normalized(), false);
        }

        if let Some(prey) = nearest(ocean, pos, |f| f.body.size <= size * self.prey_ratio) {
            return InputFrame::steering((prey.body.position - pos).normalized(), false);
        }

        let home = ocean.bounds.center() - pos;
        InputFrame::steering(home.normalized() * 0.3, false)
    }
}

fn nearest(ocean: &Ocean, from: Vec2, keep: impl Fn(&Fish) -> bool) -> Option<&Fish> {
    ocean
        .fish
        .iter()
        .filter(|f| f.lifecycle().is_collidable() && keep(f))
        .min_by(|a, b| {
            a.body
                .position
                .distance(from)
                .total_cmp(&b.body.position.distance(from))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::{Bounds, CreatureClass, CreatureTemplate, Lifecycle, Player, Vitals};

    fn ocean_with(fish: Vec<Fish>) -> Ocean {
        let player = Player::new(Vec2::new(500.0, 500.0), 20.0, Vitals::full(100.0, 1.0, 100.0));
        let mut ocean = Ocean::new(Bounds::default(), player, Default::default());
        ocean.fish = fish;
        ocean
    }

    fn active(species: &str, class: CreatureClass, size: f32, at: Vec2) -> Fish {
        let t = CreatureTemplate::new(species, class, size, 80.0);
        let mut fish = Fish::spawn(t, at, 0.0, 0.0);
        fish.transition(Lifecycle::Active).unwrap();
        fish
    }

    #[test]
    fn flees_a_bigger_fish() {
        let shark = active("shark", CreatureClass::Predator, 80.0, Vec2::new(600.0, 500.0));
        let input = Autopilot::new().steer(&ocean_with(vec![shark]));
        assert!(input.steer.x < 0.0);
        assert!(input.dash);
    }

    #[test]
    fn hunts_smaller_fish() {
        let sardine = active("sardine", CreatureClass::SmallPrey, 10.0, Vec2::new(500.0, 300.0));
        let input = Autopilot::new().steer(&ocean_with(vec![sardine]));
        assert!(input.steer.y < 0.0);
        assert!(!input.dash);
    }

    #[test]
    fn ignores_fish_still_fading_in() {
        let t = CreatureTemplate::new("shark", CreatureClass::Predator, 80.0, 80.0);
        let shark = Fish::spawn(t, Vec2::new(520.0, 500.0), 0.0, 500.0);
        let input = Autopilot::new().steer(&ocean_with(vec![shark]));
        assert!(!input.dash);
        // Drifts toward the middle of the default world instead.
        assert!(input.steer.x > 0.0);
    }
}
