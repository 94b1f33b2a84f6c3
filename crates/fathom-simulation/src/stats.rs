//! Run statistics and the callbacks that report them.

use fathom_mechanics::resource::stamina_ceiling;

use crate::state::Ocean;

/// Snapshot of the run for HUDs and end screens.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    /// Simulation time since the run started.
    pub elapsed_ms: f64,
    /// Player size.
    pub size: f32,
    /// Player health.
    pub health: f32,
    /// Player maximum health.
    pub max_health: f32,
    /// Player hunger.
    pub hunger: f32,
    /// Player stamina.
    pub stamina: f32,
    /// Player stamina ceiling.
    pub stamina_ceiling: f32,
    /// Fish killed by the player.
    pub kills: u32,
    /// Meat chunks eaten.
    pub meat_collected: u32,
    /// Essence collected this run.
    pub essence_collected: u64,
    /// Live fish in the world.
    pub fish_alive: usize,
}

impl RunStats {
    /// Read the current stats out of the world.
    pub fn capture(ocean: &Ocean, elapsed_ms: f64) -> Self {
        let player = &ocean.player;
        Self {
            elapsed_ms,
            size: player.body.size,
            health: player.vitals.health,
            max_health: player.vitals.max_health,
            hunger: player.vitals.hunger,
            stamina: player.vitals.stamina,
            stamina_ceiling: stamina_ceiling(player),
            kills: ocean.tally.kills,
            meat_collected: ocean.tally.meat_collected,
            essence_collected: ocean.tally.essence_collected,
            fish_alive: ocean.live_count(),
        }
    }

    /// Score awarded on level completion.
    pub fn score(&self) -> u64 {
        let size_points = (self.size.max(0.0) * 10.0).round() as u64;
        size_points + u64::from(self.kills) * 25 + self.essence_collected * 5
    }

    /// Coarse view used to decide whether a stats update is worth reporting.
    pub(crate) fn signature(&self) -> StatsSignature {
        StatsSignature {
            size_tenths: (self.size * 10.0).round() as i64,
            health: self.health.ceil() as i64,
            hunger: self.hunger.floor() as i64,
            stamina: self.stamina.floor() as i64,
            kills: self.kills,
            meat: self.meat_collected,
            essence: self.essence_collected,
            fish_alive: self.fish_alive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatsSignature {
    size_tenths: i64,
    health: i64,
    hunger: i64,
    stamina: i64,
    kills: u32,
    meat: u32,
    essence: u64,
    fish_alive: usize,
}

/// Receives run milestones. Every method defaults to doing nothing.
pub trait RunCallbacks {
    /// The level was completed. Fires once per run.
    fn on_level_complete(&mut self, _score: u64, _stats: &RunStats) {}

    /// The player died or starved. Fires once per run.
    fn on_game_over(&mut self, _stats: &RunStats) {}

    /// The stats changed since the last report.
    fn on_stats_update(&mut self, _stats: &RunStats) {}
}

/// Callbacks that ignore everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallbacks;

impl RunCallbacks for NoCallbacks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_weights_size_kills_and_essence() {
        let stats = RunStats {
            size: 30.0,
            kills: 2,
            essence_collected: 4,
            ..RunStats::default()
        };
        assert_eq!(stats.score(), 300 + 50 + 20);
    }

    #[test]
    fn signature_ignores_elapsed_time() {
        let a = RunStats {
            elapsed_ms: 10.0,
            size: 20.0,
            ..RunStats::default()
        };
        let b = RunStats {
            elapsed_ms: 5_000.0,
            ..a
        };
        assert_eq!(a.signature(), b.signature());
        let c = RunStats { kills: 1, ..a };
        assert_ne!(a.signature(), c.signature());
    }
}
