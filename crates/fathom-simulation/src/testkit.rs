//! Test harness that owns everything a [`SimContext`] borrows.

use rand::SeedableRng;
use rand::rngs::StdRng;

use fathom_core::{LevelConfig, Player, Vec2, Vitals};

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::event::EventLog;
use crate::input::InputFrame;
use crate::state::Ocean;
use crate::store::MemoryStore;

pub(crate) struct Harness {
    pub ocean: Ocean,
    pub level: LevelConfig,
    pub config: SimConfig,
    pub clock: SimClock,
    pub input: InputFrame,
    pub events: EventLog,
    pub rng: StdRng,
    pub store: MemoryStore,
}

impl Harness {
    pub fn new() -> Self {
        let level = LevelConfig::default();
        let config = SimConfig::default();
        let start = Vec2::new(level.bounds.center().x, level.bounds.depth_at(0.3));
        let vitals = Vitals::full(
            config.player.base_stamina,
            config.player.hunger_drain_rate,
            config.player.max_health,
        );
        let player = Player::new(start, level.player_start_size, vitals);
        Self {
            ocean: Ocean::new(level.bounds, player, Default::default()),
            clock: SimClock::new(config.max_delta_ms, config.default_delta_ms),
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(0),
            input: InputFrame::idle(),
            store: MemoryStore::new(),
            level,
            config,
        }
    }

    /// Advance the clock to the frame stamped `frame_ms`.
    pub fn advance(&mut self, frame_ms: f64) -> f32 {
        self.clock.advance(frame_ms)
    }

    pub fn ctx(&mut self) -> SimContext<'_> {
        SimContext {
            ocean: &mut self.ocean,
            level: &self.level,
            config: &self.config,
            clock: &self.clock,
            input: &self.input,
            events: &mut self.events,
            rng: &mut self.rng,
            store: &mut self.store,
        }
    }
}
