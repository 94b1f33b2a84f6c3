use rand::SeedableRng;
use rand::rngs::StdRng;

use fathom_core::{EntityId, LevelConfig, Player, Vec2, Vitals};
use fathom_mechanics::is_starved;

use crate::ai::AiSystem;
use crate::clock::SimClock;
use crate::combat::CombatSystem;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::input::InputFrame;
use crate::lifecycle::{LifecycleSystem, begin_despawn};
use crate::loot::LootSystem;
use crate::player::PlayerSystem;
use crate::spawn::SpawnSystem;
use crate::state::Ocean;
use crate::stats::{RunCallbacks, RunStats, StatsSignature};
use crate::store::RunStore;
use crate::system::System;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// Target size reached or the level timer ran out with the player alive.
    LevelComplete,
    /// The player died or starved.
    GameOver,
}

/// The top-level simulation orchestrator.
///
/// Owns the ocean, clock, RNG, event log, store, and registered systems.
/// Drives the frame loop, the end-of-frame purge, and the terminal checks.
pub struct Simulation {
    ocean: Ocean,
    level: LevelConfig,
    config: SimConfig,
    clock: SimClock,
    rng: StdRng,
    events: EventLog,
    systems: Vec<Box<dyn System>>,
    store: Box<dyn RunStore>,
    initialized: bool,
    ended: Option<RunEnd>,
    last_signature: Option<StatsSignature>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("level", &self.level.name)
            .field("frame", &self.clock.frame())
            .field("fish", &self.ocean.live_count())
            .field("systems", &self.systems.len())
            .field("events", &self.events.len())
            .field("ended", &self.ended)
            .finish()
    }
}

impl Simulation {
    /// Create a run of `level` with the built-in systems registered.
    ///
    /// The level and tuning are validated up front. A store that cannot be
    /// read is logged and treated as empty.
    pub fn new(level: LevelConfig, config: SimConfig, mut store: Box<dyn RunStore>) -> SimResult<Self> {
        level.validate()?;
        config.validate()?;

        let record = match store.load() {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(%err, "could not load run record, starting empty");
                Default::default()
            }
        };
        let player = fresh_player(&level, &config);
        let ocean = Ocean::new(level.bounds, player, record.essence);

        let mut sim = Self {
            ocean,
            clock: SimClock::new(config.max_delta_ms, config.default_delta_ms),
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(config.max_events),
            systems: Vec::new(),
            store,
            initialized: false,
            ended: None,
            last_signature: None,
            level,
            config,
        };
        sim.add_system(PlayerSystem::new());
        sim.add_system(SpawnSystem::new());
        sim.add_system(LifecycleSystem::new());
        sim.add_system(AiSystem::new());
        sim.add_system(CombatSystem::new());
        sim.add_system(LootSystem::new());
        tracing::debug!(level = %sim.level.name, seed = sim.config.seed, "simulation created");
        Ok(sim)
    }

    /// Register a system. Systems are ticked in registration order, after the
    /// built-in ones.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Initialize all registered systems. Populates the ocean.
    pub fn init(&mut self) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        let idle = InputFrame::idle();
        self.each_system(&idle, |system, ctx| system.init(ctx))?;
        self.initialized = true;
        Ok(())
    }

    /// Advance the run to the frame stamped `now_ms`.
    ///
    /// Returns `Ok(false)` once the run has ended; ticking again before
    /// [`Simulation::reset_run`] is an error.
    pub fn tick(&mut self, input: &InputFrame, now_ms: f64, callbacks: &mut dyn RunCallbacks) -> SimResult<bool> {
        if self.ended.is_some() {
            return Err(SimError::RunEnded);
        }
        if !self.initialized {
            self.init()?;
        }

        self.clock.advance(now_ms);
        self.each_system(input, |system, ctx| system.tick(ctx))?;
        let purged = self.ocean.purge_fish();
        tracing::trace!(
            frame = self.clock.frame(),
            fish = self.ocean.fish.len(),
            purged,
            "frame done"
        );

        let stats = self.stats();
        if let Some(end) = self.terminal_state() {
            self.finish(end, &stats, callbacks);
        }
        let signature = stats.signature();
        if self.last_signature != Some(signature) {
            self.last_signature = Some(signature);
            callbacks.on_stats_update(&stats);
        }
        Ok(self.ended.is_none())
    }

    /// Start a fresh run on the same level. Collected essence carries over.
    pub fn reset_run(&mut self) {
        let essence = std::mem::take(&mut self.ocean.essence);
        let player = fresh_player(&self.level, &self.config);
        self.ocean = Ocean::new(self.level.bounds, player, essence);
        self.clock.reset();
        self.events.clear();
        for system in &mut self.systems {
            system.reset();
        }
        self.initialized = false;
        self.ended = None;
        self.last_signature = None;
        tracing::debug!(level = %self.level.name, "run reset");
    }

    /// Begin fading a fish out now.
    pub fn request_despawn(&mut self, id: EntityId) -> SimResult<()> {
        let now = self.clock.now_ms();
        let fish = self
            .ocean
            .fish
            .iter_mut()
            .find(|f| f.id == id && f.lifecycle().is_live())
            .ok_or(SimError::EntityNotFound(id))?;
        if begin_despawn(fish, now)? {
            let description = format!("a {} was sent away", fish.template.species);
            self.events.push(SimEvent::new(
                self.clock.frame(),
                now,
                SimEventKind::DespawnStarted {
                    fish: id,
                    reason: "requested".into(),
                },
                description,
            ));
        }
        Ok(())
    }

    /// Current stats snapshot.
    pub fn stats(&self) -> RunStats {
        RunStats::capture(&self.ocean, self.clock.now_ms())
    }

    /// Render view: player, fish, carcasses, and chunks.
    pub fn state(&self) -> &Ocean {
        &self.ocean
    }

    /// Mutable world access for tools and tests.
    pub fn state_mut(&mut self) -> &mut Ocean {
        &mut self.ocean
    }

    /// Transient events for the renderer since the last call.
    pub fn drain_visual_events(&mut self) -> Vec<SimEvent> {
        self.events.drain_visual()
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// How the run ended, if it has.
    pub fn ended(&self) -> Option<RunEnd> {
        self.ended
    }

    pub fn is_ended(&self) -> bool {
        self.ended.is_some()
    }

    /// Access a system by downcasting to a concrete type.
    pub fn get_system<T: System + 'static>(&self) -> Option<&T> {
        self.systems.iter().find_map(|s| s.as_any().downcast_ref::<T>())
    }

    /// Access a system mutably by downcasting to a concrete type.
    pub fn get_system_mut<T: System + 'static>(&mut self) -> Option<&mut T> {
        self.systems
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<T>())
    }

    /// Run `f` on every system in order, each with a fresh context. A system
    /// is swapped out while it runs so it can borrow the rest mutably.
    fn each_system<F>(&mut self, input: &InputFrame, mut f: F) -> SimResult<()>
    where
        F: FnMut(&mut dyn System, &mut SimContext<'_>) -> SimResult<()>,
    {
        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let mut ctx = SimContext {
                ocean: &mut self.ocean,
                level: &self.level,
                config: &self.config,
                clock: &self.clock,
                input,
                events: &mut self.events,
                rng: &mut self.rng,
                store: self.store.as_mut(),
            };
            let result = f(system.as_mut(), &mut ctx);
            self.systems[i] = system;
            if let Err(err) = result {
                tracing::warn!(system = self.systems[i].name(), %err, "system failed");
                return Err(err);
            }
        }
        Ok(())
    }

    fn terminal_state(&self) -> Option<RunEnd> {
        let player = &self.ocean.player;
        if player.vitals.health <= 0.0 || is_starved(player) {
            return Some(RunEnd::GameOver);
        }
        let timed_out = self.level.duration_ms > 0.0 && self.clock.now_ms() >= self.level.duration_ms;
        if player.body.size >= self.level.target_size || timed_out {
            return Some(RunEnd::LevelComplete);
        }
        None
    }

    fn finish(&mut self, end: RunEnd, stats: &RunStats, callbacks: &mut dyn RunCallbacks) {
        if self.ended.is_some() {
            return;
        }
        self.ended = Some(end);
        let idle = InputFrame::idle();
        let mut ctx = SimContext {
            ocean: &mut self.ocean,
            level: &self.level,
            config: &self.config,
            clock: &self.clock,
            input: &idle,
            events: &mut self.events,
            rng: &mut self.rng,
            store: self.store.as_mut(),
        };
        match end {
            RunEnd::LevelComplete => {
                let score = stats.score();
                ctx.persist("size", &stats.size);
                ctx.emit(
                    SimEventKind::LevelComplete { score },
                    format!("level complete at size {:.1}, score {score}", stats.size),
                );
                tracing::debug!(score, size = stats.size, "level complete");
                callbacks.on_level_complete(score, stats);
            }
            RunEnd::GameOver => {
                let cause = if stats.health <= 0.0 { "eaten" } else { "starved" };
                ctx.emit(
                    SimEventKind::GameOver { cause: cause.into() },
                    format!("game over: {cause}"),
                );
                tracing::debug!(cause, "game over");
                callbacks.on_game_over(stats);
            }
        }
    }
}

fn fresh_player(level: &LevelConfig, config: &SimConfig) -> Player {
    let bounds = level.bounds;
    let start = Vec2::new(bounds.center().x, bounds.depth_at(0.3));
    let handling = &config.player;
    let vitals = Vitals::full(handling.base_stamina, handling.hunger_drain_rate, handling.max_health);
    Player::new(start, level.player_start_size, vitals)
}

/// Placeholder system used during the swap-and-tick pattern.
#[derive(Debug)]
struct NoopSystem;

impl System for NoopSystem {
    fn name(&self) -> &str {
        "noop"
    }
    fn tick(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
