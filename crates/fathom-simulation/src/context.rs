use rand::rngs::StdRng;
use serde::Serialize;

use fathom_core::LevelConfig;

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::input::InputFrame;
use crate::state::Ocean;
use crate::store::{RunStore, StoreError};

/// Mutable context passed to each system during a tick.
pub struct SimContext<'a> {
    /// World state.
    pub ocean: &'a mut Ocean,
    /// Read-only level configuration.
    pub level: &'a LevelConfig,
    /// Tuning.
    pub config: &'a SimConfig,
    /// Frame clock.
    pub clock: &'a SimClock,
    /// This frame's input.
    pub input: &'a InputFrame,
    /// Event sink.
    pub events: &'a mut EventLog,
    /// Seeded randomness.
    pub rng: &'a mut StdRng,
    /// Persistence collaborator.
    pub store: &'a mut dyn RunStore,
}

impl SimContext<'_> {
    /// Emit a simulation event at the current frame.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events.push(SimEvent::new(
            self.clock.frame(),
            self.clock.now_ms(),
            kind,
            description,
        ));
    }

    /// Save one key through the store. Failures are logged and reported as a
    /// [`SimEventKind::PersistenceFailed`] event; the tick carries on.
    pub fn persist<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let result = serde_json::to_value(value)
            .map_err(StoreError::from)
            .and_then(|v| self.store.save(key, v));
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key, %err, "failed to persist run progress");
                let description = format!("could not save {key}: {err}");
                self.emit(
                    SimEventKind::PersistenceFailed {
                        reason: err.to_string(),
                    },
                    description,
                );
                false
            }
        }
    }

    /// Simulation time in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Step of this frame in seconds.
    pub fn dt(&self) -> f32 {
        self.clock.dt()
    }
}
