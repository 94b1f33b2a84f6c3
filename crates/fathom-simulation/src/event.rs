use fathom_core::{EntityId, Vec2};

/// Who took part in a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combatant {
    /// The player.
    Player,
    /// A fish, by id.
    Fish(EntityId),
}

impl Combatant {
    fn is(&self, id: EntityId) -> bool {
        matches!(self, Self::Fish(f) if *f == id)
    }
}

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEventKind {
    // Population
    /// A fish was created and started fading in.
    FishSpawned {
        /// The new fish.
        fish: EntityId,
        /// Its species.
        species: String,
    },
    /// A fish began fading out.
    DespawnStarted {
        /// The fish leaving.
        fish: EntityId,
        /// Why it is leaving.
        reason: String,
    },
    /// A fish finished fading out and left the world.
    FishDespawned {
        /// The fish that left.
        fish: EntityId,
    },

    // Resources
    /// A fish ran out of stamina.
    Exhausted {
        /// The exhausted fish.
        fish: EntityId,
    },
    /// A fish recovered to its stamina ceiling.
    Recovered {
        /// The recovered fish.
        fish: EntityId,
    },

    // Combat
    /// A bite landed. Rendered as a damage number.
    DamageDealt {
        /// Who bit.
        attacker: Combatant,
        /// Who was bitten.
        target: Combatant,
        /// Health removed.
        amount: u32,
        /// Where to show the number.
        at: Vec2,
    },
    /// Blood particles at a hit.
    BloodBurst {
        /// Burst center.
        at: Vec2,
        /// Relative size of the burst.
        intensity: f32,
    },
    /// A fish lost a stamina battle (legacy combat model).
    KnockedOut {
        /// The knocked-out fish.
        fish: EntityId,
    },
    /// A fish died and became loot.
    FishDied {
        /// The dead fish.
        fish: EntityId,
        /// Its species.
        species: String,
        /// Who killed it.
        killer: Combatant,
        /// Where the carcass appeared.
        at: Vec2,
    },

    // Loot
    /// The player picked up a batch of chunks.
    ChunksCollected {
        /// Meat chunks in the batch.
        meat: u32,
        /// Essence credited by the batch.
        essence: u64,
        /// Size gained.
        growth: f32,
        /// Where to show the pop.
        at: Vec2,
    },
    /// A carcass faded out completely.
    CarcassRetired {
        /// The retired carcass.
        carcass: EntityId,
    },
    /// Saving progress failed; the run continues.
    PersistenceFailed {
        /// Store error text.
        reason: String,
    },

    // Run
    /// The level was completed.
    LevelComplete {
        /// Final score.
        score: u64,
    },
    /// The player died or starved.
    GameOver {
        /// What ended the run.
        cause: String,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::FishSpawned { fish, .. }
            | Self::DespawnStarted { fish, .. }
            | Self::FishDespawned { fish }
            | Self::Exhausted { fish }
            | Self::Recovered { fish }
            | Self::KnockedOut { fish } => *fish == id,
            Self::FishDied { fish, killer, .. } => *fish == id || killer.is(id),
            Self::DamageDealt {
                attacker, target, ..
            } => attacker.is(id) || target.is(id),
            Self::CarcassRetired { carcass } => *carcass == id,
            Self::BloodBurst { .. }
            | Self::ChunksCollected { .. }
            | Self::PersistenceFailed { .. }
            | Self::LevelComplete { .. }
            | Self::GameOver { .. } => false,
        }
    }

    /// Whether a renderer should draw this event (damage numbers, blood,
    /// collection pops).
    pub fn is_visual(&self) -> bool {
        matches!(
            self,
            Self::DamageDealt { .. } | Self::BloodBurst { .. } | Self::ChunksCollected { .. }
        )
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The frame when this event occurred.
    pub frame: u64,
    /// Simulation time when this event occurred.
    pub at_ms: f64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event.
    pub fn new(frame: u64, at_ms: f64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            frame,
            at_ms,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a run, plus a buffer of visual events waiting
/// for the renderer.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    visual: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            visual: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        if event.kind.is_visual() {
            self.visual.push(event.clone());
        }
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Take the visual events recorded since the last drain.
    pub fn drain_visual(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.visual)
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given frame.
    pub fn events_at_frame(&self, frame: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.frame == frame).collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Count events matching a predicate.
    pub fn count(&self, pred: impl Fn(&SimEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events, visual ones included.
    pub fn clear(&mut self) {
        self.events.clear();
        self.visual.clear();
    }
}
