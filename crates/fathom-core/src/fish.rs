//! AI-controlled creatures and their lifecycle state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, Body, CombatTimers, Vitals};
use crate::entity::EntityId;
use crate::error::{CoreError, CoreResult};
use crate::geometry::Vec2;
use crate::level::{CreatureClass, CreatureTemplate};

/// Presence and combat phase of a fish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Fading in; not collidable.
    Spawning,
    /// Normal behavior.
    Active,
    /// Out of stamina; slowed and unable to dash until fully recovered.
    Exhausted,
    /// Lost a stamina battle (legacy combat model only).
    KnockedOut,
    /// Health reached zero; converted to loot this tick.
    Dying,
    /// Fading out.
    Despawning,
    /// Gone; purged at the end of the tick.
    Removed,
}

impl Lifecycle {
    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: Lifecycle) -> bool {
        use Lifecycle::*;
        matches!(
            (self, next),
            (Spawning, Active | Despawning)
                | (Active, Exhausted | KnockedOut | Dying | Despawning)
                | (Exhausted, Active | KnockedOut | Dying | Despawning)
                | (KnockedOut, Active | Dying | Despawning)
                | (Dying, Removed)
                | (Despawning, Removed)
        )
    }

    /// Whether other entities can collide with, attack, or target this fish.
    pub fn is_collidable(self) -> bool {
        matches!(self, Self::Active | Self::Exhausted | Self::KnockedOut)
    }

    /// Whether the fish still counts toward the population.
    pub fn is_live(self) -> bool {
        !matches!(self, Self::Dying | Self::Removed)
    }

    /// Whether the fish makes its own movement decisions this tick.
    pub fn is_thinking(self) -> bool {
        matches!(self, Self::Active | Self::Exhausted)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Spawning => "spawning",
            Self::Active => "active",
            Self::Exhausted => "exhausted",
            Self::KnockedOut => "knocked_out",
            Self::Dying => "dying",
            Self::Despawning => "despawning",
            Self::Removed => "removed",
        };
        write!(f, "{s}")
    }
}

/// What the AI decided last tick, plus the bookkeeping it needs across ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AiMemory {
    /// Fish currently being chased. `None` with `chasing_player` means the player.
    pub chase_target: Option<EntityId>,
    /// Whether the current chase target is the player.
    pub chasing_player: bool,
    /// Nearest threat being fled from.
    pub flee_target: Option<EntityId>,
    /// Whether the player is among the threats.
    pub fleeing_player: bool,
    /// Closest distance to the chase target achieved so far.
    pub best_chase_distance: f32,
    /// When the chase last made progress.
    pub last_progress_ms: f64,
    /// No chasing until this time after giving up.
    pub give_up_until_ms: f64,
    /// Time spent dashing continuously, feeds the drain ramp.
    pub dash_time: f32,
}

impl AiMemory {
    /// Whether the fish is chasing anything.
    pub fn is_chasing(&self) -> bool {
        self.chase_target.is_some() || self.chasing_player
    }

    /// Whether the fish is fleeing anything.
    pub fn is_fleeing(&self) -> bool {
        self.flee_target.is_some() || self.fleeing_player
    }

    /// Forget the chase.
    pub fn clear_chase(&mut self) {
        self.chase_target = None;
        self.chasing_player = false;
        self.best_chase_distance = f32::MAX;
    }

    /// Forget the flight.
    pub fn clear_flee(&mut self) {
        self.flee_target = None;
        self.fleeing_player = false;
    }
}

/// A non-player creature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fish {
    /// Identity used by weak references.
    pub id: EntityId,
    /// Species definition it was spawned from.
    pub template: CreatureTemplate,
    /// Kinematics and render hints.
    pub body: Body,
    vitals: Option<Vitals>,
    /// Combat animation timers.
    pub timers: CombatTimers,
    lifecycle: Lifecycle,
    /// When the fade-in starts (includes batch stagger).
    pub spawn_at_ms: f64,
    /// Fade-in duration.
    pub fade_in_ms: f64,
    /// When the fade-out started, if despawning.
    pub despawn_started_ms: Option<f64>,
    /// Fade-out duration.
    pub fade_out_ms: f64,
    /// Scheduled natural despawn time.
    pub despawn_at_ms: Option<f64>,
    /// Render opacity in `0..=1`.
    pub opacity: f32,
    /// Set on exhaustion; blocks dashing until stamina is back at its ceiling.
    pub recovering_from_exhausted: bool,
    /// When the fish was knocked out (legacy combat model).
    pub knocked_out_at_ms: Option<f64>,
    /// AI decision state.
    pub ai: AiMemory,
}

impl Fish {
    /// Create a fish in the `Spawning` state with opacity 0. Vitals are left
    /// unset and are defaulted from the template on first touch.
    pub fn spawn(template: CreatureTemplate, position: Vec2, spawn_at_ms: f64, fade_in_ms: f64) -> Self {
        let body = Body::at(position, template.size);
        Self {
            id: EntityId::new(),
            template,
            body,
            vitals: None,
            timers: CombatTimers::default(),
            lifecycle: Lifecycle::Spawning,
            spawn_at_ms,
            fade_in_ms,
            despawn_started_ms: None,
            fade_out_ms: 600.0,
            despawn_at_ms: None,
            opacity: 0.0,
            recovering_from_exhausted: false,
            knocked_out_at_ms: None,
            ai: AiMemory {
                best_chase_distance: f32::MAX,
                ..AiMemory::default()
            },
        }
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Move to `next` if the state machine allows it.
    pub fn transition(&mut self, next: Lifecycle) -> CoreResult<()> {
        if !self.lifecycle.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                id: self.id,
                from: self.lifecycle,
                to: next,
            });
        }
        self.lifecycle = next;
        Ok(())
    }

    /// Behavioral class shortcut.
    pub fn class(&self) -> CreatureClass {
        self.template.class
    }

    /// Whether vitals have been initialized yet.
    pub fn has_vitals(&self) -> bool {
        self.vitals.is_some()
    }

    fn default_vitals(&self) -> Vitals {
        Vitals::full(
            self.template.base_stamina,
            self.template.hunger_drain_rate,
            self.template.health,
        )
    }
}

impl Actor for Fish {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn vitals(&self) -> Vitals {
        self.vitals.unwrap_or_else(|| self.default_vitals())
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        let defaults = self.default_vitals();
        self.vitals.get_or_insert(defaults)
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

    fn sardine() -> Fish {
        let t = CreatureTemplate::new("sardine", CreatureClass::SmallPrey, 12.0, 90.0);
        Fish::spawn(t, Vec2::new(10.0, 10.0), 0.0, 500.0)
    }

    #[test]
    fn spawns_invisible_and_spawning() {
        let fish = sardine();
        assert_eq!(fish.lifecycle(), Lifecycle::Spawning);
        assert_eq!(fish.opacity, 0.0);
        assert!(!fish.lifecycle().is_collidable());
    }

    #[test]
    fn vitals_default_lazily() {
        let mut fish = sardine();
        assert!(!fish.has_vitals());
        let snapshot = fish.vitals();
        assert!(!fish.has_vitals());
        assert!((snapshot.hunger - 100.0).abs() < f32::EPSILON);

        fish.vitals_mut().stamina = 12.0;
        assert!(fish.has_vitals());
        assert!((fish.vitals().stamina - 12.0).abs() < f32::EPSILON);
    }

    #[test]
    fn legal_path_through_lifecycle() {
        let mut fish = sardine();
        fish.transition(Lifecycle::Active).unwrap();
        fish.transition(Lifecycle::Exhausted).unwrap();
        fish.transition(Lifecycle::Active).unwrap();
        fish.transition(Lifecycle::Dying).unwrap();
        fish.transition(Lifecycle::Removed).unwrap();
        assert_eq!(fish.lifecycle(), Lifecycle::Removed);
    }

    #[test]
    fn illegal_transition_is_rejected_without_change() {
        let mut fish = sardine();
        let err = fish.transition(Lifecycle::Dying).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                from: Lifecycle::Spawning,
                to: Lifecycle::Dying,
                ..
            }
        ));
        assert_eq!(fish.lifecycle(), Lifecycle::Spawning);
    }

    #[test]
    fn removed_is_terminal() {
        use Lifecycle::*;
        for next in [Spawning, Active, Exhausted, KnockedOut, Dying, Despawning, Removed] {
            assert!(!Removed.can_transition_to(next));
        }
    }

    #[test]
    fn liveness_and_thinking() {
        assert!(!Lifecycle::Dying.is_live());
        assert!(Lifecycle::Despawning.is_live());
        assert!(Lifecycle::Exhausted.is_thinking());
        assert!(!Lifecycle::KnockedOut.is_thinking());
    }
}
