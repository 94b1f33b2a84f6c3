//! Presence transitions: fade-in, scheduled and forced despawns, fade-out,
//! and knockout recovery.

use fathom_core::{Actor, CoreResult, Fish, Lifecycle};

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::motion::apply_drag;
use crate::system::System;

/// Start fading a fish out at `start_ms`. Returns `false` when it is already
/// leaving or dead.
pub fn begin_despawn(fish: &mut Fish, start_ms: f64) -> CoreResult<bool> {
    if matches!(
        fish.lifecycle(),
        Lifecycle::Despawning | Lifecycle::Dying | Lifecycle::Removed
    ) {
        return Ok(false);
    }
    fish.transition(Lifecycle::Despawning)?;
    fish.despawn_started_ms = Some(start_ms);
    if fish.has_vitals() {
        fish.vitals_mut().is_dashing = false;
    }
    Ok(true)
}

/// Drives every fish through its presence states.
#[derive(Debug, Default)]
pub struct LifecycleSystem {
    despawned: u64,
}

impl LifecycleSystem {
    /// Create the lifecycle phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fish that finished fading out since the run started.
    pub fn despawned(&self) -> u64 {
        self.despawned
    }
}

impl System for LifecycleSystem {
    fn name(&self) -> &str {
        "lifecycle"
    }

    fn reset(&mut self) {
        self.despawned = 0;
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        let dt = ctx.dt();
        let config = ctx.config;
        let stagger = ctx.level.spawn.stagger_ms;
        let bounds = ctx.ocean.bounds;
        let mut fades_started = 0usize;
        let mut notes = Vec::new();

        for fish in ctx.ocean.fish.iter_mut() {
            match fish.lifecycle() {
                Lifecycle::Spawning => {
                    if now < fish.spawn_at_ms {
                        continue;
                    }
                    let progress = if fish.fade_in_ms <= 0.0 {
                        1.0
                    } else {
                        (now - fish.spawn_at_ms) / fish.fade_in_ms
                    };
                    fish.opacity = progress.clamp(0.0, 1.0) as f32;
                    if progress >= 1.0 {
                        fish.transition(Lifecycle::Active)?;
                        tracing::debug!(id = %fish.id, species = %fish.template.species, "fish active");
                    }
                }
                Lifecycle::Active | Lifecycle::Exhausted => {
                    let expired = fish.despawn_at_ms.is_some_and(|t| now >= t)
                        && !fish.timers.is_hit_flashing(now);
                    let strayed =
                        bounds.distance_outside(fish.body.position) > config.ai.despawn_margin;
                    if expired || strayed {
                        let start = now + fades_started as f64 * stagger;
                        if begin_despawn(fish, start)? {
                            fades_started += 1;
                            let reason = if strayed { "strayed" } else { "lifespan over" };
                            notes.push((
                                SimEventKind::DespawnStarted {
                                    fish: fish.id,
                                    reason: reason.into(),
                                },
                                format!("a {} is leaving ({reason})", fish.template.species),
                            ));
                        }
                    }
                }
                Lifecycle::KnockedOut => {
                    fish.body.velocity = apply_drag(fish.body.velocity, config.ai.passive_drag, dt);
                    let recovered = fish
                        .knocked_out_at_ms
                        .is_none_or(|t| now >= t + config.combat.knockout_recovery_ms);
                    if recovered && !fish.timers.is_hit_flashing(now) {
                        fish.transition(Lifecycle::Active)?;
                        fish.knocked_out_at_ms = None;
                        fish.recovering_from_exhausted = true;
                        notes.push((
                            SimEventKind::Recovered { fish: fish.id },
                            format!("a {} came to", fish.template.species),
                        ));
                    }
                }
                Lifecycle::Despawning => {
                    let started = fish.despawn_started_ms.unwrap_or(now);
                    if now < started {
                        continue;
                    }
                    let progress = if fish.fade_out_ms <= 0.0 {
                        1.0
                    } else {
                        (now - started) / fish.fade_out_ms
                    };
                    fish.opacity = fish.opacity.min((1.0 - progress).clamp(0.0, 1.0) as f32);
                    if progress >= 1.0 {
                        fish.transition(Lifecycle::Removed)?;
                        self.despawned += 1;
                        tracing::debug!(id = %fish.id, "fish despawned");
                        notes.push((
                            SimEventKind::FishDespawned { fish: fish.id },
                            format!("a {} swam off", fish.template.species),
                        ));
                    }
                }
                Lifecycle::Dying | Lifecycle::Removed => {}
            }
        }

        for (kind, description) in notes {
            ctx.emit(kind, description);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
