//! Contact combat between fish and with the player, and the conversion of
//! deaths into loot.

use fathom_core::{Actor, Fish, Lifecycle};
use fathom_mechanics::combat::legacy::{Loser, stamina_battle};
use fathom_mechanics::growth::hunger_from_prey;
use fathom_mechanics::{
    CombatModel, apply_growth, can_attack, growth_from_prey, resolve_attack, restore_hunger,
};

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::{Combatant, SimEventKind};
use crate::loot::drop_remains;
use crate::state::{Killer, PendingDeath, pair_mut};
use crate::system::System;

type Notes = Vec<(SimEventKind, String)>;

/// Resolves bites, battles, and deaths.
#[derive(Debug, Default)]
pub struct CombatSystem {
    bites: u64,
}

impl CombatSystem {
    /// Create the combat phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bites landed since the run started.
    pub fn bites(&self) -> u64 {
        self.bites
    }

    fn fish_bites(&mut self, ctx: &mut SimContext<'_>, notes: &mut Notes) -> SimResult<()> {
        let now = ctx.now_ms();
        let config = &ctx.config.combat;
        let ocean = &mut *ctx.ocean;
        let index = ocean.live_index();

        for i in 0..ocean.fish.len() {
            let attacker = &ocean.fish[i];
            if !attacker.lifecycle().is_thinking()
                || !attacker.class().is_predator()
                || attacker.ai.is_fleeing()
            {
                continue;
            }
            let Some(&j) = attacker.ai.chase_target.and_then(|id| index.get(&id)) else {
                continue;
            };
            let Some((a, t)) = pair_mut(&mut ocean.fish, i, j) else {
                continue;
            };
            if !t.lifecycle().is_collidable() || !a.body.touches(&t.body) || !can_attack(&*a, now, config) {
                continue;
            }
            let damage = a.template.damage;
            let outcome = resolve_attack(a, t, damage, now, config);
            self.bites += 1;
            bite_notes(notes, Combatant::Fish(a.id), Combatant::Fish(t.id), outcome.damage, t);
            if outcome.died {
                t.transition(Lifecycle::Dying)?;
                ocean.deaths.push(PendingDeath {
                    victim: t.id,
                    killer: Killer::Fish(a.id),
                    at: a.body.position.midpoint(t.body.position),
                });
            }
        }
        Ok(())
    }

    fn stamina_battles(&mut self, ctx: &mut SimContext<'_>, notes: &mut Notes) -> SimResult<()> {
        let now = ctx.now_ms();
        let dt = ctx.dt();
        let config = &ctx.config.combat;
        let ocean = &mut *ctx.ocean;
        let index = ocean.live_index();

        for i in 0..ocean.fish.len() {
            let attacker = &ocean.fish[i];
            if !attacker.lifecycle().is_thinking() || !attacker.class().is_predator() {
                continue;
            }
            let Some(&j) = attacker.ai.chase_target.and_then(|id| index.get(&id)) else {
                continue;
            };
            let Some((a, t)) = pair_mut(&mut ocean.fish, i, j) else {
                continue;
            };
            if !t.lifecycle().is_collidable() || !a.body.touches(&t.body) {
                continue;
            }
            if t.lifecycle() == Lifecycle::KnockedOut {
                swallow(t)?;
                ocean.deaths.push(PendingDeath {
                    victim: t.id,
                    killer: Killer::Fish(a.id),
                    at: a.body.position.midpoint(t.body.position),
                });
                continue;
            }
            let loser = match stamina_battle(a, t, dt, config) {
                Some(Loser::First) => a,
                Some(Loser::Second) => t,
                None => continue,
            };
            loser.transition(Lifecycle::KnockedOut)?;
            loser.knocked_out_at_ms = Some(now);
            tracing::debug!(id = %loser.id, "fish knocked out");
            notes.push((
                SimEventKind::KnockedOut { fish: loser.id },
                format!("a {} was knocked out", loser.template.species),
            ));
        }
        Ok(())
    }

    fn player_fights(&mut self, ctx: &mut SimContext<'_>, notes: &mut Notes) -> SimResult<()> {
        let now = ctx.now_ms();
        let config = &ctx.config.combat;
        let handling = &ctx.config.player;
        let ocean = &mut *ctx.ocean;
        let player = &mut ocean.player;

        for fish in ocean.fish.iter_mut() {
            if player.vitals.health <= 0.0 {
                break;
            }
            if !fish.lifecycle().is_collidable() || !player.body.touches(&fish.body) {
                continue;
            }

            if fish.lifecycle() == Lifecycle::KnockedOut {
                swallow(fish)?;
                ocean.deaths.push(PendingDeath {
                    victim: fish.id,
                    killer: Killer::Player,
                    at: player.body.position.midpoint(fish.body.position),
                });
                continue;
            }

            if can_attack(&*player, now, config) {
                let damage = if player.vitals.is_dashing {
                    handling.base_damage * handling.dash_damage_multiplier
                } else {
                    handling.base_damage
                };
                let outcome = resolve_attack(player, fish, damage, now, config);
                self.bites += 1;
                ocean.tally.damage_dealt += u64::from(outcome.damage);
                bite_notes(notes, Combatant::Player, Combatant::Fish(fish.id), outcome.damage, fish);
                if outcome.died {
                    fish.transition(Lifecycle::Dying)?;
                    ocean.deaths.push(PendingDeath {
                        victim: fish.id,
                        killer: Killer::Player,
                        at: player.body.position.midpoint(fish.body.position),
                    });
                    continue;
                }
            }

            let bites_back = fish.lifecycle().is_thinking()
                && fish.class().is_predator()
                && fish.ai.chasing_player
                && !fish.ai.is_fleeing();
            if bites_back && can_attack(&*fish, now, config) {
                let damage = fish.template.damage;
                let outcome = resolve_attack(fish, player, damage, now, config);
                self.bites += 1;
                ocean.tally.damage_taken += u64::from(outcome.damage);
                let at = player.body.position;
                notes.push((
                    SimEventKind::DamageDealt {
                        attacker: Combatant::Fish(fish.id),
                        target: Combatant::Player,
                        amount: outcome.damage,
                        at,
                    },
                    format!("a {} bit you for {}", fish.template.species, outcome.damage),
                ));
                notes.push((
                    SimEventKind::BloodBurst {
                        at,
                        intensity: outcome.damage as f32 / player.vitals.max_health.max(1.0),
                    },
                    "blood in the water".into(),
                ));
            }
        }
        Ok(())
    }

    /// Turn every pending death into a carcass and chunks, feed AI killers,
    /// and retire the victim.
    fn process_deaths(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let deaths = std::mem::take(&mut ctx.ocean.deaths);
        let config = ctx.config;
        let growth = &config.growth;
        for death in deaths {
            let Some(idx) = ctx.ocean.fish.iter().position(|f| f.id == death.victim) else {
                continue;
            };
            if ctx.ocean.fish[idx].lifecycle() != Lifecycle::Dying {
                continue;
            }
            let victim = ctx.ocean.fish[idx].clone();
            let chunks = drop_remains(ctx.ocean, ctx.rng, config, &victim, death.at, ctx.clock.now_ms());

            let killer = match death.killer {
                Killer::Player => {
                    ctx.ocean.tally.kills += 1;
                    Combatant::Player
                }
                Killer::Fish(id) => {
                    if let Some(k) = ctx.ocean.fish_by_id_mut(id) {
                        if k.lifecycle().is_live() {
                            let gain = growth_from_prey(k.size(), victim.size(), growth);
                            apply_growth(k, gain, growth);
                            restore_hunger(k, hunger_from_prey(victim.size(), growth));
                        }
                    }
                    Combatant::Fish(id)
                }
            };

            ctx.ocean.fish[idx].transition(Lifecycle::Removed)?;
            tracing::debug!(id = %victim.id, species = %victim.template.species, chunks, "fish died");
            ctx.emit(
                SimEventKind::FishDied {
                    fish: victim.id,
                    species: victim.template.species.clone(),
                    killer,
                    at: death.at,
                },
                format!("a {} died", victim.template.species),
            );
        }
        Ok(())
    }
}

/// Eat a knocked-out fish whole.
fn swallow(fish: &mut Fish) -> SimResult<()> {
    fish.vitals_mut().health = 0.0;
    fish.transition(Lifecycle::Dying)?;
    Ok(())
}

fn bite_notes(notes: &mut Notes, attacker: Combatant, target: Combatant, amount: u32, victim: &Fish) {
    let at = victim.body.position;
    notes.push((
        SimEventKind::DamageDealt {
            attacker,
            target,
            amount,
            at,
        },
        format!("a {} took {amount} damage", victim.template.species),
    ));
    notes.push((
        SimEventKind::BloodBurst {
            at,
            intensity: amount as f32 / victim.vitals().max_health.max(1.0),
        },
        "blood in the water".into(),
    ));
}

impl System for CombatSystem {
    fn name(&self) -> &str {
        "combat"
    }

    fn reset(&mut self) {
        self.bites = 0;
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let mut notes = Notes::new();
        match ctx.config.combat_model {
            CombatModel::HealthBased => self.fish_bites(ctx, &mut notes)?,
            CombatModel::StaminaBattle => self.stamina_battles(ctx, &mut notes)?,
        }
        self.player_fights(ctx, &mut notes)?;
        for (kind, description) in notes {
            ctx.emit(kind, description);
        }
        self.process_deaths(ctx)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::Harness;
    use fathom_core::{CreatureClass, CreatureTemplate, Vec2};
    use fathom_mechanics::CombatModel;

    fn active(template: CreatureTemplate, at: Vec2) -> Fish {
        let mut fish = Fish::spawn(template, at, 0.0, 0.0);
        fish.transition(Lifecycle::Active).unwrap();
        fish.opacity = 1.0;
        fish
    }

    fn sardine(at: Vec2) -> Fish {
        active(
            CreatureTemplate::new("sardine", CreatureClass::SmallPrey, 12.0, 90.0).with_health(1.0),
            at,
        )
    }

    fn step(h: &mut Harness, system: &mut CombatSystem, frames: usize) {
        for _ in 0..frames {
            let next = h.clock.now_ms() + 16.0;
            h.advance(next);
            system.tick(&mut h.ctx()).unwrap();
        }
    }

    #[test]
    fn predator_kill_feeds_predator_and_leaves_remains() {
        let mut h = Harness::new();
        let prey = sardine(Vec2::new(305.0, 300.0));
        let mut shark = active(
            CreatureTemplate::new("shark", CreatureClass::Predator, 80.0, 120.0).with_damage(30.0),
            Vec2::new(300.0, 300.0),
        );
        shark.ai.chase_target = Some(prey.id);
        let (shark_id, prey_id) = (shark.id, prey.id);
        h.ocean.fish.push(shark);
        h.ocean.fish.push(prey);

        let mut system = CombatSystem::new();
        step(&mut h, &mut system, 1);

        assert_eq!(h.ocean.fish_by_id(prey_id).unwrap().lifecycle(), Lifecycle::Removed);
        assert!(h.ocean.fish_by_id(shark_id).unwrap().body.size > 80.0);
        assert_eq!(h.ocean.carcasses.len(), 1);
        assert!(!h.ocean.chunks.is_empty());
        assert_eq!(h.ocean.tally.kills, 0);
        assert_eq!(
            h.events.count(|k| matches!(
                k,
                SimEventKind::FishDied { killer: Combatant::Fish(id), .. } if *id == shark_id
            )),
            1
        );
    }

    #[test]
    fn fleeing_predator_never_bites() {
        let mut h = Harness::new();
        let prey = sardine(Vec2::new(305.0, 300.0));
        let mut shark = active(
            CreatureTemplate::new("shark", CreatureClass::Predator, 80.0, 120.0),
            Vec2::new(300.0, 300.0),
        );
        shark.ai.chase_target = Some(prey.id);
        shark.ai.fleeing_player = true;
        h.ocean.fish.push(shark);
        h.ocean.fish.push(prey);

        let mut system = CombatSystem::new();
        step(&mut h, &mut system, 3);
        assert_eq!(system.bites(), 0);
        assert!(h.ocean.carcasses.is_empty());
    }

    #[test]
    fn player_kill_counts_and_drops_loot() {
        let mut h = Harness::new();
        let at = h.ocean.player.body.position;
        h.ocean.fish.push(sardine(at));

        let mut system = CombatSystem::new();
        step(&mut h, &mut system, 1);

        assert_eq!(h.ocean.tally.kills, 1);
        assert!(h.ocean.tally.damage_dealt > 0);
        assert_eq!(h.ocean.carcasses.len(), 1);
        assert_eq!(h.ocean.fish[0].lifecycle(), Lifecycle::Removed);
        assert!(h.ocean.player.timers.attack_flash_until.is_some());
        assert!(!h.events.drain_visual().is_empty());
    }

    #[test]
    fn player_bites_respect_the_cooldown() {
        let mut h = Harness::new();
        let at = h.ocean.player.body.position;
        h.ocean.fish.push(active(
            CreatureTemplate::new("grouper", CreatureClass::Prey, 30.0, 60.0).with_health(1_000.0),
            at,
        ));

        let mut system = CombatSystem::new();
        step(&mut h, &mut system, 5);
        assert_eq!(system.bites(), 1);
        step(&mut h, &mut system, 40);
        assert_eq!(system.bites(), 2);
    }

    #[test]
    fn predator_chasing_the_player_bites_back() {
        let mut h = Harness::new();
        let at = h.ocean.player.body.position;
        let mut eel = active(
            CreatureTemplate::new("eel", CreatureClass::Predator, 30.0, 100.0).with_health(1_000.0),
            at,
        );
        eel.ai.chasing_player = true;
        h.ocean.fish.push(eel);

        let mut system = CombatSystem::new();
        step(&mut h, &mut system, 1);
        assert!(h.ocean.tally.damage_taken > 0);
        assert!(h.ocean.player.vitals.health < h.ocean.player.vitals.max_health);
        assert_eq!(
            h.events.count(|k| matches!(k, SimEventKind::DamageDealt { target: Combatant::Player, .. })),
            1
        );
    }

    #[test]
    fn spawning_fish_cannot_be_bitten() {
        let mut h = Harness::new();
        let at = h.ocean.player.body.position;
        let t = CreatureTemplate::new("sardine", CreatureClass::SmallPrey, 12.0, 90.0);
        h.ocean.fish.push(Fish::spawn(t, at, 0.0, 500.0));

        let mut system = CombatSystem::new();
        step(&mut h, &mut system, 3);
        assert_eq!(system.bites(), 0);
        assert!(!h.ocean.fish[0].has_vitals());
    }

    #[test]
    fn knocked_out_fish_is_swallowed_whole() {
        let mut h = Harness::new();
        h.config.combat_model = CombatModel::StaminaBattle;
        let at = h.ocean.player.body.position;
        let mut fish = active(
            CreatureTemplate::new("grouper", CreatureClass::Prey, 30.0, 60.0).with_health(1_000.0),
            at,
        );
        fish.transition(Lifecycle::KnockedOut).unwrap();
        h.ocean.fish.push(fish);

        let mut system = CombatSystem::new();
        step(&mut h, &mut system, 1);
        assert_eq!(h.ocean.tally.kills, 1);
        assert_eq!(h.ocean.fish[0].lifecycle(), Lifecycle::Removed);
        assert_eq!(system.bites(), 0);
    }

    #[test]
    fn legacy_battle_knocks_out_the_weaker_fish() {
        let mut h = Harness::new();
        h.config.combat_model = CombatModel::StaminaBattle;
        let mut prey = active(
            CreatureTemplate::new("grouper", CreatureClass::Prey, 20.0, 60.0),
            Vec2::new(305.0, 300.0),
        );
        prey.vitals_mut().stamina = 1.0;
        let mut shark = active(
            CreatureTemplate::new("shark", CreatureClass::Predator, 80.0, 120.0),
            Vec2::new(300.0, 300.0),
        );
        shark.ai.chase_target = Some(prey.id);
        let prey_id = prey.id;
        h.ocean.fish.push(shark);
        h.ocean.fish.push(prey);

        let mut system = CombatSystem::new();
        step(&mut h, &mut system, 5);
        let prey = h.ocean.fish_by_id(prey_id).unwrap();
        assert!(matches!(prey.lifecycle(), Lifecycle::KnockedOut | Lifecycle::Removed));
        assert!(h.events.count(|k| matches!(k, SimEventKind::KnockedOut { .. })) >= 1);
    }
}
