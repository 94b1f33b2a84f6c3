//! The stamina battle: an earlier combat model kept as a disabled variant.
//!
//! Two creatures in contact drain each other's stamina, each in proportion to
//! the opponent's size. Whoever runs dry first is knocked out and can then be
//! eaten whole. Only reachable under [`CombatModel::StaminaBattle`](super::CombatModel).

use fathom_core::{Actor, safe_div};

use super::CombatConfig;

/// Which side of a battle lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loser {
    /// The first argument.
    First,
    /// The second argument.
    Second,
}

/// Advance a stamina battle by `dt` seconds. Returns the side that was
/// knocked out this step, if any. When both run dry together the smaller
/// creature loses; an exact tie knocks out the second.
pub fn stamina_battle<A, B>(a: &mut A, b: &mut B, dt: f32, config: &CombatConfig) -> Option<Loser>
where
    A: Actor + ?Sized,
    B: Actor + ?Sized,
{
    let (size_a, size_b) = (a.size(), b.size());
    let drain_a = config.battle_drain_rate * safe_div(size_b, size_a) * dt.max(0.0);
    let drain_b = config.battle_drain_rate * safe_div(size_a, size_b) * dt.max(0.0);

    let va = a.vitals_mut();
    va.stamina = (va.stamina - drain_a).max(0.0);
    va.is_dashing = false;
    let a_out = va.stamina <= 0.0;

    let vb = b.vitals_mut();
    vb.stamina = (vb.stamina - drain_b).max(0.0);
    vb.is_dashing = false;
    let b_out = vb.stamina <= 0.0;

    match (a_out, b_out) {
        (false, false) => None,
        (true, false) => Some(Loser::First),
        (false, true) => Some(Loser::Second),
        (true, true) if size_a < size_b => Some(Loser::First),
        (true, true) => Some(Loser::Second),
    }
}
