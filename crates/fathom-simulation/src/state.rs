//! Mutable world state of a run: the player, the fish, and the loot.

use std::collections::{BTreeMap, HashMap};

use fathom_core::{Bounds, Carcass, Chunk, EntityId, Fish, Player, Vec2};

/// Running totals for the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    /// Fish killed by the player.
    pub kills: u32,
    /// Meat chunks eaten.
    pub meat_collected: u32,
    /// Essence picked up this run.
    pub essence_collected: u64,
    /// Damage the player dealt.
    pub damage_dealt: u64,
    /// Damage the player took.
    pub damage_taken: u64,
}

/// Who landed a killing blow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Killer {
    /// The player.
    Player,
    /// Another fish.
    Fish(EntityId),
}

/// A death waiting to be converted into loot within the same tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingDeath {
    /// The dying fish.
    pub victim: EntityId,
    /// Who killed it.
    pub killer: Killer,
    /// Attacker/victim midpoint where the carcass appears.
    pub at: Vec2,
}

/// Everything that moves.
#[derive(Debug, Clone)]
pub struct Ocean {
    /// World rectangle.
    pub bounds: Bounds,
    /// The player.
    pub player: Player,
    /// Every fish, including ones fading in or out.
    pub fish: Vec<Fish>,
    /// Carcasses still visible.
    pub carcasses: Vec<Carcass>,
    /// Chunks not yet collected or expired.
    pub chunks: Vec<Chunk>,
    /// Essence balance, seeded from the store.
    pub essence: BTreeMap<String, u64>,
    /// Run totals.
    pub tally: Tally,
    pub(crate) deaths: Vec<PendingDeath>,
}

impl Ocean {
    /// An empty ocean around the given player.
    pub fn new(bounds: Bounds, player: Player, essence: BTreeMap<String, u64>) -> Self {
        Self {
            bounds,
            player,
            fish: Vec::new(),
            carcasses: Vec::new(),
            chunks: Vec::new(),
            essence,
            tally: Tally::default(),
            deaths: Vec::new(),
        }
    }

    /// Map from id to position in `fish` for every live fish.
    pub fn live_index(&self) -> HashMap<EntityId, usize> {
        self.fish
            .iter()
            .enumerate()
            .filter(|(_, f)| f.lifecycle().is_live())
            .map(|(i, f)| (f.id, i))
            .collect()
    }

    /// Number of fish that count toward the population.
    pub fn live_count(&self) -> usize {
        self.fish.iter().filter(|f| f.lifecycle().is_live()).count()
    }

    /// Look up a fish by id.
    pub fn fish_by_id(&self, id: EntityId) -> Option<&Fish> {
        self.fish.iter().find(|f| f.id == id)
    }

    /// Look up a fish by id, mutably.
    pub fn fish_by_id_mut(&mut self, id: EntityId) -> Option<&mut Fish> {
        self.fish.iter_mut().find(|f| f.id == id)
    }

    /// Look up a carcass by id, mutably.
    pub fn carcass_mut(&mut self, id: EntityId) -> Option<&mut Carcass> {
        self.carcasses.iter_mut().find(|c| c.id == id)
    }

    /// Total essence across every currency type.
    pub fn total_essence(&self) -> u64 {
        self.essence.values().sum()
    }

    /// Drop dying and removed fish. Returns how many left.
    pub(crate) fn purge_fish(&mut self) -> usize {
        let before = self.fish.len();
        self.fish.retain(|f| f.lifecycle().is_live());
        before - self.fish.len()
    }
}

/// Mutable access to two distinct fish at once.
pub(crate) fn pair_mut(fish: &mut [Fish], a: usize, b: usize) -> Option<(&mut Fish, &mut Fish)> {
    if a == b || a >= fish.len() || b >= fish.len() {
        return None;
    }
    if a < b {
        let (left, right) = fish.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = fish.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}
