use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for every simulated entity (fish, carcass, chunk).
///
/// Entities never own each other. Cross-references such as a chase target or
/// a chunk's originating carcass are stored as an `EntityId` and resolved
/// against the live lists each tick, so a stale id simply resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_short_prefix() {
        let id = EntityId::new();
        assert_eq!(id.to_string().len(), 8);
        assert!(id.0.to_string().starts_with(&id.to_string()));
    }

    #[test]
    fn serde_roundtrip_is_transparent_uuid() {
        let id = EntityId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
    }
}
