//! Shared identity and authority types.
//!
//! Everything here is plain data. Ability side-state refers to other
//! entities only through these ids, never through references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Simulation time measured in ticks.
pub type Ticks = u32;

/// Identifier of a simulation entity.
///
/// Ids are owned by the host simulation and may be reused after an entity is
/// removed, so any stored id must be re-validated against the host before
/// use. Negative values are sentinels and never name a live entity.
///
/// # Example
///
/// ```
/// use ability_core::components::EntityId;
///
/// assert!(EntityId::new(7).is_valid());
/// assert!(!EntityId::NONE.is_valid());
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EntityId(i64);

impl EntityId {
    /// Sentinel value indicating no entity.
    pub const NONE: Self = Self(-1);

    /// Create a new entity id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Check if this id could name an entity (not a sentinel).
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Team (allegiance) of an entity.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TeamId(pub u8);

impl TeamId {
    /// Neutral team, hostile to nobody.
    pub const NEUTRAL: Self = Self(0);

    /// Whether two teams are enemies. Neutral is never an enemy.
    #[must_use]
    pub const fn is_enemy_of(self, other: Self) -> bool {
        self.0 != other.0 && self.0 != Self::NEUTRAL.0 && other.0 != Self::NEUTRAL.0
    }
}

/// Authority capability of the caller.
///
/// Shared ability state (phases, side-state, reservations) is written by the
/// authoritative simulation only. Observers replicate the host's statuses and
/// may read derived values, but every mutating entry point is a no-op for
/// them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// The simulating host.
    #[default]
    Authoritative,
    /// A passive replica such as a network client.
    Observer,
}

impl Role {
    /// Whether this role may mutate shared ability state.
    #[must_use]
    pub const fn can_mutate(self) -> bool {
        matches!(self, Self::Authoritative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_ids() {
        assert!(!EntityId::new(-5).is_valid());
        assert!(EntityId::new(0).is_valid());
        assert_eq!(EntityId::NONE.raw(), -1);
    }

    #[test]
    fn test_team_hostility() {
        assert!(TeamId(1).is_enemy_of(TeamId(2)));
        assert!(!TeamId(1).is_enemy_of(TeamId(1)));
        assert!(!TeamId(1).is_enemy_of(TeamId::NEUTRAL));
    }

    #[test]
    fn test_only_host_mutates() {
        assert!(Role::Authoritative.can_mutate());
        assert!(!Role::Observer.can_mutate());
    }
}
