//! Sparse per-entity side state.
//!
//! Abilities augment entities the framework does not own, so their state
//! lives beside the entity in a table keyed by [`EntityId`]. Entries are
//! created on first access and destroyed once, by the removal notification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, Role};
use crate::host::AbilityHost;
use crate::reservation::TargetReservations;

/// Per-family state kept for one entity.
pub trait SideState: Default {
    /// Target this state currently holds a reservation on.
    fn reserved_target(&self) -> Option<EntityId> {
        None
    }
}

/// Id-indexed table of one family's side state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideStateStore<T> {
    entries: BTreeMap<EntityId, T>,
}

impl<T> Default for SideStateStore<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: SideState> SideStateStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State for `id`, created on first access.
    ///
    /// Stale ids still get a struct; callers that care about liveness use
    /// [`live`](Self::live).
    pub fn get(&mut self, id: EntityId) -> &mut T {
        self.entries.entry(id).or_default()
    }

    /// State for `id` without creating it.
    #[must_use]
    pub fn peek(&self, id: EntityId) -> Option<&T> {
        self.entries.get(&id)
    }

    /// State for `id`, only while the host reports it alive.
    pub fn live<H: AbilityHost + ?Sized>(&mut self, host: &H, id: EntityId) -> Option<&mut T> {
        if host.is_valid(id) {
            Some(self.get(id))
        } else {
            None
        }
    }

    /// Tear down the state of `id`, releasing any reservation it held.
    ///
    /// Returns whether an entry existed; a repeated call is a no-op.
    pub fn clear(
        &mut self,
        role: Role,
        id: EntityId,
        reservations: &mut TargetReservations,
    ) -> bool {
        let Some(state) = self.entries.remove(&id) else {
            return false;
        };
        if let Some(target) = state.reserved_target() {
            reservations.release(role, id, target);
        }
        true
    }

    /// Whether `id` has state.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids with state, ascending.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.keys().copied()
    }
}
