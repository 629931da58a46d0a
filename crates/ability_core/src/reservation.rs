//! Target reservation registry.
//!
//! Many units run their own closest-target scan every tick. Without
//! coordination two of them would lock the same target. A reservation is an
//! exclusivity claim on a target id: at most one claimant per target at any
//! time, first come first served in tick iteration order.
//!
//! Only the authoritative simulation writes the table. Observers may ask
//! [`TargetReservations::can_reserve`] for cosmetic decisions, but `reserve`
//! and `release` do nothing for them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, Role};

/// Mapping from target id to claimant id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReservations {
    owners: BTreeMap<EntityId, EntityId>,
}

impl TargetReservations {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `claimant` may claim `target`: it is unclaimed or already
    /// claimed by `claimant` itself. Always false for sentinel targets.
    #[must_use]
    pub fn can_reserve(&self, claimant: EntityId, target: EntityId) -> bool {
        if !target.is_valid() {
            return false;
        }
        self.owners
            .get(&target)
            .map_or(true, |&owner| owner == claimant)
    }

    /// Claim `target` for `claimant`, overwriting any existing claim.
    ///
    /// No exclusivity check is made here: callers that need exclusivity call
    /// [`can_reserve`](Self::can_reserve) first. Returns whether the table
    /// changed hands, which is never the case for observers or sentinels.
    pub fn reserve(&mut self, role: Role, claimant: EntityId, target: EntityId) -> bool {
        if !target.is_valid() {
            return false;
        }
        if !role.can_mutate() {
            tracing::debug!(%claimant, %target, "observer attempted to reserve a target");
            return false;
        }
        if let Some(previous) = self.owners.insert(target, claimant) {
            if previous != claimant {
                tracing::debug!(%target, %previous, %claimant, "reservation overwritten");
            }
        }
        true
    }

    /// Drop the claim on `target` if, and only if, `claimant` holds it.
    ///
    /// A stale release from an earlier claimant never evicts a later one.
    pub fn release(&mut self, role: Role, claimant: EntityId, target: EntityId) -> bool {
        if !target.is_valid() || !role.can_mutate() {
            return false;
        }
        if self.owners.get(&target) == Some(&claimant) {
            self.owners.remove(&target);
            true
        } else {
            false
        }
    }

    /// Current claimant of `target`.
    #[must_use]
    pub fn owner(&self, target: EntityId) -> Option<EntityId> {
        self.owners.get(&target).copied()
    }

    /// Drop every claim on or by `id`. Used when `id` is removed.
    pub fn release_all_for(&mut self, role: Role, id: EntityId) -> usize {
        if !role.can_mutate() {
            return 0;
        }
        let before = self.owners.len();
        self.owners
            .retain(|&target, &mut claimant| claimant != id && target != id);
        before - self.owners.len()
    }

    /// Number of active claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether nothing is claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
