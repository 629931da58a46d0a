//! The entity host the ability framework runs on top of.
//!
//! The framework does not own the entity type it augments. Everything it
//! needs from the simulation - liveness, geometry, status primitives,
//! searches, team resources - goes through [`AbilityHost`].
//! [`crate::simulation::World`] is the reference implementation.

use crate::catalog::AbilityLoadout;
use crate::components::{EntityId, TeamId, Ticks};
use crate::math::{Fixed, Vec2Fixed};
use crate::status::StatusId;

/// Services the simulation provides to ability state machines.
pub trait AbilityHost {
    /// Live entity ids in ascending order. This is the iteration order every
    /// authoritative participant uses.
    fn sorted_ids(&self) -> Vec<EntityId>;

    /// Whether `id` names a live entity right now.
    fn is_valid(&self, id: EntityId) -> bool;

    /// World position of a live entity.
    fn position(&self, id: EntityId) -> Option<Vec2Fixed>;

    /// Team of a live entity.
    fn team(&self, id: EntityId) -> Option<TeamId>;

    /// Collision radius of a live entity, zero if unknown.
    fn hit_radius(&self, id: EntityId) -> Fixed;

    /// Whether `id` is not moving this tick.
    fn is_stationary(&self, id: EntityId) -> bool;

    /// Whether `target` is within `range` of `source`, measured to the edge
    /// of the target's hit radius.
    fn within_range(&self, source: EntityId, target: EntityId, range: Fixed) -> bool {
        match (self.position(source), self.position(target)) {
            (Some(from), Some(to)) => from.within(to, range + self.hit_radius(target)),
            _ => false,
        }
    }

    /// Whether `target` is alive and hostile to `source`.
    fn is_enemy(&self, source: EntityId, target: EntityId) -> bool {
        if !self.is_valid(target) {
            return false;
        }
        match (self.team(source), self.team(target)) {
            (Some(a), Some(b)) => a.is_enemy_of(b),
            _ => false,
        }
    }

    /// Apply or refresh a status effect.
    fn apply_status(&mut self, id: EntityId, status: StatusId, duration: Ticks);

    /// Remove a status effect immediately.
    fn unapply_status(&mut self, id: EntityId, status: StatusId);

    /// Whether a status effect is applied.
    fn has_status(&self, id: EntityId, status: StatusId) -> bool;

    /// Remaining duration of an applied status effect.
    fn status_remaining(&self, id: EntityId, status: StatusId) -> Option<Ticks>;

    /// Closest live entity hostile to `team` within `radius` of `center`
    /// that passes `filter`. Ties go to the lower id.
    fn closest_target(
        &self,
        team: TeamId,
        center: Vec2Fixed,
        radius: Fixed,
        filter: &dyn Fn(EntityId) -> bool,
    ) -> Option<EntityId>;

    /// Spendable resources of a team.
    fn resources(&self, team: TeamId) -> i32;

    /// Spend resources if the team can afford it.
    fn spend_resources(&mut self, team: TeamId, amount: i32) -> bool;

    /// Whether a team has researched `tech`.
    fn tech_unlocked(&self, team: TeamId, tech: &str) -> bool;

    /// Spawn a deployable of unit type `kind` owned by `owner`.
    fn spawn_deployable(&mut self, owner: EntityId, kind: &str, at: Vec2Fixed)
        -> Option<EntityId>;

    /// Remove a deployable spawned earlier.
    fn remove_deployable(&mut self, id: EntityId);

    /// Ability loadout of a live entity's unit type.
    fn loadout(&self, id: EntityId) -> Option<&AbilityLoadout>;
}
