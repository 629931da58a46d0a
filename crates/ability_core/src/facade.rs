//! Unified command/query interface for input handlers, AI and renderers.
//!
//! Human input and AI issue the same [`AbilityCommand`]s through the same
//! trait, so both are held to the same guards. Queries are pure reads and
//! safe to call from presentation code on any replica.

use crate::abilities::{AbilityCommand, AbilityKind, DrawCue};
use crate::components::EntityId;
use crate::machine::Phase;
use crate::math::Fixed;
use crate::simulation::Simulation;

/// What a player (human or AI) can ask of an entity's abilities.
///
/// # Command Flow
///
/// Every ability request goes through [`command`](Self::command). A refused
/// command returns `false` and leaves the simulation untouched; there is no
/// error path and no automatic retry.
pub trait AbilityFacade {
    /// Whether `command` would be accepted right now.
    fn can(&self, entity: EntityId, command: AbilityCommand) -> bool;

    /// Issue `command`. Returns whether it was accepted.
    fn command(&mut self, entity: EntityId, command: AbilityCommand) -> bool;

    /// Issue the same command to several entities.
    ///
    /// Returns how many accepted it. Entities are visited in the given order.
    fn command_all(&mut self, entities: &[EntityId], command: AbilityCommand) -> usize {
        entities
            .iter()
            .filter(|&&entity| self.command(entity, command))
            .count()
    }

    /// Whether the family's effect is in force.
    fn is_active(&self, entity: EntityId, kind: AbilityKind) -> bool;

    /// Progress through the family's current phase, in `[0, 1]`.
    fn progress(&self, entity: EntityId, kind: AbilityKind) -> Fixed;

    /// Current phase of the family, if the entity ever used it.
    fn phase(&self, entity: EntityId, kind: AbilityKind) -> Option<Phase>;

    /// Presentation hints. Never mutates.
    fn draw_cues(&self, entity: EntityId) -> Vec<DrawCue>;
}

impl AbilityFacade for Simulation {
    fn can(&self, entity: EntityId, command: AbilityCommand) -> bool {
        self.role().can_mutate() && self.abilities().can(self.world(), entity, command)
    }

    fn command(&mut self, entity: EntityId, command: AbilityCommand) -> bool {
        let (world, abilities, role) = self.parts_mut();
        abilities.command(world, role, entity, command)
    }

    fn is_active(&self, entity: EntityId, kind: AbilityKind) -> bool {
        self.abilities().is_active(entity, kind)
    }

    fn progress(&self, entity: EntityId, kind: AbilityKind) -> Fixed {
        self.abilities().progress(entity, kind)
    }

    fn phase(&self, entity: EntityId, kind: AbilityKind) -> Option<Phase> {
        self.abilities().phase(entity, kind)
    }

    fn draw_cues(&self, entity: EntityId) -> Vec<DrawCue> {
        self.abilities().draw_cues(entity)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::components::{Role, TeamId};
    use crate::content;
    use crate::math::Vec2Fixed;

    #[test]
    fn test_command_all_counts_acceptances() {
        let mut sim = Simulation::new(content::builtin().unwrap());
        let a = sim.spawn_unit("bastion", TeamId(1), Vec2Fixed::ZERO).unwrap();
        let b = sim.spawn_unit("bastion", TeamId(1), Vec2Fixed::from_ints(4, 0)).unwrap();
        let grunt = sim.spawn_unit("grunt", TeamId(1), Vec2Fixed::from_ints(8, 0)).unwrap();

        assert_eq!(sim.command_all(&[a, b, grunt], AbilityCommand::Siege), 2);
        assert_eq!(sim.phase(a, AbilityKind::Siege), Some(Phase::TransitioningIn));
        assert_eq!(sim.phase(grunt, AbilityKind::Siege), None);
    }

    #[test]
    fn test_observer_cannot_command() {
        let content = Arc::new(content::builtin().unwrap());
        let mut sim = Simulation::with_role(content, Role::Observer);
        let a = sim.spawn_unit("bastion", TeamId(1), Vec2Fixed::ZERO).unwrap();

        assert!(!sim.can(a, AbilityCommand::Siege));
        assert!(!sim.command(a, AbilityCommand::Siege));
        assert_eq!(sim.phase(a, AbilityKind::Siege), None);
    }
}
