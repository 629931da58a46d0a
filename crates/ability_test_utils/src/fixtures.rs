//! Test fixtures and helpers.
//!
//! Pre-built content and scenarios for consistent testing. Helpers panic on
//! setup failures; they are only meant for tests and benchmarks.

use std::sync::Arc;

use ability_core::abilities::{AbilityCommand, AbilityEvent};
use ability_core::catalog::Content;
use ability_core::components::{EntityId, Role, TeamId};
use ability_core::content;
use ability_core::data::ContentData;
use ability_core::facade::AbilityFacade;
use ability_core::host::AbilityHost;
use ability_core::math::Vec2Fixed;
use ability_core::simulation::Simulation;
use fixed::types::I32F32;

/// Team the scenario units fight for.
pub const ALLY: TeamId = TeamId(1);
/// Team the scenario units fight against.
pub const ENEMY: TeamId = TeamId(2);

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Built-in content, shared.
///
/// # Panics
///
/// Panics if the built-in content fails to resolve.
#[must_use]
pub fn builtin() -> Arc<Content> {
    Arc::new(content::builtin().expect("built-in content resolves"))
}

/// Built-in content after `edit` has tweaked its data form.
///
/// # Panics
///
/// Panics if the edited content fails to resolve.
#[must_use]
pub fn content_with(edit: impl FnOnce(&mut ContentData)) -> Arc<Content> {
    let mut data = content::builtin_data();
    edit(&mut data);
    Arc::new(data.resolve().expect("edited content resolves"))
}

/// Authoritative simulation on built-in content.
#[must_use]
pub fn sim() -> Simulation {
    Simulation::with_role(builtin(), Role::Authoritative)
}

/// Spawn a unit at integer coordinates.
///
/// # Panics
///
/// Panics if `kind` is not a known unit type.
pub fn spawn(sim: &mut Simulation, kind: &str, team: TeamId, x: i32, y: i32) -> EntityId {
    sim.spawn_unit(kind, team, Vec2Fixed::from_ints(x, y))
        .expect("known unit type")
}

/// Advance `ticks` ticks, collecting ability events.
pub fn run(sim: &mut Simulation, ticks: u32) -> Vec<AbilityEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(sim.tick().ability_events);
    }
    events
}

/// Whether `id` carries the named status.
///
/// # Panics
///
/// Panics if no status has that name.
#[must_use]
pub fn has_status(sim: &Simulation, id: EntityId, name: &str) -> bool {
    let status = sim
        .world()
        .content()
        .status(name)
        .expect("known status name");
    sim.world().has_status(id, status)
}

/// One unit of every ability family facing a few hostile grunts, every
/// ability already requested. Teams are funded and fortification is
/// researched.
#[must_use]
pub fn skirmish() -> Simulation {
    skirmish_on(builtin(), Role::Authoritative)
}

/// [`skirmish`] on the given content and role.
#[must_use]
pub fn skirmish_on(shared: Arc<Content>, role: Role) -> Simulation {
    let mut sim = Simulation::with_role(shared, role);
    sim.grant_resources(ALLY, 10_000);
    sim.unlock_tech(ALLY, content::FORTIFICATION_TECH);

    let borer = spawn(&mut sim, "borer", ALLY, 0, 0);
    let bastion = spawn(&mut sim, "bastion", ALLY, 0, 4);
    let warden = spawn(&mut sim, "warden", ALLY, 0, 8);
    let shifter = spawn(&mut sim, "shifter", ALLY, 0, 12);
    let lancer = spawn(&mut sim, "lancer", ALLY, 0, 16);
    let phantom = spawn(&mut sim, "phantom", ALLY, 0, 20);
    let engineer = spawn(&mut sim, "engineer", ALLY, 0, 24);

    spawn(&mut sim, "grunt", ENEMY, 4, 0);
    let prey = spawn(&mut sim, "grunt", ENEMY, 2, 16);
    spawn(&mut sim, "grunt", ENEMY, 5, 20);

    sim.command(borer, AbilityCommand::Burrow);
    sim.command(bastion, AbilityCommand::Siege);
    sim.command(warden, AbilityCommand::Deploy);
    sim.command(shifter, AbilityCommand::SwitchMode);
    sim.command(lancer, AbilityCommand::Charge(prey));
    sim.command(phantom, AbilityCommand::Cloak);
    sim.command(engineer, AbilityCommand::DeployTurret);
    sim
}

#[cfg(test)]
mod tests {
    use super::*;
    use ability_core::abilities::AbilityKind;
    use ability_core::machine::Phase;

    #[test]
    fn test_skirmish_requests_every_family() {
        let sim = skirmish();
        let ids = sim.world().entities().sorted_ids();
        for (&id, kind) in ids.iter().zip(AbilityKind::ALL) {
            assert_ne!(sim.phase(id, kind), None, "{kind:?}");
        }
    }

    #[test]
    fn test_content_with_edits_data() {
        let content = content_with(|data| {
            data.units.retain(|u| u.name == "grunt");
        });
        assert_eq!(content.units.len(), 1);
    }

    #[test]
    fn test_run_collects_events() {
        let mut sim = sim();
        let bastion = spawn(&mut sim, "bastion", ALLY, 0, 0);
        sim.command(bastion, AbilityCommand::Siege);
        let events = run(&mut sim, 1);
        assert!(!events.is_empty());
        assert_eq!(sim.phase(bastion, AbilityKind::Siege), Some(Phase::TransitioningIn));
    }
}
