//! Tick-exact scenarios for every ability family on the reference simulation.

use ability_core::prelude::*;
use ability_test_utils::fixtures::{
    content_with, has_status, run, sim, spawn, ALLY, ENEMY,
};

fn fired(events: &[AbilityEvent]) -> Vec<(EntityId, EntityId, u32)> {
    events
        .iter()
        .filter_map(|e| match e.event {
            AbilityEventKind::Fired { target, damage } => Some((e.entity, target, damage)),
            _ => None,
        })
        .collect()
}

fn aborted(events: &[AbilityEvent]) -> Vec<AbortReason> {
    events
        .iter()
        .filter_map(|e| match e.event {
            AbilityEventKind::Aborted { reason } => Some(reason),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Siege
// =============================================================================

mod siege {
    use super::*;

    #[test]
    fn test_siege_takes_exactly_180_ticks() {
        let mut sim = sim();
        let bastion = spawn(&mut sim, "bastion", ALLY, 0, 0);
        run(&mut sim, 1);
        assert!(has_status(&sim, bastion, "mobile"));

        assert!(sim.command(bastion, AbilityCommand::Siege));
        assert!(!has_status(&sim, bastion, "mobile"));
        assert!(has_status(&sim, bastion, "sieging"));

        run(&mut sim, 179);
        assert_eq!(
            sim.phase(bastion, AbilityKind::Siege),
            Some(Phase::TransitioningIn)
        );
        assert!(!sim.is_active(bastion, AbilityKind::Siege));
        assert!(sim.progress(bastion, AbilityKind::Siege) < Fixed::ONE);

        run(&mut sim, 1);
        assert_eq!(sim.phase(bastion, AbilityKind::Siege), Some(Phase::Active));
        assert!(sim.is_active(bastion, AbilityKind::Siege));
        assert!(has_status(&sim, bastion, "sieged"));
        assert!(!has_status(&sim, bastion, "sieging"));
        assert!(!has_status(&sim, bastion, "mobile"));

        let sieged = sim.world().content().status("sieged").unwrap();
        assert_eq!(sim.world().status_remaining(bastion, sieged), Some(0));
    }

    #[test]
    fn test_sieged_status_is_timeless() {
        let mut sim = sim();
        let bastion = spawn(&mut sim, "bastion", ALLY, 0, 0);
        sim.command(bastion, AbilityCommand::Siege);
        run(&mut sim, 180 + 5000);

        assert!(has_status(&sim, bastion, "sieged"));
        assert_eq!(sim.progress(bastion, AbilityKind::Siege), Fixed::ONE);
    }

    #[test]
    fn test_unsiege_returns_to_mobile() {
        let mut sim = sim();
        let bastion = spawn(&mut sim, "bastion", ALLY, 0, 0);
        sim.command(bastion, AbilityCommand::Siege);
        assert!(!sim.can(bastion, AbilityCommand::Unsiege), "still transitioning");
        run(&mut sim, 180);

        assert!(sim.command(bastion, AbilityCommand::Unsiege));
        assert!(has_status(&sim, bastion, "unsieging"));
        assert!(!has_status(&sim, bastion, "sieged"));

        run(&mut sim, 120);
        assert_eq!(sim.phase(bastion, AbilityKind::Siege), Some(Phase::Idle));
        assert!(has_status(&sim, bastion, "mobile"));
        assert!(!has_status(&sim, bastion, "unsieging"));
        assert!(sim.can(bastion, AbilityCommand::Siege));
    }

    #[test]
    fn test_sieged_unit_cannot_move() {
        let mut sim = sim();
        let bastion = spawn(&mut sim, "bastion", ALLY, 0, 0);
        sim.command(bastion, AbilityCommand::Siege);
        sim.set_velocity(bastion, Vec2Fixed::from_ints(1, 0)).unwrap();
        run(&mut sim, 200);

        assert_eq!(sim.get_entity(bastion).unwrap().position, Vec2Fixed::ZERO);
    }

    #[test]
    fn test_units_without_siege_refuse() {
        let mut sim = sim();
        let grunt = spawn(&mut sim, "grunt", ALLY, 0, 0);
        assert!(!sim.can(grunt, AbilityCommand::Siege));
        assert!(!sim.command(grunt, AbilityCommand::Siege));
    }
}

// =============================================================================
// Burrow and lock
// =============================================================================

mod lock {
    use super::*;

    fn manual_lock_sim() -> (Simulation, EntityId, EntityId) {
        let content = content_with(|data| {
            let borer = data
                .units
                .iter_mut()
                .find(|u| u.name == "borer")
                .unwrap();
            borer.abilities.lock.as_mut().unwrap().auto_acquire = false;
        });
        let mut sim = Simulation::with_role(content, Role::Authoritative);
        let borer = spawn(&mut sim, "borer", ALLY, 0, 0);
        let grunt = spawn(&mut sim, "grunt", ENEMY, 4, 0);
        (sim, borer, grunt)
    }

    #[test]
    fn test_burrow_settles_into_pending() {
        let (mut sim, borer, _) = manual_lock_sim();
        assert!(sim.command(borer, AbilityCommand::Burrow));

        run(&mut sim, 59);
        assert_eq!(
            sim.phase(borer, AbilityKind::Lock),
            Some(Phase::TransitioningIn)
        );
        run(&mut sim, 1);
        assert_eq!(sim.phase(borer, AbilityKind::Lock), Some(Phase::Pending));
        assert!(has_status(&sim, borer, "burrowed"));
        assert!(!has_status(&sim, borer, "burrowing"));
    }

    #[test]
    fn test_lock_cycle_840_then_240() {
        let (mut sim, borer, grunt) = manual_lock_sim();
        sim.command(borer, AbilityCommand::Burrow);
        assert!(!sim.can(borer, AbilityCommand::Lock(grunt)), "not burrowed yet");
        run(&mut sim, 60);

        assert!(sim.can(borer, AbilityCommand::Lock(grunt)));
        assert!(sim.command(borer, AbilityCommand::Lock(grunt)));
        assert!(sim.is_active(borer, AbilityKind::Lock));
        assert!(has_status(&sim, borer, "locked"));
        assert_eq!(sim.abilities().reservations().owner(grunt), Some(borer));

        // Refused while the lock is held.
        assert!(!sim.can(borer, AbilityCommand::Lock(grunt)));
        assert!(!sim.command(borer, AbilityCommand::Lock(grunt)));

        let events = run(&mut sim, 839);
        assert!(fired(&events).is_empty());
        assert!(sim.is_active(borer, AbilityKind::Lock));

        let events = run(&mut sim, 1);
        assert_eq!(fired(&events), vec![(borer, grunt, 40)]);
        assert_eq!(sim.phase(borer, AbilityKind::Lock), Some(Phase::Pending));
        assert!(has_status(&sim, borer, "burrowed"));
        assert_eq!(sim.abilities().reservations().owner(grunt), None);
        assert_eq!(sim.get_entity(grunt).unwrap().health, 20);

        // Refused while cooling down.
        run(&mut sim, 239);
        assert!(!sim.can(borer, AbilityCommand::Lock(grunt)));

        run(&mut sim, 1);
        assert!(sim.can(borer, AbilityCommand::Lock(grunt)));
        assert!(sim.command(borer, AbilityCommand::Lock(grunt)));
        assert_eq!(sim.phase(borer, AbilityKind::Lock), Some(Phase::Active));
        assert_eq!(sim.abilities().reservations().owner(grunt), Some(borer));
    }

    #[test]
    fn test_lock_refuses_out_of_range_and_friendly_targets() {
        let (mut sim, borer, _) = manual_lock_sim();
        let far = spawn(&mut sim, "grunt", ENEMY, 20, 0);
        let friend = spawn(&mut sim, "grunt", ALLY, 2, 0);
        sim.command(borer, AbilityCommand::Burrow);
        run(&mut sim, 60);

        assert!(!sim.can(borer, AbilityCommand::Lock(far)));
        assert!(!sim.can(borer, AbilityCommand::Lock(friend)));
        assert!(!sim.can(borer, AbilityCommand::Lock(EntityId::NONE)));
    }

    #[test]
    fn test_target_leaving_range_aborts_lock() {
        let (mut sim, borer, grunt) = manual_lock_sim();
        sim.command(borer, AbilityCommand::Burrow);
        run(&mut sim, 60);
        sim.command(borer, AbilityCommand::Lock(grunt));
        sim.set_velocity(grunt, Vec2Fixed::from_ints(1, 0)).unwrap();

        let events = run(&mut sim, 10);

        assert_eq!(aborted(&events), vec![AbortReason::OutOfRange]);
        assert_eq!(sim.phase(borer, AbilityKind::Lock), Some(Phase::Pending));
        assert_eq!(sim.abilities().reservations().owner(grunt), None);
        assert!(fired(&events).is_empty());
    }

    #[test]
    fn test_auto_acquire_locks_on_settling() {
        let mut sim = sim();
        let borer = spawn(&mut sim, "borer", ALLY, 0, 0);
        let grunt = spawn(&mut sim, "grunt", ENEMY, 5, 0);
        sim.command(borer, AbilityCommand::Burrow);

        run(&mut sim, 60);
        assert!(sim.is_active(borer, AbilityKind::Lock));
        assert_eq!(sim.abilities().reservations().owner(grunt), Some(borer));

        let events = run(&mut sim, 840);
        assert_eq!(fired(&events), vec![(borer, grunt, 40)]);

        // Cooldown, then the second lock finishes the grunt off.
        let events = run(&mut sim, 240 + 840);
        assert_eq!(fired(&events), vec![(borer, grunt, 40)]);
        assert!(sim.get_entity(grunt).is_none());
    }

    #[test]
    fn test_unburrow_drops_lock() {
        let (mut sim, borer, grunt) = manual_lock_sim();
        sim.command(borer, AbilityCommand::Burrow);
        run(&mut sim, 60);
        sim.command(borer, AbilityCommand::Lock(grunt));

        assert!(sim.command(borer, AbilityCommand::Unburrow));
        assert_eq!(sim.abilities().reservations().owner(grunt), None);
        assert_eq!(
            sim.phase(borer, AbilityKind::Lock),
            Some(Phase::TransitioningOut)
        );

        let events = run(&mut sim, 45);
        assert!(fired(&events).is_empty());
        assert_eq!(sim.phase(borer, AbilityKind::Lock), Some(Phase::Idle));
        assert!(!has_status(&sim, borer, "unburrowing"));
    }

    #[test]
    fn test_damage_beyond_fixed_range_saturates() {
        let content = content_with(|data| {
            let borer = data
                .units
                .iter_mut()
                .find(|u| u.name == "borer")
                .unwrap();
            let lock = borer.abilities.lock.as_mut().unwrap();
            lock.damage = 3_000_000_000;
            lock.lock_time = 5;
        });
        let mut sim = Simulation::with_role(content, Role::Authoritative);
        let borer = spawn(&mut sim, "borer", ALLY, 0, 0);
        let grunt = spawn(&mut sim, "grunt", ENEMY, 4, 0);
        sim.command(borer, AbilityCommand::Burrow);

        let mut dealt = Vec::new();
        for _ in 0..80 {
            dealt.extend(sim.tick().damage_events);
        }

        assert_eq!(dealt.len(), 1);
        assert_eq!(dealt[0].target, grunt);
        assert_eq!(dealt[0].amount, i32::MAX.unsigned_abs());
        assert!(sim.get_entity(grunt).is_none());
    }
}

// =============================================================================
// Deploy
// =============================================================================

mod deploy {
    use super::*;
    use ability_core::content::FORTIFICATION_TECH;

    fn funded() -> (Simulation, EntityId) {
        let mut sim = sim();
        sim.grant_resources(ALLY, 100);
        sim.unlock_tech(ALLY, FORTIFICATION_TECH);
        let warden = spawn(&mut sim, "warden", ALLY, 0, 0);
        (sim, warden)
    }

    #[test]
    fn test_deploy_requires_tech_and_funds() {
        let mut sim = sim();
        let warden = spawn(&mut sim, "warden", ALLY, 0, 0);
        assert!(!sim.can(warden, AbilityCommand::Deploy));

        sim.unlock_tech(ALLY, FORTIFICATION_TECH);
        assert!(!sim.can(warden, AbilityCommand::Deploy));

        sim.grant_resources(ALLY, 50);
        assert!(sim.can(warden, AbilityCommand::Deploy));
    }

    #[test]
    fn test_deploy_waits_until_stationary() {
        let (mut sim, warden) = funded();
        sim.set_velocity(warden, Vec2Fixed::from_ints(1, 0)).unwrap();
        assert!(sim.command(warden, AbilityCommand::Deploy));

        run(&mut sim, 50);
        assert_eq!(sim.phase(warden, AbilityKind::Deploy), Some(Phase::Pending));
        assert_eq!(sim.world().resources(ALLY), 100);

        sim.set_velocity(warden, Vec2Fixed::ZERO).unwrap();
        run(&mut sim, 1);
        assert_eq!(
            sim.phase(warden, AbilityKind::Deploy),
            Some(Phase::TransitioningIn)
        );
        assert_eq!(sim.world().resources(ALLY), 50);

        run(&mut sim, 89);
        assert!(!sim.is_active(warden, AbilityKind::Deploy));
        run(&mut sim, 1);
        assert!(sim.is_active(warden, AbilityKind::Deploy));
        assert!(has_status(&sim, warden, "fortified"));
    }

    #[test]
    fn test_pending_deploy_can_be_cancelled() {
        let (mut sim, warden) = funded();
        sim.set_velocity(warden, Vec2Fixed::from_ints(1, 0)).unwrap();
        sim.command(warden, AbilityCommand::Deploy);

        assert!(sim.command(warden, AbilityCommand::Undeploy));
        assert_eq!(sim.phase(warden, AbilityKind::Deploy), Some(Phase::Idle));
        run(&mut sim, 5);
        assert_eq!(sim.world().resources(ALLY), 100);
    }

    #[test]
    fn test_deploy_aborts_when_funds_vanish() {
        let (mut sim, warden) = funded();
        sim.command(warden, AbilityCommand::Deploy);
        sim.grant_resources(ALLY, -80);

        let events = run(&mut sim, 1);

        assert_eq!(aborted(&events), vec![AbortReason::Unaffordable]);
        assert_eq!(sim.phase(warden, AbilityKind::Deploy), Some(Phase::Idle));
    }

    #[test]
    fn test_undeploy_packs_up_under_cooldown() {
        let (mut sim, warden) = funded();
        sim.command(warden, AbilityCommand::Deploy);
        run(&mut sim, 91);
        assert!(sim.command(warden, AbilityCommand::Undeploy));
        assert!(has_status(&sim, warden, "undeploying"));
        assert!(!has_status(&sim, warden, "fortified"));

        run(&mut sim, 59);
        assert!(!sim.can(warden, AbilityCommand::Deploy));

        // Cooldown and pack-up run side by side.
        run(&mut sim, 1);
        assert_eq!(sim.phase(warden, AbilityKind::Deploy), Some(Phase::Idle));
        assert!(!has_status(&sim, warden, "undeploying"));
        assert!(sim.can(warden, AbilityCommand::Deploy));
    }
}

// =============================================================================
// Mode switch
// =============================================================================

mod mode {
    use super::*;

    #[test]
    fn test_switch_toggles_mode_statuses() {
        let mut sim = sim();
        let shifter = spawn(&mut sim, "shifter", ALLY, 0, 0);
        run(&mut sim, 1);
        assert!(has_status(&sim, shifter, "assault"));

        assert!(sim.command(shifter, AbilityCommand::SwitchMode));
        assert!(sim.is_active(shifter, AbilityKind::Mode));
        assert!(has_status(&sim, shifter, "switching"));

        let events = run(&mut sim, 45);
        assert!(events.iter().any(|e| e.event
            == AbilityEventKind::ModeSwitched {
                to: Mode::Secondary
            }));
        assert_eq!(sim.abilities().current_mode(shifter), Mode::Secondary);
        assert!(has_status(&sim, shifter, "artillery"));
        assert!(!has_status(&sim, shifter, "assault"));
        assert!(!has_status(&sim, shifter, "switching"));
        assert_eq!(sim.phase(shifter, AbilityKind::Mode), Some(Phase::Idle));

        assert!(!sim.can(shifter, AbilityCommand::SwitchMode));
        run(&mut sim, 30);
        assert!(sim.can(shifter, AbilityCommand::SwitchMode));
    }
}

// =============================================================================
// Charge
// =============================================================================

mod charge {
    use super::*;

    #[test]
    fn test_charge_executes_target_in_range() {
        let mut sim = sim();
        sim.grant_resources(ALLY, 100);
        let lancer = spawn(&mut sim, "lancer", ALLY, 0, 0);
        let grunt = spawn(&mut sim, "grunt", ENEMY, 2, 0);

        assert!(sim.command(lancer, AbilityCommand::Charge(grunt)));
        assert!(sim.is_active(lancer, AbilityKind::Charge));

        run(&mut sim, 1);
        assert_eq!(
            sim.phase(lancer, AbilityKind::Charge),
            Some(Phase::TransitioningIn)
        );
        assert!(has_status(&sim, lancer, "charging"));

        let events = run(&mut sim, 30);
        assert_eq!(fired(&events), vec![(lancer, grunt, 80)]);
        assert_eq!(sim.world().resources(ALLY), 75);
        assert!(sim.get_entity(grunt).is_none());
        assert_eq!(sim.phase(lancer, AbilityKind::Charge), Some(Phase::Idle));
        assert!(!sim.can(lancer, AbilityCommand::Charge(grunt)));
    }

    #[test]
    fn test_charge_waits_for_range() {
        let mut sim = sim();
        sim.grant_resources(ALLY, 100);
        let lancer = spawn(&mut sim, "lancer", ALLY, 0, 0);
        let grunt = spawn(&mut sim, "grunt", ENEMY, 8, 0);

        sim.command(lancer, AbilityCommand::Charge(grunt));
        run(&mut sim, 20);
        assert_eq!(sim.phase(lancer, AbilityKind::Charge), Some(Phase::Pending));

        // Speed 2: the fourth check sees a gap of 2.
        sim.set_velocity(lancer, Vec2Fixed::from_ints(1, 0)).unwrap();
        run(&mut sim, 3);
        assert_eq!(sim.phase(lancer, AbilityKind::Charge), Some(Phase::Pending));
        run(&mut sim, 1);
        assert_eq!(
            sim.phase(lancer, AbilityKind::Charge),
            Some(Phase::TransitioningIn)
        );
    }

    #[test]
    fn test_target_escaping_leash_aborts() {
        let mut sim = sim();
        sim.grant_resources(ALLY, 100);
        let lancer = spawn(&mut sim, "lancer", ALLY, 0, 0);
        let grunt = spawn(&mut sim, "grunt", ENEMY, 10, 0);
        sim.command(lancer, AbilityCommand::Charge(grunt));
        sim.set_velocity(grunt, Vec2Fixed::from_ints(1, 0)).unwrap();

        let events = run(&mut sim, 5);

        assert_eq!(aborted(&events), vec![AbortReason::OutOfRange]);
        assert_eq!(sim.phase(lancer, AbilityKind::Charge), Some(Phase::Idle));
        assert_eq!(sim.world().resources(ALLY), 100);
        assert!(!sim.can(lancer, AbilityCommand::Charge(grunt)));
    }

    #[test]
    fn test_dead_target_aborts_charge() {
        let mut sim = sim();
        sim.grant_resources(ALLY, 100);
        let lancer = spawn(&mut sim, "lancer", ALLY, 0, 0);
        let grunt = spawn(&mut sim, "grunt", ENEMY, 2, 0);
        sim.command(lancer, AbilityCommand::Charge(grunt));
        run(&mut sim, 5);

        sim.despawn(grunt).unwrap();
        let events = run(&mut sim, 1);

        assert_eq!(aborted(&events), vec![AbortReason::TargetLost]);
        assert!(!has_status(&sim, lancer, "charging"));
    }
}

// =============================================================================
// Cloak
// =============================================================================

mod cloak {
    use super::*;

    #[test]
    fn test_cloak_drains_until_depleted() {
        let mut sim = sim();
        sim.grant_resources(ALLY, 25);
        let phantom = spawn(&mut sim, "phantom", ALLY, 0, 0);

        assert!(sim.command(phantom, AbilityCommand::Cloak));
        assert!(has_status(&sim, phantom, "fading_in"));
        run(&mut sim, 30);
        assert!(sim.is_active(phantom, AbilityKind::Cloak));
        assert!(has_status(&sim, phantom, "cloaked"));

        run(&mut sim, 100);
        assert_eq!(sim.world().resources(ALLY), 15);

        let events = run(&mut sim, 160);
        assert_eq!(aborted(&events), vec![AbortReason::ResourcesDepleted]);
        assert_eq!(sim.world().resources(ALLY), 0);
        assert!(!has_status(&sim, phantom, "cloaked"));
    }

    #[test]
    fn test_cloak_needs_minimum_reserve() {
        let mut sim = sim();
        sim.grant_resources(ALLY, 19);
        let phantom = spawn(&mut sim, "phantom", ALLY, 0, 0);
        assert!(!sim.can(phantom, AbilityCommand::Cloak));
        sim.grant_resources(ALLY, 1);
        assert!(sim.can(phantom, AbilityCommand::Cloak));
    }

    #[test]
    fn test_cooldown_counts_from_end_of_fade() {
        let mut sim = sim();
        sim.grant_resources(ALLY, 1000);
        let phantom = spawn(&mut sim, "phantom", ALLY, 0, 0);
        sim.command(phantom, AbilityCommand::Cloak);
        run(&mut sim, 30);
        assert!(sim.command(phantom, AbilityCommand::Decloak));

        run(&mut sim, 30);
        assert_eq!(sim.phase(phantom, AbilityKind::Cloak), Some(Phase::Idle));
        run(&mut sim, 119);
        assert!(!sim.can(phantom, AbilityCommand::Cloak));
        run(&mut sim, 1);
        assert!(sim.can(phantom, AbilityCommand::Cloak));
    }
}

// =============================================================================
// Turret deployment
// =============================================================================

mod turret {
    use super::*;

    fn spawned(events: &[AbilityEvent]) -> Option<EntityId> {
        events.iter().find_map(|e| match e.event {
            AbilityEventKind::Spawned { deployable } => Some(deployable),
            _ => None,
        })
    }

    #[test]
    fn test_assemble_and_pack() {
        let mut sim = sim();
        let engineer = spawn(&mut sim, "engineer", ALLY, 3, 3);
        sim.command(engineer, AbilityCommand::DeployTurret);

        let events = run(&mut sim, 120);
        let sentry = spawned(&events).expect("turret spawned");
        assert!(sim.is_active(engineer, AbilityKind::Turret));
        let turret = sim.get_entity(sentry).unwrap();
        assert_eq!(turret.team, ALLY);
        assert_eq!(turret.owner, Some(engineer));
        assert_eq!(turret.position, Vec2Fixed::from_ints(3, 3));

        assert!(sim.command(engineer, AbilityCommand::PackTurret));
        let events = run(&mut sim, 60);
        assert!(events.iter().any(|e| e.event
            == AbilityEventKind::Despawned {
                deployable: sentry
            }));
        assert!(sim.get_entity(sentry).is_none());
        assert_eq!(sim.phase(engineer, AbilityKind::Turret), Some(Phase::Idle));
    }

    #[test]
    fn test_destroyed_turret_forces_pack_up() {
        let mut sim = sim();
        let engineer = spawn(&mut sim, "engineer", ALLY, 0, 0);
        sim.command(engineer, AbilityCommand::DeployTurret);
        let sentry = spawned(&run(&mut sim, 120)).unwrap();

        sim.despawn(sentry).unwrap();
        let events = run(&mut sim, 1);

        assert_eq!(aborted(&events), vec![AbortReason::DeployableLost]);
        assert_eq!(
            sim.phase(engineer, AbilityKind::Turret),
            Some(Phase::TransitioningOut)
        );
    }

    #[test]
    fn test_owner_death_removes_turret() {
        let mut sim = sim();
        let engineer = spawn(&mut sim, "engineer", ALLY, 0, 0);
        sim.command(engineer, AbilityCommand::DeployTurret);
        let sentry = spawned(&run(&mut sim, 120)).unwrap();

        let removed = sim.despawn(engineer).unwrap();

        assert_eq!(removed, vec![engineer, sentry]);
        assert!(sim.get_entity(sentry).is_none());
    }
}
