//! Property tests over random command scripts.

use ability_core::prelude::*;
use ability_test_utils::determinism::strategies::{arb_script, play};
use ability_test_utils::fixtures::{has_status, skirmish};
use proptest::prelude::*;

/// Phase statuses of each family that shows at most one at a time.
const PHASE_STATUSES: &[&[&str]] = &[
    &["burrowing", "burrowed", "locked", "unburrowing"],
    &["mobile", "sieging", "sieged", "unsieging"],
    &["deploying", "fortified", "undeploying"],
    &["fading_in", "cloaked", "fading_out"],
    &["assembling", "turret_deployed", "packing"],
];

fn check_reservations(sim: &Simulation) -> std::result::Result<(), TestCaseError> {
    let reservations = sim.abilities().reservations();
    for target in sim.world().entities().sorted_ids() {
        let Some(owner) = reservations.owner(target) else {
            continue;
        };
        let cue = sim
            .draw_cues(owner)
            .into_iter()
            .find(|c| c.kind == AbilityKind::Lock);
        prop_assert!(cue.is_some(), "{owner} reserves without lock state");
        let cue = cue.unwrap();
        prop_assert_eq!(cue.phase, Phase::Active);
        prop_assert_eq!(cue.target, Some(target));
    }
    Ok(())
}

fn check_phase_statuses(sim: &Simulation) -> std::result::Result<(), TestCaseError> {
    for id in sim.world().entities().sorted_ids() {
        for family in PHASE_STATUSES {
            let shown = family.iter().filter(|s| has_status(sim, id, s)).count();
            prop_assert!(shown <= 1, "{id} shows {shown} of {family:?}");
        }
    }
    Ok(())
}

/// Keep issuing every exit command until the families settle.
fn wind_down(sim: &mut Simulation, ticks: u32) {
    let ids = sim.world().entities().sorted_ids();
    for _ in 0..ticks {
        for command in [
            AbilityCommand::Unburrow,
            AbilityCommand::Unsiege,
            AbilityCommand::Undeploy,
            AbilityCommand::Decloak,
            AbilityCommand::PackTurret,
        ] {
            sim.command_all(&ids, command);
        }
        sim.tick();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_reservations_track_active_locks(script in arb_script(24)) {
        let mut sim = skirmish();
        for step in &script {
            play(&mut sim, std::slice::from_ref(step));
            check_reservations(&sim)?;
        }
    }

    #[test]
    fn prop_one_phase_status_per_family(script in arb_script(24)) {
        let mut sim = skirmish();
        for step in &script {
            play(&mut sim, std::slice::from_ref(step));
            check_phase_statuses(&sim)?;
        }
    }

    #[test]
    fn prop_families_return_to_idle(script in arb_script(16)) {
        let mut sim = skirmish();
        play(&mut sim, &script);
        wind_down(&mut sim, 1_000);

        for id in sim.world().entities().sorted_ids() {
            for kind in AbilityKind::ALL {
                if kind == AbilityKind::Charge {
                    continue;
                }
                let phase = sim.phase(id, kind);
                prop_assert!(
                    matches!(phase, None | Some(Phase::Idle)),
                    "{id} {kind:?} stuck in {phase:?}"
                );
            }
        }
        prop_assert!(sim.abilities().reservations().is_empty());
    }

    #[test]
    fn prop_progress_stays_in_unit_range(script in arb_script(16)) {
        let mut sim = skirmish();
        play(&mut sim, &script);

        for id in sim.world().entities().sorted_ids() {
            for cue in sim.draw_cues(id) {
                prop_assert!(cue.progress >= Fixed::ZERO);
                prop_assert!(cue.progress <= Fixed::ONE);
            }
        }
    }
}
