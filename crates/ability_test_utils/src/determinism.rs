//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the ability simulation produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Every authoritative participant runs the same ability updates, so the
//! simulation must be 100% deterministic. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`ability_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Side state and reservations live in `BTreeMap`s and entities are
//!   visited in sorted id order.
//!
//! - **Reservation races**: two units scanning for the same target must
//!   resolve the race the same way everywhere; ascending id order decides.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual family determinism
//! 2. **Property tests**: Random command scripts must still replay exactly
//! 3. **Parallel tests**: Running N simulations on threads all match

use std::thread;

use ability_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use ability_test_utils::determinism::verify_determinism;
/// use ability_test_utils::fixtures::skirmish;
///
/// let result = verify_determinism(
///     3,   // Run 3 times
///     100, // 100 ticks each
///     skirmish,
///     |sim| { sim.tick(); },
///     |sim| sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a [`Simulation`] twice with identical setup and compare final hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick();
        },
        |sim| sim.state_hash(),
    )
    .is_deterministic
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations_scoped<F>(
    setup_fn: F,
    num_sims: usize,
    num_ticks: u64,
) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.tick();
        sim2.tick();

        if sim1.state_hash() != sim2.state_hash() {
            tracing::warn!(tick, "simulations diverged");
            return Some(tick);
        }
    }

    None
}

/// Verify that a bincode round-trip preserves simulation state exactly.
///
/// The restored copy is also advanced `num_ticks` further next to the
/// original, so state that hashes equal but behaves differently is caught.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let mut sim = setup_fn();

    for _ in 0..num_ticks {
        sim.tick();
    }

    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(mut restored) = Simulation::deserialize(&bytes, sim.shared_content()) else {
        return false;
    };
    if restored.state_hash() != sim.state_hash() {
        return false;
    }

    for _ in 0..num_ticks {
        sim.tick();
        restored.tick();
    }
    restored.state_hash() == sim.state_hash()
}

/// Proptest strategies for ability testing.
///
/// Entity ids are only known after spawning, so scripts refer to actors and
/// targets by index into the scenario's sorted id list.
pub mod strategies {
    use ability_core::abilities::AbilityCommand;
    use ability_core::components::{EntityId, Ticks};
    use ability_core::facade::AbilityFacade;
    use ability_core::simulation::Simulation;
    use proptest::prelude::*;

    /// A command with its target left as an index.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CommandTemplate {
        /// A command without a target.
        Plain(AbilityCommand),
        /// Lock onto the target at this index.
        Lock(usize),
        /// Charge at the target at this index.
        Charge(usize),
    }

    impl CommandTemplate {
        /// Resolve against a scenario's ids. Out-of-range indices wrap.
        #[must_use]
        pub fn resolve(self, ids: &[EntityId]) -> AbilityCommand {
            let pick = |i: usize| {
                if ids.is_empty() {
                    EntityId::NONE
                } else {
                    ids[i % ids.len()]
                }
            };
            match self {
                Self::Plain(command) => command,
                Self::Lock(i) => AbilityCommand::Lock(pick(i)),
                Self::Charge(i) => AbilityCommand::Charge(pick(i)),
            }
        }
    }

    /// One scripted input: who, what, then how long to wait.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ScriptStep {
        /// Actor index.
        pub actor: usize,
        /// Command issued.
        pub command: CommandTemplate,
        /// Ticks to run afterwards.
        pub wait: Ticks,
    }

    /// Any command, targets as indices.
    pub fn arb_command() -> impl Strategy<Value = CommandTemplate> {
        prop_oneof![
            proptest::sample::select(vec![
                AbilityCommand::Burrow,
                AbilityCommand::Unburrow,
                AbilityCommand::Siege,
                AbilityCommand::Unsiege,
                AbilityCommand::Deploy,
                AbilityCommand::Undeploy,
                AbilityCommand::SwitchMode,
                AbilityCommand::Cloak,
                AbilityCommand::Decloak,
                AbilityCommand::DeployTurret,
                AbilityCommand::PackTurret,
            ])
            .prop_map(CommandTemplate::Plain),
            (0usize..16).prop_map(CommandTemplate::Lock),
            (0usize..16).prop_map(CommandTemplate::Charge),
        ]
    }

    /// One script step.
    pub fn arb_step() -> impl Strategy<Value = ScriptStep> {
        (0usize..16, arb_command(), 0u32..200).prop_map(|(actor, command, wait)| ScriptStep {
            actor,
            command,
            wait,
        })
    }

    /// A script of up to `max_len` steps.
    pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<ScriptStep>> {
        proptest::collection::vec(arb_step(), 0..max_len)
    }

    /// Play `script` against `sim`, indexing into the ids alive at the start.
    pub fn play(sim: &mut Simulation, script: &[ScriptStep]) {
        let ids = sim.world().entities().sorted_ids();
        if ids.is_empty() {
            return;
        }
        for step in script {
            let actor = ids[step.actor % ids.len()];
            sim.command(actor, step.command.resolve(&ids));
            for _ in 0..step.wait {
                sim.tick();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::{arb_script, play};
    use super::*;
    use crate::fixtures::{self, skirmish};
    use proptest::prelude::*;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_empty_simulation_determinism() {
        assert!(verify_simulation_determinism(fixtures::sim, 100));
    }

    #[test]
    fn test_skirmish_determinism() {
        assert!(verify_simulation_determinism(skirmish, 1500));
    }

    #[test]
    fn test_find_divergence_on_deterministic_sim() {
        assert!(find_first_divergence(skirmish, 300).is_none());
    }

    #[test]
    fn test_serialization_preserves_skirmish() {
        assert!(verify_serialization_determinism(skirmish, 400));
    }

    #[test]
    fn test_parallel_skirmish_simulations() {
        let result = run_parallel_simulations_scoped(skirmish, 4, 600);
        assert_eq!(result.hashes.len(), 4);
        result.assert_deterministic();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Random command scripts replay to the same state.
        #[test]
        fn prop_scripts_are_replayable(script in arb_script(12)) {
            let setup = || {
                let mut sim = skirmish();
                play(&mut sim, &script);
                sim
            };
            prop_assert!(verify_simulation_determinism(setup, 50));
        }

        /// Snapshots taken mid-script restore exactly.
        #[test]
        fn prop_serialization_roundtrip_is_exact(script in arb_script(8)) {
            let setup = || {
                let mut sim = skirmish();
                play(&mut sim, &script);
                sim
            };
            prop_assert!(verify_serialization_determinism(setup, 30));
        }
    }
}
