//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given identical configuration, deltas and commands.
//!
//! # Testing Strategy
//!
//! Replays and save/resume only work if the simulation is 100%
//! deterministic. Sources of non-determinism include:
//!
//! - **Floating-point math**: We use fixed-point arithmetic via
//!   [`lanefall_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Entities are scanned in spawn order and
//!   templates live in ordered maps.
//!
//! - **System randomness**: The match owns a single seeded RNG.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual systems (economy, engagement, director)
//! 2. **Property tests**: Random deltas and seeds still reproduce exactly
//! 3. **Integration tests**: Scripted matches are reproducible
//! 4. **Parallel tests**: Running N matches in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use lanefall_core::data::MatchConfig;
use lanefall_core::math::Fixed;
use lanefall_core::simulation::Simulation;

use crate::fixtures::scripted_commands;

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

/// Advance a match one frame with the scripted player.
pub fn scripted_step(sim: &mut Simulation, delta: Fixed) {
    for command in scripted_commands(sim) {
        command.apply(sim);
    }
    sim.tick(delta);
}

/// Build a match from a config that is expected to be valid.
///
/// # Panics
///
/// Panics if the configuration is rejected.
#[must_use]
pub fn start_match(config: &MatchConfig) -> Simulation {
    Simulation::new(config.clone()).expect("match config should be valid")
}

/// Play the same scripted match `runs` times and compare final hashes.
#[must_use]
pub fn verify_match_determinism(
    config: &MatchConfig,
    runs: usize,
    ticks: u64,
    delta: Fixed,
) -> DeterminismResult {
    verify_determinism(
        runs,
        ticks,
        || start_match(config),
        |sim| scripted_step(sim, delta),
        Simulation::state_hash,
    )
}

/// Run N scripted matches on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under different thread
/// scheduling or memory layout.
#[must_use]
pub fn run_parallel_matches(
    config: &MatchConfig,
    num_sims: usize,
    num_ticks: u64,
    delta: Fixed,
) -> DeterminismResult {
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = start_match(config);
                    for _ in 0..num_ticks {
                        scripted_step(&mut sim, delta);
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

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two scripted runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the runs stay identical, `Some(tick)` if they diverge at
/// that tick.
#[must_use]
pub fn find_first_divergence(config: &MatchConfig, num_ticks: u64, delta: Fixed) -> Option<u64> {
    let mut sim1 = start_match(config);
    let mut sim2 = start_match(config);

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        scripted_step(&mut sim1, delta);
        scripted_step(&mut sim2, delta);

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Verify that a serialization round-trip preserves the match exactly,
/// both immediately and after both copies keep playing.
#[must_use]
pub fn verify_serialization_determinism(config: &MatchConfig, num_ticks: u64, delta: Fixed) -> bool {
    let mut sim = start_match(config);
    for _ in 0..num_ticks {
        scripted_step(&mut sim, delta);
    }

    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(mut restored) = Simulation::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != sim.state_hash() {
        return false;
    }

    for _ in 0..num_ticks {
        scripted_step(&mut sim, delta);
        scripted_step(&mut restored, delta);
    }
    restored.state_hash() == sim.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for simulation testing.
pub mod strategies {
    use lanefall_core::math::{Fixed, Vec2Fixed};
    use proptest::prelude::*;

    /// Frame delta that is an exact power-of-two fraction of a second
    /// (1/64 .. 1/2), so sums never pick up rounding error.
    pub fn arb_exact_delta() -> impl Strategy<Value = Fixed> {
        (1u32..=6).prop_map(|shift| Fixed::ONE >> shift)
    }

    /// Arbitrary positive frame delta up to a quarter second.
    pub fn arb_delta() -> impl Strategy<Value = Fixed> {
        (1i64..=(1i64 << 30)).prop_map(Fixed::from_bits)
    }

    /// Fixed-point coordinate within a typical lane.
    pub fn arb_coordinate() -> impl Strategy<Value = Fixed> {
        (-40i32..=40).prop_map(Fixed::from_num)
    }

    /// Position within a typical lane.
    pub fn arb_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// Positive summon event weight.
    pub fn arb_weight() -> impl Strategy<Value = Fixed> {
        (1i32..=20).prop_map(Fixed::from_num)
    }

    /// Match seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Sequence of frame deltas.
    pub fn arb_deltas(max_len: usize) -> impl Strategy<Value = Vec<Fixed>> {
        prop::collection::vec(arb_delta(), 1..=max_len)
    }
}
