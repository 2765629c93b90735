//! Determinism testing utilities.
//!
//! Provides a harness for verifying that combat produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: We use fixed-point arithmetic via
//!   [`abler_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Units live in a `BTreeMap` and turn order follows the rosters.
//!
//! - **System randomness**: The only random choice draws from the
//!   board's seeded RNG.

use std::thread;

use abler_core::board::Board;
use abler_core::math::{Fixed, FRAME_TIME};

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
                "Combat is non-deterministic!\n\
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

/// Run a board setup twice at [`FRAME_TIME`] and compare final hashes.
pub fn verify_board_determinism<F>(setup_fn: F, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Board,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |board| {
            board.advance(FRAME_TIME);
        },
        Board::state_hash,
    )
}

/// Run N boards on scoped threads and collect their final hashes.
///
/// Catches hidden shared state that only shows up when boards run
/// side by side.
pub fn run_parallel_boards<F>(setup_fn: F, num_boards: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Board + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_boards)
            .map(|_| {
                s.spawn(|| {
                    let mut board = setup_fn();
                    for _ in 0..num_ticks {
                        board.advance(FRAME_TIME);
                    }
                    board.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| panic!("board thread panicked")))
            .collect()
    });

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the runs agree, `Some(tick)` if they diverge at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64, dt: Fixed) -> Option<u64>
where
    F: Fn() -> Board,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.advance(dt);
        second.advance(dt);

        if first.state_hash() != second.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Proptest strategies for board-level property tests.
pub mod strategies {
    use proptest::prelude::*;

    /// A cell on a `width` x `height` board.
    pub fn arb_cell(width: i32, height: i32) -> impl Strategy<Value = (i32, i32)> {
        (0..width, 0..height)
    }

    /// A cell that may fall outside a `width` x `height` board.
    pub fn arb_any_cell(width: i32, height: i32) -> impl Strategy<Value = (i32, i32)> {
        (-2..width + 2, -2..height + 2)
    }

    /// Distinct placements, at most `max` of them.
    pub fn arb_placements(width: i32, height: i32, max: usize) -> impl Strategy<Value = Vec<(i32, i32)>> {
        proptest::collection::hash_set(arb_cell(width, height), 0..=max)
            .prop_map(|cells| {
                let mut cells: Vec<_> = cells.into_iter().collect();
                cells.sort_unstable();
                cells
            })
    }

    /// A random walk of attempted moves.
    pub fn arb_moves(width: i32, height: i32, len: usize) -> impl Strategy<Value = Vec<(usize, (i32, i32))>> {
        proptest::collection::vec((0usize..16, arb_any_cell(width, height)), 0..len)
    }
}
