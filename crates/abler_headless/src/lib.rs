//! Headless match runner for balance testing and CI verification.
//!
//! This crate drives the combat engine without any presentation layer:
//!
//! - **Matches**: a [`Match`] plays rounds of the player's army against
//!   seeded enemy teams until lives or wins run out
//! - **Batches**: [`run_batch`] plays many seeded matches in parallel and
//!   writes JSON results
//! - **Verification**: [`verify_determinism`] replays a seed and compares
//!   board hashes round by round
//!
//! # Example
//!
//! ```bash
//! # Play a match and print one JSON line per round
//! cargo run -p abler_headless -- run --seed 7
//!
//! # Run 500 matches of a custom army
//! cargo run -p abler_headless -- batch --setup setups/necro_rush.ron --count 500
//!
//! # Check that a seed replays identically
//! cargo run -p abler_headless -- verify --seed 12345 --runs 5
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod error;
pub mod game;
pub mod setup;

pub use batch::{run_batch, run_match, verify_determinism, BatchConfig, BatchResults, MatchSummary};
pub use error::{Result, RunnerError};
pub use game::{Match, Phase, RoundSummary};
pub use setup::{MatchSetup, Recruit};
