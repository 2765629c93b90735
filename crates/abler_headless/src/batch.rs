//! Batch match runner for balance testing.
//!
//! Plays many independently seeded matches in parallel using rayon and
//! aggregates their round results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use abler_core::prelude::{CombatOutcome, EndReason};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::game::{Match, RoundSummary};
use crate::setup::MatchSetup;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Setup every match starts from.
    pub setup: MatchSetup,
    /// Number of matches to play.
    pub match_count: u32,
    /// Worker threads (0 = use rayon default).
    pub parallel: u32,
    /// Seed of the first match; match `i` uses `seed_start + i`.
    pub seed_start: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            setup: MatchSetup::default(),
            match_count: 100,
            parallel: 0,
            seed_start: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for a setup.
    #[must_use]
    pub fn new(setup: MatchSetup, match_count: u32) -> Self {
        Self {
            setup,
            match_count,
            ..Default::default()
        }
    }

    /// Set seed start.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set worker thread count.
    #[must_use]
    pub fn with_parallel(mut self, threads: u32) -> Self {
        self.parallel = threads;
        self
    }
}

/// Every round of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Seed the match ran with.
    pub seed: u64,
    /// Rounds in order.
    pub rounds: Vec<RoundSummary>,
    /// Wins at the end.
    pub wins: u32,
    /// Lives at the end.
    pub lives: u32,
    /// Whether the match ended rather than hitting the round cap.
    pub finished: bool,
}

impl MatchSummary {
    /// Board hash after each round.
    #[must_use]
    pub fn round_hashes(&self) -> Vec<u64> {
        self.rounds.iter().map(|round| round.state_hash).collect()
    }
}

/// Play one match until it ends or reaches the setup's round cap.
pub fn run_match(setup: &MatchSetup, seed: u64) -> Result<MatchSummary> {
    let mut game = Match::from_setup(setup, seed)?;
    let mut rounds = Vec::new();
    while !game.is_game_over() && (setup.max_rounds == 0 || rounds.len() < setup.max_rounds as usize) {
        rounds.push(game.play_round()?);
    }
    debug!(seed, rounds = rounds.len(), wins = game.wins(), "match complete");
    Ok(MatchSummary {
        seed,
        rounds,
        wins: game.wins(),
        lives: game.lives(),
        finished: game.is_game_over(),
    })
}

/// Aggregate numbers over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches that produced results.
    pub total_matches: usize,
    /// Rounds played across all matches.
    pub total_rounds: usize,
    /// Rounds the player won.
    pub rounds_won: usize,
    /// Rounds stopped by the time limit.
    pub timeouts: usize,
    /// `rounds_won / total_rounds`.
    pub round_win_rate: f64,
    /// Mean wins per match.
    pub average_wins: f64,
    /// Mean simulated seconds per round.
    pub average_round_seconds: f64,
}

impl BatchSummary {
    /// Summarize finished matches.
    #[must_use]
    pub fn from_matches(matches: &[MatchSummary]) -> Self {
        let rounds = || matches.iter().flat_map(|m| m.rounds.iter());
        let total_rounds = rounds().count();
        let rounds_won = rounds()
            .filter(|r| r.combat.outcome == CombatOutcome::Victory)
            .count();
        let timeouts = rounds()
            .filter(|r| r.combat.reason == EndReason::Timeout)
            .count();
        let seconds: f64 = rounds().map(|r| r.combat.elapsed.to_num::<f64>()).sum();
        let wins: u32 = matches.iter().map(|m| m.wins).sum();

        let ratio = |num: f64, den: usize| if den == 0 { 0.0 } else { num / den as f64 };
        Self {
            total_matches: matches.len(),
            total_rounds,
            rounds_won,
            timeouts,
            round_win_rate: ratio(rounds_won as f64, total_rounds),
            average_wins: ratio(f64::from(wins), matches.len()),
            average_round_seconds: ratio(seconds, total_rounds),
        }
    }
}

/// A match that failed to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index.
    pub match_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual matches, in seed order.
    pub matches: Vec<MatchSummary>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
    /// Matches that failed.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Default results file inside an output directory.
#[must_use]
pub fn results_path(output_dir: &Path) -> PathBuf {
    output_dir.join("batch_results.json")
}

/// Run a batch of matches.
#[must_use]
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    info!(
        matches = config.match_count,
        setup = %config.setup.name,
        seed_start = config.seed_start,
        "starting batch"
    );

    let play = || -> Vec<std::result::Result<MatchSummary, BatchError>> {
        (0..config.match_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                run_match(&config.setup, seed).map_err(|err| {
                    warn!(match_index = i, seed, %err, "match failed");
                    BatchError {
                        match_index: i,
                        seed,
                        message: err.to_string(),
                    }
                })
            })
            .collect()
    };

    let outcomes = if config.parallel > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build()
        {
            Ok(pool) => pool.install(play),
            Err(err) => {
                warn!(%err, "could not build thread pool, using the global one");
                play()
            }
        }
    } else {
        play()
    };

    let mut matches = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(summary) => matches.push(summary),
            Err(error) => errors.push(error),
        }
    }

    let summary = BatchSummary::from_matches(&matches);
    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        matches = matches.len(),
        failed = errors.len(),
        win_rate = summary.round_win_rate,
        duration_seconds,
        "batch complete"
    );

    BatchResults {
        config,
        matches,
        summary,
        duration_seconds,
        errors,
    }
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Seed checked.
    pub seed: u64,
    /// Round hashes of every run.
    pub runs: Vec<Vec<u64>>,
    /// Whether every run matched the first.
    pub deterministic: bool,
}

/// Play the same seed `runs` times and compare round hashes.
pub fn verify_determinism(setup: &MatchSetup, seed: u64, runs: u32) -> Result<VerifyReport> {
    let runs = (0..runs)
        .map(|_| run_match(setup, seed).map(|summary| summary.round_hashes()))
        .collect::<Result<Vec<_>>>()?;
    let deterministic = runs.windows(2).all(|pair| pair[0] == pair[1]);
    Ok(VerifyReport {
        seed,
        runs,
        deterministic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_setup(rounds: u32) -> MatchSetup {
        MatchSetup {
            max_rounds: rounds,
            ..MatchSetup::default()
        }
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(short_setup(2), 12).with_seed(500).with_parallel(2);
        assert_eq!(config.match_count, 12);
        assert_eq!(config.seed_start, 500);
        assert_eq!(config.parallel, 2);
    }

    #[test]
    fn test_run_match_respects_round_cap() {
        let summary = run_match(&short_setup(2), 3).unwrap();
        assert_eq!(summary.rounds.len(), 2);
        assert_eq!(summary.rounds[0].round, 1);
        assert_eq!(summary.rounds[1].round, 2);
        assert_eq!(summary.round_hashes().len(), 2);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(BatchConfig::new(short_setup(1), 6).with_parallel(2));
        assert_eq!(results.matches.len(), 6);
        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_rounds, 6);
        let seeds: Vec<_> = results.matches.iter().map(|m| m.seed).collect();
        assert_eq!(seeds, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        let summary = BatchSummary::from_matches(&[]);
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn test_verify_determinism() {
        let report = verify_determinism(&short_setup(2), 12345, 3).unwrap();
        assert_eq!(report.runs.len(), 3);
        assert!(report.deterministic);
    }
}
