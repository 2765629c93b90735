//! Headless autobattler runner.
//!
//! Plays matches without any presentation layer. Results go to stdout or
//! a JSON file, logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Play one match with the default army
//! cargo run -p abler_headless -- run --seed 7
//!
//! # Pick the army from archetype tags
//! cargo run -p abler_headless -- run --army paladin,paladin,pyromancer --rounds 5
//!
//! # Run a batch of balance matches
//! cargo run -p abler_headless -- batch --count 1000 --output results/
//!
//! # Verify determinism of a seed
//! cargo run -p abler_headless -- verify --seed 12345 --runs 5
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use abler_core::prelude::CombatConfig;
use abler_headless::batch::{results_path, run_batch, verify_determinism, BatchConfig};
use abler_headless::{Match, MatchSetup, Result};

#[derive(Parser)]
#[command(name = "abler_headless")]
#[command(about = "Headless autobattler runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the army and combat settings come from.
#[derive(Args)]
struct SetupArgs {
    /// Match setup file (RON)
    #[arg(short, long)]
    setup: Option<PathBuf>,

    /// Comma-separated archetypes, replacing the setup's army
    #[arg(short, long, value_delimiter = ',')]
    army: Vec<String>,

    /// Combat config file (RON), replacing the setup's config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Round cap (0 = play until the match is over)
    #[arg(short, long)]
    rounds: Option<u32>,
}

impl SetupArgs {
    fn resolve(self) -> Result<MatchSetup> {
        let mut setup = match self.setup {
            Some(path) => MatchSetup::load(path)?,
            None => MatchSetup::default(),
        };
        if let Some(path) = self.config {
            setup.config = CombatConfig::from_ron_str(&std::fs::read_to_string(path)?)?;
        }
        if !self.army.is_empty() {
            setup = setup.with_army_tags(&self.army)?;
        }
        if let Some(rounds) = self.rounds {
            setup.max_rounds = rounds;
        }
        Ok(setup)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play one match, printing a JSON summary per round
    Run {
        #[command(flatten)]
        setup: SetupArgs,

        /// Match seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Play many seeded matches in parallel
    Batch {
        #[command(flatten)]
        setup: SetupArgs,

        /// Number of matches
        #[arg(short = 'n', long, default_value = "100")]
        count: u32,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Seed of the first match
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Replay a seed several times and compare board hashes
    Verify {
        #[command(flatten)]
        setup: SetupArgs,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of runs
        #[arg(long, default_value = "5")]
        runs: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries results
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    let result = match cli.command {
        Commands::Run { setup, seed } => setup.resolve().and_then(|setup| cmd_run(&setup, seed)),
        Commands::Batch {
            setup,
            count,
            parallel,
            output,
            seed,
        } => setup
            .resolve()
            .and_then(|setup| cmd_batch(setup, count, parallel, &output, seed)),
        Commands::Verify { setup, seed, runs } => setup
            .resolve()
            .and_then(|setup| cmd_verify(&setup, seed, runs)),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Play a single match
fn cmd_run(setup: &MatchSetup, seed: u64) -> Result<ExitCode> {
    tracing::info!(setup = %setup.name, seed, units = setup.army.len(), "starting match");

    let mut game = Match::from_setup(setup, seed)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut played = 0;
    while !game.is_game_over() && (setup.max_rounds == 0 || played < setup.max_rounds) {
        let round = game.play_round()?;
        writeln!(out, "{}", serde_json::to_string(&round)?)?;
        played += 1;
    }

    eprintln!(
        "Match over after {} rounds: {} wins, {} lives left",
        played,
        game.wins(),
        game.lives()
    );
    Ok(ExitCode::SUCCESS)
}

/// Run a batch of matches
fn cmd_batch(
    setup: MatchSetup,
    count: u32,
    parallel: u32,
    output: &std::path::Path,
    seed: u64,
) -> Result<ExitCode> {
    std::fs::create_dir_all(output)?;

    let config = BatchConfig::new(setup, count)
        .with_seed(seed)
        .with_parallel(parallel);
    let results = run_batch(config);

    let path = results_path(output);
    results.save(&path)?;

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", results.matches.len());
    if !results.errors.is_empty() {
        eprintln!("Matches FAILED: {}", results.errors.len());
        for error in results.errors.iter().take(10) {
            eprintln!("  Match {} (seed {}): {}", error.match_index, error.seed, error.message);
        }
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!("Rounds: {}", results.summary.total_rounds);
    eprintln!("Round win rate: {:.1}%", results.summary.round_win_rate * 100.0);
    eprintln!("Average wins per match: {:.2}", results.summary.average_wins);
    eprintln!("Timeouts: {}", results.summary.timeouts);
    eprintln!("\nResults saved to: {}", path.display());

    Ok(if results.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Verify a seed replays identically
fn cmd_verify(setup: &MatchSetup, seed: u64, runs: u32) -> Result<ExitCode> {
    tracing::info!(seed, runs, "verifying determinism");
    let report = verify_determinism(setup, seed, runs)?;

    if report.deterministic {
        let rounds = report.runs.first().map_or(0, Vec::len);
        eprintln!("✓ Determinism verified: {runs} runs, {rounds} rounds each");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("✗ Determinism FAILED for seed {seed}");
        for (i, hashes) in report.runs.iter().enumerate() {
            eprintln!("  Run {i}: {hashes:x?}");
        }
        Ok(ExitCode::FAILURE)
    }
}
