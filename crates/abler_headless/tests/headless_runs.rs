//! End-to-end runs through setup files, batches and result files.

use abler_core::prelude::UnitKind;
use abler_headless::batch::{results_path, BatchSummary};
use abler_headless::{run_batch, run_match, BatchConfig, BatchResults, Match, MatchSetup, RunnerError};

const SETUP: &str = r#"(
    name: "pair",
    config: (max_combat_time: 20.0),
    army: [
        (kind: Paladin, x: 1, y: 4, items: ["shield", "amulet"]),
        (kind: Pyromancer, x: 0, y: 5, passives: [grave_chill]),
    ],
    max_rounds: 2,
)"#;

#[test]
fn setup_file_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pair.ron");
    std::fs::write(&path, SETUP).unwrap();

    let setup = MatchSetup::load(&path).unwrap();
    assert_eq!(setup.name, "pair");
    assert_eq!(setup.army.len(), 2);
    assert_eq!(setup.army[1].kind, UnitKind::Pyromancer);

    let game = Match::from_setup(&setup, 5).unwrap();
    assert_eq!(game.homes(), vec![(1, 4), (0, 5)]);
}

#[test]
fn missing_setup_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = MatchSetup::load(dir.path().join("nope.ron"));
    assert!(matches!(result, Err(RunnerError::Io(_))));
}

#[test]
fn malformed_setup_is_ron_error() {
    assert!(matches!(MatchSetup::from_ron_str("(army: [("), Err(RunnerError::Ron(_))));
}

#[test]
fn rounds_never_outlast_the_time_limit() {
    let setup = MatchSetup::from_ron_str(SETUP).unwrap();
    let summary = run_match(&setup, 9).unwrap();
    assert_eq!(summary.rounds.len(), 2);
    for round in &summary.rounds {
        assert!(round.combat.elapsed.to_num::<f64>() <= 20.0 + 1.0 / 60.0);
        assert_eq!(round.enemies.len(), 2);
    }
}

#[test]
fn same_seed_same_match() {
    let setup = MatchSetup::from_ron_str(SETUP).unwrap();
    assert_eq!(run_match(&setup, 77).unwrap(), run_match(&setup, 77).unwrap());
}

#[test]
fn batch_results_save_and_load() {
    let setup = MatchSetup::from_ron_str(SETUP).unwrap();
    let results = run_batch(BatchConfig::new(setup, 4).with_seed(10));
    assert_eq!(results.matches.len(), 4);
    assert_eq!(results.summary, BatchSummary::from_matches(&results.matches));

    let dir = tempfile::tempdir().unwrap();
    let path = results_path(&dir.path().join("nested"));
    results.save(&path).unwrap();
    assert!(path.exists());

    let loaded = BatchResults::load(&path).unwrap();
    assert_eq!(loaded.matches, results.matches);
    assert_eq!(loaded.config.setup.name, "pair");
    assert_eq!(loaded.config.seed_start, 10);
}

#[test]
fn full_match_ends_by_lives_or_wins() {
    let summary = run_match(&MatchSetup::default(), 3).unwrap();
    assert!(summary.finished);
    assert!(summary.lives == 0 || summary.wins == 20);
    let last = summary.rounds.last().unwrap();
    assert!(last.game_over);
    assert!(summary.rounds[..summary.rounds.len() - 1].iter().all(|r| !r.game_over));
}
