// Unit tests for replay module
//
// Tests the core functionality of the replay engine including:
// - Loading JSONL log files
// - Replaying individual turns
// - Validating expected moves
// - Generating statistics

use frontier_chess_bot::config::Config;
use frontier_chess_bot::replay::ReplayEngine;
use std::path::PathBuf;

/// Helper function to get the path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

/// Shallow deterministic configuration so replays finish quickly
fn replay_config() -> Config {
    let mut config = Config::default_hardcoded();
    config.search.max_depth = 1;
    config
}

fn moves(list: &[&str]) -> Vec<String> {
    list.iter().map(|m| m.to_string()).collect()
}

#[test]
fn test_load_log_file_sample_game() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);

    let entries = engine
        .load_log_file(fixture_path("sample_game.jsonl"))
        .expect("Failed to load sample_game.jsonl");

    assert_eq!(entries.len(), 3, "Expected 3 log entries");
    assert_eq!(entries[0].turn, 1);
    assert_eq!(entries[0].chosen_move, "e2e4");
    assert_eq!(entries[0].predicted_reply.as_deref(), Some("e7e5"));
    assert_eq!(entries[2].eval, Some(10010.0));
    assert!(entries[2].predicted_reply.is_none());
}

#[test]
fn test_load_malformed_log_reports_line() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);

    let err = engine
        .load_log_file(fixture_path("malformed.jsonl"))
        .expect_err("Malformed log should fail to load");
    assert!(err.contains("line 2"), "Unexpected error: {}", err);
}

#[test]
fn test_load_missing_log_file() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);
    assert!(engine.load_log_file(fixture_path("does_not_exist.jsonl")).is_err());
}

#[test]
fn test_replay_mates_match_log() {
    let engine = ReplayEngine::new(replay_config(), false).with_seed(17);
    let entries = engine
        .load_log_file(fixture_path("mate_in_one.jsonl"))
        .expect("Failed to load mate_in_one.jsonl");

    let results = engine.replay_all(&entries).expect("Replay should succeed");
    assert_eq!(results.len(), 2);
    // Results keep log order despite parallel replay
    assert_eq!(results[0].turn, 10);
    assert_eq!(results[1].turn, 12);
    assert!(results.iter().all(|r| r.matches), "{:?}", results);
    assert!(results[0].replayed_eval.unwrap() >= 10000.0);

    let stats = engine.generate_stats(&results);
    assert_eq!(stats.total_turns, 2);
    assert_eq!(stats.matches, 2);
    assert_eq!(stats.match_rate, 100.0);
}

#[test]
fn test_replay_specific_turns() {
    let engine = ReplayEngine::new(replay_config(), false).with_seed(17);
    let entries = engine.load_log_file(fixture_path("sample_game.jsonl")).unwrap();

    let results = engine.replay_turns(&entries, &[5]).expect("Turn 5 exists");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].replayed_move, "a1a8");
    assert!(results[0].matches);

    assert!(engine.replay_turns(&entries, &[99]).is_err());
}

#[test]
fn test_replay_opening_turn_yields_legal_move() {
    let engine = ReplayEngine::new(replay_config(), false).with_seed(3);
    let entries = engine.load_log_file(fixture_path("sample_game.jsonl")).unwrap();

    let result = engine.replay_entry(&entries[0]).expect("Replay should succeed");
    assert_eq!(result.original_move, "e2e4");
    assert_eq!(result.replayed_move.len(), 4);
    assert!(result.search_depth <= 1);
}

#[test]
fn test_validate_expected_moves() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);
    let entries = engine.load_log_file(fixture_path("sample_game.jsonl")).unwrap();

    assert!(engine
        .validate_expected_moves(&entries, &[(1, moves(&["e2e4"])), (5, moves(&["A1A8"]))])
        .is_ok());
    assert!(engine
        .validate_expected_moves(&entries, &[(3, moves(&["b1c3", "g1f3"]))])
        .is_ok());

    let err = engine
        .validate_expected_moves(&entries, &[(3, moves(&["d2d4"]))])
        .expect_err("g1f3 is not d2d4");
    assert!(err.contains("Turn 3"));

    assert!(engine
        .validate_expected_moves(&entries, &[(42, moves(&["e2e4"]))])
        .is_err());
}
