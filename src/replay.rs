// Replay module for analyzing historical decisions and debugging move choice
//
// This module provides functionality to:
// 1. Parse JSONL decision logs
// 2. Re-run the search on the logged positions
// 3. Compare logged vs replayed moves
// 4. Generate detailed analysis reports

use log::{info, warn};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::bot::Bot;
use crate::chess::ChessPosition;
use crate::config::Config;
use crate::debug_logger::DecisionRecord;
use crate::timer::Stopwatch;
use crate::types::NULL_MOVE;

/// One line of the decision log
pub type LogEntry = DecisionRecord;

/// Result of replaying a single decision
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub game_id: String,
    pub turn: i32,
    pub original_move: String,
    pub replayed_move: String,
    pub matches: bool,
    pub original_eval: Option<f64>,
    pub replayed_eval: Option<f64>,
    pub search_depth: usize,
    pub computation_time_ms: u64,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing decision logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
    seed: Option<u64>,
}

impl ReplayEngine {
    /// Creates a new replay engine; selection is seeded from the config if it has a seed
    pub fn new(config: Config, verbose: bool) -> Self {
        let seed = config.selection.seed;
        ReplayEngine {
            config,
            verbose,
            seed,
        }
    }

    /// Overrides the selection seed for every replayed decision
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Re-runs the search on a single logged position and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let mut position = ChessPosition::from_fen(&entry.fen)?;
        let original_move = normalize_uci(&entry.chosen_move);
        if original_move != NULL_MOVE {
            position.parse_uci(&original_move)?;
        }

        let mut rng = Bot::make_rng(self.seed);
        let clock = Stopwatch::start();
        let report = Bot::compute_move(&self.config, &mut position, &clock, &mut rng);

        let replayed_move = report
            .chosen_move
            .unwrap_or_else(|| NULL_MOVE.to_string());
        let matches = original_move == replayed_move;

        let result = ReplayResult {
            game_id: entry.game_id.clone(),
            turn: entry.turn,
            original_move,
            replayed_move,
            matches,
            original_eval: entry.eval,
            replayed_eval: report.eval,
            search_depth: report.depth,
            computation_time_ms: report.elapsed_ms,
        };

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} (eval: {:?}, depth: {}, time: {}ms)",
                    result.turn,
                    result.replayed_move,
                    result.replayed_eval,
                    result.search_depth,
                    result.computation_time_ms
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} (eval: {:?}, depth: {}, time: {}ms)",
                    result.turn,
                    result.original_move,
                    result.replayed_move,
                    result.replayed_eval,
                    result.search_depth,
                    result.computation_time_ms
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in parallel, keeping log order in the results
    pub fn replay_all(&self, entries: &[LogEntry]) -> Result<Vec<ReplayResult>, String> {
        let results: Vec<ReplayResult> = entries
            .par_iter()
            .filter_map(|entry| match self.replay_entry(entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                    None
                }
            })
            .collect();

        Ok(results)
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(&self, entries: &[LogEntry], turn_numbers: &[i32]) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results.iter().map(|r| r.computation_time_ms as f64).sum::<f64>()
                / results.len() as f64;
            let avg_depth: f64 =
                results.iter().map(|r| r.search_depth as f64).sum::<f64>() / results.len() as f64;

            println!("Average Search Depth:       {:.1}", avg_depth);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} (logged eval: {:?}, replayed eval: {:?}, depth: {}, time: {}ms)",
                    result.turn,
                    result.original_move,
                    result.replayed_move,
                    result.original_eval,
                    result.replayed_eval,
                    result.search_depth,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Validates that the logged moves are among the acceptable ones
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(i32, Vec<String>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            let actual_move = normalize_uci(&entry.chosen_move);

            if !acceptable.iter().any(|m| normalize_uci(m) == actual_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn, acceptable, actual_move
                ));
            }
        }

        Ok(())
    }
}

/// Canonical spelling of a UCI move for comparisons
pub fn normalize_uci(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(turn: i32, matches: bool) -> ReplayResult {
        ReplayResult {
            game_id: "g".to_string(),
            turn,
            original_move: "e2e4".to_string(),
            replayed_move: if matches { "e2e4" } else { "d2d4" }.to_string(),
            matches,
            original_eval: None,
            replayed_eval: Some(1.0),
            search_depth: 2,
            computation_time_ms: 10,
        }
    }

    #[test]
    fn test_normalize_uci() {
        assert_eq!(normalize_uci(" E7E8Q "), "e7e8q");
        assert_eq!(normalize_uci("0000"), "0000");
    }

    #[test]
    fn test_generate_stats() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let stats = engine.generate_stats(&[result(1, true), result(2, false), result(3, true), result(4, true)]);
        assert_eq!(stats.total_turns, 4);
        assert_eq!(stats.matches, 3);
        assert_eq!(stats.mismatches, 1);
        assert!((stats.match_rate - 75.0).abs() < 1e-9);

        let empty = engine.generate_stats(&[]);
        assert_eq!(empty.match_rate, 0.0);
    }

    #[test]
    fn test_replay_rejects_illegal_logged_move() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false).with_seed(1);
        let entry = LogEntry {
            game_id: "g".to_string(),
            turn: 1,
            fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string(),
            chosen_move: "e2e5".to_string(),
            eval: None,
            predicted_reply: None,
            depth: 0,
            nodes: 0,
            elapsed_ms: 0,
            timestamp: String::new(),
        };
        assert!(engine.replay_entry(&entry).is_err());
    }
}
