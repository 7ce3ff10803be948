// Configuration module for reading Bot.toml
// This module provides OOP-style configuration management for the chess bot

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::rules::PieceKind;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub search: SearchConfig,
    pub weights: WeightsConfig,
    pub piece_values: PieceValuesConfig,
    pub selection: SelectionConfig,
    pub debug: DebugConfig,
}

/// Timing and deadline constants
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
    /// Upper bound the host waits for a decision before falling back
    pub hard_timeout_ms: u64,
}

impl TimingConfig {
    /// Computes the effective thinking budget per decision
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms.saturating_sub(self.network_overhead_ms)
    }
}

/// Frontier expansion and pruning constants
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub max_depth: usize,
    pub beam_width: usize,
    pub beam_shrink: f64,
    pub prune_tolerance_numerator: f64,
    pub draw_halfmove_limit: u32,
}

impl SearchConfig {
    /// Number of replies kept per expansion at the given ply
    ///
    /// Shrinks hyperbolically with depth and never drops below one.
    pub fn beam_width_at(&self, ply: usize) -> usize {
        let width = self.beam_width as f64 / (1.0 + self.beam_shrink * ply as f64);
        (width.round() as usize).max(1)
    }

    /// Pruning tolerance band for a search that has reached `ply`
    pub fn prune_tolerance_at(&self, ply: usize) -> f64 {
        self.prune_tolerance_numerator / (ply as f64 + 1.0)
    }
}

/// Evaluator feature weights
#[derive(Debug, Deserialize, Clone)]
pub struct WeightsConfig {
    pub inherit_factor: f64,
    pub neutral_root_eval: f64,
    pub checkmate: f64,
    pub capture: f64,
    pub castle: f64,
    pub promotion: f64,
    pub king_move_penalty: f64,
    pub passed_pawn: f64,
    pub mobility: f64,
    pub threat: f64,
    pub hang: f64,
    pub null_move_probe: bool,
}

/// Material table
#[derive(Debug, Deserialize, Clone)]
pub struct PieceValuesConfig {
    pub pawn: f64,
    pub knight: f64,
    pub bishop: f64,
    pub rook: f64,
    pub queen: f64,
    pub king: f64,
}

impl PieceValuesConfig {
    pub fn value_of(&self, kind: PieceKind) -> f64 {
        match kind {
            PieceKind::Pawn => self.pawn,
            PieceKind::Knight => self.knight,
            PieceKind::Bishop => self.bishop,
            PieceKind::Rook => self.rook,
            PieceKind::Queen => self.queen,
            PieceKind::King => self.king,
        }
    }
}

/// Final move selection constants
#[derive(Debug, Deserialize, Clone)]
pub struct SelectionConfig {
    pub tolerance: f64,
    /// Fixed RNG seed; `None` seeds from the OS every decision
    pub seed: Option<u64>,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Bot.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Bot.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Bot.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Bot.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 100,
                network_overhead_ms: 50,
                hard_timeout_ms: 1000,
            },
            search: SearchConfig {
                max_depth: 10,
                beam_width: 20,
                beam_shrink: 0.5,
                prune_tolerance_numerator: 2.0,
                draw_halfmove_limit: 100,
            },
            weights: WeightsConfig {
                inherit_factor: 0.25,
                neutral_root_eval: 10.0, // keeps small negatives from being discarded at the root
                checkmate: 10000.0,
                capture: 1.0,
                castle: 50.0,
                promotion: 700.0,
                king_move_penalty: 5.0,
                passed_pawn: 25.0,
                mobility: 0.05,
                threat: 0.05,
                hang: 1.0,
                null_move_probe: true,
            },
            piece_values: PieceValuesConfig {
                pawn: 100.0,
                knight: 300.0,
                bishop: 330.0,
                rook: 500.0,
                queen: 1000.0,
                king: 0.0,
            },
            selection: SelectionConfig {
                tolerance: 0.05,
                seed: None,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "chess_bot_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Bot.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}
