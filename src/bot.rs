// Chess bot facade
//
// One `Bot` lives for the whole server. Each /move request rebuilds the game
// position, runs a frontier search on Tokio's blocking pool and always answers
// with some move, even when the request is malformed or the search misbehaves.

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::chess::{to_uci, ChessPosition};
use crate::config::Config;
use crate::debug_logger::{DebugLogger, DecisionRecord};
use crate::rules::GameRules;
use crate::search::{DecisionSource, SearchDriver};
use crate::timer::{Clock, Stopwatch};
use crate::types::{Game, GameState, MoveResponse, NULL_MOVE};

/// Result of one decision, moves rendered as UCI
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    /// `None` only when the position has no legal move
    pub chosen_move: Option<String>,
    pub predicted_reply: Option<String>,
    pub eval: Option<f64>,
    pub depth: usize,
    pub nodes: usize,
    pub elapsed_ms: u64,
    pub source: DecisionSource,
}

impl MoveReport {
    pub fn into_response(self) -> MoveResponse {
        MoveResponse {
            chosen_move: self.chosen_move.unwrap_or_else(|| NULL_MOVE.to_string()),
            predicted_reply: self.predicted_reply,
            eval: self.eval,
            depth: self.depth,
            error: None,
        }
    }
}

/// Chess bot with an OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration and no decision log
    pub fn new(config: Config) -> Self {
        Bot {
            config,
            logger: DebugLogger::disabled(),
        }
    }

    /// Creates a Bot that records every decision to `logger`
    pub fn with_logger(config: Config, logger: DebugLogger) -> Self {
        Bot { config, logger }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns bot metadata
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "author": "frontier-chess",
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, turn: &i32) {
        info!("GAME START {} (turn {})", game.id, turn);
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32) {
        info!("GAME OVER {} (turn {})", game.id, turn);
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// The search runs on the blocking pool and is awaited for at most
    /// `hard_timeout_ms`. If it overruns or panics, the first legal move is
    /// played instead. An unusable position is answered with the null move and
    /// an error message.
    pub async fn get_move(&self, state: &GameState) -> MoveResponse {
        let start_time = Instant::now();
        info!("Turn {}: Computing move", state.turn);

        let position = match ChessPosition::from_game(state.fen.as_deref(), &state.moves) {
            Ok(p) => p,
            Err(e) => {
                warn!("Turn {}: Rejecting position: {}", state.turn, e);
                return MoveResponse::rejected(NULL_MOVE.to_string(), e);
            }
        };

        let fen = position.fen();
        let fallback = position.legal_moves().first().map(to_uci);
        let config = self.config.clone();
        let mut rng = Self::make_rng(self.config.selection.seed);

        let task = tokio::task::spawn_blocking(move || {
            let mut position = position;
            let clock = Stopwatch::since(start_time);
            Self::compute_move(&config, &mut position, &clock, &mut rng)
        });

        let hard_timeout = Duration::from_millis(self.config.timing.hard_timeout_ms);
        let report = match tokio::time::timeout(hard_timeout, task).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                error!("Turn {}: Search task failed: {}", state.turn, e);
                Self::fallback_report(fallback, start_time)
            }
            Err(_) => {
                warn!(
                    "Turn {}: Search exceeded hard timeout of {}ms",
                    state.turn, self.config.timing.hard_timeout_ms
                );
                Self::fallback_report(fallback, start_time)
            }
        };

        info!(
            "Turn {}: Chose {} (eval: {:?}, depth: {}, nodes: {}, time: {}ms)",
            state.turn,
            report.chosen_move.as_deref().unwrap_or(NULL_MOVE),
            report.eval,
            report.depth,
            report.nodes,
            start_time.elapsed().as_millis()
        );

        self.logger.log_decision(DecisionRecord {
            game_id: state.game.id.clone(),
            turn: state.turn,
            fen,
            chosen_move: report.chosen_move.clone().unwrap_or_else(|| NULL_MOVE.to_string()),
            eval: report.eval,
            predicted_reply: report.predicted_reply.clone(),
            depth: report.depth,
            nodes: report.nodes,
            elapsed_ms: report.elapsed_ms,
            timestamp: String::new(),
        });

        report.into_response()
    }

    /// Runs one synchronous decision on `position`
    /// Shared by the server and the replay tool
    pub fn compute_move<C, G>(config: &Config, position: &mut ChessPosition, clock: &C, rng: &mut G) -> MoveReport
    where
        C: Clock,
        G: Rng + ?Sized,
    {
        let decision = SearchDriver::new(config).decide(position, clock, rng);

        MoveReport {
            chosen_move: decision.chosen.as_ref().map(to_uci),
            predicted_reply: decision.predicted_reply.as_ref().map(to_uci),
            eval: decision.eval,
            depth: decision.stats.plies,
            nodes: decision.nodes_live,
            elapsed_ms: decision.elapsed_ms,
            source: decision.source,
        }
    }

    /// Seeded generator when a seed is configured, OS entropy otherwise
    pub fn make_rng(seed: Option<u64>) -> StdRng {
        match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        }
    }

    fn fallback_report(fallback: Option<String>, start_time: Instant) -> MoveReport {
        let source = if fallback.is_some() {
            DecisionSource::FirstLegal
        } else {
            DecisionSource::NoMove
        };
        MoveReport {
            chosen_move: fallback,
            predicted_reply: None,
            eval: None,
            depth: 0,
            nodes: 0,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            source,
        }
    }
}
