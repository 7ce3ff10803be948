// HTTP API types for the chess bot endpoints

use serde::{Deserialize, Serialize};

/// UCI null move, answered when there is nothing to play
pub const NULL_MOVE: &str = "0000";

/// Game metadata including ID and per-move timeout
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Game {
    pub id: String,
    /// Milliseconds the server allows per move (informational)
    #[serde(default)]
    pub timeout: u32,
}

/// Request body of every game endpoint
///
/// `fen` is the position the game started from (standard start when absent);
/// `moves` are the UCI moves played since, in order.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct GameState {
    pub game: Game,
    #[serde(default)]
    pub turn: i32,
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(default)]
    pub moves: Vec<String>,
}

/// Response body of `POST /move`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub chosen_move: String,
    pub predicted_reply: Option<String>,
    pub eval: Option<f64>,
    /// Plies searched
    pub depth: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MoveResponse {
    /// Answer for a request that could not be searched at all
    pub fn rejected(chosen_move: String, error: String) -> Self {
        MoveResponse {
            chosen_move,
            predicted_reply: None,
            eval: None,
            depth: 0,
            error: Some(error),
        }
    }
}
