// Debug logging module for asynchronous decision logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the main request/response cycle. Each decision is written to a JSONL file
// that the replay tool can read back.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Represents a single debug log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionRecord {
    pub game_id: String,
    pub turn: i32,
    /// Position the decision was made from
    pub fen: String,
    pub chosen_move: String,
    pub eval: Option<f64>,
    pub predicted_reply: Option<String>,
    /// Plies searched
    pub depth: usize,
    /// Live frontier nodes when the search stopped
    pub nodes: usize,
    pub elapsed_ms: u64,
    #[serde(default)]
    pub timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a decision asynchronously (fire-and-forget)
    /// The timestamp is filled in here; must be called from within a tokio runtime
    pub fn log_decision(&self, mut record: DecisionRecord) {
        if !self.enabled {
            return;
        }

        record.timestamp = chrono::Utc::now().to_rfc3339();
        let file_handle = self.file.clone();

        tokio::spawn(async move {
            Self::write_record(file_handle, record).await;
        });
    }

    /// Appends one record and flushes
    async fn write_record(file_handle: Arc<Mutex<Option<File>>>, record: DecisionRecord) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&record) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
