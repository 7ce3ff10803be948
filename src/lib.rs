// Library exports for the frontier chess bot
// This allows the replay tool, the server and the integration tests to share the search

pub mod backprop;
pub mod bot;
pub mod chess;
pub mod config;
pub mod debug_logger;
pub mod evaluator;
pub mod frontier;
pub mod pruning;
pub mod replay;
pub mod rules;
pub mod search;
pub mod selector;
pub mod timer;
pub mod types;
