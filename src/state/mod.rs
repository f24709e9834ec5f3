//! State management module
//! 
//! This module holds the shared application state the HTTP handlers and the
//! tick task operate on.

pub mod app_state;

// Re-export main types
pub use app_state::{AppState, CommandOutcome, MIN_TICK_INTERVAL};
