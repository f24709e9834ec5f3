//! Countdown Timer - a countdown core with a state-managed HTTP surface
//! 
//! The `countdown` module is the timer itself: a pull-based state machine
//! with an injectable clock and an alert seam. The remaining modules wrap one
//! timer in a small service that ticks it, accepts commands over HTTP and
//! streams snapshots to presentation consumers.

pub mod config;
pub mod countdown;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use countdown::{CountdownTimer, TimerSnapshot, TimerState};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
