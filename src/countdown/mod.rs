//! Countdown core module
//!
//! This module contains the countdown state machine together with the seams it
//! talks through: a monotonic clock and an alert sink.

pub mod alert;
pub mod clock;
pub mod error;
pub mod format;
pub mod timer;

// Re-export main types
pub use alert::{AlertSink, LogAlert};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Command, DurationParseError, TransitionError};
pub use format::{format_clock, parse_duration};
pub use timer::{CountdownSession, CountdownTimer, TickOutcome, TimerSnapshot, TimerState};
