//! Diagnostics reported by the countdown core

use std::fmt;

use thiserror::Error;

use super::TimerState;

/// Commands a caller can issue against the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Cancel,
    StopSound,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Cancel => "cancel",
            Command::StopSound => "stop-sound",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command that was ignored. The timer is left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {command} while {state}")]
    InvalidTransition { command: Command, state: TimerState },
    #[error("countdown duration must be at least one second")]
    ZeroDuration,
    #[error("no finish alert is sounding")]
    AlertNotSounding,
}

/// Rejected user-entered duration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("duration is empty")]
    Empty,
    #[error("invalid duration {0:?}, expected SS or M:SS")]
    Malformed(String),
    #[error("seconds component {0} must be below 60")]
    SecondsOutOfRange(u64),
    #[error("duration must be at least one second")]
    Zero,
}
