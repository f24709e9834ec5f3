//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::countdown::{parse_duration, TimerSnapshot};

/// Body of POST /timer/start: either `duration` as `M:SS`, or `minutes`
/// and/or `seconds` as picker values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRequest {
    pub duration: Option<String>,
    pub minutes: Option<u64>,
    pub seconds: Option<u64>,
}

impl StartRequest {
    /// Total countdown length in seconds
    pub fn total_seconds(&self) -> Result<u64, String> {
        match (&self.duration, self.minutes, self.seconds) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                Err("Give either duration or minutes/seconds, not both".to_string())
            }
            (Some(duration), None, None) => parse_duration(duration).map_err(|e| e.to_string()),
            (None, None, None) => Err("Missing duration".to_string()),
            (None, minutes, seconds) => minutes
                .unwrap_or(0)
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds.unwrap_or(0)))
                .ok_or_else(|| "Duration is too large".to_string()),
        }
    }
}

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// The command changed the timer
    pub fn applied(message: String, timer: TimerSnapshot) -> Self {
        Self::new("applied".to_string(), message, timer)
    }

    /// The command did not apply to the current state and was ignored
    pub fn rejected(message: String, timer: TimerSnapshot) -> Self {
        Self::new("rejected".to_string(), message, timer)
    }

    /// The request itself was unusable
    pub fn invalid(message: String, timer: TimerSnapshot) -> Self {
        Self::new("invalid".to_string(), message, timer)
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub tick_interval_ms: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
