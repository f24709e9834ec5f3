//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, error};

use crate::{
    countdown::TimerSnapshot,
    state::{AppState, CommandOutcome},
};
use super::responses::{ApiResponse, HealthResponse, StartRequest, StatusResponse};

type CommandReply = Result<(StatusCode, Json<ApiResponse>), StatusCode>;

/// Turn a command outcome into a response
fn reply(action: &str, outcome: Result<CommandOutcome, String>) -> CommandReply {
    match outcome {
        Ok(CommandOutcome::Applied(snapshot)) => Ok((
            StatusCode::OK,
            Json(ApiResponse::applied(format!("{} applied", action), snapshot)),
        )),
        Ok(CommandOutcome::Rejected { reason, snapshot }) => {
            debug!("{} endpoint ignored: {}", action, reason);
            Ok((
                StatusCode::CONFLICT,
                Json(ApiResponse::rejected(reason.to_string(), snapshot)),
            ))
        }
        Err(e) => {
            error!("Failed to run {}: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/start - Begin a new countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> CommandReply {
    let duration_seconds = match request.total_seconds() {
        Ok(seconds) => seconds,
        Err(message) => {
            let snapshot = state.get_snapshot().map_err(|e| {
                error!("Failed to get timer snapshot: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::invalid(message, snapshot)),
            ));
        }
    };

    reply("start", state.start(duration_seconds))
}

/// Handle POST /timer/pause - Freeze the running countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> CommandReply {
    reply("pause", state.pause())
}

/// Handle POST /timer/resume - Continue a paused countdown
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> CommandReply {
    reply("resume", state.resume())
}

/// Handle POST /timer/cancel - Discard the current countdown
pub async fn cancel_handler(State(state): State<Arc<AppState>>) -> CommandReply {
    reply("cancel", state.cancel())
}

/// Handle POST /timer/stop-sound - Acknowledge the finish alert
pub async fn stop_sound_handler(State(state): State<Arc<AppState>>) -> CommandReply {
    reply("stop-sound", state.stop_sound())
}

/// Handle GET /status - Return the current snapshot and server metadata
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        tick_interval_ms: u64::try_from(state.tick_interval.as_millis()).unwrap_or(u64::MAX),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Stream snapshots as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.subscribe();
    let first = rx.borrow_and_update().clone();

    let updates = stream::unfold(rx, |mut rx| async move {
        rx.changed().await.ok()?;
        let snapshot = rx.borrow_and_update().clone();
        Some((snapshot, rx))
    });

    let events = stream::iter([first])
        .chain(updates)
        .map(|snapshot| Ok::<_, Infallible>(snapshot_event(&snapshot)));

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn snapshot_event(snapshot: &TimerSnapshot) -> Event {
    match Event::default().event("snapshot").json_data(snapshot) {
        Ok(event) => event,
        Err(e) => {
            error!("Failed to encode snapshot event: {}", e);
            Event::default().event("error").data(e.to_string())
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
