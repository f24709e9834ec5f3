//! Countdown tick background task

use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::{countdown::TickOutcome, state::AppState};

/// Background task that drives finish detection and publishes snapshots
pub async fn countdown_tick_task(state: Arc<AppState>) {
    info!("Starting countdown tick task every {:?}", state.tick_interval);

    let mut ticker = interval(state.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match state.tick() {
            Ok((TickOutcome::Finished, snapshot)) => {
                info!("Countdown of {}s reached zero",
                      snapshot.duration_seconds.unwrap_or_default());
            }
            Ok((TickOutcome::NoChange, snapshot)) => {
                debug!("Tick: {} {}", snapshot.state, snapshot.time_formatted);
            }
            Err(e) => {
                error!("Failed to tick countdown: {}", e);
                // Poisoned lock will not recover
                break;
            }
        }
    }
}
