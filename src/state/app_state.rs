//! Shared application state wrapping the countdown core

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::info;

use crate::countdown::{CountdownTimer, TickOutcome, TimerSnapshot, TimerState, TransitionError};

/// Shortest tick interval the tick task will run at
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// What happened to a command sent to the countdown
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Applied(TimerSnapshot),
    Rejected {
        reason: TransitionError,
        snapshot: TimerSnapshot,
    },
}

impl CommandOutcome {
    pub fn snapshot(&self) -> &TimerSnapshot {
        match self {
            CommandOutcome::Applied(snapshot) => snapshot,
            CommandOutcome::Rejected { snapshot, .. } => snapshot,
        }
    }
}

/// Main application state: the one countdown plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// The countdown core, shared by handlers and the tick task
    pub timer: Arc<Mutex<CountdownTimer>>,
    pub tick_interval: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last applied command
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Latest snapshot for stream consumers
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Create a new AppState around a system-clock timer
    pub fn new(port: u16, host: String, tick_interval: Duration) -> Self {
        Self::with_timer(CountdownTimer::new(), port, host, tick_interval)
    }

    /// Create a new AppState around an existing timer.
    ///
    /// `tick_interval` is raised to [`MIN_TICK_INTERVAL`] if shorter.
    pub fn with_timer(
        timer: CountdownTimer,
        port: u16,
        host: String,
        tick_interval: Duration,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(timer.snapshot());

        Self {
            timer: Arc::new(Mutex::new(timer)),
            tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Run a command against the timer and publish the resulting snapshot
    pub fn run_command<F>(&self, action: &str, command: F) -> Result<CommandOutcome, String>
    where
        F: FnOnce(&mut CountdownTimer) -> Result<TimerState, TransitionError>,
    {
        let mut timer = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer: {}", e))?;

        let result = command(&mut *timer);
        let snapshot = timer.snapshot();
        drop(timer); // Release the lock early

        self.publish(snapshot.clone());

        match result {
            Ok(state) => {
                info!("Command {} applied, timer is {}", action, state);
                self.record_action(action);
                Ok(CommandOutcome::Applied(snapshot))
            }
            Err(reason) => Ok(CommandOutcome::Rejected { reason, snapshot }),
        }
    }

    pub fn start(&self, duration_seconds: u64) -> Result<CommandOutcome, String> {
        self.run_command("start", |timer| timer.start(duration_seconds))
    }

    pub fn pause(&self) -> Result<CommandOutcome, String> {
        self.run_command("pause", CountdownTimer::pause)
    }

    pub fn resume(&self) -> Result<CommandOutcome, String> {
        self.run_command("resume", CountdownTimer::resume)
    }

    pub fn cancel(&self) -> Result<CommandOutcome, String> {
        self.run_command("cancel", CountdownTimer::cancel)
    }

    pub fn stop_sound(&self) -> Result<CommandOutcome, String> {
        self.run_command("stop-sound", CountdownTimer::stop_sound)
    }

    /// Advance the countdown and publish the fresh snapshot
    pub fn tick(&self) -> Result<(TickOutcome, TimerSnapshot), String> {
        let mut timer = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer: {}", e))?;

        let outcome = timer.tick();
        let snapshot = timer.snapshot();
        drop(timer);

        self.publish(snapshot.clone());
        Ok((outcome, snapshot))
    }

    /// Get the current snapshot, finishing the countdown first if time is up
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.tick().map(|(_, snapshot)| snapshot)
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Only wakes subscribers when something observable changed
    fn publish(&self, snapshot: TimerSnapshot) {
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
