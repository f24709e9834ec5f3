//! Countdown Timer - a countdown core with a state-managed HTTP surface
//! 
//! This is the main entry point for the countdown-timer server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use countdown_timer::{
    api::create_router,
    config::Config,
    countdown::{AlertSink, Clock, CountdownTimer, LogAlert, SystemClock},
    services::{check_program_available, CommandAlert},
    state::{AppState, CommandOutcome},
    tasks::countdown_tick_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms",
          config.host, config.port, config.tick_ms);

    // Pick the alert sink; a configured player must be launchable
    let player = config
        .alert_command
        .as_deref()
        .and_then(CommandAlert::from_command_line);
    let alert: Box<dyn AlertSink> = match player {
        Some(player) => {
            if let Err(e) = check_program_available(player.program()).await {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
            info!("Alert player: {}", player.program());
            Box::new(player)
        }
        None => {
            info!("No alert player configured, alerts are logged only");
            Box::new(LogAlert)
        }
    };

    // Create application state
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let timer = CountdownTimer::with_parts(clock, alert);
    let state = Arc::new(AppState::with_timer(
        timer,
        config.port,
        config.host.clone(),
        config.tick_interval(),
    ));

    if let Some(seconds) = config.start {
        match state.start(seconds) {
            Ok(CommandOutcome::Applied(snapshot)) => {
                info!("Boot countdown started: {}", snapshot.time_formatted);
            }
            Ok(CommandOutcome::Rejected { reason, .. }) => {
                warn!("Boot countdown ignored: {}", reason);
            }
            Err(e) => warn!("Boot countdown failed: {}", e),
        }
    }

    // Start the countdown tick background task
    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_tick_task(tick_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start      - Start a countdown (duration \"M:SS\" or minutes/seconds)");
    info!("  POST /timer/pause      - Pause the running countdown");
    info!("  POST /timer/resume     - Resume a paused countdown");
    info!("  POST /timer/cancel     - Discard the countdown");
    info!("  POST /timer/stop-sound - Silence the finish alert");
    info!("  GET  /status           - Current snapshot and server info");
    info!("  GET  /events           - Snapshot stream (server-sent events)");
    info!("  GET  /health           - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            match signal {
                Ok(signal) => info!("Shutdown signal {} received", signal),
                Err(e) => tracing::error!("Signal handling failed: {}", e),
            }
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
