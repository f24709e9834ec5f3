//! External alert player driven by the countdown's alert signals

use tokio::{process::Command, runtime::Handle, sync::watch};
use tracing::{debug, info, warn};

use crate::countdown::AlertSink;

/// Plays the finish alert by running an external command in a loop
#[derive(Debug)]
pub struct CommandAlert {
    program: String,
    args: Vec<String>,
    stop_tx: Option<watch::Sender<bool>>,
}

impl CommandAlert {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            stop_tx: None,
        }
    }

    /// Build from a whitespace-separated command line, `None` if it is blank
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_playing(&self) -> bool {
        self.stop_tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }
}

impl AlertSink for CommandAlert {
    fn start_alert(&mut self) {
        self.stop_alert();

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Cannot play alert outside the runtime: {}", e);
                return;
            }
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        self.stop_tx = Some(stop_tx);

        let program = self.program.clone();
        let args = self.args.clone();
        handle.spawn(play_until_stopped(program, args, stop_rx));
    }

    fn stop_alert(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Receiver may already be gone if the player loop gave up
            let _ = stop_tx.send(true);
        }
    }
}

impl Drop for CommandAlert {
    fn drop(&mut self) {
        self.stop_alert();
    }
}

/// Re-run the player until a stop is signalled or the player fails
async fn play_until_stopped(
    program: String,
    args: Vec<String>,
    mut stop_rx: watch::Receiver<bool>,
) {
    info!("Alert player {} started", program);

    loop {
        let mut child = Command::new(&program);
        child.args(&args).kill_on_drop(true);

        tokio::select! {
            status = child.status() => {
                match status {
                    Ok(status) if status.success() => {
                        debug!("Alert player {} finished a loop", program);
                    }
                    Ok(status) => {
                        warn!("Alert player {} exited with {}, giving up", program, status);
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to run alert player {}: {}", program, e);
                        break;
                    }
                }
            }
            _ = stop_rx.changed() => {
                info!("Alert player {} stopped", program);
                break;
            }
        }
    }
}
