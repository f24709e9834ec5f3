//! Host checks for external programs

use std::io::ErrorKind;
use tokio::process::Command;
use tracing::info;

/// Check that an external program can be launched
pub async fn check_program_available(program: &str) -> Result<(), String> {
    match Command::new(program).arg("--version").output().await {
        Ok(_) => {
            info!("{} is available", program);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(format!("{} was not found. Install it or drop --alert-command.", program))
        }
        Err(e) => Err(format!("Failed to launch {}: {}", program, e)),
    }
}
