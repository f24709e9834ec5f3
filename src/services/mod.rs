//! External service module
//! 
//! This module contains the pieces that reach outside the process: the alert
//! player and host program checks.

pub mod alert_player;
pub mod system;

// Re-export main items
pub use alert_player::CommandAlert;
pub use system::check_program_available;
