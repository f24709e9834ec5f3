//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod countdown_ticker;

// Re-export main functions
pub use countdown_ticker::countdown_tick_task;
