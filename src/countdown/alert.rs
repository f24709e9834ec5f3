//! Finish alert signalling

use tracing::info;

/// Receiver of the two audio signals the countdown emits
pub trait AlertSink: Send {
    /// The countdown reached zero; begin sounding the alert
    fn start_alert(&mut self);

    /// The alert was acknowledged or the session discarded
    fn stop_alert(&mut self);
}

impl<T: AlertSink + ?Sized> AlertSink for Box<T> {
    fn start_alert(&mut self) {
        (**self).start_alert();
    }

    fn stop_alert(&mut self) {
        (**self).stop_alert();
    }
}

/// Alert sink that only writes the signals to the log
#[derive(Debug, Default)]
pub struct LogAlert;

impl AlertSink for LogAlert {
    fn start_alert(&mut self) {
        info!("Countdown finished, alert sounding");
    }

    fn stop_alert(&mut self) {
        info!("Alert silenced");
    }
}
