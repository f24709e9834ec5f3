//! Countdown state machine

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{format_clock, AlertSink, Clock, Command, LogAlert, SystemClock, TransitionError};

/// Lifecycle state of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
    Paused,
    Finished,
}

impl TimerState {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerState::Stopped => "stopped",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Finished => "finished",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    NoChange,
    /// This tick moved the countdown from running to finished
    Finished,
}

/// One countdown from `start` until it is discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownSession {
    duration_seconds: u64,
    start_instant: Option<Instant>,
    accumulated: Duration,
}

impl CountdownSession {
    fn begin(duration_seconds: u64, now: Instant) -> Self {
        Self {
            duration_seconds,
            start_instant: Some(now),
            accumulated: Duration::ZERO,
        }
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    /// Instant the current running period began, `None` unless running
    pub fn start_instant(&self) -> Option<Instant> {
        self.start_instant
    }

    /// Running time banked by earlier pauses
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Running time up to `now`, never more than the duration
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        let current = self
            .start_instant
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or(Duration::ZERO);
        self.accumulated
            .saturating_add(current)
            .min(self.duration())
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.duration().saturating_sub(self.elapsed_at(now))
    }

    fn freeze(&mut self, now: Instant) {
        self.accumulated = self.elapsed_at(now);
        self.start_instant = None;
    }
}

/// Every observable output captured at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub remaining_seconds: u64,
    pub duration_seconds: Option<u64>,
    pub progress: f64,
    pub time_formatted: String,
    pub has_finished: bool,
    pub alert_active: bool,
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self {
            state: TimerState::Stopped,
            remaining_seconds: 0,
            duration_seconds: None,
            progress: 0.0,
            time_formatted: format_clock(0),
            has_finished: false,
            alert_active: false,
        }
    }
}

/// Countdown timer core.
///
/// Commands are synchronous and never fail loudly: a command that does not
/// apply to the current state returns a [`TransitionError`] and leaves the
/// timer untouched. Derived outputs are recomputed from the clock on every
/// read. Call [`CountdownTimer::tick`] periodically so the running to
/// finished transition (and its alert) happens on time.
pub struct CountdownTimer {
    clock: Arc<dyn Clock>,
    alert: Box<dyn AlertSink>,
    state: TimerState,
    session: Option<CountdownSession>,
    alert_active: bool,
}

impl CountdownTimer {
    /// Timer on the system clock that only logs its alerts
    pub fn new() -> Self {
        Self::with_parts(Arc::new(SystemClock), Box::new(LogAlert))
    }

    pub fn with_parts(clock: Arc<dyn Clock>, alert: Box<dyn AlertSink>) -> Self {
        Self {
            clock,
            alert,
            state: TimerState::Stopped,
            session: None,
            alert_active: false,
        }
    }

    pub fn start(&mut self, duration_seconds: u64) -> Result<TimerState, TransitionError> {
        let now = self.clock.now();
        self.refresh(now);

        if !matches!(self.state, TimerState::Stopped | TimerState::Finished) {
            return self.reject(Command::Start);
        }
        if duration_seconds == 0 {
            debug!("Ignoring start: zero duration");
            return Err(TransitionError::ZeroDuration);
        }

        self.silence();
        self.session = Some(CountdownSession::begin(duration_seconds, now));
        self.state = TimerState::Running;
        info!("Countdown started for {}", format_clock(duration_seconds));
        Ok(self.state)
    }

    pub fn pause(&mut self) -> Result<TimerState, TransitionError> {
        let now = self.clock.now();
        self.refresh(now);

        match (self.state, self.session.as_mut()) {
            (TimerState::Running, Some(session)) => {
                session.freeze(now);
                self.state = TimerState::Paused;
                info!("Countdown paused with {} left", self.time_formatted());
                Ok(self.state)
            }
            _ => self.reject(Command::Pause),
        }
    }

    pub fn resume(&mut self) -> Result<TimerState, TransitionError> {
        let now = self.clock.now();

        match (self.state, self.session.as_mut()) {
            (TimerState::Paused, Some(session)) => {
                session.start_instant = Some(now);
                self.state = TimerState::Running;
                info!("Countdown resumed with {} left", self.time_formatted());
                Ok(self.state)
            }
            _ => self.reject(Command::Resume),
        }
    }

    pub fn cancel(&mut self) -> Result<TimerState, TransitionError> {
        let now = self.clock.now();
        self.refresh(now);

        if self.state == TimerState::Stopped {
            return self.reject(Command::Cancel);
        }

        self.silence();
        self.session = None;
        self.state = TimerState::Stopped;
        info!("Countdown cancelled");
        Ok(self.state)
    }

    pub fn stop_sound(&mut self) -> Result<TimerState, TransitionError> {
        if !self.alert_active {
            debug!("Ignoring stop-sound: no alert sounding");
            return Err(TransitionError::AlertNotSounding);
        }
        self.silence();
        Ok(self.state)
    }

    /// Re-evaluate the countdown and finish it if time is up
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now();
        self.refresh(now)
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn session(&self) -> Option<&CountdownSession> {
        self.session.as_ref()
    }

    /// Time left right now; zero when there is no session
    pub fn remaining(&self) -> Duration {
        self.remaining_at(self.clock.now())
    }

    /// Time left rounded up to whole seconds, so zero means time is up
    pub fn remaining_seconds(&self) -> u64 {
        ceil_secs(self.remaining())
    }

    /// Fraction of the duration still remaining, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.progress_at(self.clock.now())
    }

    pub fn time_formatted(&self) -> String {
        format_clock(self.remaining_seconds())
    }

    pub fn has_finished(&self) -> bool {
        self.state == TimerState::Finished
    }

    /// Whether the finish alert is sounding and awaiting acknowledgement
    pub fn alert_active(&self) -> bool {
        self.alert_active
    }

    /// All outputs, read against a single instant
    pub fn snapshot(&self) -> TimerSnapshot {
        let now = self.clock.now();
        let remaining_seconds = ceil_secs(self.remaining_at(now));
        TimerSnapshot {
            state: self.state,
            remaining_seconds,
            duration_seconds: self.session.as_ref().map(CountdownSession::duration_seconds),
            progress: self.progress_at(now),
            time_formatted: format_clock(remaining_seconds),
            has_finished: self.has_finished(),
            alert_active: self.alert_active,
        }
    }

    fn remaining_at(&self, now: Instant) -> Duration {
        self.session
            .as_ref()
            .map(|session| session.remaining_at(now))
            .unwrap_or(Duration::ZERO)
    }

    fn progress_at(&self, now: Instant) -> f64 {
        match &self.session {
            Some(session) if session.duration_seconds > 0 => {
                let remaining = session.remaining_at(now);
                (remaining.as_secs_f64() / session.duration().as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    fn refresh(&mut self, now: Instant) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::NoChange;
        }
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::NoChange;
        };
        if !session.remaining_at(now).is_zero() {
            return TickOutcome::NoChange;
        }

        session.freeze(now);
        self.state = TimerState::Finished;
        self.alert_active = true;
        info!("Countdown of {} finished", format_clock(session.duration_seconds));
        self.alert.start_alert();
        TickOutcome::Finished
    }

    fn silence(&mut self) {
        if self.alert_active {
            self.alert_active = false;
            self.alert.stop_alert();
        }
    }

    fn reject(&self, command: Command) -> Result<TimerState, TransitionError> {
        debug!("Ignoring {} while {}", command, self.state);
        Err(TransitionError::InvalidTransition {
            command,
            state: self.state,
        })
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let whole = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        whole + 1
    } else {
        whole
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("alert_active", &self.alert_active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::ManualClock;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[derive(Clone, Default)]
    struct AlertCounter {
        started: Arc<AtomicUsize>,
        stopped: Arc<AtomicUsize>,
    }

    impl AlertCounter {
        fn started(&self) -> usize {
            self.started.load(Ordering::SeqCst)
        }

        fn stopped(&self) -> usize {
            self.stopped.load(Ordering::SeqCst)
        }
    }

    impl AlertSink for AlertCounter {
        fn start_alert(&mut self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn stop_alert(&mut self) {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn timer() -> (CountdownTimer, ManualClock, AlertCounter) {
        let clock = ManualClock::new();
        let alerts = AlertCounter::default();
        let timer = CountdownTimer::with_parts(Arc::new(clock.clone()), Box::new(alerts.clone()));
        (timer, clock, alerts)
    }

    fn finished_timer() -> (CountdownTimer, ManualClock, AlertCounter) {
        let (mut timer, clock, alerts) = timer();
        timer.start(2).expect("start");
        clock.advance_secs(2);
        assert_eq!(timer.tick(), TickOutcome::Finished);
        (timer, clock, alerts)
    }

    #[test]
    fn starts_stopped() {
        let (timer, _, _) = timer();
        assert_eq!(timer.state(), TimerState::Stopped);
        assert!(timer.session().is_none());
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(timer.progress(), 0.0);
        assert_eq!(timer.time_formatted(), "0:00");
        assert_eq!(timer.snapshot(), TimerSnapshot::default());
    }

    #[test]
    fn start_reports_full_duration() {
        for duration in [1, 5, 59, 60, 3600] {
            let (mut timer, _, _) = timer();
            assert_eq!(timer.start(duration), Ok(TimerState::Running));
            assert_eq!(timer.remaining_seconds(), duration);
            assert_eq!(timer.progress(), 1.0);
            assert!(timer.session().and_then(|s| s.start_instant()).is_some());
        }
    }

    #[test]
    fn start_rejects_zero_duration() {
        let (mut timer, _, _) = timer();
        assert_eq!(timer.start(0), Err(TransitionError::ZeroDuration));
        assert_eq!(timer.state(), TimerState::Stopped);
        assert!(timer.session().is_none());
    }

    #[test]
    fn start_while_running_is_ignored() {
        let (mut timer, clock, _) = timer();
        timer.start(10).expect("start");
        clock.advance_secs(4);

        assert_eq!(
            timer.start(30),
            Err(TransitionError::InvalidTransition {
                command: Command::Start,
                state: TimerState::Running,
            })
        );
        assert_eq!(timer.remaining_seconds(), 6);
        assert_eq!(timer.session().map(|s| s.duration_seconds()), Some(10));
    }

    #[test]
    fn partial_seconds_round_up() {
        let (mut timer, clock, _) = timer();
        timer.start(5).expect("start");
        clock.advance_millis(100);
        assert_eq!(timer.remaining_seconds(), 5);
        assert_eq!(timer.time_formatted(), "0:05");
        clock.advance_millis(900);
        assert_eq!(timer.remaining_seconds(), 4);
        clock.advance_millis(3999);
        assert_eq!(timer.remaining_seconds(), 1);
        assert_eq!(timer.tick(), TickOutcome::NoChange);
    }

    #[test]
    fn paused_time_does_not_count() {
        let (mut timer, clock, _) = timer();
        timer.start(100).expect("start");

        let mut ran = 0;
        for cycle in 1..=5 {
            clock.advance_secs(cycle);
            ran += cycle;
            timer.pause().expect("pause");
            clock.advance_secs(50);
            assert_eq!(timer.remaining_seconds(), 100 - ran);
            timer.resume().expect("resume");
        }

        assert_eq!(timer.remaining_seconds(), 100 - ran);
        assert_eq!(timer.session().map(|s| s.accumulated()), Some(Duration::from_secs(ran)));
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let (mut timer, clock, _) = timer();
        timer.start(10).expect("start");
        clock.advance_secs(3);

        assert_eq!(
            timer.resume(),
            Err(TransitionError::InvalidTransition {
                command: Command::Resume,
                state: TimerState::Running,
            })
        );
        assert_eq!(timer.state(), TimerState::Running);

        timer.pause().expect("pause");
        let frozen = timer.snapshot();
        assert!(timer.pause().is_err());
        clock.advance_secs(20);
        assert_eq!(timer.snapshot(), frozen);
        assert_eq!(timer.state(), TimerState::Paused);
        assert!(timer.session().and_then(|s| s.start_instant()).is_none());
    }

    #[test]
    fn commands_from_stopped_are_ignored() {
        let (mut timer, _, alerts) = timer();
        assert!(timer.pause().is_err());
        assert!(timer.resume().is_err());
        assert!(timer.cancel().is_err());
        assert_eq!(timer.stop_sound(), Err(TransitionError::AlertNotSounding));
        assert_eq!(timer.state(), TimerState::Stopped);
        assert_eq!(alerts.stopped(), 0);
    }

    #[test]
    fn remaining_and_progress_never_increase_while_running() {
        let (mut timer, clock, _) = timer();
        timer.start(7).expect("start");

        let mut last_seconds = timer.remaining_seconds();
        let mut last_progress = timer.progress();
        for _ in 0..100 {
            clock.advance_millis(90);
            timer.tick();
            let seconds = timer.remaining_seconds();
            let progress = timer.progress();
            assert!(seconds <= last_seconds);
            assert!(progress <= last_progress);
            assert!((0.0..=1.0).contains(&progress));
            last_seconds = seconds;
            last_progress = progress;
        }
    }

    #[test]
    fn finishes_once_time_is_up() {
        let (mut timer, clock, alerts) = timer();
        timer.start(3).expect("start");
        clock.advance_secs(2);
        assert_eq!(timer.tick(), TickOutcome::NoChange);
        assert_eq!(alerts.started(), 0);

        clock.advance_secs(5);
        assert_eq!(timer.tick(), TickOutcome::Finished);
        assert_eq!(timer.state(), TimerState::Finished);
        assert!(timer.has_finished());
        assert!(timer.alert_active());
        assert_eq!(alerts.started(), 1);

        clock.advance_secs(1000);
        assert_eq!(timer.tick(), TickOutcome::NoChange);
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(timer.progress(), 0.0);
        assert_eq!(timer.time_formatted(), "0:00");
        assert_eq!(alerts.started(), 1);
        assert!(timer.session().and_then(|s| s.start_instant()).is_none());
    }

    #[test]
    fn command_after_deadline_sees_finished() {
        let (mut timer, clock, alerts) = timer();
        timer.start(3).expect("start");
        clock.advance_secs(4);

        assert_eq!(
            timer.pause(),
            Err(TransitionError::InvalidTransition {
                command: Command::Pause,
                state: TimerState::Finished,
            })
        );
        assert_eq!(timer.state(), TimerState::Finished);
        assert_eq!(alerts.started(), 1);
    }

    #[test]
    fn paused_timer_never_finishes() {
        let (mut timer, clock, _) = timer();
        timer.start(3).expect("start");
        clock.advance_secs(1);
        timer.pause().expect("pause");
        clock.advance_secs(60);
        assert_eq!(timer.tick(), TickOutcome::NoChange);
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.remaining_seconds(), 2);
    }

    #[test]
    fn cancel_discards_session_from_any_active_state() {
        let (mut running, _, _) = timer();
        running.start(10).expect("start");
        assert_eq!(running.cancel(), Ok(TimerState::Stopped));
        assert!(running.session().is_none());
        assert_eq!(running.remaining_seconds(), 0);

        let (mut paused, _, _) = timer();
        paused.start(10).expect("start");
        paused.pause().expect("pause");
        assert_eq!(paused.cancel(), Ok(TimerState::Stopped));
        assert!(paused.session().is_none());

        let (mut finished, _, alerts) = finished_timer();
        assert_eq!(finished.cancel(), Ok(TimerState::Stopped));
        assert!(finished.session().is_none());
        assert!(!finished.alert_active());
        assert_eq!(alerts.stopped(), 1);
    }

    #[test]
    fn stop_sound_clears_alert_only() {
        let (mut timer, _, alerts) = finished_timer();

        assert_eq!(timer.stop_sound(), Ok(TimerState::Finished));
        assert!(!timer.alert_active());
        assert!(timer.has_finished());
        assert_eq!(alerts.stopped(), 1);

        assert_eq!(timer.stop_sound(), Err(TransitionError::AlertNotSounding));
        assert_eq!(timer.state(), TimerState::Finished);
        assert_eq!(alerts.stopped(), 1);
    }

    #[test]
    fn restart_from_finished_silences_alert() {
        let (mut timer, _, alerts) = finished_timer();

        assert_eq!(timer.start(8), Ok(TimerState::Running));
        assert!(!timer.alert_active());
        assert_eq!(alerts.stopped(), 1);
        assert_eq!(timer.remaining_seconds(), 8);
        assert_eq!(timer.progress(), 1.0);
    }

    #[test]
    fn five_second_scenario() {
        let (mut timer, clock, alerts) = timer();
        timer.start(5).expect("start");

        clock.advance_secs(3);
        timer.tick();
        assert_eq!(timer.remaining_seconds(), 2);
        assert!((timer.progress() - 0.4).abs() < 1e-9);

        timer.pause().expect("pause");
        clock.advance_secs(10);
        timer.tick();
        assert_eq!(timer.remaining_seconds(), 2);
        assert_eq!(timer.time_formatted(), "0:02");

        timer.resume().expect("resume");
        clock.advance_secs(2);
        assert_eq!(timer.tick(), TickOutcome::Finished);
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(timer.state(), TimerState::Finished);
        assert!(timer.has_finished());
        assert_eq!(alerts.started(), 1);
    }

    /// Moves forward by a fixed step every time it is read
    struct SteppingClock {
        origin: Instant,
        step: Duration,
        reads: std::sync::atomic::AtomicU32,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> Instant {
            let reads = self.reads.fetch_add(1, Ordering::SeqCst);
            self.origin + self.step * reads
        }
    }

    #[test]
    fn snapshot_reads_clock_once() {
        let clock = Arc::new(SteppingClock {
            origin: Instant::now(),
            step: Duration::from_millis(600),
            reads: std::sync::atomic::AtomicU32::new(0),
        });
        let mut timer = CountdownTimer::with_parts(clock, Box::new(LogAlert));
        timer.start(1).expect("start");

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.remaining_seconds, 1);
        assert!((snapshot.progress - 0.4).abs() < 1e-9);
        assert_eq!(snapshot.time_formatted, "0:01");
    }

    #[test]
    fn snapshot_collects_outputs() {
        let (mut timer, clock, _) = timer();
        timer.start(90).expect("start");
        clock.advance_secs(45);

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.state, TimerState::Running);
        assert_eq!(snapshot.remaining_seconds, 45);
        assert_eq!(snapshot.duration_seconds, Some(90));
        assert!((snapshot.progress - 0.5).abs() < 1e-9);
        assert_eq!(snapshot.time_formatted, "0:45");
        assert!(!snapshot.has_finished);
        assert!(!snapshot.alert_active);
    }

    #[test]
    fn transition_errors_read_naturally() {
        let err = TransitionError::InvalidTransition {
            command: Command::StopSound,
            state: TimerState::Paused,
        };
        assert_eq!(err.to_string(), "cannot stop-sound while paused");
    }
}
