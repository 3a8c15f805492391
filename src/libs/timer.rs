//! Session timer controller.
//!
//! Owns the on-screen elapsed-time counter and keeps it consistent with the
//! session held by the tracker.
//!
//! ## State machine
//!
//! ```text
//!            start ok                      stop ok
//!   Idle ──▶ Starting ──▶ Running ──▶ Stopping ──▶ Idle
//!    ▲          │ start failed            │ stop failed
//!    └──────────┘                         ▼
//!                                    Error(message) ── stop (retry) ──▶ Stopping
//! ```
//!
//! - While `Running`, a local one-second clock increments the counter. It is
//!   optimistic; the tracker stays the source of truth.
//! - A window refocus asks the tracker for the authoritative elapsed time and
//!   overwrites the local counter, even when the reply is smaller.
//! - Only one start or stop is in flight at a time. Intents that arrive while
//!   `Starting`/`Stopping` are refused without a backend call.
//! - `last_error` is advisory. It is shown next to the current phase and is
//!   cleared by the next successful start or stop.
//! - A failed stop halts the clock and enters `Error(message)` rather than
//!   claiming `Idle`: the tracker may still hold the session open.
//!
//! Every state change is published on a `tokio::sync::watch` channel so a
//! display can render snapshots without polling.

use crate::api::{with_timeout, Backend, BackendError, BundledStats, Reply, SessionUpdate, StatsReply};
use crate::libs::config::{TimerConfig, DEFAULT_NOTE};
use crate::libs::formatter::format_clock;
use crate::libs::input::InputKind;
use crate::libs::messages::Message;
use crate::libs::session::Session;
use crate::libs::stats::{Period, StatsBoard};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Starting,
    Running,
    Stopping,
    /// A stop failed; the clock is halted and the tracker state is unknown.
    Error(String),
}

/// Result of a manual sync that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Activity pushed (when running) and both stats periods refreshed.
    Synced,
    /// The session push failed; stats were left untouched.
    PushFailed,
}

/// Reasons an intent is refused or fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("{}", Message::TimerOperationPending)]
    Busy,

    #[error("{}", Message::SessionAlreadyRunning)]
    AlreadyRunning,

    #[error("{}", Message::SessionNotRunning)]
    NotRunning,

    #[error("{}", Message::SessionLocked)]
    SessionLocked,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// What the display renders.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub elapsed_seconds: u64,
    pub session: Option<Session>,
    /// Selected project; locked while a session is open.
    pub project: Option<String>,
    pub note: String,
    pub last_error: Option<String>,
    pub stats: StatsBoard,
    epoch: u64,
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self {
            phase: TimerPhase::Idle,
            elapsed_seconds: 0,
            session: None,
            project: None,
            note: DEFAULT_NOTE.to_string(),
            last_error: None,
            stats: StatsBoard::default(),
            epoch: 0,
        }
    }
}

impl TimerSnapshot {
    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// `true` whenever a session may be open. Logout and project changes
    /// are refused while locked.
    pub fn is_locked(&self) -> bool {
        self.phase != TimerPhase::Idle
    }

    /// The start/stop control is disabled while a request is in flight.
    pub fn controls_enabled(&self) -> bool {
        !matches!(self.phase, TimerPhase::Starting | TimerPhase::Stopping)
    }

    pub fn display_time(&self) -> String {
        format_clock(self.elapsed_seconds)
    }
}

pub struct TimerController<B: Backend> {
    backend: Arc<B>,
    config: TimerConfig,
    state: Arc<watch::Sender<TimerSnapshot>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl<B: Backend> TimerController<B> {
    pub fn new(backend: Arc<B>, config: TimerConfig) -> Self {
        let (state, _) = watch::channel(TimerSnapshot::default());
        Self {
            backend,
            config,
            state: Arc::new(state),
            ticker: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.state.borrow().clone()
    }

    /// Opens a session for `project`.
    ///
    /// On success the counter restarts at zero and the local clock begins.
    /// On failure the controller returns to `Idle` with `last_error` set; a
    /// retry is always allowed.
    pub async fn start(&self, project: &str, note: &str) -> Result<(), TimerError> {
        self.transition(|s| match s.phase {
            TimerPhase::Idle => {
                s.phase = TimerPhase::Starting;
                Ok(())
            }
            TimerPhase::Starting | TimerPhase::Stopping => Err(TimerError::Busy),
            TimerPhase::Running | TimerPhase::Error(_) => Err(TimerError::AlreadyRunning),
        })?;

        info!(project, "starting session");
        let result = with_timeout(self.config.request_timeout(), self.backend.start_session(project, note))
            .await
            .and_then(|reply| reply.into_result(Message::StartTimerFailed));

        match result {
            Ok(reply) => {
                let epoch = self.state.borrow().epoch + 1;
                let session = Session::new(project, note, reply.data);
                self.state.send_modify(|s| {
                    s.epoch = epoch;
                    s.phase = TimerPhase::Running;
                    s.elapsed_seconds = 0;
                    s.session = Some(session);
                    s.project = Some(project.to_string());
                    s.note = note.to_string();
                    s.last_error = None;
                    if let Some(bundled) = &reply.stats {
                        apply_bundled(&mut s.stats, bundled);
                    }
                });
                self.spawn_ticker(epoch);
                self.record_input(InputKind::Mouse);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "failed to start session");
                self.state.send_modify(|s| {
                    s.phase = TimerPhase::Idle;
                    s.last_error = Some(error.to_string());
                });
                Err(error.into())
            }
        }
    }

    /// Closes the running session.
    ///
    /// The clock halts as soon as the request is issued. The counter resets
    /// only once the tracker confirms the stop. When the stop reply carries
    /// no stats, both periods are fetched after it completes.
    pub async fn stop(&self) -> Result<(), TimerError> {
        self.transition(|s| match s.phase {
            TimerPhase::Running | TimerPhase::Error(_) => {
                s.phase = TimerPhase::Stopping;
                Ok(())
            }
            TimerPhase::Idle => Err(TimerError::NotRunning),
            TimerPhase::Starting | TimerPhase::Stopping => Err(TimerError::Busy),
        })?;
        self.cancel_ticker();

        let result = with_timeout(self.config.request_timeout(), self.backend.stop_session())
            .await
            .and_then(|reply| reply.into_result(Message::StopTimerFailed));

        match result {
            Ok(reply) => {
                let elapsed = self.state.borrow().elapsed_seconds;
                self.state.send_modify(|s| {
                    s.epoch += 1;
                    s.phase = TimerPhase::Idle;
                    s.elapsed_seconds = 0;
                    s.session = None;
                    s.last_error = None;
                    if let Some(bundled) = &reply.stats {
                        apply_bundled(&mut s.stats, bundled);
                    }
                });
                info!(elapsed, "session stopped");

                if reply.stats.is_none() {
                    if let Err(error) = self.refresh_stats().await {
                        warn!(%error, "failed to refresh stats after stop");
                    }
                }
                Ok(())
            }
            Err(error) => {
                warn!(%error, "failed to stop session");
                let message = error.to_string();
                self.state.send_modify(|s| {
                    s.phase = TimerPhase::Error(message.clone());
                    s.last_error = Some(message);
                });
                Err(error.into())
            }
        }
    }

    /// Reconciles the counter with the tracker after the window regains focus.
    ///
    /// Failures are logged only. A reply for a session that has since ended
    /// is discarded. If the tracker reports that no session is open, the
    /// session is closed locally.
    pub async fn on_window_focus(&self) {
        let (phase, epoch) = {
            let snapshot = self.state.borrow();
            (snapshot.phase.clone(), snapshot.epoch)
        };
        if !matches!(phase, TimerPhase::Running | TimerPhase::Error(_)) {
            return;
        }

        debug!("reconciling elapsed time");
        match with_timeout(self.config.request_timeout(), self.backend.current_session_elapsed()).await {
            Ok(reply) if reply.session_closed() => self.close_remotely(epoch).await,
            Ok(reply) if reply.success => {
                let elapsed = reply.elapsed_time;
                let applied = self.state.send_if_modified(|s| {
                    if s.epoch == epoch && s.phase == TimerPhase::Running {
                        s.elapsed_seconds = elapsed;
                        true
                    } else {
                        false
                    }
                });
                debug!(elapsed, applied, "reconciliation reply");
            }
            Ok(reply) => debug!(message = ?reply.message, "reconciliation rejected"),
            Err(error) => debug!(%error, "reconciliation failed"),
        }
    }

    /// Forwards one raw input event as a fire-and-forget activity ping.
    ///
    /// Ignored unless a session is running. The ping runs on its own task;
    /// its outcome never reaches the caller.
    pub fn record_input(&self, kind: InputKind) {
        if !self.state.borrow().is_running() {
            return;
        }

        let backend = Arc::clone(&self.backend);
        let timeout = self.config.request_timeout();
        tokio::spawn(async move {
            let result = match kind {
                InputKind::Keyboard => with_timeout(timeout, backend.record_keyboard_activity()).await,
                InputKind::Mouse => with_timeout(timeout, backend.record_mouse_activity()).await,
            };
            if let Err(error) = result {
                debug!(%error, ?kind, "activity ping failed");
            }
        });
    }

    /// Replaces the note. It reaches the tracker on the next session update.
    pub fn set_note(&self, note: &str) {
        self.state.send_modify(|s| {
            s.note = note.to_string();
            if let Some(session) = s.session.as_mut() {
                session.note = note.to_string();
            }
        });
    }

    /// Changes the selected project. Refused while a session is open.
    pub fn select_project(&self, label: &str) -> Result<(), TimerError> {
        self.transition(|s| {
            if s.is_locked() {
                Err(TimerError::SessionLocked)
            } else {
                s.project = Some(label.to_string());
                Ok(())
            }
        })
    }

    /// Ends the tracker login. Refused while a session is open.
    pub async fn logout(&self) -> Result<(), TimerError> {
        if self.state.borrow().is_locked() {
            return Err(TimerError::SessionLocked);
        }

        with_timeout(self.config.request_timeout(), self.backend.logout())
            .await?
            .into_result(Message::LogoutFailed)?;
        info!("logged out");
        Ok(())
    }

    /// Manual sync: pushes the running session's counters and note, then
    /// refreshes both stats periods.
    ///
    /// A failed push is logged and ends the sync without refreshing stats,
    /// so an active session is never interrupted. The outcome tells the two
    /// apart.
    pub async fn sync(&self) -> Result<SyncOutcome, BackendError> {
        let (running, note) = {
            let snapshot = self.state.borrow();
            (snapshot.is_running(), snapshot.note.clone())
        };

        if running {
            let timeout = self.config.request_timeout();
            let activity = match with_timeout(timeout, self.backend.activity_stats())
                .await
                .and_then(|reply| reply.into_result(Message::ActivityStatsFailed))
            {
                Ok(activity) => activity,
                Err(error) => {
                    warn!(%error, "failed to get activity stats");
                    return Ok(SyncOutcome::PushFailed);
                }
            };

            let update = SessionUpdate::from_activity(&activity, false, &note);
            if let Err(error) = with_timeout(timeout, self.backend.update_session(&update))
                .await
                .and_then(|reply| reply.into_result(Message::SessionUpdateFailed))
            {
                warn!(%error, "failed to push session update");
                return Ok(SyncOutcome::PushFailed);
            }
        }

        self.refresh_stats().await?;
        Ok(SyncOutcome::Synced)
    }

    /// Fetches daily, then weekly stats.
    ///
    /// Each successful fetch replaces its period. Both fetches are always
    /// attempted; the first failure is returned.
    pub async fn refresh_stats(&self) -> Result<(), BackendError> {
        let daily = self.fetch_period(Period::Daily).await;
        let weekly = self.fetch_period(Period::Weekly).await;
        daily.and(weekly)
    }

    /// Clears the advisory error message.
    pub fn dismiss_error(&self) {
        self.state.send_if_modified(|s| s.last_error.take().is_some());
    }

    async fn fetch_period(&self, period: Period) -> Result<(), BackendError> {
        let fallback = match period {
            Period::Daily => Message::DailyStatsFailed,
            Period::Weekly => Message::WeeklyStatsFailed,
        };
        let call = async {
            match period {
                Period::Daily => self.backend.daily_stats().await,
                Period::Weekly => self.backend.weekly_stats().await,
            }
        };

        let result = with_timeout(self.config.request_timeout(), call)
            .await
            .and_then(|reply| reply.into_result(fallback));
        match result {
            Ok(reply) => {
                if let Some(stats) = reply.accepted() {
                    self.state.send_modify(|s| s.stats.apply(period, stats));
                }
                Ok(())
            }
            Err(error) => {
                warn!(%error, %period, "failed to fetch stats");
                Err(error)
            }
        }
    }

    async fn close_remotely(&self, epoch: u64) {
        let closed = self.state.send_if_modified(|s| {
            if s.epoch == epoch && matches!(s.phase, TimerPhase::Running | TimerPhase::Error(_)) {
                s.epoch += 1;
                s.phase = TimerPhase::Idle;
                s.elapsed_seconds = 0;
                s.session = None;
                s.last_error = None;
                true
            } else {
                false
            }
        });

        if closed {
            self.cancel_ticker();
            info!("session closed by tracker");
            if let Err(error) = self.refresh_stats().await {
                warn!(%error, "failed to refresh stats after remote close");
            }
        }
    }

    /// Runs `gate` atomically against the current state. The state is
    /// published only when the gate accepts.
    fn transition(&self, gate: impl FnOnce(&mut TimerSnapshot) -> Result<(), TimerError>) -> Result<(), TimerError> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|s| {
            outcome = gate(s);
            outcome.is_ok()
        });
        outcome
    }

    fn spawn_ticker(&self, epoch: u64) {
        let state = Arc::clone(&self.state);
        let period = self.config.tick_interval();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let ticked = state.send_if_modified(|s| {
                    if s.epoch == epoch && s.phase == TimerPhase::Running {
                        s.elapsed_seconds += 1;
                        true
                    } else {
                        false
                    }
                });
                if !ticked {
                    break;
                }
            }
        });

        if let Some(previous) = self.ticker.lock().replace(handle) {
            previous.abort();
        }
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().take() {
            handle.abort();
        }
    }
}

impl<B: Backend> Drop for TimerController<B> {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

fn apply_bundled(stats: &mut StatsBoard, bundled: &BundledStats) {
    for (period, reply) in [(Period::Daily, &bundled.daily), (Period::Weekly, &bundled.weekly)] {
        if let Some(data) = reply.as_ref().and_then(StatsReply::accepted) {
            stats.apply(period, data);
        }
    }
}
