//! Application update controller.
//!
//! Drives the check → prompt → download → install flow and decides when the
//! update popup is visible.
//!
//! ## State machine
//!
//! ```text
//! Idle ──check──▶ Checking ──▶ Available ──accept──▶ Downloading(n) ──▶ Installing
//!  ▲                  │            │                        │                │
//!  │                  ├──▶ UpToDate│decline                 └──────┬─────────┘
//!  │                  └──▶ Error   ▼                               ▼
//!  └──────────────── close ◀───── Idle                           Error
//! ```
//!
//! ## Visibility
//!
//! - A **startup** check stays hidden unless an update is available.
//! - A **manual** check shows every outcome. An up-to-date result is shown
//!   for a short window and then hidden.
//! - The popup cannot be dismissed while downloading or installing.
//!
//! ## Progress
//!
//! The download is awaited as one call. While it runs, a simulated signal
//! advances the bar on an interval; both feed a [`DownloadProgress`] so the
//! percent never decreases and only the real completion reaches 100.

use crate::api::{with_timeout, Backend, BackendError, Reply, UpdateCheckReply};
use crate::libs::config::UpdateConfig;
use crate::libs::messages::Message;
use crate::libs::progress::{DownloadProgress, ProgressSignal};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UpdateStatus {
    #[default]
    Idle,
    Checking,
    UpToDate,
    Available,
    /// Download progress in percent.
    Downloading(u8),
    Installing,
    Error(String),
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStatus::Idle => write!(f, "idle"),
            UpdateStatus::Checking => write!(f, "checking"),
            UpdateStatus::UpToDate => write!(f, "up to date"),
            UpdateStatus::Available => write!(f, "available"),
            UpdateStatus::Downloading(percent) => write!(f, "downloading ({}%)", percent),
            UpdateStatus::Installing => write!(f, "installing"),
            UpdateStatus::Error(message) => write!(f, "failed: {}", message),
        }
    }
}

/// Who asked for the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
    /// Automatic check after launch. Only an available update is shown.
    #[default]
    Startup,
    /// Explicit user request. Every outcome is shown.
    Manual,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("Cannot {action} while update is {from}")]
    InvalidTransition { from: UpdateStatus, action: &'static str },

    #[error("The update window cannot be closed while the update is {0}")]
    DismissRefused(UpdateStatus),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// What the update popup renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateView {
    pub status: UpdateStatus,
    /// Whether the popup should be on screen.
    pub visible: bool,
    pub mode: CheckMode,
    /// Result of the last successful check.
    pub check: Option<UpdateCheckReply>,
    epoch: u64,
}

impl UpdateView {
    pub fn percent(&self) -> Option<u8> {
        match self.status {
            UpdateStatus::Downloading(percent) => Some(percent),
            UpdateStatus::Installing => Some(100),
            _ => None,
        }
    }

    pub fn is_dismissable(&self) -> bool {
        !matches!(self.status, UpdateStatus::Downloading(_) | UpdateStatus::Installing)
    }
}

pub struct UpdateController<B: Backend> {
    backend: Arc<B>,
    config: UpdateConfig,
    state: Arc<watch::Sender<UpdateView>>,
    window: Mutex<Option<JoinHandle<()>>>,
}

impl<B: Backend> UpdateController<B> {
    pub fn new(backend: Arc<B>, config: UpdateConfig) -> Self {
        let (state, _) = watch::channel(UpdateView::default());
        Self {
            backend,
            config,
            state: Arc::new(state),
            window: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UpdateView> {
        self.state.subscribe()
    }

    pub fn view(&self) -> UpdateView {
        self.state.borrow().clone()
    }

    /// Waits the startup delay, then runs a startup-mode check.
    pub async fn check_on_startup(&self) {
        time::sleep(self.config.startup_delay()).await;
        if let Err(error) = self.check(CheckMode::Startup).await {
            debug!(%error, "startup update check failed");
        }
    }

    /// Asks the backend whether a newer release exists.
    ///
    /// Allowed from `Idle` and `UpToDate` only. Returns the resulting status.
    pub async fn check(&self, mode: CheckMode) -> Result<UpdateStatus, UpdateError> {
        self.transition("check", |v| match v.status {
            UpdateStatus::Idle | UpdateStatus::UpToDate => {
                v.epoch += 1;
                v.status = UpdateStatus::Checking;
                v.mode = mode;
                v.visible = mode == CheckMode::Manual;
                v.check = None;
                true
            }
            _ => false,
        })?;
        self.cancel_window();
        let epoch = self.state.borrow().epoch;

        info!(?mode, "checking for updates");
        let result = with_timeout(self.config.request_timeout(), self.backend.check_for_updates())
            .await
            .and_then(|reply| reply.into_result(Message::UpdateCheckFailed));

        match result {
            Ok(reply) if reply.update_available => {
                info!(latest = %reply.latest_version, "update available");
                self.state.send_modify(|v| {
                    v.status = UpdateStatus::Available;
                    v.visible = true;
                    v.check = Some(reply);
                });
                Ok(UpdateStatus::Available)
            }
            Ok(reply) => {
                debug!(current = %reply.current_version, "already up to date");
                self.state.send_modify(|v| {
                    v.status = UpdateStatus::UpToDate;
                    v.check = Some(reply);
                });
                self.spawn_window(epoch);
                Ok(UpdateStatus::UpToDate)
            }
            Err(error) => {
                warn!(%error, "update check failed");
                let message = error.to_string();
                self.state.send_modify(|v| {
                    v.status = UpdateStatus::Error(message);
                    v.visible = v.mode == CheckMode::Manual;
                });
                Err(error.into())
            }
        }
    }

    /// Downloads and installs the available release.
    ///
    /// On success the controller stays in `Installing`; the installer is
    /// expected to restart the application.
    pub async fn accept(&self) -> Result<(), UpdateError> {
        self.transition("accept", |v| match v.status {
            UpdateStatus::Available => {
                v.epoch += 1;
                v.status = UpdateStatus::Downloading(0);
                v.visible = true;
                true
            }
            _ => false,
        })?;
        self.cancel_window();

        let url = self.state.borrow().check.as_ref().and_then(|check| check.download_url.clone());
        let Some(url) = url.filter(|url| !url.is_empty()) else {
            return self.fail(BackendError::Rejected(Message::UpdateDownloadUrlNotSet.to_string()));
        };

        info!(%url, "downloading update");
        let mut progress = DownloadProgress::new(self.config.progress_settings());
        let download = with_timeout(self.config.download_timeout(), self.backend.download_update(&url));
        tokio::pin!(download);

        let period = self.config.progress_interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);

        let result = loop {
            tokio::select! {
                biased;
                result = &mut download => break result,
                _ = ticker.tick() => {
                    let percent = progress.apply(ProgressSignal::Simulated);
                    self.publish_progress(percent);
                }
            }
        };

        let reply = match result.and_then(|reply| reply.into_result(Message::UpdateDownloadFailed)) {
            Ok(reply) => reply,
            Err(error) => return self.fail(error),
        };
        let Some(file_path) = reply.file_path else {
            return self.fail(BackendError::Rejected(Message::UpdateFileMissingInReply.to_string()));
        };

        self.publish_progress(progress.apply(ProgressSignal::Completed));
        time::sleep(self.config.completion_hold()).await;
        self.state.send_modify(|v| v.status = UpdateStatus::Installing);

        info!(path = %file_path.display(), "installing update");
        match with_timeout(self.config.request_timeout(), self.backend.install_update(&file_path))
            .await
            .and_then(|reply| reply.into_result(Message::UpdateInstallFailed))
        {
            Ok(_) => Ok(()),
            Err(error) => self.fail(error),
        }
    }

    /// Dismisses an available update without installing it.
    pub fn decline(&self) -> Result<(), UpdateError> {
        self.transition("decline", |v| match v.status {
            UpdateStatus::Available => {
                reset(v);
                true
            }
            _ => false,
        })
    }

    /// Closes the popup.
    ///
    /// Refused while downloading or installing. A check still in flight
    /// continues in startup mode, so only an available update reappears.
    pub fn close(&self) -> Result<(), UpdateError> {
        let mut refused = None;
        self.state.send_if_modified(|v| match v.status {
            UpdateStatus::Downloading(_) | UpdateStatus::Installing => {
                refused = Some(v.status.clone());
                false
            }
            UpdateStatus::Checking => {
                v.visible = false;
                v.mode = CheckMode::Startup;
                true
            }
            _ => {
                reset(v);
                true
            }
        });

        match refused {
            Some(status) => Err(UpdateError::DismissRefused(status)),
            None => {
                self.cancel_window();
                Ok(())
            }
        }
    }

    fn publish_progress(&self, percent: u8) {
        self.state.send_if_modified(|v| match v.status {
            UpdateStatus::Downloading(current) if percent > current => {
                v.status = UpdateStatus::Downloading(percent);
                true
            }
            _ => false,
        });
    }

    fn fail(&self, error: BackendError) -> Result<(), UpdateError> {
        warn!(%error, "update failed");
        let message = error.to_string();
        self.state.send_modify(|v| {
            v.status = UpdateStatus::Error(message);
            v.visible = true;
        });
        Err(error.into())
    }

    /// Applies `gate` atomically; `false` refuses the action from the current status.
    fn transition(&self, action: &'static str, gate: impl FnOnce(&mut UpdateView) -> bool) -> Result<(), UpdateError> {
        let mut from = None;
        self.state.send_if_modified(|v| {
            let before = v.status.clone();
            let accepted = gate(v);
            if !accepted {
                from = Some(before);
            }
            accepted
        });

        match from {
            Some(from) => Err(UpdateError::InvalidTransition { from, action }),
            None => Ok(()),
        }
    }

    /// Ends the up-to-date window: a startup check returns to `Idle`, a
    /// manual one is hidden but keeps its result until closed.
    fn spawn_window(&self, epoch: u64) {
        let state = Arc::clone(&self.state);
        let window = self.config.up_to_date_window();

        let handle = tokio::spawn(async move {
            time::sleep(window).await;
            state.send_if_modified(|v| {
                if v.epoch != epoch || v.status != UpdateStatus::UpToDate {
                    return false;
                }
                match v.mode {
                    CheckMode::Startup => reset(v),
                    CheckMode::Manual => v.visible = false,
                }
                true
            });
        });

        if let Some(previous) = self.window.lock().replace(handle) {
            previous.abort();
        }
    }

    fn cancel_window(&self) {
        if let Some(handle) = self.window.lock().take() {
            handle.abort();
        }
    }
}

impl<B: Backend> Drop for UpdateController<B> {
    fn drop(&mut self) {
        self.cancel_window();
    }
}

fn reset(view: &mut UpdateView) {
    view.epoch += 1;
    view.status = UpdateStatus::Idle;
    view.visible = false;
    view.check = None;
}
