//! The Backend Service boundary.
//!
//! Every piece of durable state (sessions, activity counters, stats, update
//! artifacts) lives behind the [`Backend`] trait. Controllers only ever talk
//! to an injected implementation of it: [`HostBackend`] in production and a
//! scripted fake in tests.
//!
//! ## Failure model
//!
//! A call can fail in two independent ways and callers must handle both:
//!
//! - **Request failure**: the call itself did not complete (transport error,
//!   process error, timeout). Surfaces as [`BackendError::Request`] or
//!   [`BackendError::Timeout`].
//! - **Logical failure**: the call completed but the reply says
//!   `success = false`. [`Reply::into_result`] turns it into
//!   [`BackendError::Rejected`] carrying the server message.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tracklet::api::{with_timeout, Backend, Reply};
//! use tracklet::libs::messages::Message;
//!
//! async fn elapsed<B: Backend>(backend: &B) -> anyhow::Result<u64> {
//!     let reply = with_timeout(Duration::from_secs(30), backend.current_session_elapsed())
//!         .await?
//!         .into_result(Message::SessionTimeFailed)?;
//!     Ok(reply.elapsed_time)
//! }
//! ```

use std::future::Future;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub mod host;
pub mod releases;
pub mod tracker;
pub mod types;

pub use host::HostBackend;
pub use types::{
    AckReply, ActivityReply, BundledStats, DownloadReply, ElapsedReply, SessionUpdate, StartReply, StatsReply,
    StopReply, UpdateCheckReply,
};

/// Error returned by any Backend Service call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The call did not complete.
    #[error("Request failed: {0}")]
    Request(String),

    /// The call did not complete within the allotted time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The call completed and reported `success = false`.
    #[error("{0}")]
    Rejected(String),
}

impl BackendError {
    /// `true` when the request never completed, as opposed to a logical rejection.
    pub fn is_request_failure(&self) -> bool {
        matches!(self, BackendError::Request(_) | BackendError::Timeout(_))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            BackendError::Request(format!("timed out: {}", error))
        } else {
            BackendError::Request(error.to_string())
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(error: std::io::Error) -> Self {
        BackendError::Request(error.to_string())
    }
}

/// Common shape of every reply: a `success` flag and an optional message.
pub trait Reply: Sized {
    fn success(&self) -> bool;

    fn message(&self) -> Option<&str>;

    /// Converts a logical failure into [`BackendError::Rejected`].
    ///
    /// The server message is preferred; `fallback` is used when the reply
    /// carries none.
    fn into_result(self, fallback: impl ToString) -> Result<Self, BackendError> {
        if self.success() {
            Ok(self)
        } else {
            let message = self
                .message()
                .filter(|message| !message.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string());
            Err(BackendError::Rejected(message))
        }
    }
}

/// Runs a backend call with an upper bound on its duration.
pub async fn with_timeout<T, F>(duration: Duration, call: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    match tokio::time::timeout(duration, call).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout(duration)),
    }
}

/// The Backend Service as seen by the controllers.
///
/// All methods are asynchronous and fallible. Futures are `Send` so that
/// fire-and-forget calls (activity pings) can be moved onto spawned tasks.
pub trait Backend: Send + Sync + 'static {
    fn start_session(&self, project: &str, note: &str) -> impl Future<Output = Result<StartReply, BackendError>> + Send;

    /// Closes the running session. Carries no payload.
    fn stop_session(&self) -> impl Future<Output = Result<StopReply, BackendError>> + Send;

    fn current_session_elapsed(&self) -> impl Future<Output = Result<ElapsedReply, BackendError>> + Send;

    fn record_keyboard_activity(&self) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn record_mouse_activity(&self) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn daily_stats(&self) -> impl Future<Output = Result<StatsReply, BackendError>> + Send;

    fn weekly_stats(&self) -> impl Future<Output = Result<StatsReply, BackendError>> + Send;

    /// Current activity counters of the running session.
    fn activity_stats(&self) -> impl Future<Output = Result<ActivityReply, BackendError>> + Send;

    /// Pushes activity counters and the note for the running session.
    fn update_session(&self, update: &SessionUpdate) -> impl Future<Output = Result<AckReply, BackendError>> + Send;

    fn check_for_updates(&self) -> impl Future<Output = Result<UpdateCheckReply, BackendError>> + Send;

    fn download_update(&self, url: &str) -> impl Future<Output = Result<DownloadReply, BackendError>> + Send;

    /// Installs a downloaded artifact. Success may end the current process.
    fn install_update(&self, file_path: &Path) -> impl Future<Output = Result<AckReply, BackendError>> + Send;

    fn logout(&self) -> impl Future<Output = Result<AckReply, BackendError>> + Send;
}
