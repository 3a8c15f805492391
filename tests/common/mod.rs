//! Scripted Backend Service for controller tests.
//!
//! Every operation counts its calls and answers from a queue of scripted
//! replies, falling back to a default once the queue is empty. An optional
//! delay is applied with `tokio::time::sleep`, so tests running on a paused
//! clock stay deterministic.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracklet::api::{
    AckReply, ActivityReply, Backend, BackendError, DownloadReply, ElapsedReply, SessionUpdate, StartReply,
    StatsReply, StopReply, UpdateCheckReply,
};
use tracklet::libs::stats::ActivityStats;

pub struct Op<T> {
    calls: AtomicUsize,
    queue: Mutex<VecDeque<Result<T, BackendError>>>,
    default: Mutex<Result<T, BackendError>>,
    delay: Mutex<Duration>,
}

impl<T: Clone> Op<T> {
    pub fn new(default: T) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            queue: Mutex::new(VecDeque::new()),
            default: Mutex::new(Ok(default)),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    /// Queues a reply for the next call.
    pub fn reply(&self, reply: T) {
        self.queue.lock().push_back(Ok(reply));
    }

    /// Queues a request failure for the next call.
    pub fn fail(&self, error: BackendError) {
        self.queue.lock().push_back(Err(error));
    }

    pub fn set_default(&self, reply: Result<T, BackendError>) {
        *self.default.lock() = reply;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn invoke(&self) -> Result<T, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        let scripted = self.queue.lock().pop_front();
        let reply = match scripted {
            Some(reply) => reply,
            None => self.default.lock().clone(),
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

pub struct FakeBackend {
    pub start: Op<StartReply>,
    pub stop: Op<StopReply>,
    pub elapsed: Op<ElapsedReply>,
    pub keyboard: Op<()>,
    pub mouse: Op<()>,
    pub daily: Op<StatsReply>,
    pub weekly: Op<StatsReply>,
    pub activity: Op<ActivityReply>,
    pub update_session: Op<AckReply>,
    pub check: Op<UpdateCheckReply>,
    pub download: Op<DownloadReply>,
    pub install: Op<AckReply>,
    pub logout: Op<AckReply>,
    pub last_start: Mutex<Option<(String, String)>>,
    pub last_update: Mutex<Option<SessionUpdate>>,
    pub last_download_url: Mutex<Option<String>>,
    pub last_install_path: Mutex<Option<PathBuf>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            start: Op::new(StartReply::ok()),
            stop: Op::new(StopReply::ok()),
            elapsed: Op::new(ElapsedReply::ok(0)),
            keyboard: Op::new(()),
            mouse: Op::new(()),
            daily: Op::new(StatsReply::ok(ActivityStats::default())),
            weekly: Op::new(StatsReply::ok(ActivityStats::default())),
            activity: Op::new(ActivityReply {
                success: true,
                ..Default::default()
            }),
            update_session: Op::new(AckReply::ok()),
            check: Op::new(UpdateCheckReply::up_to_date("1.0.0")),
            download: Op::new(DownloadReply::ok("/tmp/tracklet-update.tar.gz")),
            install: Op::new(AckReply::ok()),
            logout: Op::new(AckReply::ok()),
            last_start: Mutex::new(None),
            last_update: Mutex::new(None),
            last_download_url: Mutex::new(None),
            last_install_path: Mutex::new(None),
        }
    }
}

impl Backend for FakeBackend {
    async fn start_session(&self, project: &str, note: &str) -> Result<StartReply, BackendError> {
        *self.last_start.lock() = Some((project.to_string(), note.to_string()));
        self.start.invoke().await
    }

    async fn stop_session(&self) -> Result<StopReply, BackendError> {
        self.stop.invoke().await
    }

    async fn current_session_elapsed(&self) -> Result<ElapsedReply, BackendError> {
        self.elapsed.invoke().await
    }

    async fn record_keyboard_activity(&self) -> Result<(), BackendError> {
        self.keyboard.invoke().await
    }

    async fn record_mouse_activity(&self) -> Result<(), BackendError> {
        self.mouse.invoke().await
    }

    async fn daily_stats(&self) -> Result<StatsReply, BackendError> {
        self.daily.invoke().await
    }

    async fn weekly_stats(&self) -> Result<StatsReply, BackendError> {
        self.weekly.invoke().await
    }

    async fn activity_stats(&self) -> Result<ActivityReply, BackendError> {
        self.activity.invoke().await
    }

    async fn update_session(&self, update: &SessionUpdate) -> Result<AckReply, BackendError> {
        *self.last_update.lock() = Some(update.clone());
        self.update_session.invoke().await
    }

    async fn check_for_updates(&self) -> Result<UpdateCheckReply, BackendError> {
        self.check.invoke().await
    }

    async fn download_update(&self, url: &str) -> Result<DownloadReply, BackendError> {
        *self.last_download_url.lock() = Some(url.to_string());
        self.download.invoke().await
    }

    async fn install_update(&self, file_path: &Path) -> Result<AckReply, BackendError> {
        *self.last_install_path.lock() = Some(file_path.to_path_buf());
        self.install.invoke().await
    }

    async fn logout(&self) -> Result<AckReply, BackendError> {
        self.logout.invoke().await
    }
}

pub fn request_failure() -> BackendError {
    BackendError::Request("connection refused".to_string())
}
