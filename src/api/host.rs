use super::releases::Releases;
use super::tracker::TrackerApi;
use super::types::{
    AckReply, ActivityReply, DownloadReply, ElapsedReply, SessionUpdate, StartReply, StatsReply, StopReply,
    UpdateCheckReply,
};
use super::{Backend, BackendError};
use crate::libs::config::{TrackerConfig, UpdateConfig};
use std::path::Path;

/// Production Backend Service: the tracker API for sessions and stats,
/// GitHub releases for updates.
#[derive(Debug, Clone)]
pub struct HostBackend {
    tracker: TrackerApi,
    releases: Releases,
}

impl HostBackend {
    pub fn new(tracker: &TrackerConfig, updates: &UpdateConfig) -> Self {
        Self {
            tracker: TrackerApi::new(tracker),
            releases: Releases::new(updates),
        }
    }
}

impl Backend for HostBackend {
    async fn start_session(&self, project: &str, note: &str) -> Result<StartReply, BackendError> {
        self.tracker.start_session(project, note).await
    }

    async fn stop_session(&self) -> Result<StopReply, BackendError> {
        self.tracker.stop_session().await
    }

    async fn current_session_elapsed(&self) -> Result<ElapsedReply, BackendError> {
        self.tracker.current_session_elapsed().await
    }

    async fn record_keyboard_activity(&self) -> Result<(), BackendError> {
        self.tracker.record_keyboard_activity().await
    }

    async fn record_mouse_activity(&self) -> Result<(), BackendError> {
        self.tracker.record_mouse_activity().await
    }

    async fn daily_stats(&self) -> Result<StatsReply, BackendError> {
        self.tracker.daily_stats().await
    }

    async fn weekly_stats(&self) -> Result<StatsReply, BackendError> {
        self.tracker.weekly_stats().await
    }

    async fn activity_stats(&self) -> Result<ActivityReply, BackendError> {
        self.tracker.activity_stats().await
    }

    async fn update_session(&self, update: &SessionUpdate) -> Result<AckReply, BackendError> {
        self.tracker.update_session(update).await
    }

    async fn check_for_updates(&self) -> Result<UpdateCheckReply, BackendError> {
        self.releases.check().await
    }

    async fn download_update(&self, url: &str) -> Result<DownloadReply, BackendError> {
        self.releases.download(url).await
    }

    async fn install_update(&self, file_path: &Path) -> Result<AckReply, BackendError> {
        self.releases.install(file_path).await
    }

    async fn logout(&self) -> Result<AckReply, BackendError> {
        self.tracker.logout().await
    }
}
