//! HTTP client for the tracker's session, activity and stats endpoints.

use super::types::{AckReply, ActivityReply, ElapsedReply, SessionUpdate, StartReply, StatsReply, StopReply};
use super::{BackendError, Reply};
use crate::libs::config::TrackerConfig;
use crate::libs::messages::Message;
use chrono::Local;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

const SESSION_START_URL: &str = "sessions/start";
const SESSION_STOP_URL: &str = "sessions/stop";
const SESSION_CURRENT_URL: &str = "sessions/current";
const SESSION_ELAPSED_URL: &str = "sessions/current/elapsed";
const KEYBOARD_ACTIVITY_URL: &str = "activity/keyboard";
const MOUSE_ACTIVITY_URL: &str = "activity/mouse";
const ACTIVITY_STATS_URL: &str = "activity/stats";
const DAILY_STATS_URL: &str = "stats/daily";
const WEEKLY_STATS_URL: &str = "stats/weekly";
const LOGOUT_URL: &str = "auth/logout";

#[derive(Debug, Clone)]
pub struct TrackerApi {
    client: Client,
    config: TrackerConfig,
}

impl TrackerApi {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
        }
    }

    pub async fn start_session(&self, project: &str, note: &str) -> Result<StartReply, BackendError> {
        let body = json!({ "project": project, "note": note });
        let request = self.client.post(self.url(SESSION_START_URL)).json(&body);
        self.send(request).await.map(|(_, reply)| reply)
    }

    pub async fn stop_session(&self) -> Result<StopReply, BackendError> {
        let request = self.client.post(self.url(SESSION_STOP_URL));
        self.send(request).await.map(|(_, reply)| reply)
    }

    /// A 404 means the tracker holds no open session.
    pub async fn current_session_elapsed(&self) -> Result<ElapsedReply, BackendError> {
        let request = self.client.get(self.url(SESSION_ELAPSED_URL));
        let (status, body) = self.fetch(request).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(ElapsedReply::closed());
        }
        parse(status, &body)
    }

    pub async fn update_session(&self, update: &SessionUpdate) -> Result<AckReply, BackendError> {
        let request = self.client.patch(self.url(SESSION_CURRENT_URL)).json(update);
        self.send(request).await.map(|(_, reply)| reply)
    }

    pub async fn record_keyboard_activity(&self) -> Result<(), BackendError> {
        self.ping(KEYBOARD_ACTIVITY_URL).await
    }

    pub async fn record_mouse_activity(&self) -> Result<(), BackendError> {
        self.ping(MOUSE_ACTIVITY_URL).await
    }

    pub async fn activity_stats(&self) -> Result<ActivityReply, BackendError> {
        let request = self.client.get(self.url(ACTIVITY_STATS_URL));
        self.send(request).await.map(|(_, reply)| reply)
    }

    pub async fn daily_stats(&self) -> Result<StatsReply, BackendError> {
        self.stats(DAILY_STATS_URL).await
    }

    pub async fn weekly_stats(&self) -> Result<StatsReply, BackendError> {
        self.stats(WEEKLY_STATS_URL).await
    }

    pub async fn logout(&self) -> Result<AckReply, BackendError> {
        let request = self.client.post(self.url(LOGOUT_URL));
        self.send(request).await.map(|(_, reply)| reply)
    }

    async fn stats(&self, path: &str) -> Result<StatsReply, BackendError> {
        let request = self.client.get(self.url(path)).query(&[("timezone", local_timezone())]);
        self.send(request).await.map(|(_, reply)| reply)
    }

    async fn ping(&self, path: &str) -> Result<(), BackendError> {
        let request = self.client.post(self.url(path));
        let (_, reply) = self.send::<AckReply>(request).await?;
        reply.into_result(Message::ActivityPingFailed)?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<(StatusCode, T), BackendError> {
        let (status, body) = self.fetch(request).await?;
        parse(status, &body).map(|reply| (status, reply))
    }

    async fn fetch(&self, request: RequestBuilder) -> Result<(StatusCode, String), BackendError> {
        let res = request.bearer_auth(&self.config.auth_token).send().await?;
        let status = res.status();
        let body = res.text().await?;
        debug!(%status, bytes = body.len(), "tracker reply");
        Ok((status, body))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }
}

/// Parses a JSON reply. Bodies that are not the expected JSON are request
/// failures; a parsed reply keeps its own `success` flag.
fn parse<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|error| {
        if status.is_success() {
            BackendError::Request(format!("unexpected reply: {}", error))
        } else {
            BackendError::Request(format!("HTTP {}", status))
        }
    })
}

/// IANA name of the local zone (e.g. `Asia/Dhaka`), so the tracker cuts
/// days and weeks on local boundaries across DST changes. Falls back to
/// the current UTC offset when the zone cannot be resolved.
pub fn local_timezone() -> String {
    match iana_time_zone::get_timezone() {
        Ok(zone) if !zone.is_empty() => zone,
        Ok(_) => Local::now().offset().to_string(),
        Err(error) => {
            debug!(%error, "local time zone unavailable, sending offset");
            Local::now().offset().to_string()
        }
    }
}
