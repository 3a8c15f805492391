//! Wire types for Backend Service replies.
//!
//! Field names follow the tracker's JSON (`snake_case`), and every optional
//! part of a reply defaults when missing so that sparse replies still parse.

use super::Reply;
use crate::libs::stats::ActivityStats;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

macro_rules! impl_reply {
    ($($reply:ty),+ $(,)?) => {
        $(
            impl Reply for $reply {
                fn success(&self) -> bool {
                    self.success
                }

                fn message(&self) -> Option<&str> {
                    self.message.as_deref()
                }
            }
        )+
    };
}

impl_reply!(
    StartReply,
    StopReply,
    ElapsedReply,
    StatsReply,
    ActivityReply,
    AckReply,
    UpdateCheckReply,
    DownloadReply,
);

/// Daily and weekly stats attached to a start or stop reply.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BundledStats {
    #[serde(default)]
    pub daily: Option<StatsReply>,
    #[serde(default)]
    pub weekly: Option<StatsReply>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StartReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Opaque session record owned by the tracker.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub stats: Option<BundledStats>,
}

impl StartReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StopReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stats: Option<BundledStats>,
}

impl StopReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn with_stats(daily: ActivityStats, weekly: ActivityStats) -> Self {
        Self {
            success: true,
            message: None,
            stats: Some(BundledStats {
                daily: Some(StatsReply::ok(daily)),
                weekly: Some(StatsReply::ok(weekly)),
            }),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ElapsedReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub elapsed_time: u64,
    /// `Some(false)` when the tracker has no open session.
    #[serde(default)]
    pub active: Option<bool>,
}

impl ElapsedReply {
    pub fn ok(elapsed_time: u64) -> Self {
        Self {
            success: true,
            message: None,
            elapsed_time,
            active: Some(true),
        }
    }

    pub fn closed() -> Self {
        Self {
            success: false,
            message: Some("No active session".to_string()),
            elapsed_time: 0,
            active: Some(false),
        }
    }

    pub fn session_closed(&self) -> bool {
        self.active == Some(false)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StatsReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<ActivityStats>,
}

impl StatsReply {
    pub fn ok(data: ActivityStats) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// The stats carried by a successful reply.
    pub fn accepted(&self) -> Option<ActivityStats> {
        if self.success {
            self.data.clone().map(ActivityStats::normalized)
        } else {
            None
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ActivityReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub active_time: f64,
    #[serde(default)]
    pub idle_time: f64,
    #[serde(default)]
    pub keyboard_rate: f64,
    #[serde(default)]
    pub mouse_rate: f64,
    #[serde(default)]
    pub is_idle: bool,
}

/// Mid-session or final push of activity counters.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SessionUpdate {
    pub active_time: f64,
    pub idle_time: f64,
    pub keyboard_rate: f64,
    pub mouse_rate: f64,
    pub is_final_update: bool,
    pub user_note: String,
}

impl SessionUpdate {
    pub fn from_activity(activity: &ActivityReply, is_final_update: bool, user_note: &str) -> Self {
        Self {
            active_time: activity.active_time,
            idle_time: activity.idle_time,
            keyboard_rate: activity.keyboard_rate,
            mouse_rate: activity.mouse_rate,
            is_final_update,
            user_note: user_note.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AckReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl AckReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UpdateCheckReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub current_version: String,
    #[serde(default)]
    pub latest_version: String,
    #[serde(default)]
    pub update_available: bool,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub release_notes: Option<String>,
}

impl UpdateCheckReply {
    pub fn up_to_date(version: &str) -> Self {
        Self {
            success: true,
            current_version: version.to_string(),
            latest_version: version.to_string(),
            ..Default::default()
        }
    }

    pub fn available(current: &str, latest: &str, download_url: &str) -> Self {
        Self {
            success: true,
            current_version: current.to_string(),
            latest_version: latest.to_string(),
            update_available: true,
            download_url: Some(download_url.to_string()).filter(|url| !url.is_empty()),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DownloadReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl DownloadReply {
    pub fn ok(file_path: impl Into<PathBuf>) -> Self {
        Self {
            success: true,
            message: None,
            file_path: Some(file_path.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}
