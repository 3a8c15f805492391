use serde::{Deserialize, Serialize};

/// One continuous work interval.
///
/// The start time is owned by the tracker; the client only keeps what it
/// needs to render the session and to send the note on the next push.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    /// Work context chosen at start. Fixed for the session's lifetime.
    pub project_label: String,
    /// Free-text annotation; persisted on the next session update.
    pub note: String,
    /// Session record as returned by the tracker, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<serde_json::Value>,
}

impl Session {
    pub fn new(project_label: &str, note: &str, remote: Option<serde_json::Value>) -> Self {
        Self {
            project_label: project_label.to_string(),
            note: note.to_string(),
            remote,
        }
    }
}
