//! Display implementation for tracklet application messages.
//!
//! All user-facing text lives here so the controllers, the backend clients
//! and the commands share one wording. Messages that carry values use typed
//! parameters and are interpolated when displayed.
//!
//! ```rust
//! use tracklet::libs::messages::Message;
//!
//! assert_eq!(Message::StopTimerFailed.to_string(), "Failed to stop timer");
//! ```

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === TIMER MESSAGES ===
            Message::SessionStarted(project) => format!("Session started for {}", project),
            Message::SessionStopped(elapsed) => format!("Session stopped after {}", elapsed),
            Message::SessionStoppedWithErrors => "Timer stopped with errors. Some data may not have been saved.".to_string(),
            Message::SessionClosedRemotely => "The session was closed by the tracker.".to_string(),
            Message::SessionAlreadyRunning => "A session is already running".to_string(),
            Message::SessionNotRunning => "No session is running".to_string(),
            Message::TimerOperationPending => "A timer operation is already in progress".to_string(),
            Message::SessionLocked => "Not allowed while a session is running".to_string(),
            Message::NoteUpdated => "Note updated".to_string(),
            Message::TimerResynced(elapsed) => format!("Timer synchronized: {}", elapsed),
            Message::TrackCommandsHelp => {
                "Commands: [s]top, note <text>, [r]esync, s[y]nc, [q]uit".to_string()
            }
            Message::UnknownTrackCommand(command) => format!("Unknown command '{}'", command),
            Message::TrackerNotConfigured => "Tracker API is not configured. Run 'tracklet init' first.".to_string(),
            Message::StoppingOnSignal => "Stopping the session...".to_string(),

            // === BACKEND FALLBACK MESSAGES ===
            Message::StartTimerFailed => "Failed to start timer".to_string(),
            Message::StopTimerFailed => "Failed to stop timer".to_string(),
            Message::SessionTimeFailed => "Failed to get session time".to_string(),
            Message::DailyStatsFailed => "Failed to get daily stats".to_string(),
            Message::WeeklyStatsFailed => "Failed to get weekly stats".to_string(),
            Message::ActivityStatsFailed => "Failed to get activity stats".to_string(),
            Message::SessionUpdateFailed => "Failed to update session".to_string(),
            Message::UpdateCheckFailed => "Error checking for updates.".to_string(),
            Message::UpdateDownloadFailed => "Failed to download update".to_string(),
            Message::UpdateInstallFailed => "Failed to install update".to_string(),
            Message::LogoutFailed => "Failed to log out".to_string(),
            Message::ActivityPingFailed => "Failed to record activity".to_string(),

            // === STATS MESSAGES ===
            Message::StatsHeader => "Activity".to_string(),
            Message::StatsLastSynced(time) => format!("Synced {}", time),
            Message::StatsFetchFailed(error) => format!("Failed to get stats! {}", error),
            Message::StatsSynced => "Stats synchronized".to_string(),
            Message::SyncPushSkipped => "Could not push session activity, stats not refreshed".to_string(),

            // === UPDATE MESSAGES ===
            Message::CheckingForUpdates => "Checking for updates...".to_string(),
            Message::UpdateAvailable { current, latest } => {
                format!("A new version is available: v{} (current v{})", latest, current)
            }
            Message::NoUpdateRequired => "You're using the latest version.".to_string(),
            Message::PromptConfirmUpdate => "Do you want to update?".to_string(),
            Message::DownloadingUpdate(percent) => format!("Downloading update... {}%", percent),
            Message::InstallingUpdate => "Installing update...".to_string(),
            Message::UpdateInstalled(version) => {
                format!("Version {} installed. Restart tracklet to finish the update.", version)
            }
            Message::UpdateDeclined => "Update skipped.".to_string(),
            Message::UpdateError(error) => format!("Update failed: {}", error),
            Message::UpdateDownloadUrlNotSet => "Update download URL is not set".to_string(),
            Message::UpdateFileNotFound => "Update file not found".to_string(),
            Message::UpdateFileMissingInReply => "Download finished without a file path".to_string(),
            Message::UnsupportedUpdateFileType(ext) => format!("Unsupported update file type: {}", ext),
            Message::UpdateCheckStatusFailed(status) => {
                format!("Failed to check for updates. Status code: {}", status)
            }
            Message::LatestVersionUnknown => "Could not determine latest version".to_string(),
            Message::UpdateBinaryNotFoundInArchive => "Executable not found in the update archive".to_string(),
            Message::UpdateAvailableInBackground(latest) => {
                format!("Version {} is available. Run 'tracklet update' after this session.", latest)
            }

            // === AUTHENTICATION MESSAGES ===
            Message::LoggedOut => "Logged out".to_string(),

            // === INPUT MESSAGES ===
            Message::InputListenerFailed(error) => {
                format!("Failed to listen for input events: {}. Retrying in 1 second...", error)
            }

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed".to_string(),
            Message::ConfigModuleTracker => "Tracker settings".to_string(),
            Message::ConfigModuleTimer => "Timer settings".to_string(),
            Message::ConfigModuleUpdates => "Update settings".to_string(),
            Message::ConfigModuleInput => "Input capture settings".to_string(),

            // === PROMPTS ===
            Message::PromptSelectModules => "Select the settings to configure".to_string(),
            Message::PromptTrackerApiUrl => "Enter the tracker API URL".to_string(),
            Message::PromptTrackerAuthToken => "Enter your tracker auth token".to_string(),
            Message::PromptTrackerProject => "Enter the default project".to_string(),
            Message::PromptTrackerNote => "Enter the default session note".to_string(),
            Message::PromptTickInterval => "Enter the clock tick interval (milliseconds)".to_string(),
            Message::PromptRequestTimeout => "Enter the request timeout (seconds)".to_string(),
            Message::PromptUpdateRepository => "Enter the release repository (owner/name)".to_string(),
            Message::PromptCheckOnStartup => "Check for updates on startup?".to_string(),
            Message::PromptStartupDelay => "Enter the startup check delay (milliseconds)".to_string(),
            Message::PromptInputEnabled => "Capture keyboard and mouse activity?".to_string(),
            Message::PromptMinPingInterval => "Enter the minimum interval between activity pings (milliseconds)".to_string(),
        };
        write!(f, "{}", text)
    }
}
