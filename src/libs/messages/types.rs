#[derive(Debug, Clone)]
pub enum Message {
    // === TIMER MESSAGES ===
    SessionStarted(String), // project
    SessionStopped(String), // elapsed clock
    SessionStoppedWithErrors,
    SessionClosedRemotely,
    SessionAlreadyRunning,
    SessionNotRunning,
    TimerOperationPending,
    SessionLocked,
    NoteUpdated,
    TimerResynced(String), // elapsed clock
    TrackCommandsHelp,
    UnknownTrackCommand(String),
    TrackerNotConfigured,
    StoppingOnSignal,

    // === BACKEND FALLBACK MESSAGES ===
    StartTimerFailed,
    StopTimerFailed,
    SessionTimeFailed,
    DailyStatsFailed,
    WeeklyStatsFailed,
    ActivityStatsFailed,
    SessionUpdateFailed,
    UpdateCheckFailed,
    UpdateDownloadFailed,
    UpdateInstallFailed,
    LogoutFailed,
    ActivityPingFailed,

    // === STATS MESSAGES ===
    StatsHeader,
    StatsLastSynced(String),
    StatsFetchFailed(String), // error
    StatsSynced,
    SyncPushSkipped,

    // === UPDATE MESSAGES ===
    CheckingForUpdates,
    UpdateAvailable {
        current: String,
        latest: String,
    },
    NoUpdateRequired,
    PromptConfirmUpdate,
    DownloadingUpdate(u8), // percent
    InstallingUpdate,
    UpdateInstalled(String), // version
    UpdateDeclined,
    UpdateError(String),
    UpdateDownloadUrlNotSet,
    UpdateFileNotFound,
    UpdateFileMissingInReply,
    UnsupportedUpdateFileType(String), // extension
    UpdateCheckStatusFailed(u16),      // HTTP status
    LatestVersionUnknown,
    UpdateBinaryNotFoundInArchive,
    UpdateAvailableInBackground(String), // latest

    // === AUTHENTICATION MESSAGES ===
    LoggedOut,

    // === INPUT MESSAGES ===
    InputListenerFailed(String), // error

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigModuleTracker,
    ConfigModuleTimer,
    ConfigModuleUpdates,
    ConfigModuleInput,

    // === PROMPTS ===
    PromptSelectModules,
    PromptTrackerApiUrl,
    PromptTrackerAuthToken,
    PromptTrackerProject,
    PromptTrackerNote,
    PromptTickInterval,
    PromptRequestTimeout,
    PromptUpdateRepository,
    PromptCheckOnStartup,
    PromptStartupDelay,
    PromptInputEnabled,
    PromptMinPingInterval,
}
