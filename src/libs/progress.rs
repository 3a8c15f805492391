//! Download progress reducer.
//!
//! The tracker usually reports a download as one atomic completion. To keep
//! the bar moving, a simulated signal advances the value on a fixed interval
//! while the real download is awaited. Both signals feed one reducer:
//!
//! ```text
//! percent = 100                          once the real download completed
//!         = max(simulated, reported)     otherwise, capped at 100
//! ```
//!
//! The simulated value never passes the ceiling, so only a real completion
//! can reach 100. The percent never decreases within one attempt; a new
//! attempt starts from a fresh reducer at 0.

/// Step and ceiling of the simulated signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSettings {
    pub step: u8,
    pub ceiling: u8,
}

impl ProgressSettings {
    /// The ceiling is clamped below 100.
    pub fn new(step: u8, ceiling: u8) -> Self {
        Self {
            step,
            ceiling: ceiling.min(99),
        }
    }
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self::new(5, 95)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSignal {
    /// One tick of the simulated clock.
    Simulated,
    /// Incremental progress reported by the backend.
    Reported(u8),
    /// The real download finished.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    settings: ProgressSettings,
    simulated: u8,
    reported: u8,
    completed: bool,
}

impl DownloadProgress {
    pub fn new(settings: ProgressSettings) -> Self {
        Self {
            settings,
            simulated: 0,
            reported: 0,
            completed: false,
        }
    }

    /// Feeds one signal and returns the resulting percent.
    pub fn apply(&mut self, signal: ProgressSignal) -> u8 {
        match signal {
            ProgressSignal::Simulated => {
                self.simulated = self.simulated.saturating_add(self.settings.step).min(self.settings.ceiling);
            }
            ProgressSignal::Reported(percent) => {
                self.reported = self.reported.max(percent.min(100));
            }
            ProgressSignal::Completed => self.completed = true,
        }
        self.percent()
    }

    pub fn percent(&self) -> u8 {
        if self.completed {
            100
        } else {
            self.simulated.max(self.reported).min(100)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self::new(ProgressSettings::default())
    }
}
