//! Configuration management for tracklet.
//!
//! The configuration is a JSON document stored in the platform-specific
//! application data directory. Each section is optional: a missing section
//! falls back to its defaults, and inside a section every missing field
//! falls back to its own default, so hand-edited partial files keep working.
//!
//! ## Sections
//!
//! - **Tracker**: API location, auth token, default project and note
//! - **Timer**: local clock tick and backend request timeout
//! - **Updates**: release source and the update-flow timings
//! - **Input**: raw keyboard/mouse capture used for activity pings
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tracklet::libs::config::Config;
//!
//! let config = Config::read()?;
//! let timer = config.timer.unwrap_or_default();
//! println!("tick every {:?}", timer.tick_interval());
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::{DataStorage, APP_NAME, APP_OWNER};
use crate::libs::messages::Message;
use crate::libs::progress::ProgressSettings;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_NOTE: &str = "I am working on Task";

/// A configurable section offered by the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Connection to the tracker API.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Base URL, e.g. `https://tracker.example.com/api/v1`.
    pub api_url: String,
    /// Bearer token sent with every request.
    pub auth_token: String,
    /// Project used when `track` is run without `--project`.
    pub project: String,
    /// Note used when `track` is run without `--note`.
    pub note: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            auth_token: String::new(),
            project: String::new(),
            note: DEFAULT_NOTE.to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_url.trim().is_empty()
    }
}

/// Timer controller settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TimerConfig {
    /// Period of the optimistic local clock.
    pub tick_interval_ms: u64,
    /// Upper bound for every session/stats request.
    pub request_timeout_secs: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

impl TimerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Update controller settings.
///
/// The progress values drive the simulated download bar: `progress_step`
/// percent every `progress_interval_ms`, never above `progress_ceiling`
/// until the real download completes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct UpdateConfig {
    /// GitHub repository publishing releases, as `owner/name`.
    pub repository: String,
    pub check_on_startup: bool,
    pub startup_delay_ms: u64,
    /// How long an "up to date" result stays on screen.
    pub up_to_date_window_ms: u64,
    pub progress_step: u8,
    pub progress_interval_ms: u64,
    pub progress_ceiling: u8,
    /// How long 100 % is shown before installing.
    pub completion_hold_ms: u64,
    pub request_timeout_secs: u64,
    pub download_timeout_secs: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            repository: format!("{}/{}", APP_OWNER, APP_NAME),
            check_on_startup: true,
            startup_delay_ms: 2000,
            up_to_date_window_ms: 3000,
            progress_step: 5,
            progress_interval_ms: 300,
            progress_ceiling: 95,
            completion_hold_ms: 500,
            request_timeout_secs: 30,
            download_timeout_secs: 600,
        }
    }
}

impl UpdateConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn up_to_date_window(&self) -> Duration {
        Duration::from_millis(self.up_to_date_window_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }

    pub fn completion_hold(&self) -> Duration {
        Duration::from_millis(self.completion_hold_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs.max(1))
    }

    pub fn progress_settings(&self) -> ProgressSettings {
        ProgressSettings::new(self.progress_step, self.progress_ceiling)
    }
}

/// Raw input capture settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub enabled: bool,
    /// Input events of one kind closer together than this become a single ping.
    pub min_ping_interval_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_ping_interval_ms: 500,
        }
    }
}

impl InputConfig {
    pub fn min_ping_interval(&self) -> Duration {
        Duration::from_millis(self.min_ping_interval_ms)
    }
}

/// Root configuration document.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<TrackerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updates: Option<UpdateConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<InputConfig>,
}

impl Config {
    /// Reads the configuration, returning defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the configuration file, if any.
    pub fn delete() -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if config_file_path.exists() {
            fs::remove_file(config_file_path)?;
        }
        Ok(())
    }

    /// Runs the interactive setup wizard, pre-filled with current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "tracker".to_string(),
                name: Message::ConfigModuleTracker.to_string(),
            },
            ConfigModule {
                key: "timer".to_string(),
                name: Message::ConfigModuleTimer.to_string(),
            },
            ConfigModule {
                key: "updates".to_string(),
                name: Message::ConfigModuleUpdates.to_string(),
            },
            ConfigModule {
                key: "input".to_string(),
                name: Message::ConfigModuleInput.to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "tracker" => {
                    let default = config.tracker.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleTracker);
                    config.tracker = Some(TrackerConfig {
                        api_url: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptTrackerApiUrl.to_string())
                            .default(default.api_url)
                            .interact_text()?,
                        auth_token: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptTrackerAuthToken.to_string())
                            .default(default.auth_token)
                            .interact_text()?,
                        project: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptTrackerProject.to_string())
                            .default(default.project)
                            .allow_empty(true)
                            .interact_text()?,
                        note: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptTrackerNote.to_string())
                            .default(default.note)
                            .interact_text()?,
                    });
                }
                "timer" => {
                    let default = config.timer.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleTimer);
                    config.timer = Some(TimerConfig {
                        tick_interval_ms: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptTickInterval.to_string())
                            .default(default.tick_interval_ms)
                            .interact_text()?,
                        request_timeout_secs: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptRequestTimeout.to_string())
                            .default(default.request_timeout_secs)
                            .interact_text()?,
                    });
                }
                "updates" => {
                    let default = config.updates.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleUpdates);
                    config.updates = Some(UpdateConfig {
                        repository: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptUpdateRepository.to_string())
                            .default(default.repository.clone())
                            .interact_text()?,
                        check_on_startup: Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptCheckOnStartup.to_string())
                            .default(default.check_on_startup)
                            .interact()?,
                        startup_delay_ms: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptStartupDelay.to_string())
                            .default(default.startup_delay_ms)
                            .interact_text()?,
                        ..default
                    });
                }
                "input" => {
                    let default = config.input.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleInput);
                    config.input = Some(InputConfig {
                        enabled: Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptInputEnabled.to_string())
                            .default(default.enabled)
                            .interact()?,
                        min_ping_interval_ms: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptMinPingInterval.to_string())
                            .default(default.min_ping_interval_ms)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
