//! Core library modules for the tracklet application.
//!
//! ## Features
//!
//! - **Controllers**: session timer and application update state machines
//! - **Tracker Data**: sessions, period stats, download progress
//! - **Input Capture**: raw keyboard/mouse events turned into activity pings
//! - **Core Infrastructure**: configuration, data storage, messaging
//! - **User Interface**: console tables and time formatting
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tracklet::api::HostBackend;
//! use tracklet::libs::config::Config;
//! use tracklet::libs::timer::TimerController;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::read()?;
//! let backend = Arc::new(HostBackend::new(
//!     &config.tracker.clone().unwrap_or_default(),
//!     &config.updates.clone().unwrap_or_default(),
//! ));
//! let timer = TimerController::new(backend, config.timer.unwrap_or_default());
//! timer.start("ProjectA", "note1").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data_storage;
pub mod formatter;
pub mod input;
pub mod messages;
pub mod progress;
pub mod session;
pub mod stats;
pub mod timer;
pub mod update;
pub mod view;
