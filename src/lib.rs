//! # Tracklet - Session Timer and Updater for a Productivity Tracker
//!
//! Client-side controllers for a desktop productivity tracker: a session
//! timer that stays in step with the tracker, and an in-app updater.
//!
//! ## Features
//!
//! - **Session Timer**: optimistic local clock reconciled with the tracker
//! - **Activity Pings**: raw keyboard/mouse input forwarded while tracking
//! - **Productivity Stats**: daily and weekly totals from the tracker
//! - **Self Update**: GitHub-release check, download with progress, install
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tracklet::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod libs;
