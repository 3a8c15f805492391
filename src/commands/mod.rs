pub mod init;
pub mod logout;
pub mod stats;
pub mod track;
pub mod update;

use crate::api::HostBackend;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::msg_bail_anyhow;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Start a session and show the running timer")]
    Track(track::TrackArgs),
    #[command(about = "Show today's and this week's activity")]
    Stats,
    #[command(about = "Update the application to the latest version")]
    Update,
    #[command(about = "Log out from the tracker")]
    Logout,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Track(args) => track::cmd(args).await,
            Commands::Stats => stats::cmd().await,
            Commands::Update => update::cmd().await,
            Commands::Logout => logout::cmd().await,
        }
    }
}

/// Production backend for commands that talk to the tracker.
fn tracker_backend(config: &Config) -> Result<Arc<HostBackend>> {
    let tracker = config.tracker.clone().unwrap_or_default();
    if !tracker.is_configured() {
        msg_bail_anyhow!(Message::TrackerNotConfigured);
    }
    let updates = config.updates.clone().unwrap_or_default();
    Ok(Arc::new(HostBackend::new(&tracker, &updates)))
}
