use super::tracker_backend;
use crate::{
    libs::{config::Config, messages::Message, timer::TimerController, view::View},
    msg_warning,
};
use anyhow::Result;

/// Fetches and prints today's and this week's stats.
pub async fn cmd() -> Result<()> {
    let config = Config::read()?;
    let backend = tracker_backend(&config)?;
    let timer = TimerController::new(backend, config.timer.unwrap_or_default());

    if let Err(error) = timer.refresh_stats().await {
        msg_warning!(Message::StatsFetchFailed(error.to_string()));
    }
    View::stats(&timer.snapshot().stats);
    Ok(())
}
