use super::tracker_backend;
use crate::{
    libs::{config::Config, messages::Message, timer::TimerController},
    msg_success,
};
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    let config = Config::read()?;
    let backend = tracker_backend(&config)?;
    let timer = TimerController::new(backend, config.timer.unwrap_or_default());

    timer.logout().await?;
    msg_success!(Message::LoggedOut);
    Ok(())
}
