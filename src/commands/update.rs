use crate::{
    api::HostBackend,
    libs::{
        config::Config,
        messages::Message,
        update::{CheckMode, UpdateController, UpdateStatus, UpdateView},
    },
    msg_error_anyhow, msg_info, msg_success,
};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Checks for a newer release and, once confirmed, downloads and installs it.
pub async fn cmd() -> Result<()> {
    let config = Config::read()?;
    let updates = config.updates.clone().unwrap_or_default();
    let backend = Arc::new(HostBackend::new(&config.tracker.clone().unwrap_or_default(), &updates));
    let updater = UpdateController::new(backend, updates);

    msg_info!(Message::CheckingForUpdates);
    let status = updater
        .check(CheckMode::Manual)
        .await
        .map_err(|error| msg_error_anyhow!(Message::UpdateError(error.to_string())))?;

    if status != UpdateStatus::Available {
        msg_info!(Message::NoUpdateRequired);
        updater.close()?;
        return Ok(());
    }

    let check = updater.view().check.unwrap_or_default();
    msg_info!(Message::UpdateAvailable {
        current: check.current_version.clone(),
        latest: check.latest_version.clone(),
    });
    if let Some(notes) = check.release_notes.as_deref().filter(|notes| !notes.trim().is_empty()) {
        println!("{}\n", notes.trim());
    }

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptConfirmUpdate.to_string())
        .default(true)
        .interact()?;
    if !confirmed {
        updater.decline()?;
        msg_info!(Message::UpdateDeclined);
        return Ok(());
    }

    let progress = spawn_progress(updater.subscribe());
    let result = updater.accept().await;
    progress.abort();
    println!();

    result.map_err(|error| msg_error_anyhow!(Message::UpdateError(error.to_string())))?;
    msg_success!(Message::UpdateInstalled(check.latest_version));
    Ok(())
}

fn spawn_progress(mut views: watch::Receiver<UpdateView>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            {
                let view = views.borrow_and_update();
                match view.status {
                    UpdateStatus::Downloading(percent) => print!("\r{}", Message::DownloadingUpdate(percent)),
                    UpdateStatus::Installing => print!("\r{}          ", Message::InstallingUpdate),
                    _ => {}
                }
                let _ = io::stdout().flush();
            }
            if views.changed().await.is_err() {
                break;
            }
        }
    })
}
