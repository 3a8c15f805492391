//! Interactive tracking session.
//!
//! Starts a session, renders the running clock on one line and reads short
//! commands from stdin until the session is stopped. Raw keyboard and mouse
//! input is forwarded as activity pings while the session runs.

use super::tracker_backend;
use crate::{
    api::HostBackend,
    libs::{
        config::Config,
        input::{InputKind, InputListener},
        messages::Message,
        timer::{SyncOutcome, TimerController, TimerPhase, TimerSnapshot},
        update::{UpdateController, UpdateStatus},
        view::View,
    },
    msg_error, msg_info, msg_success, msg_warning,
};
use anyhow::Result;
use clap::Args;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Project to track; defaults to the configured project
    #[arg(short, long)]
    project: Option<String>,

    /// Note describing the work; defaults to the configured note
    #[arg(short, long)]
    note: Option<String>,

    /// Do not capture keyboard and mouse activity
    #[arg(long)]
    no_input: bool,
}

/// A line typed while a session is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackCommand {
    Stop,
    Note(String),
    Resync,
    Sync,
    Quit,
    Empty,
    Unknown(String),
}

impl TrackCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "" => TrackCommand::Empty,
            "stop" | "s" => TrackCommand::Stop,
            "note" | "n" if !rest.is_empty() => TrackCommand::Note(rest.to_string()),
            "resync" | "r" => TrackCommand::Resync,
            "sync" | "y" => TrackCommand::Sync,
            "quit" | "q" | "exit" => TrackCommand::Quit,
            _ => TrackCommand::Unknown(line.to_string()),
        }
    }
}

pub async fn cmd(args: TrackArgs) -> Result<()> {
    let config = Config::read()?;
    let backend = tracker_backend(&config)?;
    let tracker = config.tracker.clone().unwrap_or_default();
    let updates = config.updates.clone().unwrap_or_default();
    let input = config.input.clone().unwrap_or_default();
    let timer = TimerController::new(Arc::clone(&backend), config.timer.clone().unwrap_or_default());

    if updates.check_on_startup {
        spawn_update_check(UpdateController::new(Arc::clone(&backend), updates));
    }

    if let Err(error) = timer.refresh_stats().await {
        msg_warning!(Message::StatsFetchFailed(error.to_string()));
    }

    let project = args.project.unwrap_or(tracker.project);
    let note = args.note.unwrap_or(tracker.note);
    timer.select_project(&project)?;
    timer.start(&project, &note).await?;
    msg_success!(Message::SessionStarted(project));
    msg_info!(Message::TrackCommandsHelp);

    let mut pings = if input.enabled && !args.no_input {
        Some(InputListener::spawn(&input))
    } else {
        None
    };
    let clock = spawn_clock(timer.subscribe());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                msg_info!(Message::StoppingOnSignal);
                break;
            }
            Some(kind) = next_ping(&mut pings) => timer.record_input(kind),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match TrackCommand::parse(&line) {
                    TrackCommand::Stop => {
                        if stop(&timer).await {
                            break;
                        }
                    }
                    TrackCommand::Quit => break,
                    TrackCommand::Note(text) => {
                        timer.set_note(&text);
                        msg_success!(Message::NoteUpdated);
                    }
                    TrackCommand::Resync => {
                        timer.on_window_focus().await;
                        let snapshot = timer.snapshot();
                        if snapshot.phase == TimerPhase::Idle {
                            msg_warning!(Message::SessionClosedRemotely);
                            break;
                        }
                        msg_info!(Message::TimerResynced(snapshot.display_time()));
                    }
                    TrackCommand::Sync => match timer.sync().await {
                        Ok(SyncOutcome::Synced) => msg_success!(Message::StatsSynced),
                        Ok(SyncOutcome::PushFailed) => msg_warning!(Message::SyncPushSkipped),
                        Err(error) => msg_warning!(Message::StatsFetchFailed(error.to_string())),
                    },
                    TrackCommand::Empty => {}
                    TrackCommand::Unknown(command) => {
                        msg_warning!(Message::UnknownTrackCommand(command));
                        msg_info!(Message::TrackCommandsHelp);
                    }
                }
            }
        }
    }

    if timer.snapshot().is_locked() {
        stop(&timer).await;
    }
    clock.abort();
    println!();
    View::stats(&timer.snapshot().stats);
    Ok(())
}

/// Stops the session and reports the outcome. Returns `true` once stopped.
async fn stop(timer: &TimerController<HostBackend>) -> bool {
    let elapsed = timer.snapshot().display_time();
    match timer.stop().await {
        Ok(()) => {
            println!();
            msg_success!(Message::SessionStopped(elapsed));
            true
        }
        Err(error) => {
            println!();
            msg_error!(error);
            msg_warning!(Message::SessionStoppedWithErrors);
            false
        }
    }
}

async fn next_ping(pings: &mut Option<mpsc::UnboundedReceiver<InputKind>>) -> Option<InputKind> {
    match pings {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

fn spawn_clock(mut snapshots: watch::Receiver<TimerSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            {
                let snapshot = snapshots.borrow_and_update();
                print!("\r{}", status_line(&snapshot));
                let _ = io::stdout().flush();
            }
            if snapshots.changed().await.is_err() {
                break;
            }
        }
    })
}

fn status_line(snapshot: &TimerSnapshot) -> String {
    let state = match &snapshot.phase {
        TimerPhase::Idle => "idle",
        TimerPhase::Starting => "starting",
        TimerPhase::Running => "running",
        TimerPhase::Stopping => "stopping",
        TimerPhase::Error(_) => "error",
    };
    let project = snapshot.project.as_deref().unwrap_or("-");
    format!("⏱  {} [{}] {}   ", snapshot.display_time(), state, project)
}

fn spawn_update_check(updater: UpdateController<HostBackend>) {
    tokio::spawn(async move {
        updater.check_on_startup().await;
        let view = updater.view();
        if view.visible && view.status == UpdateStatus::Available {
            if let Some(check) = view.check {
                println!();
                msg_info!(Message::UpdateAvailableInBackground(check.latest_version));
            }
        }
    });
}
