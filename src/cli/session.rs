use anyhow::{bail, Result};
use log::warn;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};

use crate::{
    models::Session,
    summary::SessionSummary,
    timer::{format_clock, TimerController, TimerEvent, TimerState, TimerStatus},
    AppState,
};

enum Input {
    Pause,
    Start,
    Reset,
    Distraction,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" => Input::Pause,
        "s" | "start" | "resume" => Input::Start,
        "r" | "reset" => Input::Reset,
        "d" | "distraction" | "bg" => Input::Distraction,
        "q" | "quit" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

/// `--minutes` converted to seconds, or the configured default when absent.
fn session_length_secs(minutes: Option<u64>, default_secs: u64) -> Result<u64> {
    match minutes {
        None => Ok(default_secs),
        Some(0) => bail!("--minutes must be greater than zero"),
        Some(minutes) => match minutes.checked_mul(60) {
            Some(secs) => Ok(secs),
            None => bail!("--minutes {minutes} is too large"),
        },
    }
}

pub async fn run_command(
    state: &AppState,
    minutes: Option<u64>,
    category: Option<String>,
) -> Result<()> {
    let duration_secs = session_length_secs(minutes, state.settings.default_duration_secs())?;
    let category = match category {
        Some(name) => state
            .settings
            .update_categories(|list| list.select(&name).map(str::to_string))?,
        None => state.settings.categories().selected().to_string(),
    };

    let controller = TimerController::new(state.sessions.clone(), TimerState::default());
    controller
        .configure(Some(duration_secs), Some(category))
        .await?;
    let mut events = controller.subscribe();

    let started = controller.start().await?;
    println!(
        "{} focus on {} started. Commands: p pause, s resume, r reset, d distraction, q quit",
        format_clock(started.remaining_secs),
        started.category
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    controller.reset().await?;
                    break;
                };
                if !handle_input(&controller, parse_input(&line)).await {
                    break;
                }
            }
            event = events.recv() => match event {
                Ok(TimerEvent::Heartbeat { state }) => {
                    println!("{} remaining", format_clock(state.remaining_secs));
                }
                Ok(TimerEvent::SessionFinished { session }) => {
                    print_summary(&session);
                    if session.completed {
                        break;
                    }
                }
                Ok(TimerEvent::StorageFailed { session_id }) => {
                    eprintln!("Could not save session {session_id}; it will be missing from reports.");
                }
                Ok(TimerEvent::StateChanged { .. }) => {}
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {skipped} timer events"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                controller.reset().await?;
                break;
            }
        }
    }

    controller.shutdown().await;
    drain_summaries(&mut events);
    Ok(())
}

/// Returns `false` when the user asked to quit.
async fn handle_input(controller: &TimerController, input: Input) -> bool {
    let result = match input {
        Input::Pause => controller.pause().await,
        Input::Start => controller.start().await,
        Input::Reset => controller.reset().await,
        Input::Distraction => controller.background_detected().await,
        Input::Quit => {
            if let Err(err) = controller.reset().await {
                eprintln!("{err:#}");
            }
            return false;
        }
        Input::Unknown(other) => {
            eprintln!("Unknown command \"{other}\" (p, s, r, d, q)");
            return true;
        }
    };

    match result {
        Ok(state) => print_state(&state),
        Err(err) => eprintln!("{err:#}"),
    }
    true
}

fn print_state(state: &TimerState) {
    let label = match state.status {
        TimerStatus::Idle => "ready",
        TimerStatus::Running => "running",
        TimerStatus::Paused => "paused",
        TimerStatus::Completed => "completed",
    };
    println!(
        "{} {label} ({} distraction(s))",
        format_clock(state.remaining_secs),
        state.distractions
    );
}

fn print_summary(session: &Session) {
    let summary = SessionSummary::from(session);
    let heading = if summary.completed {
        "Session Complete!"
    } else {
        "Session abandoned"
    };
    println!(
        "{heading}\n  Focus time:   {}\n  Category:     {}\n  Distractions: {} ({})",
        summary.duration,
        summary.category,
        summary.distractions,
        summary.feedback.label()
    );
}

fn drain_summaries(events: &mut broadcast::Receiver<TimerEvent>) {
    while let Ok(event) = events.try_recv() {
        if let TimerEvent::SessionFinished { session } = event {
            print_summary(&session);
        }
    }
}
