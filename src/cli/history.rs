use anyhow::{bail, Result};
use chrono::Local;

use crate::report::Report;
use crate::stats::format_duration;
use crate::summary::format_summary_duration;
use crate::AppState;

pub async fn report_command(state: &AppState, json: bool) -> Result<()> {
    let sessions = state.sessions.load_all().await;
    let report = Report::build(&sessions, &Local::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }
    Ok(())
}

pub async fn sessions_command(state: &AppState) -> Result<()> {
    let sessions = state.sessions.load_all().await;
    if sessions.is_empty() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    for session in &sessions {
        let when = session
            .timestamp
            .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        let status = if session.completed { "completed" } else { "abandoned" };

        println!(
            "{when}  {:<10} {:<16} {:>2} distraction(s)  {status}",
            format_summary_duration(session.duration_secs()),
            session.category_name(),
            session.distraction_count(),
        );
    }

    let completed = sessions.iter().filter(|session| session.completed).count();
    println!(
        "\n{} session(s), {completed} completed, {} focused",
        sessions.len(),
        format_duration(crate::stats::total_focus_time(&sessions))
    );
    Ok(())
}

pub async fn clear_command(state: &AppState, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("This deletes every focus session and cannot be undone; re-run with --yes");
    }

    if !state.sessions.clear_all().await {
        bail!("Failed to clear data. Please try again.");
    }
    println!("All session data has been cleared.");
    Ok(())
}
