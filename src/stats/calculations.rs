//! Scalar statistics over a snapshot of stored sessions.
//!
//! Every function only looks at completed sessions and treats missing
//! numeric fields as zero. "Today" means the calendar date of the supplied
//! reference instant, in that instant's timezone.

use chrono::{DateTime, TimeZone, Utc};

use crate::models::Session;

fn completed(sessions: &[Session]) -> impl Iterator<Item = &Session> {
    sessions.iter().filter(|session| session.completed)
}

fn completed_today<'a, Tz: TimeZone>(
    sessions: &'a [Session],
    now: &'a DateTime<Tz>,
) -> impl Iterator<Item = &'a Session> {
    completed(sessions).filter(move |session| is_same_day(session.timestamp.as_ref(), now))
}

pub(crate) fn is_same_day<Tz: TimeZone>(timestamp: Option<&DateTime<Utc>>, now: &DateTime<Tz>) -> bool {
    timestamp.is_some_and(|ts| ts.with_timezone(&now.timezone()).date_naive() == now.date_naive())
}

/// Sums without wrapping. Decoded counts can be as large as `u64::MAX`.
pub(crate) fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Sum of `duration` (seconds) over completed sessions.
pub fn total_focus_time(sessions: &[Session]) -> u64 {
    saturating_sum(completed(sessions).map(Session::duration_secs))
}

pub fn today_focus_time<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> u64 {
    saturating_sum(completed_today(sessions, now).map(Session::duration_secs))
}

pub fn total_distractions(sessions: &[Session]) -> u64 {
    saturating_sum(completed(sessions).map(Session::distraction_count))
}

pub fn today_distractions<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> u64 {
    saturating_sum(completed_today(sessions, now).map(Session::distraction_count))
}

pub fn completed_sessions_count(sessions: &[Session]) -> usize {
    completed(sessions).count()
}

pub fn today_sessions_count<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> usize {
    completed_today(sessions, now).count()
}

/// Mean focus seconds per completed session, rounded to the nearest second.
pub fn average_focus_time(sessions: &[Session]) -> u64 {
    let count = completed_sessions_count(sessions);
    if count == 0 {
        return 0;
    }
    (total_focus_time(sessions) as f64 / count as f64).round() as u64
}

/// Mean distractions per completed session, rounded to one decimal place.
pub fn average_distractions(sessions: &[Session]) -> f64 {
    let count = completed_sessions_count(sessions);
    if count == 0 {
        return 0.0;
    }
    round_to_tenth(total_distractions(sessions) as f64 / count as f64)
}

/// Human label such as `"2h 30m"`, `"1h"` or `"45m"`. Leftover seconds are dropped.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 && minutes > 0 {
        format!("{hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h")
    } else {
        format!("{minutes}m")
    }
}
