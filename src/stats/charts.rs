//! Grouped series backing the weekly bar chart and the category pie chart.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::Session;

use super::calculations::round_to_tenth;

pub const WEEK_DAYS: usize = 7;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySeries {
    pub day_labels: Vec<String>,
    pub minutes_per_day: Vec<u64>,
}

impl DailySeries {
    pub fn has_data(&self) -> bool {
        self.minutes_per_day.iter().any(|minutes| *minutes > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: String,
    pub minutes: u64,
    pub percentage_of_total: f64,
}

fn seconds_to_rounded_minutes(seconds: u64) -> u64 {
    seconds.saturating_add(30) / 60
}

/// Focus minutes for each of the seven calendar days ending on `now`'s date, oldest first.
pub fn last_7_days_series<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> DailySeries {
    let today = now.date_naive();
    let tz = now.timezone();

    let days: Vec<NaiveDate> = (0..WEEK_DAYS as u64)
        .rev()
        .map(|offset| today.checked_sub_days(Days::new(offset)).unwrap_or(today))
        .collect();
    let mut seconds_per_day = vec![0u64; WEEK_DAYS];

    for session in sessions.iter().filter(|session| session.completed) {
        let Some(timestamp) = session.timestamp.as_ref() else {
            continue;
        };
        let date = timestamp.with_timezone(&tz).date_naive();
        if let Some(index) = days.iter().position(|day| *day == date) {
            seconds_per_day[index] = seconds_per_day[index].saturating_add(session.duration_secs());
        }
    }

    DailySeries {
        day_labels: days
            .iter()
            .map(|day| DAY_NAMES[day.weekday().num_days_from_sunday() as usize].to_string())
            .collect(),
        minutes_per_day: seconds_per_day
            .into_iter()
            .map(seconds_to_rounded_minutes)
            .collect(),
    }
}

/// Completed focus time grouped by category, largest first.
///
/// Percentages are taken against the total seconds, not the rounded minutes,
/// so they still add up to 100 when several small groups round down. An
/// empty result means there is nothing to chart.
pub fn category_distribution(sessions: &[Session]) -> Vec<CategoryShare> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, u64)> = Vec::new();
    let mut grand_total: u64 = 0;

    for session in sessions.iter().filter(|session| session.completed) {
        let category = session.category_name();
        let duration = session.duration_secs();
        let slot = *index.entry(category).or_insert_with(|| {
            totals.push((category, 0));
            totals.len() - 1
        });
        totals[slot].1 = totals[slot].1.saturating_add(duration);
        grand_total = grand_total.saturating_add(duration);
    }

    if grand_total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(category, seconds)| CategoryShare {
            category: category.to_string(),
            minutes: seconds_to_rounded_minutes(seconds),
            percentage_of_total: round_to_tenth(seconds as f64 / grand_total as f64 * 100.0),
        })
        .collect();

    // Stable sort keeps first-seen order between equal groups.
    shares.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    shares
}
