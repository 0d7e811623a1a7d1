use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::models::Session;
use crate::stats::{self, CategoryShare, DailySeries};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    pub focus_time_secs: u64,
    pub sessions: usize,
    pub distractions: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllTimeStats {
    pub focus_time_secs: u64,
    pub sessions: usize,
    pub distractions: u64,
    pub average_focus_time_secs: u64,
    pub average_distractions: f64,
}

/// Everything the reports view shows, computed from one snapshot.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub today: TodayStats,
    pub all_time: AllTimeStats,
    pub last_7_days: DailySeries,
    pub categories: Vec<CategoryShare>,
    pub has_weekly_data: bool,
    pub has_category_data: bool,
}

impl Report {
    pub fn build<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> Self {
        let last_7_days = stats::last_7_days_series(sessions, now);
        let categories = stats::category_distribution(sessions);

        Self {
            today: TodayStats {
                focus_time_secs: stats::today_focus_time(sessions, now),
                sessions: stats::today_sessions_count(sessions, now),
                distractions: stats::today_distractions(sessions, now),
            },
            all_time: AllTimeStats {
                focus_time_secs: stats::total_focus_time(sessions),
                sessions: stats::completed_sessions_count(sessions),
                distractions: stats::total_distractions(sessions),
                average_focus_time_secs: stats::average_focus_time(sessions),
                average_distractions: stats::average_distractions(sessions),
            },
            has_weekly_data: last_7_days.has_data(),
            has_category_data: !categories.is_empty(),
            last_7_days,
            categories,
        }
    }

    /// Plain-text rendering used by the `report` command.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("Today\n");
        out.push_str(&format!(
            "  Focus time:    {}\n  Sessions:      {}\n  Distractions:  {}\n\n",
            stats::format_duration(self.today.focus_time_secs),
            self.today.sessions,
            self.today.distractions
        ));

        out.push_str("All time\n");
        out.push_str(&format!(
            "  Focus time:    {}\n  Sessions:      {}\n  Distractions:  {}\n  Avg session:   {}\n  Avg distractions: {:.1}\n\n",
            stats::format_duration(self.all_time.focus_time_secs),
            self.all_time.sessions,
            self.all_time.distractions,
            stats::format_duration(self.all_time.average_focus_time_secs),
            self.all_time.average_distractions
        ));

        out.push_str("Last 7 days (minutes)\n");
        if self.has_weekly_data {
            for (label, minutes) in self
                .last_7_days
                .day_labels
                .iter()
                .zip(&self.last_7_days.minutes_per_day)
            {
                out.push_str(&format!("  {label}  {minutes:>4}\n"));
            }
        } else {
            out.push_str("  No focus sessions yet\n");
        }
        out.push('\n');

        out.push_str("Categories\n");
        if self.has_category_data {
            for share in &self.categories {
                out.push_str(&format!(
                    "  {:<16} {:>4}m  {:>5.1}%\n",
                    share.category, share.minutes, share.percentage_of_total
                ));
            }
        } else {
            out.push_str("  No category data yet\n");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn report_for_mixed_sessions() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 18, 0, 0).unwrap();
        let sessions = vec![
            Session::finished(1500, "Coding", 1, now, true),
            Session::finished(900, "Reading", 0, now, true),
            Session::finished(600, "Coding", 4, now, false),
        ];

        let report = Report::build(&sessions, &now);
        assert_eq!(report.today.focus_time_secs, 2400);
        assert_eq!(report.today.sessions, 2);
        assert_eq!(report.all_time.distractions, 1);
        assert_eq!(report.all_time.average_focus_time_secs, 1200);
        assert_eq!(report.all_time.average_distractions, 0.5);
        assert_eq!(report.last_7_days.minutes_per_day[6], 40);
        assert_eq!(report.categories.len(), 2);
        assert!(report.has_weekly_data);
        assert!(report.has_category_data);

        let text = report.render();
        assert!(text.contains("Focus time:    40m"));
        assert!(text.contains("Coding"));
    }

    #[test]
    fn empty_report_flags_no_data() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 18, 0, 0).unwrap();
        let report = Report::build(&[], &now);

        assert!(!report.has_weekly_data);
        assert!(!report.has_category_data);
        assert_eq!(report.last_7_days.day_labels.len(), 7);
        assert!(report.render().contains("No focus sessions yet"));
    }

    #[test]
    fn oversized_history_still_builds_and_renders() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 18, 0, 0).unwrap();
        let sessions: Vec<Session> = serde_json::from_str(
            r#"[
                {"id":"a","duration":1e30,"distractions":1e30,"timestamp":"2024-05-15T10:00:00Z","completed":true},
                {"id":"b","duration":600,"timestamp":"2024-05-15T11:00:00Z","completed":true}
            ]"#,
        )
        .unwrap();

        let report = Report::build(&sessions, &now);
        assert_eq!(report.all_time.focus_time_secs, u64::MAX);
        assert_eq!(report.today.focus_time_secs, u64::MAX);
        assert_eq!(report.all_time.distractions, u64::MAX);
        assert_eq!(report.categories.len(), 1);
        assert!(report.render().contains("Uncategorized"));
    }

    #[test]
    fn serializes_camel_case() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 18, 0, 0).unwrap();
        let value = serde_json::to_value(Report::build(&[], &now)).unwrap();
        assert!(value["allTime"]["averageFocusTimeSecs"].is_number());
        assert!(value["last7Days"]["dayLabels"].is_array());
    }
}
