//! Statistics engine: pure reductions over a snapshot of stored sessions.
//!
//! Nothing here performs I/O or reads the wall clock; callers pass the
//! reference instant used for "today" and the weekly window.

mod calculations;
mod charts;

pub use calculations::{
    average_distractions, average_focus_time, completed_sessions_count, format_duration,
    today_distractions, today_focus_time, today_sessions_count, total_distractions,
    total_focus_time,
};
pub use charts::{category_distribution, last_7_days_series, CategoryShare, DailySeries, WEEK_DAYS};
