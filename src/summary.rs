//! Post-session summary shown when a run ends.

use serde::Serialize;

use crate::models::Session;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DistractionFeedback {
    PerfectFocus,
    GoodJob,
    KeepImproving,
    TryAgain,
}

impl DistractionFeedback {
    pub fn for_count(distractions: u64) -> Self {
        match distractions {
            0 => Self::PerfectFocus,
            1 => Self::GoodJob,
            2..=3 => Self::KeepImproving,
            _ => Self::TryAgain,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PerfectFocus => "Perfect Focus!",
            Self::GoodJob => "Good Job!",
            Self::KeepImproving => "Keep Improving",
            Self::TryAgain => "Try Again",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub duration: String,
    pub category: String,
    pub distractions: u64,
    pub feedback: DistractionFeedback,
    pub completed: bool,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            duration: format_summary_duration(session.duration_secs()),
            category: session.category_name().to_string(),
            distractions: session.distraction_count(),
            feedback: DistractionFeedback::for_count(session.distraction_count()),
            completed: session.completed,
        }
    }
}

/// `"25 min"`, `"1 min 30 sec"` or `"45 sec"`.
pub fn format_summary_duration(seconds: u64) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;

    match (mins, secs) {
        (0, secs) => format!("{secs} sec"),
        (mins, 0) => format!("{mins} min"),
        (mins, secs) => format!("{mins} min {secs} sec"),
    }
}
