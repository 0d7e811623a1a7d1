use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::categories::DEFAULT_CATEGORIES;
use crate::models::Session;

pub const DEFAULT_DURATION_SECS: u64 = 25 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerCommand {
    Start,
    Pause,
    Reset,
    Tick,
    BackgroundDetected,
}

/// Outcome of applying one command.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: TimerStatus,
    pub to: TimerStatus,
    /// Set when the command ended a run, either by completion or by reset.
    pub finished: Option<Session>,
}

impl Transition {
    fn unchanged(status: TimerStatus) -> Self {
        Self {
            from: status,
            to: status,
            finished: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub duration_secs: u64,
    pub remaining_secs: u64,
    pub category: String,
    pub distractions: u64,
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS, DEFAULT_CATEGORIES[0])
    }
}

impl TimerState {
    pub fn new(duration_secs: u64, category: impl Into<String>) -> Self {
        Self {
            status: TimerStatus::Idle,
            duration_secs,
            remaining_secs: duration_secs,
            category: category.into(),
            distractions: 0,
            started_at: None,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.duration_secs.saturating_sub(self.remaining_secs)
    }

    pub fn is_configurable(&self) -> bool {
        matches!(self.status, TimerStatus::Idle | TimerStatus::Completed)
    }

    pub fn set_duration(&mut self, duration_secs: u64) -> Result<()> {
        if duration_secs == 0 {
            bail!("duration must be greater than zero");
        }
        if !self.is_configurable() {
            bail!("cannot change duration while a session is in progress");
        }
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        self.status = TimerStatus::Idle;
        Ok(())
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> Result<()> {
        if !self.is_configurable() {
            bail!("cannot change category while a session is in progress");
        }
        self.category = category.into();
        Ok(())
    }

    pub fn apply(&mut self, command: TimerCommand, now: DateTime<Utc>) -> Result<Transition> {
        let from = self.status;
        let finished = match command {
            TimerCommand::Start => {
                self.start(now)?;
                None
            }
            TimerCommand::Pause => {
                if from != TimerStatus::Running {
                    return Err(anyhow!("cannot pause a timer that is {from:?}"));
                }
                self.status = TimerStatus::Paused;
                None
            }
            TimerCommand::Tick => {
                if from != TimerStatus::Running {
                    return Ok(Transition::unchanged(from));
                }
                self.tick(now)
            }
            TimerCommand::BackgroundDetected => {
                if from == TimerStatus::Running {
                    self.distractions += 1;
                }
                None
            }
            TimerCommand::Reset => self.reset(now),
        };

        Ok(Transition {
            from,
            to: self.status,
            finished,
        })
    }

    fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        match self.status {
            TimerStatus::Running => bail!("timer already running"),
            TimerStatus::Paused => {}
            TimerStatus::Idle | TimerStatus::Completed => {
                if self.duration_secs == 0 {
                    bail!("duration must be greater than zero");
                }
                self.remaining_secs = self.duration_secs;
                self.distractions = 0;
                self.started_at = Some(now);
            }
        }
        self.status = TimerStatus::Running;
        Ok(())
    }

    fn tick(&mut self, now: DateTime<Utc>) -> Option<Session> {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        self.status = TimerStatus::Completed;
        Some(Session::finished(
            self.duration_secs,
            self.category.clone(),
            self.distractions,
            now,
            true,
        ))
    }

    fn reset(&mut self, now: DateTime<Utc>) -> Option<Session> {
        let in_progress = matches!(self.status, TimerStatus::Running | TimerStatus::Paused);
        let elapsed = self.elapsed_secs();

        let abandoned = (in_progress && elapsed > 0).then(|| {
            Session::finished(elapsed, self.category.clone(), self.distractions, now, false)
        });

        self.status = TimerStatus::Idle;
        self.remaining_secs = self.duration_secs;
        self.distractions = 0;
        self.started_at = None;
        abandoned
    }
}

/// `MM:SS` countdown display. Minutes are not wrapped into hours.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap()
    }

    fn run_ticks(state: &mut TimerState, ticks: u64) -> Vec<Transition> {
        (1..=ticks)
            .map(|i| {
                state
                    .apply(TimerCommand::Tick, t0() + Duration::seconds(i as i64))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn countdown_completes_and_yields_session() {
        let mut state = TimerState::new(3, "Coding");
        state.apply(TimerCommand::Start, t0()).unwrap();
        state.apply(TimerCommand::BackgroundDetected, t0()).unwrap();

        let transitions = run_ticks(&mut state, 3);
        assert!(transitions[..2].iter().all(|t| t.finished.is_none()));

        let last = &transitions[2];
        assert_eq!(last.from, TimerStatus::Running);
        assert_eq!(last.to, TimerStatus::Completed);
        let session = last.finished.as_ref().unwrap();
        assert!(session.completed);
        assert_eq!(session.duration_secs(), 3);
        assert_eq!(session.category_name(), "Coding");
        assert_eq!(session.distraction_count(), 1);
        assert_eq!(session.timestamp, Some(t0() + Duration::seconds(3)));
    }

    #[test]
    fn pause_freezes_countdown_and_resume_continues() {
        let mut state = TimerState::new(10, "Reading");
        state.apply(TimerCommand::Start, t0()).unwrap();
        run_ticks(&mut state, 4);

        state.apply(TimerCommand::Pause, t0()).unwrap();
        assert_eq!(state.status, TimerStatus::Paused);
        let paused_tick = state.apply(TimerCommand::Tick, t0()).unwrap();
        assert_eq!(paused_tick.from, paused_tick.to);
        assert_eq!(state.remaining_secs, 6);

        state.apply(TimerCommand::Start, t0()).unwrap();
        assert_eq!(state.status, TimerStatus::Running);
        assert_eq!(state.remaining_secs, 6);
        assert_eq!(state.started_at, Some(t0()));
    }

    #[test]
    fn distractions_only_count_while_running() {
        let mut state = TimerState::new(10, "Coding");
        state.apply(TimerCommand::BackgroundDetected, t0()).unwrap();
        state.apply(TimerCommand::Start, t0()).unwrap();
        state.apply(TimerCommand::BackgroundDetected, t0()).unwrap();
        state.apply(TimerCommand::Pause, t0()).unwrap();
        state.apply(TimerCommand::BackgroundDetected, t0()).unwrap();

        assert_eq!(state.distractions, 1);
    }

    #[test]
    fn reset_mid_run_yields_abandoned_session() {
        let mut state = TimerState::new(1500, "Project");
        state.apply(TimerCommand::Start, t0()).unwrap();
        state.apply(TimerCommand::BackgroundDetected, t0()).unwrap();
        run_ticks(&mut state, 90);
        state.apply(TimerCommand::Pause, t0()).unwrap();

        let transition = state.apply(TimerCommand::Reset, t0()).unwrap();
        assert_eq!(transition.to, TimerStatus::Idle);
        let session = transition.finished.unwrap();
        assert!(!session.completed);
        assert_eq!(session.duration_secs(), 90);
        assert_eq!(session.distraction_count(), 1);

        assert_eq!(state.remaining_secs, 1500);
        assert_eq!(state.distractions, 0);
        assert_eq!(state.started_at, None);
    }

    #[test]
    fn reset_without_progress_records_nothing() {
        let mut state = TimerState::new(60, "Coding");
        assert!(state
            .apply(TimerCommand::Reset, t0())
            .unwrap()
            .finished
            .is_none());

        state.apply(TimerCommand::Start, t0()).unwrap();
        assert!(state
            .apply(TimerCommand::Reset, t0())
            .unwrap()
            .finished
            .is_none());
    }

    #[test]
    fn reset_after_completion_records_nothing() {
        let mut state = TimerState::new(1, "Coding");
        state.apply(TimerCommand::Start, t0()).unwrap();
        run_ticks(&mut state, 1);
        assert_eq!(state.status, TimerStatus::Completed);

        let transition = state.apply(TimerCommand::Reset, t0()).unwrap();
        assert!(transition.finished.is_none());
        assert_eq!(state.status, TimerStatus::Idle);
    }

    #[test]
    fn start_after_completion_begins_fresh_run() {
        let mut state = TimerState::new(2, "Coding");
        state.apply(TimerCommand::Start, t0()).unwrap();
        state.apply(TimerCommand::BackgroundDetected, t0()).unwrap();
        run_ticks(&mut state, 2);

        state.apply(TimerCommand::Start, t0()).unwrap();
        assert_eq!(state.status, TimerStatus::Running);
        assert_eq!(state.remaining_secs, 2);
        assert_eq!(state.distractions, 0);
    }

    #[test]
    fn invalid_commands_are_rejected() {
        let mut state = TimerState::new(60, "Coding");
        assert!(state.apply(TimerCommand::Pause, t0()).is_err());

        state.apply(TimerCommand::Start, t0()).unwrap();
        assert!(state.apply(TimerCommand::Start, t0()).is_err());
        assert!(state.set_duration(120).is_err());
        assert!(state.set_category("Reading").is_err());
    }

    #[test]
    fn configuration_applies_while_idle() {
        let mut state = TimerState::default();
        assert_eq!(state.duration_secs, DEFAULT_DURATION_SECS);

        assert!(state.set_duration(0).is_err());
        state.set_duration(600).unwrap();
        state.set_category("Reading").unwrap();
        assert_eq!(state.remaining_secs, 600);
        assert_eq!(state.category, "Reading");
    }

    #[test]
    fn clock_display() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(6000), "100:00");
    }
}
