pub mod controller;
pub mod state;

pub use controller::{TimerController, TimerEvent};
pub use state::{format_clock, TimerCommand, TimerState, TimerStatus, Transition, DEFAULT_DURATION_SECS};
