use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use log::{debug, error, info};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{models::Session, storage::SessionStore};

use super::{TimerCommand, TimerState, TimerStatus};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    StateChanged { state: TimerState },
    Heartbeat { state: TimerState },
    SessionFinished { session: Session },
    /// The finished session could not be written; the user should be told.
    StorageFailed { session_id: String },
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Drives a [`TimerState`] in real time and records every finished run.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    store: SessionStore,
    events: broadcast::Sender<TimerEvent>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl TimerController {
    pub fn new(store: SessionStore, initial: TimerState) -> Self {
        let debug_mode = std::env::var("FOCUSDECK_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(initial)),
            store,
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    pub async fn configure(
        &self,
        duration_secs: Option<u64>,
        category: Option<String>,
    ) -> Result<TimerState> {
        let snapshot = {
            let mut state = self.state.lock().await;
            if let Some(duration_secs) = duration_secs {
                state.set_duration(duration_secs)?;
            }
            if let Some(category) = category {
                state.set_category(category)?;
            }
            state.clone()
        };
        self.emit(TimerEvent::StateChanged {
            state: snapshot.clone(),
        });
        Ok(snapshot)
    }

    pub async fn start(&self) -> Result<TimerState> {
        let snapshot = self.dispatch(TimerCommand::Start).await?;
        self.spawn_ticker().await;
        info!(
            "Timer running: {}s remaining, category {}",
            snapshot.remaining_secs, snapshot.category
        );
        Ok(snapshot)
    }

    pub async fn pause(&self) -> Result<TimerState> {
        let snapshot = self.dispatch(TimerCommand::Pause).await?;
        self.cancel_ticker().await;
        Ok(snapshot)
    }

    pub async fn reset(&self) -> Result<TimerState> {
        self.cancel_ticker().await;
        self.dispatch(TimerCommand::Reset).await
    }

    pub async fn background_detected(&self) -> Result<TimerState> {
        self.dispatch(TimerCommand::BackgroundDetected).await
    }

    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
    }

    async fn dispatch(&self, command: TimerCommand) -> Result<TimerState> {
        let (transition, snapshot) = {
            let mut state = self.state.lock().await;
            let transition = state.apply(command, Utc::now())?;
            (transition, state.clone())
        };
        debug!("{command:?}: {:?} -> {:?}", transition.from, transition.to);

        if let Some(session) = transition.finished {
            record_session(&self.store, &self.events, session).await;
        }
        self.emit(TimerEvent::StateChanged {
            state: snapshot.clone(),
        });
        Ok(snapshot)
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.cancel_token.cancel();
            previous.handle.abort();
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(ticker_loop(
            self.state.clone(),
            self.store.clone(),
            self.events.clone(),
            cancel_token.clone(),
            self.tick_interval,
            self.heartbeat_every_ticks.max(1),
        ));

        *ticker_guard = Some(Ticker {
            handle,
            cancel_token,
        });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel_token.cancel();
            if let Err(err) = ticker.handle.await {
                if !err.is_cancelled() {
                    error!("Timer ticker task failed: {err}");
                }
            }
        }
    }

    fn emit(&self, event: TimerEvent) {
        let _ = self.events.send(event);
    }
}

async fn ticker_loop(
    state: Arc<Mutex<TimerState>>,
    store: SessionStore,
    events: broadcast::Sender<TimerEvent>,
    cancel_token: CancellationToken,
    tick_interval: Duration,
    heartbeat_every: u32,
) {
    let mut interval = time::interval_at(Instant::now() + tick_interval, tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = cancel_token.cancelled() => break,
        }

        let (transition, snapshot) = {
            let mut guard = state.lock().await;
            if guard.status != TimerStatus::Running {
                break;
            }
            match guard.apply(TimerCommand::Tick, Utc::now()) {
                Ok(transition) => (transition, guard.clone()),
                Err(err) => {
                    error!("Timer tick failed: {err:#}");
                    break;
                }
            }
        };

        if let Some(session) = transition.finished {
            info!("Session {} completed", session.id);
            record_session(&store, &events, session).await;
            let _ = events.send(TimerEvent::StateChanged { state: snapshot });
            break;
        }

        ticks = ticks.wrapping_add(1);
        if ticks % heartbeat_every == 0 {
            let _ = events.send(TimerEvent::Heartbeat { state: snapshot });
        }
    }
}

async fn record_session(
    store: &SessionStore,
    events: &broadcast::Sender<TimerEvent>,
    session: Session,
) {
    let session_id = session.id.clone();
    if !store.add(session.clone()).await {
        error!("Failed to persist session {session_id}");
        let _ = events.send(TimerEvent::StorageFailed { session_id });
    }
    let _ = events.send(TimerEvent::SessionFinished { session });
}
