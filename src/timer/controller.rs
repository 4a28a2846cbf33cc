use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{settings::GameSettings, utils::format::format_seconds};

use super::{ticker::sampling_loop, TimerState};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    /// Elapsed seconds with two decimals, as shown on the timer card.
    pub display: String,
}

impl From<&TimerState> for TimerSnapshot {
    fn from(state: &TimerState) -> Self {
        Self {
            display: format_seconds(state.elapsed_secs),
            state: state.clone(),
        }
    }
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// The session's stopwatch. Cloning shares the same underlying stopwatch.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    updates: Arc<watch::Sender<TimerSnapshot>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl Default for TimerController {
    fn default() -> Self {
        Self::new(&GameSettings::default())
    }
}

impl TimerController {
    pub fn new(settings: &GameSettings) -> Self {
        let state = TimerState::new();
        let (updates, _) = watch::channel(TimerSnapshot::from(&state));

        Self {
            state: Arc::new(Mutex::new(state)),
            ticker: Arc::new(Mutex::new(None)),
            updates: Arc::new(updates),
            tick_interval: settings.tick_interval(),
            heartbeat_every_ticks: if settings.debug { 1 } else { 100 },
        }
    }

    pub async fn get_state(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from(&*self.state.lock().await)
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.is_running()
    }

    /// Last sampled elapsed seconds.
    pub async fn elapsed_secs(&self) -> f64 {
        self.state.lock().await.elapsed_secs
    }

    /// Receives a snapshot on every sample and on every start/stop/reset.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.updates.subscribe()
    }

    /// Starts from zero. Calling this while running restarts the count.
    pub async fn start(&self) {
        self.cancel_ticker().await;

        {
            let mut state = self.state.lock().await;
            if state.is_running() {
                log_info!("stopwatch restarted while running at {:.2}s", state.elapsed_secs);
            }
            state.begin(Utc::now(), Instant::now());
        }

        self.spawn_ticker().await;
        log_info!("stopwatch started");
        self.publish().await;
    }

    pub async fn stop(&self) {
        self.cancel_ticker().await;

        let elapsed = {
            let mut state = self.state.lock().await;
            state.stop();
            state.elapsed_secs
        };

        log_info!("stopwatch stopped at {:.2}s", elapsed);
        self.publish().await;
    }

    pub async fn reset(&self) {
        self.cancel_ticker().await;
        self.state.lock().await.reset();
        log_info!("stopwatch reset");
        self.publish().await;
    }

    pub async fn pause(&self) {
        self.cancel_ticker().await;

        let elapsed = {
            let mut state = self.state.lock().await;
            state.pause();
            state.elapsed_secs
        };

        log_info!("stopwatch paused at {:.2}s", elapsed);
        self.publish().await;
    }

    pub async fn resume(&self) {
        self.cancel_ticker().await;

        let elapsed = {
            let mut state = self.state.lock().await;
            state.resume(Instant::now());
            state.elapsed_secs
        };

        self.spawn_ticker().await;
        log_info!("stopwatch resumed from {:.2}s", elapsed);
        self.publish().await;
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.handle.abort();
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(sampling_loop(
            self.state.clone(),
            self.updates.clone(),
            self.tick_interval,
            self.heartbeat_every_ticks,
            cancel_token.clone(),
        ));

        *ticker_guard = Some(Ticker {
            handle,
            cancel_token,
        });
    }

    /// Cancels the sampler and waits for it, so no sample lands after return.
    async fn cancel_ticker(&self) {
        let ticker = self.ticker.lock().await.take();
        if let Some(mut ticker) = ticker {
            ticker.cancel_token.cancel();
            if let Err(err) = (&mut ticker.handle).await {
                if !err.is_cancelled() {
                    log_error!("stopwatch sampler failed to join: {}", err);
                }
            }
        }
    }

    async fn publish(&self) {
        let snapshot = self.get_snapshot().await;
        self.updates.send_replace(snapshot);
    }
}
