use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{TimerSnapshot, TimerState};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Samples the running stopwatch into its shared state cell until cancelled
/// or until the state leaves `Running`.
pub async fn sampling_loop(
    state: Arc<Mutex<TimerState>>,
    updates: Arc<watch::Sender<TimerSnapshot>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let heartbeat_every = heartbeat_every_ticks.max(1);
    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                log_info!("stopwatch sampler shutting down after {} ticks", ticks);
                break;
            }
            _ = ticker.tick() => {
                let snapshot = {
                    let mut guard = state.lock().await;
                    if !guard.is_running() {
                        break;
                    }
                    guard.sample();
                    TimerSnapshot::from(&*guard)
                };

                ticks = ticks.wrapping_add(1);
                if ticks % heartbeat_every == 0 {
                    log_debug!("stopwatch heartbeat: {}s", snapshot.display);
                }

                updates.send_replace(snapshot);
            }
        }
    }
}
