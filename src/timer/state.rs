use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    /// Last sampled elapsed time. Only the sampler, `pause` and `resume` move it.
    pub elapsed_secs: f64,
    pub started_at: Option<DateTime<Utc>>,
    /// Seconds carried over from earlier running windows; combines with
    /// `running_anchor` to compute the live elapsed value.
    #[serde(skip)]
    pub elapsed_baseline_secs: f64,
    #[serde(skip)]
    pub running_anchor: Option<Instant>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            status: TimerStatus::Idle,
            elapsed_secs: 0.0,
            started_at: None,
            elapsed_baseline_secs: 0.0,
            running_anchor: None,
        }
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Elapsed time as of right now, without touching the sampled value.
    pub fn live_elapsed_secs(&self) -> f64 {
        if let (TimerStatus::Running, Some(anchor)) = (self.status, self.running_anchor) {
            self.elapsed_baseline_secs + anchor.elapsed().as_secs_f64()
        } else {
            self.elapsed_secs
        }
    }

    pub fn sample(&mut self) {
        if self.is_running() {
            self.elapsed_secs = self.live_elapsed_secs();
        }
    }

    pub fn begin(&mut self, start_at: DateTime<Utc>, now: Instant) {
        *self = Self {
            status: TimerStatus::Running,
            elapsed_secs: 0.0,
            started_at: Some(start_at),
            elapsed_baseline_secs: 0.0,
            running_anchor: Some(now),
        };
    }

    /// Freezes at the last sampled value.
    pub fn stop(&mut self) {
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Stopped;
        }
        self.running_anchor = None;
        self.elapsed_baseline_secs = self.elapsed_secs;
    }

    /// Freezes at the elapsed value as of the call.
    pub fn pause(&mut self) {
        self.sample();
        self.stop();
    }

    pub fn resume(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        self.status = TimerStatus::Running;
        self.elapsed_baseline_secs = self.elapsed_secs;
        self.running_anchor = Some(now);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
