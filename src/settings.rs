use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

pub const TICK_ENV_VAR: &str = "DICE_TIMER_TICK_MS";
pub const DEBUG_ENV_VAR: &str = "DICE_TIMER_DEBUG";

/// Held by tests that touch the process environment.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Tunables for a game session. Read once at startup, never written back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// How often the running stopwatch is sampled.
    pub tick_interval_ms: u64,
    pub min_players: u32,
    pub max_players: u32,
    /// Logs a stopwatch heartbeat on every sample instead of every hundredth.
    pub debug: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            min_players: 1,
            max_players: 20,
            debug: false,
        }
    }
}

impl GameSettings {
    /// Reads settings from a JSON file. A missing file yields the defaults; a
    /// malformed one is logged and also yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!("Ignoring malformed settings in {}: {}", path.display(), err);
            Self::default()
        }))
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(tick_ms) = std::env::var(TICK_ENV_VAR)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
        {
            self.tick_interval_ms = tick_ms;
        }

        if let Ok(value) = std::env::var(DEBUG_ENV_VAR) {
            self.debug = value == "1" || value.eq_ignore_ascii_case("true");
        }

        self
    }

    /// Never zero; `tokio::time::interval` panics on a zero period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn allows_player_count(&self, player_count: u32) -> bool {
        (self.min_players..=self.max_players).contains(&player_count)
    }
}
