//! Round timer and statistics core for the Dice Game app.
//!
//! A UI shell owns a [`GameSession`], forwards button taps to it and renders
//! the [`TimerSnapshot`]s and [`SessionReport`] it hands back.

pub mod models;
pub mod session;
pub mod settings;
pub mod stats;
pub mod timer;
pub mod utils;

pub use models::{FastestRound, RoundTiming, Team};
pub use session::{GameSession, RoundProgress, SessionReport};
pub use settings::GameSettings;
pub use timer::{TimerController, TimerSnapshot, TimerState, TimerStatus};
pub use utils::{format::format_seconds, logging::init_logging};

/// Entry point for shells: sets up logging and builds a session from the
/// optional settings file plus environment overrides.
pub fn start_session(settings_path: Option<&std::path::Path>) -> anyhow::Result<GameSession> {
    init_logging();

    let settings = match settings_path {
        Some(path) => GameSettings::load(path)?,
        None => GameSettings::default(),
    }
    .with_env_overrides();

    log::info!(
        "Dice timer session starting (tick {}ms, {}..={} players)",
        settings.tick_interval_ms,
        settings.min_players,
        settings.max_players
    );

    Ok(GameSession::new(settings))
}
