pub mod controller;
pub mod state;
mod ticker;

pub use controller::{TimerController, TimerSnapshot};
pub use state::{TimerState, TimerStatus};
