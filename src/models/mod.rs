pub mod team;

pub use team::{FastestRound, RoundTiming, Team};
