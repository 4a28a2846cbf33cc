//! Team and per-round timing ledger.
//!
//! Round numbers are 1-based everywhere in the public API; `rounds[0]` holds
//! round 1. The sequence grows lazily as rounds are recorded.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stats;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundTiming {
    pub first_dice_time: Option<f64>,
    /// Only ever set while `first_dice_time` is present.
    pub last_dice_time: Option<f64>,
}

impl RoundTiming {
    pub fn duration(&self) -> Option<f64> {
        match (self.first_dice_time, self.last_dice_time) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.duration().is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FastestRound {
    pub round: usize,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub player_count: u32,
    pub rounds: Vec<RoundTiming>,
}

impl Team {
    pub fn new(name: impl Into<String>, player_count: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            player_count,
            rounds: Vec::new(),
        }
    }

    /// Returns the slot for `round`, growing the ledger with empty rounds as
    /// needed. Round 0 has no slot.
    fn round_slot(&mut self, round: usize) -> Option<&mut RoundTiming> {
        if round == 0 {
            return None;
        }
        if self.rounds.len() < round {
            self.rounds.resize(round, RoundTiming::default());
        }
        self.rounds.get_mut(round - 1)
    }

    pub fn record_first_dice(&mut self, time: f64, round: usize) {
        if let Some(slot) = self.round_slot(round) {
            slot.first_dice_time = Some(time);
        }
    }

    /// Ignored unless the first dice of `round` has already been recorded.
    pub fn record_last_dice(&mut self, time: f64, round: usize) {
        if let Some(slot) = self.round_slot(round) {
            if slot.first_dice_time.is_some() {
                slot.last_dice_time = Some(time);
            }
        }
    }

    pub fn reset_rounds(&mut self) {
        self.rounds.clear();
    }

    pub fn round(&self, round: usize) -> Option<&RoundTiming> {
        round.checked_sub(1).and_then(|index| self.rounds.get(index))
    }

    pub fn has_finished_round(&self, round: usize) -> bool {
        self.round(round)
            .map_or(false, |timing| timing.last_dice_time.is_some())
    }

    /// First dice thrown, last dice not yet.
    pub fn is_rolling(&self, round: usize) -> bool {
        self.round(round).map_or(false, |timing| {
            timing.first_dice_time.is_some() && timing.last_dice_time.is_none()
        })
    }

    pub fn completed_durations(&self) -> Vec<f64> {
        self.rounds.iter().filter_map(RoundTiming::duration).collect()
    }

    pub fn average_duration(&self) -> Option<f64> {
        stats::mean(&self.completed_durations())
    }

    pub fn standard_deviation(&self) -> Option<f64> {
        stats::sample_std_dev(&self.completed_durations())
    }

    pub fn fastest_round(&self) -> Option<FastestRound> {
        let (rounds, durations): (Vec<usize>, Vec<f64>) = self
            .rounds
            .iter()
            .enumerate()
            .filter_map(|(index, timing)| timing.duration().map(|d| (index + 1, d)))
            .unzip();

        stats::fastest(&durations).map(|(index, duration)| FastestRound {
            round: rounds[index],
            duration,
        })
    }

    pub fn average_per_person(&self) -> Option<f64> {
        if self.player_count == 0 {
            return None;
        }
        self.average_duration()
            .map(|avg| avg / f64::from(self.player_count))
    }
}
