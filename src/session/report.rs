//! Results-screen data: one summary per team and one per round.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::{FastestRound, Team},
    stats,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundLine {
    pub round: usize,
    pub first_dice_time: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
    pub player_count: u32,
    /// Completed rounds only.
    pub rounds: Vec<RoundLine>,
    pub average_duration: Option<f64>,
    pub standard_deviation: Option<f64>,
    pub fastest_round: Option<FastestRound>,
    pub average_per_person: Option<f64>,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        let rounds = team
            .rounds
            .iter()
            .enumerate()
            .filter_map(|(index, timing)| {
                let first_dice_time = timing.first_dice_time?;
                let duration = timing.duration()?;
                Some(RoundLine {
                    round: index + 1,
                    first_dice_time,
                    duration,
                })
            })
            .collect();

        Self {
            id: team.id,
            name: team.name.clone(),
            player_count: team.player_count,
            rounds,
            average_duration: team.average_duration(),
            standard_deviation: team.standard_deviation(),
            fastest_round: team.fastest_round(),
            average_per_person: team.average_per_person(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub team_id: Uuid,
    pub team_name: String,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub round: usize,
    /// Fastest first. Teams that did not complete the round are left out.
    pub results: Vec<RoundResult>,
    pub average_duration: Option<f64>,
    pub standard_deviation: Option<f64>,
}

impl RoundSummary {
    pub fn for_round(round: usize, teams: &[Team]) -> Self {
        let mut results: Vec<RoundResult> = teams
            .iter()
            .filter_map(|team| {
                let duration = team.round(round)?.duration()?;
                Some(RoundResult {
                    team_id: team.id,
                    team_name: team.name.clone(),
                    duration,
                })
            })
            .collect();
        results.sort_by(|a, b| a.duration.total_cmp(&b.duration));

        let durations: Vec<f64> = results.iter().map(|r| r.duration).collect();

        Self {
            round,
            average_duration: stats::mean(&durations),
            standard_deviation: stats::sample_std_dev(&durations),
            results,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub current_round: usize,
    pub teams: Vec<TeamSummary>,
    /// Rounds `1..=current_round`, in order. The round still being played is
    /// included with whatever results are in so far.
    pub rounds: Vec<RoundSummary>,
}

pub fn build_report(teams: &[Team], current_round: usize) -> SessionReport {
    SessionReport {
        current_round,
        teams: teams.iter().map(TeamSummary::from).collect(),
        rounds: (1..=current_round)
            .map(|round| RoundSummary::for_round(round, teams))
            .collect(),
    }
}
