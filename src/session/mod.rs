//! The game session: teams, the current round and the shared stopwatch.
//!
//! A presentation shell owns one `GameSession` and drives it through method
//! calls. Stopwatch time is sampled here when a team records a dice event, and
//! the rules the UI gates its buttons on live here too.

pub mod report;

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::Team,
    settings::GameSettings,
    timer::TimerController,
};

pub use report::{build_report, RoundLine, RoundResult, RoundSummary, SessionReport, TeamSummary};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RoundProgress {
    InProgress,
    /// Every team has thrown its last dice; the stopwatch has been stopped.
    RoundComplete,
}

pub struct GameSession {
    settings: GameSettings,
    stopwatch: TimerController,
    teams: Vec<Team>,
    current_round: usize,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameSettings::default())
    }
}

impl GameSession {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            stopwatch: TimerController::new(&settings),
            settings,
            teams: Vec::new(),
            current_round: 1,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Shared handle; subscribe to it for the live elapsed display.
    pub fn stopwatch(&self) -> &TimerController {
        &self.stopwatch
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, id: Uuid) -> Option<&Team> {
        self.teams.iter().find(|team| team.id == id)
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn add_team(&mut self, name: &str, player_count: u32) -> Result<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            bail!("team name must not be empty");
        }
        if !self.settings.allows_player_count(player_count) {
            bail!(
                "player count {} outside {}..={}",
                player_count,
                self.settings.min_players,
                self.settings.max_players
            );
        }

        let team = Team::new(name, player_count);
        let id = team.id;
        log_info!("added team {} ({} players) as {}", name, player_count, id);
        self.teams.push(team);
        Ok(id)
    }

    pub fn remove_team(&mut self, id: Uuid) -> Result<Team> {
        let index = self
            .teams
            .iter()
            .position(|team| team.id == id)
            .ok_or_else(|| anyhow!("unknown team {}", id))?;

        let team = self.teams.remove(index);
        log_info!("removed team {}", team.name);
        Ok(team)
    }

    pub fn all_teams_finished(&self) -> bool {
        !self.teams.is_empty()
            && self
                .teams
                .iter()
                .all(|team| team.has_finished_round(self.current_round))
    }

    pub fn can_start_timer(&self) -> bool {
        !self.teams.is_empty() && !self.all_teams_finished()
    }

    /// Start/stop button. Returns whether the stopwatch is running afterwards.
    pub async fn toggle_timer(&mut self) -> Result<bool> {
        if self.stopwatch.is_running().await {
            self.stopwatch.stop().await;
            return Ok(false);
        }

        if !self.can_start_timer() {
            log_warn!("refusing to start round {} stopwatch", self.current_round);
            bail!("nothing to time in round {}", self.current_round);
        }

        self.stopwatch.start().await;
        Ok(true)
    }

    /// Stamps the team's first dice with the stopwatch's last sampled time.
    /// Refused once the team's first dice for this round is in.
    pub async fn record_first_dice(&mut self, team_id: Uuid) -> Result<f64> {
        let time = self.running_elapsed().await?;
        let round = self.current_round;
        let team = self.team_mut(team_id)?;

        if team.round(round).map_or(false, |t| t.first_dice_time.is_some()) {
            log_warn!("{} already threw first dice in round {}", team.name, round);
            bail!("{} already recorded first dice in round {}", team.name, round);
        }

        team.record_first_dice(time, round);
        log_info!("{} first dice at {:.2}s in round {}", team.name, time, round);
        Ok(time)
    }

    /// Stamps the team's last dice. Has no effect on the ledger if the team's
    /// first dice is missing, and is refused once the last dice is in.
    /// Stops the stopwatch once every team is done.
    pub async fn record_last_dice(&mut self, team_id: Uuid) -> Result<RoundProgress> {
        let time = self.running_elapsed().await?;
        let round = self.current_round;
        let team = self.team_mut(team_id)?;

        if team.has_finished_round(round) {
            log_warn!("{} already threw last dice in round {}", team.name, round);
            bail!("{} already recorded last dice in round {}", team.name, round);
        }

        team.record_last_dice(time, round);
        if team.has_finished_round(round) {
            log_info!("{} last dice at {:.2}s in round {}", team.name, time, round);
        }

        if self.all_teams_finished() {
            self.stopwatch.stop().await;
            log_info!("round {} complete", round);
            return Ok(RoundProgress::RoundComplete);
        }

        Ok(RoundProgress::InProgress)
    }

    pub async fn next_round(&mut self) -> Result<usize> {
        if !self.all_teams_finished() {
            bail!("round {} is not finished", self.current_round);
        }
        if self.stopwatch.is_running().await {
            bail!("stop the stopwatch before moving on");
        }

        self.current_round += 1;
        self.stopwatch.reset().await;
        log_info!("moved on to round {}", self.current_round);
        Ok(self.current_round)
    }

    /// Resets only the stopwatch; recorded times stay.
    pub async fn reset_current_round(&mut self) {
        self.stopwatch.reset().await;
    }

    pub async fn reset_all_rounds(&mut self) {
        self.current_round = 1;
        self.stopwatch.reset().await;
        for team in &mut self.teams {
            team.reset_rounds();
        }
        log_info!("cleared all rounds for {} teams", self.teams.len());
    }

    pub async fn reset_everything(&mut self) {
        self.current_round = 1;
        self.stopwatch.reset().await;
        self.teams.clear();
        log_info!("session reset");
    }

    pub fn report(&self) -> SessionReport {
        build_report(&self.teams, self.current_round)
    }

    async fn running_elapsed(&self) -> Result<f64> {
        let state = self.stopwatch.get_state().await;
        if !state.is_running() {
            bail!("stopwatch is not running");
        }
        Ok(state.elapsed_secs)
    }

    fn team_mut(&mut self, id: Uuid) -> Result<&mut Team> {
        self.teams
            .iter_mut()
            .find(|team| team.id == id)
            .ok_or_else(|| anyhow!("unknown team {}", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[test]
    fn add_team_validates_input() {
        let mut session = GameSession::default();

        assert!(session.add_team("   ", 3).is_err());
        assert!(session.add_team("Red", 0).is_err());
        assert!(session.add_team("Red", 21).is_err());

        let id = session.add_team("  Red  ", 3).unwrap();
        assert_eq!(session.team(id).unwrap().name, "Red");
        assert_eq!(session.teams().len(), 1);
    }

    #[test]
    fn remove_team_by_id() {
        let mut session = GameSession::default();
        let red = session.add_team("Red", 2).unwrap();
        session.add_team("Blue", 2).unwrap();

        let removed = session.remove_team(red).unwrap();
        assert_eq!(removed.name, "Red");
        assert_eq!(session.teams().len(), 1);
        assert!(session.remove_team(red).is_err());
    }

    #[tokio::test]
    async fn cannot_start_without_teams() {
        let mut session = GameSession::default();
        assert!(!session.can_start_timer());
        assert!(session.toggle_timer().await.is_err());
        assert!(!session.stopwatch().is_running().await);
    }

    #[tokio::test]
    async fn recording_requires_running_stopwatch() {
        let mut session = GameSession::default();
        let red = session.add_team("Red", 2).unwrap();

        assert!(session.record_first_dice(red).await.is_err());
        assert!(session.team(red).unwrap().rounds.is_empty());
    }

    #[tokio::test]
    async fn recording_unknown_team_fails() {
        let mut session = GameSession::default();
        session.add_team("Red", 2).unwrap();
        session.toggle_timer().await.unwrap();

        assert!(session.record_first_dice(Uuid::new_v4()).await.is_err());
        session.reset_current_round().await;
    }

    #[tokio::test]
    async fn last_team_finishing_stops_the_stopwatch() {
        let mut session = GameSession::default();
        let red = session.add_team("Red", 2).unwrap();
        let blue = session.add_team("Blue", 3).unwrap();

        assert!(session.toggle_timer().await.unwrap());
        session.record_first_dice(red).await.unwrap();
        session.record_first_dice(blue).await.unwrap();
        sleep(Duration::from_millis(30)).await;

        assert_eq!(
            session.record_last_dice(red).await.unwrap(),
            RoundProgress::InProgress
        );
        assert!(session.stopwatch().is_running().await);

        assert_eq!(
            session.record_last_dice(blue).await.unwrap(),
            RoundProgress::RoundComplete
        );
        assert!(!session.stopwatch().is_running().await);
        assert!(session.all_teams_finished());
        assert!(!session.can_start_timer());

        let duration = session.team(blue).unwrap().rounds[0].duration().unwrap();
        assert!(duration > 0.0);
    }

    #[tokio::test]
    async fn last_dice_before_first_is_ignored() {
        let mut session = GameSession::default();
        let red = session.add_team("Red", 2).unwrap();
        session.toggle_timer().await.unwrap();

        assert_eq!(
            session.record_last_dice(red).await.unwrap(),
            RoundProgress::InProgress
        );
        assert_eq!(session.team(red).unwrap().rounds[0].last_dice_time, None);
        assert!(session.stopwatch().is_running().await);
        session.reset_current_round().await;
    }

    #[tokio::test]
    async fn first_dice_cannot_be_recorded_twice() {
        let mut session = GameSession::default();
        let red = session.add_team("Red", 2).unwrap();
        session.add_team("Blue", 2).unwrap();
        session.toggle_timer().await.unwrap();

        let first = session.record_first_dice(red).await.unwrap();
        sleep(Duration::from_millis(30)).await;
        session.record_last_dice(red).await.unwrap();
        sleep(Duration::from_millis(30)).await;

        assert!(session.record_first_dice(red).await.is_err());

        let timing = session.team(red).unwrap().rounds[0];
        assert_eq!(timing.first_dice_time, Some(first));
        assert!(timing.duration().unwrap() >= 0.0);
        assert!(session.team(red).unwrap().average_duration().unwrap() >= 0.0);
        assert!(session.report().rounds[0]
            .results
            .iter()
            .all(|result| result.duration >= 0.0));
        session.reset_current_round().await;
    }

    #[tokio::test]
    async fn last_dice_cannot_be_recorded_twice() {
        let mut session = GameSession::default();
        let red = session.add_team("Red", 2).unwrap();
        session.add_team("Blue", 2).unwrap();
        session.toggle_timer().await.unwrap();

        session.record_first_dice(red).await.unwrap();
        sleep(Duration::from_millis(20)).await;
        session.record_last_dice(red).await.unwrap();
        let last = session.team(red).unwrap().rounds[0].last_dice_time;
        sleep(Duration::from_millis(30)).await;

        assert!(session.record_last_dice(red).await.is_err());
        assert_eq!(session.team(red).unwrap().rounds[0].last_dice_time, last);
        assert!(session.stopwatch().is_running().await);
        session.reset_current_round().await;
    }

    #[tokio::test]
    async fn next_round_only_after_completion() {
        let mut session = GameSession::default();
        let red = session.add_team("Red", 2).unwrap();
        assert!(session.next_round().await.is_err());

        session.toggle_timer().await.unwrap();
        session.record_first_dice(red).await.unwrap();
        session.record_last_dice(red).await.unwrap();

        assert_eq!(session.next_round().await.unwrap(), 2);
        assert_eq!(session.current_round(), 2);
        assert_eq!(session.stopwatch().elapsed_secs().await, 0.0);
        assert!(session.can_start_timer());
    }

    #[tokio::test]
    async fn reset_flavours() {
        let mut session = GameSession::default();
        let red = session.add_team("Red", 2).unwrap();
        session.toggle_timer().await.unwrap();
        session.record_first_dice(red).await.unwrap();
        session.record_last_dice(red).await.unwrap();
        session.next_round().await.unwrap();

        session.reset_current_round().await;
        assert_eq!(session.current_round(), 2);
        assert_eq!(session.team(red).unwrap().rounds.len(), 1);

        session.reset_all_rounds().await;
        assert_eq!(session.current_round(), 1);
        assert!(session.team(red).unwrap().rounds.is_empty());
        assert_eq!(session.teams().len(), 1);

        session.reset_everything().await;
        assert_eq!(session.current_round(), 1);
        assert!(session.teams().is_empty());
        assert!(!session.stopwatch().is_running().await);
    }
}
