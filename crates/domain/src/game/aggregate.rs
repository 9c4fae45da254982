//! Game aggregate implementation.

use chrono::{DateTime, Utc};
use common::GameId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::ApplyError;
use crate::inning::{EndingReason, GameSituation, InningTransition, half_label};

use super::{
    GameError, GameEvent, GameStatus, Score, TeamSide,
    events::{GameCompletedData, GameCreatedData, InningAdvancedData, ScoreUpdatedData},
};

/// Longest team name accepted.
pub const MAX_TEAM_NAME_LENGTH: usize = 50;

/// Game aggregate root.
///
/// Holds the scoreboard: status, score, and the half-inning in play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Unique game identifier.
    id: GameId,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    home_team_name: String,
    away_team_name: String,

    /// Current status of the game.
    status: GameStatus,

    score: Score,
    current_inning: u32,
    is_top_half: bool,

    /// Why the game ended, once completed.
    ending_reason: Option<EndingReason>,

    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Aggregate for Game {
    type Id = GameId;
    type Event = GameEvent;
    type Error = GameError;

    fn aggregate_type() -> &'static str {
        "Game"
    }

    fn id(&self) -> &GameId {
        &self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn initialize(event: GameEvent) -> Result<Self, ApplyError> {
        match event {
            GameEvent::GameCreated(data) => Ok(Self::from_created(data)),
            other => Err(ApplyError::new(format!(
                "game cannot start with {}",
                other.event_type()
            ))),
        }
    }

    fn apply(&mut self, event: GameEvent) -> Result<(), ApplyError> {
        match event {
            GameEvent::GameCreated(_) => Err(ApplyError::new("game already created")),
            GameEvent::GameStarted(data) => {
                self.status = GameStatus::InProgress;
                self.started_at = Some(data.occurred_at);
                Ok(())
            }
            GameEvent::ScoreUpdated(data) => self.apply_score_updated(data),
            GameEvent::InningAdvanced(data) => self.apply_inning_advanced(data),
            GameEvent::GameCompleted(data) => {
                self.apply_game_completed(data);
                Ok(())
            }
        }
    }
}

// Query methods
impl Game {
    pub fn home_team_name(&self) -> &str {
        &self.home_team_name
    }

    pub fn away_team_name(&self) -> &str {
        &self.away_team_name
    }

    /// Returns the name of one team.
    pub fn team_name(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => &self.home_team_name,
            TeamSide::Away => &self.away_team_name,
        }
    }

    /// Returns the current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn current_inning(&self) -> u32 {
        self.current_inning
    }

    pub fn is_top_half(&self) -> bool {
        self.is_top_half
    }

    /// The team at bat in the current half-inning.
    pub fn batting_team(&self) -> TeamSide {
        TeamSide::batting_in(self.is_top_half)
    }

    /// The leading team, or None when tied.
    pub fn leader(&self) -> Option<TeamSide> {
        self.score.leader()
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn ending_reason(&self) -> Option<EndingReason> {
        self.ending_reason
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Minutes played as of `now`, once the game has started.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> Option<u32> {
        self.started_at.map(|started| {
            let minutes = (now - started).num_minutes().max(0);
            u32::try_from(minutes).unwrap_or(u32::MAX)
        })
    }

    /// The facts a half-inning transition is evaluated against.
    pub fn situation(&self, now: DateTime<Utc>) -> GameSituation {
        GameSituation {
            score: self.score,
            elapsed_minutes: self.elapsed_minutes(now),
        }
    }
}

// Command methods (return events)
impl Game {
    /// Schedules a new game between two teams.
    pub fn create(
        id: GameId,
        home_team_name: &str,
        away_team_name: &str,
    ) -> Result<Vec<GameEvent>, GameError> {
        let home = validate_team_name(home_team_name)?;
        let away = validate_team_name(away_team_name)?;

        if home.eq_ignore_ascii_case(away) {
            return Err(GameError::SameTeamNames(home.to_string()));
        }

        Ok(vec![GameEvent::game_created(id, home, away)])
    }

    /// Starts the game.
    pub fn start(&self) -> Result<Vec<GameEvent>, GameError> {
        if !self.status.can_start() {
            return Err(GameError::InvalidStateTransition {
                current: self.status,
                action: "start",
            });
        }

        Ok(vec![GameEvent::game_started(self.id.clone())])
    }

    /// Adds runs to a team's total.
    pub fn record_runs(&self, team: TeamSide, runs: u32) -> Result<Vec<GameEvent>, GameError> {
        if !self.status.can_score() {
            return Err(GameError::InvalidStateTransition {
                current: self.status,
                action: "record runs",
            });
        }

        if runs == 0 {
            return Err(GameError::NoRuns);
        }

        let new_total = self
            .score
            .runs(team)
            .checked_add(runs)
            .ok_or(GameError::ScoreOverflow { team, runs })?;
        Ok(vec![GameEvent::score_updated(
            self.id.clone(),
            team,
            runs,
            new_total,
        )])
    }

    /// Moves the game on according to a half-inning transition.
    pub fn apply_transition(
        &self,
        transition: &InningTransition,
    ) -> Result<Vec<GameEvent>, GameError> {
        if !self.status.can_advance_inning() {
            return Err(GameError::InvalidStateTransition {
                current: self.status,
                action: "advance inning",
            });
        }

        let (inning, is_top_half) = transition.ending_half();
        if (inning, is_top_half) != (self.current_inning, self.is_top_half) {
            return Err(GameError::TransitionMismatch {
                transition: half_label(inning, is_top_half),
                current: half_label(self.current_inning, self.is_top_half),
            });
        }

        match transition {
            InningTransition::GameEnd {
                reason,
                final_score,
                ..
            } => {
                if *final_score != self.score {
                    return Err(GameError::ScoreMismatch {
                        expected: self.score,
                        found: *final_score,
                    });
                }
                Ok(vec![GameEvent::game_completed(
                    self.id.clone(),
                    *reason,
                    self.score,
                )])
            }
            InningTransition::HalfInning { inning, .. } => Ok(vec![GameEvent::inning_advanced(
                self.id.clone(),
                *inning,
                false,
            )]),
            InningTransition::FullInning { new_inning, .. } => Ok(vec![
                GameEvent::inning_advanced(self.id.clone(), *new_inning, true),
            ]),
            InningTransition::Failed { message, .. } => {
                Err(GameError::TransitionFailed(message.clone()))
            }
        }
    }

    /// Ends the game outside of a half-inning transition, e.g. a forfeit
    /// before the first pitch.
    pub fn complete(&self, reason: EndingReason) -> Result<Vec<GameEvent>, GameError> {
        if !self.status.can_complete() {
            return Err(GameError::InvalidStateTransition {
                current: self.status,
                action: "complete",
            });
        }

        Ok(vec![GameEvent::game_completed(
            self.id.clone(),
            reason,
            self.score,
        )])
    }
}

// Apply event helpers
impl Game {
    fn from_created(data: GameCreatedData) -> Self {
        Self {
            id: data.game_id,
            version: Version::initial(),
            home_team_name: data.home_team_name,
            away_team_name: data.away_team_name,
            status: GameStatus::NotStarted,
            score: Score::zero(),
            current_inning: 1,
            is_top_half: true,
            ending_reason: None,
            created_at: data.occurred_at,
            started_at: None,
            completed_at: None,
        }
    }

    fn apply_score_updated(&mut self, data: ScoreUpdatedData) -> Result<(), ApplyError> {
        let previous = self.score.runs(data.team);
        let score = self
            .score
            .with_runs_added(data.team, data.runs_added)
            .ok_or_else(|| {
                ApplyError::new(format!(
                    "{} total {} plus {} runs overflows",
                    data.team, previous, data.runs_added
                ))
            })?;
        if score.runs(data.team) != data.new_total {
            return Err(ApplyError::new(format!(
                "{} total {} plus {} runs does not equal {}",
                data.team, previous, data.runs_added, data.new_total
            )));
        }
        self.score = score;
        Ok(())
    }

    fn apply_inning_advanced(&mut self, data: InningAdvancedData) -> Result<(), ApplyError> {
        if data.inning == 0 {
            return Err(ApplyError::new("innings start at 1"));
        }
        self.current_inning = data.inning;
        self.is_top_half = data.is_top_half;
        Ok(())
    }

    fn apply_game_completed(&mut self, data: GameCompletedData) {
        self.status = GameStatus::Completed;
        self.ending_reason = Some(data.reason);
        self.completed_at = Some(data.occurred_at);
    }
}

fn validate_team_name(name: &str) -> Result<&str, GameError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_TEAM_NAME_LENGTH {
        return Err(GameError::InvalidTeamName(name.to_string()));
    }
    Ok(trimmed)
}
