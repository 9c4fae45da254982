//! Game aggregate and related types.

mod aggregate;
mod events;
mod state;
mod value_objects;

pub use aggregate::{Game, MAX_TEAM_NAME_LENGTH};
pub use events::{
    GameCompletedData, GameCreatedData, GameEvent, GameStartedData, InningAdvancedData,
    ScoreUpdatedData,
};
pub use state::GameStatus;
pub use value_objects::{Score, TeamSide};

use thiserror::Error;

/// Errors that can occur during game operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// Game is not in the expected status.
    #[error("Invalid state transition: cannot {action} from {current} status")]
    InvalidStateTransition {
        current: GameStatus,
        action: &'static str,
    },

    /// Team name was empty or too long.
    #[error("Invalid team name: '{0}'")]
    InvalidTeamName(String),

    /// Both teams have the same name.
    #[error("Home and away teams are both named '{0}'")]
    SameTeamNames(String),

    /// A score update must add at least one run.
    #[error("A score update must add at least one run")]
    NoRuns,

    /// Adding the runs would overflow the team's total.
    #[error("Adding {runs} runs overflows the {team} total")]
    ScoreOverflow { team: TeamSide, runs: u32 },

    /// The half-inning could not end.
    #[error("Transition failed: {0}")]
    TransitionFailed(String),

    /// The transition ends a different half-inning than the one in play.
    #[error("Transition ends the {transition}, but the {current} is in play")]
    TransitionMismatch { transition: String, current: String },

    /// The transition was evaluated against a different score.
    #[error("Transition final score {found} does not match the game score {expected}")]
    ScoreMismatch { expected: Score, found: Score },
}
