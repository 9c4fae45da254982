//! Game status state machine.

use serde::{Deserialize, Serialize};

/// The status of a game in its lifecycle.
///
/// State transitions:
/// ```text
/// NotStarted ──► InProgress ──► Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameStatus {
    /// Created, first pitch not thrown yet.
    #[default]
    NotStarted,

    /// Being played; scores and innings change.
    InProgress,

    /// Finished (terminal state).
    Completed,
}

impl GameStatus {
    /// Returns true if the game can start in this status.
    pub fn can_start(&self) -> bool {
        matches!(self, GameStatus::NotStarted)
    }

    /// Returns true if runs can be recorded in this status.
    pub fn can_score(&self) -> bool {
        matches!(self, GameStatus::InProgress)
    }

    /// Returns true if innings can advance in this status.
    pub fn can_advance_inning(&self) -> bool {
        matches!(self, GameStatus::InProgress)
    }

    /// Returns true if the game can be completed in this status.
    ///
    /// Forfeits may be declared before the first pitch.
    pub fn can_complete(&self) -> bool {
        matches!(self, GameStatus::NotStarted | GameStatus::InProgress)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Completed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::NotStarted => "NOT_STARTED",
            GameStatus::InProgress => "IN_PROGRESS",
            GameStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
