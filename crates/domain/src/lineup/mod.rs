//! Team lineup aggregate and the strategies that govern substitutions.

mod aggregate;
mod detailed;
mod events;
mod position;
mod simple;
mod slots;
mod strategy;

pub use aggregate::{LineupPlayer, RosterEntry, SubstitutionRecord, TeamLineup};
pub use detailed::{DetailedStrategy, PlayerSubstitutionHistory, PositionChange};
pub use events::{
    FieldPositionChangedData, PlayerAddedToBenchData, PlayerAddedToLineupData,
    PlayerSubstitutedData, TeamLineupCreatedData, TeamLineupEvent,
};
pub use position::{BattingSlotState, FieldPosition, JerseyNumber};
pub use simple::SimpleStrategy;
pub use strategy::{LineupStrategy, StrategyKind, TeamStrategy};

use common::PlayerId;
use thiserror::Error;

use crate::error::ConfigurationError;

/// Errors that can occur during lineup operations.
#[derive(Debug, Error)]
pub enum LineupError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Invalid jersey number {0}: must be between 0 and 99")]
    InvalidJerseyNumber(u8),

    #[error("Team name cannot be empty")]
    InvalidTeamName,

    #[error("Player name cannot be empty")]
    InvalidPlayerName,

    /// The slot already has a player in it.
    #[error("Batting slot {slot} is already taken by {player_id}")]
    SlotOccupied { slot: u8, player_id: PlayerId },

    #[error("Batting slot {slot} is empty")]
    SlotEmpty { slot: u8 },

    /// The player already bats elsewhere in the order.
    #[error("Player {player_id} already bats in slot {slot}")]
    PlayerAlreadyInLineup { player_id: PlayerId, slot: u8 },

    /// A substitution named the wrong player as leaving.
    #[error("Batting slot {slot} holds {actual}, not {expected}")]
    OutgoingPlayerMismatch {
        slot: u8,
        expected: PlayerId,
        actual: PlayerId,
    },

    #[error("Player {0} is not in the lineup")]
    PlayerNotInLineup(PlayerId),

    #[error("Batting slot {0} is listed more than once")]
    DuplicateSlot(u8),

    #[error("Player {0} is listed more than once")]
    DuplicatePlayer(PlayerId),

    #[error("Player {0} is already on the roster")]
    PlayerAlreadyOnRoster(PlayerId),

    #[error("Jersey number {jersey_number} is already worn by {player_id}")]
    JerseyNumberInUse {
        jersey_number: JerseyNumber,
        player_id: PlayerId,
    },

    /// The player has used up their eligibility to come back in.
    #[error("Player {0} is not eligible to re-enter")]
    ReentryNotAllowed(PlayerId),
}

/// Broad grouping of lineup errors for callers that only need to know what
/// kind of rule was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineupErrorCategory {
    /// Bad rules, slot numbers, names, or jersey numbers.
    Configuration,
    /// Slot or roster occupancy conflicts.
    Occupancy,
    /// Re-entry eligibility.
    Eligibility,
}

impl LineupError {
    pub fn category(&self) -> LineupErrorCategory {
        match self {
            LineupError::Configuration(_)
            | LineupError::InvalidJerseyNumber(_)
            | LineupError::InvalidTeamName
            | LineupError::InvalidPlayerName
            | LineupError::DuplicateSlot(_)
            | LineupError::DuplicatePlayer(_) => LineupErrorCategory::Configuration,
            LineupError::SlotOccupied { .. }
            | LineupError::SlotEmpty { .. }
            | LineupError::PlayerAlreadyInLineup { .. }
            | LineupError::OutgoingPlayerMismatch { .. }
            | LineupError::PlayerNotInLineup(_)
            | LineupError::PlayerAlreadyOnRoster(_)
            | LineupError::JerseyNumberInUse { .. } => LineupErrorCategory::Occupancy,
            LineupError::ReentryNotAllowed(_) => LineupErrorCategory::Eligibility,
        }
    }
}
