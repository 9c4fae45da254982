//! Inning state aggregate, baserunners, and half-inning transitions.

mod aggregate;
mod bases;
mod events;
mod play;
mod transition;

pub use aggregate::InningState;
pub use bases::{Base, BasesState, RunnerDestination};
pub use events::{
    AtBatCompletedData, HalfInningEndedData, InningStateCreatedData, InningStateEvent,
    RunnerAdvancedData,
};
pub use play::{AtBatPlay, AtBatResult, RunnerMove, RunnerOutcome};
pub use transition::{
    EndingReason, GameSituation, InningTransition, OUTS_PER_HALF_INNING, TransitionKind,
    evaluate_half_inning_end,
};

use common::PlayerId;
use thiserror::Error;

use crate::error::ConfigurationError;

/// Errors that can occur during inning operations.
#[derive(Debug, Error)]
pub enum InningError {
    /// Innings are numbered from 1.
    #[error("Invalid inning {0}: innings start at 1")]
    InvalidInning(u32),

    /// The half-inning already has three outs.
    #[error("Half-inning is over with {outs} outs")]
    HalfInningOver { outs: u8 },

    /// The game has ended; nothing more can be recorded.
    #[error("Game is over")]
    GameOver,

    /// A move named a base with nobody on it.
    #[error("No runner on {0}")]
    EmptyBase(Base),

    /// A move named the wrong runner for a base.
    #[error("Runner on {base} is {found}, not {expected}")]
    RunnerMismatch {
        base: Base,
        expected: PlayerId,
        found: PlayerId,
    },

    /// Two runners would end up on the same base.
    #[error("{0} is already occupied")]
    BaseCollision(Base),

    /// A runner cannot retreat to an earlier base.
    #[error("Runner cannot move back from {from} to {to}")]
    BackwardMove { from: Base, to: Base },

    /// A play listed the same runner twice.
    #[error("More than one move given for the runner on {0}")]
    DuplicateRunnerMove(Base),

    /// The batter is already a runner.
    #[error("Batter {0} is already on base")]
    BatterOnBase(PlayerId),

    /// The wrong slot came to bat.
    #[error("Batting slot {found} is out of turn; slot {expected} is up")]
    OutOfTurn { expected: u8, found: u8 },

    /// A play would put the half-inning past three outs.
    #[error("Play would bring the half-inning to {outs} outs")]
    TooManyOuts { outs: u8 },

    /// RBI credited exceed what the statistics policy allows.
    #[error("{rbi} RBI credited for {runs} runs scored (tolerance {tolerance})")]
    InconsistentStatistics { rbi: u8, runs: u8, tolerance: u32 },

    /// The half-inning cannot end yet.
    #[error("Transition failed: {0}")]
    TransitionFailed(String),

    /// The transition ends a different half-inning than the one in play.
    #[error("Transition ends the {transition}, but the {current} is in play")]
    TransitionMismatch { transition: String, current: String },

    /// Invalid batting slot or rules.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Describes a half-inning, e.g. "top of 3".
pub(crate) fn half_label(inning: u32, is_top_half: bool) -> String {
    let half = if is_top_half { "top" } else { "bottom" };
    format!("{half} of {inning}")
}
