//! Domain layer for the softball game-state engine.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits with a shared reconstruction engine
//! - Game, TeamLineup, and InningState aggregates and their events
//! - SoftballRules, the configuration every rule check reads from
//! - Half-inning transition evaluation (three outs, mercy, walk-off, time limit)
//! - AggregateRepository for loading and saving through an event store

pub mod aggregate;
pub mod error;
pub mod game;
pub mod inning;
pub mod lineup;
pub mod repository;
pub mod rules;

pub use aggregate::{Aggregate, DomainEvent};
pub use error::{ApplyError, ConfigurationError, DomainError, ReconstructionError};
pub use game::{Game, GameError, GameEvent, GameStatus, Score, TeamSide};
pub use inning::{
    AtBatPlay, AtBatResult, Base, BasesState, EndingReason, GameSituation, InningError,
    InningState, InningStateEvent, InningTransition, RunnerDestination, RunnerOutcome,
    TransitionKind, evaluate_half_inning_end,
};
pub use lineup::{
    BattingSlotState, DetailedStrategy, FieldPosition, JerseyNumber, LineupError,
    LineupErrorCategory, LineupPlayer, LineupStrategy, SimpleStrategy, StrategyKind,
    TeamLineup, TeamLineupEvent, TeamStrategy,
};
pub use repository::{AggregateRepository, CommandResult};
pub use rules::{MIN_LINEUP_SIZE, MercyRuleTier, SoftballRules};
