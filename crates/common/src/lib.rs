//! Shared identifier types for the softball game-state workspace.

pub mod generator;
pub mod types;

pub use generator::{FnIdGenerator, IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use types::{
    GameId, IdentifierError, InningStateId, MAX_IDENTIFIER_LENGTH, PlayerId, TeamLineupId,
};
