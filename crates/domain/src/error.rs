//! Domain error types.

use common::IdentifierError;
use event_store::EventStoreError;
use thiserror::Error;

use crate::game::GameError;
use crate::inning::InningError;
use crate::lineup::LineupError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// An event stream could not be folded into an aggregate.
    #[error("Reconstruction error: {0}")]
    Reconstruction(#[from] ReconstructionError),

    /// Rules or slot configuration were invalid.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// An identifier failed validation.
    #[error("Identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    /// A game command was rejected.
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// A lineup operation was rejected.
    #[error("Lineup error: {0}")]
    Lineup(#[from] LineupError),

    /// An inning command was rejected.
    #[error("Inning error: {0}")]
    Inning(#[from] InningError),

    /// Aggregate not found.
    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Invalid rules or slot configuration. Always fatal to the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Batting slot outside `1..=max_players_per_team`.
    #[error("Invalid batting slot {slot}: must be between 1 and {max}")]
    InvalidBattingSlot { slot: u8, max: u8 },

    /// A rules value failed validation.
    #[error("Invalid rules: {0}")]
    InvalidRules(String),

    /// An environment variable held an unparsable value.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidSetting { key: &'static str, value: String },
}

/// An event payload that cannot be applied to the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ApplyError(String);

impl ApplyError {
    /// Creates an apply error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Errors raised while folding an event stream into an aggregate.
///
/// Reconstruction never yields a partially folded aggregate: any of these
/// fails the whole call.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    /// No events were supplied.
    #[error("Cannot reconstruct {aggregate_type} from an empty event stream")]
    EmptyEventStream { aggregate_type: &'static str },

    /// The stream did not start with the creation event.
    #[error("{aggregate_type} stream must start with {expected}, found {found}")]
    MissingCreationEvent {
        aggregate_type: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A creation event appeared after the start of the stream.
    #[error("{aggregate_type} stream has a second creation event at position {position}")]
    DuplicateCreationEvent {
        aggregate_type: &'static str,
        position: usize,
    },

    /// An event referenced a different aggregate than the creation event.
    #[error("Event at position {position} belongs to {found}, expected {expected}")]
    AggregateIdMismatch {
        expected: String,
        found: String,
        position: usize,
    },

    /// A stored envelope belongs to a different aggregate type.
    #[error("Envelope at position {position} is a {found} event, expected {expected}")]
    ForeignAggregateType {
        expected: &'static str,
        found: String,
        position: usize,
    },

    /// A stored envelope carried an event type this aggregate does not know.
    #[error("Unknown {aggregate_type} event type '{event_type}' at position {position}")]
    UnknownEventType {
        aggregate_type: &'static str,
        event_type: String,
        position: usize,
    },

    /// A stored payload could not be decoded.
    #[error("Failed to decode event at position {position}: {source}")]
    Decode {
        position: usize,
        #[source]
        source: serde_json::Error,
    },

    /// An event contradicted the state it was applied to.
    #[error("Invalid {event_type} event at position {position}: {reason}")]
    InvalidEvent {
        event_type: String,
        position: usize,
        reason: String,
    },
}
