use thiserror::Error;

use crate::Version;

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// A concurrency conflict occurred when appending events.
    /// The expected version did not match the actual version.
    #[error(
        "Concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: String,
        expected: Version,
        actual: Version,
    },

    /// The aggregate has no events in the store.
    #[error("Aggregate not found: {0}")]
    AggregateNotFound(String),

    /// The batch handed to `append` was malformed.
    #[error("Invalid append: {0}")]
    InvalidAppend(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
