use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{EventEnvelope, EventStoreError, Result, Version};

/// Options for appending events to the store.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected version of the aggregate for optimistic concurrency control.
    /// If None, no version check is performed.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the aggregate to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the aggregate to not exist (new aggregate).
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// A stream of ordered event chunks for one aggregate.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Vec<EventEnvelope>>> + Send>>;

/// The append/load contract the domain consumes.
///
/// A stream is addressed by aggregate type and aggregate id together.
/// Implementations filter events per stream and return them in version
/// order; the domain never merges or reorders streams itself.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends events to the store.
    ///
    /// Events are appended atomically - either all succeed or none do.
    /// If `options.expected_version` is set, the operation fails with
    /// `ConcurrencyConflict` when the current version doesn't match.
    ///
    /// Returns the new version of the aggregate after appending.
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version>;

    /// Loads all events for an aggregate, oldest first.
    async fn load(&self, aggregate_type: &str, aggregate_id: &str) -> Result<Vec<EventEnvelope>>;

    /// Loads the events of an aggregate starting at `from_version` (inclusive).
    async fn load_from_version(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
        from_version: Version,
    ) -> Result<Vec<EventEnvelope>>;

    /// Gets the current version of an aggregate, or None if it has no events.
    async fn aggregate_version(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Option<Version>>;
}

/// Convenience methods available on every event store.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Appends a single event to the store.
    async fn append_event(&self, event: EventEnvelope, options: AppendOptions) -> Result<Version> {
        self.append(vec![event], options).await
    }

    /// Checks if an aggregate exists (has any events).
    async fn aggregate_exists(&self, aggregate_type: &str, aggregate_id: &str) -> Result<bool> {
        Ok(self
            .aggregate_version(aggregate_type, aggregate_id)
            .await?
            .is_some())
    }

    /// Loads an aggregate's events as a stream of in-order chunks.
    ///
    /// Concatenating the chunks yields exactly what `load` returns. This
    /// default reads the whole stream with `load` up front and then splits
    /// it, so it does not bound memory; a store backed by durable storage
    /// should override it to page through the stream.
    async fn stream_aggregate(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
        chunk_size: usize,
    ) -> Result<EventStream> {
        use futures_util::stream;

        if chunk_size == 0 {
            return Err(EventStoreError::InvalidAppend(
                "chunk size must be greater than zero".to_string(),
            ));
        }

        let events = self.load(aggregate_type, aggregate_id).await?;
        let chunks: Vec<Vec<EventEnvelope>> =
            events.chunks(chunk_size).map(<[_]>::to_vec).collect();
        Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Validates events before appending.
///
/// A batch must be non-empty, target a single aggregate of a single type, and
/// carry consecutive versions.
pub fn validate_events_for_append(events: &[EventEnvelope]) -> Result<()> {
    let Some(first) = events.first() else {
        return Err(EventStoreError::InvalidAppend(
            "Cannot append empty event list".to_string(),
        ));
    };

    for event in events.iter().skip(1) {
        if event.aggregate_id != first.aggregate_id {
            return Err(EventStoreError::InvalidAppend(
                "All events must be for the same aggregate".to_string(),
            ));
        }
        if event.aggregate_type != first.aggregate_type {
            return Err(EventStoreError::InvalidAppend(
                "All events must have the same aggregate type".to_string(),
            ));
        }
    }

    let mut expected_version = first.version;
    for event in events.iter().skip(1) {
        expected_version = expected_version.next();
        if event.version != expected_version {
            return Err(EventStoreError::InvalidAppend(format!(
                "Event versions must be sequential. Expected {}, got {}",
                expected_version, event.version
            )));
        }
    }

    Ok(())
}
