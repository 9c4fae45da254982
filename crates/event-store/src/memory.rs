use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    EventEnvelope, EventStoreError, Result, Version,
    store::{AppendOptions, EventStore, validate_events_for_append},
};

/// Streams are addressed by aggregate type and id together, so aggregates of
/// different kinds may share an id string.
type StreamKey = (String, String);

fn stream_key(aggregate_type: &str, aggregate_id: &str) -> StreamKey {
    (aggregate_type.to_string(), aggregate_id.to_string())
}

/// In-memory event store.
///
/// Keeps one ordered stream per aggregate. Cloning shares the same
/// underlying streams.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    streams: Arc<RwLock<HashMap<StreamKey, Vec<EventEnvelope>>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored across all aggregates.
    pub async fn event_count(&self) -> usize {
        self.streams.read().await.values().map(Vec::len).sum()
    }

    /// Returns the number of streams holding at least one event.
    pub async fn stream_count(&self) -> usize {
        self.streams.read().await.len()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_events_for_append(&events)?;

        let first_event = &events[0];
        let aggregate_id = first_event.aggregate_id.clone();
        let aggregate_type = first_event.aggregate_type.clone();
        let first_new_version = first_event.version;
        let key = stream_key(&aggregate_type, &aggregate_id);

        let mut streams = self.streams.write().await;
        let current_version = streams
            .get(&key)
            .and_then(|stream| stream.last())
            .map(|e| e.version)
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            tracing::warn!(
                %aggregate_type,
                %aggregate_id,
                %expected,
                actual = %current_version,
                "append rejected"
            );
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current_version,
            });
        }

        // Versions must continue the stream without gaps or overlaps.
        if first_new_version != current_version.next() {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current_version),
                actual: current_version,
            });
        }

        let appended = events.len();
        let last_version = events
            .last()
            .map(|e| e.version)
            .unwrap_or(current_version);
        streams.entry(key).or_default().extend(events);

        metrics::counter!("event_store_events_appended_total", "aggregate" => aggregate_type)
            .increment(appended as u64);
        tracing::debug!(%aggregate_id, %last_version, appended, "events appended");

        Ok(last_version)
    }

    async fn load(&self, aggregate_type: &str, aggregate_id: &str) -> Result<Vec<EventEnvelope>> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(&stream_key(aggregate_type, aggregate_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn load_from_version(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
        from_version: Version,
    ) -> Result<Vec<EventEnvelope>> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(&stream_key(aggregate_type, aggregate_id))
            .map(|stream| {
                stream
                    .iter()
                    .filter(|e| e.version >= from_version)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn aggregate_version(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Option<Version>> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(&stream_key(aggregate_type, aggregate_id))
            .and_then(|stream| stream.last())
            .map(|e| e.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventStoreExt;

    fn create_test_event(aggregate_id: &str, version: Version, event_type: &str) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type("Game")
            .event_type(event_type)
            .version(version)
            .payload_raw(serde_json::json!({"test": true}))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn append_single_event() {
        let store = InMemoryEventStore::new();
        let event = create_test_event("game-1", Version::first(), "GameCreated");

        let result = store.append(vec![event], AppendOptions::expect_new()).await;
        assert_eq!(result.unwrap(), Version::first());

        let events = store.load("Game", "game-1").await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn append_multiple_events() {
        let store = InMemoryEventStore::new();

        let events = vec![
            create_test_event("game-1", Version::new(1), "GameCreated"),
            create_test_event("game-1", Version::new(2), "GameStarted"),
            create_test_event("game-1", Version::new(3), "ScoreUpdated"),
        ];

        let result = store.append(events, AppendOptions::expect_new()).await;
        assert_eq!(result.unwrap(), Version::new(3));
        assert_eq!(store.load("Game", "game-1").await.unwrap().len(), 3);
        assert_eq!(store.event_count().await, 3);
    }

    #[tokio::test]
    async fn concurrency_conflict_on_wrong_version() {
        let store = InMemoryEventStore::new();

        let event1 = create_test_event("game-1", Version::first(), "GameCreated");
        store
            .append(vec![event1], AppendOptions::expect_new())
            .await
            .unwrap();

        let event2 = create_test_event("game-1", Version::new(2), "GameStarted");
        let result = store
            .append(
                vec![event2],
                AppendOptions::expect_version(Version::initial()),
            )
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn rejected_append_leaves_no_stream_behind() {
        let store = InMemoryEventStore::new();

        let result = store
            .append(
                vec![create_test_event("game-1", Version::new(2), "GameStarted")],
                AppendOptions::expect_version(Version::first()),
            )
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
        assert_eq!(store.stream_count().await, 0);
        assert!(!store.aggregate_exists("Game", "game-1").await.unwrap());
    }

    #[tokio::test]
    async fn same_id_under_different_aggregate_types_is_two_streams() {
        let store = InMemoryEventStore::new();
        let game = create_test_event("match-1", Version::first(), "GameCreated");
        let mut inning = create_test_event("match-1", Version::first(), "InningStateCreated");
        inning.aggregate_type = "InningState".to_string();

        store
            .append(vec![game], AppendOptions::expect_new())
            .await
            .unwrap();
        store
            .append(vec![inning], AppendOptions::expect_new())
            .await
            .unwrap();

        let games = store.load("Game", "match-1").await.unwrap();
        let innings = store.load("InningState", "match-1").await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].event_type, "GameCreated");
        assert_eq!(innings.len(), 1);
        assert_eq!(innings[0].event_type, "InningStateCreated");
        assert_eq!(store.stream_count().await, 2);
    }

    #[tokio::test]
    async fn append_with_expected_version_succeeds() {
        let store = InMemoryEventStore::new();

        let event1 = create_test_event("game-1", Version::first(), "GameCreated");
        store
            .append(vec![event1], AppendOptions::expect_new())
            .await
            .unwrap();

        let event2 = create_test_event("game-1", Version::new(2), "GameStarted");
        let result = store
            .append(
                vec![event2],
                AppendOptions::expect_version(Version::first()),
            )
            .await;

        assert_eq!(result.unwrap(), Version::new(2));
    }

    #[tokio::test]
    async fn overlapping_versions_conflict_without_expectation() {
        let store = InMemoryEventStore::new();
        store
            .append(
                vec![create_test_event("game-1", Version::first(), "GameCreated")],
                AppendOptions::new(),
            )
            .await
            .unwrap();

        let result = store
            .append(
                vec![create_test_event("game-1", Version::first(), "GameStarted")],
                AppendOptions::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn streams_are_kept_per_aggregate() {
        let store = InMemoryEventStore::new();
        store
            .append(
                vec![create_test_event("game-1", Version::first(), "GameCreated")],
                AppendOptions::new(),
            )
            .await
            .unwrap();
        store
            .append(
                vec![create_test_event("game-2", Version::first(), "GameCreated")],
                AppendOptions::new(),
            )
            .await
            .unwrap();
        store
            .append(
                vec![create_test_event("game-1", Version::new(2), "GameStarted")],
                AppendOptions::new(),
            )
            .await
            .unwrap();

        let game_one = store.load("Game", "game-1").await.unwrap();
        assert_eq!(game_one.len(), 2);
        assert!(game_one.iter().all(|e| e.aggregate_id == "game-1"));
        assert_eq!(store.load("Game", "game-2").await.unwrap().len(), 1);
        assert!(store.load("Game", "game-3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_from_version() {
        let store = InMemoryEventStore::new();

        let events = vec![
            create_test_event("game-1", Version::new(1), "GameCreated"),
            create_test_event("game-1", Version::new(2), "GameStarted"),
            create_test_event("game-1", Version::new(3), "ScoreUpdated"),
        ];
        store.append(events, AppendOptions::new()).await.unwrap();

        let from_v2 = store
            .load_from_version("Game", "game-1", Version::new(2))
            .await
            .unwrap();
        assert_eq!(from_v2.len(), 2);
        assert_eq!(from_v2[0].version, Version::new(2));
        assert_eq!(from_v2[1].version, Version::new(3));
    }

    #[tokio::test]
    async fn aggregate_version() {
        let store = InMemoryEventStore::new();

        assert!(store.aggregate_version("Game", "game-1").await.unwrap().is_none());
        assert!(!store.aggregate_exists("Game", "game-1").await.unwrap());

        let events = vec![
            create_test_event("game-1", Version::new(1), "GameCreated"),
            create_test_event("game-1", Version::new(2), "GameStarted"),
        ];
        store.append(events, AppendOptions::new()).await.unwrap();

        assert_eq!(
            store.aggregate_version("Game", "game-1").await.unwrap(),
            Some(Version::new(2))
        );
        assert!(store.aggregate_exists("Game", "game-1").await.unwrap());
    }

    #[tokio::test]
    async fn stream_aggregate_yields_ordered_chunks() {
        use futures_util::StreamExt;

        let store = InMemoryEventStore::new();
        let events = (1..=5)
            .map(|v| create_test_event("game-1", Version::new(v), "ScoreUpdated"))
            .collect();
        store.append(events, AppendOptions::new()).await.unwrap();

        let stream = store.stream_aggregate("Game", "game-1", 2).await.unwrap();
        let chunks: Vec<_> = stream.collect().await;
        let sizes: Vec<usize> = chunks.iter().map(|c| c.as_ref().unwrap().len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let versions: Vec<u64> = chunks
            .into_iter()
            .flat_map(|c| c.unwrap())
            .map(|e| e.version.as_u64())
            .collect();
        assert_eq!(versions, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn stream_aggregate_rejects_zero_chunk_size() {
        let store = InMemoryEventStore::new();
        assert!(store.stream_aggregate("Game", "game-1", 0).await.is_err());
    }
}
