//! Integration tests for concurrent writers on the in-memory store.

use event_store::{
    AppendOptions, EventEnvelope, EventStore, EventStoreError, EventStoreExt, InMemoryEventStore,
    Version,
};
use futures_util::StreamExt;

fn score_event(aggregate_id: &str, version: u64) -> EventEnvelope {
    typed_event("Game", aggregate_id, version)
}

fn typed_event(aggregate_type: &str, aggregate_id: &str, version: u64) -> EventEnvelope {
    EventEnvelope::builder()
        .aggregate_id(aggregate_id)
        .aggregate_type(aggregate_type)
        .event_type("ScoreUpdated")
        .version(Version::new(version))
        .payload_raw(serde_json::json!({ "version": version }))
        .build()
        .unwrap()
}

#[tokio::test]
async fn only_one_writer_wins_the_same_version() {
    let store = InMemoryEventStore::new();
    store
        .append(vec![score_event("game-1", 1)], AppendOptions::expect_new())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .append(
                    vec![score_event("game-1", 2)],
                    AppendOptions::expect_version(Version::first()),
                )
                .await
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(version) => {
                assert_eq!(version, Version::new(2));
                wins += 1;
            }
            Err(EventStoreError::ConcurrencyConflict { actual, .. }) => {
                assert_eq!(actual, Version::new(2));
                conflicts += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(store.load("Game", "game-1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn writers_on_different_aggregates_do_not_interfere() {
    let store = InMemoryEventStore::new();

    let mut handles = Vec::new();
    for game in 0..4 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let id = format!("game-{game}");
            for version in 1..=25 {
                store
                    .append(
                        vec![score_event(&id, version)],
                        AppendOptions::expect_version(Version::new(version - 1)),
                    )
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.event_count().await, 100);
    for game in 0..4 {
        let id = format!("game-{game}");
        assert_eq!(
            store.aggregate_version("Game", &id).await.unwrap(),
            Some(Version::new(25))
        );

        let mut chunks = store.stream_aggregate("Game", &id, 10).await.unwrap();
        let mut versions = Vec::new();
        while let Some(chunk) = chunks.next().await {
            versions.extend(chunk.unwrap().into_iter().map(|e| e.version.as_u64()));
        }
        assert_eq!(versions, (1..=25).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn aggregate_kinds_sharing_an_id_keep_separate_streams() {
    let store = InMemoryEventStore::new();

    let mut handles = Vec::new();
    for aggregate_type in ["Game", "InningState", "TeamLineup"] {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for version in 1..=5 {
                store
                    .append(
                        vec![typed_event(aggregate_type, "match-1", version)],
                        AppendOptions::expect_version(Version::new(version - 1)),
                    )
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.stream_count().await, 3);
    for aggregate_type in ["Game", "InningState", "TeamLineup"] {
        let events = store.load(aggregate_type, "match-1").await.unwrap();
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.aggregate_type == aggregate_type));
    }
    assert!(
        store
            .aggregate_version("Scoreboard", "match-1")
            .await
            .unwrap()
            .is_none()
    );
}
