//! Integration tests for rebuilding aggregates from stored envelopes.

use common::{GameId, InningStateId};
use domain::{
    Aggregate, AggregateRepository, DomainError, DomainEvent, Game, GameEvent, InningState,
    ReconstructionError,
};
use event_store::{AppendOptions, EventEnvelope, EventStore, InMemoryEventStore, Version};
use serde_json::json;

fn envelope(aggregate_id: &str, aggregate_type: &str, event: &GameEvent, version: u64) -> EventEnvelope {
    EventEnvelope::builder()
        .aggregate_id(aggregate_id)
        .aggregate_type(aggregate_type)
        .event_type(event.event_type())
        .version(Version::new(version))
        .payload(event)
        .unwrap()
        .build()
        .unwrap()
}

fn created(id: &str) -> GameEvent {
    GameEvent::game_created(GameId::new(id).unwrap(), "Hawks", "Owls")
}

#[tokio::test]
async fn stream_of_another_aggregate_type_is_rejected() {
    let store = InMemoryEventStore::new();
    store
        .append(
            vec![envelope("shared-1", "Game", &created("shared-1"), 1)],
            AppendOptions::expect_new(),
        )
        .await
        .unwrap();

    // The store files the stream under its own type; an inning repository
    // with the same id sees nothing.
    let innings: AggregateRepository<_, InningState> = AggregateRepository::new(store.clone());
    let result = innings.load(&InningStateId::new("shared-1").unwrap()).await;
    assert!(matches!(
        result,
        Err(DomainError::AggregateNotFound {
            aggregate_type: "InningState",
            ..
        })
    ));

    // Fed the game's envelopes directly, the engine refuses them.
    let envelopes = store.load("Game", "shared-1").await.unwrap();
    assert!(matches!(
        InningState::from_envelopes(envelopes),
        Err(ReconstructionError::ForeignAggregateType { position: 0, .. })
    ));
}

#[tokio::test]
async fn undecodable_payload_is_rejected() {
    let store = InMemoryEventStore::new();
    let started = GameEvent::game_started(GameId::new("game-1").unwrap());
    let broken = EventEnvelope::builder()
        .aggregate_id("game-1")
        .aggregate_type("Game")
        .event_type("GameStarted")
        .version(Version::new(2))
        .payload_raw(json!({ "type": "GameStarted", "data": { "game_id": 7 } }))
        .build()
        .unwrap();
    store
        .append(
            vec![envelope("game-1", "Game", &created("game-1"), 1), broken],
            AppendOptions::expect_new(),
        )
        .await
        .unwrap();

    let games: AggregateRepository<_, Game> = AggregateRepository::new(store);
    let result = games.load(&GameId::new("game-1").unwrap()).await;
    assert!(matches!(
        result,
        Err(DomainError::Reconstruction(ReconstructionError::Decode { position: 1, .. }))
    ));

    // The well-formed version of the same event folds fine.
    let events = vec![created("game-1"), started];
    assert!(Game::from_events(events).unwrap().started_at().is_some());
}

#[tokio::test]
async fn stream_with_events_for_another_game_is_rejected() {
    let store = InMemoryEventStore::new();
    let stray = GameEvent::game_started(GameId::new("game-2").unwrap());
    store
        .append(
            vec![
                envelope("game-1", "Game", &created("game-1"), 1),
                envelope("game-1", "Game", &stray, 2),
            ],
            AppendOptions::expect_new(),
        )
        .await
        .unwrap();

    let games: AggregateRepository<_, Game> = AggregateRepository::new(store);
    let result = games.load(&GameId::new("game-1").unwrap()).await;
    assert!(matches!(
        result,
        Err(DomainError::Reconstruction(
            ReconstructionError::AggregateIdMismatch { position: 1, .. }
        ))
    ));
}

#[test]
fn game_stream_must_start_with_creation() {
    let id = GameId::new("game-1").unwrap();

    assert!(matches!(
        Game::from_events(Vec::<GameEvent>::new()),
        Err(ReconstructionError::EmptyEventStream { aggregate_type: "Game" })
    ));
    assert!(matches!(
        Game::from_events(vec![GameEvent::game_started(id.clone())]),
        Err(ReconstructionError::MissingCreationEvent { .. })
    ));
    assert!(matches!(
        Game::from_events(vec![created("game-1"), created("game-1")]),
        Err(ReconstructionError::DuplicateCreationEvent { position: 1, .. })
    ));

    let game = Game::from_events(vec![created("game-1"), GameEvent::game_started(id)]).unwrap();
    assert_eq!(game.version(), Version::new(2));
}
