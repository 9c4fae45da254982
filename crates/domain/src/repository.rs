//! Loading and saving aggregates through an event store.

use std::marker::PhantomData;

use event_store::{AppendOptions, EventEnvelope, EventStore, EventStoreExt, Version};
use futures_util::StreamExt;

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Result of saving new events.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and persisted.
    pub events: Vec<A::Event>,

    /// The new version of the aggregate after the command.
    pub new_version: Version,
}

/// Bridges stored envelopes and aggregates of one type.
///
/// Loading decodes the aggregate's envelopes and folds them with the
/// reconstruction engine. Saving folds the new events onto the aggregate
/// first, so a command whose events contradict the state never reaches the
/// store, then appends them expecting the aggregate's current version.
pub struct AggregateRepository<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> AggregateRepository<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    /// Creates a new repository over the given event store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an aggregate from its full event stream.
    #[tracing::instrument(skip_all, fields(aggregate = A::aggregate_type(), id = %id))]
    pub async fn load(&self, id: &A::Id) -> Result<A, DomainError> {
        let envelopes = self.store.load(A::aggregate_type(), &id.to_string()).await?;
        if envelopes.is_empty() {
            return Err(not_found::<A>(id));
        }
        Ok(A::from_envelopes(envelopes)?)
    }

    /// Loads an aggregate, returning None if it has no events.
    pub async fn load_existing(&self, id: &A::Id) -> Result<Option<A>, DomainError> {
        match self.load(id).await {
            Ok(aggregate) => Ok(Some(aggregate)),
            Err(DomainError::AggregateNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Loads an aggregate by folding its stream chunk by chunk.
    ///
    /// Produces the same aggregate as [`load`](Self::load) for any chunk size.
    #[tracing::instrument(skip(self, id), fields(aggregate = A::aggregate_type(), id = %id))]
    pub async fn load_chunked(&self, id: &A::Id, chunk_size: usize) -> Result<A, DomainError> {
        let mut chunks = self
            .store
            .stream_aggregate(A::aggregate_type(), &id.to_string(), chunk_size)
            .await?;

        let mut aggregate: Option<A> = None;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            aggregate = Some(match aggregate {
                None => A::from_envelopes(chunk)?,
                Some(aggregate) => aggregate.replay_envelopes(chunk)?,
            });
        }

        aggregate.ok_or_else(|| not_found::<A>(id))
    }

    /// Persists the events that start a new aggregate.
    #[tracing::instrument(skip_all, fields(aggregate = A::aggregate_type()))]
    pub async fn create(&self, events: Vec<A::Event>) -> Result<CommandResult<A>, DomainError> {
        let aggregate = A::from_events(events.clone())?;
        let envelopes = build_envelopes::<A>(aggregate.id(), Version::initial(), &events)?;

        let new_version = self
            .store
            .append(envelopes, AppendOptions::expect_new())
            .await?;

        tracing::debug!(id = %aggregate.id(), %new_version, "aggregate created");
        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }

    /// Appends events produced against `aggregate` and returns it with the
    /// events applied.
    ///
    /// Fails with a concurrency conflict if the stream moved past the
    /// aggregate's version since it was loaded.
    #[tracing::instrument(skip_all, fields(aggregate = A::aggregate_type(), id = %aggregate.id()))]
    pub async fn save(
        &self,
        aggregate: A,
        events: Vec<A::Event>,
    ) -> Result<CommandResult<A>, DomainError> {
        let current_version = aggregate.version();

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events,
                new_version: current_version,
            });
        }

        let envelopes = build_envelopes::<A>(aggregate.id(), current_version, &events)?;
        let aggregate = aggregate.replay(events.clone())?;

        let new_version = self
            .store
            .append(envelopes, AppendOptions::expect_version(current_version))
            .await?;

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }

    /// Loads an aggregate, runs a command against it, and saves the result.
    pub async fn execute<F>(&self, id: &A::Id, command_fn: F) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let aggregate = self.load(id).await?;
        let events = command_fn(&aggregate)?;
        self.save(aggregate, events).await
    }
}

fn not_found<A: Aggregate>(id: &A::Id) -> DomainError {
    DomainError::AggregateNotFound {
        aggregate_type: A::aggregate_type(),
        aggregate_id: id.to_string(),
    }
}

/// Builds event envelopes from domain events, numbering them after
/// `current_version`.
fn build_envelopes<A: Aggregate>(
    id: &A::Id,
    current_version: Version,
    events: &[A::Event],
) -> Result<Vec<EventEnvelope>, DomainError> {
    let mut envelopes = Vec::with_capacity(events.len());
    let mut version = current_version;

    for event in events {
        version = version.next();
        let envelope = EventEnvelope::builder()
            .aggregate_id(id.to_string())
            .aggregate_type(A::aggregate_type())
            .event_type(event.event_type())
            .version(version)
            .timestamp(event.occurred_at())
            .payload(event)?
            .build()?;
        envelopes.push(envelope);
    }

    Ok(envelopes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::GameId;
    use event_store::{EventStoreError, InMemoryEventStore};

    use crate::game::{Game, GameStatus, Score, TeamSide};
    use crate::inning::InningState;

    fn game_id() -> GameId {
        GameId::new("game-1").unwrap()
    }

    async fn created(store: InMemoryEventStore) -> AggregateRepository<InMemoryEventStore, Game> {
        let repository = AggregateRepository::new(store);
        repository
            .create(Game::create(game_id(), "Hawks", "Owls").unwrap())
            .await
            .unwrap();
        repository
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let repository = created(InMemoryEventStore::new()).await;

        let game = repository.load(&game_id()).await.unwrap();
        assert_eq!(game.home_team_name(), "Hawks");
        assert_eq!(game.version(), Version::first());
        assert_eq!(repository.store().event_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let repository = created(InMemoryEventStore::new()).await;

        let result = repository
            .create(Game::create(game_id(), "Hawks", "Owls").unwrap())
            .await;
        assert!(matches!(
            result,
            Err(DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. }))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_aggregate() {
        let repository: AggregateRepository<_, Game> =
            AggregateRepository::new(InMemoryEventStore::new());

        let result = repository.load(&game_id()).await;
        assert!(matches!(
            result,
            Err(DomainError::AggregateNotFound {
                aggregate_type: "Game",
                ..
            })
        ));
        assert!(repository.load_existing(&game_id()).await.unwrap().is_none());
        assert!(repository.load_chunked(&game_id(), 2).await.is_err());
    }

    #[tokio::test]
    async fn test_execute_appends_events() {
        let repository = created(InMemoryEventStore::new()).await;

        repository.execute(&game_id(), |game| game.start()).await.unwrap();
        let result = repository
            .execute(&game_id(), |game| game.record_runs(TeamSide::Home, 2))
            .await
            .unwrap();

        assert_eq!(result.new_version, Version::new(3));
        assert_eq!(result.aggregate.version(), Version::new(3));
        assert_eq!(result.aggregate.score(), Score::new(2, 0));
        assert_eq!(result.aggregate.status(), GameStatus::InProgress);
    }

    #[tokio::test]
    async fn test_rejected_command_persists_nothing() {
        let repository = created(InMemoryEventStore::new()).await;

        let result = repository
            .execute(&game_id(), |game| game.record_runs(TeamSide::Home, 2))
            .await;
        assert!(matches!(result, Err(DomainError::Game(_))));
        assert_eq!(repository.store().event_count().await, 1);
    }

    #[tokio::test]
    async fn test_stale_aggregate_conflicts() {
        let repository = created(InMemoryEventStore::new()).await;
        let stale = repository.load(&game_id()).await.unwrap();

        repository.execute(&game_id(), |game| game.start()).await.unwrap();

        let events = stale.start().unwrap();
        let result = repository.save(stale, events).await;
        assert!(matches!(
            result,
            Err(DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. }))
        ));
    }

    #[tokio::test]
    async fn test_empty_events_persist_nothing() {
        let repository = created(InMemoryEventStore::new()).await;
        let game = repository.load(&game_id()).await.unwrap();

        let result = repository.save(game, vec![]).await.unwrap();
        assert!(result.events.is_empty());
        assert_eq!(result.new_version, Version::first());
        assert_eq!(repository.store().event_count().await, 1);
    }

    #[tokio::test]
    async fn test_load_chunked_matches_load() {
        let repository = created(InMemoryEventStore::new()).await;
        repository.execute(&game_id(), |game| game.start()).await.unwrap();
        for runs in [1, 2, 3] {
            repository
                .execute(&game_id(), |game| game.record_runs(TeamSide::Away, runs))
                .await
                .unwrap();
        }

        let full = repository.load(&game_id()).await.unwrap();
        for chunk_size in 1..=6 {
            let chunked = repository.load_chunked(&game_id(), chunk_size).await.unwrap();
            assert_eq!(chunked, full, "chunk size {chunk_size}");
        }
        assert_eq!(full.score(), Score::new(0, 6));
    }

    #[tokio::test]
    async fn test_aggregates_of_different_kinds_can_share_an_id() {
        let store = InMemoryEventStore::new();
        let games = created(store.clone()).await;
        let innings: AggregateRepository<_, InningState> = AggregateRepository::new(store);
        let inning_id = common::InningStateId::new("game-1").unwrap();

        innings
            .create(InningState::create(inning_id.clone(), game_id(), 1, true).unwrap())
            .await
            .unwrap();
        games.execute(&game_id(), |game| game.start()).await.unwrap();

        let game = games.load(&game_id()).await.unwrap();
        let inning = innings.load_chunked(&inning_id, 1).await.unwrap();
        assert_eq!(game.version(), Version::new(2));
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(inning.version(), Version::first());
        assert_eq!(inning.game_id(), &game_id());
    }
}
