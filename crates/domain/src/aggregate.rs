//! Core aggregate and domain event traits, and the replay engine shared by
//! every aggregate.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use event_store::{EventEnvelope, Version};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{ApplyError, ReconstructionError};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Identifier type of the aggregate that owns the event.
    type Id: Clone + PartialEq + Display + Send + Sync;

    /// Every event type tag this event family can carry.
    const EVENT_TYPES: &'static [&'static str];

    /// The tag of the event that creates the aggregate.
    const CREATION_EVENT_TYPE: &'static str;

    /// Returns the event type name.
    ///
    /// This is used for serialization and event store filtering.
    fn event_type(&self) -> &'static str;

    /// Returns the identifier of the aggregate this event belongs to.
    fn aggregate_id(&self) -> &Self::Id;

    /// Returns when the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Returns true if this is the aggregate's creation event.
    fn is_creation(&self) -> bool {
        self.event_type() == Self::CREATION_EVENT_TYPE
    }

    /// Returns true if `event_type` is a tag of this event family.
    fn is_known_type(event_type: &str) -> bool {
        Self::EVENT_TYPES.contains(&event_type)
    }
}

/// Trait for aggregates in an event-sourced system.
///
/// Aggregates are rebuilt by folding their own ordered event history:
/// - the first event must be the creation event, handled by [`Aggregate::initialize`]
/// - every following event is handled by [`Aggregate::apply`]
/// - the result is a pure function of the event prefix
pub trait Aggregate: Sized + Send + Sync {
    /// Identifier type of the aggregate.
    type Id: Clone + PartialEq + Display + Send + Sync;

    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent<Id = Self::Id>;

    /// The type of errors this aggregate's commands can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name.
    ///
    /// Used for event store organization and routing.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's unique identifier.
    fn id(&self) -> &Self::Id;

    /// Returns the number of events folded into this aggregate.
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    fn set_version(&mut self, version: Version);

    /// Builds the initial state from the creation event.
    fn initialize(event: Self::Event) -> Result<Self, ApplyError>;

    /// Applies a non-creation event to the aggregate.
    ///
    /// Must be deterministic and free of side effects. A payload that
    /// contradicts the current state is rejected rather than half-applied.
    fn apply(&mut self, event: Self::Event) -> Result<(), ApplyError>;

    /// Reconstructs an aggregate from its complete, ordered event history.
    fn from_events(
        events: impl IntoIterator<Item = Self::Event>,
    ) -> Result<Self, ReconstructionError> {
        observe::<Self>(fold_from_start(events))
    }

    /// Continues folding from an already reconstructed prefix.
    ///
    /// Folding `P` in one call and folding any in-order chunking of `P` with
    /// `from_events` followed by `replay` yield identical aggregates.
    fn replay(
        self,
        events: impl IntoIterator<Item = Self::Event>,
    ) -> Result<Self, ReconstructionError> {
        observe::<Self>(fold_onto(self, events))
    }

    /// Decodes stored envelopes and reconstructs the aggregate from them.
    fn from_envelopes(
        envelopes: impl IntoIterator<Item = EventEnvelope>,
    ) -> Result<Self, ReconstructionError> {
        let events = decode_envelopes::<Self>(envelopes, 0)?;
        Self::from_events(events)
    }

    /// Decodes stored envelopes and continues folding from this aggregate.
    fn replay_envelopes(
        self,
        envelopes: impl IntoIterator<Item = EventEnvelope>,
    ) -> Result<Self, ReconstructionError> {
        let offset = position_of(self.version());
        let events = decode_envelopes::<Self>(envelopes, offset)?;
        self.replay(events)
    }
}

fn position_of(version: Version) -> usize {
    version.as_u64() as usize
}

fn fold_from_start<A: Aggregate>(
    events: impl IntoIterator<Item = A::Event>,
) -> Result<A, ReconstructionError> {
    let mut events = events.into_iter();

    let Some(first) = events.next() else {
        return Err(ReconstructionError::EmptyEventStream {
            aggregate_type: A::aggregate_type(),
        });
    };

    if !first.is_creation() {
        return Err(ReconstructionError::MissingCreationEvent {
            aggregate_type: A::aggregate_type(),
            expected: <A::Event as DomainEvent>::CREATION_EVENT_TYPE,
            found: first.event_type().to_string(),
        });
    }

    let event_type = first.event_type();
    let mut aggregate =
        A::initialize(first).map_err(|e| ReconstructionError::InvalidEvent {
            event_type: event_type.to_string(),
            position: 0,
            reason: e.to_string(),
        })?;
    aggregate.set_version(Version::first());

    fold_onto(aggregate, events)
}

fn fold_onto<A: Aggregate>(
    mut aggregate: A,
    events: impl IntoIterator<Item = A::Event>,
) -> Result<A, ReconstructionError> {
    for event in events {
        let position = position_of(aggregate.version());

        if event.is_creation() {
            return Err(ReconstructionError::DuplicateCreationEvent {
                aggregate_type: A::aggregate_type(),
                position,
            });
        }

        if event.aggregate_id() != aggregate.id() {
            return Err(ReconstructionError::AggregateIdMismatch {
                expected: aggregate.id().to_string(),
                found: event.aggregate_id().to_string(),
                position,
            });
        }

        let event_type = event.event_type();
        aggregate
            .apply(event)
            .map_err(|e| ReconstructionError::InvalidEvent {
                event_type: event_type.to_string(),
                position,
                reason: e.to_string(),
            })?;
        aggregate.set_version(aggregate.version().next());
    }

    Ok(aggregate)
}

fn decode_envelopes<A: Aggregate>(
    envelopes: impl IntoIterator<Item = EventEnvelope>,
    offset: usize,
) -> Result<Vec<A::Event>, ReconstructionError> {
    envelopes
        .into_iter()
        .enumerate()
        .map(|(index, envelope)| decode_envelope::<A>(envelope, offset + index))
        .collect()
}

fn decode_envelope<A: Aggregate>(
    envelope: EventEnvelope,
    position: usize,
) -> Result<A::Event, ReconstructionError> {
    if envelope.aggregate_type != A::aggregate_type() {
        return Err(ReconstructionError::ForeignAggregateType {
            expected: A::aggregate_type(),
            found: envelope.aggregate_type,
            position,
        });
    }

    if !<A::Event as DomainEvent>::is_known_type(&envelope.event_type) {
        return Err(ReconstructionError::UnknownEventType {
            aggregate_type: A::aggregate_type(),
            event_type: envelope.event_type,
            position,
        });
    }

    let event: A::Event = serde_json::from_value(envelope.payload)
        .map_err(|source| ReconstructionError::Decode { position, source })?;

    if event.event_type() != envelope.event_type {
        return Err(ReconstructionError::InvalidEvent {
            event_type: envelope.event_type,
            position,
            reason: format!("payload decodes as {}", event.event_type()),
        });
    }

    Ok(event)
}

fn observe<A: Aggregate>(
    result: Result<A, ReconstructionError>,
) -> Result<A, ReconstructionError> {
    match &result {
        Ok(aggregate) => {
            metrics::counter!("aggregate_reconstructions_total", "aggregate" => A::aggregate_type())
                .increment(1);
            tracing::debug!(
                aggregate = A::aggregate_type(),
                id = %aggregate.id(),
                version = %aggregate.version(),
                "aggregate reconstructed"
            );
        }
        Err(error) => {
            metrics::counter!(
                "aggregate_reconstruction_failures_total",
                "aggregate" => A::aggregate_type()
            )
            .increment(1);
            tracing::warn!(aggregate = A::aggregate_type(), %error, "event stream rejected");
        }
    }
    result
}
