use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EventStoreError;

/// Identifier the store gives each recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an aggregate in its own stream.
///
/// `Version(0)` is an aggregate with no events; the first event is stored at
/// version 1 and each later one at the next version. An aggregate's version
/// is also the zero-based position of the next event it will apply.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// No events yet.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Version of the creation event.
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One stored domain event.
///
/// The store routes envelopes by `aggregate_id` and orders them by
/// `version`; it never looks inside `payload`, which holds the tagged JSON
/// form of the domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,

    /// Domain event name, e.g. "GameCreated" or "RunnerAdvanced".
    pub event_type: String,

    pub aggregate_id: String,

    /// Aggregate kind, e.g. "Game", "TeamLineup", or "InningState".
    pub aggregate_type: String,

    /// Version of the aggregate once this event is applied.
    pub version: Version,

    /// When the event occurred.
    pub timestamp: DateTime<Utc>,

    pub payload: serde_json::Value,
}

impl EventEnvelope {
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }
}

/// Builder for [`EventEnvelope`]. Every field but the timestamp is required.
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_type: Option<String>,
    aggregate_id: Option<String>,
    aggregate_type: Option<String>,
    version: Option<Version>,
    timestamp: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
}

impl EventEnvelopeBuilder {
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn aggregate_id(mut self, id: impl Into<String>) -> Self {
        self.aggregate_id = Some(id.into());
        self
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets when the event occurred. Defaults to the time of `build`.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Serializes a domain event into the payload.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Uses already-encoded JSON as the payload.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn build(self) -> Result<EventEnvelope, EventStoreError> {
        fn missing(field: &str) -> EventStoreError {
            EventStoreError::InvalidAppend(format!("envelope is missing {field}"))
        }

        Ok(EventEnvelope {
            event_id: EventId::new(),
            event_type: self.event_type.ok_or_else(|| missing("event_type"))?,
            aggregate_id: self.aggregate_id.ok_or_else(|| missing("aggregate_id"))?,
            aggregate_type: self
                .aggregate_type
                .ok_or_else(|| missing("aggregate_type"))?,
            version: self.version.ok_or_else(|| missing("version"))?,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload.ok_or_else(|| missing("payload"))?,
        })
    }
}
