//! Inning state domain events.

use chrono::{DateTime, Utc};
use common::{GameId, InningStateId, PlayerId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{AtBatResult, Base, EndingReason, RunnerOutcome};

/// Events that can occur on an inning state aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InningStateEvent {
    /// Tracking started for a half-inning.
    InningStateCreated(InningStateCreatedData),

    /// A runner (or the batter) ended a play somewhere.
    RunnerAdvanced(RunnerAdvancedData),

    /// A plate appearance finished.
    AtBatCompleted(AtBatCompletedData),

    /// The half-inning ended.
    HalfInningEnded(HalfInningEndedData),
}

impl DomainEvent for InningStateEvent {
    type Id = InningStateId;

    const EVENT_TYPES: &'static [&'static str] = &[
        "InningStateCreated",
        "RunnerAdvanced",
        "AtBatCompleted",
        "HalfInningEnded",
    ];
    const CREATION_EVENT_TYPE: &'static str = "InningStateCreated";

    fn event_type(&self) -> &'static str {
        match self {
            InningStateEvent::InningStateCreated(_) => "InningStateCreated",
            InningStateEvent::RunnerAdvanced(_) => "RunnerAdvanced",
            InningStateEvent::AtBatCompleted(_) => "AtBatCompleted",
            InningStateEvent::HalfInningEnded(_) => "HalfInningEnded",
        }
    }

    fn aggregate_id(&self) -> &InningStateId {
        match self {
            InningStateEvent::InningStateCreated(data) => &data.inning_state_id,
            InningStateEvent::RunnerAdvanced(data) => &data.inning_state_id,
            InningStateEvent::AtBatCompleted(data) => &data.inning_state_id,
            InningStateEvent::HalfInningEnded(data) => &data.inning_state_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InningStateEvent::InningStateCreated(data) => data.occurred_at,
            InningStateEvent::RunnerAdvanced(data) => data.occurred_at,
            InningStateEvent::AtBatCompleted(data) => data.occurred_at,
            InningStateEvent::HalfInningEnded(data) => data.occurred_at,
        }
    }
}

/// Data for InningStateCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningStateCreatedData {
    pub inning_state_id: InningStateId,
    pub game_id: GameId,
    pub inning: u32,
    pub is_top_half: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Data for RunnerAdvanced event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerAdvancedData {
    pub inning_state_id: InningStateId,
    pub runner_id: PlayerId,

    /// Base the runner started on; `None` for the batter.
    pub from: Option<Base>,

    pub to: RunnerOutcome,
    pub occurred_at: DateTime<Utc>,
}

/// Data for AtBatCompleted event.
///
/// Outs and runs are already carried by the preceding `RunnerAdvanced`
/// events; the counts here summarise the plate appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtBatCompletedData {
    pub inning_state_id: InningStateId,
    pub batter_id: PlayerId,
    pub batting_slot: u8,
    pub result: AtBatResult,
    pub outs_recorded: u8,
    pub runs_scored: u8,
    pub rbi: u8,
    pub next_batting_slot: u8,
    pub occurred_at: DateTime<Utc>,
}

/// Data for HalfInningEnded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalfInningEndedData {
    pub inning_state_id: InningStateId,
    pub inning: u32,
    pub is_top_half: bool,
    pub reason: EndingReason,

    /// True when the game ended with this half-inning.
    pub game_over: bool,

    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl InningStateEvent {
    /// Creates an InningStateCreated event.
    pub fn inning_state_created(
        inning_state_id: InningStateId,
        game_id: GameId,
        inning: u32,
        is_top_half: bool,
    ) -> Self {
        InningStateEvent::InningStateCreated(InningStateCreatedData {
            inning_state_id,
            game_id,
            inning,
            is_top_half,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a RunnerAdvanced event.
    pub fn runner_advanced(
        inning_state_id: InningStateId,
        runner_id: PlayerId,
        from: Option<Base>,
        to: RunnerOutcome,
    ) -> Self {
        InningStateEvent::RunnerAdvanced(RunnerAdvancedData {
            inning_state_id,
            runner_id,
            from,
            to,
            occurred_at: Utc::now(),
        })
    }

    /// Creates an AtBatCompleted event.
    #[allow(clippy::too_many_arguments)]
    pub fn at_bat_completed(
        inning_state_id: InningStateId,
        batter_id: PlayerId,
        batting_slot: u8,
        result: AtBatResult,
        outs_recorded: u8,
        runs_scored: u8,
        rbi: u8,
        next_batting_slot: u8,
    ) -> Self {
        InningStateEvent::AtBatCompleted(AtBatCompletedData {
            inning_state_id,
            batter_id,
            batting_slot,
            result,
            outs_recorded,
            runs_scored,
            rbi,
            next_batting_slot,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a HalfInningEnded event.
    pub fn half_inning_ended(
        inning_state_id: InningStateId,
        inning: u32,
        is_top_half: bool,
        reason: EndingReason,
        game_over: bool,
    ) -> Self {
        InningStateEvent::HalfInningEnded(HalfInningEndedData {
            inning_state_id,
            inning,
            is_top_half,
            reason,
            game_over,
            occurred_at: Utc::now(),
        })
    }
}
