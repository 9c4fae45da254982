//! Team lineup domain events.

use chrono::{DateTime, Utc};
use common::{GameId, PlayerId, TeamLineupId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::game::TeamSide;
use crate::rules::SoftballRules;

use super::{FieldPosition, JerseyNumber, LineupPlayer, StrategyKind};

/// Events that can occur on a team lineup aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TeamLineupEvent {
    /// Lineup was set up for a team in a game.
    TeamLineupCreated(TeamLineupCreatedData),

    /// A player took an empty batting slot.
    PlayerAddedToLineup(PlayerAddedToLineupData),

    /// A player joined the roster without a batting slot.
    PlayerAddedToBench(PlayerAddedToBenchData),

    /// One player replaced another in a batting slot.
    PlayerSubstituted(PlayerSubstitutedData),

    /// A lineup player moved to another defensive position.
    FieldPositionChanged(FieldPositionChangedData),
}

impl DomainEvent for TeamLineupEvent {
    type Id = TeamLineupId;

    const EVENT_TYPES: &'static [&'static str] = &[
        "TeamLineupCreated",
        "PlayerAddedToLineup",
        "PlayerAddedToBench",
        "PlayerSubstituted",
        "FieldPositionChanged",
    ];
    const CREATION_EVENT_TYPE: &'static str = "TeamLineupCreated";

    fn event_type(&self) -> &'static str {
        match self {
            TeamLineupEvent::TeamLineupCreated(_) => "TeamLineupCreated",
            TeamLineupEvent::PlayerAddedToLineup(_) => "PlayerAddedToLineup",
            TeamLineupEvent::PlayerAddedToBench(_) => "PlayerAddedToBench",
            TeamLineupEvent::PlayerSubstituted(_) => "PlayerSubstituted",
            TeamLineupEvent::FieldPositionChanged(_) => "FieldPositionChanged",
        }
    }

    fn aggregate_id(&self) -> &TeamLineupId {
        match self {
            TeamLineupEvent::TeamLineupCreated(data) => &data.team_lineup_id,
            TeamLineupEvent::PlayerAddedToLineup(data) => &data.team_lineup_id,
            TeamLineupEvent::PlayerAddedToBench(data) => &data.team_lineup_id,
            TeamLineupEvent::PlayerSubstituted(data) => &data.team_lineup_id,
            TeamLineupEvent::FieldPositionChanged(data) => &data.team_lineup_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TeamLineupEvent::TeamLineupCreated(data) => data.occurred_at,
            TeamLineupEvent::PlayerAddedToLineup(data) => data.occurred_at,
            TeamLineupEvent::PlayerAddedToBench(data) => data.occurred_at,
            TeamLineupEvent::PlayerSubstituted(data) => data.occurred_at,
            TeamLineupEvent::FieldPositionChanged(data) => data.occurred_at,
        }
    }
}

/// Data for TeamLineupCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamLineupCreatedData {
    pub team_lineup_id: TeamLineupId,
    pub game_id: GameId,
    pub team_name: String,
    pub team_side: TeamSide,
    pub strategy: StrategyKind,

    /// Rules in effect for this lineup.
    pub rules: SoftballRules,

    pub occurred_at: DateTime<Utc>,
}

/// Data for PlayerAddedToLineup event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAddedToLineupData {
    pub team_lineup_id: TeamLineupId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub jersey_number: JerseyNumber,
    pub batting_slot: u8,
    pub field_position: FieldPosition,
    pub occurred_at: DateTime<Utc>,
}

/// Data for PlayerAddedToBench event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAddedToBenchData {
    pub team_lineup_id: TeamLineupId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub jersey_number: JerseyNumber,
    pub occurred_at: DateTime<Utc>,
}

/// Data for PlayerSubstituted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSubstitutedData {
    pub team_lineup_id: TeamLineupId,
    pub batting_slot: u8,
    pub outgoing_player_id: PlayerId,
    pub incoming_player_id: PlayerId,
    pub incoming_player_name: String,
    pub incoming_jersey_number: JerseyNumber,
    pub field_position: FieldPosition,

    /// True when the incoming player was substituted out earlier.
    pub is_reentry: bool,

    pub occurred_at: DateTime<Utc>,
}

/// Data for FieldPositionChanged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPositionChangedData {
    pub team_lineup_id: TeamLineupId,
    pub player_id: PlayerId,
    pub from: FieldPosition,
    pub to: FieldPosition,
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl TeamLineupEvent {
    /// Creates a TeamLineupCreated event.
    pub fn team_lineup_created(
        team_lineup_id: TeamLineupId,
        game_id: GameId,
        team_name: impl Into<String>,
        team_side: TeamSide,
        strategy: StrategyKind,
        rules: SoftballRules,
    ) -> Self {
        TeamLineupEvent::TeamLineupCreated(TeamLineupCreatedData {
            team_lineup_id,
            game_id,
            team_name: team_name.into(),
            team_side,
            strategy,
            rules,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a PlayerAddedToLineup event.
    pub fn player_added_to_lineup(
        team_lineup_id: TeamLineupId,
        player: LineupPlayer,
        batting_slot: u8,
        field_position: FieldPosition,
    ) -> Self {
        TeamLineupEvent::PlayerAddedToLineup(PlayerAddedToLineupData {
            team_lineup_id,
            player_id: player.player_id,
            player_name: player.name,
            jersey_number: player.jersey_number,
            batting_slot,
            field_position,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a PlayerAddedToBench event.
    pub fn player_added_to_bench(team_lineup_id: TeamLineupId, player: LineupPlayer) -> Self {
        TeamLineupEvent::PlayerAddedToBench(PlayerAddedToBenchData {
            team_lineup_id,
            player_id: player.player_id,
            player_name: player.name,
            jersey_number: player.jersey_number,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a PlayerSubstituted event.
    pub fn player_substituted(
        team_lineup_id: TeamLineupId,
        batting_slot: u8,
        outgoing_player_id: PlayerId,
        incoming: LineupPlayer,
        field_position: FieldPosition,
        is_reentry: bool,
    ) -> Self {
        TeamLineupEvent::PlayerSubstituted(PlayerSubstitutedData {
            team_lineup_id,
            batting_slot,
            outgoing_player_id,
            incoming_player_id: incoming.player_id,
            incoming_player_name: incoming.name,
            incoming_jersey_number: incoming.jersey_number,
            field_position,
            is_reentry,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a FieldPositionChanged event.
    pub fn field_position_changed(
        team_lineup_id: TeamLineupId,
        player_id: PlayerId,
        from: FieldPosition,
        to: FieldPosition,
    ) -> Self {
        TeamLineupEvent::FieldPositionChanged(FieldPositionChangedData {
            team_lineup_id,
            player_id,
            from,
            to,
            occurred_at: Utc::now(),
        })
    }
}
