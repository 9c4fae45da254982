//! Game domain events.

use chrono::{DateTime, Utc};
use common::GameId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::inning::EndingReason;

use super::{Score, TeamSide};

/// Events that can occur on a game aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GameEvent {
    /// Game was scheduled.
    GameCreated(GameCreatedData),

    /// First pitch.
    GameStarted(GameStartedData),

    /// Runs were added to a team's total.
    ScoreUpdated(ScoreUpdatedData),

    /// Play moved to another half-inning.
    InningAdvanced(InningAdvancedData),

    /// Game is over.
    GameCompleted(GameCompletedData),
}

impl DomainEvent for GameEvent {
    type Id = GameId;

    const EVENT_TYPES: &'static [&'static str] = &[
        "GameCreated",
        "GameStarted",
        "ScoreUpdated",
        "InningAdvanced",
        "GameCompleted",
    ];
    const CREATION_EVENT_TYPE: &'static str = "GameCreated";

    fn event_type(&self) -> &'static str {
        match self {
            GameEvent::GameCreated(_) => "GameCreated",
            GameEvent::GameStarted(_) => "GameStarted",
            GameEvent::ScoreUpdated(_) => "ScoreUpdated",
            GameEvent::InningAdvanced(_) => "InningAdvanced",
            GameEvent::GameCompleted(_) => "GameCompleted",
        }
    }

    fn aggregate_id(&self) -> &GameId {
        match self {
            GameEvent::GameCreated(data) => &data.game_id,
            GameEvent::GameStarted(data) => &data.game_id,
            GameEvent::ScoreUpdated(data) => &data.game_id,
            GameEvent::InningAdvanced(data) => &data.game_id,
            GameEvent::GameCompleted(data) => &data.game_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            GameEvent::GameCreated(data) => data.occurred_at,
            GameEvent::GameStarted(data) => data.occurred_at,
            GameEvent::ScoreUpdated(data) => data.occurred_at,
            GameEvent::InningAdvanced(data) => data.occurred_at,
            GameEvent::GameCompleted(data) => data.occurred_at,
        }
    }
}

/// Data for GameCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCreatedData {
    /// The unique game ID.
    pub game_id: GameId,

    pub home_team_name: String,
    pub away_team_name: String,

    /// When the game was created.
    pub occurred_at: DateTime<Utc>,
}

/// Data for GameStarted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStartedData {
    pub game_id: GameId,
    pub occurred_at: DateTime<Utc>,
}

/// Data for ScoreUpdated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdatedData {
    pub game_id: GameId,

    /// The team that scored.
    pub team: TeamSide,

    /// Runs added by this update.
    pub runs_added: u32,

    /// The team's total after the update.
    pub new_total: u32,

    pub occurred_at: DateTime<Utc>,
}

/// Data for InningAdvanced event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningAdvancedData {
    pub game_id: GameId,

    /// The inning now in play.
    pub inning: u32,

    pub is_top_half: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Data for GameCompleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCompletedData {
    pub game_id: GameId,
    pub reason: EndingReason,
    pub final_score: Score,
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl GameEvent {
    /// Creates a GameCreated event.
    pub fn game_created(
        game_id: GameId,
        home_team_name: impl Into<String>,
        away_team_name: impl Into<String>,
    ) -> Self {
        GameEvent::GameCreated(GameCreatedData {
            game_id,
            home_team_name: home_team_name.into(),
            away_team_name: away_team_name.into(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates a GameStarted event.
    pub fn game_started(game_id: GameId) -> Self {
        GameEvent::GameStarted(GameStartedData {
            game_id,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a ScoreUpdated event.
    pub fn score_updated(game_id: GameId, team: TeamSide, runs_added: u32, new_total: u32) -> Self {
        GameEvent::ScoreUpdated(ScoreUpdatedData {
            game_id,
            team,
            runs_added,
            new_total,
            occurred_at: Utc::now(),
        })
    }

    /// Creates an InningAdvanced event.
    pub fn inning_advanced(game_id: GameId, inning: u32, is_top_half: bool) -> Self {
        GameEvent::InningAdvanced(InningAdvancedData {
            game_id,
            inning,
            is_top_half,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a GameCompleted event.
    pub fn game_completed(game_id: GameId, reason: EndingReason, final_score: Score) -> Self {
        GameEvent::GameCompleted(GameCompletedData {
            game_id,
            reason,
            final_score,
            occurred_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_id() -> GameId {
        GameId::new("game-1").unwrap()
    }

    #[test]
    fn test_event_type() {
        let event = GameEvent::game_created(game_id(), "Hawks", "Owls");
        assert_eq!(event.event_type(), "GameCreated");
        assert!(event.is_creation());

        let event = GameEvent::game_started(game_id());
        assert_eq!(event.event_type(), "GameStarted");

        let event = GameEvent::score_updated(game_id(), TeamSide::Home, 2, 2);
        assert_eq!(event.event_type(), "ScoreUpdated");

        let event = GameEvent::inning_advanced(game_id(), 1, false);
        assert_eq!(event.event_type(), "InningAdvanced");

        let event = GameEvent::game_completed(game_id(), EndingReason::Walkoff, Score::new(4, 3));
        assert_eq!(event.event_type(), "GameCompleted");
        assert!(!event.is_creation());
        assert!(GameEvent::is_known_type(event.event_type()));
    }

    #[test]
    fn test_event_serialization() {
        let event = GameEvent::game_created(game_id(), "Hawks", "Owls");

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("GameCreated"));

        let deserialized: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.event_type(), "GameCreated");

        if let GameEvent::GameCreated(data) = deserialized {
            assert_eq!(data.game_id, game_id());
            assert_eq!(data.home_team_name, "Hawks");
            assert_eq!(data.away_team_name, "Owls");
        } else {
            panic!("Expected GameCreated event");
        }
    }

    #[test]
    fn test_score_updated_serialization() {
        let event = GameEvent::score_updated(game_id(), TeamSide::Away, 3, 5);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ScoreUpdated");
        assert_eq!(json["data"]["team"], "Away");
        assert_eq!(json["data"]["new_total"], 5);
    }

    #[test]
    fn test_invalid_game_id_is_rejected_on_decode() {
        let json = serde_json::json!({
            "type": "GameStarted",
            "data": { "game_id": "  ", "occurred_at": "2024-05-01T18:00:00Z" }
        });
        assert!(serde_json::from_value::<GameEvent>(json).is_err());
    }
}
