//! Team lineup aggregate implementation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::{GameId, PlayerId, TeamLineupId};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::ApplyError;
use crate::game::TeamSide;
use crate::rules::SoftballRules;

use super::{
    BattingSlotState, FieldPosition, JerseyNumber, LineupError, LineupStrategy,
    PlayerSubstitutionHistory, StrategyKind, TeamLineupEvent, TeamStrategy,
    events::{
        FieldPositionChangedData, PlayerAddedToBenchData, PlayerAddedToLineupData,
        PlayerSubstitutedData, TeamLineupCreatedData,
    },
};

/// A player as introduced to a lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupPlayer {
    pub player_id: PlayerId,
    pub name: String,
    pub jersey_number: JerseyNumber,
}

impl LineupPlayer {
    pub fn new(player_id: PlayerId, name: impl Into<String>, jersey_number: JerseyNumber) -> Self {
        Self {
            player_id,
            name: name.into(),
            jersey_number,
        }
    }
}

/// A rostered player's details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub jersey_number: JerseyNumber,
}

/// One substitution as it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRecord {
    pub batting_slot: u8,
    pub outgoing_player_id: PlayerId,
    pub incoming_player_id: PlayerId,
    pub field_position: FieldPosition,
    pub is_reentry: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Team lineup aggregate root.
///
/// Owns one team's roster and batting order for one game. The lineup rules
/// live in the [`LineupStrategy`] chosen at creation; commands try each
/// change on a copy of the strategy before emitting events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamLineup {
    id: TeamLineupId,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    game_id: GameId,
    team_name: String,
    side: TeamSide,
    strategy: LineupStrategy,

    /// Rules recorded when the lineup was created.
    rules: SoftballRules,

    roster: BTreeMap<PlayerId, RosterEntry>,
    substitutions: Vec<SubstitutionRecord>,
    created_at: DateTime<Utc>,
}

impl Aggregate for TeamLineup {
    type Id = TeamLineupId;
    type Event = TeamLineupEvent;
    type Error = LineupError;

    fn aggregate_type() -> &'static str {
        "TeamLineup"
    }

    fn id(&self) -> &TeamLineupId {
        &self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn initialize(event: TeamLineupEvent) -> Result<Self, ApplyError> {
        match event {
            TeamLineupEvent::TeamLineupCreated(data) => Self::from_created(data),
            other => Err(ApplyError::new(format!(
                "team lineup cannot start with {}",
                other.event_type()
            ))),
        }
    }

    fn apply(&mut self, event: TeamLineupEvent) -> Result<(), ApplyError> {
        let result = match event {
            TeamLineupEvent::TeamLineupCreated(_) => {
                return Err(ApplyError::new("team lineup already created"));
            }
            TeamLineupEvent::PlayerAddedToLineup(data) => self.apply_player_added(data),
            TeamLineupEvent::PlayerAddedToBench(data) => self.apply_bench_player_added(data),
            TeamLineupEvent::PlayerSubstituted(data) => self.apply_player_substituted(data),
            TeamLineupEvent::FieldPositionChanged(data) => self.apply_position_changed(data),
        };
        result.map_err(|e| ApplyError::new(e.to_string()))
    }
}

// Query methods
impl TeamLineup {
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    pub fn side(&self) -> TeamSide {
        self.side
    }

    pub fn strategy(&self) -> &LineupStrategy {
        &self.strategy
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn rules(&self) -> &SoftballRules {
        &self.rules
    }

    pub fn current_lineup(&self) -> Vec<BattingSlotState> {
        self.strategy.current_lineup()
    }

    pub fn is_player_in_lineup(&self, player_id: &PlayerId) -> bool {
        self.strategy.is_player_in_lineup(player_id)
    }

    pub fn player_batting_slot(&self, player_id: &PlayerId) -> Option<u8> {
        self.strategy.player_batting_slot(player_id)
    }

    pub fn player_field_position(&self, player_id: &PlayerId) -> Option<FieldPosition> {
        self.strategy.player_field_position(player_id)
    }

    pub fn active_player_count(&self) -> usize {
        self.strategy.active_player_count()
    }

    /// Returns true if the lineup can take the field under its rules.
    pub fn is_lineup_valid(&self) -> bool {
        self.strategy.is_lineup_valid(&self.rules)
    }

    pub fn roster_entry(&self, player_id: &PlayerId) -> Option<&RosterEntry> {
        self.roster.get(player_id)
    }

    pub fn roster_size(&self) -> usize {
        self.roster.len()
    }

    /// Rostered players without a batting slot, in id order.
    pub fn bench(&self) -> Vec<(&PlayerId, &RosterEntry)> {
        self.roster
            .iter()
            .filter(|(id, _)| !self.strategy.is_player_in_lineup(id))
            .collect()
    }

    pub fn substitutions(&self) -> &[SubstitutionRecord] {
        &self.substitutions
    }

    pub fn substitution_history(&self, player_id: &PlayerId) -> Option<&PlayerSubstitutionHistory> {
        self.strategy.substitution_history(player_id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Command methods (return events)
impl TeamLineup {
    /// Sets up a lineup for one team in a game.
    pub fn create(
        id: TeamLineupId,
        game_id: GameId,
        team_name: &str,
        side: TeamSide,
        strategy: StrategyKind,
        rules: SoftballRules,
    ) -> Result<Vec<TeamLineupEvent>, LineupError> {
        rules.validate()?;

        let team_name = team_name.trim();
        if team_name.is_empty() {
            return Err(LineupError::InvalidTeamName);
        }

        Ok(vec![TeamLineupEvent::team_lineup_created(
            id, game_id, team_name, side, strategy, rules,
        )])
    }

    /// Puts a player in an empty batting slot.
    pub fn add_player(
        &self,
        player: LineupPlayer,
        slot: u8,
        position: FieldPosition,
    ) -> Result<Vec<TeamLineupEvent>, LineupError> {
        let player = self.check_player(player)?;

        let mut trial = self.strategy.clone();
        trial.add_player(slot, player.player_id.clone(), position, &self.rules)?;

        Ok(vec![TeamLineupEvent::player_added_to_lineup(
            self.id.clone(),
            player,
            slot,
            position,
        )])
    }

    /// Adds a player to the roster without a batting slot.
    pub fn add_bench_player(&self, player: LineupPlayer) -> Result<Vec<TeamLineupEvent>, LineupError> {
        if self.roster.contains_key(&player.player_id) {
            return Err(LineupError::PlayerAlreadyOnRoster(player.player_id));
        }
        let player = self.check_player(player)?;

        Ok(vec![TeamLineupEvent::player_added_to_bench(
            self.id.clone(),
            player,
        )])
    }

    /// Replaces the player in `slot` with `incoming`.
    pub fn substitute_player(
        &self,
        slot: u8,
        outgoing: &PlayerId,
        incoming: LineupPlayer,
        position: FieldPosition,
    ) -> Result<Vec<TeamLineupEvent>, LineupError> {
        let incoming = self.check_player(incoming)?;

        let mut trial = self.strategy.clone();
        trial.substitute_player(
            slot,
            outgoing,
            incoming.player_id.clone(),
            position,
            &self.rules,
        )?;

        let is_reentry = self.was_substituted_out(&incoming.player_id);
        Ok(vec![TeamLineupEvent::player_substituted(
            self.id.clone(),
            slot,
            outgoing.clone(),
            incoming,
            position,
            is_reentry,
        )])
    }

    /// Moves a lineup player to another position. Moving to the current
    /// position emits nothing.
    pub fn change_position(
        &self,
        player_id: &PlayerId,
        position: FieldPosition,
    ) -> Result<Vec<TeamLineupEvent>, LineupError> {
        let from = self
            .strategy
            .player_field_position(player_id)
            .ok_or_else(|| LineupError::PlayerNotInLineup(player_id.clone()))?;

        if from == position {
            return Ok(vec![]);
        }

        Ok(vec![TeamLineupEvent::field_position_changed(
            self.id.clone(),
            player_id.clone(),
            from,
            position,
        )])
    }

    /// Validates a player's name and jersey number against the roster.
    fn check_player(&self, mut player: LineupPlayer) -> Result<LineupPlayer, LineupError> {
        let name = player.name.trim();
        if name.is_empty() {
            return Err(LineupError::InvalidPlayerName);
        }
        player.name = name.to_string();

        let taken = self.roster.iter().find(|(id, entry)| {
            **id != player.player_id && entry.jersey_number == player.jersey_number
        });
        if let Some((holder, _)) = taken {
            return Err(LineupError::JerseyNumberInUse {
                jersey_number: player.jersey_number,
                player_id: holder.clone(),
            });
        }
        Ok(player)
    }

    fn was_substituted_out(&self, player_id: &PlayerId) -> bool {
        self.substitutions
            .iter()
            .any(|s| &s.outgoing_player_id == player_id)
    }
}

// Apply event helpers
impl TeamLineup {
    fn from_created(data: TeamLineupCreatedData) -> Result<Self, ApplyError> {
        data.rules
            .validate()
            .map_err(|e| ApplyError::new(e.to_string()))?;

        Ok(Self {
            id: data.team_lineup_id,
            version: Version::initial(),
            game_id: data.game_id,
            team_name: data.team_name,
            side: data.team_side,
            strategy: LineupStrategy::new(data.strategy),
            rules: data.rules,
            roster: BTreeMap::new(),
            substitutions: Vec::new(),
            created_at: data.occurred_at,
        })
    }

    fn apply_player_added(&mut self, data: PlayerAddedToLineupData) -> Result<(), LineupError> {
        self.strategy.add_player(
            data.batting_slot,
            data.player_id.clone(),
            data.field_position,
            &self.rules,
        )?;
        self.roster.insert(
            data.player_id,
            RosterEntry {
                name: data.player_name,
                jersey_number: data.jersey_number,
            },
        );
        Ok(())
    }

    fn apply_bench_player_added(&mut self, data: PlayerAddedToBenchData) -> Result<(), LineupError> {
        if self.roster.contains_key(&data.player_id) {
            return Err(LineupError::PlayerAlreadyOnRoster(data.player_id));
        }
        self.roster.insert(
            data.player_id,
            RosterEntry {
                name: data.player_name,
                jersey_number: data.jersey_number,
            },
        );
        Ok(())
    }

    fn apply_player_substituted(&mut self, data: PlayerSubstitutedData) -> Result<(), LineupError> {
        self.strategy.substitute_player(
            data.batting_slot,
            &data.outgoing_player_id,
            data.incoming_player_id.clone(),
            data.field_position,
            &self.rules,
        )?;
        self.roster.insert(
            data.incoming_player_id.clone(),
            RosterEntry {
                name: data.incoming_player_name,
                jersey_number: data.incoming_jersey_number,
            },
        );
        self.substitutions.push(SubstitutionRecord {
            batting_slot: data.batting_slot,
            outgoing_player_id: data.outgoing_player_id,
            incoming_player_id: data.incoming_player_id,
            field_position: data.field_position,
            is_reentry: data.is_reentry,
            occurred_at: data.occurred_at,
        });
        Ok(())
    }

    fn apply_position_changed(&mut self, data: FieldPositionChangedData) -> Result<(), LineupError> {
        self.strategy
            .change_player_position(&data.player_id, data.to, data.occurred_at)
    }
}
