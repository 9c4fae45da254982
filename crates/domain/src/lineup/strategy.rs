//! The lineup-management contract and the closed set of strategies.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use common::PlayerId;
use serde::{Deserialize, Serialize};

use crate::rules::{MIN_LINEUP_SIZE, SoftballRules};

use super::{
    BattingSlotState, DetailedStrategy, FieldPosition, LineupError, PlayerSubstitutionHistory,
    SimpleStrategy,
};

/// Operations every lineup strategy supports.
///
/// Mutating operations validate everything before changing anything; on
/// error the strategy is left exactly as it was.
pub trait TeamStrategy {
    /// The occupied slots sorted by slot number. Returns a new `Vec` on
    /// every call.
    fn current_lineup(&self) -> Vec<BattingSlotState>;

    fn player_batting_slot(&self, player_id: &PlayerId) -> Option<u8>;

    fn player_field_position(&self, player_id: &PlayerId) -> Option<FieldPosition>;

    fn is_player_in_lineup(&self, player_id: &PlayerId) -> bool {
        self.player_batting_slot(player_id).is_some()
    }

    fn active_player_count(&self) -> usize {
        self.current_lineup().len()
    }

    /// Returns true if the lineup can take the field: between
    /// [`MIN_LINEUP_SIZE`] and `max_players_per_team` players covering every
    /// required position.
    fn is_lineup_valid(&self, rules: &SoftballRules) -> bool {
        let lineup = self.current_lineup();
        let count = lineup.len();
        if count < usize::from(MIN_LINEUP_SIZE) || count > usize::from(rules.max_players_per_team) {
            return false;
        }

        let covered: HashSet<FieldPosition> = lineup.iter().map(|s| s.field_position).collect();
        FieldPosition::REQUIRED.iter().all(|p| covered.contains(p))
    }

    /// Puts a player in an empty slot.
    fn add_player(
        &mut self,
        slot: u8,
        player_id: PlayerId,
        position: FieldPosition,
        rules: &SoftballRules,
    ) -> Result<(), LineupError>;

    /// Replaces the occupant of `slot`, who must be `outgoing`.
    fn substitute_player(
        &mut self,
        slot: u8,
        outgoing: &PlayerId,
        incoming: PlayerId,
        position: FieldPosition,
        rules: &SoftballRules,
    ) -> Result<(), LineupError>;

    /// Moves a lineup player to another position.
    fn change_player_position(
        &mut self,
        player_id: &PlayerId,
        position: FieldPosition,
        at: DateTime<Utc>,
    ) -> Result<(), LineupError>;
}

/// Selects a strategy variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Overwrite semantics with unlimited re-entry.
    Simple,
    /// Tracks starters and substitution history; re-entry is limited.
    Detailed,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Simple => "SIMPLE",
            StrategyKind::Detailed => "DETAILED",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A team's lineup strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LineupStrategy {
    Simple(SimpleStrategy),
    Detailed(DetailedStrategy),
}

impl LineupStrategy {
    /// Creates an empty strategy of the given kind.
    pub fn new(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Simple => LineupStrategy::Simple(SimpleStrategy::new()),
            StrategyKind::Detailed => LineupStrategy::Detailed(DetailedStrategy::new()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            LineupStrategy::Simple(_) => StrategyKind::Simple,
            LineupStrategy::Detailed(_) => StrategyKind::Detailed,
        }
    }

    /// Substitution history of a player; only the detailed strategy keeps one.
    pub fn substitution_history(&self, player_id: &PlayerId) -> Option<&PlayerSubstitutionHistory> {
        match self {
            LineupStrategy::Simple(_) => None,
            LineupStrategy::Detailed(strategy) => strategy.substitution_history(player_id),
        }
    }

    fn as_dyn(&self) -> &dyn TeamStrategy {
        match self {
            LineupStrategy::Simple(strategy) => strategy,
            LineupStrategy::Detailed(strategy) => strategy,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn TeamStrategy {
        match self {
            LineupStrategy::Simple(strategy) => strategy,
            LineupStrategy::Detailed(strategy) => strategy,
        }
    }
}

impl TeamStrategy for LineupStrategy {
    fn current_lineup(&self) -> Vec<BattingSlotState> {
        self.as_dyn().current_lineup()
    }

    fn player_batting_slot(&self, player_id: &PlayerId) -> Option<u8> {
        self.as_dyn().player_batting_slot(player_id)
    }

    fn player_field_position(&self, player_id: &PlayerId) -> Option<FieldPosition> {
        self.as_dyn().player_field_position(player_id)
    }

    fn is_lineup_valid(&self, rules: &SoftballRules) -> bool {
        self.as_dyn().is_lineup_valid(rules)
    }

    fn add_player(
        &mut self,
        slot: u8,
        player_id: PlayerId,
        position: FieldPosition,
        rules: &SoftballRules,
    ) -> Result<(), LineupError> {
        self.as_dyn_mut().add_player(slot, player_id, position, rules)
    }

    fn substitute_player(
        &mut self,
        slot: u8,
        outgoing: &PlayerId,
        incoming: PlayerId,
        position: FieldPosition,
        rules: &SoftballRules,
    ) -> Result<(), LineupError> {
        self.as_dyn_mut()
            .substitute_player(slot, outgoing, incoming, position, rules)
    }

    fn change_player_position(
        &mut self,
        player_id: &PlayerId,
        position: FieldPosition,
        at: DateTime<Utc>,
    ) -> Result<(), LineupError> {
        self.as_dyn_mut().change_player_position(player_id, position, at)
    }
}
