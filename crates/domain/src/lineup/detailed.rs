use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::PlayerId;
use serde::{Deserialize, Serialize};

use crate::rules::SoftballRules;

use super::{BattingSlotState, FieldPosition, LineupError, TeamStrategy, slots::SlotMap};

/// One recorded change of defensive position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange {
    pub from: FieldPosition,
    pub to: FieldPosition,
    pub at: DateTime<Utc>,
}

/// What the detailed strategy knows about a player who has appeared in the
/// lineup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSubstitutionHistory {
    pub is_starter: bool,
    pub times_substituted: u32,
    pub can_reenter: bool,
    pub position_changes: Vec<PositionChange>,
}

impl PlayerSubstitutionHistory {
    fn starter() -> Self {
        Self {
            is_starter: true,
            can_reenter: true,
            ..Self::default()
        }
    }
}

/// Lineup strategy that tracks starters and limits re-entry.
///
/// A starter substituted out for the first time may come back once (when the
/// rules allow re-entry). Coming back consumes that eligibility; players who
/// entered as substitutes never re-enter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedStrategy {
    slots: SlotMap,
    history: BTreeMap<PlayerId, PlayerSubstitutionHistory>,
}

impl DetailedStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn substitution_history(&self, player_id: &PlayerId) -> Option<&PlayerSubstitutionHistory> {
        self.history.get(player_id)
    }

    /// Every player who has appeared in the lineup, in id order.
    pub fn tracked_players(&self) -> impl Iterator<Item = (&PlayerId, &PlayerSubstitutionHistory)> {
        self.history.iter()
    }

    fn check_eligible(&self, player_id: &PlayerId) -> Result<(), LineupError> {
        match self.history.get(player_id) {
            Some(history) if !history.can_reenter => {
                Err(LineupError::ReentryNotAllowed(player_id.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Records entry of a player; a returning player uses up their re-entry.
    fn record_entry(&mut self, player_id: &PlayerId, as_starter: bool) {
        match self.history.get_mut(player_id) {
            Some(history) => history.can_reenter = false,
            None => {
                let history = if as_starter {
                    PlayerSubstitutionHistory::starter()
                } else {
                    PlayerSubstitutionHistory::default()
                };
                self.history.insert(player_id.clone(), history);
            }
        }
    }
}

impl TeamStrategy for DetailedStrategy {
    fn current_lineup(&self) -> Vec<BattingSlotState> {
        self.slots.to_lineup()
    }

    fn player_batting_slot(&self, player_id: &PlayerId) -> Option<u8> {
        self.slots.find(player_id).map(|s| s.slot)
    }

    fn player_field_position(&self, player_id: &PlayerId) -> Option<FieldPosition> {
        self.slots.find(player_id).map(|s| s.field_position)
    }

    fn active_player_count(&self) -> usize {
        self.slots.len()
    }

    fn add_player(
        &mut self,
        slot: u8,
        player_id: PlayerId,
        position: FieldPosition,
        rules: &SoftballRules,
    ) -> Result<(), LineupError> {
        self.slots.check_add(slot, &player_id, rules)?;
        self.check_eligible(&player_id)?;

        self.record_entry(&player_id, true);
        self.slots
            .insert(BattingSlotState::new(slot, player_id, position));
        Ok(())
    }

    fn substitute_player(
        &mut self,
        slot: u8,
        outgoing: &PlayerId,
        incoming: PlayerId,
        position: FieldPosition,
        rules: &SoftballRules,
    ) -> Result<(), LineupError> {
        self.slots
            .check_substitution(slot, outgoing, &incoming, rules)?;
        self.check_eligible(&incoming)?;

        let leaving = self.history.entry(outgoing.clone()).or_default();
        let previous_times = leaving.times_substituted;
        leaving.times_substituted += 1;
        leaving.can_reenter = rules.allow_reentry && leaving.is_starter && previous_times == 0;

        self.record_entry(&incoming, false);
        self.slots
            .insert(BattingSlotState::new(slot, incoming, position));
        Ok(())
    }

    fn change_player_position(
        &mut self,
        player_id: &PlayerId,
        position: FieldPosition,
        at: DateTime<Utc>,
    ) -> Result<(), LineupError> {
        let from = self.slots.set_position(player_id, position)?;
        self.history
            .entry(player_id.clone())
            .or_default()
            .position_changes
            .push(PositionChange {
                from,
                to: position,
                at,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str) -> PlayerId {
        PlayerId::new(id).unwrap()
    }

    fn with_starter(rules: &SoftballRules) -> DetailedStrategy {
        let mut strategy = DetailedStrategy::new();
        strategy
            .add_player(1, player("a"), FieldPosition::Pitcher, rules)
            .unwrap();
        strategy
    }

    #[test]
    fn test_add_player_records_starter() {
        let strategy = with_starter(&SoftballRules::default());
        let history = strategy.substitution_history(&player("a")).unwrap();
        assert!(history.is_starter);
        assert!(history.can_reenter);
        assert_eq!(history.times_substituted, 0);
    }

    #[test]
    fn test_reentry_lifecycle() {
        let rules = SoftballRules::default();
        let mut strategy = with_starter(&rules);

        strategy
            .substitute_player(1, &player("a"), player("b"), FieldPosition::Pitcher, &rules)
            .unwrap();
        let a = strategy.substitution_history(&player("a")).unwrap();
        assert_eq!(a.times_substituted, 1);
        assert!(a.can_reenter);
        let b = strategy.substitution_history(&player("b")).unwrap();
        assert!(!b.is_starter);
        assert!(!b.can_reenter);

        strategy
            .substitute_player(1, &player("b"), player("a"), FieldPosition::Pitcher, &rules)
            .unwrap();
        assert!(!strategy.substitution_history(&player("a")).unwrap().can_reenter);

        strategy
            .substitute_player(1, &player("a"), player("c"), FieldPosition::Pitcher, &rules)
            .unwrap();
        let a = strategy.substitution_history(&player("a")).unwrap();
        assert_eq!(a.times_substituted, 2);
        assert!(!a.can_reenter);

        let before = strategy.clone();
        let result =
            strategy.substitute_player(1, &player("c"), player("a"), FieldPosition::Pitcher, &rules);
        assert!(matches!(result, Err(LineupError::ReentryNotAllowed(_))));
        assert_eq!(strategy, before);
    }

    #[test]
    fn test_substitute_cannot_reenter() {
        let rules = SoftballRules::default();
        let mut strategy = with_starter(&rules);
        strategy
            .substitute_player(1, &player("a"), player("b"), FieldPosition::Pitcher, &rules)
            .unwrap();
        strategy
            .substitute_player(1, &player("b"), player("c"), FieldPosition::Pitcher, &rules)
            .unwrap();

        let b = strategy.substitution_history(&player("b")).unwrap();
        assert_eq!(b.times_substituted, 1);
        assert!(!b.can_reenter);
        assert!(matches!(
            strategy.substitute_player(1, &player("c"), player("b"), FieldPosition::Pitcher, &rules),
            Err(LineupError::ReentryNotAllowed(_))
        ));
    }

    #[test]
    fn test_reentry_disabled_by_rules() {
        let rules = SoftballRules::default().with_reentry(false);
        let mut strategy = with_starter(&rules);
        strategy
            .substitute_player(1, &player("a"), player("b"), FieldPosition::Pitcher, &rules)
            .unwrap();

        assert!(!strategy.substitution_history(&player("a")).unwrap().can_reenter);
        assert!(matches!(
            strategy.substitute_player(1, &player("b"), player("a"), FieldPosition::Pitcher, &rules),
            Err(LineupError::ReentryNotAllowed(_))
        ));
    }

    #[test]
    fn test_position_changes_are_recorded() {
        let rules = SoftballRules::default();
        let mut strategy = with_starter(&rules);
        let at = Utc::now();

        strategy
            .change_player_position(&player("a"), FieldPosition::FirstBase, at)
            .unwrap();

        let history = strategy.substitution_history(&player("a")).unwrap();
        assert_eq!(
            history.position_changes,
            vec![PositionChange {
                from: FieldPosition::Pitcher,
                to: FieldPosition::FirstBase,
                at,
            }]
        );
        assert_eq!(strategy.tracked_players().count(), 1);
    }
}
