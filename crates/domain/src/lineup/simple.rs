use chrono::{DateTime, Utc};
use common::PlayerId;
use serde::{Deserialize, Serialize};

use crate::rules::SoftballRules;

use super::{BattingSlotState, FieldPosition, LineupError, TeamStrategy, slots::SlotMap};

/// Lineup strategy with plain overwrite semantics.
///
/// Keeps no history: any player not currently in the lineup may come in,
/// including one substituted out earlier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleStrategy {
    slots: SlotMap,
}

impl SimpleStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole lineup at once.
    ///
    /// Rejects duplicate slot numbers, players listed twice, and slots out of
    /// range; the current lineup is kept on error.
    pub fn set_current_lineup(
        &mut self,
        lineup: Vec<BattingSlotState>,
        rules: &SoftballRules,
    ) -> Result<(), LineupError> {
        self.slots = SlotMap::from_lineup(lineup, rules)?;
        Ok(())
    }
}

impl TeamStrategy for SimpleStrategy {
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
        self.slots
            .insert(BattingSlotState::new(slot, incoming, position));
        Ok(())
    }

    fn change_player_position(
        &mut self,
        player_id: &PlayerId,
        position: FieldPosition,
        _at: DateTime<Utc>,
    ) -> Result<(), LineupError> {
        self.slots.set_position(player_id, position)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str) -> PlayerId {
        PlayerId::new(id).unwrap()
    }

    #[test]
    fn test_unlimited_reentry() {
        let rules = SoftballRules::default().with_reentry(false);
        let mut strategy = SimpleStrategy::new();
        strategy
            .add_player(1, player("a"), FieldPosition::Pitcher, &rules)
            .unwrap();

        for _ in 0..3 {
            strategy
                .substitute_player(1, &player("a"), player("b"), FieldPosition::Pitcher, &rules)
                .unwrap();
            strategy
                .substitute_player(1, &player("b"), player("a"), FieldPosition::Pitcher, &rules)
                .unwrap();
        }

        assert_eq!(strategy.player_batting_slot(&player("a")), Some(1));
        assert!(!strategy.is_player_in_lineup(&player("b")));
    }

    #[test]
    fn test_failed_substitution_leaves_state_unchanged() {
        let rules = SoftballRules::default();
        let mut strategy = SimpleStrategy::new();
        strategy
            .add_player(1, player("a"), FieldPosition::Pitcher, &rules)
            .unwrap();
        strategy
            .add_player(2, player("b"), FieldPosition::Catcher, &rules)
            .unwrap();
        let before = strategy.clone();

        let result =
            strategy.substitute_player(1, &player("a"), player("b"), FieldPosition::Pitcher, &rules);
        assert!(matches!(
            result,
            Err(LineupError::PlayerAlreadyInLineup { slot: 2, .. })
        ));
        assert_eq!(strategy, before);
    }

    #[test]
    fn test_set_current_lineup() {
        let rules = SoftballRules::default();
        let mut strategy = SimpleStrategy::new();
        strategy
            .add_player(1, player("old"), FieldPosition::Pitcher, &rules)
            .unwrap();

        strategy
            .set_current_lineup(
                vec![
                    BattingSlotState::new(2, player("b"), FieldPosition::Catcher),
                    BattingSlotState::new(1, player("a"), FieldPosition::Pitcher),
                ],
                &rules,
            )
            .unwrap();

        let lineup = strategy.current_lineup();
        assert_eq!(lineup.len(), 2);
        assert_eq!(lineup[0].player_id, player("a"));
        assert!(!strategy.is_player_in_lineup(&player("old")));
    }

    #[test]
    fn test_set_current_lineup_rejects_out_of_range_slot() {
        let rules = SoftballRules::default();
        let mut strategy = SimpleStrategy::new();
        strategy
            .add_player(1, player("a"), FieldPosition::Pitcher, &rules)
            .unwrap();
        let before = strategy.clone();

        let result = strategy.set_current_lineup(
            vec![BattingSlotState::new(0, player("b"), FieldPosition::Catcher)],
            &rules,
        );
        assert!(matches!(result, Err(LineupError::Configuration(_))));
        assert_eq!(strategy, before);
    }

    #[test]
    fn test_change_position() {
        let rules = SoftballRules::default();
        let mut strategy = SimpleStrategy::new();
        strategy
            .add_player(1, player("a"), FieldPosition::Pitcher, &rules)
            .unwrap();
        strategy
            .change_player_position(&player("a"), FieldPosition::LeftField, Utc::now())
            .unwrap();
        assert_eq!(
            strategy.player_field_position(&player("a")),
            Some(FieldPosition::LeftField)
        );
        assert!(matches!(
            strategy.change_player_position(&player("x"), FieldPosition::Catcher, Utc::now()),
            Err(LineupError::PlayerNotInLineup(_))
        ));
    }
}
