use std::collections::{BTreeMap, HashSet};

use common::PlayerId;
use serde::{Deserialize, Serialize};

use crate::rules::SoftballRules;

use super::{BattingSlotState, FieldPosition, LineupError};

/// Batting slots keyed by slot number.
///
/// Shared storage for both strategies. The `check_*` methods validate without
/// mutating so that callers can check first and then commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SlotMap {
    slots: BTreeMap<u8, BattingSlotState>,
}

impl SlotMap {
    pub(crate) fn get(&self, slot: u8) -> Option<&BattingSlotState> {
        self.slots.get(&slot)
    }

    pub(crate) fn find(&self, player_id: &PlayerId) -> Option<&BattingSlotState> {
        self.slots.values().find(|s| &s.player_id == player_id)
    }

    /// Occupied slots ordered by slot number.
    pub(crate) fn to_lineup(&self) -> Vec<BattingSlotState> {
        self.slots.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn check_add(
        &self,
        slot: u8,
        player_id: &PlayerId,
        rules: &SoftballRules,
    ) -> Result<(), LineupError> {
        rules.validate_batting_slot(slot)?;

        if let Some(occupant) = self.get(slot) {
            return Err(LineupError::SlotOccupied {
                slot,
                player_id: occupant.player_id.clone(),
            });
        }
        self.check_not_in_lineup(player_id)
    }

    pub(crate) fn check_substitution(
        &self,
        slot: u8,
        outgoing: &PlayerId,
        incoming: &PlayerId,
        rules: &SoftballRules,
    ) -> Result<(), LineupError> {
        rules.validate_batting_slot(slot)?;

        let occupant = self.get(slot).ok_or(LineupError::SlotEmpty { slot })?;
        if &occupant.player_id != outgoing {
            return Err(LineupError::OutgoingPlayerMismatch {
                slot,
                expected: outgoing.clone(),
                actual: occupant.player_id.clone(),
            });
        }
        self.check_not_in_lineup(incoming)
    }

    fn check_not_in_lineup(&self, player_id: &PlayerId) -> Result<(), LineupError> {
        match self.find(player_id) {
            Some(existing) => Err(LineupError::PlayerAlreadyInLineup {
                player_id: player_id.clone(),
                slot: existing.slot,
            }),
            None => Ok(()),
        }
    }

    /// Puts a player in a slot, replacing any occupant.
    pub(crate) fn insert(&mut self, state: BattingSlotState) {
        self.slots.insert(state.slot, state);
    }

    /// Moves a lineup player to another position, returning the old one.
    pub(crate) fn set_position(
        &mut self,
        player_id: &PlayerId,
        position: FieldPosition,
    ) -> Result<FieldPosition, LineupError> {
        let state = self
            .slots
            .values_mut()
            .find(|s| &s.player_id == player_id)
            .ok_or_else(|| LineupError::PlayerNotInLineup(player_id.clone()))?;
        Ok(std::mem::replace(&mut state.field_position, position))
    }

    /// Builds a slot map from a complete lineup, rejecting duplicate slots,
    /// duplicate players, and slots out of range.
    pub(crate) fn from_lineup(
        lineup: Vec<BattingSlotState>,
        rules: &SoftballRules,
    ) -> Result<Self, LineupError> {
        let mut slots = BTreeMap::new();
        let mut players = HashSet::new();

        for state in lineup {
            rules.validate_batting_slot(state.slot)?;
            if !players.insert(state.player_id.clone()) {
                return Err(LineupError::DuplicatePlayer(state.player_id));
            }
            if slots.contains_key(&state.slot) {
                return Err(LineupError::DuplicateSlot(state.slot));
            }
            slots.insert(state.slot, state);
        }

        Ok(Self { slots })
    }
}
