//! Value objects for lineups.

use common::PlayerId;
use serde::{Deserialize, Serialize};

use super::LineupError;

/// A defensive position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldPosition {
    Pitcher,
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    Shortstop,
    LeftField,
    CenterField,
    RightField,
    ShortFielder,
    ExtraPlayer,
}

impl FieldPosition {
    /// Positions every valid lineup must cover.
    pub const REQUIRED: [FieldPosition; 9] = [
        FieldPosition::Pitcher,
        FieldPosition::Catcher,
        FieldPosition::FirstBase,
        FieldPosition::SecondBase,
        FieldPosition::ThirdBase,
        FieldPosition::Shortstop,
        FieldPosition::LeftField,
        FieldPosition::CenterField,
        FieldPosition::RightField,
    ];

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldPosition::Pitcher => "PITCHER",
            FieldPosition::Catcher => "CATCHER",
            FieldPosition::FirstBase => "FIRST_BASE",
            FieldPosition::SecondBase => "SECOND_BASE",
            FieldPosition::ThirdBase => "THIRD_BASE",
            FieldPosition::Shortstop => "SHORTSTOP",
            FieldPosition::LeftField => "LEFT_FIELD",
            FieldPosition::CenterField => "CENTER_FIELD",
            FieldPosition::RightField => "RIGHT_FIELD",
            FieldPosition::ShortFielder => "SHORT_FIELDER",
            FieldPosition::ExtraPlayer => "EXTRA_PLAYER",
        }
    }
}

impl std::fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A jersey number, 0 through 99.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct JerseyNumber(u8);

impl JerseyNumber {
    pub const MAX: u8 = 99;

    pub fn new(value: u8) -> Result<Self, LineupError> {
        if value > Self::MAX {
            return Err(LineupError::InvalidJerseyNumber(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for JerseyNumber {
    type Error = LineupError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JerseyNumber> for u8 {
    fn from(number: JerseyNumber) -> Self {
        number.0
    }
}

impl std::fmt::Display for JerseyNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One occupied batting slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingSlotState {
    pub slot: u8,
    pub player_id: PlayerId,
    pub field_position: FieldPosition,
}

impl BattingSlotState {
    pub fn new(slot: u8, player_id: PlayerId, field_position: FieldPosition) -> Self {
        Self {
            slot,
            player_id,
            field_position,
        }
    }
}
