//! Half-inning transitions.
//!
//! When a half-inning is over (or someone asks for it to be), the game either
//! moves on or ends. [`evaluate_half_inning_end`] decides which, checking
//! conditions in a fixed order:
//!
//! 1. forfeit
//! 2. walk-off: bottom half of the final regulation inning or later, home ahead
//! 3. mercy rule
//! 4. the half-inning is still live (fewer than three outs, not ended manually)
//! 5. time limit
//! 6. regulation end: top of the final inning with home ahead, or a decided
//!    bottom half in the final inning or later
//! 7. otherwise the next half-inning or inning

use serde::{Deserialize, Serialize};

use crate::game::{Score, TeamSide};
use crate::rules::SoftballRules;

/// Outs that end a half-inning.
pub const OUTS_PER_HALF_INNING: u8 = 3;

/// Why a half-inning (or the game) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndingReason {
    ThreeOuts,
    MercyRule,
    TimeLimit,
    Forfeit,
    Walkoff,
    /// Ended by an official regardless of outs.
    Manual,
}

impl EndingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndingReason::ThreeOuts => "THREE_OUTS",
            EndingReason::MercyRule => "MERCY_RULE",
            EndingReason::TimeLimit => "TIME_LIMIT",
            EndingReason::Forfeit => "FORFEIT",
            EndingReason::Walkoff => "WALKOFF",
            EndingReason::Manual => "MANUAL",
        }
    }
}

impl std::fmt::Display for EndingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Discriminant of [`InningTransition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    HalfInning,
    FullInning,
    GameEnd,
    Failed,
}

/// The outcome of ending a half-inning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum InningTransition {
    /// Top half over; the bottom of the same inning starts.
    HalfInning { inning: u32, reason: EndingReason },

    /// Bottom half over; the top of `new_inning` starts.
    /// Built through [`InningTransition::full_inning`] so that
    /// `new_inning == previous_inning + 1`.
    FullInning {
        previous_inning: u32,
        new_inning: u32,
        reason: EndingReason,
    },

    /// The game is over.
    GameEnd {
        inning: u32,
        is_top_half: bool,
        reason: EndingReason,
        final_score: Score,
    },

    /// The half-inning cannot end yet.
    Failed {
        inning: u32,
        is_top_half: bool,
        outs: u8,
        message: String,
    },
}

impl InningTransition {
    pub fn half_inning(inning: u32, reason: EndingReason) -> Self {
        InningTransition::HalfInning { inning, reason }
    }

    pub fn full_inning(previous_inning: u32, reason: EndingReason) -> Self {
        InningTransition::FullInning {
            previous_inning,
            new_inning: previous_inning + 1,
            reason,
        }
    }

    pub fn game_end(inning: u32, is_top_half: bool, reason: EndingReason, final_score: Score) -> Self {
        InningTransition::GameEnd {
            inning,
            is_top_half,
            reason,
            final_score,
        }
    }

    pub fn failed(inning: u32, is_top_half: bool, outs: u8, message: impl Into<String>) -> Self {
        InningTransition::Failed {
            inning,
            is_top_half,
            outs,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransitionKind {
        match self {
            InningTransition::HalfInning { .. } => TransitionKind::HalfInning,
            InningTransition::FullInning { .. } => TransitionKind::FullInning,
            InningTransition::GameEnd { .. } => TransitionKind::GameEnd,
            InningTransition::Failed { .. } => TransitionKind::Failed,
        }
    }

    /// The half-inning the transition ends, as `(inning, is_top_half)`.
    pub fn ending_half(&self) -> (u32, bool) {
        match self {
            InningTransition::HalfInning { inning, .. } => (*inning, true),
            InningTransition::FullInning {
                previous_inning, ..
            } => (*previous_inning, false),
            InningTransition::GameEnd {
                inning,
                is_top_half,
                ..
            }
            | InningTransition::Failed {
                inning,
                is_top_half,
                ..
            } => (*inning, *is_top_half),
        }
    }

    /// The half-inning that starts next, if play continues.
    pub fn next_half(&self) -> Option<(u32, bool)> {
        match self {
            InningTransition::HalfInning { inning, .. } => Some((*inning, false)),
            InningTransition::FullInning { new_inning, .. } => Some((*new_inning, true)),
            InningTransition::GameEnd { .. } | InningTransition::Failed { .. } => None,
        }
    }

    /// The ending reason, absent for a failed transition.
    pub fn reason(&self) -> Option<EndingReason> {
        match self {
            InningTransition::HalfInning { reason, .. }
            | InningTransition::FullInning { reason, .. }
            | InningTransition::GameEnd { reason, .. } => Some(*reason),
            InningTransition::Failed { .. } => None,
        }
    }

    pub fn is_game_end(&self) -> bool {
        matches!(self, InningTransition::GameEnd { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, InningTransition::Failed { .. })
    }
}

/// Game-level facts needed to evaluate a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSituation {
    pub score: Score,
    /// Minutes since the first pitch, when known.
    pub elapsed_minutes: Option<u32>,
}

impl GameSituation {
    pub fn new(score: Score) -> Self {
        Self {
            score,
            elapsed_minutes: None,
        }
    }

    pub fn with_elapsed_minutes(mut self, minutes: u32) -> Self {
        self.elapsed_minutes = Some(minutes);
        self
    }
}

/// Decides what ending the given half-inning leads to.
///
/// `requested` carries an explicit request: `Forfeit` ends the game at once,
/// `Manual` ends the half regardless of outs. Any other requested reason must
/// agree with the evaluated outcome, otherwise the transition fails.
pub fn evaluate_half_inning_end(
    inning: u32,
    is_top_half: bool,
    outs: u8,
    situation: &GameSituation,
    requested: Option<EndingReason>,
    rules: &SoftballRules,
) -> InningTransition {
    let evaluated = evaluate(inning, is_top_half, outs, situation, requested, rules);

    match requested {
        Some(reason @ (EndingReason::ThreeOuts
        | EndingReason::MercyRule
        | EndingReason::TimeLimit
        | EndingReason::Walkoff))
            if !evaluated.is_failed() && evaluated.reason() != Some(reason) =>
        {
            let found = evaluated
                .reason()
                .map(|r| r.as_str())
                .unwrap_or("NONE");
            InningTransition::failed(
                inning,
                is_top_half,
                outs,
                format!("requested {reason} but the half-inning ends by {found}"),
            )
        }
        _ => evaluated,
    }
}

fn evaluate(
    inning: u32,
    is_top_half: bool,
    outs: u8,
    situation: &GameSituation,
    requested: Option<EndingReason>,
    rules: &SoftballRules,
) -> InningTransition {
    let score = situation.score;
    let game_end = |reason| InningTransition::game_end(inning, is_top_half, reason, score);

    if requested == Some(EndingReason::Forfeit) {
        return game_end(EndingReason::Forfeit);
    }

    let final_inning = rules.is_final_inning_or_later(inning);
    let leader = score.leader();

    if !is_top_half && final_inning && leader == Some(TeamSide::Home) {
        return game_end(EndingReason::Walkoff);
    }

    let manual = requested == Some(EndingReason::Manual);
    let half_complete = outs >= OUTS_PER_HALF_INNING || manual;

    let mercy_reached = rules
        .applicable_mercy_tier(score.differential(), inning)
        .is_some();
    // The home lead stands once the top half is done or while home bats;
    // an away lead only once home has had its last turn in the inning.
    let mercy = match leader {
        Some(TeamSide::Home) => mercy_reached && (!is_top_half || half_complete),
        Some(TeamSide::Away) => mercy_reached && !is_top_half && half_complete,
        None => false,
    };
    if mercy {
        return game_end(EndingReason::MercyRule);
    }

    if !half_complete {
        return InningTransition::failed(
            inning,
            is_top_half,
            outs,
            format!("half-inning still in progress with {outs} outs"),
        );
    }

    let reason = if manual {
        EndingReason::Manual
    } else {
        EndingReason::ThreeOuts
    };

    let time_expired = match (rules.time_limit_minutes, situation.elapsed_minutes) {
        (Some(limit), Some(elapsed)) => elapsed >= limit,
        _ => false,
    };
    // No new inning starts past the limit; the top half ends early only when
    // home does not need to bat.
    if time_expired && (!is_top_half || leader == Some(TeamSide::Home)) {
        return game_end(EndingReason::TimeLimit);
    }

    if final_inning {
        let decided = if is_top_half {
            leader == Some(TeamSide::Home)
        } else {
            leader.is_some()
        };
        if decided {
            return game_end(reason);
        }
    }

    if is_top_half {
        InningTransition::half_inning(inning, reason)
    } else {
        InningTransition::full_inning(inning, reason)
    }
}
