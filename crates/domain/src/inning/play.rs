//! Plate appearances and runner movement.

use common::PlayerId;
use serde::{Deserialize, Serialize};

use super::bases::{Base, RunnerDestination};

/// How a plate appearance ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtBatResult {
    Single,
    Double,
    Triple,
    HomeRun,
    Walk,
    HitByPitch,
    ReachedOnError,
    FieldersChoice,
    Strikeout,
    GroundOut,
    FlyOut,
    LineOut,
    PopOut,
    SacrificeFly,
    DoublePlay,
    TriplePlay,
}

impl AtBatResult {
    /// Returns true for base hits.
    pub fn is_hit(&self) -> bool {
        matches!(
            self,
            AtBatResult::Single | AtBatResult::Double | AtBatResult::Triple | AtBatResult::HomeRun
        )
    }

    /// Returns true when the batter is awarded first base without a hit.
    pub fn is_base_award(&self) -> bool {
        matches!(self, AtBatResult::Walk | AtBatResult::HitByPitch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AtBatResult::Single => "SINGLE",
            AtBatResult::Double => "DOUBLE",
            AtBatResult::Triple => "TRIPLE",
            AtBatResult::HomeRun => "HOME_RUN",
            AtBatResult::Walk => "WALK",
            AtBatResult::HitByPitch => "HIT_BY_PITCH",
            AtBatResult::ReachedOnError => "REACHED_ON_ERROR",
            AtBatResult::FieldersChoice => "FIELDERS_CHOICE",
            AtBatResult::Strikeout => "STRIKEOUT",
            AtBatResult::GroundOut => "GROUND_OUT",
            AtBatResult::FlyOut => "FLY_OUT",
            AtBatResult::LineOut => "LINE_OUT",
            AtBatResult::PopOut => "POP_OUT",
            AtBatResult::SacrificeFly => "SACRIFICE_FLY",
            AtBatResult::DoublePlay => "DOUBLE_PLAY",
            AtBatResult::TriplePlay => "TRIPLE_PLAY",
        }
    }
}

impl std::fmt::Display for AtBatResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a runner (or the batter) ends a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunnerOutcome {
    /// Safe on a base.
    Safe(Base),
    /// Crossed home plate.
    Scored,
    /// Put out; adds one out.
    Out,
}

impl RunnerOutcome {
    /// The destination on the bases, or None for an out.
    pub fn destination(&self) -> Option<RunnerDestination> {
        match self {
            RunnerOutcome::Safe(base) => Some(RunnerDestination::Base(*base)),
            RunnerOutcome::Scored => Some(RunnerDestination::Home),
            RunnerOutcome::Out => None,
        }
    }

    pub fn is_run(&self) -> bool {
        matches!(self, RunnerOutcome::Scored)
    }

    pub fn is_out(&self) -> bool {
        matches!(self, RunnerOutcome::Out)
    }
}

impl From<RunnerDestination> for RunnerOutcome {
    fn from(destination: RunnerDestination) -> Self {
        match destination {
            RunnerDestination::Base(base) => RunnerOutcome::Safe(base),
            RunnerDestination::Home => RunnerOutcome::Scored,
        }
    }
}

/// A runner already on base and where they ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerMove {
    pub from: Base,
    pub outcome: RunnerOutcome,
}

impl RunnerMove {
    pub fn new(from: Base, outcome: RunnerOutcome) -> Self {
        Self { from, outcome }
    }
}

/// A completed plate appearance as reported by the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtBatPlay {
    pub batter_id: PlayerId,
    pub batting_slot: u8,
    /// Slot due up after this plate appearance.
    pub next_batting_slot: u8,
    pub result: AtBatResult,
    pub batter_outcome: RunnerOutcome,
    /// Moves of runners who were on base when the play started.
    /// Runners left out stay where they are.
    pub runner_moves: Vec<RunnerMove>,
    pub rbi: u8,
}

impl AtBatPlay {
    pub fn new(
        batter_id: PlayerId,
        batting_slot: u8,
        next_batting_slot: u8,
        result: AtBatResult,
        batter_outcome: RunnerOutcome,
    ) -> Self {
        Self {
            batter_id,
            batting_slot,
            next_batting_slot,
            result,
            batter_outcome,
            runner_moves: Vec::new(),
            rbi: 0,
        }
    }

    pub fn with_runner_move(mut self, from: Base, outcome: RunnerOutcome) -> Self {
        self.runner_moves.push(RunnerMove::new(from, outcome));
        self
    }

    pub fn with_rbi(mut self, rbi: u8) -> Self {
        self.rbi = rbi;
        self
    }

    /// Runs scored on the play, batter included.
    pub fn runs_scored(&self) -> u8 {
        let runners = self
            .runner_moves
            .iter()
            .filter(|m| m.outcome.is_run())
            .count();
        (runners + usize::from(self.batter_outcome.is_run())) as u8
    }

    /// Outs recorded on the play, batter included.
    pub fn outs_recorded(&self) -> u8 {
        let runners = self
            .runner_moves
            .iter()
            .filter(|m| m.outcome.is_out())
            .count();
        (runners + usize::from(self.batter_outcome.is_out())) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batter() -> PlayerId {
        PlayerId::new("batter").unwrap()
    }

    #[test]
    fn test_result_classification() {
        assert!(AtBatResult::Double.is_hit());
        assert!(!AtBatResult::Walk.is_hit());
        assert!(AtBatResult::HitByPitch.is_base_award());
        assert!(!AtBatResult::ReachedOnError.is_base_award());
    }

    #[test]
    fn test_runs_and_outs_are_counted() {
        let play = AtBatPlay::new(batter(), 3, 4, AtBatResult::SacrificeFly, RunnerOutcome::Out)
            .with_runner_move(Base::Third, RunnerOutcome::Scored)
            .with_runner_move(Base::First, RunnerOutcome::Safe(Base::First))
            .with_rbi(1);
        assert_eq!(play.runs_scored(), 1);
        assert_eq!(play.outs_recorded(), 1);
        assert_eq!(play.rbi, 1);
    }

    #[test]
    fn test_home_run_counts_batter() {
        let play = AtBatPlay::new(batter(), 1, 2, AtBatResult::HomeRun, RunnerOutcome::Scored)
            .with_runner_move(Base::Second, RunnerOutcome::Scored);
        assert_eq!(play.runs_scored(), 2);
        assert_eq!(play.outs_recorded(), 0);
    }

    #[test]
    fn test_outcome_from_destination() {
        assert_eq!(
            RunnerOutcome::from(RunnerDestination::Home),
            RunnerOutcome::Scored
        );
        assert_eq!(
            RunnerOutcome::Safe(Base::Second).destination(),
            Some(RunnerDestination::Base(Base::Second))
        );
        assert_eq!(RunnerOutcome::Out.destination(), None);
    }
}
