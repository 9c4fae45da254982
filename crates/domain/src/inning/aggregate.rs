//! Inning state aggregate implementation.

use chrono::{DateTime, Utc};
use common::{GameId, InningStateId, PlayerId};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::ApplyError;
use crate::game::TeamSide;
use crate::rules::SoftballRules;

use super::{
    AtBatPlay, AtBatResult, Base, BasesState, EndingReason, GameSituation, InningError,
    InningStateEvent, InningTransition, OUTS_PER_HALF_INNING, RunnerDestination, RunnerOutcome,
    evaluate_half_inning_end, half_label,
    events::{AtBatCompletedData, HalfInningEndedData, InningStateCreatedData, RunnerAdvancedData},
};

/// Inning state aggregate root.
///
/// Tracks the half-inning in play: outs, runners, and whose turn it is to
/// bat for each team. Ending a half-inning resets outs and bases and moves
/// on to the next half, until a game-ending transition freezes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningState {
    id: InningStateId,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    game_id: GameId,
    inning: u32,
    is_top_half: bool,
    outs: u8,
    bases: BasesState,

    /// Next batting slot due up for each team.
    home_batting_slot: u8,
    away_batting_slot: u8,

    runs_this_half: u32,
    at_bats_this_half: u32,

    /// Set once a half-inning ended the game.
    ended: Option<EndingReason>,

    created_at: DateTime<Utc>,
}

impl Aggregate for InningState {
    type Id = InningStateId;
    type Event = InningStateEvent;
    type Error = InningError;

    fn aggregate_type() -> &'static str {
        "InningState"
    }

    fn id(&self) -> &InningStateId {
        &self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn initialize(event: InningStateEvent) -> Result<Self, ApplyError> {
        match event {
            InningStateEvent::InningStateCreated(data) => Self::from_created(data),
            other => Err(ApplyError::new(format!(
                "inning state cannot start with {}",
                other.event_type()
            ))),
        }
    }

    fn apply(&mut self, event: InningStateEvent) -> Result<(), ApplyError> {
        match event {
            InningStateEvent::InningStateCreated(_) => {
                Err(ApplyError::new("inning state already created"))
            }
            InningStateEvent::RunnerAdvanced(data) => self.apply_runner_advanced(data),
            InningStateEvent::AtBatCompleted(data) => self.apply_at_bat_completed(data),
            InningStateEvent::HalfInningEnded(data) => self.apply_half_inning_ended(data),
        }
    }
}

// Query methods
impl InningState {
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn inning(&self) -> u32 {
        self.inning
    }

    pub fn is_top_half(&self) -> bool {
        self.is_top_half
    }

    pub fn outs(&self) -> u8 {
        self.outs
    }

    pub fn bases(&self) -> &BasesState {
        &self.bases
    }

    /// The team at bat.
    pub fn batting_team(&self) -> TeamSide {
        TeamSide::batting_in(self.is_top_half)
    }

    /// The batting slot due up for the team at bat.
    pub fn current_batting_slot(&self) -> u8 {
        self.batting_slot_for(self.batting_team())
    }

    /// The batting slot due up next time `side` bats.
    pub fn batting_slot_for(&self, side: TeamSide) -> u8 {
        match side {
            TeamSide::Home => self.home_batting_slot,
            TeamSide::Away => self.away_batting_slot,
        }
    }

    pub fn runs_this_half(&self) -> u32 {
        self.runs_this_half
    }

    pub fn at_bats_this_half(&self) -> u32 {
        self.at_bats_this_half
    }

    /// The reason the game ended, once it has.
    pub fn ending_reason(&self) -> Option<EndingReason> {
        self.ended
    }

    pub fn is_game_over(&self) -> bool {
        self.ended.is_some()
    }

    /// Returns true while plays can still be recorded in this half-inning.
    pub fn is_live(&self) -> bool {
        self.ended.is_none() && self.outs < OUTS_PER_HALF_INNING
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Command methods (return events)
impl InningState {
    /// Starts tracking a game at the given half-inning.
    pub fn create(
        id: InningStateId,
        game_id: GameId,
        inning: u32,
        is_top_half: bool,
    ) -> Result<Vec<InningStateEvent>, InningError> {
        if inning == 0 {
            return Err(InningError::InvalidInning(inning));
        }

        Ok(vec![InningStateEvent::inning_state_created(
            id,
            game_id,
            inning,
            is_top_half,
        )])
    }

    /// Records a plate appearance.
    ///
    /// Emits one `RunnerAdvanced` per runner move (lead runner first), one
    /// for the batter, then `AtBatCompleted`.
    pub fn record_at_bat(
        &self,
        play: &AtBatPlay,
        rules: &SoftballRules,
    ) -> Result<Vec<InningStateEvent>, InningError> {
        self.ensure_live()?;
        rules.validate_batting_slot(play.batting_slot)?;
        rules.validate_batting_slot(play.next_batting_slot)?;

        let expected = self.current_batting_slot();
        if play.batting_slot != expected {
            return Err(InningError::OutOfTurn {
                expected,
                found: play.batting_slot,
            });
        }

        let mut moves = play.runner_moves.clone();
        moves.sort_by(|a, b| b.from.cmp(&a.from));
        if let Some(pair) = moves.windows(2).find(|pair| pair[0].from == pair[1].from) {
            return Err(InningError::DuplicateRunnerMove(pair[0].from));
        }

        let mut bases = self.bases.clone();
        let mut outs = self.outs;
        let mut runs: u8 = 0;
        let mut events = Vec::with_capacity(moves.len() + 2);

        for runner_move in &moves {
            let runner = bases
                .runner(runner_move.from)
                .cloned()
                .ok_or(InningError::EmptyBase(runner_move.from))?;
            let advance = advance_runner(&bases, &runner, Some(runner_move.from), runner_move.outcome)?;
            bases = advance.bases;
            outs = count_out(outs, advance.out)?;
            runs += u8::from(advance.run);
            events.push(InningStateEvent::runner_advanced(
                self.id.clone(),
                runner,
                Some(runner_move.from),
                runner_move.outcome,
            ));
        }

        let advance = advance_runner(&bases, &play.batter_id, None, play.batter_outcome)?;
        outs = count_out(outs, advance.out)?;
        runs += u8::from(advance.run);
        events.push(InningStateEvent::runner_advanced(
            self.id.clone(),
            play.batter_id.clone(),
            None,
            play.batter_outcome,
        ));

        if let Some(tolerance) = rules.rbi_tolerance {
            if u32::from(play.rbi) > u32::from(runs).saturating_add(tolerance) {
                return Err(InningError::InconsistentStatistics {
                    rbi: play.rbi,
                    runs,
                    tolerance,
                });
            }
        }

        events.push(InningStateEvent::at_bat_completed(
            self.id.clone(),
            play.batter_id.clone(),
            play.batting_slot,
            play.result,
            outs - self.outs,
            runs,
            play.rbi,
            play.next_batting_slot,
        ));

        Ok(events)
    }

    /// Builds the play for a walk or hit-by-pitch: the batter takes first
    /// and every forced runner moves up one base.
    pub fn walk_play(
        &self,
        batter_id: PlayerId,
        batting_slot: u8,
        next_batting_slot: u8,
        result: AtBatResult,
    ) -> AtBatPlay {
        let forced = self.bases.forced_advances();
        let rbi = forced
            .iter()
            .filter(|(_, to)| *to == RunnerDestination::Home)
            .count() as u8;

        forced
            .into_iter()
            .fold(
                AtBatPlay::new(
                    batter_id,
                    batting_slot,
                    next_batting_slot,
                    result,
                    RunnerOutcome::Safe(Base::First),
                ),
                |play, (from, to)| play.with_runner_move(from, to.into()),
            )
            .with_rbi(rbi)
    }

    /// Moves a runner outside of a plate appearance, e.g. a stolen base or
    /// a pickoff.
    pub fn move_runner(
        &self,
        from: Base,
        to: RunnerOutcome,
    ) -> Result<Vec<InningStateEvent>, InningError> {
        self.ensure_live()?;

        let runner = self
            .bases
            .runner(from)
            .cloned()
            .ok_or(InningError::EmptyBase(from))?;
        let advance = advance_runner(&self.bases, &runner, Some(from), to)?;
        count_out(self.outs, advance.out)?;

        Ok(vec![InningStateEvent::runner_advanced(
            self.id.clone(),
            runner,
            Some(from),
            to,
        )])
    }

    /// Decides what ending the current half-inning would lead to.
    pub fn evaluate_transition(
        &self,
        situation: &GameSituation,
        requested: Option<EndingReason>,
        rules: &SoftballRules,
    ) -> InningTransition {
        if let Some(reason) = self.ended {
            return InningTransition::failed(
                self.inning,
                self.is_top_half,
                self.outs,
                format!("game already ended by {reason}"),
            );
        }
        evaluate_half_inning_end(
            self.inning,
            self.is_top_half,
            self.outs,
            situation,
            requested,
            rules,
        )
    }

    /// Ends the current half-inning according to `transition`.
    pub fn end_half_inning(
        &self,
        transition: &InningTransition,
    ) -> Result<Vec<InningStateEvent>, InningError> {
        if self.ended.is_some() {
            return Err(InningError::GameOver);
        }

        let (reason, game_over) = match transition {
            InningTransition::Failed { message, .. } => {
                return Err(InningError::TransitionFailed(message.clone()));
            }
            InningTransition::GameEnd { reason, .. } => (*reason, true),
            InningTransition::HalfInning { reason, .. }
            | InningTransition::FullInning { reason, .. } => (*reason, false),
        };

        let (inning, is_top_half) = transition.ending_half();
        if (inning, is_top_half) != (self.inning, self.is_top_half) {
            return Err(InningError::TransitionMismatch {
                transition: half_label(inning, is_top_half),
                current: half_label(self.inning, self.is_top_half),
            });
        }

        Ok(vec![InningStateEvent::half_inning_ended(
            self.id.clone(),
            inning,
            is_top_half,
            reason,
            game_over,
        )])
    }

    fn ensure_live(&self) -> Result<(), InningError> {
        if self.ended.is_some() {
            return Err(InningError::GameOver);
        }
        if self.outs >= OUTS_PER_HALF_INNING {
            return Err(InningError::HalfInningOver { outs: self.outs });
        }
        Ok(())
    }
}

// Apply event helpers
impl InningState {
    fn from_created(data: InningStateCreatedData) -> Result<Self, ApplyError> {
        if data.inning == 0 {
            return Err(ApplyError::new(InningError::InvalidInning(0).to_string()));
        }
        Ok(Self {
            id: data.inning_state_id,
            version: Version::initial(),
            game_id: data.game_id,
            inning: data.inning,
            is_top_half: data.is_top_half,
            outs: 0,
            bases: BasesState::empty(),
            home_batting_slot: 1,
            away_batting_slot: 1,
            runs_this_half: 0,
            at_bats_this_half: 0,
            ended: None,
            created_at: data.occurred_at,
        })
    }

    fn apply_runner_advanced(&mut self, data: RunnerAdvancedData) -> Result<(), ApplyError> {
        if self.ended.is_some() {
            return Err(ApplyError::new(InningError::GameOver.to_string()));
        }
        let advance = advance_runner(&self.bases, &data.runner_id, data.from, data.to)
            .map_err(|e| ApplyError::new(e.to_string()))?;
        self.outs = count_out(self.outs, advance.out).map_err(|e| ApplyError::new(e.to_string()))?;
        self.bases = advance.bases;
        if advance.run {
            self.runs_this_half += 1;
        }
        Ok(())
    }

    fn apply_at_bat_completed(&mut self, data: AtBatCompletedData) -> Result<(), ApplyError> {
        if self.ended.is_some() {
            return Err(ApplyError::new(InningError::GameOver.to_string()));
        }
        match self.batting_team() {
            TeamSide::Home => self.home_batting_slot = data.next_batting_slot,
            TeamSide::Away => self.away_batting_slot = data.next_batting_slot,
        }
        self.at_bats_this_half += 1;
        Ok(())
    }

    fn apply_half_inning_ended(&mut self, data: HalfInningEndedData) -> Result<(), ApplyError> {
        if self.ended.is_some() {
            return Err(ApplyError::new(InningError::GameOver.to_string()));
        }
        if (data.inning, data.is_top_half) != (self.inning, self.is_top_half) {
            return Err(ApplyError::new(
                InningError::TransitionMismatch {
                    transition: half_label(data.inning, data.is_top_half),
                    current: half_label(self.inning, self.is_top_half),
                }
                .to_string(),
            ));
        }

        if data.game_over {
            self.ended = Some(data.reason);
            return Ok(());
        }

        if self.is_top_half {
            self.is_top_half = false;
        } else {
            self.inning = self
                .inning
                .checked_add(1)
                .ok_or_else(|| ApplyError::new("inning number overflows"))?;
            self.is_top_half = true;
        }
        self.outs = 0;
        self.bases = self.bases.with_bases_cleared();
        self.runs_this_half = 0;
        self.at_bats_this_half = 0;
        Ok(())
    }
}

struct Advance {
    bases: BasesState,
    run: bool,
    out: bool,
}

/// Moves `runner` from `from` (or the batter's box) per `to`, checking the
/// move against the current bases.
fn advance_runner(
    bases: &BasesState,
    runner: &PlayerId,
    from: Option<Base>,
    to: RunnerOutcome,
) -> Result<Advance, InningError> {
    match from {
        Some(from) => match bases.runner(from) {
            None => return Err(InningError::EmptyBase(from)),
            Some(found) if found != runner => {
                return Err(InningError::RunnerMismatch {
                    base: from,
                    expected: runner.clone(),
                    found: found.clone(),
                });
            }
            Some(_) => {}
        },
        None => {
            if bases.base_of(runner).is_some() {
                return Err(InningError::BatterOnBase(runner.clone()));
            }
        }
    }

    if let RunnerOutcome::Safe(target) = to {
        if let Some(from) = from.filter(|from| target < *from) {
            return Err(InningError::BackwardMove { from, to: target });
        }
        if Some(target) != from && bases.is_occupied(target) {
            return Err(InningError::BaseCollision(target));
        }
    }

    let next = match (from, to) {
        (Some(from), RunnerOutcome::Out) => bases.with_runner_removed(from),
        (Some(from), RunnerOutcome::Scored) => bases.with_runner_advanced(from, RunnerDestination::Home),
        (Some(from), RunnerOutcome::Safe(target)) => {
            bases.with_runner_advanced(from, RunnerDestination::Base(target))
        }
        (None, RunnerOutcome::Safe(target)) => bases.with_runner_on(target, runner.clone()),
        (None, RunnerOutcome::Scored | RunnerOutcome::Out) => bases.clone(),
    };

    Ok(Advance {
        bases: next,
        run: to.is_run(),
        out: to.is_out(),
    })
}

fn count_out(outs: u8, out: bool) -> Result<u8, InningError> {
    let total = outs + u8::from(out);
    if total > OUTS_PER_HALF_INNING {
        return Err(InningError::TooManyOuts { outs: total });
    }
    Ok(total)
}
