//! Baserunner occupancy.

use common::PlayerId;
use serde::{Deserialize, Serialize};

/// A base a runner can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Base {
    First,
    Second,
    Third,
}

impl Base {
    /// All bases in running order.
    pub const ALL: [Base; 3] = [Base::First, Base::Second, Base::Third];

    /// The destination one base further along.
    pub fn next(self) -> RunnerDestination {
        match self {
            Base::First => RunnerDestination::Base(Base::Second),
            Base::Second => RunnerDestination::Base(Base::Third),
            Base::Third => RunnerDestination::Home,
        }
    }

    fn index(self) -> usize {
        match self {
            Base::First => 0,
            Base::Second => 1,
            Base::Third => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Base::First => "FIRST",
            Base::Second => "SECOND",
            Base::Third => "THIRD",
        }
    }
}

impl std::fmt::Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an advancing runner ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunnerDestination {
    Base(Base),
    /// The runner scored and is no longer tracked.
    Home,
}

/// Runner occupancy of first, second, and third base.
///
/// Immutable: every mutation returns a new instance. Equality is structural.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasesState {
    runners: [Option<PlayerId>; 3],
}

impl BasesState {
    /// Bases with nobody on.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Places `runner` on `base`, replacing anyone already there.
    pub fn with_runner_on(&self, base: Base, runner: PlayerId) -> Self {
        let mut next = self.clone();
        next.runners[base.index()] = Some(runner);
        next
    }

    /// Moves the runner on `from` to `to`.
    ///
    /// An empty `from` yields an unchanged copy. Advancing `Home` removes the
    /// runner entirely.
    pub fn with_runner_advanced(&self, from: Base, to: RunnerDestination) -> Self {
        let mut next = self.clone();
        let Some(runner) = next.runners[from.index()].take() else {
            return next;
        };
        if let RunnerDestination::Base(base) = to {
            next.runners[base.index()] = Some(runner);
        }
        next
    }

    /// Removes the runner on `base`, e.g. when put out on the bases.
    pub fn with_runner_removed(&self, base: Base) -> Self {
        let mut next = self.clone();
        next.runners[base.index()] = None;
        next
    }

    /// Bases with nobody on.
    pub fn with_bases_cleared(&self) -> Self {
        Self::empty()
    }

    /// Returns the runner on `base`.
    pub fn runner(&self, base: Base) -> Option<&PlayerId> {
        self.runners[base.index()].as_ref()
    }

    /// Returns the base `player` occupies.
    pub fn base_of(&self, player: &PlayerId) -> Option<Base> {
        Base::ALL
            .into_iter()
            .find(|base| self.runner(*base) == Some(player))
    }

    pub fn is_occupied(&self, base: Base) -> bool {
        self.runners[base.index()].is_some()
    }

    /// Occupied bases in the order first, second, third.
    pub fn occupied_bases(&self) -> Vec<Base> {
        Base::ALL
            .into_iter()
            .filter(|base| self.is_occupied(*base))
            .collect()
    }

    /// Runners on second and third, in that order.
    pub fn runners_in_scoring_position(&self) -> Vec<&PlayerId> {
        [Base::Second, Base::Third]
            .into_iter()
            .filter_map(|base| self.runner(base))
            .collect()
    }

    pub fn runner_count(&self) -> usize {
        self.runners.iter().filter(|r| r.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.runner_count() == 0
    }

    /// Returns true if the runner on `base` must advance when the batter
    /// becomes a runner.
    ///
    /// Forces chain from first base: second is forced only with first and
    /// second occupied, third only with the bases loaded.
    pub fn is_force_at(&self, base: Base) -> bool {
        let first = self.is_occupied(Base::First);
        let second = self.is_occupied(Base::Second);
        let third = self.is_occupied(Base::Third);
        match base {
            Base::First => first,
            Base::Second => first && second,
            Base::Third => first && second && third,
        }
    }

    /// The moves forced by the batter being awarded first base, lead runner
    /// first.
    pub fn forced_advances(&self) -> Vec<(Base, RunnerDestination)> {
        [Base::Third, Base::Second, Base::First]
            .into_iter()
            .filter(|base| self.is_force_at(*base))
            .map(|base| (base, base.next()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str) -> PlayerId {
        PlayerId::new(id).unwrap()
    }

    fn loaded() -> BasesState {
        BasesState::empty()
            .with_runner_on(Base::First, player("a"))
            .with_runner_on(Base::Second, player("b"))
            .with_runner_on(Base::Third, player("c"))
    }

    #[test]
    fn test_empty_bases() {
        let bases = BasesState::empty();
        assert!(bases.is_empty());
        assert!(bases.occupied_bases().is_empty());
        assert!(Base::ALL.iter().all(|b| !bases.is_force_at(*b)));
    }

    #[test]
    fn test_mutations_return_new_instances() {
        let original = BasesState::empty();
        let updated = original.with_runner_on(Base::Second, player("a"));
        assert!(original.is_empty());
        assert_eq!(updated.runner(Base::Second), Some(&player("a")));
    }

    #[test]
    fn test_with_runner_on_overwrites() {
        let bases = BasesState::empty()
            .with_runner_on(Base::First, player("a"))
            .with_runner_on(Base::First, player("b"));
        assert_eq!(bases.runner(Base::First), Some(&player("b")));
        assert_eq!(bases.runner_count(), 1);
    }

    #[test]
    fn test_advance_from_empty_base_is_noop() {
        let bases = BasesState::empty().with_runner_on(Base::Third, player("a"));
        let advanced = bases.with_runner_advanced(Base::First, RunnerDestination::Base(Base::Second));
        assert_eq!(advanced, bases);
    }

    #[test]
    fn test_advance_home_removes_runner() {
        let bases = BasesState::empty().with_runner_on(Base::Third, player("a"));
        let scored = bases.with_runner_advanced(Base::Third, RunnerDestination::Home);
        assert!(scored.is_empty());
        assert!(scored.occupied_bases().is_empty());
        assert_eq!(scored.base_of(&player("a")), None);
    }

    #[test]
    fn test_advance_moves_runner() {
        let bases = BasesState::empty().with_runner_on(Base::First, player("a"));
        let advanced = bases.with_runner_advanced(Base::First, RunnerDestination::Base(Base::Third));
        assert_eq!(advanced.occupied_bases(), vec![Base::Third]);
        assert_eq!(advanced.base_of(&player("a")), Some(Base::Third));
    }

    #[test]
    fn test_occupied_bases_are_ordered() {
        let bases = BasesState::empty()
            .with_runner_on(Base::Third, player("c"))
            .with_runner_on(Base::First, player("a"));
        assert_eq!(bases.occupied_bases(), vec![Base::First, Base::Third]);
    }

    #[test]
    fn test_runners_in_scoring_position() {
        let bases = loaded();
        assert_eq!(
            bases.runners_in_scoring_position(),
            vec![&player("b"), &player("c")]
        );

        let only_first = BasesState::empty().with_runner_on(Base::First, player("a"));
        assert!(only_first.runners_in_scoring_position().is_empty());
    }

    #[test]
    fn test_force_chain() {
        let third_only = BasesState::empty().with_runner_on(Base::Third, player("c"));
        assert!(!third_only.is_force_at(Base::Third));
        assert!(!third_only.is_force_at(Base::First));

        let second_only = BasesState::empty().with_runner_on(Base::Second, player("b"));
        assert!(!second_only.is_force_at(Base::Second));

        let first_and_third = BasesState::empty()
            .with_runner_on(Base::First, player("a"))
            .with_runner_on(Base::Third, player("c"));
        assert!(first_and_third.is_force_at(Base::First));
        assert!(!first_and_third.is_force_at(Base::Second));
        assert!(!first_and_third.is_force_at(Base::Third));

        let bases = loaded();
        assert!(Base::ALL.iter().all(|b| bases.is_force_at(*b)));
    }

    #[test]
    fn test_forced_advances_lead_runner_first() {
        assert_eq!(
            loaded().forced_advances(),
            vec![
                (Base::Third, RunnerDestination::Home),
                (Base::Second, RunnerDestination::Base(Base::Third)),
                (Base::First, RunnerDestination::Base(Base::Second)),
            ]
        );

        let first_and_third = BasesState::empty()
            .with_runner_on(Base::First, player("a"))
            .with_runner_on(Base::Third, player("c"));
        assert_eq!(
            first_and_third.forced_advances(),
            vec![(Base::First, RunnerDestination::Base(Base::Second))]
        );
    }

    #[test]
    fn test_structural_equality() {
        let a = BasesState::empty().with_runner_on(Base::Second, player("x"));
        let b = BasesState::empty()
            .with_runner_on(Base::First, player("x"))
            .with_runner_advanced(Base::First, RunnerDestination::Base(Base::Second));
        assert_eq!(a, b);
        assert_ne!(a, BasesState::empty().with_runner_on(Base::Second, player("y")));
    }

    #[test]
    fn test_cleared_and_removed() {
        assert!(loaded().with_bases_cleared().is_empty());
        let bases = loaded().with_runner_removed(Base::Second);
        assert_eq!(bases.occupied_bases(), vec![Base::First, Base::Third]);
    }
}
