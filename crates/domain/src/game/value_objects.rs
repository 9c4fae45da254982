//! Value objects for the game domain.

use serde::{Deserialize, Serialize};

/// Which side of the scoreboard a team is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    /// Returns the other team.
    pub fn opponent(&self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    /// The team batting in the given half: away in the top, home in the bottom.
    pub fn batting_in(is_top_half: bool) -> TeamSide {
        if is_top_half {
            TeamSide::Away
        } else {
            TeamSide::Home
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Home => "HOME",
            TeamSide::Away => "AWAY",
        }
    }
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Run totals for both teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// Returns zero runs for both teams.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns the runs of one team.
    pub fn runs(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    /// Returns a score with `runs` added to `side`, or None if the total
    /// would overflow.
    pub fn with_runs_added(&self, side: TeamSide, runs: u32) -> Option<Self> {
        let mut next = *self;
        match side {
            TeamSide::Home => next.home = next.home.checked_add(runs)?,
            TeamSide::Away => next.away = next.away.checked_add(runs)?,
        }
        Some(next)
    }

    pub fn is_tied(&self) -> bool {
        self.home == self.away
    }

    /// Returns the leading team, or None when tied.
    pub fn leader(&self) -> Option<TeamSide> {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Some(TeamSide::Home),
            std::cmp::Ordering::Less => Some(TeamSide::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Absolute run differential.
    pub fn differential(&self) -> u32 {
        self.home.abs_diff(self.away)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "home {} - away {}", self.home, self.away)
    }
}
