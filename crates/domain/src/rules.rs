//! Game rules configuration.
//!
//! Rules are read-only input to lineup and inning logic. They are loaded from
//! `SOFTBALL_*` environment variables, falling back to defaults:
//! - `SOFTBALL_MAX_PLAYERS_PER_TEAM`: batting slots per lineup (default: `10`)
//! - `SOFTBALL_REGULATION_INNINGS`: innings in a regulation game (default: `7`)
//! - `SOFTBALL_MERCY_TIERS`: `differential@inning` pairs, comma separated,
//!   empty for none (default: `"20@3,15@4,10@5"`)
//! - `SOFTBALL_TIME_LIMIT_MINUTES`: `none` or minutes (default: `none`)
//! - `SOFTBALL_ALLOW_REENTRY`: `true`/`false` (default: `true`)
//! - `SOFTBALL_RBI_TOLERANCE`: `none` or extra RBI allowed over runs scored
//!   on a play (default: `0`)

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Smallest lineup that can field every required position.
pub const MIN_LINEUP_SIZE: u8 = 9;

const MAX_PLAYERS_KEY: &str = "SOFTBALL_MAX_PLAYERS_PER_TEAM";
const REGULATION_INNINGS_KEY: &str = "SOFTBALL_REGULATION_INNINGS";
const MERCY_TIERS_KEY: &str = "SOFTBALL_MERCY_TIERS";
const TIME_LIMIT_KEY: &str = "SOFTBALL_TIME_LIMIT_MINUTES";
const ALLOW_REENTRY_KEY: &str = "SOFTBALL_ALLOW_REENTRY";
const RBI_TOLERANCE_KEY: &str = "SOFTBALL_RBI_TOLERANCE";

/// Ends the game once a team leads by `differential` runs in or after
/// `after_inning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MercyRuleTier {
    pub differential: u32,
    pub after_inning: u32,
}

impl MercyRuleTier {
    pub fn new(differential: u32, after_inning: u32) -> Self {
        Self {
            differential,
            after_inning,
        }
    }
}

/// League rules consumed by lineups and inning transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftballRules {
    /// Highest batting slot number a lineup may use.
    pub max_players_per_team: u8,

    /// Innings in a regulation game; ties continue into extra innings.
    pub regulation_innings: u32,

    /// Mercy-rule thresholds.
    pub mercy_rule_tiers: Vec<MercyRuleTier>,

    /// Minutes after the first pitch at which no new inning starts.
    pub time_limit_minutes: Option<u32>,

    /// Whether starters may re-enter once after being substituted.
    pub allow_reentry: bool,

    /// How many RBI a play may credit beyond the runs it scored.
    /// `None` disables the check.
    pub rbi_tolerance: Option<u32>,
}

impl Default for SoftballRules {
    fn default() -> Self {
        Self {
            max_players_per_team: 10,
            regulation_innings: 7,
            mercy_rule_tiers: vec![
                MercyRuleTier::new(20, 3),
                MercyRuleTier::new(15, 4),
                MercyRuleTier::new(10, 5),
            ],
            time_limit_minutes: None,
            allow_reentry: true,
            rbi_tolerance: Some(0),
        }
    }
}

impl SoftballRules {
    /// Loads rules from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads rules from an arbitrary key lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let defaults = Self::default();

        let max_players_per_team = match lookup(MAX_PLAYERS_KEY) {
            Some(value) => parse_number(MAX_PLAYERS_KEY, &value)?,
            None => defaults.max_players_per_team,
        };
        let regulation_innings = match lookup(REGULATION_INNINGS_KEY) {
            Some(value) => parse_number(REGULATION_INNINGS_KEY, &value)?,
            None => defaults.regulation_innings,
        };
        let mercy_rule_tiers = match lookup(MERCY_TIERS_KEY) {
            Some(value) => parse_tiers(&value)?,
            None => defaults.mercy_rule_tiers,
        };
        let time_limit_minutes = match lookup(TIME_LIMIT_KEY) {
            Some(value) => parse_optional(TIME_LIMIT_KEY, &value)?,
            None => defaults.time_limit_minutes,
        };
        let allow_reentry = match lookup(ALLOW_REENTRY_KEY) {
            Some(value) => parse_bool(ALLOW_REENTRY_KEY, &value)?,
            None => defaults.allow_reentry,
        };
        let rbi_tolerance = match lookup(RBI_TOLERANCE_KEY) {
            Some(value) => parse_optional(RBI_TOLERANCE_KEY, &value)?,
            None => defaults.rbi_tolerance,
        };

        let rules = Self {
            max_players_per_team,
            regulation_innings,
            mercy_rule_tiers,
            time_limit_minutes,
            allow_reentry,
            rbi_tolerance,
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Sets the highest usable batting slot.
    pub fn with_max_players_per_team(mut self, max: u8) -> Self {
        self.max_players_per_team = max;
        self
    }

    /// Sets the number of regulation innings.
    pub fn with_regulation_innings(mut self, innings: u32) -> Self {
        self.regulation_innings = innings;
        self
    }

    /// Replaces the mercy-rule tiers.
    pub fn with_mercy_tiers(mut self, tiers: Vec<MercyRuleTier>) -> Self {
        self.mercy_rule_tiers = tiers;
        self
    }

    /// Sets the time limit in minutes.
    pub fn with_time_limit(mut self, minutes: Option<u32>) -> Self {
        self.time_limit_minutes = minutes;
        self
    }

    /// Enables or disables starter re-entry.
    pub fn with_reentry(mut self, allow: bool) -> Self {
        self.allow_reentry = allow;
        self
    }

    /// Sets the RBI tolerance.
    pub fn with_rbi_tolerance(mut self, tolerance: Option<u32>) -> Self {
        self.rbi_tolerance = tolerance;
        self
    }

    /// Checks the rules are internally consistent.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_players_per_team < MIN_LINEUP_SIZE {
            return Err(ConfigurationError::InvalidRules(format!(
                "max players per team must be at least {MIN_LINEUP_SIZE}, got {}",
                self.max_players_per_team
            )));
        }
        if self.regulation_innings == 0 {
            return Err(ConfigurationError::InvalidRules(
                "regulation innings must be at least 1".to_string(),
            ));
        }
        for tier in &self.mercy_rule_tiers {
            if tier.differential == 0 || tier.after_inning == 0 {
                return Err(ConfigurationError::InvalidRules(format!(
                    "mercy tier {}@{} must have a positive differential and inning",
                    tier.differential, tier.after_inning
                )));
            }
        }
        if self.time_limit_minutes == Some(0) {
            return Err(ConfigurationError::InvalidRules(
                "time limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks `slot` lies within `1..=max_players_per_team`.
    pub fn validate_batting_slot(&self, slot: u8) -> Result<(), ConfigurationError> {
        if slot == 0 || slot > self.max_players_per_team {
            return Err(ConfigurationError::InvalidBattingSlot {
                slot,
                max: self.max_players_per_team,
            });
        }
        Ok(())
    }

    /// Returns the mercy tier that ends the game for `lead` in `inning`.
    ///
    /// Tiers are evaluated from the largest differential downward; the first
    /// whose inning threshold is met and whose differential is reached wins.
    pub fn applicable_mercy_tier(&self, lead: u32, inning: u32) -> Option<MercyRuleTier> {
        let mut tiers = self.mercy_rule_tiers.clone();
        tiers.sort_by(|a, b| b.differential.cmp(&a.differential));
        tiers
            .into_iter()
            .find(|tier| inning >= tier.after_inning && lead >= tier.differential)
    }

    /// Returns true once `inning` is the last regulation inning or later.
    pub fn is_final_inning_or_later(&self, inning: u32) -> bool {
        inning >= self.regulation_innings
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigurationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidSetting {
            key,
            value: value.to_string(),
        })
}

fn parse_optional(key: &'static str, value: &str) -> Result<Option<u32>, ConfigurationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_number(key, trimmed).map(Some)
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigurationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigurationError::InvalidSetting {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_tiers(value: &str) -> Result<Vec<MercyRuleTier>, ConfigurationError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| -> Result<MercyRuleTier, ConfigurationError> {
            let (differential, inning) =
                part.split_once('@')
                    .ok_or_else(|| ConfigurationError::InvalidSetting {
                        key: MERCY_TIERS_KEY,
                        value: value.to_string(),
                    })?;
            Ok(MercyRuleTier::new(
                parse_number(MERCY_TIERS_KEY, differential)?,
                parse_number(MERCY_TIERS_KEY, inning)?,
            ))
        })
        .collect()
}
