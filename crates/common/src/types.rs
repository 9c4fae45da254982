use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::IdGenerator;

/// Maximum length, in characters, of any identifier.
pub const MAX_IDENTIFIER_LENGTH: usize = 100;

/// Errors raised when constructing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The identifier was empty or whitespace only.
    #[error("{kind} cannot be empty")]
    Empty { kind: &'static str },

    /// The identifier exceeded [`MAX_IDENTIFIER_LENGTH`].
    #[error("{kind} cannot exceed {max} characters (got {length})")]
    TooLong {
        kind: &'static str,
        length: usize,
        max: usize,
    },
}

fn validate(kind: &'static str, value: String) -> Result<String, IdentifierError> {
    if value.trim().is_empty() {
        return Err(IdentifierError::Empty { kind });
    }
    let length = value.chars().count();
    if length > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierError::TooLong {
            kind,
            length,
            max: MAX_IDENTIFIER_LENGTH,
        });
    }
    Ok(value)
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
                validate($kind, value.into()).map(Self)
            }

            /// Creates an identifier from the next value of a generator.
            pub fn generate(generator: &dyn IdGenerator) -> Result<Self, IdentifierError> {
                Self::new(generator.next_id())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdentifierError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifies a game aggregate.
    GameId,
    "GameId"
);
define_id!(
    /// Identifies a player across lineups and innings.
    PlayerId,
    "PlayerId"
);
define_id!(
    /// Identifies a team lineup aggregate.
    TeamLineupId,
    "TeamLineupId"
);
define_id!(
    /// Identifies an inning state aggregate.
    InningStateId,
    "InningStateId"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SequentialIdGenerator;

    #[test]
    fn rejects_empty_identifier() {
        assert_eq!(
            GameId::new(""),
            Err(IdentifierError::Empty { kind: "GameId" })
        );
        assert!(matches!(
            PlayerId::new("   "),
            Err(IdentifierError::Empty { .. })
        ));
    }

    #[test]
    fn rejects_overlong_identifier() {
        let value = "x".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert_eq!(
            TeamLineupId::new(value),
            Err(IdentifierError::TooLong {
                kind: "TeamLineupId",
                length: MAX_IDENTIFIER_LENGTH + 1,
                max: MAX_IDENTIFIER_LENGTH,
            })
        );
        assert!(TeamLineupId::new("x".repeat(MAX_IDENTIFIER_LENGTH)).is_ok());
    }

    #[test]
    fn compares_by_value() {
        let a = InningStateId::new("inning-1").unwrap();
        let b = InningStateId::new(String::from("inning-1")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "inning-1");
        assert_eq!(a.to_string(), "inning-1");
    }

    #[test]
    fn generate_uses_injected_generator() {
        let generator = SequentialIdGenerator::new("game");
        let first = GameId::generate(&generator).unwrap();
        let second = GameId::generate(&generator).unwrap();
        assert_eq!(first.as_str(), "game-1");
        assert_eq!(second.as_str(), "game-2");
    }

    #[test]
    fn deserialization_validates() {
        let id: PlayerId = serde_json::from_str("\"p-7\"").unwrap();
        assert_eq!(id.as_str(), "p-7");

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"p-7\"");

        let result: Result<PlayerId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
