//! Newtype identifiers used across the agent runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw id string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(GameId, "Identifier for a single game instance.");
string_id!(LobbyId, "Identifier for a matchmaking lobby.");
string_id!(AgentId, "Identifier for this agent (not a player id).");
string_id!(PlayerId, "Identifier for a player within a game.");
string_id!(CardId, "Identifier for a single card instance.");
string_id!(DeckId, "Identifier for a deck.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_raw_string() {
        let g = GameId::new("G1");
        assert_eq!(g.to_string(), "G1");
        assert_eq!(g.as_str(), "G1");
    }

    #[test]
    fn serializes_as_bare_string() {
        let g = GameId::new("G1");
        assert_eq!(serde_json::to_string(&g).unwrap(), "\"G1\"");
    }

    #[test]
    fn equality_by_value() {
        assert_eq!(GameId::new("G1"), GameId::from("G1".to_string()));
        assert_ne!(GameId::new("G1"), GameId::new("G2"));
    }
}
