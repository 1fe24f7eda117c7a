//! `GameSnapshot` — the compact projection used for diff-based event derivation.

use crate::id::{GameId, PlayerId};
use serde::{Deserialize, Serialize};

/// Coarse game phase. Unknown server strings fall back to `Other`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// First main phase.
    Main1,
    /// Battle phase.
    Battle,
    /// Second main phase.
    Main2,
    /// Anything the server reports that isn't one of the above.
    Other(String),
}

impl Phase {
    /// Parse the server's phase string into a [`Phase`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            "main1" => Phase::Main1,
            "battle" => Phase::Battle,
            "main2" => Phase::Main2,
            other => Phase::Other(other.to_string()),
        }
    }
}

/// Terminality of a game.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game has ended. Terminal: once observed, only a final `game_ended`
    /// event may follow for this game.
    Completed,
    /// Server reported a status this runtime doesn't recognize.
    Unknown,
}

impl GameStatus {
    /// Parse the server's status string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "in_progress" => GameStatus::InProgress,
            "completed" => GameStatus::Completed,
            _ => GameStatus::Unknown,
        }
    }

    /// Whether this status is terminal.
    pub fn is_completed(self) -> bool {
        matches!(self, GameStatus::Completed)
    }
}

/// A compact projection of remote game state, used solely for diffing
/// between polls. Never used to adjudicate game rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Current turn number, starting at 0 before the first turn begins.
    pub turn_number: u32,
    /// Coarse phase.
    pub phase: Phase,
    /// Player id whose turn it currently is.
    pub current_turn_actor: PlayerId,
    /// Whether the game is paused waiting for a chain response.
    pub is_chain_waiting: bool,
    /// Terminal status.
    pub status: GameStatus,
}

impl GameSnapshot {
    /// Whether it is `player`'s turn according to this snapshot.
    pub fn is_turn_of(&self, player: &PlayerId) -> bool {
        &self.current_turn_actor == player
    }
}

/// Identifying context a snapshot is paired with for bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRef {
    /// The game this snapshot belongs to.
    pub game_id: GameId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_parse_known_values() {
        assert_eq!(Phase::parse("main1"), Phase::Main1);
        assert_eq!(Phase::parse("battle"), Phase::Battle);
        assert_eq!(Phase::parse("main2"), Phase::Main2);
    }

    #[test]
    fn phase_parse_unknown_is_other() {
        assert_eq!(Phase::parse("end"), Phase::Other("end".to_string()));
    }

    #[test]
    fn status_parse_and_terminal() {
        assert!(GameStatus::parse("completed").is_completed());
        assert!(!GameStatus::parse("in_progress").is_completed());
        assert!(!GameStatus::parse("garbage").is_completed());
    }

    #[test]
    fn is_turn_of_checks_actor() {
        let snap = GameSnapshot {
            turn_number: 1,
            phase: Phase::Main1,
            current_turn_actor: PlayerId::new("p1"),
            is_chain_waiting: false,
            status: GameStatus::InProgress,
        };
        assert!(snap.is_turn_of(&PlayerId::new("p1")));
        assert!(!snap.is_turn_of(&PlayerId::new("p2")));
    }
}
