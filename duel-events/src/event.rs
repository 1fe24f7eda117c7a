//! The derived domain event vocabulary.

use duel_types::{GameId, Winner};
use serde::{Deserialize, Serialize};

/// One domain event, either derived from snapshot diffing or accepted
/// through the push path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// First observation of a game.
    GameStarted {
        /// Game this event belongs to.
        game_id: GameId,
    },
    /// It is now (or again) this agent's turn.
    TurnStarted {
        /// Game this event belongs to.
        game_id: GameId,
        /// Turn number that just started.
        turn_number: u32,
    },
    /// The coarse phase changed.
    PhaseChanged {
        /// Game this event belongs to.
        game_id: GameId,
        /// New phase, as the server spells it.
        phase: String,
    },
    /// A chain is open and awaiting a response.
    ChainWaiting {
        /// Game this event belongs to.
        game_id: GameId,
        /// Server-side response timeout.
        timeout_ms: u64,
    },
    /// Something the opponent did that isn't covered by a more specific
    /// event.
    OpponentAction {
        /// Game this event belongs to.
        game_id: GameId,
        /// What kind of opponent action this was.
        action_type: String,
    },
    /// The game has concluded. Terminal: no further events follow for
    /// this game.
    GameEnded {
        /// Game this event belongs to.
        game_id: GameId,
        /// Winner, as inferred or reported.
        winner: Winner,
        /// Human-readable end reason, if the server gave one.
        reason: Option<String>,
    },
}

impl Event {
    /// The game this event pertains to.
    pub fn game_id(&self) -> &GameId {
        match self {
            Event::GameStarted { game_id }
            | Event::TurnStarted { game_id, .. }
            | Event::PhaseChanged { game_id, .. }
            | Event::ChainWaiting { game_id, .. }
            | Event::OpponentAction { game_id, .. }
            | Event::GameEnded { game_id, .. } => game_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_round_trips_through_json() {
        let event = Event::ChainWaiting {
            game_id: GameId::new("G1"),
            timeout_ms: 30_000,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"chain_waiting\""));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn game_id_accessor_covers_every_variant() {
        let g = GameId::new("G1");
        let events = vec![
            Event::GameStarted { game_id: g.clone() },
            Event::TurnStarted { game_id: g.clone(), turn_number: 1 },
            Event::PhaseChanged { game_id: g.clone(), phase: "battle".into() },
            Event::ChainWaiting { game_id: g.clone(), timeout_ms: 1000 },
            Event::OpponentAction { game_id: g.clone(), action_type: "turn_passed".into() },
            Event::GameEnded { game_id: g.clone(), winner: Winner::Agent, reason: None },
        ];
        for event in events {
            assert_eq!(event.game_id(), &g);
        }
    }
}
