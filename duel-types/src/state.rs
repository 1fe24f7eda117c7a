//! `GameStateFull` — the authoritative server view, opaque except for the
//! accessors the orchestrator needs.

use crate::id::{CardId, GameId, LobbyId, PlayerId};
use crate::snapshot::{GameSnapshot, GameStatus, Phase};
use serde::{Deserialize, Serialize};

/// Battle position of a card on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Attack position.
    Attack,
    /// Defense position.
    Defense,
}

/// A card sitting in the agent's hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInHand {
    /// Stable card identifier.
    pub card_id: CardId,
    /// Summoning cost / level, used only to rank candidates.
    pub cost: u32,
    /// Attack stat, if the card has one.
    pub attack: Option<u32>,
    /// Defense stat, if the card has one.
    pub defense: Option<u32>,
    /// Whether this card can be activated as a spell (ranking hint only).
    pub is_spell: bool,
}

/// A card on either player's board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardCard {
    /// Stable card identifier.
    pub card_id: CardId,
    /// Summoning cost / level.
    pub cost: u32,
    /// Attack stat.
    pub attack: u32,
    /// Defense stat.
    pub defense: u32,
    /// Current position.
    pub position: Position,
    /// Whether the card is face-down.
    pub face_down: bool,
    /// Whether the card has already attacked this turn.
    pub has_attacked: bool,
    /// Whether the card has already changed position this turn.
    pub has_changed_position: bool,
}

impl BoardCard {
    /// Effective value used when ranking attack targets: ATK in attack
    /// position, DEF in defense position.
    pub fn effective_value(&self) -> u32 {
        match self.position {
            Position::Attack => self.attack,
            Position::Defense => self.defense,
        }
    }

    /// Whether this monster is able to attack right now.
    pub fn can_attack(&self) -> bool {
        !self.face_down && !self.has_attacked
    }
}

/// One entry in the server's authoritative available-actions list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Raw action name as the server spells it.
    pub action: String,
    /// Card ids eligible for this action, if the server scopes it.
    #[serde(default)]
    pub eligible_card_ids: Vec<CardId>,
    /// Free-form parameter keys the server expects, if any.
    #[serde(default)]
    pub parameter_keys: Vec<String>,
}

/// The server's authoritative list of actions legal right now.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableActions {
    /// Ordered action descriptors. An action not present here is illegal.
    pub actions: Vec<ActionDescriptor>,
}

impl AvailableActions {
    /// Find a descriptor by raw server action name.
    pub fn find(&self, raw_name: &str) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|a| a.action == raw_name)
    }

    /// Whether the raw server action name is present.
    pub fn contains(&self, raw_name: &str) -> bool {
        self.find(raw_name).is_some()
    }
}

/// Why / who a completed game ended with, when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndInfo {
    /// Winner, if the server reported one explicitly.
    #[serde(default)]
    pub winner: Option<PlayerId>,
    /// Human-readable end reason.
    #[serde(default)]
    pub end_reason: Option<String>,
}

/// Chain wait metadata on the full state, when a chain is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainState {
    /// Whether a chain response is currently being waited on.
    pub is_waiting: bool,
    /// Server-side timeout for the response, in milliseconds.
    #[serde(default = "default_chain_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_chain_timeout_ms() -> u64 {
    30_000
}

/// Authoritative server view of one game, as consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateFull {
    /// Game identifier.
    pub game_id: GameId,
    /// Lobby this game originated from.
    #[serde(default)]
    pub lobby_id: Option<LobbyId>,
    /// Terminal status.
    pub status: GameStatus,
    /// Coarse phase.
    pub phase: Phase,
    /// Current turn number.
    pub turn_number: u32,
    /// Player id whose turn it currently is.
    pub current_turn: PlayerId,
    /// This agent's player id.
    pub my_player_id: PlayerId,
    /// My current life points.
    pub my_life_points: i64,
    /// Opponent's current life points.
    pub opponent_life_points: i64,
    /// Number of cards left in the opponent's deck.
    #[serde(default)]
    pub opponent_deck_count: u32,
    /// My hand.
    #[serde(default)]
    pub hand: Vec<CardInHand>,
    /// My board.
    #[serde(default)]
    pub my_board: Vec<BoardCard>,
    /// Opponent's board.
    #[serde(default)]
    pub opponent_board: Vec<BoardCard>,
    /// My graveyard (opaque beyond count/ids, card identity not modeled).
    #[serde(default)]
    pub my_graveyard: Vec<CardId>,
    /// Opponent's graveyard.
    #[serde(default)]
    pub opponent_graveyard: Vec<CardId>,
    /// Server-authoritative legal actions.
    pub available_actions: AvailableActions,
    /// Chain wait state, if present.
    #[serde(default)]
    pub chain_state: Option<ChainState>,
    /// End-of-game info, present once `status == completed`.
    #[serde(default)]
    pub end_info: Option<EndInfo>,
}

impl GameStateFull {
    /// Whether it is this agent's turn, per spec.md's adopted definition
    /// (`my_player_id == current_turn_actor`), not the legacy
    /// `current_turn == "host"` assumption.
    pub fn is_my_turn(&self) -> bool {
        self.my_player_id == self.current_turn
    }

    /// Project this full state down to the compact diffing snapshot.
    pub fn to_snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            turn_number: self.turn_number,
            phase: self.phase.clone(),
            current_turn_actor: self.current_turn.clone(),
            is_chain_waiting: self.chain_state.as_ref().is_some_and(|c| c.is_waiting),
            status: self.status,
        }
    }

    /// Winner according to the end-handling rule in spec.md §4.4:
    /// prefer an explicit winner field, otherwise infer from life points.
    pub fn infer_winner(&self) -> Winner {
        if let Some(end) = &self.end_info {
            if let Some(winner) = &end.winner {
                return if *winner == self.my_player_id {
                    Winner::Agent
                } else {
                    Winner::Opponent
                };
            }
        }
        if self.opponent_life_points <= 0 && self.my_life_points > 0 {
            Winner::Agent
        } else {
            Winner::Opponent
        }
    }
}

/// Outcome of a completed game as determined by `infer_winner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// This agent won.
    Agent,
    /// The opponent won.
    Opponent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_state() -> GameStateFull {
        GameStateFull {
            game_id: GameId::new("G1"),
            lobby_id: None,
            status: GameStatus::InProgress,
            phase: Phase::Main1,
            turn_number: 3,
            current_turn: PlayerId::new("me"),
            my_player_id: PlayerId::new("me"),
            my_life_points: 2000,
            opponent_life_points: 0,
            opponent_deck_count: 30,
            hand: vec![],
            my_board: vec![],
            opponent_board: vec![],
            my_graveyard: vec![],
            opponent_graveyard: vec![],
            available_actions: AvailableActions::default(),
            chain_state: None,
            end_info: None,
        }
    }

    #[test]
    fn is_my_turn_compares_player_ids() {
        let mut state = base_state();
        assert!(state.is_my_turn());
        state.current_turn = PlayerId::new("opponent");
        assert!(!state.is_my_turn());
    }

    #[test]
    fn infer_winner_prefers_explicit_field() {
        let mut state = base_state();
        state.my_life_points = 10;
        state.opponent_life_points = 10;
        state.end_info = Some(EndInfo {
            winner: Some(PlayerId::new("opponent")),
            end_reason: Some("surrender".into()),
        });
        assert_eq!(state.infer_winner(), Winner::Opponent);
    }

    #[test]
    fn infer_winner_falls_back_to_life_points() {
        let state = base_state();
        assert_eq!(state.infer_winner(), Winner::Agent);
    }

    #[test]
    fn infer_winner_defaults_to_loss_when_not_decisive() {
        let mut state = base_state();
        state.opponent_life_points = 500;
        state.my_life_points = 0;
        assert_eq!(state.infer_winner(), Winner::Opponent);
    }

    #[test]
    fn board_card_effective_value_by_position() {
        let card = BoardCard {
            card_id: CardId::new("c1"),
            cost: 4,
            attack: 1800,
            defense: 1200,
            position: Position::Defense,
            face_down: false,
            has_attacked: false,
            has_changed_position: false,
        };
        assert_eq!(card.effective_value(), 1200);
    }

    #[test]
    fn board_card_can_attack_rules() {
        let mut card = BoardCard {
            card_id: CardId::new("c1"),
            cost: 4,
            attack: 1800,
            defense: 1200,
            position: Position::Attack,
            face_down: false,
            has_attacked: false,
            has_changed_position: false,
        };
        assert!(card.can_attack());
        card.has_attacked = true;
        assert!(!card.can_attack());
        card.has_attacked = false;
        card.face_down = true;
        assert!(!card.can_attack());
    }

    #[test]
    fn to_snapshot_projects_chain_state() {
        let mut state = base_state();
        state.chain_state = Some(ChainState {
            is_waiting: true,
            timeout_ms: 30_000,
        });
        let snap = state.to_snapshot();
        assert!(snap.is_chain_waiting);
        assert_eq!(snap.turn_number, 3);
    }

    #[test]
    fn available_actions_lookup() {
        let actions = AvailableActions {
            actions: vec![ActionDescriptor {
                action: "summon_monster".into(),
                eligible_card_ids: vec![CardId::new("c1")],
                parameter_keys: vec![],
            }],
        };
        assert!(actions.contains("summon_monster"));
        assert!(!actions.contains("attack"));
    }
}
