//! Wire shapes for the remote game API that don't map 1:1 onto
//! `duel-types`'s domain model.

use duel_types::{AvailableActions, CardId, DeckId, GameId, LobbyId, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Raw `AvailableActionsResponse.actions[]` entry, before normalization
/// into [`duel_types::AvailableActions`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawActionDescriptor {
    /// Raw server action name.
    pub action: String,
    /// Cards eligible for this action.
    #[serde(default)]
    pub available_cards: Vec<CardId>,
    /// Extra parameters the server describes for this action.
    #[serde(default)]
    pub parameters: serde_json::Value,
    /// For `attack`, monsters the server says are attackable.
    #[serde(default)]
    pub attackable_monsters: Vec<CardId>,
}

/// Raw response body for `get_available_actions`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAvailableActionsResponse {
    /// Action descriptors, server order preserved.
    pub actions: Vec<RawActionDescriptor>,
}

impl From<RawAvailableActionsResponse> for AvailableActions {
    fn from(raw: RawAvailableActionsResponse) -> Self {
        let actions = raw
            .actions
            .into_iter()
            .map(|a| {
                let mut eligible: Vec<CardId> = a.available_cards;
                for id in a.attackable_monsters {
                    if !eligible.contains(&id) {
                        eligible.push(id);
                    }
                }
                let parameter_keys = match a.parameters {
                    serde_json::Value::Object(map) => map.keys().cloned().collect(),
                    _ => Vec::new(),
                };
                duel_types::ActionDescriptor {
                    action: a.action,
                    eligible_card_ids: eligible,
                    parameter_keys,
                }
            })
            .collect();
        AvailableActions { actions }
    }
}

/// One entry from `get_pending_turns`: a game where it is (or may be)
/// this agent's turn.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingTurn {
    /// Game awaiting action.
    pub game_id: GameId,
    /// Turn number at time of the scan.
    pub turn_number: u32,
}

/// One open lobby from `get_lobbies`.
#[derive(Debug, Clone, Deserialize)]
pub struct LobbyEntry {
    /// Lobby identifier.
    pub lobby_id: LobbyId,
    /// Lobby host player.
    pub host: PlayerId,
}

/// Response from `join_lobby`.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinLobbyResponse {
    /// The game that resulted from joining.
    pub game_id: GameId,
}

/// One deck available to this agent.
#[derive(Debug, Clone, Deserialize)]
pub struct DeckEntry {
    /// Deck identifier.
    pub deck_id: DeckId,
}

/// Generic JSON parameter bag passed to mutation endpoints. The
/// orchestrator builds these; this crate never inspects them.
pub type ActionParams = serde_json::Value;

/// Request body for `chain_response`.
#[derive(Debug, Clone, Serialize)]
pub struct ChainResponseRequest {
    /// `true` to pass, `false` to respond with a card.
    pub pass: bool,
    /// Card to chain with, required when `pass` is `false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<CardId>,
}

/// Request body for `save_decision` — the full decision record plus the
/// game it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct SaveDecisionRequest<'a> {
    /// Game this decision was made in.
    pub game_id: &'a GameId,
    /// The decision record itself.
    #[serde(flatten)]
    pub decision: &'a duel_types::Decision,
}

/// Distinct eligible-card-id sets collapse duplicates; used by the
/// conversion above and exercised directly in tests.
pub fn dedup_card_ids(ids: Vec<CardId>) -> Vec<CardId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
