//! Context gathering for one action-loop iteration.
//!
//! Renderings here are consumed only by the decision source; the core
//! never parses them back, so they're built with plain `format!`, not a
//! templating engine.

use crate::error::TurnError;
use duel_client::GameApiClient;
use duel_types::{AvailableActions, BoardCard, CardInHand, GameId, GameStateFull, Position};

/// One previously failed action this turn, carried forward so the
/// prompt can avoid retrying it.
#[derive(Debug, Clone)]
pub struct FailedAction {
    /// The action that failed.
    pub action: String,
    /// Why it failed.
    pub reason: String,
}

/// Everything the decision policy needs for one iteration.
pub struct TurnContext {
    /// Game this context belongs to.
    pub game_id: GameId,
    /// Authoritative server state.
    pub state: GameStateFull,
    /// Server-authoritative legal actions for this moment.
    pub available_actions: AvailableActions,
    /// Recent game history, empty if the fetch failed.
    pub history: Vec<serde_json::Value>,
    /// Actions that already failed this turn.
    pub failed_actions: Vec<FailedAction>,
    /// Compact textual rendering of the hand.
    pub hand_summary: String,
    /// Compact textual rendering of both boards.
    pub board_summary: String,
    /// Win-probability band, lethal detection, and opponent-playstyle
    /// inference, rendered as prose for the decision source.
    pub strategy_summary: String,
}

/// Fetch game state and available actions, and best-effort history, for
/// `game_id`. History failures never propagate.
pub async fn gather_context(
    client: &GameApiClient,
    game_id: &GameId,
    failed_actions: Vec<FailedAction>,
) -> Result<TurnContext, TurnError> {
    let (state, available_actions) =
        tokio::join!(client.get_game_state(game_id), client.get_available_actions(game_id));
    let state = state?;
    let available_actions = available_actions?;

    let history = client.get_game_history(game_id).await.unwrap_or_else(|err| {
        tracing::debug!(error = %err, "game history fetch failed, continuing with empty history");
        Vec::new()
    });

    let hand_summary = render_hand(&state.hand);
    let board_summary = render_boards(&state.my_board, &state.opponent_board);
    let strategy_summary = render_strategy(&state);

    Ok(TurnContext {
        game_id: game_id.clone(),
        state,
        available_actions,
        history,
        failed_actions,
        hand_summary,
        board_summary,
        strategy_summary,
    })
}

fn render_hand(hand: &[CardInHand]) -> String {
    if hand.is_empty() {
        return "Hand is empty.".to_string();
    }
    hand.iter()
        .map(|card| {
            format!(
                "{} (cost {}{}{})",
                card.card_id,
                card.cost,
                card.attack.map(|a| format!(", ATK {a}")).unwrap_or_default(),
                if card.is_spell { ", spell" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_boards(mine: &[BoardCard], theirs: &[BoardCard]) -> String {
    format!("My board: {}. Opponent board: {}.", render_board_side(mine), render_board_side(theirs))
}

fn render_board_side(side: &[BoardCard]) -> String {
    if side.is_empty() {
        return "empty".to_string();
    }
    side.iter()
        .map(|card| {
            let position = match card.position {
                Position::Attack => "ATK",
                Position::Defense => "DEF",
            };
            if card.face_down {
                format!("{} (face-down, {})", card.card_id, position)
            } else {
                format!("{} ({}/{}, {})", card.card_id, card.attack, card.defense, position)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_strategy(state: &GameStateFull) -> String {
    let my_power: u32 = state.my_board.iter().filter(|c| c.can_attack()).map(BoardCard::effective_value).sum();
    let lethal = my_power as i64 >= state.opponent_life_points && state.opponent_life_points > 0;

    let band = if state.my_life_points <= 0 {
        "losing"
    } else if state.opponent_life_points <= state.my_life_points / 2 {
        "favorable"
    } else if state.my_life_points <= state.opponent_life_points / 2 {
        "unfavorable"
    } else {
        "even"
    };

    format!(
        "Win-probability band: {band}. Lethal available: {lethal}. My LP {}, opponent LP {}.",
        state.my_life_points, state.opponent_life_points
    )
}
