//! Translating an [`ActionChoice`] into the one `GameApiClient` call it
//! maps to, including tribute auto-inference (spec.md §4.6.4).

use crate::decision::ActionChoice;
use crate::heuristic::{select_attack_target, strongest_ready_attacker};
use duel_client::{ClientError, GameApiClient};
use duel_types::{CardId, GameId, GameStateFull};

/// Result of attempting to execute one action against the server.
pub enum ExecuteOutcome {
    /// The server accepted the action; the response body is opaque here.
    Success(serde_json::Value),
    /// A precondition the server would also reject failed locally, so
    /// no request was sent. Distinct from a transport error.
    Declined(String),
}

/// Execute `choice`, which must already have passed `ensure_legal`.
pub async fn execute_action(
    client: &GameApiClient,
    game_id: &GameId,
    state: &GameStateFull,
    choice: &ActionChoice,
) -> Result<ExecuteOutcome, ClientError> {
    use duel_types::CanonicalAction as A;
    match choice.action {
        A::SummonMonster => execute_tributed(client, game_id, state, choice, false).await,
        A::SetCard => execute_set_card(client, game_id, state, choice).await,
        A::ActivateSpell | A::ActivateTrap => {
            // The API exposes a single spell/trap activation endpoint;
            // ACTIVATE_TRAP is distinguished only for legality/heuristic
            // purposes, not at the transport layer.
            let outcome = client.activate_spell(game_id, &choice.parameters).await?;
            Ok(ExecuteOutcome::Success(outcome))
        }
        A::Attack => execute_attack(client, game_id, state, choice).await,
        A::ChangePosition => execute_change_position(client, game_id, state, choice).await,
        A::FlipSummon => execute_flip_summon(client, game_id, state, choice).await,
        A::EnterBattlePhase => Ok(ExecuteOutcome::Success(client.enter_battle_phase(game_id).await?)),
        A::EnterMainPhase2 => Ok(ExecuteOutcome::Success(client.enter_main_phase_2(game_id).await?)),
        A::EndTurn => Ok(ExecuteOutcome::Success(client.end_turn(game_id).await?)),
        A::ChainResponse => {
            let card_id = extract_card_id(&choice.parameters);
            Ok(ExecuteOutcome::Success(client.chain_response(game_id, false, card_id).await?))
        }
        A::PassChain => Ok(ExecuteOutcome::Success(client.chain_response(game_id, true, None).await?)),
    }
}

async fn execute_tributed(
    client: &GameApiClient,
    game_id: &GameId,
    state: &GameStateFull,
    choice: &ActionChoice,
    set_face_down: bool,
) -> Result<ExecuteOutcome, ClientError> {
    let Some(card_id) = extract_card_id(&choice.parameters) else {
        return Ok(ExecuteOutcome::Declined("missing card_id parameter".to_string()));
    };
    let Some(tribute_ids) = resolve_tributes(state, &card_id, &choice.parameters) else {
        return Ok(ExecuteOutcome::Declined(format!("insufficient tributes for {card_id}")));
    };

    let params = serde_json::json!({ "card_id": card_id, "tribute_ids": tribute_ids });
    let outcome = if set_face_down {
        client.set_card(game_id, &params).await?
    } else {
        client.summon(game_id, &params).await?
    };
    Ok(ExecuteOutcome::Success(outcome))
}

async fn execute_set_card(
    client: &GameApiClient,
    game_id: &GameId,
    state: &GameStateFull,
    choice: &ActionChoice,
) -> Result<ExecuteOutcome, ClientError> {
    let Some(card_id) = extract_card_id(&choice.parameters) else {
        return Ok(ExecuteOutcome::Declined("missing card_id parameter".to_string()));
    };
    let is_spell = state.hand.iter().find(|c| c.card_id == card_id).map(|c| c.is_spell).unwrap_or(false);

    if is_spell {
        let params = serde_json::json!({ "card_id": card_id });
        let outcome = client.set_spell_trap(game_id, &params).await?;
        return Ok(ExecuteOutcome::Success(outcome));
    }

    execute_tributed(client, game_id, state, choice, true).await
}

/// Required tribute count for a monster, with the caller-supplied ids
/// topped up from the agent's own face-up board when short.
fn resolve_tributes(state: &GameStateFull, card_id: &CardId, parameters: &serde_json::Value) -> Option<Vec<CardId>> {
    let cost = state.hand.iter().find(|c| &c.card_id == card_id).map(|c| c.cost).unwrap_or(0);
    let required = crate::heuristic::required_tributes(cost) as usize;

    let mut tribute_ids: Vec<CardId> = parameters
        .get("tribute_ids")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).map(CardId::new).collect())
        .unwrap_or_default();

    if tribute_ids.len() < required {
        for candidate in state.my_board.iter().filter(|c| !c.face_down) {
            if tribute_ids.len() >= required {
                break;
            }
            if !tribute_ids.contains(&candidate.card_id) {
                tribute_ids.push(candidate.card_id.clone());
            }
        }
    }

    if tribute_ids.len() < required {
        return None;
    }
    Some(tribute_ids)
}

async fn execute_attack(
    client: &GameApiClient,
    game_id: &GameId,
    state: &GameStateFull,
    choice: &ActionChoice,
) -> Result<ExecuteOutcome, ClientError> {
    let attacker_id = choice
        .parameters
        .get("attacker_card_id")
        .and_then(|v| v.as_str())
        .map(CardId::new)
        .filter(|id| state.my_board.iter().any(|c| &c.card_id == id && c.can_attack()))
        .or_else(|| strongest_ready_attacker(&state.my_board).map(|c| c.card_id.clone()));

    let Some(attacker_id) = attacker_id else {
        return Ok(ExecuteOutcome::Declined("no monster able to attack".to_string()));
    };

    let target_id = choice
        .parameters
        .get("target_card_id")
        .and_then(|v| v.as_str())
        .map(CardId::new)
        .filter(|id| state.opponent_board.iter().any(|c| &c.card_id == id))
        .or_else(|| select_attack_target(&state.opponent_board).map(|c| c.card_id.clone()));

    let mut params = serde_json::json!({ "attacker_card_id": attacker_id });
    if let Some(target_id) = target_id {
        params["target_card_id"] = serde_json::json!(target_id);
    }
    Ok(ExecuteOutcome::Success(client.attack(game_id, &params).await?))
}

async fn execute_change_position(
    client: &GameApiClient,
    game_id: &GameId,
    state: &GameStateFull,
    choice: &ActionChoice,
) -> Result<ExecuteOutcome, ClientError> {
    let Some(card_id) = extract_card_id(&choice.parameters) else {
        return Ok(ExecuteOutcome::Declined("missing card_id parameter".to_string()));
    };
    let eligible = state.my_board.iter().any(|c| c.card_id == card_id && !c.has_changed_position);
    if !eligible {
        return Ok(ExecuteOutcome::Declined(format!("{card_id} already changed position this turn")));
    }
    let params = serde_json::json!({ "card_id": card_id });
    Ok(ExecuteOutcome::Success(client.change_position(game_id, &params).await?))
}

async fn execute_flip_summon(
    client: &GameApiClient,
    game_id: &GameId,
    state: &GameStateFull,
    choice: &ActionChoice,
) -> Result<ExecuteOutcome, ClientError> {
    let Some(card_id) = extract_card_id(&choice.parameters) else {
        return Ok(ExecuteOutcome::Declined("missing card_id parameter".to_string()));
    };
    let eligible = state.my_board.iter().any(|c| c.card_id == card_id && c.face_down);
    if !eligible {
        return Ok(ExecuteOutcome::Declined(format!("{card_id} is not face-down")));
    }
    let params = serde_json::json!({ "card_id": card_id });
    Ok(ExecuteOutcome::Success(client.flip_summon(game_id, &params).await?))
}

fn extract_card_id(parameters: &serde_json::Value) -> Option<CardId> {
    parameters.get("card_id").and_then(|v| v.as_str()).map(CardId::new)
}
