//! Legality: normalizing the server's raw action list into the
//! canonical vocabulary and enforcing the first-turn battle restriction.

use crate::context::TurnContext;
use duel_types::CanonicalAction;

/// Normalize `ctx.available_actions` into the canonical set, dropping
/// `ATTACK`/`ENTER_BATTLE_PHASE` on turn 1 (the server doesn't always
/// reflect this restriction in its own list).
pub fn legal_actions(ctx: &TurnContext) -> Vec<CanonicalAction> {
    let mut actions: Vec<CanonicalAction> = ctx
        .available_actions
        .actions
        .iter()
        .filter_map(|descriptor| CanonicalAction::normalize(&descriptor.action))
        .collect();

    if ctx.state.turn_number <= 1 {
        actions.retain(|a| !matches!(a, CanonicalAction::Attack | CanonicalAction::EnterBattlePhase));
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FailedAction;
    use duel_types::{
        ActionDescriptor, AvailableActions, GameId, GameStateFull, GameStatus, Phase, PlayerId,
    };

    fn ctx_with(turn_number: u32, actions: Vec<&str>) -> TurnContext {
        TurnContext {
            game_id: GameId::new("G1"),
            state: GameStateFull {
                game_id: GameId::new("G1"),
                lobby_id: None,
                status: GameStatus::InProgress,
                phase: Phase::Main1,
                turn_number,
                current_turn: PlayerId::new("me"),
                my_player_id: PlayerId::new("me"),
                my_life_points: 8000,
                opponent_life_points: 8000,
                opponent_deck_count: 40,
                hand: vec![],
                my_board: vec![],
                opponent_board: vec![],
                my_graveyard: vec![],
                opponent_graveyard: vec![],
                available_actions: AvailableActions::default(),
                chain_state: None,
                end_info: None,
            },
            available_actions: AvailableActions {
                actions: actions
                    .into_iter()
                    .map(|a| ActionDescriptor {
                        action: a.to_string(),
                        eligible_card_ids: vec![],
                        parameter_keys: vec![],
                    })
                    .collect(),
            },
            history: vec![],
            failed_actions: Vec::<FailedAction>::new(),
            hand_summary: String::new(),
            board_summary: String::new(),
            strategy_summary: String::new(),
        }
    }

    #[test]
    fn normalizes_and_drops_unknown_actions() {
        let ctx = ctx_with(3, vec!["end_turn", "cast_something_unknown"]);
        assert_eq!(legal_actions(&ctx), vec![CanonicalAction::EndTurn]);
    }

    #[test]
    fn strips_attack_and_battle_phase_on_turn_one() {
        let ctx = ctx_with(1, vec!["attack", "enter_battle_phase", "end_turn"]);
        let legal = legal_actions(&ctx);
        assert!(!legal.contains(&CanonicalAction::Attack));
        assert!(!legal.contains(&CanonicalAction::EnterBattlePhase));
        assert!(legal.contains(&CanonicalAction::EndTurn));
    }

    #[test]
    fn keeps_attack_on_later_turns() {
        let ctx = ctx_with(2, vec!["attack"]);
        assert_eq!(legal_actions(&ctx), vec![CanonicalAction::Attack]);
    }
}
