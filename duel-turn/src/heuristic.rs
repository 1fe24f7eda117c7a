//! Deterministic, zero-latency decision tier. Applied first; returns
//! `None` when no rule fires and the model tier should be consulted.

use crate::context::TurnContext;
use crate::decision::ActionChoice;
use duel_types::{BoardCard, CanonicalAction, DecisionSourceKind, Phase, Position};

const SOURCE: DecisionSourceKind = DecisionSourceKind::Heuristic;

/// Required tributes for a monster of the given cost/level (spec.md
/// §4.6.4): ≥7 needs 2, ≥5 needs 1, else 0.
pub fn required_tributes(cost: u32) -> u32 {
    if cost >= 7 {
        2
    } else if cost >= 5 {
        1
    } else {
        0
    }
}

/// Run the heuristic tier for the current phase.
pub fn heuristic_decision(ctx: &TurnContext, legal: &[CanonicalAction]) -> Option<ActionChoice> {
    if let [CanonicalAction::EndTurn] = legal {
        return Some(ActionChoice::new(CanonicalAction::EndTurn, "only legal action", SOURCE));
    }

    match &ctx.state.phase {
        Phase::Main1 => main_phase(ctx, legal, true),
        Phase::Main2 => main_phase(ctx, legal, false),
        Phase::Battle => battle_phase(ctx, legal),
        Phase::Other(_) => None,
    }
}

fn main_phase(ctx: &TurnContext, legal: &[CanonicalAction], allow_battle: bool) -> Option<ActionChoice> {
    if legal.contains(&CanonicalAction::ActivateSpell) {
        if let Some(descriptor) = ctx.available_actions.find(CanonicalAction::ActivateSpell.server_name()) {
            if let Some(card_id) = descriptor.eligible_card_ids.first() {
                return Some(ActionChoice::with_parameters(
                    CanonicalAction::ActivateSpell,
                    "activating first eligible spell",
                    SOURCE,
                    serde_json::json!({ "card_id": card_id }),
                ));
            }
        }
    }

    if allow_battle
        && legal.contains(&CanonicalAction::EnterBattlePhase)
        && ctx.state.my_board.iter().any(BoardCard::can_attack)
    {
        return Some(ActionChoice::new(
            CanonicalAction::EnterBattlePhase,
            "a monster can still attack",
            SOURCE,
        ));
    }

    if legal.contains(&CanonicalAction::SummonMonster) {
        if let Some(card) = pick_summon_candidate(ctx) {
            return Some(ActionChoice::with_parameters(
                CanonicalAction::SummonMonster,
                "lowest-tribute, highest-attack eligible monster",
                SOURCE,
                serde_json::json!({ "card_id": card.card_id }),
            ));
        }
    }

    if legal.contains(&CanonicalAction::SetCard) {
        if let Some(descriptor) = ctx.available_actions.find(CanonicalAction::SetCard.server_name()) {
            let non_creature = descriptor
                .eligible_card_ids
                .iter()
                .find(|id| ctx.state.hand.iter().any(|c| &c.card_id == *id && c.is_spell));
            if let Some(card_id) = non_creature {
                return Some(ActionChoice::with_parameters(
                    CanonicalAction::SetCard,
                    "preferring a non-creature set",
                    SOURCE,
                    serde_json::json!({ "card_id": card_id }),
                ));
            }
            if let Some(card_id) = lowest_tribute_eligible(ctx, &descriptor.eligible_card_ids) {
                return Some(ActionChoice::with_parameters(
                    CanonicalAction::SetCard,
                    "only creature candidates available, picking lowest tribute",
                    SOURCE,
                    serde_json::json!({ "card_id": card_id }),
                ));
            }
        }
        return None;
    }

    None
}

fn battle_phase(ctx: &TurnContext, legal: &[CanonicalAction]) -> Option<ActionChoice> {
    if legal.contains(&CanonicalAction::Attack) {
        if let Some(attacker) = strongest_ready_attacker(&ctx.state.my_board) {
            let target = select_attack_target(&ctx.state.opponent_board);
            let mut parameters = serde_json::json!({ "attacker_card_id": attacker.card_id });
            if let Some(target) = target {
                parameters["target_card_id"] = serde_json::json!(target.card_id);
            }
            return Some(ActionChoice::with_parameters(
                CanonicalAction::Attack,
                "strongest ready attacker vs weakest exposed target",
                SOURCE,
                parameters,
            ));
        }
    }
    if legal.contains(&CanonicalAction::EnterMainPhase2) {
        return Some(ActionChoice::new(CanonicalAction::EnterMainPhase2, "no more attacks available", SOURCE));
    }
    Some(ActionChoice::new(CanonicalAction::EndTurn, "nothing left to do in battle", SOURCE))
}

/// Strongest monster able to attack right now (highest ATK, not
/// face-down, not already attacked). Exposed for the executor's
/// fallback when a model-chosen attacker id doesn't resolve.
pub(crate) fn strongest_ready_attacker(board: &[BoardCard]) -> Option<&BoardCard> {
    board.iter().filter(|c| c.can_attack()).max_by_key(|c| c.attack)
}

/// Weakest face-up opponent target by effective value, first face-down
/// monster if none are face-up, or `None` if the board is empty.
pub(crate) fn select_attack_target(opponent_board: &[BoardCard]) -> Option<&BoardCard> {
    if opponent_board.is_empty() {
        return None;
    }
    let face_up: Vec<&BoardCard> = opponent_board.iter().filter(|c| !c.face_down).collect();
    if face_up.is_empty() {
        return opponent_board.first();
    }
    face_up.into_iter().min_by_key(|c| c.effective_value())
}

fn pick_summon_candidate(ctx: &TurnContext) -> Option<&duel_types::CardInHand> {
    let descriptor = ctx.available_actions.find(CanonicalAction::SummonMonster.server_name())?;
    let mut candidates: Vec<&duel_types::CardInHand> = if descriptor.eligible_card_ids.is_empty() {
        ctx.state.hand.iter().filter(|c| !c.is_spell).collect()
    } else {
        ctx.state
            .hand
            .iter()
            .filter(|c| descriptor.eligible_card_ids.contains(&c.card_id))
            .collect()
    };
    candidates.sort_by_key(|c| (required_tributes(c.cost), std::cmp::Reverse(c.attack.unwrap_or(0))));
    candidates.into_iter().next()
}

fn lowest_tribute_eligible<'a>(
    ctx: &'a TurnContext,
    eligible_ids: &[duel_types::CardId],
) -> Option<&'a duel_types::CardId> {
    ctx.state
        .hand
        .iter()
        .filter(|c| eligible_ids.contains(&c.card_id))
        .min_by_key(|c| required_tributes(c.cost))
        .map(|c| &c.card_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FailedAction;
    use duel_types::{
        ActionDescriptor, AvailableActions, CardId, CardInHand, GameId, GameStateFull, GameStatus,
        PlayerId,
    };

    fn base_ctx(phase: Phase) -> TurnContext {
        TurnContext {
            game_id: GameId::new("G1"),
            state: GameStateFull {
                game_id: GameId::new("G1"),
                lobby_id: None,
                status: GameStatus::InProgress,
                phase,
                turn_number: 3,
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
            available_actions: AvailableActions::default(),
            history: vec![],
            failed_actions: Vec::<FailedAction>::new(),
            hand_summary: String::new(),
            board_summary: String::new(),
            strategy_summary: String::new(),
        }
    }

    #[test]
    fn required_tributes_thresholds() {
        assert_eq!(required_tributes(4), 0);
        assert_eq!(required_tributes(5), 1);
        assert_eq!(required_tributes(6), 1);
        assert_eq!(required_tributes(7), 2);
        assert_eq!(required_tributes(10), 2);
    }

    #[test]
    fn only_end_turn_legal_picks_end_turn() {
        let ctx = base_ctx(Phase::Main1);
        let choice = heuristic_decision(&ctx, &[CanonicalAction::EndTurn]).unwrap();
        assert_eq!(choice.action, CanonicalAction::EndTurn);
    }

    #[test]
    fn main1_prefers_spell_activation() {
        let mut ctx = base_ctx(Phase::Main1);
        ctx.available_actions = AvailableActions {
            actions: vec![ActionDescriptor {
                action: "activate_spell".into(),
                eligible_card_ids: vec![CardId::new("spell1")],
                parameter_keys: vec![],
            }],
        };
        let legal = vec![CanonicalAction::ActivateSpell, CanonicalAction::EndTurn];
        let choice = heuristic_decision(&ctx, &legal).unwrap();
        assert_eq!(choice.action, CanonicalAction::ActivateSpell);
        assert_eq!(choice.parameters["card_id"], "spell1");
    }

    #[test]
    fn main1_enters_battle_when_a_monster_can_attack() {
        let mut ctx = base_ctx(Phase::Main1);
        ctx.state.my_board = vec![BoardCard {
            card_id: CardId::new("m1"),
            cost: 4,
            attack: 1500,
            defense: 1000,
            position: Position::Attack,
            face_down: false,
            has_attacked: false,
            has_changed_position: false,
        }];
        let legal = vec![CanonicalAction::EnterBattlePhase, CanonicalAction::EndTurn];
        let choice = heuristic_decision(&ctx, &legal).unwrap();
        assert_eq!(choice.action, CanonicalAction::EnterBattlePhase);
    }

    #[test]
    fn main1_summons_lowest_tribute_highest_attack() {
        let mut ctx = base_ctx(Phase::Main1);
        ctx.state.hand = vec![
            CardInHand { card_id: CardId::new("weak"), cost: 4, attack: Some(1000), defense: Some(800), is_spell: false },
            CardInHand { card_id: CardId::new("strong"), cost: 4, attack: Some(2200), defense: Some(1000), is_spell: false },
            CardInHand { card_id: CardId::new("bigtribute"), cost: 8, attack: Some(3000), defense: Some(2500), is_spell: false },
        ];
        ctx.available_actions = AvailableActions {
            actions: vec![ActionDescriptor {
                action: "summon_monster".into(),
                eligible_card_ids: vec![CardId::new("weak"), CardId::new("strong"), CardId::new("bigtribute")],
                parameter_keys: vec![],
            }],
        };
        let legal = vec![CanonicalAction::SummonMonster, CanonicalAction::EndTurn];
        let choice = heuristic_decision(&ctx, &legal).unwrap();
        assert_eq!(choice.action, CanonicalAction::SummonMonster);
        assert_eq!(choice.parameters["card_id"], "strong");
    }

    #[test]
    fn battle_phase_selects_strongest_attacker_and_weakest_target() {
        let mut ctx = base_ctx(Phase::Battle);
        ctx.state.my_board = vec![
            BoardCard { card_id: CardId::new("a1"), cost: 4, attack: 1200, defense: 800, position: Position::Attack, face_down: false, has_attacked: false, has_changed_position: false },
            BoardCard { card_id: CardId::new("a2"), cost: 4, attack: 2400, defense: 1000, position: Position::Attack, face_down: false, has_attacked: false, has_changed_position: false },
        ];
        ctx.state.opponent_board = vec![
            BoardCard { card_id: CardId::new("o1"), cost: 4, attack: 1900, defense: 400, position: Position::Attack, face_down: false, has_attacked: false, has_changed_position: false },
            BoardCard { card_id: CardId::new("o2"), cost: 4, attack: 1000, defense: 2500, position: Position::Defense, face_down: false, has_attacked: false, has_changed_position: false },
        ];
        let legal = vec![CanonicalAction::Attack, CanonicalAction::EndTurn];
        let choice = heuristic_decision(&ctx, &legal).unwrap();
        assert_eq!(choice.action, CanonicalAction::Attack);
        assert_eq!(choice.parameters["attacker_card_id"], "a2");
        assert_eq!(choice.parameters["target_card_id"], "o1");
    }

    #[test]
    fn battle_phase_direct_attack_when_board_empty() {
        let mut ctx = base_ctx(Phase::Battle);
        ctx.state.my_board = vec![BoardCard {
            card_id: CardId::new("a1"),
            cost: 4,
            attack: 1200,
            defense: 800,
            position: Position::Attack,
            face_down: false,
            has_attacked: false,
            has_changed_position: false,
        }];
        let legal = vec![CanonicalAction::Attack];
        let choice = heuristic_decision(&ctx, &legal).unwrap();
        assert!(choice.parameters.get("target_card_id").is_none());
    }

    #[test]
    fn battle_phase_falls_back_to_end_turn() {
        let ctx = base_ctx(Phase::Battle);
        let legal = vec![CanonicalAction::EndTurn];
        let choice = heuristic_decision(&ctx, &legal).unwrap();
        assert_eq!(choice.action, CanonicalAction::EndTurn);
    }

    #[test]
    fn other_phase_declines() {
        let ctx = base_ctx(Phase::Other("end_phase".into()));
        let legal = vec![CanonicalAction::SummonMonster, CanonicalAction::EndTurn];
        assert!(heuristic_decision(&ctx, &legal).is_none());
    }
}
