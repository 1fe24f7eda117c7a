//! Pure diff-based event derivation.
//!
//! `derive_events` is deliberately a plain function: the polling engine
//! owns the only side effect (calling the API), and the decision to
//! wake the turn orchestrator is made by inspecting the returned
//! events, not by this function.

use crate::event::Event;
use duel_types::{GameSnapshot, GameStateFull, GameStatus};

/// Derive events from the transition `prev -> curr`, in rule order.
/// `full` supplies the fields `GameSnapshot` doesn't carry
/// (`is_my_turn`, end info).
///
/// `prev == curr` (same snapshot observed twice) emits nothing, per the
/// round-trip law: rules 1-5 all require some field to differ, and rule
/// 1 only fires when `prev` is absent.
pub fn derive_events(prev: Option<&GameSnapshot>, curr: &GameSnapshot, full: &GameStateFull) -> Vec<Event> {
    let game_id = full.game_id.clone();

    let Some(prev) = prev else {
        let mut events = vec![Event::GameStarted { game_id: game_id.clone() }];
        if full.is_my_turn() {
            events.push(Event::TurnStarted {
                game_id,
                turn_number: curr.turn_number,
            });
        }
        return events;
    };

    if prev.status != GameStatus::Completed && curr.status == GameStatus::Completed {
        return vec![Event::GameEnded {
            game_id,
            winner: full.infer_winner(),
            reason: full.end_info.as_ref().and_then(|e| e.end_reason.clone()),
        }];
    }

    let mut events = Vec::new();

    if prev.turn_number != curr.turn_number || prev.current_turn_actor != curr.current_turn_actor {
        if full.is_my_turn() {
            events.push(Event::TurnStarted {
                game_id: game_id.clone(),
                turn_number: curr.turn_number,
            });
        } else {
            events.push(Event::OpponentAction {
                game_id: game_id.clone(),
                action_type: "turn_passed".to_string(),
            });
        }
    }

    if prev.phase != curr.phase {
        events.push(Event::PhaseChanged {
            game_id: game_id.clone(),
            phase: phase_name(&curr.phase),
        });
    }

    if !prev.is_chain_waiting && curr.is_chain_waiting {
        let timeout_ms = full.chain_state.as_ref().map(|c| c.timeout_ms).unwrap_or(30_000);
        events.push(Event::ChainWaiting { game_id, timeout_ms });
    }

    events
}

fn phase_name(phase: &duel_types::Phase) -> String {
    match phase {
        duel_types::Phase::Main1 => "main1".to_string(),
        duel_types::Phase::Battle => "battle".to_string(),
        duel_types::Phase::Main2 => "main2".to_string(),
        duel_types::Phase::Other(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_types::{AvailableActions, ChainState, EndInfo, GameId, Phase, PlayerId};

    fn snapshot(turn: u32, phase: Phase, actor: &str, chain: bool, status: GameStatus) -> GameSnapshot {
        GameSnapshot {
            turn_number: turn,
            phase,
            current_turn_actor: PlayerId::new(actor),
            is_chain_waiting: chain,
            status,
        }
    }

    fn full_state(status: GameStatus, phase: Phase, turn: u32, current_turn: &str) -> GameStateFull {
        GameStateFull {
            game_id: GameId::new("G1"),
            lobby_id: None,
            status,
            phase,
            turn_number: turn,
            current_turn: PlayerId::new(current_turn),
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
        }
    }

    #[test]
    fn first_observation_emits_game_started_and_turn_started_when_my_turn() {
        let curr = snapshot(0, Phase::Main1, "me", false, GameStatus::InProgress);
        let full = full_state(GameStatus::InProgress, Phase::Main1, 0, "me");
        let events = derive_events(None, &curr, &full);
        assert_eq!(
            events,
            vec![
                Event::GameStarted { game_id: GameId::new("G1") },
                Event::TurnStarted { game_id: GameId::new("G1"), turn_number: 0 },
            ]
        );
    }

    #[test]
    fn first_observation_without_my_turn_emits_only_game_started() {
        let curr = snapshot(0, Phase::Main1, "opponent", false, GameStatus::InProgress);
        let full = full_state(GameStatus::InProgress, Phase::Main1, 0, "opponent");
        let events = derive_events(None, &curr, &full);
        assert_eq!(events, vec![Event::GameStarted { game_id: GameId::new("G1") }]);
    }

    #[test]
    fn identical_snapshots_emit_nothing() {
        let snap = snapshot(3, Phase::Main1, "me", false, GameStatus::InProgress);
        let full = full_state(GameStatus::InProgress, Phase::Main1, 3, "me");
        let events = derive_events(Some(&snap), &snap, &full);
        assert!(events.is_empty());
    }

    #[test]
    fn completion_emits_only_game_ended() {
        let prev = snapshot(5, Phase::Main2, "me", false, GameStatus::InProgress);
        let curr = snapshot(5, Phase::Main2, "me", false, GameStatus::Completed);
        let mut full = full_state(GameStatus::Completed, Phase::Main2, 5, "me");
        full.opponent_life_points = 0;
        full.end_info = Some(EndInfo { winner: None, end_reason: Some("lp_zero".into()) });

        let events = derive_events(Some(&prev), &curr, &full);
        assert_eq!(
            events,
            vec![Event::GameEnded {
                game_id: GameId::new("G1"),
                winner: duel_types::Winner::Agent,
                reason: Some("lp_zero".into()),
            }]
        );
    }

    #[test]
    fn turn_change_to_opponent_emits_opponent_action() {
        let prev = snapshot(1, Phase::Main2, "me", false, GameStatus::InProgress);
        let curr = snapshot(2, Phase::Main1, "opponent", false, GameStatus::InProgress);
        let full = full_state(GameStatus::InProgress, Phase::Main1, 2, "opponent");
        let events = derive_events(Some(&prev), &curr, &full);
        assert!(events.contains(&Event::OpponentAction {
            game_id: GameId::new("G1"),
            action_type: "turn_passed".into(),
        }));
        assert!(events.contains(&Event::PhaseChanged {
            game_id: GameId::new("G1"),
            phase: "main1".into(),
        }));
    }

    #[test]
    fn chain_waiting_rising_edge_emits_event() {
        let prev = snapshot(2, Phase::Main1, "me", false, GameStatus::InProgress);
        let curr = snapshot(2, Phase::Main1, "me", true, GameStatus::InProgress);
        let mut full = full_state(GameStatus::InProgress, Phase::Main1, 2, "me");
        full.chain_state = Some(ChainState { is_waiting: true, timeout_ms: 12_000 });
        let events = derive_events(Some(&prev), &curr, &full);
        assert_eq!(
            events,
            vec![Event::ChainWaiting { game_id: GameId::new("G1"), timeout_ms: 12_000 }]
        );
    }

    #[test]
    fn phase_change_alone_with_no_turn_change() {
        let prev = snapshot(2, Phase::Main1, "me", false, GameStatus::InProgress);
        let curr = snapshot(2, Phase::Battle, "me", false, GameStatus::InProgress);
        let full = full_state(GameStatus::InProgress, Phase::Battle, 2, "me");
        let events = derive_events(Some(&prev), &curr, &full);
        assert_eq!(
            events,
            vec![Event::PhaseChanged { game_id: GameId::new("G1"), phase: "battle".into() }]
        );
    }
}
