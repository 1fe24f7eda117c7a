//! The bounded action loop: gather context, decide, enforce legality,
//! execute, record, repeat — structured like `ReactOperator::execute`
//! in the teacher, generic over the decision source rather than an
//! object-safe trait (see [`crate::driver::TurnDriver`] for the
//! object-safe boundary other crates use).

use crate::context::{gather_context, FailedAction, TurnContext};
use crate::decision::ActionChoice;
use crate::error::TurnError;
use crate::heuristic::heuristic_decision;
use crate::history::DecisionHistory;
use crate::legal::legal_actions;
use crate::policy::{ensure_legal, fallback_decision};
use crate::execute::{execute_action, ExecuteOutcome};
use crate::TurnConfig;
use duel_client::GameApiClient;
use duel_decision::{DecisionRequest, DecisionSource};
use duel_types::{
    CanonicalAction, Decision, DecisionResult, DecisionSourceKind, GameId, Phase,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// How one `run_turn` call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The loop executed `END_TURN` (chosen or forced).
    EndedTurn,
    /// Context gathering observed it is no longer this agent's turn.
    NotMyTurn,
    /// Context gathering observed the game has already completed.
    GameCompleted,
    /// `action_cap` iterations ran without an `END_TURN`.
    ActionCapReached,
    /// A call arrived while another `run_turn` was already in flight;
    /// dropped per the `is_executing_turn` guard (§4.6.6).
    AlreadyExecuting,
}

/// Drives one game's turn-by-turn action loop for a single decision
/// source implementation. Not object-safe (`D: DecisionSource` is
/// RPITIT); `duel-polling` depends on [`crate::driver::TurnDriver`]
/// instead.
pub struct TurnOrchestrator<D: DecisionSource> {
    client: GameApiClient,
    decision_source: D,
    config: TurnConfig,
    history: DecisionHistory,
    executing: AtomicBool,
}

impl<D: DecisionSource> TurnOrchestrator<D> {
    /// Build an orchestrator around a client, decision source, config,
    /// and shared decision history.
    pub fn new(client: GameApiClient, decision_source: D, config: TurnConfig, history: DecisionHistory) -> Self {
        Self { client, decision_source, config, history, executing: AtomicBool::new(false) }
    }

    /// Whether a `run_turn` call is currently in flight.
    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::SeqCst)
    }

    /// Access the decision history (read path for callers like the
    /// state aggregator).
    pub fn history(&self) -> &DecisionHistory {
        &self.history
    }

    /// Run the bounded action loop for `game_id` until `END_TURN`, a
    /// terminal game state, a turn-ownership change, or the action cap.
    pub async fn run_turn(&self, game_id: &GameId) -> Result<TurnOutcome, TurnError> {
        if self.executing.swap(true, Ordering::SeqCst) {
            tracing::warn!(%game_id, "run_turn re-entered while already executing, dropping");
            return Ok(TurnOutcome::AlreadyExecuting);
        }
        let outcome = self.run_turn_inner(game_id).await;
        self.executing.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run_turn_inner(&self, game_id: &GameId) -> Result<TurnOutcome, TurnError> {
        let mut failed_actions: Vec<FailedAction> = Vec::new();
        let mut model_calls_used: u32 = 0;
        let mut last_model_call: Option<Instant> = None;
        let mut consecutive_failures: u32 = 0;

        for _ in 0..self.config.action_cap {
            let ctx = gather_context(&self.client, game_id, failed_actions.clone()).await?;

            if ctx.state.status.is_completed() {
                return Ok(TurnOutcome::GameCompleted);
            }
            if !ctx.state.is_my_turn() {
                return Ok(TurnOutcome::NotMyTurn);
            }

            let legal = legal_actions(&ctx);

            let choice = if consecutive_failures >= self.config.consecutive_failure_cap {
                ActionChoice::new(
                    CanonicalAction::EndTurn,
                    "forced end turn after repeated action failures",
                    DecisionSourceKind::Fallback,
                )
            } else if let Some(choice) = heuristic_decision(&ctx, &legal) {
                choice
            } else if model_calls_used < self.config.max_model_decisions_per_turn {
                if let Some(last) = last_model_call {
                    let elapsed = last.elapsed();
                    if elapsed < self.config.min_model_decision_interval {
                        tokio::time::sleep(self.config.min_model_decision_interval - elapsed).await;
                    }
                }
                model_calls_used += 1;
                last_model_call = Some(Instant::now());
                self.model_decision(&ctx, &legal).await
            } else {
                fallback_decision(&legal)
            };

            let choice = ensure_legal(choice, &legal);
            let is_end_turn = choice.action == CanonicalAction::EndTurn;

            let started = Instant::now();
            let outcome = execute_action(&self.client, game_id, &ctx.state, &choice).await;
            let execution_time_ms = started.elapsed().as_millis() as u64;

            let (result, failure_reason) = match &outcome {
                Ok(ExecuteOutcome::Success(_)) => (DecisionResult::Success, None),
                Ok(ExecuteOutcome::Declined(reason)) => (DecisionResult::Failed, Some(reason.clone())),
                Err(err) => (DecisionResult::Failed, Some(err.to_string())),
            };

            self.history
                .record(
                    game_id,
                    Decision {
                        id: uuid::Uuid::new_v4().to_string(),
                        timestamp: chrono::Utc::now(),
                        turn_number: ctx.state.turn_number,
                        phase: phase_label(&ctx.state.phase),
                        action: choice.action,
                        reasoning: choice.reasoning.clone(),
                        parameters: choice.parameters.clone(),
                        result,
                        execution_time_ms,
                        source: choice.source,
                    },
                )
                .await;

            match failure_reason {
                Some(reason) => {
                    failed_actions.push(FailedAction { action: choice.action.server_name().to_string(), reason });
                    consecutive_failures += 1;
                }
                None => consecutive_failures = 0,
            }

            if is_end_turn {
                return Ok(TurnOutcome::EndedTurn);
            }

            tokio::time::sleep(self.config.action_loop_delay).await;
        }

        Ok(TurnOutcome::ActionCapReached)
    }

    async fn model_decision(&self, ctx: &TurnContext, legal: &[CanonicalAction]) -> ActionChoice {
        let prompt = render_action_prompt(ctx, legal);
        match self.decision_source.decide(DecisionRequest::new(prompt)).await {
            Ok(response) => match duel_decision::parse_action_response(&response.raw_text) {
                Some(parsed) => match CanonicalAction::normalize(&parsed.action) {
                    Some(action) => ActionChoice::with_parameters(
                        action,
                        parsed.reasoning,
                        DecisionSourceKind::Model,
                        parsed.parameters,
                    ),
                    None => ActionChoice::new(
                        CanonicalAction::EndTurn,
                        format!("model returned an unrecognized action: {}", parsed.action),
                        DecisionSourceKind::Model,
                    ),
                },
                None => ActionChoice::new(
                    CanonicalAction::EndTurn,
                    "model response was not a valid JSON object",
                    DecisionSourceKind::Model,
                ),
            },
            Err(err) => {
                tracing::warn!(error = %err, game_id = %ctx.game_id, "decision source call failed");
                ActionChoice::new(
                    CanonicalAction::EndTurn,
                    format!("decision source unavailable: {err}"),
                    DecisionSourceKind::Model,
                )
            }
        }
    }

    /// Respond to an open chain (§4.6.5): enumerate chainable cards in
    /// hand, pass outright if none exist or chain decisions are
    /// disabled, else consult the decision source once.
    pub async fn respond_to_chain(&self, game_id: &GameId) -> Result<(), TurnError> {
        let state = self.client.get_game_state(game_id).await?;
        let candidates: Vec<_> = state.hand.iter().filter(|c| c.is_spell).collect();

        if candidates.is_empty() || !self.config.model_chain_decisions {
            self.client.chain_response(game_id, true, None).await?;
            return Ok(());
        }

        let prompt = format!(
            "A chain is open. Cards you may respond with: {}. Respond with a single JSON object {{\"chain\": bool, \"card_id\": \"...\"}}.",
            candidates.iter().map(|c| c.card_id.to_string()).collect::<Vec<_>>().join(", ")
        );
        let response = self.decision_source.decide(DecisionRequest::new(prompt)).await;
        let parsed = response.ok().and_then(|r| duel_decision::parse_chain_response(&r.raw_text));

        match parsed {
            Some(decision) if decision.chain && decision.card_id.is_some() => {
                self.client.chain_response(game_id, false, decision.card_id).await?;
            }
            _ => {
                self.client.chain_response(game_id, true, None).await?;
            }
        }
        Ok(())
    }
}

fn render_action_prompt(ctx: &TurnContext, legal: &[CanonicalAction]) -> String {
    let available = legal.iter().map(|a| a.server_name()).collect::<Vec<_>>().join(", ");
    let failed = if ctx.failed_actions.is_empty() {
        "none".to_string()
    } else {
        ctx.failed_actions.iter().map(|f| format!("{} ({})", f.action, f.reason)).collect::<Vec<_>>().join("; ")
    };
    format!(
        "HAND: {}\nBOARD: {}\nSTRATEGY: {}\nFAILED THIS TURN: {failed}\nAVAILABLE ACTIONS: {available}\nRespond with exactly one JSON object: {{\"action\": ..., \"reasoning\": ..., \"parameters\": {{...}}}}.",
        ctx.hand_summary, ctx.board_summary, ctx.strategy_summary
    )
}

fn phase_label(phase: &Phase) -> String {
    match phase {
        Phase::Main1 => "main1".to_string(),
        Phase::Battle => "battle".to_string(),
        Phase::Main2 => "main2".to_string(),
        Phase::Other(raw) => raw.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_decision::{DecisionResponse, DecisionSourceError};
    use std::future::Future;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticSource(String);

    impl DecisionSource for StaticSource {
        fn decide(&self, _request: DecisionRequest) -> impl Future<Output = Result<DecisionResponse, DecisionSourceError>> + Send {
            let text = self.0.clone();
            async move { Ok(DecisionResponse { raw_text: text }) }
        }
    }

    fn fast_config() -> TurnConfig {
        TurnConfig {
            action_cap: 16,
            consecutive_failure_cap: 2,
            max_model_decisions_per_turn: 2,
            min_model_decision_interval: Duration::from_millis(0),
            action_loop_delay: Duration::from_millis(0),
            model_chain_decisions: false,
        }
    }

    fn orchestrator_for(server: &MockServer) -> TurnOrchestrator<StaticSource> {
        let client = GameApiClient::new("test-key").base_url(server.uri());
        TurnOrchestrator::new(client, StaticSource(String::new()), fast_config(), DecisionHistory::new(None))
    }

    async fn mount_state(server: &MockServer, game_id: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/games/{game_id}/state")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/games/{game_id}/actions")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "actions": [] })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/games/{game_id}/history")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(server)
            .await;
    }

    fn base_state(game_id: &str, current_turn: &str) -> serde_json::Value {
        serde_json::json!({
            "game_id": game_id,
            "status": "in_progress",
            "phase": "main1",
            "turn_number": 3,
            "current_turn": current_turn,
            "my_player_id": "me",
            "my_life_points": 8000,
            "opponent_life_points": 8000,
            "available_actions": { "actions": [] }
        })
    }

    #[tokio::test]
    async fn not_my_turn_returns_immediately() {
        let server = MockServer::start().await;
        mount_state(&server, "G1", base_state("G1", "opponent")).await;
        let orchestrator = orchestrator_for(&server);
        let outcome = orchestrator.run_turn(&GameId::new("G1")).await.unwrap();
        assert_eq!(outcome, TurnOutcome::NotMyTurn);
    }

    #[tokio::test]
    async fn completed_game_returns_immediately() {
        let server = MockServer::start().await;
        let mut state = base_state("G1", "me");
        state["status"] = serde_json::json!("completed");
        mount_state(&server, "G1", state).await;
        let orchestrator = orchestrator_for(&server);
        let outcome = orchestrator.run_turn(&GameId::new("G1")).await.unwrap();
        assert_eq!(outcome, TurnOutcome::GameCompleted);
    }

    #[tokio::test]
    async fn only_end_turn_legal_executes_and_records_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/games/G1/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(base_state("G1", "me")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/games/G1/actions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "actions": [{ "action": "end_turn" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/games/G1/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/games/G1/actions/end-turn"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server);
        let game_id = GameId::new("G1");
        let outcome = orchestrator.run_turn(&game_id).await.unwrap();
        assert_eq!(outcome, TurnOutcome::EndedTurn);

        let recorded = orchestrator.history().get(&game_id, 10).await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].action, CanonicalAction::EndTurn);
        assert_eq!(recorded[0].result, DecisionResult::Success);
    }

    #[tokio::test]
    async fn reentrant_call_is_dropped_while_executing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/games/G1/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(base_state("G1", "me"))
                    .set_delay(Duration::from_millis(80)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/games/G1/actions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "actions": [{ "action": "end_turn" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/games/G1/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/games/G1/actions/end-turn"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server);
        let game_id = GameId::new("G1");

        let (first, second) = tokio::join!(orchestrator.run_turn(&game_id), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            orchestrator.run_turn(&game_id).await
        });

        assert_eq!(second.unwrap(), TurnOutcome::AlreadyExecuting);
        assert_eq!(first.unwrap(), TurnOutcome::EndedTurn);
    }

    #[test]
    fn render_action_prompt_includes_available_actions_and_failures() {
        let ctx = TurnContext {
            game_id: GameId::new("G1"),
            state: serde_json::from_value(base_state("G1", "me")).unwrap(),
            available_actions: duel_types::AvailableActions::default(),
            history: vec![],
            failed_actions: vec![FailedAction { action: "attack".into(), reason: "not legal".into() }],
            hand_summary: "hand".into(),
            board_summary: "board".into(),
            strategy_summary: "strategy".into(),
        };
        let prompt = render_action_prompt(&ctx, &[CanonicalAction::EndTurn]);
        assert!(prompt.contains("AVAILABLE ACTIONS: end_turn"));
        assert!(prompt.contains("attack (not legal)"));
    }

    #[test]
    fn phase_label_matches_server_spelling() {
        assert_eq!(phase_label(&Phase::Main1), "main1");
        assert_eq!(phase_label(&Phase::Other("end_phase".into())), "end_phase");
    }
}
