//! Shutdown ordering: surrender the active game, notify the streaming
//! session, stop the schedulers, then clear every piece of mutable
//! runtime state. Invoked once by [`crate::Agent::shutdown`].

use duel_aggregator::StateAggregator;
use duel_client::GameApiClient;
use duel_polling::PollingEngine;
use duel_resilience::CircuitBreakerRegistry;
use duel_turn::TurnDriver;
use std::sync::Arc;

/// Run the documented cleanup sequence. Every step is best-effort: a
/// failure is logged and the sequence continues.
pub(crate) async fn run(
    client: &GameApiClient,
    polling: &Arc<PollingEngine>,
    breakers: &Arc<CircuitBreakerRegistry>,
    turn_driver: &Arc<dyn TurnDriver>,
    aggregator: &Arc<StateAggregator>,
) {
    let status = polling.status().await;
    if let Some(game_id) = status.current_game_id {
        if let Err(err) = client.surrender(&game_id).await {
            tracing::warn!(error = %err, game_id = %game_id, "best-effort surrender on shutdown failed");
        }

        let payload = serde_json::json!({
            "event_type": "agent_shutdown",
            "game_id": game_id.to_string(),
        });
        if let Err(err) = client.emit_agent_event(&payload).await {
            tracing::debug!(error = %err, "best-effort shutdown streaming notice failed");
        }
    }

    polling.shutdown().await;
    breakers.clear_all().await;
    turn_driver.clear_decision_history().await;
    aggregator.clear_caches().await;

    tracing::info!("agent shutdown complete");
}
