//! Wires every crate into one running agent: client, breakers, decision
//! source, turn orchestrator, polling engine, and state aggregator.

use crate::config::Config;
use crate::error::AgentError;
use duel_aggregator::{AggregatorConfig, PollingView, StateAggregator};
use duel_client::{ClientError, GameApiClient};
use duel_decision::HttpDecisionSource;
use duel_events::{GameWebhookPayload, IdempotencyLedger, PushError, PushOutcome};
use duel_polling::{PollingConfig, PollingEngine};
use duel_resilience::{BreakerConfig, CircuitBreakerRegistry};
use duel_turn::{DecisionHistory, TurnConfig, TurnDriver, TurnOrchestrator};
use duel_types::AgentId;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A fully wired runtime instance: one game API client, one circuit
/// breaker registry, one turn orchestrator, one polling engine, and the
/// read-only aggregator over both.
pub struct Agent {
    client: GameApiClient,
    breakers: Arc<CircuitBreakerRegistry>,
    turn_driver: Arc<dyn TurnDriver>,
    polling: Arc<PollingEngine>,
    aggregator: Arc<StateAggregator>,
    webhook_secret: Option<String>,
    push_ledger: IdempotencyLedger,
    shutdown_started: AtomicBool,
}

impl Agent {
    /// Build and start the agent: probe credentials, then start the
    /// discovery/matchmaking/game loops. Per the auth-rejection policy,
    /// a rejected credential probe disables the client and leaves the
    /// service idle rather than retrying.
    pub async fn start(config: Config) -> Result<Self, AgentError> {
        if config.api_key.is_empty() || config.api_url.is_empty() {
            return Err(AgentError::Config("API_KEY and API_URL must both be set"));
        }

        let client = GameApiClient::new(config.api_key.clone()).base_url(config.api_url.clone());

        if let Err(err) = client.get_agent_profile().await {
            if matches!(err, ClientError::Auth(_)) {
                tracing::error!(error = %err, "startup credential probe rejected, leaving service idle");
                return Err(AgentError::AuthRejected);
            }
            tracing::warn!(error = %err, "startup credential probe failed on a non-auth error, continuing");
        }

        let breakers = Arc::new(CircuitBreakerRegistry::new(BreakerConfig::default()));

        let decision_source = HttpDecisionSource::new(config.api_key.clone())
            .base_url(config.app_url.clone().unwrap_or_else(|| config.api_url.clone()))
            .tier(config.model_tier);
        let history = DecisionHistory::new(Some(client.clone()));
        let turn_config = TurnConfig {
            max_model_decisions_per_turn: config.max_model_decisions_per_turn,
            min_model_decision_interval: config.min_model_decision_interval(),
            action_loop_delay: config.action_loop_delay(),
            model_chain_decisions: config.model_chain_decisions,
            ..TurnConfig::default()
        };
        let orchestrator = Arc::new(TurnOrchestrator::new(client.clone(), decision_source, turn_config, history));
        let turn_driver: Arc<dyn TurnDriver> = orchestrator;

        let polling_config = PollingConfig {
            poll_interval: config.poll_interval(),
            discovery_interval: config.discovery_interval(),
            matchmaking_interval: config.matchmaking_interval(),
            adaptive_polling: config.adaptive_polling,
            idle_timeout: config.idle_timeout(),
            idle_multiplier: config.idle_multiplier,
            max_interval_multiplier: config.max_interval_multiplier,
            auto_matchmaking: config.auto_matchmaking,
            preferred_deck_id: config.preferred_deck_id.clone(),
            auto_continue_story_mode: config.auto_continue_story_mode,
            story_requeue_delay: config.story_requeue_delay(),
            story_difficulty: config.story_difficulty.clone(),
        };
        let polling = PollingEngine::new(client.clone(), Arc::clone(&breakers), Arc::clone(&turn_driver), polling_config);
        polling.start_background_loops();

        let aggregator_config = AggregatorConfig {
            game_state_ttl: config.cache_ttl_game_state(),
            matchmaking_ttl: config.cache_ttl_matchmaking(),
            metrics_ttl: config.cache_ttl_metrics(),
        };
        let agent_id = config.agent_id.clone().unwrap_or_else(|| AgentId::new("agent"));
        let aggregator = Arc::new(StateAggregator::new(
            agent_id,
            Some(Arc::clone(&polling) as Arc<dyn PollingView>),
            Some(Arc::clone(&turn_driver)),
            aggregator_config,
        ));

        Ok(Self {
            client,
            breakers,
            turn_driver,
            polling,
            aggregator,
            webhook_secret: config.webhook_secret,
            push_ledger: IdempotencyLedger::new(),
            shutdown_started: AtomicBool::new(false),
        })
    }

    /// Read-only state projection, for anything that embeds this agent
    /// rather than running it standalone.
    pub fn aggregator(&self) -> &Arc<StateAggregator> {
        &self.aggregator
    }

    /// The polling engine, for the same reason.
    pub fn polling(&self) -> &Arc<PollingEngine> {
        &self.polling
    }

    /// Validate one server-pushed event against the configured webhook
    /// secret (if any) and the idempotency ledger. This crate exposes no
    /// HTTP route; a hypothetical webhook handler would call this with
    /// the parsed payload and the exact raw body the signature covers.
    pub async fn validate_push_event(
        &self,
        payload: &GameWebhookPayload,
        raw_body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<PushOutcome, PushError> {
        duel_events::validate_push_event(payload, raw_body, self.webhook_secret.as_deref(), &self.push_ledger, now)
            .await
    }

    /// Run cleanup in the documented order and mark the agent as shut
    /// down. Idempotent: a second call is a no-op.
    pub async fn shutdown(&self) {
        if self.shutdown_started.swap(true, Ordering::SeqCst) {
            return;
        }
        crate::lifecycle::run(&self.client, &self.polling, &self.breakers, &self.turn_driver, &self.aggregator).await;
    }
}
