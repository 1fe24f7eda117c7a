//! The state aggregator itself: a pure reader composed lazily from
//! whichever collaborators were wired in (spec.md §4.8).

use crate::cache::{CacheStats, TtlCache};
use crate::error::AggregatorError;
use crate::types::{AgentStatus, Metrics, MetricsSource};
use crate::views::PollingView;
use duel_turn::TurnDriver;
use duel_types::{AgentId, Decision, GameId, GameStateFull, MatchmakingHistory};
use std::sync::Arc;
use std::time::Duration;

/// TTLs for the three caches (spec.md §3, §6 env vars).
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// TTL for per-game cached state.
    pub game_state_ttl: Duration,
    /// TTL for the matchmaking-status cache.
    pub matchmaking_ttl: Duration,
    /// TTL for the metrics cache.
    pub metrics_ttl: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            game_state_ttl: Duration::from_millis(2_000),
            matchmaking_ttl: Duration::from_millis(5_000),
            metrics_ttl: Duration::from_millis(10_000),
        }
    }
}

/// Read-only projection over the polling engine and turn orchestrator.
/// Never constructs a cycle back to either: both are looked up through
/// a trait object, and absence of either is tolerated per method.
pub struct StateAggregator {
    agent_id: AgentId,
    polling: Option<Arc<dyn PollingView>>,
    history: Option<Arc<dyn TurnDriver>>,
    game_state_cache: TtlCache<GameId, GameStateFull>,
    matchmaking_cache: TtlCache<(), MatchmakingHistory>,
    metrics_cache: TtlCache<(), Metrics>,
}

impl StateAggregator {
    /// Build an aggregator for `agent_id`. Either collaborator may be
    /// `None`, e.g. before the agent has finished starting up.
    pub fn new(
        agent_id: AgentId,
        polling: Option<Arc<dyn PollingView>>,
        history: Option<Arc<dyn TurnDriver>>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            agent_id,
            polling,
            history,
            game_state_cache: TtlCache::new(config.game_state_ttl),
            matchmaking_cache: TtlCache::new(config.matchmaking_ttl),
            metrics_cache: TtlCache::new(config.metrics_ttl),
        }
    }

    /// Composed from polling engine flags and whether a turn is
    /// currently executing.
    pub async fn get_agent_status(&self) -> Result<AgentStatus, AggregatorError> {
        let polling = self.require_polling()?;
        let status = polling.status().await;
        let is_executing_turn = self.history.as_ref().map(|h| h.is_executing()).unwrap_or(false);
        Ok(AgentStatus {
            agent_id: self.agent_id.clone(),
            is_polling_game: status.is_polling_game,
            current_game_id: status.current_game_id,
            discovery_running: status.discovery_running,
            matchmaking_running: status.matchmaking_running,
            is_executing_turn,
        })
    }

    /// Cached (TTL matchmaking).
    pub async fn get_matchmaking_status(&self) -> Result<MatchmakingHistory, AggregatorError> {
        let polling = Arc::clone(self.require_polling()?);
        self.matchmaking_cache
            .get_or_try_insert_with((), move || {
                let polling = Arc::clone(&polling);
                async move { Ok::<_, AggregatorError>(polling.matchmaking_history().await) }
            })
            .await
    }

    /// Cached per game id (TTL game_state); on miss, goes through the
    /// API client obtained from the polling engine.
    pub async fn get_game_state(&self, game_id: &GameId) -> Result<GameStateFull, AggregatorError> {
        let polling = Arc::clone(self.require_polling()?);
        let key = game_id.clone();
        let game_id = game_id.clone();
        self.game_state_cache
            .get_or_try_insert_with(key, move || {
                let client = polling.client();
                async move { client.get_game_state(&game_id).await.map_err(AggregatorError::from) }
            })
            .await
    }

    /// Straight pass-through; empty list if the orchestrator is absent.
    pub async fn get_decision_history(&self, game_id: &GameId, limit: usize) -> Vec<Decision> {
        match &self.history {
            Some(driver) => driver.decision_history(game_id, limit).await,
            None => Vec::new(),
        }
    }

    /// Cached (TTL metrics); attempts to query an external
    /// match-history source, falls back to matchmaking counters.
    pub async fn get_metrics(&self) -> Result<Metrics, AggregatorError> {
        let polling = Arc::clone(self.require_polling()?);
        self.metrics_cache
            .get_or_try_insert_with((), move || {
                let polling = Arc::clone(&polling);
                async move {
                    let history = polling.matchmaking_history().await;
                    match polling.client().get_agent_profile().await {
                        Ok(profile) => Ok::<_, AggregatorError>(Metrics {
                            lobbies_joined: history.lobbies_joined,
                            games_started: history.games_started,
                            source: MetricsSource::External,
                            profile: Some(profile),
                        }),
                        Err(err) => {
                            tracing::debug!(error = %err, "metrics: external source unavailable, falling back to matchmaking counters");
                            Ok(Metrics {
                                lobbies_joined: history.lobbies_joined,
                                games_started: history.games_started,
                                source: MetricsSource::MatchmakingCounters,
                                profile: None,
                            })
                        }
                    }
                }
            })
            .await
    }

    /// Cache hit/miss counters, keyed by cache name, for telemetry.
    pub fn cache_stats(&self) -> [(&'static str, CacheStats); 3] {
        [
            ("game_state", self.game_state_cache.stats()),
            ("matchmaking", self.matchmaking_cache.stats()),
            ("metrics", self.metrics_cache.stats()),
        ]
    }

    /// Drop every cached entry (shutdown).
    pub async fn clear_caches(&self) {
        self.game_state_cache.clear().await;
        self.matchmaking_cache.clear().await;
        self.metrics_cache.clear().await;
    }

    fn require_polling(&self) -> Result<&Arc<dyn PollingView>, AggregatorError> {
        self.polling.as_ref().ok_or(AggregatorError::ServiceUnavailable("polling engine"))
    }
}
