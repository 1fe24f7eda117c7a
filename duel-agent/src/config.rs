//! One defaulted struct plus a thin `from_env` reader (spec.md §6's
//! config table). Deliberately minimal: no `clap`, no file-based
//! config loader — full CLI/env frameworks are out of scope.

use duel_decision::ModelTier;
use duel_types::{AgentId, DeckId};
use std::time::Duration;

/// Every recognized configuration key, with its documented default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base game-state poll interval.
    pub poll_interval_ms: u64,
    /// Base pending-turns discovery interval.
    pub discovery_interval_ms: u64,
    /// Base matchmaking interval.
    pub matchmaking_interval_ms: u64,
    /// Whether idle loops grow their interval.
    pub adaptive_polling: bool,
    /// Idle threshold before growth starts.
    pub idle_timeout_ms: u64,
    /// Target multiplier while idle.
    pub idle_multiplier: f64,
    /// Hard ceiling on the multiplier.
    pub max_interval_multiplier: f64,
    /// Whether the matchmaking loop may join lobbies.
    pub auto_matchmaking: bool,
    /// Preferred deck id for matchmaking, if any.
    pub preferred_deck_id: Option<DeckId>,
    /// Sleep between actions in the turn loop.
    pub action_loop_delay_ms: u64,
    /// Minimum spacing between decision-source calls.
    pub min_model_decision_interval_ms: u64,
    /// Decision-source call budget per turn.
    pub max_model_decisions_per_turn: u32,
    /// Which model tier to request.
    pub model_tier: ModelTier,
    /// Whether the decision source may be consulted on chains.
    pub model_chain_decisions: bool,
    /// Whether a completed story-mode game is automatically requeued.
    pub auto_continue_story_mode: bool,
    /// Delay before requeuing a story-mode game.
    pub story_requeue_delay_ms: u64,
    /// Difficulty requested when requeuing.
    pub story_difficulty: String,
    /// TTL for the per-game state cache.
    pub cache_ttl_game_state_ms: u64,
    /// TTL for the matchmaking-status cache.
    pub cache_ttl_matchmaking_ms: u64,
    /// TTL for the metrics cache.
    pub cache_ttl_metrics_ms: u64,
    /// HMAC secret for webhook signature verification, if enabled.
    pub webhook_secret: Option<String>,
    /// Remote game API credential.
    pub api_key: String,
    /// Remote game API base URL.
    pub api_url: String,
    /// This agent's own id, if assigned by the server.
    pub agent_id: Option<AgentId>,
    /// Base URL for the decision source, if it differs from the
    /// default.
    pub app_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_500,
            discovery_interval_ms: 5_000,
            matchmaking_interval_ms: 10_000,
            adaptive_polling: true,
            idle_timeout_ms: 30_000,
            idle_multiplier: 1.5,
            max_interval_multiplier: 5.0,
            auto_matchmaking: false,
            preferred_deck_id: None,
            action_loop_delay_ms: 1_500,
            min_model_decision_interval_ms: 4_000,
            max_model_decisions_per_turn: 2,
            model_tier: ModelTier::Small,
            model_chain_decisions: false,
            auto_continue_story_mode: true,
            story_requeue_delay_ms: 2_500,
            story_difficulty: "medium".to_string(),
            cache_ttl_game_state_ms: 2_000,
            cache_ttl_matchmaking_ms: 5_000,
            cache_ttl_metrics_ms: 10_000,
            webhook_secret: None,
            api_key: String::new(),
            api_url: String::new(),
            agent_id: None,
            app_url: None,
        }
    }
}

impl Config {
    /// Read every recognized key from the process environment,
    /// falling back to the documented default when unset or
    /// unparseable. `API_KEY`/`API_URL` are left empty when unset;
    /// callers should treat an empty `api_key` as "not configured".
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval_ms: env_u64("POLL_INTERVAL_MS", defaults.poll_interval_ms),
            discovery_interval_ms: env_u64("DISCOVERY_INTERVAL_MS", defaults.discovery_interval_ms),
            matchmaking_interval_ms: env_u64("MATCHMAKING_INTERVAL_MS", defaults.matchmaking_interval_ms),
            adaptive_polling: env_bool("ADAPTIVE_POLLING", defaults.adaptive_polling),
            idle_timeout_ms: env_u64("IDLE_TIMEOUT_MS", defaults.idle_timeout_ms),
            idle_multiplier: env_f64("IDLE_MULTIPLIER", defaults.idle_multiplier),
            max_interval_multiplier: env_f64("MAX_INTERVAL_MULTIPLIER", defaults.max_interval_multiplier),
            auto_matchmaking: env_bool("AUTO_MATCHMAKING", defaults.auto_matchmaking),
            preferred_deck_id: env_string("PREFERRED_DECK_ID").map(DeckId::new),
            action_loop_delay_ms: env_u64("ACTION_LOOP_DELAY_MS", defaults.action_loop_delay_ms),
            min_model_decision_interval_ms: env_u64(
                "MIN_MODEL_DECISION_INTERVAL_MS",
                defaults.min_model_decision_interval_ms,
            ),
            max_model_decisions_per_turn: env_u32(
                "MAX_MODEL_DECISIONS_PER_TURN",
                defaults.max_model_decisions_per_turn,
            ),
            model_tier: env_string("MODEL_TIER")
                .and_then(|raw| match raw.as_str() {
                    "large" => Some(ModelTier::Large),
                    "small" => Some(ModelTier::Small),
                    _ => None,
                })
                .unwrap_or(defaults.model_tier),
            model_chain_decisions: env_bool("MODEL_CHAIN_DECISIONS", defaults.model_chain_decisions),
            auto_continue_story_mode: env_bool("AUTO_CONTINUE_STORY_MODE", defaults.auto_continue_story_mode),
            story_requeue_delay_ms: env_u64("STORY_REQUEUE_DELAY_MS", defaults.story_requeue_delay_ms),
            story_difficulty: env_string("STORY_DIFFICULTY").unwrap_or(defaults.story_difficulty),
            cache_ttl_game_state_ms: env_u64("CACHE_TTL_GAME_STATE_MS", defaults.cache_ttl_game_state_ms),
            cache_ttl_matchmaking_ms: env_u64("CACHE_TTL_MATCHMAKING_MS", defaults.cache_ttl_matchmaking_ms),
            cache_ttl_metrics_ms: env_u64("CACHE_TTL_METRICS_MS", defaults.cache_ttl_metrics_ms),
            webhook_secret: env_string("WEBHOOK_SECRET"),
            api_key: env_string("API_KEY").unwrap_or_default(),
            api_url: env_string("API_URL").unwrap_or_default(),
            agent_id: env_string("AGENT_ID").map(AgentId::new),
            app_url: env_string("APP_URL"),
        }
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub(crate) fn discovery_interval(&self) -> Duration {
        Duration::from_millis(self.discovery_interval_ms)
    }

    pub(crate) fn matchmaking_interval(&self) -> Duration {
        Duration::from_millis(self.matchmaking_interval_ms)
    }

    pub(crate) fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub(crate) fn action_loop_delay(&self) -> Duration {
        Duration::from_millis(self.action_loop_delay_ms)
    }

    pub(crate) fn min_model_decision_interval(&self) -> Duration {
        Duration::from_millis(self.min_model_decision_interval_ms)
    }

    pub(crate) fn story_requeue_delay(&self) -> Duration {
        Duration::from_millis(self.story_requeue_delay_ms)
    }

    pub(crate) fn cache_ttl_game_state(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_game_state_ms)
    }

    pub(crate) fn cache_ttl_matchmaking(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_matchmaking_ms)
    }

    pub(crate) fn cache_ttl_metrics(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_metrics_ms)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env_string(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env_string(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    env_string(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    match env_string(name).as_deref() {
        Some("1") | Some("true") | Some("on") | Some("yes") => true,
        Some("0") | Some("false") | Some("off") | Some("no") => false,
        _ => default,
    }
}
