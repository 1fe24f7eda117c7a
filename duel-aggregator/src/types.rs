//! Read-model types returned by the aggregator's public methods.

use duel_types::{AgentId, GameId};
use serde::Serialize;

/// Composed view of `get_agent_status` (spec.md §4.8).
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    /// The agent this status belongs to.
    pub agent_id: AgentId,
    /// Whether the game-state loop is currently attached to a game.
    pub is_polling_game: bool,
    /// The game currently being polled, if any.
    pub current_game_id: Option<GameId>,
    /// Whether the discovery loop is running.
    pub discovery_running: bool,
    /// Whether the matchmaking loop is running.
    pub matchmaking_running: bool,
    /// Whether the orchestrator is mid-turn for this agent.
    pub is_executing_turn: bool,
}

/// Where `get_metrics` sourced its counters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsSource {
    /// The remote agent-profile endpoint answered.
    External,
    /// The remote source was unavailable; counters are local.
    MatchmakingCounters,
}

/// Composed view of `get_metrics` (spec.md §4.8).
#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    /// Lobbies joined by the matchmaking loop.
    pub lobbies_joined: u64,
    /// Games started via matchmaking.
    pub games_started: u64,
    /// Which source the counters came from.
    pub source: MetricsSource,
    /// The raw external profile payload, when `source` is `External`.
    pub profile: Option<serde_json::Value>,
}
