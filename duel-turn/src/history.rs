//! Decision history: an in-memory ring per game plus a best-effort
//! persistence hook. Ownership is exclusive to the orchestrator.

use duel_client::GameApiClient;
use duel_types::{Decision, GameId};
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

/// Cap per game (spec.md §3).
pub const DECISION_HISTORY_CAP: usize = 100;

/// Ring buffer of decisions, keyed by game id, with opportunistic
/// persistence through the API client.
pub struct DecisionHistory {
    rings: Mutex<HashMap<GameId, VecDeque<Decision>>>,
    client: Option<GameApiClient>,
}

impl DecisionHistory {
    /// Build a history. `client` is `None` when persistence isn't
    /// configured (e.g. in tests).
    pub fn new(client: Option<GameApiClient>) -> Self {
        Self {
            rings: Mutex::new(HashMap::new()),
            client,
        }
    }

    /// Record a decision: push into the ring (trimming the oldest on
    /// overflow), then fire a best-effort persistence call that never
    /// blocks the caller.
    pub async fn record(&self, game_id: &GameId, decision: Decision) {
        {
            let mut rings = self.rings.lock().await;
            let ring = rings.entry(game_id.clone()).or_default();
            ring.push_back(decision.clone());
            if ring.len() > DECISION_HISTORY_CAP {
                ring.pop_front();
            }
        }

        if let Some(client) = self.client.clone() {
            let game_id = game_id.clone();
            tokio::spawn(async move {
                if let Err(err) = client.save_decision(&game_id, &decision).await {
                    tracing::debug!(error = %err, "best-effort decision persistence failed");
                }
            });
        }
    }

    /// Most recent `limit` entries for a game, in arrival order. Empty
    /// if the game has no recorded decisions.
    pub async fn get(&self, game_id: &GameId, limit: usize) -> Vec<Decision> {
        let rings = self.rings.lock().await;
        match rings.get(game_id) {
            Some(ring) => {
                let skip = ring.len().saturating_sub(limit);
                ring.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Drop every game's history (shutdown).
    pub async fn clear(&self) {
        self.rings.lock().await.clear();
    }
}
