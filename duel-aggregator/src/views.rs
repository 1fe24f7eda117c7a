//! Typed interface registry the aggregator looks up its collaborators
//! through, so it never owns the polling engine or orchestrator
//! directly (spec.md §9 "Circular service references").

use async_trait::async_trait;
use duel_client::GameApiClient;
use duel_polling::{PollingEngine, PollingStatus};
use duel_types::{GameStateFull, MatchmakingHistory};

/// The read surface the aggregator needs from the polling engine.
#[async_trait]
pub trait PollingView: Send + Sync {
    /// Current polling flags.
    async fn status(&self) -> PollingStatus;
    /// Matchmaking attempt history.
    async fn matchmaking_history(&self) -> MatchmakingHistory;
    /// The most recently observed state of whichever game is currently
    /// being polled, if any.
    async fn last_known_state(&self) -> Option<GameStateFull>;
    /// A cheap clone of the API client, for cache-miss fetches.
    fn client(&self) -> GameApiClient;
}

#[async_trait]
impl PollingView for PollingEngine {
    async fn status(&self) -> PollingStatus {
        PollingEngine::status(self).await
    }

    async fn matchmaking_history(&self) -> MatchmakingHistory {
        PollingEngine::matchmaking_history(self).await
    }

    async fn last_known_state(&self) -> Option<GameStateFull> {
        PollingEngine::last_known_state(self).await
    }

    fn client(&self) -> GameApiClient {
        PollingEngine::client(self).clone()
    }
}
