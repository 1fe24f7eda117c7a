//! The object-safe boundary `duel-polling` depends on.
//!
//! `TurnOrchestrator<D: DecisionSource>` can't be used as `dyn` because
//! `DecisionSource::decide` is RPITIT. `TurnDriver` is the same
//! capability behind `async_trait`, so a polling loop can hold
//! `Arc<dyn TurnDriver>` without knowing or depending on the concrete
//! decision source — the same "typed interface registry, lazy lookup"
//! discipline the orchestrator/aggregator/polling triangle uses
//! throughout.

use crate::error::TurnError;
use crate::orchestrator::TurnOutcome;
use async_trait::async_trait;
use duel_decision::DecisionSource;
use duel_types::{Decision, GameId};

/// Object-safe facade over a [`crate::TurnOrchestrator`].
#[async_trait]
pub trait TurnDriver: Send + Sync {
    /// Run the bounded action loop for one game until it yields.
    async fn run_turn(&self, game_id: &GameId) -> Result<TurnOutcome, TurnError>;

    /// Respond to an open chain for one game.
    async fn respond_to_chain(&self, game_id: &GameId) -> Result<(), TurnError>;

    /// Whether a turn is currently being executed.
    fn is_executing(&self) -> bool;

    /// Most recent `limit` decisions for a game (read path for the
    /// state aggregator).
    async fn decision_history(&self, game_id: &GameId, limit: usize) -> Vec<Decision>;

    /// Drop every game's recorded decisions (shutdown).
    async fn clear_decision_history(&self);
}

#[async_trait]
impl<D: DecisionSource + Send + Sync> TurnDriver for crate::TurnOrchestrator<D> {
    async fn run_turn(&self, game_id: &GameId) -> Result<TurnOutcome, TurnError> {
        crate::TurnOrchestrator::run_turn(self, game_id).await
    }

    async fn respond_to_chain(&self, game_id: &GameId) -> Result<(), TurnError> {
        crate::TurnOrchestrator::respond_to_chain(self, game_id).await
    }

    fn is_executing(&self) -> bool {
        crate::TurnOrchestrator::is_executing(self)
    }

    async fn decision_history(&self, game_id: &GameId, limit: usize) -> Vec<Decision> {
        self.history().get(game_id, limit).await
    }

    async fn clear_decision_history(&self) {
        self.history().clear().await;
    }
}
