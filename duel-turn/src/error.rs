//! Errors the orchestrator raises.
//!
//! Most per-action failures (illegal action, parse error, budget
//! exhaustion) are absorbed into a `Decision{result: failed}` and never
//! reach this type — it exists for failures that prevent the loop from
//! proceeding at all, namely losing the ability to read game state.

use thiserror::Error;

/// Fatal orchestrator errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TurnError {
    /// The API client failed while gathering context or executing an
    /// action in a way that isn't recoverable within this iteration.
    #[error(transparent)]
    Client(#[from] duel_client::ClientError),
}
