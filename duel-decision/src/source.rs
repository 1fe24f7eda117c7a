//! The decision-source trait.
//!
//! Like `neuron_turn::provider::Provider`, this trait uses RPITIT and
//! is intentionally NOT object-safe: `TurnOrchestrator<D: DecisionSource>`
//! is generic over it. The object-safe boundary other crates use to
//! avoid depending on a concrete decision source is `duel_turn::TurnDriver`.

use crate::error::DecisionSourceError;
use crate::types::{DecisionRequest, DecisionResponse};
use std::future::Future;

/// A black-box oracle producing free text from a prompt: the external
/// probabilistic decision source ("language model").
pub trait DecisionSource: Send + Sync {
    /// Request one completion.
    fn decide(
        &self,
        request: DecisionRequest,
    ) -> impl Future<Output = Result<DecisionResponse, DecisionSourceError>> + Send;
}
