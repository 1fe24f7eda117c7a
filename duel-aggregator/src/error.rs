//! Errors surfaced to callers of the aggregator (spec.md §4.8: "returns
//! null / throws a typed `ServiceUnavailable`, per method").

use thiserror::Error;

/// Failure modes for aggregator reads.
#[derive(Debug, Error)]
pub enum AggregatorError {
    /// The named collaborator was never wired into this aggregator.
    #[error("{0} is not available for this agent")]
    ServiceUnavailable(&'static str),
    /// The underlying API call failed.
    #[error(transparent)]
    Client(#[from] duel_client::ClientError),
}
