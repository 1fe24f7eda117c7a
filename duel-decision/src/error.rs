//! Errors from the external decision source.

use thiserror::Error;

/// Errors the decision source collaborator can raise.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DecisionSourceError {
    /// HTTP or network request failed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The source rate-limited the request.
    #[error("rate limited")]
    RateLimited,

    /// Authentication/authorization failed.
    #[error("auth failed: {0}")]
    AuthFailed(String),

    /// The response body wasn't parseable as expected.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl DecisionSourceError {
    /// Whether retrying this request might succeed. Mirrors the
    /// retryable/non-retryable split a circuit breaker cares about.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DecisionSourceError::RateLimited | DecisionSourceError::RequestFailed(_)
        )
    }
}
