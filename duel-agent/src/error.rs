//! Startup and wiring failures for the agent runtime.

use thiserror::Error;

/// Failure modes for [`crate::Agent::start`].
#[derive(Debug, Error)]
pub enum AgentError {
    /// Required configuration is missing (e.g. no `API_KEY`/`API_URL`).
    #[error("configuration error: {0}")]
    Config(&'static str),

    /// The startup credential probe was rejected by the server. Per the
    /// auth-rejection policy, the caller should leave the service idle
    /// rather than retry.
    #[error("startup credential probe was rejected by the server")]
    AuthRejected,
}
