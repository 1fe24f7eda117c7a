//! Error classification for the API client.
//!
//! The client does not retry or back off — it classifies the failure and
//! hands it to the caller, which is `duel-resilience`'s job.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static NOT_FOUND_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)game[_\s-]?not[_\s-]?found").expect("valid regex"));

/// Errors the API client can raise. The caller (circuit breaker, turn
/// orchestrator) classifies and reacts; this crate only distinguishes.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ClientError {
    /// Credentials were rejected by the server.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The game resource is gone. Message matched
    /// `/game[_\s-]?not[_\s-]?found/i`.
    #[error("game not found: {0}")]
    NotFound(String),

    /// Any other HTTP/IO/serialization failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Classify an HTTP status + response body into a `ClientError`.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return ClientError::Auth(body.to_string());
        }
        if NOT_FOUND_PATTERN.is_match(body) {
            return ClientError::NotFound(body.to_string());
        }
        ClientError::Transport(format!("HTTP {status}: {body}"))
    }

    /// Whether this error indicates the game resource has vanished.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unauthorized_as_auth() {
        let err = ClientError::from_response(reqwest::StatusCode::UNAUTHORIZED, "bad key");
        assert!(matches!(err, ClientError::Auth(_)));
    }

    #[test]
    fn classifies_not_found_message_variants() {
        for msg in [
            "Game not found",
            "game_not_found",
            "GAME-NOT-FOUND",
            "error: game not  found somehow",
        ] {
            let err = ClientError::from_response(reqwest::StatusCode::BAD_REQUEST, msg);
            assert!(err.is_not_found(), "expected not-found for {msg:?}");
        }
    }

    #[test]
    fn classifies_other_as_transport() {
        let err = ClientError::from_response(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
