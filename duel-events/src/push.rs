//! Validation for the optional server-push path.
//!
//! This module does not expose an HTTP handler — wiring a
//! `POST /webhook/game` route is outside the scope this runtime
//! covers. It exposes [`validate_push_event`], which a hypothetical
//! HTTP layer would call with the raw body, the parsed payload, and
//! the configured secret.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use duel_types::GameId;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::sync::Mutex;

const FRESHNESS_WINDOW: ChronoDuration = ChronoDuration::minutes(5);
const IDEMPOTENCY_TTL: Duration = Duration::from_secs(10 * 60);

/// A server-pushed game event, as received over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameWebhookPayload {
    /// Event type, matching the same vocabulary `Event` uses.
    pub event_type: String,
    /// Game this event concerns.
    pub game_id: GameId,
    /// Agent this event concerns.
    pub agent_id: String,
    /// When the server produced this event.
    pub timestamp: DateTime<Utc>,
    /// HMAC-SHA256 signature over the raw body, hex-encoded.
    pub signature: Option<String>,
    /// Event payload.
    pub data: serde_json::Value,
}

/// Why a push event was rejected or short-circuited.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError {
    /// Timestamp older than the freshness window or future-dated.
    #[error("event timestamp is stale or not yet valid")]
    ReplayOrStale,
    /// HMAC signature did not match.
    #[error("signature verification failed")]
    BadSignature,
    /// A secret is configured but the payload carried no signature.
    #[error("signature required but missing")]
    MissingSignature,
}

/// Outcome of validating one push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// First time this `(game_id, timestamp, event_type)` key is seen;
    /// the caller should dispatch it.
    Accepted,
    /// Same idempotency key seen within the last 10 minutes; the caller
    /// should acknowledge but not dispatch.
    Duplicate,
}

/// Idempotency ledger for the push path. Sweeps expired keys lazily on
/// insert, the way a passive dispatcher rather than a background task
/// would.
#[derive(Default)]
pub struct IdempotencyLedger {
    seen: Mutex<HashMap<(GameId, i64, String), Instant>>,
}

impl IdempotencyLedger {
    /// Build an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn check_and_record(&self, key: (GameId, i64, String)) -> PushOutcome {
        let mut seen = self.seen.lock().await;
        let now = Instant::now();
        seen.retain(|_, inserted_at| now.duration_since(*inserted_at) < IDEMPOTENCY_TTL);

        if seen.contains_key(&key) {
            return PushOutcome::Duplicate;
        }
        seen.insert(key, now);
        PushOutcome::Accepted
    }
}

/// Validate a push payload: required fields (enforced by the type
/// system at deserialization), timestamp freshness, idempotency, and —
/// when `secret` is set — HMAC-SHA256 signature, constant-time
/// compared.
///
/// `raw_body` is the exact bytes the signature was computed over.
pub async fn validate_push_event(
    payload: &GameWebhookPayload,
    raw_body: &[u8],
    secret: Option<&str>,
    ledger: &IdempotencyLedger,
    now: DateTime<Utc>,
) -> Result<PushOutcome, PushError> {
    if payload.timestamp > now || now - payload.timestamp > FRESHNESS_WINDOW {
        return Err(PushError::ReplayOrStale);
    }

    if let Some(secret) = secret {
        verify_signature(payload.signature.as_deref(), raw_body, secret)?;
    }

    let key = (
        payload.game_id.clone(),
        payload.timestamp.timestamp_millis(),
        payload.event_type.clone(),
    );
    Ok(ledger.check_and_record(key).await)
}

fn verify_signature(signature: Option<&str>, raw_body: &[u8], secret: &str) -> Result<(), PushError> {
    let Some(signature) = signature else {
        return Err(PushError::MissingSignature);
    };
    let provided = hex::decode(signature).map_err(|_| PushError::BadSignature)?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(raw_body);
    let expected = mac.finalize().into_bytes();

    if expected.ct_eq(&provided).into() {
        Ok(())
    } else {
        Err(PushError::BadSignature)
    }
}
