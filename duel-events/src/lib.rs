#![deny(missing_docs)]
//! Diff-based domain event derivation, plus validation for the
//! optional server-push alternative path.
//!
//! [`derive_events`] is a pure function over two successive
//! [`duel_types::GameSnapshot`]s; [`validate_push_event`] guards the
//! push path with timestamp freshness, idempotency, and an optional
//! HMAC signature check. Neither owns an HTTP route.

mod derive;
mod event;
mod push;

pub use derive::derive_events;
pub use event::Event;
pub use push::{validate_push_event, GameWebhookPayload, IdempotencyLedger, PushError, PushOutcome};
