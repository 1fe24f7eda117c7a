#![deny(missing_docs)]
//! Umbrella crate: wires every `duel-*` crate into one running agent
//! and owns its configuration and shutdown sequencing.

mod agent;
mod config;
mod error;
mod lifecycle;

pub use agent::Agent;
pub use config::Config;
pub use duel_events::{GameWebhookPayload, PushError, PushOutcome};
pub use error::AgentError;
