#![deny(missing_docs)]
//! Typed HTTP boundary to the remote trading-card-game API.
//!
//! This crate owns exactly one concern: turning the wire protocol into
//! typed Rust values and classifying failures. It has no opinion about
//! retries, polling cadence, or decision-making — those live in
//! `duel-resilience`, `duel-polling`, and `duel-turn` respectively.

mod client;
mod error;
mod types;

pub use client::GameApiClient;
pub use error::ClientError;
pub use types::{
    dedup_card_ids, ActionParams, ChainResponseRequest, DeckEntry, JoinLobbyResponse, LobbyEntry,
    PendingTurn, RawActionDescriptor, RawAvailableActionsResponse, SaveDecisionRequest,
};
