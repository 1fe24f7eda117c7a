#![deny(missing_docs)]
//! Adaptive polling loops over the remote game API: the game-state
//! loop, opponent-turn discovery, and optional matchmaking, plus the
//! glue that hands derived events to the turn orchestrator (spec.md
//! §4.3, §4.4).

mod config;
mod engine;

pub use config::PollingConfig;
pub use engine::{PollingEngine, PollingStatus};
