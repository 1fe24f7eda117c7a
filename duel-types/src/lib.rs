#![deny(missing_docs)]
//! Shared data model for the duel-agent runtime.
//!
//! Every type here is a plain projection of remote server state or of
//! agent-internal bookkeeping — no behavior lives here beyond small,
//! pure accessors. Components that own mutable state (the circuit
//! breaker registry, the decision history ring, the aggregator caches)
//! define their own structs in their owning crate and reuse these types
//! as the values they store.

pub mod action;
pub mod decision;
pub mod id;
pub mod matchmaking;
pub mod snapshot;
pub mod state;

pub use action::CanonicalAction;
pub use decision::{Decision, DecisionResult, DecisionSourceKind};
pub use id::{AgentId, CardId, DeckId, GameId, LobbyId, PlayerId};
pub use matchmaking::{MatchmakingEntry, MatchmakingHistory, MATCHMAKING_HISTORY_CAP};
pub use snapshot::{GameSnapshot, GameStatus, Phase};
pub use state::{
    ActionDescriptor, AvailableActions, BoardCard, CardInHand, ChainState, EndInfo,
    GameStateFull, Position, Winner,
};
