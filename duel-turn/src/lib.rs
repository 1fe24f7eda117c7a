#![deny(missing_docs)]
//! Bounded turn-orchestration loop: heuristics, the probabilistic
//! decision source, legality enforcement, action execution, and
//! decision history — the agent's action loop (spec.md §4.6, §4.7).

mod config;
mod context;
mod decision;
mod driver;
mod error;
mod execute;
mod heuristic;
mod history;
mod legal;
mod orchestrator;
mod policy;

pub use config::TurnConfig;
pub use context::{gather_context, FailedAction, TurnContext};
pub use decision::ActionChoice;
pub use driver::TurnDriver;
pub use error::TurnError;
pub use execute::{execute_action, ExecuteOutcome};
pub use heuristic::heuristic_decision;
pub use history::{DecisionHistory, DECISION_HISTORY_CAP};
pub use legal::legal_actions;
pub use orchestrator::{TurnOrchestrator, TurnOutcome};
pub use policy::{ensure_legal, fallback_decision, FALLBACK_PRIORITY};
