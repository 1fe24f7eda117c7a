//! The `Decision` record type. The owning ring buffer lives in `duel-turn`;
//! this crate only defines the shape so other crates (persistence,
//! aggregator) can read it without depending on `duel-turn`.

use crate::action::CanonicalAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one attempted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionResult {
    /// The server accepted and executed the action.
    Success,
    /// The action failed (illegal, declined precondition, transport error).
    Failed,
    /// The action was recorded but its outcome is not yet known.
    Pending,
}

/// Which tier of the decision policy produced an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSourceKind {
    /// A deterministic heuristic rule fired.
    Heuristic,
    /// The external probabilistic decision source was called.
    Model,
    /// The deterministic fallback selector ran (model budget exhausted).
    Fallback,
}

/// One recorded decision attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Unique id for this decision (uuid v4).
    pub id: String,
    /// Wall-clock time the decision was made.
    pub timestamp: DateTime<Utc>,
    /// Turn number this decision belongs to.
    pub turn_number: u32,
    /// Phase at decision time.
    pub phase: String,
    /// The canonical action chosen.
    pub action: CanonicalAction,
    /// Free-text rationale, possibly annotated by `ensure_legal`.
    pub reasoning: String,
    /// Parameters passed to the server for this action.
    pub parameters: serde_json::Value,
    /// Execution outcome.
    pub result: DecisionResult,
    /// How long execution took.
    pub execution_time_ms: u64,
    /// Which policy tier produced this decision.
    pub source: DecisionSourceKind,
}
