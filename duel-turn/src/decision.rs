//! The action a decision-policy tier chose, before legality enforcement.

use duel_types::{CanonicalAction, DecisionSourceKind};

/// One candidate action, not yet passed through `ensure_legal`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionChoice {
    /// The canonical action.
    pub action: CanonicalAction,
    /// Rationale, possibly rewritten by `ensure_legal`.
    pub reasoning: String,
    /// Parameters to translate into API-client arguments.
    pub parameters: serde_json::Value,
    /// Which tier produced this choice.
    pub source: DecisionSourceKind,
}

impl ActionChoice {
    /// Build a choice with no parameters.
    pub fn new(action: CanonicalAction, reasoning: impl Into<String>, source: DecisionSourceKind) -> Self {
        Self {
            action,
            reasoning: reasoning.into(),
            parameters: serde_json::json!({}),
            source,
        }
    }

    /// Build a choice carrying a parameter object.
    pub fn with_parameters(
        action: CanonicalAction,
        reasoning: impl Into<String>,
        source: DecisionSourceKind,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            action,
            reasoning: reasoning.into(),
            parameters,
            source,
        }
    }
}
