//! Wire contract with the external decision source.

use duel_types::CardId;
use serde::{Deserialize, Serialize};

/// Which pretrained tier to request. Affects cost/latency, not the
/// response contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// Cheaper, faster tier — the default.
    Small,
    /// Larger tier, used only if explicitly configured.
    Large,
}

impl ModelTier {
    /// Model identifier string sent to the decision source for this tier.
    pub fn model_name(self) -> &'static str {
        match self {
            ModelTier::Small => "duel-agent-small",
            ModelTier::Large => "duel-agent-large",
        }
    }
}

/// One request to the decision source. The prompt's "AVAILABLE
/// ACTIONS" block is built by the caller and is authoritative; this
/// crate never inspects prompt content.
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    /// Full rendered prompt.
    pub prompt: String,
    /// Optional system/instructions text.
    pub system: Option<String>,
    /// Token budget for the response.
    pub max_tokens: u32,
    /// Sampling temperature. Kept low for determinism.
    pub temperature: f64,
}

impl DecisionRequest {
    /// Build a request with the low-temperature, short-budget defaults
    /// used for action/chain decisions.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: 256,
            temperature: 0.2,
        }
    }
}

/// Raw text returned by the decision source. Parsing into a structured
/// action/chain response is the caller's job (see `parse`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionResponse {
    /// The model's raw completion text.
    pub raw_text: String,
}

/// The decision source's JSON-object contract for a turn decision.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelActionResponse {
    /// Action name, not yet normalized to the canonical set.
    pub action: String,
    /// Free-text rationale.
    #[serde(default)]
    pub reasoning: String,
    /// Action parameters, if any.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// The decision source's JSON-object contract for a chain decision.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelChainResponse {
    /// Whether to respond to the chain (`false` means pass).
    pub chain: bool,
    /// Card to respond with, required when `chain` is `true`.
    #[serde(default)]
    pub card_id: Option<CardId>,
}
