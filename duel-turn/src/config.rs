//! Static tunables for one [`crate::TurnOrchestrator`].

use std::time::Duration;

/// Bounds and timing for the action loop, the model budget, and chain
/// responses. Defaults match the documented production defaults.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Maximum actions executed in one turn before forcing an exit.
    pub action_cap: u32,
    /// Consecutive action failures before forcing `END_TURN`.
    pub consecutive_failure_cap: u32,
    /// Maximum decision-source calls per turn.
    pub max_model_decisions_per_turn: u32,
    /// Minimum spacing between two decision-source calls.
    pub min_model_decision_interval: Duration,
    /// Sleep between actions in the loop.
    pub action_loop_delay: Duration,
    /// Whether the decision source may be consulted for chain responses.
    pub model_chain_decisions: bool,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            action_cap: 16,
            consecutive_failure_cap: 2,
            max_model_decisions_per_turn: 2,
            min_model_decision_interval: Duration::from_millis(4_000),
            action_loop_delay: Duration::from_millis(1_500),
            model_chain_decisions: false,
        }
    }
}
