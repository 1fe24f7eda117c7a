//! Tunables for the three adaptive polling loops (spec.md §4.3, §4.4, §6).

use duel_types::DeckId;
use std::time::Duration;

/// Tunables for [`crate::PollingEngine`]. Defaults match the documented
/// production defaults.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Base interval for the game-state loop.
    pub poll_interval: Duration,
    /// Base interval for the pending-turns discovery loop.
    pub discovery_interval: Duration,
    /// Base interval for the matchmaking loop.
    pub matchmaking_interval: Duration,
    /// Whether any of the three loops grow their interval while idle.
    pub adaptive_polling: bool,
    /// How long without activity before a loop is considered idle.
    pub idle_timeout: Duration,
    /// Target multiplier the interval grows toward while idle.
    pub idle_multiplier: f64,
    /// Hard ceiling on the multiplier.
    pub max_interval_multiplier: f64,
    /// Whether the matchmaking loop is allowed to join lobbies at all.
    pub auto_matchmaking: bool,
    /// Deck id preferred when resolving which deck to queue with.
    pub preferred_deck_id: Option<DeckId>,
    /// Whether a completed story-mode game should be requeued.
    pub auto_continue_story_mode: bool,
    /// Delay before requeuing a story-mode game.
    pub story_requeue_delay: Duration,
    /// Difficulty requested when requeuing a story-mode game.
    pub story_difficulty: String,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1_500),
            discovery_interval: Duration::from_millis(5_000),
            matchmaking_interval: Duration::from_millis(10_000),
            adaptive_polling: true,
            idle_timeout: Duration::from_millis(30_000),
            idle_multiplier: 1.5,
            max_interval_multiplier: 5.0,
            auto_matchmaking: false,
            preferred_deck_id: None,
            auto_continue_story_mode: true,
            story_requeue_delay: Duration::from_millis(2_500),
            story_difficulty: "medium".to_string(),
        }
    }
}

impl PollingConfig {
    /// Build the [`duel_resilience::SchedulerConfig`] for a loop whose
    /// base interval is `base`. When adaptive polling is disabled the
    /// multiplier is pinned at 1 by setting an unreachable idle timeout.
    pub(crate) fn scheduler_config(&self, base: Duration) -> duel_resilience::SchedulerConfig {
        if self.adaptive_polling {
            duel_resilience::SchedulerConfig {
                base_interval: base,
                idle_timeout: self.idle_timeout,
                idle_multiplier: self.idle_multiplier,
                max_multiplier: self.max_interval_multiplier,
            }
        } else {
            duel_resilience::SchedulerConfig {
                base_interval: base,
                idle_timeout: Duration::from_secs(u64::MAX / 2),
                idle_multiplier: 1.0,
                max_multiplier: 1.0,
            }
        }
    }
}
