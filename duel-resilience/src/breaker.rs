//! Per-operation circuit breaker with exponential backoff.
//!
//! Keyed by a caller-chosen operation name (`poll_game_<id>`,
//! `check_lobbies`, `join_lobby_<id>`) so a single doomed game can't
//! suppress unrelated traffic.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Tunables for a [`CircuitBreakerRegistry`]. Defaults match the
/// documented production defaults.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures in `closed` before tripping to `open`.
    pub failure_threshold: u32,
    /// How long `open` waits before allowing a probe call.
    pub reset_window: Duration,
    /// Initial retry delay after the first failure.
    pub base_delay: Duration,
    /// Ceiling for the retry delay.
    pub max_delay: Duration,
    /// Consecutive successes in `half_open` required to close.
    pub half_open_successes: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_window: Duration::from_secs(60),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            half_open_successes: 3,
        }
    }
}

/// Per-operation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through.
    Closed,
    /// Calls are short-circuited.
    Open,
    /// A single probe call is permitted.
    HalfOpen,
}

#[derive(Debug)]
struct Breaker {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_time: Option<Instant>,
}

impl Default for Breaker {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            last_failure_time: None,
        }
    }
}

/// Registry of circuit breakers, one per operation name, plus the
/// parallel next-retry-delay map.
///
/// Mutations for a given operation name are not safe across concurrent
/// ticks of that same name; callers (the polling loops) guarantee at
/// most one tick per loop in flight, and different loops use distinct
/// name prefixes so they never collide.
pub struct CircuitBreakerRegistry {
    config: BreakerConfig,
    breakers: Mutex<HashMap<String, Breaker>>,
    retry_delays: Mutex<HashMap<String, Duration>>,
}

impl CircuitBreakerRegistry {
    /// Build a registry with the given tunables.
    #[must_use]
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            breakers: Mutex::new(HashMap::new()),
            retry_delays: Mutex::new(HashMap::new()),
        }
    }

    /// Run `op` through the named breaker, returning `None` when the
    /// circuit is open or the operation failed.
    ///
    /// `silent` suppresses the routine per-call warning log (used by
    /// the hot game-state poll so an open breaker doesn't spam logs).
    /// `on_error`, when present, fires with the error before the
    /// breaker records the failure — used to detect a not-found error
    /// for terminal cleanup before it's folded into failure counting.
    pub async fn execute_with_recovery<F, Fut, T, E, OnErr>(
        &self,
        op_name: &str,
        silent: bool,
        on_error: Option<OnErr>,
        op: F,
    ) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        OnErr: FnOnce(&E),
    {
        if self.is_blocked(op_name).await {
            if !silent {
                tracing::debug!(op = op_name, "circuit open, skipping call");
            }
            return None;
        }

        match op().await {
            Ok(value) => {
                self.record_success(op_name).await;
                Some(value)
            }
            Err(err) => {
                if let Some(cb) = on_error {
                    cb(&err);
                }
                self.record_failure(op_name).await;
                None
            }
        }
    }

    async fn is_blocked(&self, op_name: &str) -> bool {
        let mut breakers = self.breakers.lock().await;
        let breaker = breakers.entry(op_name.to_string()).or_default();
        match breaker.state {
            CircuitState::Closed => false,
            CircuitState::HalfOpen => false,
            CircuitState::Open => {
                let elapsed = breaker
                    .last_failure_time
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::MAX);
                if elapsed >= self.config.reset_window {
                    breaker.state = CircuitState::HalfOpen;
                    false
                } else {
                    true
                }
            }
        }
    }

    async fn record_success(&self, op_name: &str) {
        let mut breakers = self.breakers.lock().await;
        let breaker = breakers.entry(op_name.to_string()).or_default();
        match breaker.state {
            CircuitState::Closed => {
                breaker.failure_count = 0;
            }
            CircuitState::HalfOpen => {
                breaker.success_count += 1;
                if breaker.success_count >= self.config.half_open_successes {
                    breaker.state = CircuitState::Closed;
                    breaker.failure_count = 0;
                    breaker.success_count = 0;
                }
            }
            CircuitState::Open => {}
        }
        drop(breakers);
        self.retry_delays.lock().await.remove(op_name);
    }

    async fn record_failure(&self, op_name: &str) {
        let mut breakers = self.breakers.lock().await;
        let breaker = breakers.entry(op_name.to_string()).or_default();
        breaker.last_failure_time = Some(Instant::now());
        match breaker.state {
            CircuitState::Closed => {
                breaker.failure_count += 1;
                if breaker.failure_count >= self.config.failure_threshold {
                    breaker.state = CircuitState::Open;
                }
            }
            CircuitState::HalfOpen => {
                breaker.state = CircuitState::Open;
                breaker.success_count = 0;
            }
            CircuitState::Open => {}
        }
        drop(breakers);

        let mut delays = self.retry_delays.lock().await;
        let next = match delays.get(op_name) {
            None => self.config.base_delay,
            Some(prev) => {
                let jitter = Duration::from_millis(rand::random::<u64>() % 500);
                (*prev * 2 + jitter).min(self.config.max_delay)
            }
        };
        delays.insert(op_name.to_string(), next);
    }

    /// Current state of one operation's breaker, `closed` if never seen.
    pub async fn state(&self, op_name: &str) -> CircuitState {
        self.breakers
            .lock()
            .await
            .get(op_name)
            .map(|b| b.state)
            .unwrap_or(CircuitState::Closed)
    }

    /// Whether any known breaker is currently open.
    pub async fn any_open(&self) -> bool {
        self.breakers
            .lock()
            .await
            .values()
            .any(|b| b.state == CircuitState::Open)
    }

    /// Drop one operation's breaker and retry delay entirely (used when
    /// a game stops being polled).
    pub async fn clear(&self, op_name: &str) {
        self.breakers.lock().await.remove(op_name);
        self.retry_delays.lock().await.remove(op_name);
    }

    /// Drop every breaker and retry delay (shutdown).
    pub async fn clear_all(&self) {
        self.breakers.lock().await.clear();
        self.retry_delays.lock().await.clear();
    }
}
