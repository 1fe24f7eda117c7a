//! Self-rescheduling adaptive-interval loop primitive.
//!
//! Each polling loop (game/discovery/matchmaking) owns one of these.
//! The interval grows while the loop is idle and snaps back to the
//! base interval the moment [`AdaptiveScheduler::record_activity`] is
//! called.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Tunables for one [`AdaptiveScheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval used while active.
    pub base_interval: Duration,
    /// How long without activity before the loop is considered idle.
    pub idle_timeout: Duration,
    /// Target multiplier the interval grows toward while idle.
    pub idle_multiplier: f64,
    /// Hard ceiling on the multiplier.
    pub max_multiplier: f64,
}

struct AdaptiveState {
    current_multiplier: f64,
    is_idle: bool,
    last_activity_time: Instant,
}

/// A stoppable, self-rescheduling timer whose period adapts to recent
/// activity.
pub struct AdaptiveScheduler {
    config: SchedulerConfig,
    state: Mutex<AdaptiveState>,
    running: Arc<AtomicBool>,
}

impl AdaptiveScheduler {
    /// Build a scheduler, starting active (multiplier 1, not idle).
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(AdaptiveState {
                current_multiplier: 1.0,
                is_idle: false,
                last_activity_time: Instant::now(),
            }),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Reset the loop to fully active: multiplier back to 1, idle
    /// cleared, activity clock restarted.
    pub async fn record_activity(&self) {
        let mut state = self.state.lock().await;
        state.current_multiplier = 1.0;
        state.is_idle = false;
        state.last_activity_time = Instant::now();
    }

    /// Current multiplier, for introspection/tests.
    pub async fn current_multiplier(&self) -> f64 {
        self.state.lock().await.current_multiplier
    }

    /// Whether the loop currently considers itself idle.
    pub async fn is_idle(&self) -> bool {
        self.state.lock().await.is_idle
    }

    async fn advance_and_next_interval(&self) -> Duration {
        let mut state = self.state.lock().await;
        if state.last_activity_time.elapsed() > self.config.idle_timeout {
            state.is_idle = true;
            let step = (self.config.idle_multiplier - 1.0) * 0.1;
            state.current_multiplier = (state.current_multiplier + step).min(self.config.max_multiplier);
        }
        Duration::from_millis((self.config.base_interval.as_millis() as f64 * state.current_multiplier).round() as u64)
    }

    /// Stop the loop cooperatively. The in-flight tick (if any) still
    /// completes; only the next reschedule is suppressed. Idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Whether the loop has been asked to stop.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Spawn the loop on the Tokio runtime: one immediate tick, then
    /// self-rescheduled ticks at the adapted interval until [`stop`] is
    /// called.
    ///
    /// [`stop`]: AdaptiveScheduler::stop
    pub fn spawn<F, Fut>(self: &Arc<Self>, tick: F) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            if !scheduler.is_running() {
                return;
            }
            tick().await;
            loop {
                if !scheduler.is_running() {
                    break;
                }
                let interval = scheduler.advance_and_next_interval().await;
                tokio::time::sleep(interval).await;
                if !scheduler.is_running() {
                    break;
                }
                tick().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            base_interval: Duration::from_millis(100),
            idle_timeout: Duration::from_millis(0),
            idle_multiplier: 1.5,
            max_multiplier: 5.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn record_activity_resets_multiplier() {
        let scheduler = AdaptiveScheduler::new(config());
        let _ = scheduler.advance_and_next_interval().await;
        let _ = scheduler.advance_and_next_interval().await;
        assert!(scheduler.current_multiplier().await > 1.0);

        scheduler.record_activity().await;
        assert_eq!(scheduler.current_multiplier().await, 1.0);
        assert!(!scheduler.is_idle().await);
    }

    #[tokio::test(start_paused = true)]
    async fn multiplier_grows_and_is_capped_at_max() {
        let scheduler = AdaptiveScheduler::new(config());
        let mut last = 1.0;
        for _ in 0..200 {
            let _ = scheduler.advance_and_next_interval().await;
            let current = scheduler.current_multiplier().await;
            assert!(current >= last);
            last = current;
        }
        assert!((scheduler.current_multiplier().await - 5.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_ticks() {
        let scheduler = Arc::new(AdaptiveScheduler::new(SchedulerConfig {
            base_interval: Duration::from_millis(10),
            idle_timeout: Duration::from_secs(30),
            idle_multiplier: 1.5,
            max_multiplier: 5.0,
        }));
        let count = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&count);
        let handle = scheduler.spawn(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::Relaxed), 1, "immediate tick on spawn");

        scheduler.stop();
        tokio::time::advance(Duration::from_secs(5)).await;
        let _ = tokio::time::timeout(Duration::from_millis(50), handle).await;
        assert_eq!(count.load(Ordering::Relaxed), 1, "no tick after stop");
    }
}
