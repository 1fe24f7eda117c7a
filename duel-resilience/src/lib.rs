#![deny(missing_docs)]
//! Per-operation failure isolation and adaptive polling cadence.
//!
//! Two independent primitives live here: [`CircuitBreakerRegistry`]
//! (failure-count state machine + backoff) and [`AdaptiveScheduler`]
//! (self-rescheduling timer with idle growth). `duel-polling` composes
//! one of each per control loop; neither primitive knows about games,
//! HTTP, or decisions.

mod breaker;
mod scheduler;

pub use breaker::{BreakerConfig, CircuitBreakerRegistry, CircuitState};
pub use scheduler::{AdaptiveScheduler, SchedulerConfig};
