use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use parking_lot::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls flow normally
    Closed,
    /// Too many consecutive failures; calls are refused until the cool-down ends
    Open,
    /// Cool-down elapsed; the next call is a probe
    HalfOpen,
}

/// Per-collaborator circuit breaker. Fails fast while a backend keeps erroring
/// so hint requests degrade to their fallback instead of waiting on timeouts.
#[derive(Clone)]
pub struct CircuitBreaker {
    failures: Arc<AtomicU64>,
    opened_at: Arc<RwLock<Option<Instant>>>,
    cool_down: Duration,
    failure_threshold: u64,
}

impl CircuitBreaker {
    pub fn new(cool_down: Duration, failure_threshold: u64) -> Self {
        CircuitBreaker {
            failures: Arc::new(AtomicU64::new(0)),
            opened_at: Arc::new(RwLock::new(None)),
            cool_down,
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn state(&self) -> BreakerState {
        match *self.opened_at.read() {
            None => BreakerState::Closed,
            Some(at) if at.elapsed() >= self.cool_down => BreakerState::HalfOpen,
            Some(_) => BreakerState::Open,
        }
    }

    /// Whether a call may be attempted right now
    pub fn allow_request(&self) -> bool {
        self.state() != BreakerState::Open
    }

    pub fn record_success(&self) {
        self.failures.store(0, Ordering::Relaxed);
        *self.opened_at.write() = None;
    }

    pub fn record_failure(&self) {
        let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        let mut opened_at = self.opened_at.write();

        // A failed half-open probe re-opens for a fresh cool-down.
        if failures >= self.failure_threshold || opened_at.is_some() {
            *opened_at = Some(Instant::now());
        }
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), 3)
    }
}

/// Exponential backoff calculator
pub struct ExponentialBackoff {
    initial_delay_ms: u64,
    max_delay_ms: u64,
    multiplier: f64,
}

impl ExponentialBackoff {
    pub fn new(initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        ExponentialBackoff {
            initial_delay_ms,
            max_delay_ms,
            multiplier: 2.0,
        }
    }

    /// Delay for attempt number (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = (self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32)) as u64;
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(250, 4000)
    }
}
