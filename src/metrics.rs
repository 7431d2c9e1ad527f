use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Interview counters, shared by every controller of the process.
#[derive(Clone, Default)]
pub struct Metrics {
    pub hints_requested: Arc<AtomicU64>,
    /// Requests refused because another hint was in flight or recording was active
    pub hints_dropped: Arc<AtomicU64>,
    /// Hint calls that degraded to the apology message
    pub hint_fallbacks: Arc<AtomicU64>,
    /// Service answers that tried to skip a hint level
    pub hint_level_clamps: Arc<AtomicU64>,
    pub idle_probes: Arc<AtomicU64>,
    pub assessments: Arc<AtomicU64>,
    pub assessment_failures: Arc<AtomicU64>,
    pub sessions_finalized: Arc<AtomicU64>,
    pub model_latency_ms: Arc<AtomicU64>,
    pub cache_hits: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub hints_requested: u64,
    pub hints_dropped: u64,
    pub hint_fallbacks: u64,
    pub hint_level_clamps: u64,
    pub idle_probes: u64,
    pub assessments: u64,
    pub assessment_failures: u64,
    pub sessions_finalized: u64,
    pub model_latency_ms: u64,
    pub cache_hits: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hint_requested(&self) {
        bump(&self.hints_requested);
    }

    pub fn record_hint_dropped(&self) {
        bump(&self.hints_dropped);
    }

    pub fn record_hint_fallback(&self) {
        bump(&self.hint_fallbacks);
    }

    pub fn record_level_clamp(&self) {
        bump(&self.hint_level_clamps);
    }

    pub fn record_idle_probe(&self) {
        bump(&self.idle_probes);
    }

    pub fn record_assessment(&self, success: bool) {
        bump(&self.assessments);
        if !success {
            bump(&self.assessment_failures);
        }
    }

    pub fn record_session_finalized(&self) {
        bump(&self.sessions_finalized);
    }

    pub fn record_model_latency(&self, ms: u64) {
        self.model_latency_ms.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        bump(&self.cache_hits);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hints_requested: self.hints_requested.load(Ordering::Relaxed),
            hints_dropped: self.hints_dropped.load(Ordering::Relaxed),
            hint_fallbacks: self.hint_fallbacks.load(Ordering::Relaxed),
            hint_level_clamps: self.hint_level_clamps.load(Ordering::Relaxed),
            idle_probes: self.idle_probes.load(Ordering::Relaxed),
            assessments: self.assessments.load(Ordering::Relaxed),
            assessment_failures: self.assessment_failures.load(Ordering::Relaxed),
            sessions_finalized: self.sessions_finalized.load(Ordering::Relaxed),
            model_latency_ms: self.model_latency_ms.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }
}
