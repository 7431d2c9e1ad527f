use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;

use crate::cache::ResponseCache;
use crate::circuit_breaker::CircuitBreaker;
use crate::config::settings::AppConfig;
use crate::metrics::Metrics;
use crate::pipelines::router::{RoutingMetrics, TaskType};
use crate::problems::problem::Problem;

/// Application-wide state container.
/// Shared handles only; per-interview state lives in the interview controllers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Problem catalog, loaded once at startup
    pub catalog: Arc<Vec<Problem>>,
    pub metrics: Metrics,
    pub response_cache: ResponseCache,
    pub routing_metrics: Arc<RwLock<RoutingMetrics>>,
    breakers: Arc<HashMap<TaskType, CircuitBreaker>>,
}

impl AppState {
    pub fn new(config: AppConfig, catalog: Vec<Problem>) -> Self {
        let breakers = TaskType::ALL
            .iter()
            .map(|task| (*task, CircuitBreaker::default()))
            .collect();

        AppState {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            metrics: Metrics::new(),
            response_cache: ResponseCache::default(),
            routing_metrics: Arc::new(RwLock::new(RoutingMetrics::default())),
            breakers: Arc::new(breakers),
        }
    }

    pub fn breaker(&self, task: TaskType) -> CircuitBreaker {
        self.breakers.get(&task).cloned().unwrap_or_default()
    }

    pub fn get_routing_metrics(&self) -> RoutingMetrics {
        self.routing_metrics.read().clone()
    }

    pub fn record_routing_success(&self, latency_ms: u64) {
        let mut metrics = self.routing_metrics.write();
        metrics.success_count += 1;
        metrics.total_latency_ms += latency_ms;
    }

    pub fn record_routing_failure(&self) {
        self.routing_metrics.write().failure_count += 1;
    }
}
