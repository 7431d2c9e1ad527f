use serde::{de::DeserializeOwned, Serialize};
use tokio::time::Instant;

use crate::circuit_breaker::ExponentialBackoff;
use crate::config::settings::ModelConfig;
use crate::error::SageError;
use crate::logging::log_fallback;
use crate::models::availability::ensure_model_available;
use crate::models::LocalModel;
use crate::pipelines::perf;
use crate::state::app::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    Hint,
    Assessment,
    Summary,
    Complexity,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [
        TaskType::Hint,
        TaskType::Assessment,
        TaskType::Summary,
        TaskType::Complexity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Hint => "hint",
            TaskType::Assessment => "assessment",
            TaskType::Summary => "summary",
            TaskType::Complexity => "complexity",
        }
    }

    /// Hints depend on the live conversation and must never be replayed.
    pub fn cacheable(&self) -> bool {
        !matches!(self, TaskType::Hint)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub selected: String,
    pub fallback: Option<String>,
    pub task: TaskType,
}

#[derive(Debug, Default, Clone)]
pub struct RoutingMetrics {
    pub success_count: u64,
    pub failure_count: u64,
    pub total_latency_ms: u64,
}

/// Route a task to its configured model. No I/O.
pub fn model_for_task(models: &ModelConfig, task: TaskType) -> RouteDecision {
    let primary = match task {
        TaskType::Hint => &models.hint_model,
        TaskType::Assessment => &models.assessment_model,
        TaskType::Summary => &models.summary_model,
        TaskType::Complexity => &models.analysis_model,
    };

    let fallback = if models.fallback_model.is_empty() || &models.fallback_model == primary {
        None
    } else {
        Some(models.fallback_model.clone())
    };

    RouteDecision {
        selected: primary.clone(),
        fallback,
        task,
    }
}

/// Unified query with circuit breaking, retry, model fallback and caching
pub async fn sage_query<T: DeserializeOwned + Serialize>(
    state: &AppState,
    task: TaskType,
    prompt: String,
) -> Result<T, SageError> {
    let _perf = perf::PerfTimer::stage("sage_query");
    let decision = model_for_task(&state.config.models, task);

    tracing::debug!(task = task.as_str(), model = %decision.selected, "Routing decision");

    if task.cacheable() {
        if let Some(cached) = state.response_cache.get::<T>(&decision.selected, &prompt) {
            state.metrics.record_cache_hit();
            return Ok(cached);
        }
    }

    let breaker = state.breaker(task);
    if !breaker.allow_request() {
        tracing::warn!(task = task.as_str(), "Circuit open, refusing call");
        return Err(SageError::new(
            format!("{} service is temporarily unavailable", task.as_str()),
            "circuit_open",
        ));
    }

    let outcome = match try_model_with_retry::<T>(state, &decision.selected, &prompt).await {
        Ok(result) => Ok((decision.selected.clone(), result)),
        Err(primary_err) => match decision.fallback.as_deref() {
            Some(fallback) if ensure_model_available(fallback).await.is_ok() => {
                log_fallback(task.as_str(), &decision.selected, fallback);
                try_model_with_retry::<T>(state, fallback, &prompt)
                    .await
                    .map(|result| (fallback.to_string(), result))
            }
            _ => Err(primary_err),
        },
    };

    match outcome {
        Ok((model, result)) => {
            breaker.record_success();
            if task.cacheable() {
                if let Err(e) = state.response_cache.put(&model, &prompt, &result) {
                    tracing::warn!(error = %e, "Failed to cache response");
                }
            }
            Ok(result)
        }
        Err(e) => {
            breaker.record_failure();
            Err(e)
        }
    }
}

fn retries_exhausted(model_name: &str, attempts: u32, cause: &anyhow::Error) -> SageError {
    SageError::new(
        format!("Model '{}' failed after {} attempts: {}", model_name, attempts, cause),
        "model_call",
    )
    .with_model(model_name)
    .with_retry(false)
}

/// Try a model with exponential backoff retry
async fn try_model_with_retry<T: DeserializeOwned>(
    state: &AppState,
    model_name: &str,
    prompt: &str,
) -> Result<T, SageError> {
    let model = LocalModel::new(model_name);
    let backoff = ExponentialBackoff::default();
    let max_retries = state.config.ollama.max_retries;

    let mut attempt = 0;
    loop {
        let attempt_start = Instant::now();
        match model.call_json::<T>(prompt).await {
            Ok(result) => {
                let latency_ms = attempt_start.elapsed().as_millis() as u64;
                tracing::info!(
                    model = model_name,
                    latency_ms = latency_ms,
                    attempt = attempt,
                    "Model call succeeded"
                );
                state.metrics.record_model_latency(latency_ms);
                state.record_routing_success(latency_ms);
                return Ok(result);
            }
            Err(e) if attempt < max_retries => {
                let delay = backoff.delay_for_attempt(attempt);
                tracing::warn!(
                    model = model_name,
                    error = %e,
                    attempt = attempt + 1,
                    max_attempts = max_retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Model call failed, retrying with backoff"
                );
                state.record_routing_failure();
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(
                    model = model_name,
                    error = %e,
                    attempts = max_retries + 1,
                    "Model call failed after all retries"
                );
                state.record_routing_failure();
                return Err(retries_exhausted(model_name, max_retries + 1, &e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_picks_configured_model() {
        let models = ModelConfig::default();
        let decision = model_for_task(&models, TaskType::Assessment);
        assert_eq!(decision.selected, models.assessment_model);
        assert_eq!(decision.fallback.as_deref(), Some(models.fallback_model.as_str()));
        assert_eq!(decision.task, TaskType::Assessment);
    }

    #[test]
    fn test_no_fallback_to_self() {
        let models = ModelConfig {
            fallback_model: "qwen2.5:7b-instruct".to_string(),
            ..ModelConfig::default()
        };
        assert_eq!(model_for_task(&models, TaskType::Hint).fallback, None);
        assert!(model_for_task(&models, TaskType::Complexity).fallback.is_some());
    }

    #[test]
    fn test_exhausted_retries_are_not_marked_recovered() {
        let err = retries_exhausted("qwen2.5-coder:7b", 3, &anyhow::anyhow!("connection refused"));
        assert!(!err.retry_succeeded);
        assert_eq!(err.model.as_deref(), Some("qwen2.5-coder:7b"));
        assert_eq!(err.stage, "model_call");
        assert!(err.message.contains("after 3 attempts: connection refused"));
    }

    #[test]
    fn test_hints_are_never_cached() {
        assert!(!TaskType::Hint.cacheable());
        assert!(TaskType::Assessment.cacheable());
        assert!(TaskType::Summary.cacheable());
    }
}
