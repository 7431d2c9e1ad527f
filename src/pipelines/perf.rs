use std::time::Instant;

use crate::pipelines::router::TaskType;

/// Wall-clock timing of one pipeline stage, logged at debug level on drop.
pub struct PerfTimer {
    stage: &'static str,
    task: Option<TaskType>,
    start: Instant,
}

impl PerfTimer {
    pub fn stage(stage: &'static str) -> Self {
        PerfTimer {
            stage,
            task: None,
            start: Instant::now(),
        }
    }

    /// Timer covering a whole collaborator call (prompt, routing, parse).
    pub fn task(task: TaskType) -> Self {
        PerfTimer {
            stage: "collaborator_call",
            task: Some(task),
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        match self.task {
            Some(task) => tracing::debug!(stage = self.stage, task = task.as_str(), duration_ms = self.elapsed_ms(), "Perf"),
            None => tracing::debug!(stage = self.stage, duration_ms = self.elapsed_ms(), "Perf"),
        }
    }
}

/// Run a synchronous step and log how long it took against `model`.
pub fn timed<T>(stage: &'static str, model: &str, step: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = step();
    tracing::debug!(stage = stage, model = model, duration_ms = start.elapsed().as_millis() as u64, "Perf");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_step_output() {
        assert_eq!(timed("parse", "qwen2.5-coder:7b", || 2 + 2), 4);
    }

    #[test]
    fn test_timer_starts_near_zero() {
        let timer = PerfTimer::task(TaskType::Hint);
        assert!(timer.elapsed_ms() < 1_000);
    }
}
