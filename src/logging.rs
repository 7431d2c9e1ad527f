/// Initialize structured logging with tracing.
/// `RUST_LOG` wins over the configured level. Output goes to stderr as JSON so
/// the console driver keeps stdout to itself.
pub fn init_logging(default_level: &str) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr)
                .json(),
        );

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[Logging] subscriber already installed: {}", e);
        return;
    }

    tracing::info!(level = default_level, "Structured logging initialized");
}

pub fn log_model_call(model: &str, stage: &str, success: bool, latency_ms: u64) {
    tracing::info!(
        model = model,
        stage = stage,
        success = success,
        latency_ms = latency_ms,
        "Model call"
    );
}

pub fn log_fallback(task: &str, from: &str, to: &str) {
    tracing::warn!(task = task, from = from, to = to, "Fallback triggered");
}

pub fn log_timeout(model: &str, duration_secs: u64) {
    tracing::error!(model = model, duration_secs = duration_secs, "Timeout exceeded");
}
