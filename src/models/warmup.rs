/// Model warm-up to surface missing models before the interview starts
use std::collections::BTreeSet;
use tokio::time::Instant;

use crate::config::settings::ModelConfig;
use crate::models::availability::model_exists_in_ollama;

/// Check every configured model once, in parallel. Returns the missing ones.
pub async fn warmup_models(models: &ModelConfig) -> Vec<String> {
    let start = Instant::now();

    let names: BTreeSet<&str> = [
        models.hint_model.as_str(),
        models.assessment_model.as_str(),
        models.summary_model.as_str(),
        models.analysis_model.as_str(),
    ]
    .into_iter()
    .collect();

    let handles: Vec<_> = names
        .into_iter()
        .map(|name| {
            let name = name.to_string();
            tokio::spawn(async move {
                let exists = model_exists_in_ollama(&name).await;
                (name, exists)
            })
        })
        .collect();

    let mut missing = Vec::new();
    for handle in handles {
        match handle.await {
            Ok((name, false)) => missing.push(name),
            Ok((_, true)) => {}
            Err(e) => tracing::warn!(error = %e, "Warm-up check panicked"),
        }
    }

    let elapsed_ms = start.elapsed().as_millis() as u64;
    if missing.is_empty() {
        tracing::info!(elapsed_ms = elapsed_ms, "All models available");
    } else {
        tracing::warn!(
            elapsed_ms = elapsed_ms,
            missing = ?missing,
            "Some models are unavailable; hints and assessments may fall back"
        );
    }

    missing
}
