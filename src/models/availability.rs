use reqwest::Client;
use anyhow::{Result, Context};
use tokio::time::{timeout, Duration};
use std::sync::OnceLock;

use crate::config::settings::get_config;
use crate::error::SageError;

const MODEL_CHECK_TIMEOUT: u64 = 3;

static AVAILABILITY_CLIENT: OnceLock<Client> = OnceLock::new();

fn get_availability_client() -> &'static Client {
    AVAILABILITY_CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(MODEL_CHECK_TIMEOUT))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

#[derive(serde::Deserialize)]
struct TagsResponse {
    models: Vec<TagInfo>,
}

#[derive(serde::Deserialize)]
struct TagInfo {
    name: String,
}

/// Whether `installed` (as listed by `/api/tags`) satisfies a configured model name.
/// A bare name matches any tag of that model.
pub fn tag_matches(installed: &str, model: &str) -> bool {
    installed == model || installed.starts_with(&format!("{}:", model))
}

/// Check if a model is installed in Ollama
pub async fn model_exists_in_ollama(model: &str) -> bool {
    let check_result = timeout(
        Duration::from_secs(MODEL_CHECK_TIMEOUT),
        check_model_availability(model),
    ).await;

    match check_result {
        Ok(Ok(true)) => {
            tracing::debug!(model = model, "Model is available");
            true
        }
        Ok(Ok(false)) => {
            tracing::warn!(model = model, "Model not found");
            false
        }
        Ok(Err(e)) => {
            tracing::warn!(model = model, error = %e, "Error checking model availability");
            false
        }
        Err(_) => {
            tracing::warn!(model = model, timeout_secs = MODEL_CHECK_TIMEOUT, "Timeout checking model availability");
            false
        }
    }
}

async fn check_model_availability(model: &str) -> Result<bool> {
    let response = get_availability_client()
        .get(format!("{}/api/tags", get_config().ollama.base_url))
        .send()
        .await
        .context("Failed to connect to Ollama API")?;

    if !response.status().is_success() {
        return Ok(false);
    }

    let tags: TagsResponse = response.json().await
        .context("Failed to parse Ollama models list")?;

    Ok(tags.models.iter().any(|m| tag_matches(&m.name, model)))
}

/// Fail with a routing error when the model is not installed
pub async fn ensure_model_available(model: &str) -> Result<(), SageError> {
    if model_exists_in_ollama(model).await {
        return Ok(());
    }

    Err(SageError::new(
        format!("Model '{}' is not available in Ollama", model),
        "model_availability",
    ).with_model(model.to_string()))
}
