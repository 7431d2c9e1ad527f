use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use anyhow::{Result, Context};
use tokio::time::{timeout, Duration};
use std::sync::OnceLock;

use crate::config::settings::get_config;
use crate::logging::{log_model_call, log_timeout};
use crate::pipelines::ollama_utils;
use crate::pipelines::perf;

/// Reusable HTTP client singleton (created once, reused for all requests)
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

fn get_http_client() -> &'static Client {
    HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build tuned HTTP client, using defaults");
                Client::new()
            })
    })
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

/// Concatenate the `response` fields of a newline-delimited generate stream.
pub fn collect_stream(body: &str) -> String {
    let mut full_response = String::new();
    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(chunk) = serde_json::from_str::<GenerateChunk>(line) {
            full_response.push_str(&chunk.response);
            if chunk.done {
                break;
            }
        }
    }
    full_response
}

/// Call a model and return the raw response text, using the configured timeout
pub async fn call_model(model: &str, prompt: &str) -> Result<String> {
    let config = get_config();
    call_model_with_timeout(model, prompt, Duration::from_secs(config.ollama.timeout_secs)).await
}

pub async fn call_model_with_timeout(
    model: &str,
    prompt: &str,
    timeout_duration: Duration,
) -> Result<String> {
    let _perf = perf::PerfTimer::stage("ollama_call");
    let start = std::time::Instant::now();
    let base_url = &get_config().ollama.base_url;

    let result = timeout(timeout_duration, async {
        let response = get_http_client()
            .post(format!("{}/api/generate", base_url))
            .json(&GenerateRequest { model, prompt, stream: true })
            .send()
            .await
            .with_context(|| format!("Failed to connect to Ollama API for model '{}'", model))?;

        if !response.status().is_success() {
            anyhow::bail!("Ollama returned status {} for model '{}'", response.status(), model);
        }

        let body = response.text().await
            .with_context(|| format!("Failed to read response from model '{}'", model))?;

        let full_response = collect_stream(&body);
        if full_response.is_empty() {
            anyhow::bail!("Model '{}' returned empty response", model);
        }

        Ok(full_response)
    }).await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(response)) => {
            log_model_call(model, "call", true, latency_ms);
            Ok(response)
        }
        Ok(Err(e)) => {
            log_model_call(model, "call", false, latency_ms);
            Err(e)
        }
        Err(_) => {
            log_timeout(model, timeout_duration.as_secs());
            anyhow::bail!("Model '{}' call timed out after {}s", model, timeout_duration.as_secs())
        }
    }
}

/// Call a model and parse its answer as JSON into a typed struct
pub async fn call_model_json<T: DeserializeOwned>(model: &str, prompt: &str) -> Result<T> {
    let raw_response = call_model(model, prompt).await?;

    tracing::debug!(
        model = model,
        raw_response_preview = %raw_response.chars().take(500).collect::<String>(),
        "Raw model response"
    );

    let json_str = perf::timed("json_extract", model, || ollama_utils::extract_json(&raw_response))
        .with_context(|| format!("Failed to extract JSON from model '{}' response", model))?;

    let parsed: T = serde_json::from_str(&json_str)
        .with_context(|| format!("Model '{}' returned invalid JSON. Raw: {}", model, json_str))?;

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_stream_joins_chunks_until_done() {
        let body = concat!(
            "{\"response\": \"{\\\"hint\\\": \", \"done\": false}\n",
            "\n",
            "{\"response\": \"\\\"Use a set\\\"}\", \"done\": true}\n",
            "{\"response\": \"ignored\", \"done\": false}\n",
        );
        assert_eq!(collect_stream(body), r#"{"hint": "Use a set"}"#);
    }

    #[test]
    fn test_collect_stream_skips_garbage_lines() {
        assert_eq!(collect_stream("not json\n{\"response\": \"ok\"}"), "ok");
        assert_eq!(collect_stream(""), "");
    }
}
