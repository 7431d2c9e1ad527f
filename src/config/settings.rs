use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use lazy_static::lazy_static;

use crate::config::app_data_dir;

/// Which local model serves each interview flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub hint_model: String,
    pub assessment_model: String,
    pub summary_model: String,
    pub analysis_model: String,
    /// Tried when the primary model for a task is unavailable or keeps failing
    pub fallback_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            hint_model: "qwen2.5:7b-instruct".to_string(),
            assessment_model: "qwen2.5-coder:7b".to_string(),
            summary_model: "qwen2.5:7b-instruct".to_string(),
            analysis_model: "qwen2.5-coder:7b".to_string(),
            fallback_model: "llama3.1:8b".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        OllamaConfig {
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Timing of the proactive hint loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Idle window when the interviewer spoke last
    pub idle_after_ai_secs: u64,
    /// Idle window otherwise
    pub idle_default_secs: u64,
    /// Delay before the first idle window is armed on a new problem
    pub idle_start_delay_ms: u64,
    pub default_language: String,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        InterviewConfig {
            idle_after_ai_secs: 30,
            idle_default_secs: 10,
            idle_start_delay_ms: 500,
            default_language: "python".to_string(),
        }
    }
}

impl InterviewConfig {
    pub fn idle_settings(&self) -> IdleSettings {
        IdleSettings {
            after_ai: Duration::from_secs(self.idle_after_ai_secs),
            default: Duration::from_secs(self.idle_default_secs),
            start_delay: Duration::from_millis(self.idle_start_delay_ms),
        }
    }
}

/// Resolved idle durations handed to each hint controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleSettings {
    pub after_ai: Duration,
    pub default: Duration,
    pub start_delay: Duration,
}

impl Default for IdleSettings {
    fn default() -> Self {
        InterviewConfig::default().idle_settings()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub models: ModelConfig,
    pub ollama: OllamaConfig,
    pub interview: InterviewConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: "info".to_string(),
            models: ModelConfig::default(),
            ollama: OllamaConfig::default(),
            interview: InterviewConfig::default(),
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("CODESAGE_CONFIG") {
        return PathBuf::from(path);
    }
    app_data_dir().join("codesage.toml")
}

/// Parse a config document; missing keys take their defaults.
pub fn parse_config(content: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str::<AppConfig>(content)
}

fn load_config_internal() -> AppConfig {
    let path = config_path();

    match fs::read_to_string(&path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => {
                tracing::info!(path = ?path, "Loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to parse config, using defaults");
                AppConfig::default()
            }
        },
        Err(_) => {
            tracing::debug!(path = ?path, "No config file, using defaults");
            AppConfig::default()
        }
    }
}

lazy_static! {
    static ref APP_CONFIG: AppConfig = load_config_internal();
}

/// Get the cached configuration (loaded once on first access)
pub fn get_config() -> &'static AppConfig {
    &APP_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_interview_timing() {
        let idle = AppConfig::default().interview.idle_settings();
        assert_eq!(idle.after_ai, Duration::from_secs(30));
        assert_eq!(idle.default, Duration::from_secs(10));
        assert_eq!(idle.start_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
            log_level = "debug"

            [models]
            hint_model = "mistral:7b"

            [interview]
            idle_default_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.models.hint_model, "mistral:7b");
        assert_eq!(config.models.assessment_model, "qwen2.5-coder:7b");
        assert_eq!(config.interview.idle_default_secs, 5);
        assert_eq!(config.interview.idle_after_ai_secs, 30);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(parse_config("models = 3").is_err());
    }
}
