pub mod availability;
pub mod warmup;

use serde::de::DeserializeOwned;
use crate::pipelines::ollama;

/// A model served by the local Ollama daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalModel {
    name: String,
}

impl LocalModel {
    pub fn new<S: Into<String>>(name: S) -> Self {
        LocalModel { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn call_json<T: DeserializeOwned>(&self, prompt: &str) -> anyhow::Result<T> {
        ollama::call_model_json(&self.name, prompt).await
    }
}
