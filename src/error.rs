use serde::{Serialize, Deserialize};
use std::fmt;

/// Unified error type for codesage.
/// Collaborator calls, persistence and routing all surface failures as `SageError`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SageError {
    pub message: String,
    pub stage: String,
    pub model: Option<String>,
    pub retry_succeeded: bool,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl SageError {
    /// Create a new error with stage and message
    pub fn new<S: Into<String>>(message: S, stage: &'static str) -> Self {
        SageError {
            message: message.into(),
            stage: stage.to_string(),
            model: None,
            retry_succeeded: false,
            context: None,
            source: None,
        }
    }

    /// Add model context to the error
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Mark whether a retry succeeded
    pub fn with_retry(mut self, succeeded: bool) -> Self {
        self.retry_succeeded = succeeded;
        self
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for SageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref model) = self.model {
            write!(f, " (model: {})", model)?;
        }
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for SageError {}

impl From<anyhow::Error> for SageError {
    fn from(err: anyhow::Error) -> Self {
        SageError::new(err.to_string(), "unknown").with_source("anyhow")
    }
}

impl From<std::io::Error> for SageError {
    fn from(err: std::io::Error) -> Self {
        SageError::new(format!("I/O error: {}", err), "io").with_source("std::io")
    }
}

impl From<serde_json::Error> for SageError {
    fn from(err: serde_json::Error) -> Self {
        SageError::new(format!("JSON error: {}", err), "json_parse").with_source("serde_json")
    }
}

impl From<reqwest::Error> for SageError {
    fn from(err: reqwest::Error) -> Self {
        SageError::new(format!("HTTP error: {}", err), "http").with_source("reqwest")
    }
}

impl From<tokio::time::error::Elapsed> for SageError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        SageError::new("Operation timed out", "timeout").with_source("tokio::time")
    }
}

impl From<StoreError> for SageError {
    fn from(err: StoreError) -> Self {
        SageError::new(err.to_string(), "session_store").with_source("store")
    }
}

/// Failures of the platform speech-recognition capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("speech recognition is not supported on this platform")]
    Unsupported,

    #[error("no speech was recognized")]
    NoSpeech,

    #[error("speech recognition failed: {0}")]
    Failed(String),
}

/// Failures of the session persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access session store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode session store: {0}")]
    Encode(#[from] serde_json::Error),
}
