pub mod hints;
pub mod progression;
pub mod session;

use std::fmt;
use std::sync::Arc;

use crate::pipelines::assessment::{AssessmentService, OllamaAssessmentService};
use crate::pipelines::complexity::{ComplexityService, OllamaComplexityService};
use crate::pipelines::hinting::{HintService, OllamaHintService};
use crate::pipelines::summary::{OllamaSummaryService, SummaryService};
use crate::sessions::store::{FileSessionStore, SessionStore};
use crate::speech::{LoggingSynthesizer, SpeechCapture, SpeechSynthesizer, UnsupportedSpeechCapture};
use crate::state::app::AppState;

/// External services an interview talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub hints: Arc<dyn HintService>,
    pub assessment: Arc<dyn AssessmentService>,
    pub summary: Arc<dyn SummaryService>,
    pub complexity: Arc<dyn ComplexityService>,
    pub store: Arc<dyn SessionStore>,
    pub capture: Arc<dyn SpeechCapture>,
    pub synth: Arc<dyn SpeechSynthesizer>,
}

impl Collaborators {
    /// Local-model services, file-backed store and console speech stand-ins.
    pub fn local(state: &AppState) -> Self {
        Collaborators {
            hints: Arc::new(OllamaHintService::new(state.clone())),
            assessment: Arc::new(OllamaAssessmentService::new(state.clone())),
            summary: Arc::new(OllamaSummaryService::new(state.clone())),
            complexity: Arc::new(OllamaComplexityService::new(state.clone())),
            store: Arc::new(FileSessionStore::in_data_dir()),
            capture: Arc::new(UnsupportedSpeechCapture),
            synth: Arc::new(LoggingSynthesizer),
        }
    }
}

/// User-visible, non-fatal conditions queued for the caller to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SpeechUnavailable,
    SpeechNotRecognized,
    SpeechFailed(String),
    /// Recording refused while a hint is being generated
    RecordingBlocked,
    HintUnavailable,
    AssessmentFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SpeechUnavailable => f.write_str("Speech recognition is not supported here. Type your question instead."),
            Notice::SpeechNotRecognized => f.write_str("No speech was recognized. Please try again."),
            Notice::SpeechFailed(msg) => write!(f, "Speech recognition failed: {}", msg),
            Notice::RecordingBlocked => f.write_str("Wait for the current hint before recording."),
            Notice::HintUnavailable => f.write_str("The hint service is unavailable right now."),
            Notice::AssessmentFailed(msg) => write!(f, "Could not assess your code, please submit again. ({})", msg),
        }
    }
}
