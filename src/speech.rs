use async_trait::async_trait;

use crate::error::SpeechError;

/// Platform speech-to-text. One `listen` call yields one utterance.
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    fn is_available(&self) -> bool;

    async fn listen(&self) -> Result<String, SpeechError>;

    /// Abort a pending `listen`. Implementations may ignore it.
    fn stop(&self) {}
}

/// Text-to-speech, best effort.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str);

    fn cancel(&self);
}

/// Capture for hosts without a microphone, such as the console driver.
pub struct UnsupportedSpeechCapture;

#[async_trait]
impl SpeechCapture for UnsupportedSpeechCapture {
    fn is_available(&self) -> bool {
        false
    }

    async fn listen(&self) -> Result<String, SpeechError> {
        Err(SpeechError::Unsupported)
    }
}

/// Synthesizer that only records what would have been spoken.
pub struct LoggingSynthesizer;

impl SpeechSynthesizer for LoggingSynthesizer {
    fn speak(&self, text: &str) {
        tracing::debug!(chars = text.chars().count(), "Speak");
    }

    fn cancel(&self) {
        tracing::debug!("Speech cancelled");
    }
}
