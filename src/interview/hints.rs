use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::settings::IdleSettings;
use crate::error::{SageError, SpeechError};
use crate::interview::{Collaborators, Notice};
use crate::metrics::Metrics;
use crate::pipelines::hinting::{
    get_hint_or_fallback, HintLevel, HintReply, HintRequest, PerformanceSnapshot,
    DEFAULT_HINT_QUESTION, IDLE_PROBE_QUESTION,
};
use crate::problems::problem::Problem;
use crate::sessions::{ChatMessage, InterviewResult, Role};

pub fn welcome_message(title: &str) -> String {
    format!(
        "Hello! Let's start with this problem: \"{}\". Take a moment to read the description. I'm here if you need any help. Good luck!",
        title
    )
}

/// Idle window for the next cycle: longer when the interviewer spoke last.
pub fn idle_timeout_for(history: &[ChatMessage], settings: &IdleSettings) -> Duration {
    match history.last() {
        Some(message) if message.role == Role::Ai => settings.after_ai,
        _ => settings.default,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    InFlight,
    Recording,
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintOutcome {
    Answered { hint: String, level: HintLevel },
    /// Service failed; chat and level untouched
    Fallback(String),
    /// Refused before reaching the service
    Dropped(DropReason),
    /// The problem was torn down while the call was in flight
    Discarded,
}

struct HintState {
    chat_history: Vec<ChatMessage>,
    hint_level: HintLevel,
    is_getting_hint: bool,
    recording: RecordingState,
    /// Bumped on every recording start and cancel so stale utterances are ignored
    recording_epoch: u64,
    code: String,
    torn_down: bool,
    notices: Vec<Notice>,
}

struct HintInner {
    problem: Problem,
    state: Mutex<HintState>,
    code_changed: AtomicBool,
    rearm: Notify,
    idle_task: Mutex<Option<JoinHandle<()>>>,
    collaborators: Collaborators,
    metrics: Metrics,
    idle: IdleSettings,
}

/// Releases the in-flight flag on every exit path of a hint request.
struct InFlightGuard<'a> {
    inner: &'a HintInner,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.inner.state.lock().is_getting_hint = false;
    }
}

impl HintInner {
    async fn request_hint(&self, question: Option<String>) -> HintOutcome {
        let question = question
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HINT_QUESTION.to_string());
        let is_probe = question == IDLE_PROBE_QUESTION;

        let request = {
            let mut state = self.state.lock();
            let refused = if state.torn_down {
                Some(DropReason::TornDown)
            } else if state.is_getting_hint {
                Some(DropReason::InFlight)
            } else if state.recording == RecordingState::Recording {
                Some(DropReason::Recording)
            } else {
                None
            };
            if let Some(reason) = refused {
                self.metrics.record_hint_dropped();
                tracing::debug!(reason = ?reason, probe = is_probe, "Hint request dropped");
                return HintOutcome::Dropped(reason);
            }

            state.is_getting_hint = true;
            if is_probe {
                self.metrics.record_idle_probe();
                tracing::info!(problem = %self.problem.title, "Candidate idle, requesting proactive hint");
            } else {
                state.chat_history.push(ChatMessage::user(question.clone()));
            }

            HintRequest {
                code: state.code.clone(),
                problem_description: self.problem.description.clone(),
                question,
                performance: PerformanceSnapshot::default(),
                hint_level: state.hint_level,
            }
        };
        let _in_flight = InFlightGuard { inner: self };

        if !is_probe {
            self.rearm.notify_one();
        }
        self.metrics.record_hint_requested();

        let reply = get_hint_or_fallback(self.collaborators.hints.as_ref(), &request).await;

        let mut state = self.state.lock();
        if state.torn_down {
            tracing::debug!(problem = %self.problem.title, "Discarding hint that arrived after teardown");
            return HintOutcome::Discarded;
        }

        match reply {
            HintReply::Answered(response) => {
                let current = state.hint_level;
                let requested = response.new_hint_level;
                let level = current.step_toward(requested);
                if current.distance(requested) > 1 {
                    self.metrics.record_level_clamp();
                    tracing::warn!(
                        from = %current,
                        requested = %requested,
                        applied = %level,
                        "Hint service skipped a level, clamping to one step"
                    );
                }

                state.chat_history.push(ChatMessage::ai(response.hint.clone()));
                state.hint_level = level;
                drop(state);

                self.collaborators.synth.speak(&response.hint);
                self.rearm.notify_one();
                HintOutcome::Answered { hint: response.hint, level }
            }
            HintReply::Fallback(response) => {
                self.metrics.record_hint_fallback();
                state.notices.push(Notice::HintUnavailable);
                HintOutcome::Fallback(response.hint)
            }
        }
    }

    fn idle_window(&self) -> Duration {
        idle_timeout_for(&self.state.lock().chat_history, &self.idle)
    }

    fn on_idle_timeout(self: &Arc<Self>) {
        if self.code_changed.swap(false, Ordering::SeqCst) {
            tracing::debug!(problem = %self.problem.title, "Code changed during idle window, no probe");
            return;
        }

        tracing::debug!(problem = %self.problem.title, "Idle window elapsed");
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.request_hint(Some(IDLE_PROBE_QUESTION.to_string())).await;
        });
    }

    async fn run_idle_loop(self: Arc<Self>) {
        tokio::time::sleep(self.idle.start_delay).await;
        loop {
            let window = self.idle_window();
            tokio::select! {
                _ = tokio::time::sleep(window) => self.on_idle_timeout(),
                _ = self.rearm.notified() => {
                    tracing::trace!(problem = %self.problem.title, "Chat grew, idle window restarted");
                }
            }
        }
    }

    async fn finish_recording(self: Arc<Self>, epoch: u64) {
        let heard = self.collaborators.capture.listen().await;

        let utterance = {
            let mut state = self.state.lock();
            if state.torn_down || state.recording_epoch != epoch {
                return;
            }
            state.recording = RecordingState::Idle;

            match heard {
                Ok(text) if !text.trim().is_empty() => Some(text),
                Ok(_) | Err(SpeechError::NoSpeech) => {
                    state.notices.push(Notice::SpeechNotRecognized);
                    None
                }
                Err(SpeechError::Unsupported) => {
                    state.notices.push(Notice::SpeechUnavailable);
                    None
                }
                Err(SpeechError::Failed(msg)) => {
                    state.notices.push(Notice::SpeechFailed(msg));
                    None
                }
            }
        };

        if let Some(question) = utterance {
            self.request_hint(Some(question)).await;
        }
    }

    /// Cancel timers and speech. Idempotent; returns the frozen chat.
    fn teardown(&self) -> Vec<ChatMessage> {
        let (history, first, was_recording) = {
            let mut state = self.state.lock();
            let first = !state.torn_down;
            let was_recording = state.recording == RecordingState::Recording;
            state.torn_down = true;
            state.recording = RecordingState::Idle;
            (state.chat_history.clone(), first, was_recording)
        };

        if first {
            if let Some(handle) = self.idle_task.lock().take() {
                handle.abort();
            }
            if was_recording {
                self.collaborators.capture.stop();
            }
            self.collaborators.synth.cancel();
            tracing::debug!(problem = %self.problem.title, messages = history.len(), "Hint controller torn down");
        }
        history
    }
}

/// Shared handle for issuing hint requests off the caller's task.
/// Unlike the controller, dropping a handle does not tear anything down.
#[derive(Clone)]
pub struct HintHandle {
    inner: Arc<HintInner>,
}

impl HintHandle {
    pub async fn request_hint(&self, question: Option<String>) -> HintOutcome {
        self.inner.request_hint(question).await
    }
}

/// Chat and hint loop for one problem. Dropping it tears the loop down.
pub struct HintController {
    inner: Arc<HintInner>,
}

impl HintController {
    /// Greet the candidate and arm the idle loop. Must be called inside a tokio runtime.
    pub fn start(problem: Problem, collaborators: Collaborators, metrics: Metrics, idle: IdleSettings) -> Self {
        let welcome = welcome_message(&problem.title);
        let inner = Arc::new(HintInner {
            state: Mutex::new(HintState {
                chat_history: vec![ChatMessage::ai(welcome.clone())],
                hint_level: HintLevel::Nudge,
                is_getting_hint: false,
                recording: RecordingState::Idle,
                recording_epoch: 0,
                code: problem.initial_code.clone(),
                torn_down: false,
                notices: Vec::new(),
            }),
            problem,
            code_changed: AtomicBool::new(false),
            rearm: Notify::new(),
            idle_task: Mutex::new(None),
            collaborators,
            metrics,
            idle,
        });

        inner.collaborators.synth.speak(&welcome);
        let handle = tokio::spawn(Arc::clone(&inner).run_idle_loop());
        *inner.idle_task.lock() = Some(handle);

        tracing::info!(problem = %inner.problem.title, difficulty = %inner.problem.difficulty, "Problem started");
        HintController { inner }
    }

    pub fn problem(&self) -> &Problem {
        &self.inner.problem
    }

    pub fn handle(&self) -> HintHandle {
        HintHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Ask for a hint. `None` or blank text sends the generic "stuck" question.
    pub async fn request_hint(&self, question: Option<String>) -> HintOutcome {
        self.inner.request_hint(question).await
    }

    /// Record a code edit; suppresses the next idle probe.
    pub fn update_code<S: Into<String>>(&self, code: S) {
        let mut state = self.inner.state.lock();
        if state.torn_down {
            return;
        }
        state.code = code.into();
        self.inner.code_changed.store(true, Ordering::SeqCst);
    }

    /// Start capturing a spoken question, or cancel a capture in progress.
    pub fn toggle_recording(&self) -> RecordingState {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        if state.torn_down {
            return state.recording;
        }

        let current = state.recording;
        match current {
            RecordingState::Recording => {
                state.recording = RecordingState::Idle;
                state.recording_epoch += 1;
                drop(state);
                inner.collaborators.capture.stop();
                tracing::debug!("Recording cancelled");
                RecordingState::Idle
            }
            RecordingState::Idle => {
                if state.is_getting_hint {
                    state.notices.push(Notice::RecordingBlocked);
                    return RecordingState::Idle;
                }
                if !inner.collaborators.capture.is_available() {
                    state.notices.push(Notice::SpeechUnavailable);
                    return RecordingState::Idle;
                }

                state.recording = RecordingState::Recording;
                state.recording_epoch += 1;
                let epoch = state.recording_epoch;
                drop(state);

                tokio::spawn(Arc::clone(inner).finish_recording(epoch));
                RecordingState::Recording
            }
        }
    }

    /// Assess the final code. Success freezes the chat and ends this problem;
    /// failure leaves everything in place so the candidate can resubmit.
    pub async fn submit(&self, code: String, language: &str) -> Result<InterviewResult, SageError> {
        if self.inner.state.lock().torn_down {
            return Err(SageError::new("Problem already submitted", "submit"));
        }
        self.update_code(code.clone());

        match self.inner.collaborators.assessment.assess(&code, language).await {
            Ok(report) => {
                self.inner.metrics.record_assessment(true);
                let chat_history = self.inner.teardown();
                tracing::info!(problem = %self.inner.problem.title, language = language, "Solution assessed");
                Ok(InterviewResult {
                    problem: self.inner.problem.clone(),
                    code,
                    report,
                    chat_history,
                })
            }
            Err(e) => {
                self.inner.metrics.record_assessment(false);
                tracing::warn!(problem = %self.inner.problem.title, error = %e, "Assessment failed");
                self.inner.state.lock().notices.push(Notice::AssessmentFailed(e.message.clone()));
                Err(e)
            }
        }
    }

    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.inner.state.lock().chat_history.clone()
    }

    pub fn hint_level(&self) -> HintLevel {
        self.inner.state.lock().hint_level
    }

    pub fn code(&self) -> String {
        self.inner.state.lock().code.clone()
    }

    pub fn is_getting_hint(&self) -> bool {
        self.inner.state.lock().is_getting_hint
    }

    pub fn recording_state(&self) -> RecordingState {
        self.inner.state.lock().recording
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.state.lock().torn_down
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.inner.state.lock().notices)
    }

    pub fn teardown(&self) {
        self.inner.teardown();
    }
}

impl Drop for HintController {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}
