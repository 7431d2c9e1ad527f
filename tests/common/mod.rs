#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use codesage_lib::config::settings::IdleSettings;
use codesage_lib::error::{SageError, SpeechError};
use codesage_lib::interview::Collaborators;
use codesage_lib::pipelines::assessment::{AssessmentService, QualityAssessment};
use codesage_lib::pipelines::complexity::{ComplexityAnalysis, ComplexityService};
use codesage_lib::pipelines::hinting::{HintLevel, HintRequest, HintResponse, HintService};
use codesage_lib::pipelines::summary::SummaryService;
use codesage_lib::problems::problem::{Difficulty, Problem};
use codesage_lib::sessions::store::MemorySessionStore;
use codesage_lib::sessions::ChatMessage;
use codesage_lib::speech::{SpeechCapture, SpeechSynthesizer};

pub fn problem(title: &str, difficulty: Difficulty) -> Problem {
    Problem {
        title: title.to_string(),
        description: format!("Solve {}", title),
        initial_code: format!("def {}():\n    pass\n", title.to_lowercase().replace(' ', "_")),
        difficulty,
    }
}

pub fn idle_settings() -> IdleSettings {
    IdleSettings {
        after_ai: Duration::from_secs(30),
        default: Duration::from_secs(10),
        start_delay: Duration::from_millis(500),
    }
}

/// Let spawned tasks on the current-thread runtime make progress.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

pub fn good_report() -> QualityAssessment {
    QualityAssessment {
        style: "Good code".to_string(),
        readability: "Readable".to_string(),
        adherence: "Follows conventions".to_string(),
        problem_solving: "very effective".to_string(),
        suggestions: "none".to_string(),
    }
}

pub fn weak_report() -> QualityAssessment {
    QualityAssessment {
        style: "Inconsistent".to_string(),
        readability: "Hard to follow".to_string(),
        adherence: "Mixed".to_string(),
        problem_solving: "Brute force".to_string(),
        suggestions: "Use a hash map.".to_string(),
    }
}

/// Gate that holds a fake call until the test releases it.
#[derive(Clone)]
pub struct Gate(Arc<Semaphore>);

impl Gate {
    pub fn closed() -> Self {
        Gate(Arc::new(Semaphore::new(0)))
    }

    pub fn release(&self) {
        self.0.add_permits(1);
    }

    async fn pass(&self) {
        if let Ok(permit) = self.0.acquire().await {
            permit.forget();
        }
    }
}

/// Hint service answering from a queue; an empty queue echoes the current level.
#[derive(Default)]
pub struct ScriptedHints {
    responses: Mutex<VecDeque<Result<HintResponse, SageError>>>,
    requests: Mutex<Vec<HintRequest>>,
    calls: AtomicUsize,
    always_fail: bool,
    gate: Option<Gate>,
}

impl ScriptedHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        ScriptedHints { always_fail: true, ..Self::default() }
    }

    pub fn gated(gate: Gate) -> Self {
        ScriptedHints { gate: Some(gate), ..Self::default() }
    }

    pub fn answer(&self, hint: &str, level: HintLevel) {
        self.responses.lock().push_back(Ok(HintResponse {
            hint: hint.to_string(),
            new_hint_level: level,
        }));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HintRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HintService for ScriptedHints {
    async fn get_hint(&self, request: &HintRequest) -> Result<HintResponse, SageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        if self.always_fail {
            return Err(SageError::new("hint backend unavailable", "model_call"));
        }

        let scripted = self.responses.lock().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(HintResponse {
                hint: "Keep going.".to_string(),
                new_hint_level: request.hint_level,
            })
        })
    }
}

/// Assessment answering from a queue; an empty queue returns a good report.
#[derive(Default)]
pub struct ScriptedAssessment {
    responses: Mutex<VecDeque<Result<QualityAssessment, SageError>>>,
    calls: AtomicUsize,
}

impl ScriptedAssessment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, report: QualityAssessment) {
        self.responses.lock().push_back(Ok(report));
    }

    pub fn push_failure(&self) {
        self.responses
            .lock()
            .push_back(Err(SageError::new("assessment backend unavailable", "model_call")));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssessmentService for ScriptedAssessment {
    async fn assess(&self, _code: &str, _language: &str) -> Result<QualityAssessment, SageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.responses.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(good_report()))
    }
}

#[derive(Default)]
pub struct CountingSummary {
    calls: AtomicUsize,
}

impl CountingSummary {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SummaryService for CountingSummary {
    async fn summarize(&self, history: &[ChatMessage], problem_title: &str) -> Result<String, SageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} messages about {}", history.len(), problem_title))
    }
}

pub struct FixedComplexity;

#[async_trait]
impl ComplexityService for FixedComplexity {
    async fn analyze(&self, _code: &str, _language: &str) -> Result<ComplexityAnalysis, SageError> {
        Ok(ComplexityAnalysis {
            complexity: "O(n)".to_string(),
            explanation: "Single pass.".to_string(),
            syntax_errors: Vec::new(),
        })
    }
}

/// Speech capture yielding queued utterances, optionally held behind a gate.
pub struct ScriptedCapture {
    available: bool,
    utterances: Mutex<VecDeque<Result<String, SpeechError>>>,
    gate: Option<Gate>,
    stops: AtomicUsize,
}

impl ScriptedCapture {
    pub fn unavailable() -> Self {
        ScriptedCapture {
            available: false,
            utterances: Mutex::new(VecDeque::new()),
            gate: None,
            stops: AtomicUsize::new(0),
        }
    }

    pub fn hearing(utterance: Result<String, SpeechError>) -> Self {
        ScriptedCapture {
            available: true,
            utterances: Mutex::new(VecDeque::from([utterance])),
            gate: None,
            stops: AtomicUsize::new(0),
        }
    }

    pub fn gated(utterance: Result<String, SpeechError>, gate: Gate) -> Self {
        ScriptedCapture {
            gate: Some(gate),
            ..Self::hearing(utterance)
        }
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechCapture for ScriptedCapture {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn listen(&self) -> Result<String, SpeechError> {
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        let next = self.utterances.lock().pop_front();
        next.unwrap_or(Err(SpeechError::NoSpeech))
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingSynth {
    spoken: Mutex<Vec<String>>,
    cancels: AtomicUsize,
}

impl RecordingSynth {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl SpeechSynthesizer for RecordingSynth {
    fn speak(&self, text: &str) {
        self.spoken.lock().push(text.to_string());
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Every collaborator as a fake, with handles kept for assertions.
pub struct Fakes {
    pub hints: Arc<ScriptedHints>,
    pub assessment: Arc<ScriptedAssessment>,
    pub summary: Arc<CountingSummary>,
    pub store: Arc<MemorySessionStore>,
    pub capture: Arc<ScriptedCapture>,
    pub synth: Arc<RecordingSynth>,
}

impl Fakes {
    pub fn new() -> Self {
        Fakes {
            hints: Arc::new(ScriptedHints::new()),
            assessment: Arc::new(ScriptedAssessment::new()),
            summary: Arc::new(CountingSummary::default()),
            store: Arc::new(MemorySessionStore::new()),
            capture: Arc::new(ScriptedCapture::unavailable()),
            synth: Arc::new(RecordingSynth::default()),
        }
    }

    pub fn with_hints(mut self, hints: ScriptedHints) -> Self {
        self.hints = Arc::new(hints);
        self
    }

    pub fn with_capture(mut self, capture: ScriptedCapture) -> Self {
        self.capture = Arc::new(capture);
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            hints: self.hints.clone(),
            assessment: self.assessment.clone(),
            summary: self.summary.clone(),
            complexity: Arc::new(FixedComplexity),
            store: self.store.clone(),
            capture: self.capture.clone(),
            synth: self.synth.clone(),
        }
    }
}
