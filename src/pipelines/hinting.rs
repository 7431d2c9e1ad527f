use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SageError;
use crate::pipelines::perf;
use crate::pipelines::router::{sage_query, TaskType};
use crate::state::app::AppState;

pub const HINT_APOLOGY: &str = "Sorry, I am unable to provide a hint at the moment.";
/// Sent when the candidate asks for help without typing a question
pub const DEFAULT_HINT_QUESTION: &str = "I'm stuck, can I get a hint?";
/// Sent by the explicit "get hint" action
pub const HINT_BUTTON_QUESTION: &str = "I'd like a hint.";
/// Synthetic question used by the idle loop; never shown in the chat
pub const IDLE_PROBE_QUESTION: &str = "The user seems stuck, provide a hint.";

/// Escalation tier of generated hints, ordered from least to most explicit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HintLevel {
    #[default]
    Nudge,
    Guide,
    Direction,
}

impl HintLevel {
    fn rank(self) -> u8 {
        match self {
            HintLevel::Nudge => 0,
            HintLevel::Guide => 1,
            HintLevel::Direction => 2,
        }
    }

    fn from_rank(rank: u8) -> Self {
        match rank {
            0 => HintLevel::Nudge,
            1 => HintLevel::Guide,
            _ => HintLevel::Direction,
        }
    }

    /// Number of enum steps between two levels.
    pub fn distance(self, other: HintLevel) -> u8 {
        self.rank().abs_diff(other.rank())
    }

    /// Move at most one step toward `target`.
    pub fn step_toward(self, target: HintLevel) -> HintLevel {
        match self.rank().cmp(&target.rank()) {
            std::cmp::Ordering::Less => HintLevel::from_rank(self.rank() + 1),
            std::cmp::Ordering::Greater => HintLevel::from_rank(self.rank() - 1),
            std::cmp::Ordering::Equal => self,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HintLevel::Nudge => "Nudge",
            HintLevel::Guide => "Guide",
            HintLevel::Direction => "Direction",
        }
    }
}

impl fmt::Display for HintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub syntax_errors: u32,
    pub runtime_errors: u32,
    pub complexity: String,
}

impl Default for PerformanceSnapshot {
    fn default() -> Self {
        PerformanceSnapshot {
            syntax_errors: 0,
            runtime_errors: 0,
            complexity: "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintRequest {
    pub code: String,
    pub problem_description: String,
    pub question: String,
    pub performance: PerformanceSnapshot,
    pub hint_level: HintLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintResponse {
    pub hint: String,
    pub new_hint_level: HintLevel,
}

#[async_trait]
pub trait HintService: Send + Sync {
    async fn get_hint(&self, request: &HintRequest) -> Result<HintResponse, SageError>;
}

/// Outcome of a hint call after the failure boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintReply {
    Answered(HintResponse),
    /// The service failed; carries the apology and the unchanged level
    Fallback(HintResponse),
}

pub fn fallback_response(current: HintLevel) -> HintResponse {
    HintResponse {
        hint: HINT_APOLOGY.to_string(),
        new_hint_level: current,
    }
}

/// Call the hint service, converting any failure into the fixed apology.
pub async fn get_hint_or_fallback(service: &dyn HintService, request: &HintRequest) -> HintReply {
    match service.get_hint(request).await {
        Ok(response) => HintReply::Answered(response),
        Err(e) => {
            tracing::warn!(error = %e, level = %request.hint_level, "Hint service failed, using fallback");
            HintReply::Fallback(fallback_response(request.hint_level))
        }
    }
}

pub fn build_hint_prompt(request: &HintRequest) -> String {
    format!(
        r#"You are an expert coding interviewer providing hints to a candidate.

Problem Description: {description}

Candidate's Question: "{question}"

Current Code:
```
{code}
```
Performance Metrics:
- Syntax Errors: {syntax}
- Runtime Errors: {runtime}
- Complexity: "{complexity}"

Current Hint Level: {level}

Answer the candidate's question in the context of their code and the problem. If they are asking for a hint, provide one.
Also decide the hint level for the next iteration.

Hint levels:
- Nudge: a gentle suggestion in the right direction.
- Guide: a more specific hint with detailed guidance.
- Direction: a very specific instruction that almost gives away the answer.
- If the candidate is struggling, increase the level. If they are doing well, keep or decrease it.
- newHintLevel must never skip a level (Nudge -> Direction is not allowed).

Keep the hint clear and concise. Do not mention Big O complexity in the hint.

Return ONLY valid JSON:
{{
  "hint": "...",
  "newHintLevel": "Nudge" | "Guide" | "Direction"
}}"#,
        description = request.problem_description,
        question = request.question,
        code = request.code,
        syntax = request.performance.syntax_errors,
        runtime = request.performance.runtime_errors,
        complexity = request.performance.complexity,
        level = request.hint_level,
    )
}

pub struct OllamaHintService {
    state: AppState,
}

impl OllamaHintService {
    pub fn new(state: AppState) -> Self {
        OllamaHintService { state }
    }
}

#[async_trait]
impl HintService for OllamaHintService {
    async fn get_hint(&self, request: &HintRequest) -> Result<HintResponse, SageError> {
        let _perf = perf::PerfTimer::task(TaskType::Hint);
        let prompt = build_hint_prompt(request);

        sage_query::<HintResponse>(&self.state, TaskType::Hint, prompt)
            .await
            .map_err(|e| e.with_context("Adaptive hint failed"))
    }
}
