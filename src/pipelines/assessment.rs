use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SageError;
use crate::pipelines::perf;
use crate::pipelines::router::{sage_query, TaskType};
use crate::state::app::AppState;

/// Free-text critique of a submitted solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessment {
    pub style: String,
    pub readability: String,
    pub adherence: String,
    pub problem_solving: String,
    pub suggestions: String,
}

#[async_trait]
pub trait AssessmentService: Send + Sync {
    async fn assess(&self, code: &str, language: &str) -> Result<QualityAssessment, SageError>;
}

pub const ASSESSMENT_SYSTEM_PROMPT: &str = r#"You are an expert software engineer who specializes in code quality assessment.
Review the code provided and assess its style, readability and adherence to coding standards.
Identify the candidate's problem-solving approach and methodology.
Provide suggestions for alternative solutions or optimizations.

Rules:
Return ONLY valid JSON.
NEVER include commentary outside JSON.
Every field is a short plain-text paragraph."#;

pub fn build_assessment_prompt(code: &str, language: &str) -> String {
    format!(
        r#"{}

Language: {}
Code:
```
{}
```

JSON schema:
{{
  "style": "...",
  "readability": "...",
  "adherence": "...",
  "problemSolving": "...",
  "suggestions": "..."
}}"#,
        ASSESSMENT_SYSTEM_PROMPT, language, code
    )
}

/// Assessment backed by the local model router.
pub struct OllamaAssessmentService {
    state: AppState,
}

impl OllamaAssessmentService {
    pub fn new(state: AppState) -> Self {
        OllamaAssessmentService { state }
    }
}

#[async_trait]
impl AssessmentService for OllamaAssessmentService {
    async fn assess(&self, code: &str, language: &str) -> Result<QualityAssessment, SageError> {
        let _perf = perf::PerfTimer::task(TaskType::Assessment);
        let prompt = build_assessment_prompt(code, language);

        sage_query::<QualityAssessment>(&self.state, TaskType::Assessment, prompt)
            .await
            .map_err(|e| e.with_context("Code quality assessment failed"))
    }
}
