use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SageError;
use crate::pipelines::perf;
use crate::pipelines::router::{sage_query, TaskType};
use crate::state::app::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxIssue {
    pub line: u32,
    pub message: String,
}

/// Big-O estimate of a solution plus any syntax errors spotted on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityAnalysis {
    pub complexity: String,
    pub explanation: String,
    #[serde(default)]
    pub syntax_errors: Vec<SyntaxIssue>,
}

#[async_trait]
pub trait ComplexityService: Send + Sync {
    async fn analyze(&self, code: &str, language: &str) -> Result<ComplexityAnalysis, SageError>;
}

pub fn build_complexity_prompt(code: &str, language: &str) -> String {
    format!(
        r#"You are an expert software engineer specializing in analyzing code complexity and finding syntax errors.

You will receive code and must:
1. Determine its time complexity (Big O) and explain how it was determined. If the code is incomplete, estimate the complexity assuming it is completed in a standard way.
2. Identify any syntax errors. For each error give the line number and a descriptive message. If there are none, return an empty array.

Language: {}

Code:
```
{}
```

Return ONLY valid JSON:
{{
  "complexity": "O(...)",
  "explanation": "...",
  "syntaxErrors": [{{"line": 1, "message": "..."}}]
}}"#,
        language, code
    )
}

pub struct OllamaComplexityService {
    state: AppState,
}

impl OllamaComplexityService {
    pub fn new(state: AppState) -> Self {
        OllamaComplexityService { state }
    }
}

#[async_trait]
impl ComplexityService for OllamaComplexityService {
    async fn analyze(&self, code: &str, language: &str) -> Result<ComplexityAnalysis, SageError> {
        let _perf = perf::PerfTimer::task(TaskType::Complexity);
        sage_query::<ComplexityAnalysis>(&self.state, TaskType::Complexity, build_complexity_prompt(code, language))
            .await
            .map_err(|e| e.with_context("Complexity analysis failed"))
    }
}
