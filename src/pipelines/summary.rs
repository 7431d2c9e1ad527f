use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SageError;
use crate::pipelines::perf;
use crate::pipelines::router::{sage_query, TaskType};
use crate::sessions::{ChatMessage, Role};
use crate::state::app::AppState;

pub const NO_HINTS_SUMMARY: &str = "The candidate did not require any hints for this problem.";
pub const SUMMARY_UNAVAILABLE: &str = "Could not generate chat summary.";

/// A chat this short holds at most the welcome message and one exchange.
const SHORT_CHAT_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub summary: String,
}

#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn summarize(&self, history: &[ChatMessage], problem_title: &str) -> Result<String, SageError>;
}

/// Summarize the conversation for the report.
/// Short chats never reach the service, and failures read as a fixed notice.
pub async fn summarize_chat(service: &dyn SummaryService, history: &[ChatMessage], problem_title: &str) -> String {
    if history.len() <= SHORT_CHAT_LEN {
        return NO_HINTS_SUMMARY.to_string();
    }

    match service.summarize(history, problem_title).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(problem = problem_title, error = %e, "Chat summary failed");
            SUMMARY_UNAVAILABLE.to_string()
        }
    }
}

pub fn build_summary_prompt(history: &[ChatMessage], problem_title: &str) -> String {
    let transcript = history
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Ai => "ai",
            };
            format!("- {}: {}", role, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert at summarizing technical conversations.

Provide a concise, one-paragraph summary of the following chat session between a candidate and an AI interviewer about the coding problem: "{}".

Focus on the candidate's line of questioning and the key hints provided by the AI.

Chat History:
{}

Return ONLY valid JSON:
{{"summary": "..."}}"#,
        problem_title, transcript
    )
}

pub struct OllamaSummaryService {
    state: AppState,
}

impl OllamaSummaryService {
    pub fn new(state: AppState) -> Self {
        OllamaSummaryService { state }
    }
}

#[async_trait]
impl SummaryService for OllamaSummaryService {
    async fn summarize(&self, history: &[ChatMessage], problem_title: &str) -> Result<String, SageError> {
        let _perf = perf::PerfTimer::task(TaskType::Summary);
        let prompt = build_summary_prompt(history, problem_title);

        sage_query::<ChatSummary>(&self.state, TaskType::Summary, prompt)
            .await
            .map(|s| s.summary)
            .map_err(|e| e.with_context("Chat summary failed"))
    }
}
