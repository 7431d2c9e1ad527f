use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipelines::assessment::QualityAssessment;
use crate::pipelines::complexity::{ComplexityAnalysis, ComplexityService};
use crate::pipelines::summary::{summarize_chat, SummaryService};
use crate::problems::problem::Difficulty;
use crate::sessions::InterviewSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemReport {
    pub title: String,
    pub difficulty: Difficulty,
    pub assessment: QualityAssessment,
    pub code: String,
    pub chat_summary: String,
    pub complexity: Option<ComplexityAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub candidate_name: String,
    pub timestamp: DateTime<Utc>,
    pub problems: Vec<ProblemReport>,
}

/// Build the per-problem report for a finished session.
/// Complexity analysis is optional; its failures are logged and left out.
pub async fn build_report(
    session: &InterviewSession,
    summary: &dyn SummaryService,
    complexity: Option<&dyn ComplexityService>,
    language: &str,
) -> SessionReport {
    let mut problems = Vec::with_capacity(session.results.len());

    for result in &session.results {
        let chat_summary = summarize_chat(summary, &result.chat_history, &result.problem.title).await;

        let analysis = match complexity {
            Some(service) => match service.analyze(&result.code, language).await {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    tracing::warn!(problem = %result.problem.title, error = %e, "Complexity analysis failed");
                    None
                }
            },
            None => None,
        };

        problems.push(ProblemReport {
            title: result.problem.title.clone(),
            difficulty: result.problem.difficulty,
            assessment: result.report.clone(),
            code: result.code.clone(),
            chat_summary,
            complexity: analysis,
        });
    }

    SessionReport {
        session_id: session.id.clone(),
        candidate_name: session.candidate_name.clone(),
        timestamp: session.timestamp,
        problems,
    }
}

pub fn render_report(report: &SessionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Interview report: {} ===", report.candidate_name);
    let _ = writeln!(out, "Session {} ({})", report.session_id, report.timestamp.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "{} problem(s) completed", report.problems.len());

    for (i, problem) in report.problems.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- {}. {} [{}] ---", i + 1, problem.title, problem.difficulty);
        let _ = writeln!(out, "Style:           {}", problem.assessment.style);
        let _ = writeln!(out, "Readability:     {}", problem.assessment.readability);
        let _ = writeln!(out, "Adherence:       {}", problem.assessment.adherence);
        let _ = writeln!(out, "Problem solving: {}", problem.assessment.problem_solving);
        let _ = writeln!(out, "Suggestions:     {}", problem.assessment.suggestions);

        if let Some(analysis) = &problem.complexity {
            let _ = writeln!(out, "Complexity:      {} ({})", analysis.complexity, analysis.explanation);
            for issue in &analysis.syntax_errors {
                let _ = writeln!(out, "  line {}: {}", issue.line, issue.message);
            }
        }

        let _ = writeln!(out, "Chat summary:    {}", problem.chat_summary);
        let _ = writeln!(out, "Final code:");
        for line in problem.code.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
    out
}

/// One line per stored session for the hiring-manager listing.
pub fn render_session_line(session: &InterviewSession) -> String {
    let titles = session
        .results
        .iter()
        .map(|r| r.problem.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}  {}  {}  [{}]",
        session.timestamp.format("%Y-%m-%d %H:%M"),
        session.candidate_name,
        session.id,
        titles
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SageError;
    use crate::problems::problem::Problem;
    use crate::sessions::{ChatMessage, InterviewResult};
    use async_trait::async_trait;

    struct FixedSummary;

    #[async_trait]
    impl SummaryService for FixedSummary {
        async fn summarize(&self, _h: &[ChatMessage], _t: &str) -> Result<String, SageError> {
            Ok("Discussed hashing.".to_string())
        }
    }

    struct BrokenComplexity;

    #[async_trait]
    impl ComplexityService for BrokenComplexity {
        async fn analyze(&self, _c: &str, _l: &str) -> Result<ComplexityAnalysis, SageError> {
            Err(SageError::new("down", "model_call"))
        }
    }

    fn session() -> InterviewSession {
        let result = InterviewResult {
            problem: Problem {
                title: "Two Sum".to_string(),
                description: String::new(),
                initial_code: String::new(),
                difficulty: Difficulty::Easy,
            },
            code: "def two_sum():\n    pass".to_string(),
            report: QualityAssessment {
                style: "Good".to_string(),
                readability: "Clear".to_string(),
                adherence: "Fine".to_string(),
                problem_solving: "Effective".to_string(),
                suggestions: "None".to_string(),
            },
            chat_history: vec![
                ChatMessage::ai("Hello"),
                ChatMessage::user("hint?"),
                ChatMessage::ai("Try a map."),
            ],
        };
        InterviewSession::finalize(vec![result])
    }

    #[tokio::test]
    async fn test_report_survives_failed_complexity() {
        let session = session();
        let report = build_report(&session, &FixedSummary, Some(&BrokenComplexity as &dyn ComplexityService), "python").await;

        assert_eq!(report.problems.len(), 1);
        assert_eq!(report.problems[0].chat_summary, "Discussed hashing.");
        assert!(report.problems[0].complexity.is_none());

        let text = render_report(&report);
        assert!(text.contains("Two Sum [easy]"));
        assert!(text.contains("    def two_sum():"));
    }

    #[test]
    fn test_session_line_lists_titles() {
        let line = render_session_line(&session());
        assert!(line.contains("Candidate "));
        assert!(line.ends_with("[Two Sum]"));
    }
}
