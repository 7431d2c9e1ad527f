use crate::interview::hints::{HintHandle, HintOutcome, RecordingState};
use crate::interview::session::{InterviewCoordinator, SubmitOutcome};
use crate::interview::{Collaborators, Notice};
use crate::metrics::MetricsSnapshot;
use crate::pipelines::hinting::HINT_BUTTON_QUESTION;
use crate::problems::problem::Problem;
use crate::report::{build_report, SessionReport};
use crate::sessions::InterviewSession;
use crate::state::app::AppState;

fn no_problem() -> String {
    "No problem in progress".to_string()
}

pub fn start_interview(coordinator: &mut InterviewCoordinator) -> Result<Problem, String> {
    coordinator
        .start()
        .map(|controller| controller.problem().clone())
        .map_err(|e| e.to_string())
}

/// Handle for the problem in progress, for requests that outlive the borrow.
pub fn hint_handle(coordinator: &InterviewCoordinator) -> Result<HintHandle, String> {
    coordinator
        .hints()
        .map(|controller| controller.handle())
        .ok_or_else(no_problem)
}

/// Explicit hint request. Blank text is the "get hint" button.
pub async fn get_hint(handle: HintHandle, question: Option<String>) -> HintOutcome {
    let question = question
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| HINT_BUTTON_QUESTION.to_string());
    handle.request_hint(Some(question)).await
}

pub fn update_code(coordinator: &InterviewCoordinator, code: String) -> Result<(), String> {
    let controller = coordinator.hints().ok_or_else(no_problem)?;
    controller.update_code(code);
    Ok(())
}

pub fn toggle_recording(coordinator: &InterviewCoordinator) -> Result<RecordingState, String> {
    coordinator
        .hints()
        .map(|controller| controller.toggle_recording())
        .ok_or_else(no_problem)
}

pub fn take_notices(coordinator: &InterviewCoordinator) -> Vec<Notice> {
    coordinator
        .hints()
        .map(|controller| controller.take_notices())
        .unwrap_or_default()
}

pub async fn submit_solution(
    coordinator: &mut InterviewCoordinator,
    code: String,
    language: &str,
) -> Result<SubmitOutcome, String> {
    coordinator
        .submit(code, language)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_final_report(
    collaborators: &Collaborators,
    session: &InterviewSession,
    language: &str,
) -> SessionReport {
    build_report(
        session,
        collaborators.summary.as_ref(),
        Some(collaborators.complexity.as_ref()),
        language,
    )
    .await
}

pub async fn list_sessions(coordinator: &mut InterviewCoordinator) -> Vec<InterviewSession> {
    coordinator.open_dashboard().await
}

pub fn reset_interview(coordinator: &mut InterviewCoordinator) {
    coordinator.reset();
}

pub fn get_metrics(state: &AppState) -> MetricsSnapshot {
    state.metrics.snapshot()
}
