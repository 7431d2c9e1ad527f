use std::sync::Arc;

use crate::config::settings::IdleSettings;
use crate::error::SageError;
use crate::interview::hints::HintController;
use crate::interview::progression::{Progression, ProgressionController};
use crate::interview::Collaborators;
use crate::metrics::Metrics;
use crate::problems::problem::Problem;
use crate::problems::selector::ProblemPool;
use crate::sessions::store::load_sessions_newest_first;
use crate::sessions::InterviewSession;
use crate::state::session::ViewState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Next(Problem),
    Finished(InterviewSession),
}

/// Top-level session flow: owns the results and the hint controller of the
/// problem on screen, and hands finished sessions to the store.
pub struct InterviewCoordinator {
    catalog: Arc<Vec<Problem>>,
    collaborators: Collaborators,
    metrics: Metrics,
    idle: IdleSettings,
    progression: ProgressionController,
    current: Option<HintController>,
    completed: Option<InterviewSession>,
    view: ViewState,
}

impl InterviewCoordinator {
    pub fn new(catalog: Arc<Vec<Problem>>, collaborators: Collaborators, metrics: Metrics, idle: IdleSettings) -> Self {
        let pool = ProblemPool::shuffled(&catalog);
        Self::with_pool(catalog, pool, collaborators, metrics, idle)
    }

    /// Use a fixed pool order instead of shuffling.
    pub fn with_pool(
        catalog: Arc<Vec<Problem>>,
        pool: ProblemPool,
        collaborators: Collaborators,
        metrics: Metrics,
        idle: IdleSettings,
    ) -> Self {
        InterviewCoordinator {
            catalog,
            collaborators,
            metrics,
            idle,
            progression: ProgressionController::new(pool),
            current: None,
            completed: None,
            view: ViewState::Landing,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn hints(&self) -> Option<&HintController> {
        self.current.as_ref()
    }

    pub fn completed_session(&self) -> Option<&InterviewSession> {
        self.completed.as_ref()
    }

    pub fn progression(&self) -> &ProgressionController {
        &self.progression
    }

    /// Present the first problem.
    pub fn start(&mut self) -> Result<&HintController, SageError> {
        if self.current.is_some() {
            return Err(SageError::new("Interview already in progress", "interview_start"));
        }
        let problem = self
            .progression
            .select_initial()
            .ok_or_else(|| SageError::new("No problems available", "interview_start"))?;

        self.view = ViewState::Ongoing;
        Ok(self.begin(problem))
    }

    fn begin(&mut self, problem: Problem) -> &HintController {
        self.current.insert(HintController::start(
            problem,
            self.collaborators.clone(),
            self.metrics.clone(),
            self.idle,
        ))
    }

    /// Submit the current problem. An assessment failure keeps the candidate on it.
    pub async fn submit(&mut self, code: String, language: &str) -> Result<SubmitOutcome, SageError> {
        let controller = self
            .current
            .as_ref()
            .ok_or_else(|| SageError::new("No problem in progress", "submit"))?;

        let result = controller.submit(code, language).await?;
        self.current = None;

        match self.progression.record_result(result)? {
            Progression::Next(problem) => {
                self.begin(problem.clone());
                Ok(SubmitOutcome::Next(problem))
            }
            Progression::Finished(session) => {
                if let Err(e) = self.collaborators.store.append(session.clone()).await {
                    tracing::error!(session_id = %session.id, error = %e, "Failed to persist interview session");
                }
                self.metrics.record_session_finalized();
                self.completed = Some(session.clone());
                self.view = ViewState::Completed;
                Ok(SubmitOutcome::Finished(session))
            }
        }
    }

    /// Drop the current run and reshuffle the pool for a fresh session.
    pub fn reset(&mut self) {
        if let Some(controller) = self.current.take() {
            controller.teardown();
        }
        self.progression = ProgressionController::new(ProblemPool::shuffled(&self.catalog));
        self.completed = None;
        self.view = ViewState::Landing;
        tracing::info!("Interview reset");
    }

    /// Abandon any run in progress, switch to the hiring-manager view and
    /// load every stored session, newest first.
    pub async fn open_dashboard(&mut self) -> Vec<InterviewSession> {
        self.reset();
        self.view = ViewState::HiringManager;
        load_sessions_newest_first(self.collaborators.store.as_ref()).await
    }
}
