use std::collections::HashSet;

use crate::error::SageError;
use crate::problems::problem::{Difficulty, Problem};
use crate::problems::selector::{is_good_performance, next_difficulty, ProblemPool};
use crate::sessions::{InterviewResult, InterviewSession};

/// A session ends after this many completed problems, whatever the performance.
pub const MAX_PROBLEMS_PER_SESSION: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progression {
    Next(Problem),
    Finished(InterviewSession),
}

/// Chooses the next problem from completed results, or ends the interview.
/// Pure in-memory logic; persisting the finished session is the caller's job.
#[derive(Debug)]
pub struct ProgressionController {
    pool: ProblemPool,
    seen: HashSet<String>,
    results: Vec<InterviewResult>,
    current: Option<Problem>,
    finished: bool,
}

impl ProgressionController {
    pub fn new(pool: ProblemPool) -> Self {
        ProgressionController {
            pool,
            seen: HashSet::new(),
            results: Vec::new(),
            current: None,
            finished: false,
        }
    }

    pub fn results(&self) -> &[InterviewResult] {
        &self.results
    }

    pub fn current(&self) -> Option<&Problem> {
        self.current.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// First unseen easy problem in pool order, else any unseen problem.
    /// `None` when the pool is exhausted.
    pub fn select_initial(&mut self) -> Option<Problem> {
        if self.finished {
            return None;
        }
        let problem = self.pool.pick_unseen(&self.seen, Some(Difficulty::Easy)).cloned()?;
        self.present(problem.clone());
        Some(problem)
    }

    /// Append the result for the current problem and decide what comes next.
    pub fn record_result(&mut self, result: InterviewResult) -> Result<Progression, SageError> {
        if self.finished {
            return Err(SageError::new("Interview already finished", "progression"));
        }
        match &self.current {
            Some(current) if current.title == result.problem.title => {}
            _ => {
                return Err(SageError::new(
                    format!("'{}' is not the problem being solved", result.problem.title),
                    "progression",
                ));
            }
        }

        self.current = None;
        self.results.push(result);

        match self.select_next() {
            Some(problem) => {
                self.present(problem.clone());
                Ok(Progression::Next(problem))
            }
            None => Ok(Progression::Finished(self.finalize())),
        }
    }

    fn select_next(&self) -> Option<Problem> {
        if self.results.len() >= MAX_PROBLEMS_PER_SESSION {
            return None;
        }

        let last = self.results.last()?;
        let good = is_good_performance(&last.report);
        let difficulty = next_difficulty(last.problem.difficulty, good);

        tracing::info!(
            last = %last.problem.difficulty,
            good_performance = good,
            next = %difficulty,
            "Selecting next problem"
        );

        let next = self.pool.pick_unseen(&self.seen, Some(difficulty)).cloned();
        if next.is_none() {
            tracing::info!(completed = self.results.len(), "Problem pool exhausted");
        }
        next
    }

    fn present(&mut self, problem: Problem) {
        self.seen.insert(problem.title.clone());
        self.current = Some(problem);
    }

    fn finalize(&mut self) -> InterviewSession {
        self.finished = true;
        let session = InterviewSession::finalize(self.results.clone());
        tracing::info!(
            session_id = %session.id,
            results = session.results.len(),
            "Interview finalized"
        );
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::assessment::QualityAssessment;

    fn problem(title: &str, difficulty: Difficulty) -> Problem {
        Problem {
            title: title.to_string(),
            description: String::new(),
            initial_code: String::new(),
            difficulty,
        }
    }

    fn report(good: bool) -> QualityAssessment {
        QualityAssessment {
            style: if good { "Good code" } else { "Messy" }.to_string(),
            readability: "ok".to_string(),
            adherence: "ok".to_string(),
            problem_solving: "very effective".to_string(),
            suggestions: "none".to_string(),
        }
    }

    fn result(problem: Problem, good: bool) -> InterviewResult {
        InterviewResult {
            problem,
            code: "pass".to_string(),
            report: report(good),
            chat_history: Vec::new(),
        }
    }

    fn full_pool() -> ProblemPool {
        ProblemPool::in_order(vec![
            problem("E1", Difficulty::Easy),
            problem("E2", Difficulty::Easy),
            problem("M1", Difficulty::Medium),
            problem("M2", Difficulty::Medium),
            problem("H1", Difficulty::Hard),
            problem("H2", Difficulty::Hard),
        ])
    }

    #[test]
    fn test_transition_table_drives_second_problem() {
        let cases = [
            ("E1", true, Difficulty::Medium),
            ("E1", false, Difficulty::Easy),
            ("M1", true, Difficulty::Hard),
            ("M1", false, Difficulty::Medium),
            ("H1", true, Difficulty::Hard),
            ("H1", false, Difficulty::Medium),
        ];

        for (first, good, expected) in cases {
            let pool = full_pool();
            let start = pool.problems().iter().find(|p| p.title == first).cloned().unwrap();
            let mut controller = ProgressionController::new(pool);
            controller.present(start.clone());

            match controller.record_result(result(start, good)).unwrap() {
                Progression::Next(next) => {
                    assert_eq!(next.difficulty, expected, "after {} good={}", first, good);
                    assert_ne!(next.title, first);
                }
                other => panic!("expected a next problem, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_cap_finalizes_after_two_results() {
        let mut controller = ProgressionController::new(full_pool());
        let first = controller.select_initial().unwrap();
        assert_eq!(first.title, "E1");

        let Progression::Next(second) = controller.record_result(result(first, true)).unwrap() else {
            panic!("expected a second problem");
        };

        match controller.record_result(result(second, true)).unwrap() {
            Progression::Finished(session) => {
                assert_eq!(session.results.len(), MAX_PROBLEMS_PER_SESSION);
                assert_ne!(session.results[0].problem.title, session.results[1].problem.title);
            }
            other => panic!("expected finish, got {:?}", other),
        }
        assert!(controller.is_finished());
        assert!(controller.select_initial().is_none());
    }

    #[test]
    fn test_exhausted_pool_finishes_early() {
        let mut controller = ProgressionController::new(ProblemPool::in_order(vec![problem("Only", Difficulty::Hard)]));
        let only = controller.select_initial().unwrap();

        match controller.record_result(result(only, false)).unwrap() {
            Progression::Finished(session) => assert_eq!(session.results.len(), 1),
            other => panic!("expected finish, got {:?}", other),
        }
    }

    #[test]
    fn test_falls_back_to_any_unseen_difficulty() {
        let pool = ProblemPool::in_order(vec![
            problem("E1", Difficulty::Easy),
            problem("H1", Difficulty::Hard),
        ]);
        let mut controller = ProgressionController::new(pool);
        let first = controller.select_initial().unwrap();

        // Wants medium, none exists.
        let Progression::Next(next) = controller.record_result(result(first, true)).unwrap() else {
            panic!("expected fallback problem");
        };
        assert_eq!(next.title, "H1");
    }

    #[test]
    fn test_rejects_result_for_other_problem() {
        let mut controller = ProgressionController::new(full_pool());
        controller.select_initial().unwrap();

        let err = controller
            .record_result(result(problem("M1", Difficulty::Medium), true))
            .unwrap_err();
        assert_eq!(err.stage, "progression");
        assert!(controller.results().is_empty());
    }
}
