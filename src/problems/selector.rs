use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::pipelines::assessment::QualityAssessment;
use crate::problems::problem::{Difficulty, Problem};

/// Suggestions at or above this many characters count against the candidate.
pub const SUGGESTIONS_LENGTH_LIMIT: usize = 150;

/// The session's problem pool, shuffled once when the session starts.
#[derive(Debug, Clone)]
pub struct ProblemPool {
    problems: Vec<Problem>,
}

impl ProblemPool {
    pub fn shuffled(problems: &[Problem]) -> Self {
        Self::shuffled_with(problems, &mut rand::thread_rng())
    }

    pub fn shuffled_with<R: Rng + ?Sized>(problems: &[Problem], rng: &mut R) -> Self {
        let mut problems = problems.to_vec();
        problems.shuffle(rng);
        ProblemPool { problems }
    }

    /// Keep catalog order as-is.
    pub fn in_order(problems: Vec<Problem>) -> Self {
        ProblemPool { problems }
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// First unseen problem in pool order matching `difficulty`, falling back
    /// to the first unseen problem of any difficulty.
    pub fn pick_unseen(&self, seen: &HashSet<String>, difficulty: Option<Difficulty>) -> Option<&Problem> {
        let mut available = self.problems.iter().filter(|p| !seen.contains(&p.title));

        if let Some(difficulty) = difficulty {
            if let Some(found) = available.clone().find(|p| p.difficulty == difficulty) {
                return Some(found);
            }
            tracing::debug!(
                difficulty = %difficulty,
                seen = seen.len(),
                "No unseen problem at requested difficulty, falling back"
            );
        }

        available.next()
    }

    pub fn select_initial(&self) -> Option<&Problem> {
        self.pick_unseen(&HashSet::new(), Some(Difficulty::Easy))
    }
}

/// Coarse textual heuristic over free-form assessment text: good style,
/// an effective approach, and short suggestions. Prompt wording drift will
/// move it in both directions.
pub fn is_good_performance(report: &QualityAssessment) -> bool {
    report.style.to_lowercase().contains("good")
        && report.problem_solving.to_lowercase().contains("effective")
        && report.suggestions.chars().count() < SUGGESTIONS_LENGTH_LIMIT
}

pub fn next_difficulty(last: Difficulty, good_performance: bool) -> Difficulty {
    match (last, good_performance) {
        (Difficulty::Easy, true) => Difficulty::Medium,
        (Difficulty::Easy, false) => Difficulty::Easy,
        (Difficulty::Medium, true) => Difficulty::Hard,
        (Difficulty::Medium, false) => Difficulty::Medium,
        (Difficulty::Hard, true) => Difficulty::Hard,
        (Difficulty::Hard, false) => Difficulty::Medium,
    }
}
