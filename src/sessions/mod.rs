pub mod store;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::pipelines::assessment::QualityAssessment;
use crate::problems::problem::Problem;

pub const SESSION_ID_LENGTH: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user<S: Into<String>>(content: S) -> Self {
        ChatMessage { role: Role::User, content: content.into() }
    }

    pub fn ai<S: Into<String>>(content: S) -> Self {
        ChatMessage { role: Role::Ai, content: content.into() }
    }
}

/// One completed problem. Built once at submission and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewResult {
    pub problem: Problem,
    pub code: String,
    pub report: QualityAssessment,
    pub chat_history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: String,
    pub candidate_name: String,
    pub timestamp: DateTime<Utc>,
    pub results: Vec<InterviewResult>,
}

impl InterviewSession {
    /// Stamp a finished run with a fresh id, placeholder candidate and the current time.
    pub fn finalize(results: Vec<InterviewResult>) -> Self {
        let mut rng = rand::thread_rng();
        InterviewSession {
            id: generate_session_id(&mut rng),
            candidate_name: format!("Candidate {}", rng.gen_range(0..1000)),
            timestamp: Utc::now(),
            results,
        }
    }
}

pub fn generate_session_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(SESSION_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Sort newest first, as the dashboard shows them.
pub fn sort_newest_first(sessions: &mut [InterviewSession]) {
    sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
