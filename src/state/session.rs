use serde::{Deserialize, Serialize};

/// Which screen the interview driver is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewState {
    /// Nothing started yet
    #[default]
    Landing,
    /// A problem is being solved
    Ongoing,
    /// The session finished and its report is available
    Completed,
    /// Read-only view over every stored session
    HiringManager,
}

impl ViewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewState::Landing => "landing",
            ViewState::Ongoing => "ongoing",
            ViewState::Completed => "completed",
            ViewState::HiringManager => "hiring_manager",
        }
    }
}
