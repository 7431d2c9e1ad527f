use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::SageError;

const BUILTIN_CATALOG: &str = include_str!("../../problems/problems.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coding problem. `title` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub title: String,
    pub description: String,
    pub initial_code: String,
    pub difficulty: Difficulty,
}

#[derive(Deserialize)]
struct CatalogFile {
    problems: Vec<Problem>,
}

impl Problem {
    /// Parse a catalog document of the form `{"problems": [...]}`.
    /// Duplicate titles are rejected since titles key the no-repeat rule.
    pub fn parse_catalog(content: &str) -> Result<Vec<Problem>, SageError> {
        let catalog: CatalogFile = serde_json::from_str(content)
            .map_err(|e| SageError::new(
                format!("Failed to parse problem catalog: {}", e),
                "catalog"
            ))?;

        let mut titles = HashSet::new();
        for problem in &catalog.problems {
            if !titles.insert(problem.title.as_str()) {
                return Err(SageError::new(
                    format!("Duplicate problem title '{}'", problem.title),
                    "catalog"
                ));
            }
        }

        if catalog.problems.is_empty() {
            return Err(SageError::new("Problem catalog is empty", "catalog"));
        }

        Ok(catalog.problems)
    }

    /// The catalog compiled into the binary.
    pub fn builtin_catalog() -> Result<Vec<Problem>, SageError> {
        Self::parse_catalog(BUILTIN_CATALOG)
    }

    /// Load a catalog from disk, or the built-in one when no path is given.
    pub async fn load_catalog(path: Option<&Path>) -> Result<Vec<Problem>, SageError> {
        let Some(path) = path else {
            return Self::builtin_catalog();
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SageError::new(
                format!("Failed to read problem catalog: {}", e),
                "io"
            ).with_context(format!("path: {:?}", path)))?;

        let problems = Self::parse_catalog(&content)?;
        tracing::info!(path = ?path, count = problems.len(), "Loaded problem catalog");
        Ok(problems)
    }
}
