mod cache;
mod circuit_breaker;
pub mod config;
pub mod console;
pub mod error;
pub mod interview;
mod logging;
pub mod metrics;
pub mod models;
pub mod pipelines;
pub mod problems;
pub mod report;
pub mod routes;
pub mod sessions;
pub mod speech;
pub mod state;

use std::path::PathBuf;

use anyhow::Context;

use crate::interview::Collaborators;
use crate::problems::problem::Problem;
use crate::state::app::AppState;

/// What the binary was asked to do.
#[derive(Debug, Clone)]
pub enum Mode {
    Interview {
        language: Option<String>,
        catalog: Option<PathBuf>,
    },
    Dashboard,
}

pub fn run(mode: Mode) -> anyhow::Result<()> {
    let config = config::settings::get_config().clone();

    // Initialize structured logging first
    logging::init_logging(&config.log_level);
    tracing::info!(mode = ?mode, "codesage starting");

    let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    rt.block_on(async move {
        let catalog_path = match &mode {
            Mode::Interview { catalog, .. } => catalog.clone(),
            Mode::Dashboard => None,
        };
        let catalog = Problem::load_catalog(catalog_path.as_deref()).await?;
        tracing::info!(problems = catalog.len(), "Problem catalog ready");

        let state = AppState::new(config, catalog);
        let collaborators = Collaborators::local(&state);

        // Warm up models in background (non-blocking)
        let models = state.config.models.clone();
        tokio::spawn(async move {
            models::warmup::warmup_models(&models).await;
        });

        let result = match mode {
            Mode::Interview { language, .. } => {
                let language = language.unwrap_or_else(|| state.config.interview.default_language.clone());
                console::run_interview(&state, collaborators, language).await
            }
            Mode::Dashboard => console::run_dashboard(&state, collaborators).await,
        };

        tracing::info!(metrics = ?routes::get_metrics(&state), "codesage exiting");
        result
    })
}
