pub mod assessment;
pub mod complexity;
pub mod hinting;
pub mod ollama;
pub mod ollama_utils;
pub mod perf;
pub mod router;
pub mod summary;
