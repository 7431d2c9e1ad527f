pub mod problem;
pub mod selector;
