//! HTTP route handlers

pub mod research_routes;

pub use research_routes::{run_research_handler, RunResearchRequest};
