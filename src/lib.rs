// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::field_reassign_with_default)] // Builder pattern is clearer

// Module declarations
pub mod config;
pub mod llm;
pub mod models;
pub mod parsers;
pub mod research;
pub mod shutdown;

// HTTP API
pub mod server;

pub use models::*;
