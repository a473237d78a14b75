//! Command implementations for the hospital CLI

pub mod migrate;
pub mod serve;

// Re-export main dispatcher functions for flat access from main.rs
pub use migrate::{run_migrate, run_schema};
pub use serve::run_serve;
