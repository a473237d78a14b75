//! Route handlers organized by resource

pub mod common;
pub mod health;
pub mod metrics;
pub mod resources;
pub mod static_files;
