//! Command handlers - extracted from main.rs for testability
//!
//! Each handler module contains:
//! - The execution logic for a CLI command
//! - Pure rendering helpers
//! - Comprehensive tests

pub mod api;
pub mod load;
pub mod pages;

// Re-export handlers for convenient access
pub use api::{execute_api, render_api_report};
pub use load::{execute_load, render_load_report};
pub use pages::{execute_pages, render_pages_json, render_pages_report};
