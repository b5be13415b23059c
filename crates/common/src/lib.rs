//! Shared utilities, configuration, and error handling for PropDesk
//!
//! This crate provides common functionality used across the PropDesk service:
//! - Configuration loaded from the environment
//! - Error types and their HTTP mapping
//! - The shared state-machine error type
//! - Request extractors (validated JSON bodies, pagination)
//! - Slug generation for human-readable identifiers

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod slug;
pub mod state;

pub use config::Config;
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson};
pub use slug::slugify;
pub use state::StateError;
