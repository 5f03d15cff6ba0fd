//! Core types and shared functionality for campus.
//!
//! This crate provides:
//! - Resource keys and payload models
//! - In-memory resource cache with request deduplication
//! - Unified error types
//! - Configuration structures
//! - Presentation state machines used by the site's sections

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod models;
pub mod ui;

pub use cache::{CacheEntry, EntryState, ResourceCache};
pub use config::{AppConfig, ConfigError, Environment, FallbackOrder, UnauthorizedPolicy};
pub use error::{Error, ErrorKind, QueryError};
pub use key::ResourceKey;

/// Result of a single query: the decoded JSON body, or a structured failure.
pub type FetchOutcome = Result<serde_json::Value, QueryError>;
