//! Error types for askdoc.
//!
//! This module defines a unified error enum covering every error category
//! in the workspace: configuration, I/O, the two external capabilities
//! (document index and language model), prompts, and serialization.

use thiserror::Error;

/// Unified error type for askdoc.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Errors are propagated, never panicked on.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing has been indexed at all. This is a batch precondition
    /// failure, surfaced once before any workflow session runs.
    #[error("No documents have been indexed yet. Run 'askdoc ingest' first.")]
    IndexNotReady,

    /// An external capability (document index or language model) was
    /// unreachable or returned an error. Per-session; the workflow engine
    /// does not retry.
    #[error("Capability unavailable: {0}")]
    Capability(String),

    /// The language model produced output that violates its contract:
    /// a relevance grade outside the two allowed values, or a rewrite or
    /// answer that is empty or multi-valued. Never coerced or defaulted.
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    /// Document store and ingestion errors
    #[error("Index error: {0}")]
    Index(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
