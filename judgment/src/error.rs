//! Judgment error types
//!
//! Three families:
//! - [`JudgeError`]: input-contract violations that reject a request. Always
//!   fatal, never retried, and surfaced to the caller as an error envelope.
//! - [`ThresholdConfigError`]: problems with the default-threshold blob. Only
//!   ever logged; the resolver degrades to the built-in table.
//! - [`ConfigError`]: process settings the agent cannot start with.
//!
//! A model that misses its acceptance criteria is a normal outcome
//! (retry/abort) and is never represented here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for judgment operations
pub type JudgeResult<T> = Result<T, JudgeError>;

/// Errors that reject a judgment request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JudgeError {
    /// Issue-tracker URL failed the strict pattern check
    #[error("Invalid issue tracker URL: {url}")]
    InvalidIssueUrl { url: String },

    /// Task type is not one of the supported categories
    #[error("Unknown task_type: {task_type}")]
    UnsupportedTaskType { task_type: String },

    /// Request body could not be decoded into a judgment request
    #[error("Malformed judgment request: {message}")]
    MalformedRequest { message: String },
}

impl JudgeError {
    /// Machine-readable error code for the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIssueUrl { .. } => "INVALID_ISSUE_URL",
            Self::UnsupportedTaskType { .. } => "UNSUPPORTED_TASK_TYPE",
            Self::MalformedRequest { .. } => "MALFORMED_REQUEST",
        }
    }

    /// Whether the orchestrator may retry the same request.
    ///
    /// Every variant is an input-contract violation, so re-sending the same
    /// request can never succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

impl From<serde_json::Error> for JudgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedRequest {
            message: err.to_string(),
        }
    }
}

/// Errors raised while loading a default-threshold override
#[derive(Error, Debug)]
pub enum ThresholdConfigError {
    /// Threshold file could not be read
    #[error("Failed to read threshold file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Blob is not valid JSON of the expected shape
    #[error("Invalid threshold JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// File is not valid TOML of the expected shape
    #[error("Invalid threshold TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A threshold is NaN or infinite
    #[error("Threshold {task_type}.{key} is not a finite number")]
    NonFinite { task_type: String, key: String },
}

/// Errors raised while building an agent from process configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Issue-tracker host cannot appear in an issue URL
    #[error("Invalid issue tracker host {host:?}: {reason}")]
    InvalidIssueHost { host: String, reason: &'static str },

    /// URL pattern for the host failed to compile
    #[error("Failed to build issue URL pattern for host {host}: {source}")]
    IssuePattern {
        host: String,
        #[source]
        source: regex::Error,
    },
}
