//! Error types for storage layout reporting
//!
//! Provides structured error types for host introspection, snapshot
//! loading, configuration and the REST surface.

use axum::http::StatusCode;
use thiserror::Error;

/// Unified error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Introspection Errors
    // =========================================================================
    #[error("Command failed: {command} - {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Failed to parse {source_name} output: {reason}")]
    OutputParse { source_name: String, reason: String },

    #[error("Inspection not supported on platform: {platform}")]
    UnsupportedPlatform { platform: String },

    // =========================================================================
    // Snapshot Errors
    // =========================================================================
    #[error("Snapshot not found: {path}")]
    SnapshotNotFound { path: String },

    #[error("Invalid snapshot {path}: {reason}")]
    InvalidSnapshot { path: String, reason: String },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status to report for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Configuration(_) | Error::InvalidSnapshot { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::SnapshotNotFound { .. } => StatusCode::NOT_FOUND,
            Error::UnsupportedPlatform { .. } => StatusCode::NOT_IMPLEMENTED,
            Error::CommandFailed { .. } | Error::OutputParse { .. } => StatusCode::BAD_GATEWAY,
            Error::Io(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Internal(_) | Error::JsonParse(_) | Error::YamlParse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Error::Internal(_) => "internal",
            Error::Configuration(_) => "configuration",
            Error::CommandFailed { .. } => "command_failed",
            Error::OutputParse { .. } => "output_parse",
            Error::UnsupportedPlatform { .. } => "unsupported_platform",
            Error::SnapshotNotFound { .. } => "snapshot_not_found",
            Error::InvalidSnapshot { .. } => "invalid_snapshot",
            Error::JsonParse(_) => "json_parse",
            Error::YamlParse(_) => "yaml_parse",
            Error::Io(_) => "io",
        }
    }

    /// Check if retrying the same collection may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::CommandFailed { .. } | Error::Io(_))
    }
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;
