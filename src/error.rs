//! Error types for QA notification.

use std::path::PathBuf;

/// Top-level error type for a notification run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Configuration-related errors. All of these abort the run before any
/// report is processed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Could not read {}: {reason}", path.display())]
    Table { path: PathBuf, reason: String },

    #[error("Could not resolve the host name: {0}")]
    HostName(String),
}

/// Report discovery and parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Reports directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Could not read report {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse report {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

/// Errors writing rendered documents.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Mail transport errors. These abort the remaining run.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid {field} address {address}: {reason}")]
    InvalidAddress {
        field: &'static str,
        address: String,
        reason: String,
    },

    #[error("Failed to build message for {recipient}: {reason}")]
    Build { recipient: String, reason: String },

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("Failed to send notification to {recipient}: {reason}")]
    SendFailed { recipient: String, reason: String },
}

/// Result type alias for notification runs.
pub type Result<T> = std::result::Result<T, Error>;
