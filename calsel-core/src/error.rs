//! Error types for the calsel ecosystem.

use thiserror::Error;

/// Errors that can occur in calsel operations.
#[derive(Error, Debug)]
pub enum CalselError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service reported failure: {0}")]
    Service(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Host bridge error: {0}")]
    Host(String),

    #[error("Host bridge '{0}' not found in PATH")]
    HostNotInstalled(String),

    #[error("Host bridge request timed out after {0}s")]
    HostTimeout(u64),

    #[error("Invalid preset document: {0}")]
    InvalidImport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for calsel operations.
pub type CalselResult<T> = Result<T, CalselError>;
