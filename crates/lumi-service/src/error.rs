//! Errors reported by color-management service backends.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can occur while talking to a color-management service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Device id unknown to the service.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Profile id unknown to the service.
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// Profile exists but has no file behind it.
    #[error("profile {0} has no backing file")]
    NoBackingFile(String),

    /// The service refused to import a profile.
    #[error("import of {path} rejected: {reason}")]
    ImportRejected {
        /// File that was offered for import.
        path: PathBuf,
        /// Why it was refused.
        reason: String,
    },

    /// Display discovery failed.
    #[error("device discovery failed: {0}")]
    Discovery(String),

    /// ICC parsing or encoding error.
    #[error("ICC error: {0}")]
    Icc(#[from] lumi_icc::IccError),

    /// Registry (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
