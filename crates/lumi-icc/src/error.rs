//! ICC error types.

use thiserror::Error;

/// Result type for ICC operations.
pub type IccResult<T> = Result<T, IccError>;

/// Errors that can occur during ICC operations.
#[derive(Debug, Error)]
pub enum IccError {
    /// Failed to load profile from file.
    #[error("failed to load profile: {0}")]
    LoadFailed(String),

    /// Failed to serialize profile.
    #[error("failed to serialize profile: {0}")]
    SaveFailed(String),

    /// Invalid profile data.
    #[error("invalid profile data: {0}")]
    InvalidProfile(String),

    /// A tag could not be written.
    #[error("failed to write '{tag}' tag")]
    TagWriteFailed {
        /// Tag name.
        tag: &'static str,
    },

    /// Metadata key or value that cannot be stored.
    ///
    /// Keys must be non-empty and free of `=`; neither may contain newlines.
    #[error("invalid metadata entry: {0:?}")]
    InvalidMetadata(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
