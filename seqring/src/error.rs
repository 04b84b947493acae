//! Error types and handling for the seqring library

use thiserror::Error;

/// Result type alias for seqring operations
pub type Result<T> = std::result::Result<T, SeqringError>;

/// Main error type for the seqring library
///
/// Errors are raised only at construction and setup time. The hot path
/// (`write`, `write_with`, `try_read`) never fails and never panics.
#[derive(Error, Debug)]
pub enum SeqringError {
    /// I/O errors from the OS mapping layer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ring storage allocation failed
    #[error("allocation failed: {message}")]
    Allocation {
        /// Error message including the OS errno text
        message: String,
    },

    /// Invalid configuration parameter
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message describing the configuration issue
        message: String,
    },

    /// System resource errors (CPU affinity, memory locking)
    #[error("system resource error: {message}")]
    SystemResource {
        /// Error message describing the system resource issue
        message: String,
    },
}

impl SeqringError {
    /// Create a new allocation error
    pub fn allocation(message: impl Into<String>) -> Self {
        Self::Allocation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new system resource error
    pub fn system_resource(message: impl Into<String>) -> Self {
        Self::SystemResource {
            message: message.into(),
        }
    }

    /// Check if this error is related to memory or OS resources
    pub fn is_system_resource_error(&self) -> bool {
        matches!(self, Self::Allocation { .. } | Self::SystemResource { .. } | Self::Io(_))
    }
}
