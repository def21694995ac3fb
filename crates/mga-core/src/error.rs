//! Centralized error types for the model graph analyzer.

use thiserror::Error;

/// Main error type for model graph operations.
#[derive(Error, Debug)]
pub enum MgaError {
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid host and port '{0}'")]
    InvalidHostAndPort(String),

    #[error("Port out of range: {0}")]
    PortOutOfRange(String),

    #[error("Invalid version '{0}': expected <major>.<minor>.<patch>")]
    InvalidVersion(String),
}

/// Result type for model graph operations.
pub type MgaResult<T> = Result<T, MgaError>;

impl MgaError {
    /// Create an invalid address error.
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }
}
