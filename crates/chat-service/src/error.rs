//! # Service Errors
//!
//! Failures raised by the platform library arrive as [`ServiceError::Platform`]
//! carrying the original [`serenity::Error`]. The remaining variants are
//! raised before any request is made.

use tokio::runtime::TryCurrentError;

/// Errors returned by service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The platform library rejected or failed the request.
    #[error("Platform request failed: {0}")]
    Platform(#[from] serenity::Error),

    /// A resource that was known a moment ago is gone.
    #[error("Unknown {kind}: {id}")]
    Unknown { kind: &'static str, id: u64 },

    /// An argument was rejected before any request was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A background task was requested outside a Tokio runtime.
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(#[from] TryCurrentError),

    /// The configured bot token variable is not set.
    #[error("Environment variable {var} is not set")]
    MissingToken { var: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type
pub type Result<T> = std::result::Result<T, ServiceError>;
