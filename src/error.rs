//! # Errors
//!
//! The facade has one failure mode of its own: being asked to wrap a resource
//! that is not there. Everything else is a [`ServiceError`] raised by the
//! wrapped client and handed back untouched.

pub use chat_service::{Result, ServiceError};

/// Errors raised by the abstraction layer itself.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AbstractionError {
    /// A wrapper was constructed from an absent resource.
    #[error("Cannot wrap a missing {kind}")]
    MissingResource { kind: &'static str },
}
