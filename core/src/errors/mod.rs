//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{AuthError, KeyError, KeyFetchError, SigningFailure, VerificationFailure};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Signing(#[from] SigningFailure),

    #[error(transparent)]
    Verification(#[from] VerificationFailure),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    KeyFetch(#[from] KeyFetchError),
}

impl DomainError {
    /// Whether the caller's transport layer may retry the request
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Signing(_) | DomainError::KeyFetch(_))
    }

    /// Whether the error was caused by the client's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, DomainError::Auth(_) | DomainError::Verification(_))
    }
}
