//! # Infrastructure Layer
//!
//! Concrete implementations of the seams defined in `kg_core`:
//! - **JWKS**: [`HttpKeySource`] fetches a remote JWKS document for the
//!   verifier's key set cache
//! - **Memory**: credential stores built from configured client and
//!   resource owner registrations

// Re-export core types for convenience
pub use kg_core::errors::*;

/// Remote key set source
pub mod jwks;

/// In-memory credential stores
pub mod memory;

pub use jwks::HttpKeySource;
pub use memory::{InMemoryClientRepository, InMemoryResourceOwnerRepository};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
