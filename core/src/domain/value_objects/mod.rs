//! Value objects representing immutable domain concepts.

pub mod issued_token;
pub mod scope;
pub mod verification_result;

// Re-export commonly used types
pub use issued_token::{IssuedToken, BEARER_TOKEN_TYPE};
pub use verification_result::VerificationResult;
