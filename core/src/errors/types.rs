//! Error types for key management, token issuance and token verification
//!
//! Each enum maps to one class of failure. Client-caused failures
//! ([`AuthError`], [`VerificationFailure`]) are never retried; server-side
//! faults ([`SigningFailure`], [`KeyFetchError`]) are.

use thiserror::Error;

/// Credential exchange failures at the token endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid client or resource owner credentials")]
    InvalidCredentials,

    #[error("Scope not authorized: {scope}")]
    ScopeNotAuthorized { scope: String },

    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType { grant_type: String },
}

/// Server-side failure while minting a token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningFailure {
    #[error("Signing key unavailable: {message}")]
    KeyUnavailable { message: String },

    #[error("Signing operation failed: {message}")]
    Crypto { message: String },
}

/// Reasons a bearer token is rejected
///
/// Distinguished internally for diagnostics; the HTTP layer collapses all of
/// them into one `invalid_token` response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Unknown key identifier")]
    UnknownKeyId,

    #[error("Bad signature")]
    BadSignature,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Missing required claim: {claim}")]
    MissingRequiredClaim { claim: String },
}

/// Key generation and key set failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("Invalid key size for {algorithm}: {bits} bits (minimum {minimum})")]
    InvalidKeySize {
        algorithm: String,
        bits: usize,
        minimum: usize,
    },

    #[error("Key generation failed: {message}")]
    Generation { message: String },

    #[error("Invalid key material for {kid}: {message}")]
    InvalidMaterial { kid: String, message: String },

    #[error("Duplicate key identifier: {kid}")]
    DuplicateKeyId { kid: String },
}

/// Failure fetching a key set from a [`KeySource`](crate::services::publication::KeySource)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyFetchError {
    #[error("Key source unreachable: {message}")]
    Transport { message: String },

    #[error("Key source returned status {status}")]
    Status { status: u16 },

    #[error("Key set could not be decoded: {message}")]
    Decode { message: String },

    #[error("Key source timed out")]
    Timeout,
}
