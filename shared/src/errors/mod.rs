//! OAuth2 error response structures

use serde::{Deserialize, Serialize};

/// Error body returned by the token endpoint and protected resources
/// (RFC 6749 section 5.2, RFC 6750 section 3.1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl OAuthErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: Some(description.into()),
        }
    }

    /// Create an error response without a description
    pub fn code(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: None,
        }
    }
}

/// OAuth2 error codes used across the application
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const INVALID_CLIENT: &str = "invalid_client";
    pub const INVALID_SCOPE: &str = "invalid_scope";
    pub const UNSUPPORTED_GRANT_TYPE: &str = "unsupported_grant_type";
    pub const INVALID_TOKEN: &str = "invalid_token";
    pub const INSUFFICIENT_SCOPE: &str = "insufficient_scope";
    pub const SERVER_ERROR: &str = "server_error";
    pub const NOT_FOUND: &str = "not_found";
}
