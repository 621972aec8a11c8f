//! Token endpoint result returned to clients.

use serde::{Deserialize, Serialize};

/// `token_type` of every issued token
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// A freshly minted access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuedToken {
    /// Compact JWT
    pub access_token: String,

    /// Always "Bearer"
    pub token_type: String,

    /// Seconds until the token expires
    pub expires_in: i64,

    /// Granted scopes, space-delimited
    pub scope: String,

    /// Key that signed the token
    #[serde(skip_serializing)]
    pub kid: String,
}

impl IssuedToken {
    pub fn new(access_token: String, expires_in: i64, scope: String, kid: String) -> Self {
        Self {
            access_token,
            token_type: BEARER_TOKEN_TYPE.to_string(),
            expires_in,
            scope,
            kid,
        }
    }
}
