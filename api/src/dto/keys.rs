use serde::{Deserialize, Serialize};
use validator::Validate;

/// Optional body of `POST /admin/keys/rotate`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RotateKeyRequest {
    /// Algorithm of the new key; defaults to the current key's algorithm
    #[serde(default)]
    #[validate(length(min = 1, max = 16))]
    pub algorithm: Option<String>,
}

/// Outcome of a rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateKeyResponse {
    pub kid: String,
    pub algorithm: String,
    pub previous_kid: String,
}
