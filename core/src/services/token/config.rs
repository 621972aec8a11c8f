//! Configuration for the token issuer

use kg_shared::config::TokenConfig;

/// Configuration for the token issuer
#[derive(Debug, Clone)]
pub struct TokenIssuerConfig {
    /// `iss` claim
    pub issuer: String,
    /// Optional `aud` claim
    pub audience: Option<String>,
    /// Access token lifetime in seconds
    pub access_token_lifetime: i64,
    /// bcrypt cost of the decoy hash checked when a client or user is unknown;
    /// keep it equal to the cost of the registered hashes
    pub credential_hash_cost: u32,
}

impl Default for TokenIssuerConfig {
    fn default() -> Self {
        Self {
            issuer: "keygate".to_string(),
            audience: None,
            access_token_lifetime: 900, // 15 minutes
            credential_hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl From<&TokenConfig> for TokenIssuerConfig {
    fn from(config: &TokenConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_lifetime: config.access_token_lifetime,
            ..Self::default()
        }
    }
}
