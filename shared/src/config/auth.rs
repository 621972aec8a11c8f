//! Token, key and verifier configuration

use serde::{Deserialize, Serialize};

/// Token issuance configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// `iss` claim written into every token
    pub issuer: String,

    /// Optional `aud` claim
    #[serde(default)]
    pub audience: Option<String>,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime: i64,

    /// Clock skew tolerated when checking `exp`, in seconds
    #[serde(default = "default_clock_skew")]
    pub clock_skew: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: String::from("keygate"),
            audience: None,
            access_token_lifetime: default_access_token_lifetime(),
            clock_skew: default_clock_skew(),
        }
    }
}

impl TokenConfig {
    /// Create a token configuration for an issuer
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            ..Default::default()
        }
    }

    /// Set access token lifetime in minutes
    pub fn with_lifetime_minutes(mut self, minutes: i64) -> Self {
        self.access_token_lifetime = minutes * 60;
        self
    }

    /// Longest time a token signed now can still be accepted
    pub fn max_token_age(&self) -> i64 {
        self.access_token_lifetime + self.clock_skew
    }
}

/// Signing key configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyConfig {
    /// Algorithm of the initial signing key (HS256, RS256, EdDSA)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// RSA modulus size or HMAC secret size in bits
    #[serde(default = "default_key_size")]
    pub key_size: usize,

    /// How key identifiers are assigned ("random" or "sequential")
    #[serde(default = "default_kid_strategy")]
    pub kid_strategy: String,

    /// Seconds a retired key keeps verifying; defaults to the max token age
    #[serde(default)]
    pub rotation_grace_period: Option<i64>,

    /// Rotate the current key once it is this many seconds old (0 = never)
    #[serde(default)]
    pub rotation_interval: u64,

    /// How often the maintenance task runs, in seconds
    #[serde(default = "default_maintenance_interval")]
    pub maintenance_interval: u64,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            key_size: default_key_size(),
            kid_strategy: default_kid_strategy(),
            rotation_grace_period: None,
            rotation_interval: 0,
            maintenance_interval: default_maintenance_interval(),
        }
    }
}

/// Resource-server side verification settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifierConfig {
    /// Remote JWKS document; when unset the verifier uses the local key manager
    #[serde(default)]
    pub jwks_url: Option<String>,

    /// Key set cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    /// How long a stale key set may serve while the source is failing
    #[serde(default = "default_max_stale")]
    pub max_stale: u64,

    /// Minimum seconds between forced refreshes triggered by unknown kids
    #[serde(default = "default_min_refresh_interval")]
    pub min_refresh_interval: u64,

    /// Remote fetch timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Expected `iss`; unset disables the issuer check
    #[serde(default)]
    pub expected_issuer: Option<String>,

    /// Claims every token must carry
    #[serde(default = "default_required_claims")]
    pub required_claims: Vec<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            jwks_url: None,
            cache_ttl: default_cache_ttl(),
            max_stale: default_max_stale(),
            min_refresh_interval: default_min_refresh_interval(),
            fetch_timeout: default_fetch_timeout(),
            expected_issuer: None,
            required_claims: default_required_claims(),
        }
    }
}

/// A registered OAuth2 client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientRegistration {
    pub client_id: String,

    /// bcrypt hash of the client secret
    pub secret_hash: String,

    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default = "default_grant_types")]
    pub grant_types: Vec<String>,
}

/// A resource owner allowed to use the password grant
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceOwnerRegistration {
    pub username: String,

    /// bcrypt hash of the password
    pub password_hash: String,

    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub token: TokenConfig,

    #[serde(default)]
    pub keys: KeyConfig,

    #[serde(default)]
    pub verifier: VerifierConfig,

    #[serde(default)]
    pub clients: Vec<ClientRegistration>,

    #[serde(default)]
    pub users: Vec<ResourceOwnerRegistration>,
}

impl AuthConfig {
    /// Grace period for retired keys, falling back to the max token age
    pub fn rotation_grace_period(&self) -> i64 {
        self.keys
            .rotation_grace_period
            .unwrap_or_else(|| self.token.max_token_age())
    }
}

fn default_access_token_lifetime() -> i64 {
    900 // 15 minutes
}

fn default_clock_skew() -> i64 {
    60
}

fn default_algorithm() -> String {
    String::from("RS256")
}

fn default_key_size() -> usize {
    2048
}

fn default_kid_strategy() -> String {
    String::from("random")
}

fn default_maintenance_interval() -> u64 {
    300
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

fn default_max_stale() -> u64 {
    3600
}

fn default_min_refresh_interval() -> u64 {
    5
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_required_claims() -> Vec<String> {
    ["sub", "iss", "iat", "exp", "scope"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_grant_types() -> Vec<String> {
    vec![String::from("client_credentials")]
}
