//! Configuration for the token verifier and its key set cache

use std::time::Duration;

use kg_shared::config::AuthConfig;

/// Claim checks applied after the signature verifies
#[derive(Debug, Clone)]
pub struct TokenVerifierConfig {
    /// Seconds a token is still accepted past its `exp`
    pub clock_skew: i64,
    /// `iss` every token must carry; `None` accepts any issuer
    pub expected_issuer: Option<String>,
    /// Claims that must be present
    pub required_claims: Vec<String>,
}

impl Default for TokenVerifierConfig {
    fn default() -> Self {
        Self {
            clock_skew: 60,
            expected_issuer: None,
            required_claims: ["sub", "iss", "iat", "exp", "scope"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl TokenVerifierConfig {
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    pub fn with_clock_skew(mut self, seconds: i64) -> Self {
        self.clock_skew = seconds;
        self
    }
}

impl From<&AuthConfig> for TokenVerifierConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            clock_skew: config.token.clock_skew,
            expected_issuer: config.verifier.expected_issuer.clone(),
            required_claims: config.verifier.required_claims.clone(),
        }
    }
}

/// Freshness policy of the key set cache
#[derive(Debug, Clone)]
pub struct KeySetCacheConfig {
    /// Age after which a cached key set is refreshed
    pub ttl: Duration,
    /// Age after which a cached key set is no longer used, even as a fallback
    pub max_stale: Duration,
    /// Minimum gap between fetch attempts
    pub min_refresh_interval: Duration,
    /// Upper bound on a single fetch
    pub fetch_timeout: Duration,
}

impl Default for KeySetCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_stale: Duration::from_secs(3600),
            min_refresh_interval: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&AuthConfig> for KeySetCacheConfig {
    fn from(config: &AuthConfig) -> Self {
        let verifier = &config.verifier;
        Self {
            ttl: Duration::from_secs(verifier.cache_ttl),
            max_stale: Duration::from_secs(verifier.max_stale.max(verifier.cache_ttl)),
            min_refresh_interval: Duration::from_secs(verifier.min_refresh_interval),
            fetch_timeout: Duration::from_secs(verifier.fetch_timeout),
        }
    }
}
