use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kg_core::domain::entities::KeySet;
use kg_core::errors::KeyFetchError;
use kg_core::services::publication::{JwkSet, KeySource};
use kg_shared::config::VerifierConfig;
use reqwest::header::ACCEPT;
use tracing::{debug, info, warn};

use crate::InfrastructureError;

/// Fetches a JWKS document from a URL
///
/// Every successful fetch produces a key set with a higher version than the
/// last, so the cache can tell refreshed sets apart.
pub struct HttpKeySource {
    client: reqwest::Client,
    url: String,
    fetches: AtomicU64,
}

impl HttpKeySource {
    /// Create a source for `url`; `timeout` bounds each request
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, InfrastructureError> {
        let url = url.into();
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!("JWKS key source configured for {}", url);

        Ok(Self {
            client,
            url,
            fetches: AtomicU64::new(0),
        })
    }

    /// Create from the verifier configuration; fails when no `jwks_url` is set
    pub fn from_config(config: &VerifierConfig) -> Result<Self, InfrastructureError> {
        let url = config
            .jwks_url
            .clone()
            .ok_or_else(|| InfrastructureError::Config("jwks_url is not set".to_string()))?;
        Self::new(url, Duration::from_secs(config.fetch_timeout))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, error: reqwest::Error) -> KeyFetchError {
        if error.is_timeout() {
            warn!("JWKS fetch from {} timed out", self.url);
            KeyFetchError::Timeout
        } else {
            warn!("JWKS fetch from {} failed: {}", self.url, error);
            KeyFetchError::Transport {
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch_key_set(&self) -> Result<KeySet, KeyFetchError> {
        debug!("Fetching JWKS from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("JWKS endpoint {} answered {}", self.url, status);
            return Err(KeyFetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let document: JwkSet = serde_json::from_slice(&body).map_err(|e| KeyFetchError::Decode {
            message: format!("invalid JWKS document: {}", e),
        })?;

        let version = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let set = document
            .into_key_set(version)
            .map_err(|e| KeyFetchError::Decode {
                message: e.to_string(),
            })?;

        debug!("Fetched {} keys from {}", set.len(), self.url);
        Ok(set)
    }
}
