//! Token issuer: authenticates clients and mints signed access tokens

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::codec::TokenCodec;
use super::config::TokenIssuerConfig;
use crate::domain::entities::{Audience, Claims};
use crate::domain::value_objects::{scope, IssuedToken};
use crate::errors::{AuthError, DomainError};
use crate::repositories::{ClientRepository, ResourceOwnerRepository};
use crate::services::keys::KeyManager;

/// OAuth2 grant types the issuer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    ClientCredentials,
    Password,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::ClientCredentials => "client_credentials",
            GrantType::Password => "password",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client_credentials" => Ok(GrantType::ClientCredentials),
            "password" => Ok(GrantType::Password),
            other => Err(AuthError::UnsupportedGrantType {
                grant_type: other.to_string(),
            }),
        }
    }
}

/// Client authentication presented at the token endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// The authorization grant being exchanged
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
    /// The client acts on its own behalf; `subject` overrides the client id as `sub`
    ClientCredentials { subject: Option<String> },
    /// Resource owner password credentials
    Password { username: String, password: String },
}

impl Grant {
    pub fn grant_type(&self) -> GrantType {
        match self {
            Grant::ClientCredentials { .. } => GrantType::ClientCredentials,
            Grant::Password { .. } => GrantType::Password,
        }
    }
}

impl fmt::Debug for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grant::ClientCredentials { subject } => f
                .debug_struct("ClientCredentials")
                .field("subject", subject)
                .finish(),
            Grant::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Service minting signed access tokens
pub struct TokenIssuer<C: ClientRepository, O: ResourceOwnerRepository> {
    clients: Arc<C>,
    owners: Arc<O>,
    keys: Arc<KeyManager>,
    config: TokenIssuerConfig,
    /// Hash of a random secret, checked on lookups that find nobody so that
    /// unknown and known identifiers cost the same
    decoy_hash: OnceCell<String>,
}

impl<C: ClientRepository, O: ResourceOwnerRepository> TokenIssuer<C, O> {
    pub fn new(
        clients: Arc<C>,
        owners: Arc<O>,
        keys: Arc<KeyManager>,
        config: TokenIssuerConfig,
    ) -> Self {
        Self {
            clients,
            owners,
            keys,
            config,
            decoy_hash: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &TokenIssuerConfig {
        &self.config
    }

    /// Exchange client credentials (and a grant) for a signed access token
    ///
    /// # Arguments
    ///
    /// * `credentials` - Client id and secret
    /// * `grant` - Grant being exchanged
    /// * `requested_scope` - Space-delimited scopes; `None` or blank requests everything authorized
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedToken)` - Token signed with the current key
    /// * `Err(DomainError::Auth)` - Bad credentials, grant or scope
    /// * `Err(DomainError::Signing)` - The token could not be signed
    pub async fn issue(
        &self,
        credentials: &ClientCredentials,
        grant: Grant,
        requested_scope: Option<&str>,
    ) -> Result<IssuedToken, DomainError> {
        self.issue_at(credentials, grant, requested_scope, Utc::now())
            .await
    }

    pub async fn issue_at(
        &self,
        credentials: &ClientCredentials,
        grant: Grant,
        requested_scope: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, DomainError> {
        let client = match self.clients.find_client(&credentials.client_id).await? {
            Some(client) if client.verify_secret(&credentials.client_secret) => client,
            found => {
                if found.is_none() {
                    self.check_decoy(&credentials.client_secret).await;
                }
                warn!(
                    "Rejected token request: invalid credentials for client {}",
                    credentials.client_id
                );
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let grant_type = grant.grant_type();
        if !client.allows_grant(grant_type.as_str()) {
            warn!(
                "Client {} is not allowed the {} grant",
                client.client_id, grant_type
            );
            return Err(AuthError::UnsupportedGrantType {
                grant_type: grant_type.to_string(),
            }
            .into());
        }

        let (subject, authorized) = match grant {
            Grant::ClientCredentials { subject } => (
                subject.unwrap_or_else(|| client.client_id.clone()),
                client.scopes.clone(),
            ),
            Grant::Password { username, password } => {
                let owner = match self.owners.find_owner(&username).await? {
                    Some(owner) if owner.verify_password(&password) => owner,
                    found => {
                        if found.is_none() {
                            self.check_decoy(&password).await;
                        }
                        warn!("Rejected password grant for {}", username);
                        return Err(AuthError::InvalidCredentials.into());
                    }
                };
                let authorized = client
                    .scopes
                    .iter()
                    .filter(|scope| owner.scopes.contains(scope))
                    .cloned()
                    .collect();
                (owner.username, authorized)
            }
        };

        let granted = Self::grant_scopes(&authorized, requested_scope)?;

        let iat = now.timestamp();
        let mut claims = Claims::new(
            subject,
            self.config.issuer.clone(),
            iat,
            iat + self.config.access_token_lifetime,
            scope::join(&granted),
        );
        claims.aud = self.config.audience.clone().map(Audience::from);
        claims.jti = Some(Uuid::new_v4().to_string());
        claims.client_id = Some(client.client_id.clone());

        let key = self.keys.current_signing_key();
        let token = TokenCodec::sign(&claims, &key).map_err(|e| {
            error!("Failed to sign token for client {}: {}", client.client_id, e);
            DomainError::from(e)
        })?;

        info!(
            "Issued {} token for {} (client {}) with key {}",
            grant_type,
            claims.sub,
            client.client_id,
            key.kid()
        );
        debug!("Granted scope: {}", claims.scope);

        Ok(IssuedToken::new(
            token.into_string(),
            self.config.access_token_lifetime,
            claims.scope,
            key.kid().to_string(),
        ))
    }

    /// Spend one bcrypt verification on a hash that matches nothing
    async fn check_decoy(&self, secret: &str) {
        let cost = self.config.credential_hash_cost;
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| async move { bcrypt::hash(Uuid::new_v4().to_string(), cost) })
            .await;

        match decoy {
            Ok(hash) => {
                let _ = bcrypt::verify(secret, hash);
            }
            Err(e) => warn!("Failed to prepare decoy credential hash: {}", e),
        }
    }

    #[cfg(test)]
    pub(crate) fn decoy_hash(&self) -> Option<&str> {
        self.decoy_hash.get().map(String::as_str)
    }

    /// Scopes to grant: everything authorized unless a subset is requested
    fn grant_scopes(
        authorized: &[String],
        requested_scope: Option<&str>,
    ) -> Result<Vec<String>, AuthError> {
        let requested = requested_scope.map(scope::parse).unwrap_or_default();
        if requested.is_empty() {
            return Ok(authorized.to_vec());
        }

        if let Some(denied) = requested.iter().find(|scope| !authorized.contains(scope)) {
            return Err(AuthError::ScopeNotAuthorized {
                scope: denied.clone(),
            });
        }
        Ok(requested)
    }
}
