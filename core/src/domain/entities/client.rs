//! Credential store entities consulted by the token issuer.

use kg_shared::config::{ClientRegistration, ResourceOwnerRegistration};

/// A registered OAuth2 client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub client_id: String,
    /// bcrypt hash of the client secret
    pub secret_hash: String,
    pub scopes: Vec<String>,
    pub grant_types: Vec<String>,
}

impl Client {
    pub fn new(
        client_id: impl Into<String>,
        secret_hash: impl Into<String>,
        scopes: Vec<String>,
        grant_types: Vec<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            secret_hash: secret_hash.into(),
            scopes,
            grant_types,
        }
    }

    /// Check a presented secret; a malformed stored hash never matches
    pub fn verify_secret(&self, secret: &str) -> bool {
        bcrypt::verify(secret, &self.secret_hash).unwrap_or(false)
    }

    pub fn allows_grant(&self, grant_type: &str) -> bool {
        self.grant_types.iter().any(|allowed| allowed == grant_type)
    }
}

impl From<ClientRegistration> for Client {
    fn from(registration: ClientRegistration) -> Self {
        Self {
            client_id: registration.client_id,
            secret_hash: registration.secret_hash,
            scopes: registration.scopes,
            grant_types: registration.grant_types,
        }
    }
}

/// A user allowed to exchange a password for a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOwner {
    pub username: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    pub scopes: Vec<String>,
}

impl ResourceOwner {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            scopes,
        }
    }

    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

impl From<ResourceOwnerRegistration> for ResourceOwner {
    fn from(registration: ResourceOwnerRegistration) -> Self {
        Self {
            username: registration.username,
            password_hash: registration.password_hash,
            scopes: registration.scopes,
        }
    }
}
