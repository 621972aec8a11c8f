//! The authenticated caller behind a verified token.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use super::token::Claims;
use crate::errors::VerificationFailure;

/// Identity projected from verified claims; never persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Principal {
    pub subject: String,
    pub scopes: Vec<String>,
    pub issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Key that signed the token
    pub key_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub claims: Claims,
}

impl Principal {
    /// Project verified claims; timestamps outside chrono's range are malformed
    pub fn from_claims(claims: Claims, key_id: impl Into<String>) -> Result<Self, VerificationFailure> {
        let issued_at = claims.iat.map(timestamp).transpose()?;
        let expires_at = claims.exp.map(timestamp).transpose()?;

        Ok(Self {
            subject: claims.sub.clone(),
            scopes: claims.scopes(),
            issuer: claims.iss.clone(),
            client_id: claims.client_id.clone(),
            key_id: key_id.into(),
            issued_at,
            expires_at,
            claims,
        })
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|granted| granted == scope)
    }

    pub fn has_all_scopes<S: AsRef<str>>(&self, scopes: &[S]) -> bool {
        scopes.iter().all(|scope| self.has_scope(scope.as_ref()))
    }
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, VerificationFailure> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or(VerificationFailure::MalformedToken)
}
