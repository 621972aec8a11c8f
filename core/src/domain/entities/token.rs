//! Token entities for compact JWT serialization.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `typ` header value written into every token
pub const TOKEN_TYPE: &str = "JWT";

/// JOSE header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Algorithm name as it appears on the wire
    pub alg: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Identifier of the key that produced the signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl TokenHeader {
    /// Header for a token signed with `alg` under key `kid`
    pub fn new(alg: impl Into<String>, kid: impl Into<String>) -> Self {
        Self {
            alg: alg.into(),
            typ: Some(TOKEN_TYPE.to_string()),
            kid: Some(kid.into()),
        }
    }
}

/// `aud` as either a single string or an array of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(value) => value == audience,
            Audience::Many(values) => values.iter().any(|value| value == audience),
        }
    }
}

impl From<String> for Audience {
    fn from(value: String) -> Self {
        Audience::One(value)
    }
}

/// Claims structure for JWT payload
///
/// Tokens minted here always carry `sub`, `iss`, `iat` and `exp`. Tokens from
/// other issuers may omit any of them; which ones are mandatory is decided by
/// the verifier's required claims, not by this projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (client id or resource owner)
    #[serde(default)]
    pub sub: String,

    /// Issuer
    #[serde(default)]
    pub iss: String,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Space-delimited granted scopes
    #[serde(default)]
    pub scope: String,

    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// JWT ID (unique identifier for the token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Client the token was issued to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Any other claims carried by the token
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn new(
        sub: impl Into<String>,
        iss: impl Into<String>,
        iat: i64,
        exp: i64,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            sub: sub.into(),
            iss: iss.into(),
            iat: Some(iat),
            exp: Some(exp),
            scope: scope.into(),
            aud: None,
            jti: None,
            client_id: None,
            extra: Map::new(),
        }
    }

    /// Individual scopes
    pub fn scopes(&self) -> Vec<String> {
        crate::domain::value_objects::scope::parse(&self.scope)
    }

    /// Whether the token is expired at `now`, tolerating `leeway` seconds;
    /// a token without `exp` never expires here
    pub fn is_expired_at(&self, now: i64, leeway: i64) -> bool {
        self.exp.is_some_and(|exp| exp.saturating_add(leeway) < now)
    }
}

/// A signed token and its compact serialization
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub header: TokenHeader,
    pub claims: Claims,
    /// base64url signature segment
    pub signature: String,
    encoded: String,
}

impl Token {
    pub fn new(header: TokenHeader, claims: Claims, signature: String, encoded: String) -> Self {
        Self {
            header,
            claims,
            signature,
            encoded,
        }
    }

    /// `header.claims.signature`
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn into_string(self) -> String {
        self.encoded
    }

    pub fn kid(&self) -> Option<&str> {
        self.header.kid.as_deref()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}
