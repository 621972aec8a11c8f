use serde::Deserialize;
use std::fmt;
use validator::Validate;

/// Form body of `POST /oauth/token` (`application/x-www-form-urlencoded`)
///
/// Every field is optional at the wire level so that a missing parameter
/// surfaces as `invalid_request` rather than a form parse failure.
#[derive(Clone, Default, Deserialize, Validate)]
pub struct TokenRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub grant_type: Option<String>,

    /// Space-delimited requested scopes
    #[serde(default)]
    #[validate(length(max = 1024))]
    pub scope: Option<String>,

    /// Client credentials when HTTP Basic is not used
    #[serde(default)]
    #[validate(length(min = 1, max = 256))]
    pub client_id: Option<String>,

    #[serde(default)]
    #[validate(length(max = 256))]
    pub client_secret: Option<String>,

    /// Resource owner credentials for the password grant
    #[serde(default)]
    #[validate(length(min = 1, max = 256))]
    pub username: Option<String>,

    #[serde(default)]
    #[validate(length(max = 1024))]
    pub password: Option<String>,

    /// Subject override for the client credentials grant
    #[serde(default)]
    #[validate(length(min = 1, max = 256))]
    pub subject: Option<String>,
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("grant_type", &self.grant_type)
            .field("scope", &self.scope)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}
