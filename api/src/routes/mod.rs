//! Route handlers
//!
//! - `token` - OAuth2 token endpoint
//! - `jwks` - Key publication
//! - `resources` - Protected example resource
//! - `admin` - Key rotation command
//! - `health` - Liveness check

pub mod admin;
pub mod health;
pub mod jwks;
pub mod resources;
pub mod token;

/// Scope required by `GET /api/v1/me`
pub const READ_SCOPE: &str = "read";

/// Scope required by `POST /admin/keys/rotate`
pub const ROTATE_KEYS_SCOPE: &str = "keys:rotate";
