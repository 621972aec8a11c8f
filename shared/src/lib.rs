//! Shared configuration and wire types for the Keygate server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (server, token, keys, verifier, credential registrations)
//! - OAuth2 error response structures and error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ClientRegistration, ConfigError, Environment, KeyConfig,
    LoggingConfig, ResourceOwnerRegistration, ServerConfig, TokenConfig, VerifierConfig,
};
pub use errors::{error_codes, OAuthErrorResponse};
