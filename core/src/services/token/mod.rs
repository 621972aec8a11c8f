//! Token issuance
//!
//! This module handles:
//! - Compact JWT encoding with the signing key's `kid` in the header
//! - Client authentication and scope checks at issuance
//! - The client credentials and password grants

mod codec;
mod config;
mod issuer;


pub use codec::{DecodedToken, TokenCodec, MAX_KID_BYTES, MAX_TOKEN_BYTES};
pub use config::TokenIssuerConfig;
pub use issuer::{ClientCredentials, Grant, GrantType, TokenIssuer};
