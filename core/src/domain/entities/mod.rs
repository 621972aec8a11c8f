//! Domain entities representing core business objects.

pub mod client;
pub mod key_set;
pub mod principal;
pub mod signing_key;
pub mod token;


// Re-export commonly used types
pub use client::{Client, ResourceOwner};
pub use key_set::{KeySet, VerificationKey, VerificationMaterial};
pub use principal::Principal;
pub use signing_key::{Algorithm, KeyUsage, SigningKey};
pub use token::{Audience, Claims, Token, TokenHeader, TOKEN_TYPE};
