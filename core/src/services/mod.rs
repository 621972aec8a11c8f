//! Business services containing domain logic and use cases.

pub mod keys;
pub mod publication;
pub mod token;
pub mod verification;

// Re-export commonly used types
pub use keys::{KeyMaintenanceService, KeyManager, KeyManagerConfig, KeyStatus};
pub use publication::{JwkSet, KeyPublicationService, KeySource, LocalKeySource};
pub use token::{ClientCredentials, Grant, GrantType, TokenCodec, TokenIssuer, TokenIssuerConfig};
pub use verification::{KeySetCache, KeySetCacheConfig, TokenVerifier, TokenVerifierConfig};
