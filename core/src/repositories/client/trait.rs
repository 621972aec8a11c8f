//! Client repository trait defining access to registered OAuth2 clients.
//!
//! The token issuer only reads clients; registration and storage are owned
//! by whatever backs the implementation.

use async_trait::async_trait;

use crate::domain::entities::Client;
use crate::errors::DomainError;

/// Read access to registered clients
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use kg_core::domain::entities::Client;
/// use kg_core::errors::DomainError;
/// use kg_core::repositories::ClientRepository;
///
/// struct StaticClients(Vec<Client>);
///
/// #[async_trait]
/// impl ClientRepository for StaticClients {
///     async fn find_client(&self, client_id: &str) -> Result<Option<Client>, DomainError> {
///         Ok(self.0.iter().find(|c| c.client_id == client_id).cloned())
///     }
/// }
/// ```
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Find a client by its identifier
    ///
    /// # Returns
    /// * `Ok(Some(Client))` - Client registered
    /// * `Ok(None)` - Unknown client
    /// * `Err(DomainError)` - Backing store failed
    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, DomainError>;
}
