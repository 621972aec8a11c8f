//! Resource owner repository consulted by the password grant.

use async_trait::async_trait;

use crate::domain::entities::ResourceOwner;
use crate::errors::DomainError;

/// Read access to resource owners
#[async_trait]
pub trait ResourceOwnerRepository: Send + Sync {
    /// Find a resource owner by username
    ///
    /// # Returns
    /// * `Ok(Some(ResourceOwner))` - Owner exists
    /// * `Ok(None)` - Unknown username
    /// * `Err(DomainError)` - Backing store failed
    async fn find_owner(&self, username: &str) -> Result<Option<ResourceOwner>, DomainError>;
}
