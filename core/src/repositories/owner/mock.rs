//! Mock implementation of ResourceOwnerRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::ResourceOwner;
use crate::errors::DomainError;

use super::trait_::ResourceOwnerRepository;

/// Mock resource owner repository for testing
pub struct MockResourceOwnerRepository {
    owners: Arc<RwLock<HashMap<String, ResourceOwner>>>,
}

impl MockResourceOwnerRepository {
    pub fn new() -> Self {
        Self {
            owners: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_owners(owners: impl IntoIterator<Item = ResourceOwner>) -> Self {
        let map = owners
            .into_iter()
            .map(|owner| (owner.username.clone(), owner))
            .collect();
        Self {
            owners: Arc::new(RwLock::new(map)),
        }
    }
}

impl Default for MockResourceOwnerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceOwnerRepository for MockResourceOwnerRepository {
    async fn find_owner(&self, username: &str) -> Result<Option<ResourceOwner>, DomainError> {
        let owners = self.owners.read().await;
        Ok(owners.get(username).cloned())
    }
}
