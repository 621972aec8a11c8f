use std::collections::HashMap;

use async_trait::async_trait;
use kg_core::domain::entities::ResourceOwner;
use kg_core::errors::DomainError;
use kg_core::repositories::ResourceOwnerRepository;
use kg_shared::config::ResourceOwnerRegistration;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Resource owners keyed by username
pub struct InMemoryResourceOwnerRepository {
    owners: RwLock<HashMap<String, ResourceOwner>>,
}

impl InMemoryResourceOwnerRepository {
    pub fn new(owners: impl IntoIterator<Item = ResourceOwner>) -> Self {
        let mut map = HashMap::new();
        for owner in owners {
            if map.contains_key(&owner.username) {
                warn!("Duplicate resource owner {}; keeping the first", owner.username);
                continue;
            }
            map.insert(owner.username.clone(), owner);
        }
        info!("Loaded {} resource owners", map.len());

        Self {
            owners: RwLock::new(map),
        }
    }

    pub fn from_registrations(registrations: &[ResourceOwnerRegistration]) -> Self {
        Self::new(registrations.iter().cloned().map(ResourceOwner::from))
    }

    /// Register or replace a resource owner
    pub async fn upsert(&self, owner: ResourceOwner) {
        self.owners
            .write()
            .await
            .insert(owner.username.clone(), owner);
    }
}

#[async_trait]
impl ResourceOwnerRepository for InMemoryResourceOwnerRepository {
    async fn find_owner(&self, username: &str) -> Result<Option<ResourceOwner>, DomainError> {
        Ok(self.owners.read().await.get(username).cloned())
    }
}
