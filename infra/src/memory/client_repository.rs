use std::collections::HashMap;

use async_trait::async_trait;
use kg_core::domain::entities::Client;
use kg_core::errors::DomainError;
use kg_core::repositories::ClientRepository;
use kg_shared::config::ClientRegistration;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Registered clients keyed by `client_id`
pub struct InMemoryClientRepository {
    clients: RwLock<HashMap<String, Client>>,
}

impl InMemoryClientRepository {
    pub fn new(clients: impl IntoIterator<Item = Client>) -> Self {
        let mut map = HashMap::new();
        for client in clients {
            if map.contains_key(&client.client_id) {
                warn!("Duplicate client registration {}; keeping the first", client.client_id);
                continue;
            }
            map.insert(client.client_id.clone(), client);
        }
        info!("Loaded {} client registrations", map.len());

        Self {
            clients: RwLock::new(map),
        }
    }

    pub fn from_registrations(registrations: &[ClientRegistration]) -> Self {
        Self::new(registrations.iter().cloned().map(Client::from))
    }

    /// Register or replace a client
    pub async fn upsert(&self, client: Client) {
        self.clients
            .write()
            .await
            .insert(client.client_id.clone(), client);
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, DomainError> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }
}
