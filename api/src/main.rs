use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use log::{info, warn};

use kg_api::{create_app, AppState};
use kg_core::services::keys::{KeyMaintenanceConfig, KeyMaintenanceService, KeyManager, KeyManagerConfig};
use kg_core::services::publication::{KeyPublicationService, KeySource, LocalKeySource};
use kg_core::services::token::{TokenIssuer, TokenIssuerConfig};
use kg_core::services::verification::{
    KeySetCache, KeySetCacheConfig, TokenVerifier, TokenVerifierConfig,
};
use kg_infra::{HttpKeySource, InMemoryClientRepository, InMemoryResourceOwnerRepository};
use kg_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    // RUST_LOG overrides the configured level
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(config.logging.level.as_str()));

    info!("Starting Keygate in {:?} mode", config.environment);

    let key_config = KeyManagerConfig::from_auth_config(&config.auth)
        .context("invalid signing key configuration")?;
    let keys = Arc::new(
        web::block(move || KeyManager::new(key_config))
            .await
            .context("key generation task failed")?
            .context("failed to generate the initial signing key")?,
    );

    let clients = Arc::new(InMemoryClientRepository::from_registrations(&config.auth.clients));
    let owners = Arc::new(InMemoryResourceOwnerRepository::from_registrations(&config.auth.users));
    if config.auth.clients.is_empty() {
        warn!("No clients registered; the token endpoint will reject every request");
    }

    let issuer = Arc::new(TokenIssuer::new(
        clients,
        owners,
        keys.clone(),
        TokenIssuerConfig::from(&config.auth.token),
    ));
    let publication = Arc::new(KeyPublicationService::new(keys.clone()));

    let source: Arc<dyn KeySource> = match &config.auth.verifier.jwks_url {
        Some(url) => {
            info!("Verifying bearer tokens against {}", url);
            Arc::new(
                HttpKeySource::from_config(&config.auth.verifier)
                    .context("failed to create the JWKS client")?,
            )
        }
        None => {
            info!("Verifying bearer tokens against the local key manager");
            Arc::new(LocalKeySource::new(keys.clone()))
        }
    };

    let mut verifier_config = TokenVerifierConfig::from(&config.auth);
    if verifier_config.expected_issuer.is_none() && config.auth.verifier.jwks_url.is_none() {
        verifier_config.expected_issuer = Some(config.auth.token.issuer.clone());
    }
    let cache_config = KeySetCacheConfig::from(&config.auth);
    let jwks_max_age = cache_config.ttl.as_secs();
    let verifier = Arc::new(TokenVerifier::new(
        Arc::new(KeySetCache::new(source, cache_config)),
        verifier_config,
    ));

    let maintenance = Arc::new(KeyMaintenanceService::new(
        keys.clone(),
        KeyMaintenanceConfig::from_auth_config(&config.auth),
    ));
    maintenance.start_background_task();

    let app_state = web::Data::new(AppState {
        issuer,
        keys,
        publication,
        verifier,
        jwks_max_age,
    });

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(app_state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server terminated with an error")
}
