//! Background maintenance of the key ring
//!
//! Periodically purges retired keys past their grace period and, when a
//! rotation interval is configured, rotates the current key once it is old
//! enough.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};

use super::config::KeyMaintenanceConfig;
use super::manager::KeyManager;
use crate::errors::DomainError;

/// Service running scheduled key maintenance
pub struct KeyMaintenanceService {
    manager: Arc<KeyManager>,
    config: KeyMaintenanceConfig,
}

impl KeyMaintenanceService {
    pub fn new(manager: Arc<KeyManager>, config: KeyMaintenanceConfig) -> Self {
        Self { manager, config }
    }

    /// Run a single maintenance cycle
    ///
    /// # Returns
    /// * `Ok(MaintenanceResult)` - Summary of what changed
    /// * `Err(DomainError)` - The rotation task could not be run
    pub async fn run_maintenance(&self) -> Result<MaintenanceResult, DomainError> {
        self.run_maintenance_at(Utc::now()).await
    }

    pub async fn run_maintenance_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<MaintenanceResult, DomainError> {
        if !self.config.enabled {
            return Ok(MaintenanceResult::default());
        }

        let mut result = MaintenanceResult {
            purged_keys: self.manager.purge_expired_at(now),
            ..Default::default()
        };
        if result.purged_keys > 0 {
            info!("Purged {} expired retired keys", result.purged_keys);
        }

        if self.rotation_due(now) {
            let manager = self.manager.clone();
            // RSA generation is CPU bound; keep it off the async workers
            let rotated = tokio::task::spawn_blocking(move || manager.rotate_at(None, now))
                .await
                .map_err(|e| DomainError::Internal {
                    message: format!("Key rotation task failed: {}", e),
                })?;

            match rotated {
                Ok(key) => result.rotated_to = Some(key.kid().to_string()),
                Err(e) => {
                    error!("Scheduled key rotation failed: {}", e);
                    result.errors.push(format!("Rotation error: {}", e));
                }
            }
        }

        Ok(result)
    }

    fn rotation_due(&self, now: DateTime<Utc>) -> bool {
        if self.config.rotation_interval_seconds == 0 {
            return false;
        }
        let interval = Duration::seconds(
            i64::try_from(self.config.rotation_interval_seconds).unwrap_or(i64::MAX),
        );
        now - self.manager.current_signing_key().created_at() >= interval
    }

    /// Start the maintenance service as a background task
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Key maintenance service is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Key maintenance service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_maintenance().await {
                    Ok(result) => {
                        if !result.is_success() {
                            warn!("Key maintenance completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Key maintenance cycle failed: {}", e);
                    }
                }
            }
        });
    }
}

/// Result of a maintenance cycle
#[derive(Debug, Default)]
pub struct MaintenanceResult {
    /// Number of retired keys dropped
    pub purged_keys: usize,
    /// Identifier of the new current key, when a rotation happened
    pub rotated_to: Option<String>,
    /// Any errors encountered during maintenance
    pub errors: Vec<String>,
}

impl MaintenanceResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
