//! Configuration for the key manager and its maintenance task

use std::str::FromStr;

use kg_shared::config::AuthConfig;
use tracing::warn;

use crate::domain::entities::Algorithm;
use crate::errors::KeyError;

/// How new key identifiers are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyIdStrategy {
    /// UUID v4, simple form
    #[default]
    Random,
    /// Monotonic counter starting at 1
    Sequential,
}

impl FromStr for KeyIdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" | "uuid" => Ok(KeyIdStrategy::Random),
            "sequential" | "counter" => Ok(KeyIdStrategy::Sequential),
            other => Err(format!("unknown key id strategy: {}", other)),
        }
    }
}

/// Configuration for the key manager
#[derive(Debug, Clone)]
pub struct KeyManagerConfig {
    /// Algorithm of the initial key and of rotations that do not name one
    pub algorithm: Algorithm,
    /// RSA modulus or HMAC secret size in bits
    pub key_size: usize,
    pub kid_strategy: KeyIdStrategy,
    /// Seconds a retired key keeps verifying
    pub grace_period_seconds: i64,
}

impl Default for KeyManagerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Rs256,
            key_size: Algorithm::Rs256.default_key_size(),
            kid_strategy: KeyIdStrategy::Random,
            grace_period_seconds: 960, // 15 minute tokens plus 60s skew
        }
    }
}

impl KeyManagerConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            key_size: algorithm.default_key_size(),
            ..Default::default()
        }
    }

    pub fn with_kid_strategy(mut self, strategy: KeyIdStrategy) -> Self {
        self.kid_strategy = strategy;
        self
    }

    pub fn with_grace_period(mut self, seconds: i64) -> Self {
        self.grace_period_seconds = seconds;
        self
    }

    /// Build from application configuration; the algorithm name must be known
    pub fn from_auth_config(config: &AuthConfig) -> Result<Self, KeyError> {
        let algorithm: Algorithm = config.keys.algorithm.parse()?;
        let kid_strategy = config.keys.kid_strategy.parse().unwrap_or_else(|err| {
            warn!("{}; falling back to random key ids", err);
            KeyIdStrategy::Random
        });

        Ok(Self {
            algorithm,
            key_size: config.keys.key_size,
            kid_strategy,
            grace_period_seconds: config.rotation_grace_period(),
        })
    }

    /// Size to use for a key of `algorithm`
    pub fn key_size_for(&self, algorithm: Algorithm) -> usize {
        if algorithm == self.algorithm {
            self.key_size
        } else {
            algorithm.default_key_size()
        }
    }
}

/// Configuration for the background key maintenance task
#[derive(Debug, Clone)]
pub struct KeyMaintenanceConfig {
    /// How often to run maintenance (in seconds)
    pub interval_seconds: u64,
    /// Rotate once the current key is this old, in seconds (0 = never)
    pub rotation_interval_seconds: u64,
    /// Whether to enable the background task
    pub enabled: bool,
}

impl Default for KeyMaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300, // Run every 5 minutes
            rotation_interval_seconds: 0,
            enabled: true,
        }
    }
}

impl KeyMaintenanceConfig {
    pub fn from_auth_config(config: &AuthConfig) -> Self {
        Self {
            interval_seconds: config.keys.maintenance_interval.max(1),
            rotation_interval_seconds: config.keys.rotation_interval,
            enabled: true,
        }
    }
}
