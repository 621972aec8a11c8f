//! Key management
//!
//! - Key generation for HS256, RS256 and EdDSA
//! - The key manager holding the current and retired keys
//! - Scheduled purging and rotation

mod config;
mod generator;
mod maintenance;
mod manager;


pub use config::{KeyIdStrategy, KeyMaintenanceConfig, KeyManagerConfig};
pub use maintenance::{KeyMaintenanceService, MaintenanceResult};
pub use manager::{KeyManager, KeyStatus};
