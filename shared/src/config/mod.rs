//! Configuration module with business-specific sub-modules
//!
//! - `auth` - Token issuance, signing keys, verifier cache and credential registrations
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration

pub mod auth;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};

pub use ::config::ConfigError;

// Re-export commonly used types
pub use auth::{
    AuthConfig, ClientRegistration, KeyConfig, ResourceOwnerRegistration, TokenConfig,
    VerifierConfig,
};
pub use environment::{Environment, LoggingConfig};
pub use server::ServerConfig;

/// Prefix for environment variable overrides, e.g. `KEYGATE__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "KEYGATE";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Defaults for an environment
    pub fn for_environment(environment: Environment) -> Self {
        let server = match environment {
            Environment::Production => ServerConfig::new("0.0.0.0", 8080),
            _ => ServerConfig::default(),
        };
        Self {
            environment,
            server,
            auth: AuthConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Layer environment defaults, the optional `config.<env>.toml` file and
    /// `KEYGATE__*` variables, in that order.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let environment = Environment::from_env();
        dotenvy::from_filename(environment.env_file()).ok();

        let defaults = Self::for_environment(environment);
        ::config::Config::builder()
            .add_source(::config::Config::try_from(&defaults)?)
            .add_source(
                ::config::File::new(environment.config_file(), ::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
