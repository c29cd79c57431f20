//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `GUESTFLOW` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use guestflow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod server;
mod whatsapp;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::ServerConfig;
pub use whatsapp::WhatsAppConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// WhatsApp configuration (WABA credentials, webhook secret)
    pub whatsapp: WhatsAppConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `GUESTFLOW__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `GUESTFLOW__DATABASE__URL=...` -> `database.url = ...`
    /// - `GUESTFLOW__WHATSAPP__ACCESS_TOKEN=...` -> `whatsapp.access_token`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GUESTFLOW")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Validate every configuration section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.whatsapp.validate()?;
        Ok(())
    }
}
