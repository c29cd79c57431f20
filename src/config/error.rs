//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors raised while validating loaded configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server port must not be 0")]
    InvalidPort,

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("database url is required")]
    MissingDatabaseUrl,

    #[error("whatsapp setting '{0}' is required")]
    MissingWhatsAppSetting(&'static str),
}
