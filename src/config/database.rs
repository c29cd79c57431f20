//! Database configuration

use serde::Deserialize;

use super::error::ValidationError;

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (postgres://...)
    pub url: String,

    /// Maximum pool connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingDatabaseUrl);
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}
