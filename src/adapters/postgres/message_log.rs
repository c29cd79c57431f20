//! PostgreSQL implementation of MessageLog.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::ports::{MessageLog, MessageLogEntry};

/// PostgreSQL implementation of MessageLog.
#[derive(Clone)]
pub struct PostgresMessageLog {
    pool: PgPool,
}

impl PostgresMessageLog {
    /// Creates a new PostgresMessageLog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageLog for PostgresMessageLog {
    async fn record(&self, entry: MessageLogEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO whatsapp_message_log (registration_id, direction, body, kind, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.registration_id.as_uuid())
        .bind(entry.direction.as_str())
        .bind(&entry.body)
        .bind(&entry.kind)
        .bind(entry.at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to record message: {}", e)))?;
        Ok(())
    }
}
