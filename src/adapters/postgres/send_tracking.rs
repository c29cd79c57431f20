//! PostgreSQL implementation of SendTrackingStore.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, RegistrationId, Timestamp, WaId};
use crate::ports::SendTrackingStore;

/// PostgreSQL implementation of SendTrackingStore.
#[derive(Clone)]
pub struct PostgresSendTracking {
    pool: PgPool,
}

impl PostgresSendTracking {
    /// Creates a new PostgresSendTracking.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SendTrackingStore for PostgresSendTracking {
    async fn latest_for(&self, wa_id: &WaId) -> Result<Option<RegistrationId>, DomainError> {
        let row: Option<(uuid::Uuid,)> = sqlx::query_as(
            r#"
            SELECT registration_id
            FROM wa_send_map
            WHERE wa_id = $1
              AND expires_at > now()
              AND consumed_at IS NULL
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(wa_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to resolve send map: {}", e)))?;

        Ok(row.map(|(id,)| RegistrationId::from_uuid(id)))
    }

    async fn mark_consumed(
        &self,
        registration_id: &RegistrationId,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE wa_send_map SET consumed_at = $2 \
             WHERE registration_id = $1 AND consumed_at IS NULL",
        )
        .bind(registration_id.as_uuid())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to mark send map consumed: {}", e)))?;
        Ok(())
    }
}
