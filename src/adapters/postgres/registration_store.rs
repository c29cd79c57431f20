//! PostgreSQL implementation of RegistrationStore.
//!
//! Reads and writes the small slice of the registration table the
//! conversational flows touch; everything else belongs to the back office.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, RegistrationId, Timestamp, WaId};
use crate::domain::rsvp::RsvpStatus;
use crate::ports::{Registration, RegistrationStore};

/// PostgreSQL implementation of RegistrationStore.
#[derive(Clone)]
pub struct PostgresRegistrationStore {
    pool: PgPool,
}

impl PostgresRegistrationStore {
    /// Creates a new PostgresRegistrationStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationStore for PostgresRegistrationStore {
    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, guest_phone, guest_name, rsvp_status, responded_on
            FROM event_registrations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch registration: {}", e)))?;

        row.map(row_to_registration).transpose()
    }

    async fn mark_responded(
        &self,
        id: &RegistrationId,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        sqlx::query("UPDATE event_registrations SET responded_on = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::database(format!("Failed to update responded_on: {}", e))
            })?;
        Ok(())
    }

    async fn update_rsvp(
        &self,
        id: &RegistrationId,
        status: RsvpStatus,
    ) -> Result<(), DomainError> {
        sqlx::query("UPDATE event_registrations SET rsvp_status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to update rsvp_status: {}", e)))?;
        Ok(())
    }
}

fn row_to_registration(row: sqlx::postgres::PgRow) -> Result<Registration, DomainError> {
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| DomainError::database(format!("Failed to get id: {}", e)))?;

    let phone: String = row
        .try_get("guest_phone")
        .map_err(|e| DomainError::database(format!("Failed to get guest_phone: {}", e)))?;
    let guest_phone = WaId::parse(&phone)
        .map_err(|e| DomainError::database(format!("Invalid stored phone: {}", e)))?;

    let guest_name: Option<String> = row
        .try_get("guest_name")
        .map_err(|e| DomainError::database(format!("Failed to get guest_name: {}", e)))?;

    let status_str: String = row
        .try_get("rsvp_status")
        .map_err(|e| DomainError::database(format!("Failed to get rsvp_status: {}", e)))?;
    let rsvp_status = status_str
        .parse::<RsvpStatus>()
        .map_err(|e| DomainError::database(format!("Invalid stored rsvp_status: {}", e)))?;

    let responded_on: Option<chrono::DateTime<chrono::Utc>> = row
        .try_get("responded_on")
        .map_err(|e| DomainError::database(format!("Failed to get responded_on: {}", e)))?;

    Ok(Registration {
        id: RegistrationId::from_uuid(id),
        guest_phone,
        guest_name,
        rsvp_status,
        responded_on: responded_on.map(Timestamp::from_datetime),
    })
}
