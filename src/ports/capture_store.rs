//! Capture store port.
//!
//! Persists the session/record pair. The two always mutate together under a
//! single atomic write per inbound event, so the port exposes them as a pair.

use async_trait::async_trait;

use crate::domain::capture::{CaptureSession, TravelRecord};
use crate::domain::foundation::{DomainError, RegistrationId};

/// Persistence for capture sessions and their travel records.
#[async_trait]
pub trait CaptureStore: Send + Sync {
    /// Loads the session/record pair for a registration, creating empty ones
    /// lazily on first interaction.
    async fn load_or_create(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<(CaptureSession, TravelRecord), DomainError>;

    /// Looks up an existing session without creating one.
    async fn find_session(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Option<CaptureSession>, DomainError>;

    /// Persists both halves atomically: either both land or neither does.
    async fn save(
        &self,
        session: &CaptureSession,
        record: &TravelRecord,
    ) -> Result<(), DomainError>;
}
