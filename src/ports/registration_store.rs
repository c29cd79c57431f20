//! Registration store port.
//!
//! The registration record is owned by the wider event back office; this
//! port exposes only the slice the conversational flows read and write.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, RegistrationId, Timestamp, WaId};
use crate::domain::rsvp::RsvpStatus;

/// The slice of an event registration the capture engine consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub id: RegistrationId,
    pub guest_phone: WaId,
    pub guest_name: Option<String>,
    pub rsvp_status: RsvpStatus,
    /// Last inbound message from this guest; feeds the 24-hour window.
    /// Shared with the RSVP side-channel.
    pub responded_on: Option<Timestamp>,
}

/// Read/write access to registrations.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Looks up a registration by id.
    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, DomainError>;

    /// Records that the guest sent an inbound message.
    async fn mark_responded(
        &self,
        id: &RegistrationId,
        at: Timestamp,
    ) -> Result<(), DomainError>;

    /// Updates the RSVP status.
    async fn update_rsvp(
        &self,
        id: &RegistrationId,
        status: RsvpStatus,
    ) -> Result<(), DomainError>;
}
