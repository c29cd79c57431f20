//! Send-tracking port.
//!
//! The outbound messaging layer records which registration each template
//! went to, keyed by phone. Inbound replies carry no registration id, so
//! this map is how they find their way home.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, RegistrationId, Timestamp, WaId};

/// Read side of the phone → registration correlation map.
#[async_trait]
pub trait SendTrackingStore: Send + Sync {
    /// Returns the registration most recently messaged at this phone,
    /// ignoring expired and consumed rows. `None` means the inbound event
    /// cannot be correlated and should be dropped.
    async fn latest_for(&self, wa_id: &WaId) -> Result<Option<RegistrationId>, DomainError>;

    /// Marks this registration's tracking rows consumed (best effort, called
    /// once a tracked reply has been processed).
    async fn mark_consumed(
        &self,
        registration_id: &RegistrationId,
        at: Timestamp,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_tracking_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SendTrackingStore) {}
    }
}
