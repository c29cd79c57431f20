//! Message log port - append-only conversation audit.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, RegistrationId, Timestamp};

/// Direction of a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

impl MessageDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageDirection::Inbound => "inbound",
            MessageDirection::Outbound => "outbound",
        }
    }
}

/// One audit entry.
#[derive(Debug, Clone)]
pub struct MessageLogEntry {
    pub registration_id: RegistrationId,
    pub direction: MessageDirection,
    pub body: String,
    /// Flow the message belongs to, e.g. `rsvp` or `travel`.
    pub kind: String,
    pub at: Timestamp,
}

/// Append-only log of conversation traffic.
#[async_trait]
pub trait MessageLog: Send + Sync {
    async fn record(&self, entry: MessageLogEntry) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_log_is_object_safe() {
        fn _accepts_dyn(_log: &dyn MessageLog) {}
    }
}
