//! SendFreeformHandler - staff sends a free-form message to a guest.
//!
//! Free-form sends are only legal inside the 24-hour window. Sending one
//! mid-capture would make the guest's next reply look like a travel answer,
//! so the handler explicitly asks the capture flow to pause first-class
//! instead of poking at its state.

use std::sync::Arc;

use thiserror::Error;

use crate::application::capture::CaptureFlow;
use crate::domain::foundation::{DomainError, RegistrationId, Timestamp};
use crate::ports::{
    GatewayError, MessageDirection, MessageLog, MessageLogEntry, MessagingGateway,
    RegistrationStore,
};

/// Command to send one free-form message.
#[derive(Debug, Clone)]
pub struct SendFreeformCommand {
    pub registration_id: RegistrationId,
    pub message: String,
}

/// Errors surfaced to the HTTP layer (this surface is staff-facing, so
/// failures are real responses, not silent acks).
#[derive(Debug, Error)]
pub enum FreeformError {
    #[error("registration not found: {0}")]
    RegistrationNotFound(RegistrationId),

    #[error("service window expired; last inbound message was more than 24 hours ago")]
    WindowExpired,

    #[error("message text is required")]
    EmptyMessage,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Storage(#[from] DomainError),
}

pub struct SendFreeformHandler {
    registrations: Arc<dyn RegistrationStore>,
    gateway: Arc<dyn MessagingGateway>,
    capture: Arc<CaptureFlow>,
    message_log: Arc<dyn MessageLog>,
}

impl SendFreeformHandler {
    pub fn new(
        registrations: Arc<dyn RegistrationStore>,
        gateway: Arc<dyn MessagingGateway>,
        capture: Arc<CaptureFlow>,
        message_log: Arc<dyn MessageLog>,
    ) -> Self {
        Self {
            registrations,
            gateway,
            capture,
            message_log,
        }
    }

    /// Sends the message and returns the provider message id.
    pub async fn handle(&self, cmd: SendFreeformCommand) -> Result<String, FreeformError> {
        let registration = self
            .registrations
            .find_by_id(&cmd.registration_id)
            .await?
            .ok_or(FreeformError::RegistrationNotFound(cmd.registration_id))?;

        if !self
            .gateway
            .within_24h_window(registration.responded_on.as_ref())
        {
            return Err(FreeformError::WindowExpired);
        }

        let message = cmd.message.trim();
        if message.is_empty() {
            return Err(FreeformError::EmptyMessage);
        }

        let message_id = self
            .gateway
            .send_text(&registration.guest_phone, message)
            .await?;

        let entry = MessageLogEntry {
            registration_id: registration.id,
            direction: MessageDirection::Outbound,
            body: message.to_string(),
            kind: "content".to_string(),
            at: Timestamp::now(),
        };
        if let Err(err) = self.message_log.record(entry).await {
            tracing::warn!(error = %err, "failed to record outbound message");
        }

        // Pause any in-flight capture so the guest's reply to this message
        // is not consumed as a travel answer.
        if let Err(err) = self.capture.pause(&registration.id).await {
            tracing::warn!(error = %err, registration_id = %registration.id, "failed to pause capture session");
        }

        Ok(message_id)
    }
}
