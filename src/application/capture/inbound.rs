//! Inbound travel-event dispatch.
//!
//! Receives normalized events from the upstream messaging gateway, resolves
//! the target registration, and delegates to the capture flow. Every drop is
//! silent from the guest's perspective; the HTTP layer always acks.

use std::sync::Arc;

use crate::domain::capture::prompts::BUTTON_NAMESPACE;
use crate::domain::capture::Step;
use crate::domain::foundation::{RegistrationId, Timestamp, WaId};
use crate::ports::{
    MessageDirection, MessageLog, MessageLogEntry, MessagingGateway, Registration,
    RegistrationStore, SendTrackingStore,
};

use super::flow::{CaptureError, CaptureFlow, TextReply};

/// One normalized inbound event, shape owned by the upstream webhook relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Guest tapped the resume template's quick reply; the payload embeds
    /// the registration (`resume|<registration_id>`).
    Resume { payload: String },
    /// Guest typed a wake word (e.g. "travel", "continue").
    Wake,
    /// Guest tapped an in-session button (`tc|<step>|<value>`).
    Button { button_id: String },
    /// Free-text reply.
    Text { body: String },
}

/// Dispatches inbound travel events to the capture flow.
pub struct InboundEventHandler {
    flow: Arc<CaptureFlow>,
    registrations: Arc<dyn RegistrationStore>,
    send_tracking: Arc<dyn SendTrackingStore>,
    gateway: Arc<dyn MessagingGateway>,
    message_log: Arc<dyn MessageLog>,
}

impl InboundEventHandler {
    pub fn new(
        flow: Arc<CaptureFlow>,
        registrations: Arc<dyn RegistrationStore>,
        send_tracking: Arc<dyn SendTrackingStore>,
        gateway: Arc<dyn MessagingGateway>,
        message_log: Arc<dyn MessageLog>,
    ) -> Self {
        Self {
            flow,
            registrations,
            send_tracking,
            gateway,
            message_log,
        }
    }

    /// Handles one event. Unresolvable or malformed events are dropped
    /// (logged, `Ok`); only storage/gateway failures propagate, and the
    /// HTTP layer logs those and acks anyway.
    pub async fn handle(&self, raw_wa_id: &str, event: InboundEvent) -> Result<(), CaptureError> {
        if let InboundEvent::Resume { payload } = &event {
            return self.handle_resume(payload).await;
        }

        let Ok(wa_id) = WaId::parse(raw_wa_id) else {
            tracing::warn!(wa_id = raw_wa_id, "dropping event with unusable phone");
            return Ok(());
        };
        let Some(registration_id) = self.send_tracking.latest_for(&wa_id).await? else {
            tracing::debug!(wa_id = %wa_id, "no send-tracking match, dropping event");
            return Ok(());
        };
        let Some(registration) = self.registrations.find_by_id(&registration_id).await? else {
            tracing::warn!(registration_id = %registration_id, "tracked registration vanished");
            return Ok(());
        };

        // Out of window: re-open via the approved template before anything
        // else. Gate on the stored marker - touching it first would make
        // the gate unreachable.
        if !self
            .gateway
            .within_24h_window(registration.responded_on.as_ref())
        {
            self.gateway
                .send_resume_opener(
                    &registration.guest_phone,
                    &registration.id,
                    registration.guest_name.as_deref(),
                )
                .await?;
            return Ok(());
        }

        let now = Timestamp::now();
        self.registrations
            .mark_responded(&registration.id, now)
            .await?;
        let registration = Registration {
            responded_on: Some(now),
            ..registration
        };

        match event {
            // Resume returned early above.
            InboundEvent::Resume { .. } => Ok(()),
            InboundEvent::Wake => self.flow.resume_or_start(&registration).await,
            InboundEvent::Button { button_id } => {
                self.log_inbound(&registration, &button_id, now).await;
                self.handle_button(&registration, &button_id).await
            }
            InboundEvent::Text { body } => {
                let text = body.trim().to_string();
                if text.is_empty() {
                    return Ok(());
                }
                self.log_inbound(&registration, &text, now).await;
                self.handle_text(&registration, &text).await
            }
        }
    }

    async fn handle_resume(&self, payload: &str) -> Result<(), CaptureError> {
        let Some(raw_id) = payload.strip_prefix("resume|") else {
            tracing::warn!(payload, "dropping resume event with bad payload");
            return Ok(());
        };
        let Ok(registration_id) = raw_id.parse::<RegistrationId>() else {
            tracing::warn!(payload, "dropping resume event with unparseable id");
            return Ok(());
        };
        let Some(registration) = self.registrations.find_by_id(&registration_id).await? else {
            tracing::debug!(registration_id = %registration_id, "resume for unknown registration");
            return Ok(());
        };
        self.flow.resume_or_start(&registration).await
    }

    async fn handle_button(
        &self,
        registration: &Registration,
        button_id: &str,
    ) -> Result<(), CaptureError> {
        let mut parts = button_id.splitn(3, '|');
        let (Some(namespace), Some(step_name), Some(value)) =
            (parts.next(), parts.next(), parts.next())
        else {
            tracing::debug!(button_id, "dropping malformed button id");
            return Ok(());
        };
        if namespace != BUTTON_NAMESPACE {
            tracing::debug!(button_id, "dropping button from foreign namespace");
            return Ok(());
        }

        match step_name.parse::<Step>() {
            Ok(step) => self.flow.apply_button_choice(registration, step, value).await,
            // Non-step actions in our namespace (e.g. the post-RSVP
            // "Add Travel Details" menu) fall through to prompting,
            // which starts or continues the dialogue.
            Err(_) => self.flow.send_next_prompt(registration).await,
        }
    }

    async fn handle_text(
        &self,
        registration: &Registration,
        text: &str,
    ) -> Result<(), CaptureError> {
        let reply = self.flow.apply_text_answer(registration, text).await?;
        match reply {
            TextReply::Invalid { hint } => {
                self.gateway
                    .send_text(&registration.guest_phone, &hint)
                    .await?;
            }
            TextReply::Completed { message } => {
                self.gateway
                    .send_text(&registration.guest_phone, &message)
                    .await?;
            }
            TextReply::NextPrompt { step, prompt } => {
                if step.has_buttons() {
                    self.flow.send_next_prompt(registration).await?;
                } else {
                    self.gateway
                        .send_text(&registration.guest_phone, &prompt)
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn log_inbound(&self, registration: &Registration, body: &str, at: Timestamp) {
        let entry = MessageLogEntry {
            registration_id: registration.id,
            direction: MessageDirection::Inbound,
            body: body.to_string(),
            kind: "travel".to_string(),
            at,
        };
        if let Err(err) = self.message_log.record(entry).await {
            tracing::warn!(error = %err, "failed to record inbound message");
        }
    }
}
