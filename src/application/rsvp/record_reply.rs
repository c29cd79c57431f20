//! RsvpReplyHandler - records a guest's RSVP reply and confirms it.
//!
//! Drives the simpler single-field status machine. Shares the
//! `responded_on` marker with the travel flow; the "yes" confirmation menu
//! is what later launches the travel dialogue (via the `tc|start_travel|…`
//! button the travel webhook falls through on).

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::{DomainError, RegistrationId, Timestamp, WaId};
use crate::domain::rsvp::RsvpStatus;
use crate::ports::{
    Button, MessageDirection, MessageLog, MessageLogEntry, MessagingGateway, Registration,
    RegistrationStore, SendTrackingStore,
};

/// Command to record one RSVP reply.
#[derive(Debug, Clone)]
pub struct RsvpReplyCommand {
    /// Raw status from the upstream relay (`yes` / `no` / `maybe`).
    pub status: String,
    /// Direct registration reference, when the relay has one.
    pub registration_id: Option<RegistrationId>,
    /// Sender phone, used for send-map resolution otherwise.
    pub wa_id: Option<String>,
    /// Reply timestamp; defaults to now.
    pub responded_on: Option<Timestamp>,
}

/// Result of processing a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsvpReplyResult {
    Updated {
        registration_id: RegistrationId,
        status: RsvpStatus,
    },
    /// No registration could be resolved; acknowledged and logged only.
    Unresolved,
}

/// Errors surfaced to the webhook layer.
#[derive(Debug, Error)]
pub enum RsvpError {
    #[error("invalid rsvp_status '{0}'")]
    InvalidStatus(String),

    #[error("registration not found: {0}")]
    RegistrationNotFound(RegistrationId),

    #[error(transparent)]
    Storage(#[from] DomainError),
}

pub struct RsvpReplyHandler {
    registrations: Arc<dyn RegistrationStore>,
    send_tracking: Arc<dyn SendTrackingStore>,
    gateway: Arc<dyn MessagingGateway>,
    message_log: Arc<dyn MessageLog>,
}

impl RsvpReplyHandler {
    pub fn new(
        registrations: Arc<dyn RegistrationStore>,
        send_tracking: Arc<dyn SendTrackingStore>,
        gateway: Arc<dyn MessagingGateway>,
        message_log: Arc<dyn MessageLog>,
    ) -> Self {
        Self {
            registrations,
            send_tracking,
            gateway,
            message_log,
        }
    }

    pub async fn handle(&self, cmd: RsvpReplyCommand) -> Result<RsvpReplyResult, RsvpError> {
        let status = RsvpStatus::from_reply(&cmd.status)
            .ok_or_else(|| RsvpError::InvalidStatus(cmd.status.clone()))?;

        let Some(registration) = self.resolve(&cmd).await? else {
            tracing::info!(wa_id = ?cmd.wa_id, "rsvp reply could not be correlated, dropping");
            return Ok(RsvpReplyResult::Unresolved);
        };

        let responded_on = cmd.responded_on.unwrap_or_else(Timestamp::now);
        self.registrations
            .update_rsvp(&registration.id, status)
            .await?;
        self.registrations
            .mark_responded(&registration.id, responded_on)
            .await?;

        let entry = MessageLogEntry {
            registration_id: registration.id,
            direction: MessageDirection::Inbound,
            body: format!("RSVP: {status}"),
            kind: "rsvp".to_string(),
            at: responded_on,
        };
        if let Err(err) = self.message_log.record(entry).await {
            tracing::warn!(error = %err, "failed to record rsvp reply");
        }

        // Confirmation is best effort - a gateway hiccup must not lose the
        // recorded status.
        if let Err(err) = self.send_confirmation(&registration, status).await {
            tracing::error!(error = %err, registration_id = %registration.id, "failed to send rsvp confirmation");
        }

        if let Err(err) = self
            .send_tracking
            .mark_consumed(&registration.id, responded_on)
            .await
        {
            tracing::warn!(error = %err, "failed to mark send map consumed");
        }

        Ok(RsvpReplyResult::Updated {
            registration_id: registration.id,
            status,
        })
    }

    async fn resolve(&self, cmd: &RsvpReplyCommand) -> Result<Option<Registration>, RsvpError> {
        if let Some(id) = cmd.registration_id {
            return self
                .registrations
                .find_by_id(&id)
                .await?
                .ok_or(RsvpError::RegistrationNotFound(id))
                .map(Some);
        }

        let Some(raw) = cmd.wa_id.as_deref() else {
            return Ok(None);
        };
        let Ok(wa_id) = WaId::parse(raw) else {
            return Ok(None);
        };
        let Some(registration_id) = self.send_tracking.latest_for(&wa_id).await? else {
            return Ok(None);
        };
        Ok(self.registrations.find_by_id(&registration_id).await?)
    }

    async fn send_confirmation(
        &self,
        registration: &Registration,
        status: RsvpStatus,
    ) -> Result<(), crate::ports::GatewayError> {
        let phone = &registration.guest_phone;
        match status {
            RsvpStatus::Yes => {
                let body = "\u{2705} Perfect! Your RSVP has been confirmed.\n\n\
                            We're looking forward to seeing you! \u{1F389}\n\n\
                            What would you like to do next?";
                let buttons = vec![
                    Button {
                        id: format!("tc|start_travel|{}", registration.id),
                        title: "Add Travel Details".to_string(),
                    },
                    Button {
                        id: format!("tc|update_rsvp_menu|{}", registration.id),
                        title: "Update RSVP".to_string(),
                    },
                    Button {
                        id: format!("tc|remind_later|{}", registration.id),
                        title: "Remind Me Later".to_string(),
                    },
                ];
                self.gateway
                    .send_choice_buttons(phone, body, &buttons, None, None)
                    .await?;
            }
            RsvpStatus::No => {
                let body = "Thank you for letting us know.\n\n\
                            Your RSVP has been updated to: Not Attending \u{274C}\n\n\
                            We hope to see you at future events!";
                self.gateway.send_text(phone, body).await?;
            }
            RsvpStatus::Maybe => {
                let body = "No problem! Your RSVP has been updated to: Maybe \u{1F914}\n\n\
                            Please let us know when you decide!";
                self.gateway.send_text(phone, body).await?;
            }
            // from_reply never yields these.
            RsvpStatus::NotSent | RsvpStatus::Pending => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{
        registration, InMemoryRegistrationStore, InMemorySendTracking, RecordingGateway,
        RecordingMessageLog, Sent,
    };

    struct Harness {
        handler: RsvpReplyHandler,
        registrations: Arc<InMemoryRegistrationStore>,
        send_tracking: Arc<InMemorySendTracking>,
        gateway: Arc<RecordingGateway>,
        message_log: Arc<RecordingMessageLog>,
        reg: Registration,
    }

    fn harness() -> Harness {
        let reg = registration();
        let registrations = Arc::new(InMemoryRegistrationStore::with_registration(reg.clone()));
        let send_tracking = Arc::new(InMemorySendTracking::new());
        send_tracking.track(&reg.guest_phone, reg.id);
        let gateway = Arc::new(RecordingGateway::new());
        let message_log = Arc::new(RecordingMessageLog::new());

        let handler = RsvpReplyHandler::new(
            registrations.clone(),
            send_tracking.clone(),
            gateway.clone(),
            message_log.clone(),
        );
        Harness {
            handler,
            registrations,
            send_tracking,
            gateway,
            message_log,
            reg,
        }
    }

    fn reply(status: &str, reg: &Registration) -> RsvpReplyCommand {
        RsvpReplyCommand {
            status: status.to_string(),
            registration_id: None,
            wa_id: Some(reg.guest_phone.as_str().to_string()),
            responded_on: None,
        }
    }

    #[tokio::test]
    async fn yes_updates_status_and_sends_travel_menu() {
        let h = harness();

        let result = h.handler.handle(reply("yes", &h.reg)).await.unwrap();

        assert_eq!(
            result,
            RsvpReplyResult::Updated {
                registration_id: h.reg.id,
                status: RsvpStatus::Yes
            }
        );
        assert_eq!(
            h.registrations.get(&h.reg.id).unwrap().rsvp_status,
            RsvpStatus::Yes
        );
        match &h.gateway.sent()[..] {
            [Sent::Buttons { ids, .. }] => {
                assert_eq!(ids[0], format!("tc|start_travel|{}", h.reg.id));
                assert_eq!(ids.len(), 3);
            }
            other => panic!("expected post-rsvp menu, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_and_maybe_send_plain_confirmations() {
        for status in ["no", "maybe"] {
            let h = harness();
            h.handler.handle(reply(status, &h.reg)).await.unwrap();
            assert!(matches!(&h.gateway.sent()[..], [Sent::Text { .. }]));
        }
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let h = harness();

        let result = h.handler.handle(reply("dunno", &h.reg)).await;
        assert!(matches!(result, Err(RsvpError::InvalidStatus(_))));
    }

    #[tokio::test]
    async fn unresolvable_phone_is_acknowledged_as_unresolved() {
        let h = harness();
        let cmd = RsvpReplyCommand {
            status: "yes".to_string(),
            registration_id: None,
            wa_id: Some("15550009999".to_string()),
            responded_on: None,
        };

        let result = h.handler.handle(cmd).await.unwrap();
        assert_eq!(result, RsvpReplyResult::Unresolved);
        assert!(h.gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn direct_registration_reference_wins_over_send_map() {
        let h = harness();
        let cmd = RsvpReplyCommand {
            status: "no".to_string(),
            registration_id: Some(h.reg.id),
            wa_id: None,
            responded_on: None,
        };

        let result = h.handler.handle(cmd).await.unwrap();
        assert!(matches!(result, RsvpReplyResult::Updated { .. }));
    }

    #[tokio::test]
    async fn unknown_direct_reference_errors() {
        let h = harness();
        let cmd = RsvpReplyCommand {
            status: "no".to_string(),
            registration_id: Some(RegistrationId::new()),
            wa_id: None,
            responded_on: None,
        };

        assert!(matches!(
            h.handler.handle(cmd).await,
            Err(RsvpError::RegistrationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn confirmation_send_failure_does_not_lose_the_status() {
        let h = harness();
        h.gateway.fail_sends();

        let result = h.handler.handle(reply("yes", &h.reg)).await.unwrap();

        assert!(matches!(result, RsvpReplyResult::Updated { .. }));
        assert_eq!(
            h.registrations.get(&h.reg.id).unwrap().rsvp_status,
            RsvpStatus::Yes
        );
    }

    #[tokio::test]
    async fn reply_touches_responded_on_marks_consumed_and_logs() {
        let h = harness();
        let before = h.registrations.get(&h.reg.id).unwrap().responded_on.unwrap();

        h.handler.handle(reply("maybe", &h.reg)).await.unwrap();

        let after = h.registrations.get(&h.reg.id).unwrap().responded_on.unwrap();
        assert!(!after.is_before(&before));
        assert_eq!(h.send_tracking.consumed(), vec![h.reg.id]);
        let entries = h.message_log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body, "RSVP: maybe");
    }
}
