//! Webhook request/response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::capture::InboundEvent;

/// Normalized travel event as posted by the upstream relay.
#[derive(Debug, Deserialize)]
pub struct TravelEventRequest {
    pub kind: String,
    #[serde(default)]
    pub wa_id: String,
    /// `resume|<registration_id>` when kind == resume
    #[serde(default)]
    pub payload: Option<String>,
    /// `tc|<step>|<value>` when kind == button
    #[serde(default)]
    pub button_id: Option<String>,
    /// Free text when kind == text
    #[serde(default)]
    pub text: Option<String>,
}

impl TravelEventRequest {
    /// Maps the wire shape onto the application event, `None` for
    /// unrecognized kinds.
    pub fn into_event(self) -> Option<(String, InboundEvent)> {
        let event = match self.kind.as_str() {
            "resume" => InboundEvent::Resume {
                payload: self.payload.unwrap_or_default(),
            },
            "wake" => InboundEvent::Wake,
            "button" => InboundEvent::Button {
                button_id: self.button_id.unwrap_or_default(),
            },
            "text" => InboundEvent::Text {
                body: self.text.unwrap_or_default(),
            },
            _ => return None,
        };
        Some((self.wa_id, event))
    }
}

/// RSVP reply as posted by the upstream relay.
#[derive(Debug, Deserialize)]
pub struct RsvpWebhookRequest {
    #[serde(default)]
    pub rsvp_status: String,
    #[serde(default)]
    pub event_registration_id: Option<String>,
    #[serde(default)]
    pub wa_id: Option<String>,
    #[serde(default)]
    pub responded_on: Option<DateTime<Utc>>,
}

/// Idempotent acknowledgement body.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// RSVP webhook response body.
#[derive(Debug, Serialize)]
pub struct RsvpResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsvp_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standalone: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RsvpResponse {
    pub fn updated(id: String, status: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            rsvp_status: Some(status),
            standalone: None,
            error: None,
        }
    }

    pub fn standalone() -> Self {
        Self {
            ok: true,
            id: None,
            rsvp_status: None,
            standalone: Some(true),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            rsvp_status: None,
            standalone: None,
            error: Some(message.into()),
        }
    }
}
