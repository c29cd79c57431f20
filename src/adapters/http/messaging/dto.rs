//! Messaging request/response DTOs.

use serde::{Deserialize, Serialize};

/// Staff request to send a free-form message.
#[derive(Debug, Deserialize)]
pub struct SendFreeformRequest {
    pub event_registration_id: String,
    #[serde(default)]
    pub message: String,
}

/// Send outcome.
#[derive(Debug, Serialize)]
pub struct SendFreeformResponse {
    pub ok: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendFreeformResponse {
    pub fn sent(message_id: String) -> Self {
        Self {
            ok: true,
            status: "sent",
            message_id: Some(message_id),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: "failed",
            message_id: None,
            error: Some(error.into()),
        }
    }
}
