//! Messaging gateway port (outbound WhatsApp transport).
//!
//! The transport itself lives behind this trait; the capture flow only knows
//! "send text", "send buttons", "send the resume template", and the
//! 24-hour-window predicate that decides between the first two and the last.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::prompts::ChoiceButton;
use crate::domain::foundation::{RegistrationId, Timestamp, WaId};

/// Errors from the outbound transport.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("messaging credentials are missing or incomplete")]
    MissingCredentials,

    #[error("provider rejected the message ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

/// One interactive quick-reply button, owned so ids can embed runtime values
/// (e.g. a registration id in post-RSVP menus).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub id: String,
    pub title: String,
}

impl From<&ChoiceButton> for Button {
    fn from(button: &ChoiceButton) -> Self {
        Self {
            id: button.id.to_string(),
            title: button.title.to_string(),
        }
    }
}

/// Outbound WhatsApp messaging capability.
///
/// Send methods return the provider message id. Implementations own the
/// messaging-window policy; callers only consult the predicate.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Sends a free-form text (only valid within the 24-hour window).
    async fn send_text(&self, to: &WaId, body: &str) -> Result<String, GatewayError>;

    /// Sends an interactive button message (up to 3 buttons).
    async fn send_choice_buttons(
        &self,
        to: &WaId,
        body: &str,
        buttons: &[Button],
        header: Option<&str>,
        footer: Option<&str>,
    ) -> Result<String, GatewayError>;

    /// Sends the approved re-engagement template whose quick-reply payload
    /// is `resume|<registration_id>`, usable outside the window.
    async fn send_resume_opener(
        &self,
        to: &WaId,
        registration_id: &RegistrationId,
        name_param: Option<&str>,
    ) -> Result<String, GatewayError>;

    /// True if a free-form message may still be sent given the guest's last
    /// inbound timestamp.
    fn within_24h_window(&self, last_responded_at: Option<&Timestamp>) -> bool;
}
