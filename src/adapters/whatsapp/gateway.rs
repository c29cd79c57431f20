//! CloudApiGateway - MessagingGateway over the WhatsApp Graph API.
//!
//! Speaks the Cloud API `messages` endpoint: free-form text, interactive
//! reply buttons (up to 3, 20-character titles), and the approved
//! re-engagement template whose quick-reply payload carries
//! `resume|<registration_id>`.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::WhatsAppConfig;
use crate::domain::foundation::{RegistrationId, Timestamp, WaId};
use crate::ports::{Button, GatewayError, MessagingGateway};

/// Free-form messages are allowed for 24 hours after the guest's last
/// inbound message.
const SERVICE_WINDOW_HOURS: i64 = 24;

/// Interactive reply button title limit imposed by the API.
const BUTTON_TITLE_MAX: usize = 20;

/// WhatsApp Cloud API implementation of [`MessagingGateway`].
pub struct CloudApiGateway {
    config: WhatsAppConfig,
    client: Client,
}

impl CloudApiGateway {
    /// Creates a gateway from validated configuration.
    pub fn new(config: WhatsAppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/messages",
            self.config.api_base, self.config.phone_number_id
        )
    }

    async fn post_message(&self, payload: Value) -> Result<String, GatewayError> {
        let token = self.config.access_token.expose_secret();
        if token.is_empty() || self.config.phone_number_id.is_empty() {
            return Err(GatewayError::MissingCredentials);
        }

        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let data: Value = response.json().await.unwrap_or(Value::Null);
        if status.as_u16() >= 300 {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                detail: data.to_string(),
            });
        }
        Ok(first_message_id(&data))
    }
}

#[async_trait]
impl MessagingGateway for CloudApiGateway {
    async fn send_text(&self, to: &WaId, body: &str) -> Result<String, GatewayError> {
        self.post_message(json!({
            "messaging_product": "whatsapp",
            "to": to.as_str(),
            "type": "text",
            "text": { "body": body },
        }))
        .await
    }

    async fn send_choice_buttons(
        &self,
        to: &WaId,
        body: &str,
        buttons: &[Button],
        header: Option<&str>,
        footer: Option<&str>,
    ) -> Result<String, GatewayError> {
        let rendered: Vec<Value> = buttons
            .iter()
            .take(3)
            .map(|b| {
                json!({
                    "type": "reply",
                    "reply": { "id": b.id, "title": truncate_title(&b.title) },
                })
            })
            .collect();

        if rendered.is_empty() {
            return self.send_text(to, body).await;
        }

        let mut interactive = json!({
            "type": "button",
            "body": { "text": body },
            "action": { "buttons": rendered },
        });
        if let Some(header) = header {
            interactive["header"] = json!({ "type": "text", "text": header });
        }
        if let Some(footer) = footer {
            interactive["footer"] = json!({ "text": footer });
        }

        self.post_message(json!({
            "messaging_product": "whatsapp",
            "to": to.as_str(),
            "type": "interactive",
            "interactive": interactive,
        }))
        .await
    }

    async fn send_resume_opener(
        &self,
        to: &WaId,
        registration_id: &RegistrationId,
        name_param: Option<&str>,
    ) -> Result<String, GatewayError> {
        let mut components = Vec::new();
        if let Some(name) = name_param {
            components.push(json!({
                "type": "body",
                "parameters": [{ "type": "text", "text": name }],
            }));
        }
        components.push(json!({
            "type": "button",
            "sub_type": "quick_reply",
            "index": 0,
            "parameters": [{
                "type": "payload",
                "payload": format!("resume|{registration_id}"),
            }],
        }));

        self.post_message(json!({
            "messaging_product": "whatsapp",
            "to": to.as_str(),
            "type": "template",
            "template": {
                "name": self.config.resume_template_name,
                "language": { "code": self.config.resume_template_lang },
                "components": components,
            },
        }))
        .await
    }

    fn within_24h_window(&self, last_responded_at: Option<&Timestamp>) -> bool {
        match last_responded_at {
            Some(last) => Timestamp::now().hours_since(last) < SERVICE_WINDOW_HOURS,
            // Never heard from the guest: only templates may go out.
            None => false,
        }
    }
}

fn truncate_title(title: &str) -> String {
    title.chars().take(BUTTON_TITLE_MAX).collect()
}

fn first_message_id(data: &Value) -> String {
    data.get("messages")
        .and_then(|m| m.get(0))
        .and_then(|m| m.get("id"))
        .and_then(|id| id.as_str())
        .unwrap_or_default()
        .to_string()
}
