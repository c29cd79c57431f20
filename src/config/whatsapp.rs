//! WhatsApp Business API configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// WhatsApp Cloud API credentials and webhook settings
#[derive(Debug, Clone, Deserialize)]
pub struct WhatsAppConfig {
    /// Graph API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// WABA access token
    pub access_token: Secret<String>,

    /// Sender phone number id
    pub phone_number_id: String,

    /// Approved re-engagement template name
    #[serde(default = "default_resume_template")]
    pub resume_template_name: String,

    /// Template language code
    #[serde(default = "default_resume_template_lang")]
    pub resume_template_lang: String,

    /// Shared secret expected in X-Webhook-Token headers
    pub webhook_secret: Secret<String>,

    /// Outbound request timeout in seconds
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

impl WhatsAppConfig {
    /// Validate WhatsApp configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.access_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingWhatsAppSetting("access_token"));
        }
        if self.phone_number_id.is_empty() {
            return Err(ValidationError::MissingWhatsAppSetting("phone_number_id"));
        }
        if self.webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingWhatsAppSetting("webhook_secret"));
        }
        Ok(())
    }
}

fn default_api_base() -> String {
    "https://graph.facebook.com/v21.0".to_string()
}

fn default_resume_template() -> String {
    "resume_conversation".to_string()
}

fn default_resume_template_lang() -> String {
    "en_US".to_string()
}

fn default_send_timeout() -> u64 {
    15
}
