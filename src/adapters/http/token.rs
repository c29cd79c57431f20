//! Shared-secret verification for staff-facing webhook endpoints.

use axum::http::HeaderMap;
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

/// Header carrying the shared webhook secret.
pub const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

/// Constant-time check of the `X-Webhook-Token` header.
///
/// An empty configured secret fails closed.
pub fn verify_webhook_token(headers: &HeaderMap, secret: &Secret<String>) -> bool {
    let provided = headers
        .get(WEBHOOK_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .trim();
    let expected = secret.expose_secret().trim();
    if expected.is_empty() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
