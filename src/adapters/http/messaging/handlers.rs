//! HTTP handlers for staff messaging endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use secrecy::Secret;

use crate::adapters::http::token::verify_webhook_token;
use crate::application::messaging::{FreeformError, SendFreeformCommand, SendFreeformHandler};
use crate::domain::foundation::RegistrationId;

use super::dto::{SendFreeformRequest, SendFreeformResponse};

#[derive(Clone)]
pub struct MessagingHandlers {
    freeform: Arc<SendFreeformHandler>,
    webhook_secret: Secret<String>,
}

impl MessagingHandlers {
    pub fn new(freeform: Arc<SendFreeformHandler>, webhook_secret: Secret<String>) -> Self {
        Self {
            freeform,
            webhook_secret,
        }
    }
}

/// POST /api/messages/freeform - send a free-form message to a guest
pub async fn send_freeform(
    State(handlers): State<MessagingHandlers>,
    headers: HeaderMap,
    Json(request): Json<SendFreeformRequest>,
) -> Response {
    if !verify_webhook_token(&headers, &handlers.webhook_secret) {
        return (
            StatusCode::FORBIDDEN,
            Json(SendFreeformResponse::failed("invalid token")),
        )
            .into_response();
    }

    let registration_id = match request.event_registration_id.parse::<RegistrationId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SendFreeformResponse::failed("invalid event_registration_id")),
            )
                .into_response()
        }
    };

    let cmd = SendFreeformCommand {
        registration_id,
        message: request.message,
    };

    match handlers.freeform.handle(cmd).await {
        Ok(message_id) => {
            (StatusCode::OK, Json(SendFreeformResponse::sent(message_id))).into_response()
        }
        Err(err @ FreeformError::RegistrationNotFound(_)) => (
            StatusCode::BAD_REQUEST,
            Json(SendFreeformResponse::failed(err.to_string())),
        )
            .into_response(),
        Err(err @ FreeformError::WindowExpired) | Err(err @ FreeformError::EmptyMessage) => (
            StatusCode::BAD_REQUEST,
            Json(SendFreeformResponse::failed(err.to_string())),
        )
            .into_response(),
        Err(FreeformError::Gateway(err)) => {
            tracing::error!(error = %err, "freeform send failed at the gateway");
            (
                StatusCode::BAD_GATEWAY,
                Json(SendFreeformResponse::failed(format!(
                    "WhatsApp API error: {err}"
                ))),
            )
                .into_response()
        }
        Err(FreeformError::Storage(err)) => {
            tracing::error!(error = %err, "freeform send storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SendFreeformResponse::failed("internal error")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::capture::CaptureFlow;
    use crate::application::testing::{
        registration, InMemoryCaptureStore, InMemoryRegistrationStore, RecordingGateway,
        RecordingMessageLog,
    };
    use crate::ports::Registration;
    use axum::http::HeaderValue;

    fn handlers() -> (MessagingHandlers, Registration, Arc<RecordingGateway>) {
        let reg = registration();
        let registrations = Arc::new(InMemoryRegistrationStore::with_registration(reg.clone()));
        let captures = Arc::new(InMemoryCaptureStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let message_log = Arc::new(RecordingMessageLog::new());
        let capture = Arc::new(CaptureFlow::new(captures, gateway.clone()));
        let freeform = Arc::new(SendFreeformHandler::new(
            registrations,
            gateway.clone(),
            capture,
            message_log,
        ));
        (
            MessagingHandlers::new(freeform, Secret::new("s3cret".to_string())),
            reg,
            gateway,
        )
    }

    fn auth_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-webhook-token", HeaderValue::from_static("s3cret"));
        headers
    }

    #[tokio::test]
    async fn sends_within_window() {
        let (handlers, reg, gateway) = handlers();

        let response = send_freeform(
            State(handlers),
            auth_headers(),
            Json(SendFreeformRequest {
                event_registration_id: reg.id.to_string(),
                message: "hello".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(gateway.sent().len(), 1);
    }

    #[tokio::test]
    async fn rejects_bad_token() {
        let (handlers, reg, _) = handlers();

        let response = send_freeform(
            State(handlers),
            HeaderMap::new(),
            Json(SendFreeformRequest {
                event_registration_id: reg.id.to_string(),
                message: "hello".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn rejects_expired_window() {
        let (handlers, reg, gateway) = handlers();
        gateway.close_window();

        let response = send_freeform(
            State(handlers),
            auth_headers(),
            Json(SendFreeformRequest {
                event_registration_id: reg.id.to_string(),
                message: "hello".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn gateway_failure_maps_to_bad_gateway() {
        let (handlers, reg, gateway) = handlers();
        gateway.fail_sends();

        let response = send_freeform(
            State(handlers),
            auth_headers(),
            Json(SendFreeformRequest {
                event_registration_id: reg.id.to_string(),
                message: "hello".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
