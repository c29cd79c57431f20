//! HTTP handlers for the webhook endpoints.
//!
//! The travel webhook honours the idempotent-ack contract: every request is
//! answered `200 {"ok": true}`, including malformed bodies and internal
//! failures - the upstream relay has no retry/backoff contract to honour,
//! so errors are logged server-side only.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use secrecy::Secret;

use crate::application::capture::InboundEventHandler;
use crate::application::rsvp::{RsvpError, RsvpReplyCommand, RsvpReplyHandler, RsvpReplyResult};
use crate::adapters::http::token::verify_webhook_token;
use crate::domain::foundation::{RegistrationId, Timestamp};

use super::dto::{AckResponse, RsvpResponse, RsvpWebhookRequest, TravelEventRequest};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct WebhookHandlers {
    travel: Arc<InboundEventHandler>,
    rsvp: Arc<RsvpReplyHandler>,
    webhook_secret: Secret<String>,
}

impl WebhookHandlers {
    pub fn new(
        travel: Arc<InboundEventHandler>,
        rsvp: Arc<RsvpReplyHandler>,
        webhook_secret: Secret<String>,
    ) -> Self {
        Self {
            travel,
            rsvp,
            webhook_secret,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/travel - normalized travel conversation events
pub async fn travel_webhook(
    State(handlers): State<WebhookHandlers>,
    body: Bytes,
) -> (StatusCode, Json<AckResponse>) {
    // Body is parsed by hand so malformed JSON is dropped-and-acked instead
    // of bounced by the extractor.
    let request: TravelEventRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(error = %err, "dropping unparseable travel webhook body");
            return (StatusCode::OK, Json(AckResponse::ok()));
        }
    };

    let Some((wa_id, event)) = request.into_event() else {
        tracing::warn!("dropping travel webhook with unrecognized kind");
        return (StatusCode::OK, Json(AckResponse::ok()));
    };

    if let Err(err) = handlers.travel.handle(&wa_id, event).await {
        tracing::error!(error = %err, "travel webhook processing failed");
    }
    (StatusCode::OK, Json(AckResponse::ok()))
}

/// POST /api/webhooks/rsvp - RSVP side-channel replies
pub async fn rsvp_webhook(
    State(handlers): State<WebhookHandlers>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !verify_webhook_token(&headers, &handlers.webhook_secret) {
        return (
            StatusCode::FORBIDDEN,
            Json(RsvpResponse::error("invalid token")),
        )
            .into_response();
    }

    let request: RsvpWebhookRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RsvpResponse::error("invalid json")),
            )
                .into_response()
        }
    };

    let registration_id = match request
        .event_registration_id
        .as_deref()
        .map(str::parse::<RegistrationId>)
        .transpose()
    {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RsvpResponse::error("invalid event_registration_id")),
            )
                .into_response()
        }
    };

    let cmd = RsvpReplyCommand {
        status: request.rsvp_status,
        registration_id,
        wa_id: request.wa_id,
        responded_on: request.responded_on.map(Timestamp::from_datetime),
    };

    match handlers.rsvp.handle(cmd).await {
        Ok(RsvpReplyResult::Updated {
            registration_id,
            status,
        }) => (
            StatusCode::OK,
            Json(RsvpResponse::updated(
                registration_id.to_string(),
                status.to_string(),
            )),
        )
            .into_response(),
        Ok(RsvpReplyResult::Unresolved) => {
            (StatusCode::OK, Json(RsvpResponse::standalone())).into_response()
        }
        Err(RsvpError::InvalidStatus(status)) => (
            StatusCode::BAD_REQUEST,
            Json(RsvpResponse::error(format!("invalid rsvp_status '{status}'"))),
        )
            .into_response(),
        Err(RsvpError::RegistrationNotFound(_)) => (
            StatusCode::BAD_REQUEST,
            Json(RsvpResponse::error("registration not found")),
        )
            .into_response(),
        Err(RsvpError::Storage(err)) => {
            tracing::error!(error = %err, "rsvp webhook storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RsvpResponse::error("internal error")),
            )
                .into_response()
        }
    }
}
