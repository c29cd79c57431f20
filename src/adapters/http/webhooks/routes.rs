//! HTTP routes for webhook endpoints.

use axum::{routing::post, Router};

use super::handlers::{rsvp_webhook, travel_webhook, WebhookHandlers};

/// Creates the webhook router.
pub fn webhook_routes(handlers: WebhookHandlers) -> Router {
    Router::new()
        .route("/travel", post(travel_webhook))
        .route("/rsvp", post(rsvp_webhook))
        .with_state(handlers)
}
