//! HTTP adapters - axum routers and DTOs.

pub mod messaging;
pub mod token;
pub mod webhooks;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use messaging::{messaging_routes, MessagingHandlers};
use webhooks::{webhook_routes, WebhookHandlers};

/// Assembles the full API router.
pub fn api_router(webhooks: WebhookHandlers, messaging: MessagingHandlers) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/webhooks", webhook_routes(webhooks))
        .nest("/api/messages", messaging_routes(messaging))
}

/// GET /health - liveness probe
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
