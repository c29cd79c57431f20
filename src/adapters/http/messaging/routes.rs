//! HTTP routes for staff messaging endpoints.

use axum::{routing::post, Router};

use super::handlers::{send_freeform, MessagingHandlers};

/// Creates the messaging router.
pub fn messaging_routes(handlers: MessagingHandlers) -> Router {
    Router::new()
        .route("/freeform", post(send_freeform))
        .with_state(handlers)
}
