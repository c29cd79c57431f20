//! Webhook endpoints for inbound guest traffic.

mod dto;
mod handlers;
mod routes;

pub use handlers::WebhookHandlers;
pub use routes::webhook_routes;
