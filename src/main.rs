//! Guestflow service entry point.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use guestflow::adapters::http::messaging::MessagingHandlers;
use guestflow::adapters::http::webhooks::WebhookHandlers;
use guestflow::adapters::http::api_router;
use guestflow::adapters::postgres::{
    PostgresCaptureStore, PostgresMessageLog, PostgresRegistrationStore, PostgresSendTracking,
};
use guestflow::adapters::whatsapp::CloudApiGateway;
use guestflow::application::capture::{CaptureFlow, InboundEventHandler};
use guestflow::application::messaging::SendFreeformHandler;
use guestflow::application::rsvp::RsvpReplyHandler;
use guestflow::config::AppConfig;
use guestflow::ports::{CaptureStore, MessageLog, MessagingGateway, RegistrationStore, SendTrackingStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Ports
    let captures: Arc<dyn CaptureStore> = Arc::new(PostgresCaptureStore::new(pool.clone()));
    let registrations: Arc<dyn RegistrationStore> =
        Arc::new(PostgresRegistrationStore::new(pool.clone()));
    let send_tracking: Arc<dyn SendTrackingStore> =
        Arc::new(PostgresSendTracking::new(pool.clone()));
    let message_log: Arc<dyn MessageLog> = Arc::new(PostgresMessageLog::new(pool.clone()));
    let gateway: Arc<dyn MessagingGateway> =
        Arc::new(CloudApiGateway::new(config.whatsapp.clone()));

    // Application
    let flow = Arc::new(CaptureFlow::new(captures, gateway.clone()));
    let inbound = Arc::new(InboundEventHandler::new(
        flow.clone(),
        registrations.clone(),
        send_tracking.clone(),
        gateway.clone(),
        message_log.clone(),
    ));
    let rsvp = Arc::new(RsvpReplyHandler::new(
        registrations.clone(),
        send_tracking,
        gateway.clone(),
        message_log.clone(),
    ));
    let freeform = Arc::new(SendFreeformHandler::new(
        registrations,
        gateway,
        flow,
        message_log,
    ));

    let webhook_secret = config.whatsapp.webhook_secret.clone();
    let app = api_router(
        WebhookHandlers::new(inbound, rsvp, webhook_secret.clone()),
        MessagingHandlers::new(freeform, webhook_secret),
    )
    .layer(TraceLayer::new_for_http())
    .layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "guestflow listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
