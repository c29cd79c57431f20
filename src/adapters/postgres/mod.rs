//! PostgreSQL adapters - sqlx implementations of the persistence ports.

mod capture_store;
mod message_log;
mod registration_store;
mod send_tracking;

pub use capture_store::PostgresCaptureStore;
pub use message_log::PostgresMessageLog;
pub use registration_store::PostgresRegistrationStore;
pub use send_tracking::PostgresSendTracking;
