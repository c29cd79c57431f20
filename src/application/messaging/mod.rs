//! Staff-initiated messaging.

mod send_freeform;

pub use send_freeform::{FreeformError, SendFreeformCommand, SendFreeformHandler};
