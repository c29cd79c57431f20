//! RSVP side-channel orchestration.

mod record_reply;

pub use record_reply::{RsvpError, RsvpReplyCommand, RsvpReplyHandler, RsvpReplyResult};
