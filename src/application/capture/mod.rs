//! Travel capture orchestration.

mod flow;
mod inbound;

pub use flow::{CaptureError, CaptureFlow, TextReply};
pub use inbound::{InboundEvent, InboundEventHandler};
