//! WhatsApp Cloud API adapter.

mod gateway;

pub use gateway::CloudApiGateway;
