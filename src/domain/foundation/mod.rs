//! Foundation value objects shared across the domain.

mod errors;
mod ids;
mod phone;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::RegistrationId;
pub use phone::WaId;
pub use timestamp::Timestamp;
