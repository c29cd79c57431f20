//! WhatsApp phone identifier value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Digits-only WhatsApp phone identifier.
///
/// Inbound identifiers arrive in assorted shapes (`+91 98765-43210`,
/// `919876543210`, …). Normalization strips everything but digits and keeps
/// the last 15, so the same guest always maps to the same key regardless of
/// formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaId(String);

impl WaId {
    /// Normalizes a raw phone string into a WaId.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if no digits remain after normalization
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(ValidationError::empty_field("wa_id"));
        }
        let tail = if digits.len() > 15 {
            digits[digits.len() - 15..].to_string()
        } else {
            digits
        };
        Ok(Self(tail))
    }

    /// Returns the inner digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_non_digits() {
        let id = WaId::parse("+91 98765-43210").unwrap();
        assert_eq!(id.as_str(), "919876543210");
    }

    #[test]
    fn keeps_last_fifteen_digits() {
        let id = WaId::parse("0000919876543210").unwrap();
        assert_eq!(id.as_str(), "000919876543210");
        assert_eq!(id.as_str().len(), 15);
    }

    #[test]
    fn rejects_input_without_digits() {
        assert!(WaId::parse("not a phone").is_err());
        assert!(WaId::parse("").is_err());
    }

    #[test]
    fn identical_guests_normalize_identically() {
        let a = WaId::parse("+91-9876543210").unwrap();
        let b = WaId::parse("919876543210").unwrap();
        assert_eq!(a, b);
    }
}
