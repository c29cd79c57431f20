//! RSVP side-channel: a single-field status machine.
//!
//! Loosely coupled to the travel capture flow - the two share only the
//! registration's `responded_on` marker (which feeds the 24-hour messaging
//! window) and the explicit pause operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Where a guest stands on the invitation.
///
/// `NotSent → Pending → Yes/No/Maybe`; replies may later move between the
/// three answered states as guests change their minds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    NotSent,
    Pending,
    Yes,
    No,
    Maybe,
}

impl RsvpStatus {
    /// Returns the storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::NotSent => "not_sent",
            RsvpStatus::Pending => "pending",
            RsvpStatus::Yes => "yes",
            RsvpStatus::No => "no",
            RsvpStatus::Maybe => "maybe",
        }
    }

    /// Parses a guest reply. Only the three answer states are valid replies.
    pub fn from_reply(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(RsvpStatus::Yes),
            "no" => Some(RsvpStatus::No),
            "maybe" => Some(RsvpStatus::Maybe),
            _ => None,
        }
    }

    /// True once the guest has answered.
    pub fn is_answered(&self) -> bool {
        matches!(self, RsvpStatus::Yes | RsvpStatus::No | RsvpStatus::Maybe)
    }

    /// Whether moving to `target` is a legal transition.
    pub fn can_transition_to(&self, target: RsvpStatus) -> bool {
        match self {
            RsvpStatus::NotSent => target == RsvpStatus::Pending,
            RsvpStatus::Pending => target.is_answered(),
            // Guests may revise an answer any number of times.
            _ => target.is_answered(),
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_sent" => Ok(RsvpStatus::NotSent),
            "pending" => Ok(RsvpStatus::Pending),
            "yes" => Ok(RsvpStatus::Yes),
            "no" => Ok(RsvpStatus::No),
            "maybe" => Ok(RsvpStatus::Maybe),
            other => Err(ValidationError::invalid_format(
                "rsvp_status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_strings_round_trip() {
        for status in [
            RsvpStatus::NotSent,
            RsvpStatus::Pending,
            RsvpStatus::Yes,
            RsvpStatus::No,
            RsvpStatus::Maybe,
        ] {
            assert_eq!(status.as_str().parse::<RsvpStatus>().unwrap(), status);
        }
    }

    #[test]
    fn replies_parse_case_insensitively() {
        assert_eq!(RsvpStatus::from_reply(" YES "), Some(RsvpStatus::Yes));
        assert_eq!(RsvpStatus::from_reply("maybe"), Some(RsvpStatus::Maybe));
        assert_eq!(RsvpStatus::from_reply("pending"), None);
        assert_eq!(RsvpStatus::from_reply("dunno"), None);
    }

    #[test]
    fn not_sent_only_moves_to_pending() {
        assert!(RsvpStatus::NotSent.can_transition_to(RsvpStatus::Pending));
        assert!(!RsvpStatus::NotSent.can_transition_to(RsvpStatus::Yes));
    }

    #[test]
    fn pending_moves_to_any_answer() {
        for target in [RsvpStatus::Yes, RsvpStatus::No, RsvpStatus::Maybe] {
            assert!(RsvpStatus::Pending.can_transition_to(target));
        }
        assert!(!RsvpStatus::Pending.can_transition_to(RsvpStatus::NotSent));
    }

    #[test]
    fn answers_may_be_revised() {
        assert!(RsvpStatus::Yes.can_transition_to(RsvpStatus::No));
        assert!(RsvpStatus::No.can_transition_to(RsvpStatus::Maybe));
        assert!(!RsvpStatus::Maybe.can_transition_to(RsvpStatus::Pending));
    }
}
