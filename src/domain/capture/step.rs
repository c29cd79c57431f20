//! Step identifiers for the travel-detail checklist.
//!
//! Each step is one pending question in the capture dialogue. The closed enum
//! gives the resolver and orchestrator exhaustiveness checking; wire and
//! storage strings stay identical to the button-id / prompt-key vocabulary so
//! existing payloads keep working.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// One named point in the travel-detail checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    TravelType,
    Arrival,
    ArrivalDate,
    ArrivalTime,
    Airline,
    FlightNumber,
    Pnr,
    ArrivalDetails,
    HotelArrivalTime,
    HotelDepartureTime,
    ReturnTravel,
    Departure,
    DepartureDate,
    DepartureTime,
    DepartureAirline,
    DepartureFlightNumber,
    DeparturePnr,
    DepartureDetails,
}

impl Step {
    /// All steps in checklist order.
    pub const ALL: [Step; 18] = [
        Step::TravelType,
        Step::Arrival,
        Step::ArrivalDate,
        Step::ArrivalTime,
        Step::Airline,
        Step::FlightNumber,
        Step::Pnr,
        Step::ArrivalDetails,
        Step::HotelArrivalTime,
        Step::HotelDepartureTime,
        Step::ReturnTravel,
        Step::Departure,
        Step::DepartureDate,
        Step::DepartureTime,
        Step::DepartureAirline,
        Step::DepartureFlightNumber,
        Step::DeparturePnr,
        Step::DepartureDetails,
    ];

    /// Returns the wire/storage name of this step.
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::TravelType => "travel_type",
            Step::Arrival => "arrival",
            Step::ArrivalDate => "arrival_date",
            Step::ArrivalTime => "arrival_time",
            Step::Airline => "airline",
            Step::FlightNumber => "flight_number",
            Step::Pnr => "pnr",
            Step::ArrivalDetails => "arrival_details",
            Step::HotelArrivalTime => "hotel_arrival_time",
            Step::HotelDepartureTime => "hotel_departure_time",
            Step::ReturnTravel => "return_travel",
            Step::Departure => "departure",
            Step::DepartureDate => "departure_date",
            Step::DepartureTime => "departure_time",
            Step::DepartureAirline => "departure_airline",
            Step::DepartureFlightNumber => "departure_flight_number",
            Step::DeparturePnr => "departure_pnr",
            Step::DepartureDetails => "departure_details",
        }
    }

    /// True for the four steps answered by interactive buttons.
    pub fn has_buttons(&self) -> bool {
        matches!(
            self,
            Step::TravelType | Step::Arrival | Step::ReturnTravel | Step::Departure
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Step {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("step", format!("unknown step '{s}'")))
    }
}

/// Where a capture session currently stands.
///
/// `Idle` covers both "never started" and "paused"; a resume treats them the
/// same way. `Done` is terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStep {
    Idle,
    Active(Step),
    Done,
}

impl SessionStep {
    /// Storage marker used before the dialogue starts (and after a pause).
    pub const IDLE_MARKER: &'static str = "opt_in";
    /// Storage marker for the terminal state.
    pub const DONE_MARKER: &'static str = "done";

    /// Returns the storage string for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStep::Idle => Self::IDLE_MARKER,
            SessionStep::Active(step) => step.as_str(),
            SessionStep::Done => Self::DONE_MARKER,
        }
    }

    /// Parses a stored step marker.
    ///
    /// Empty strings and `opt_in` both decode to `Idle`.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "" | Self::IDLE_MARKER => Ok(SessionStep::Idle),
            Self::DONE_MARKER => Ok(SessionStep::Done),
            other => other.parse::<Step>().map(SessionStep::Active),
        }
    }

    /// Returns the active step, if any.
    pub fn active(&self) -> Option<Step> {
        match self {
            SessionStep::Active(step) => Some(*step),
            _ => None,
        }
    }

    /// True once the dialogue has finished.
    pub fn is_done(&self) -> bool {
        matches!(self, SessionStep::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_round_trip() {
        for step in Step::ALL {
            assert_eq!(step.as_str().parse::<Step>().unwrap(), step);
        }
    }

    #[test]
    fn unknown_step_name_is_rejected() {
        assert!("start_travel".parse::<Step>().is_err());
        assert!("".parse::<Step>().is_err());
    }

    #[test]
    fn exactly_four_steps_have_buttons() {
        let count = Step::ALL.iter().filter(|s| s.has_buttons()).count();
        assert_eq!(count, 4);
        assert!(Step::TravelType.has_buttons());
        assert!(Step::Arrival.has_buttons());
        assert!(Step::ReturnTravel.has_buttons());
        assert!(Step::Departure.has_buttons());
        assert!(!Step::ArrivalDate.has_buttons());
    }

    #[test]
    fn session_step_parses_legacy_markers() {
        assert_eq!(SessionStep::parse("").unwrap(), SessionStep::Idle);
        assert_eq!(SessionStep::parse("opt_in").unwrap(), SessionStep::Idle);
        assert_eq!(SessionStep::parse("done").unwrap(), SessionStep::Done);
        assert_eq!(
            SessionStep::parse("arrival_date").unwrap(),
            SessionStep::Active(Step::ArrivalDate)
        );
    }

    #[test]
    fn session_step_storage_round_trips() {
        for state in [
            SessionStep::Idle,
            SessionStep::Active(Step::Pnr),
            SessionStep::Done,
        ] {
            assert_eq!(SessionStep::parse(state.as_str()).unwrap(), state);
        }
    }
}
