//! Travel record - the structured itinerary being filled in.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::RegistrationId;

use super::parsers::match_choice;

/// How the guest is traveling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelMode {
    Air,
    Train,
    Car,
}

impl TravelMode {
    /// Accepted reply keys, also the stored values.
    pub const KEYS: [&'static str; 3] = ["Air", "Train", "Car"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Air => "Air",
            TravelMode::Train => "Train",
            TravelMode::Car => "Car",
        }
    }

    /// Matches a guest reply (button value or typed text), case-insensitive.
    pub fn from_input(text: &str) -> Option<Self> {
        match match_choice(text, &Self::KEYS)? {
            "Air" => Some(TravelMode::Air),
            "Train" => Some(TravelMode::Train),
            "Car" => Some(TravelMode::Car),
            _ => None,
        }
    }
}

/// How the guest arrives at (or departs from) the venue city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrivalMethod {
    Commercial,
    LocalPickup,
    SelfArranged,
}

impl ArrivalMethod {
    /// Accepted reply keys, also the stored values.
    pub const KEYS: [&'static str; 3] = ["commercial", "local_pickup", "self"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArrivalMethod::Commercial => "commercial",
            ArrivalMethod::LocalPickup => "local_pickup",
            ArrivalMethod::SelfArranged => "self",
        }
    }

    /// Matches a guest reply (button value or typed text), case-insensitive.
    pub fn from_input(text: &str) -> Option<Self> {
        match match_choice(text, &Self::KEYS)? {
            "commercial" => Some(ArrivalMethod::Commercial),
            "local_pickup" => Some(ArrivalMethod::LocalPickup),
            "self" => Some(ArrivalMethod::SelfArranged),
            _ => None,
        }
    }
}

/// Three-state answer for optional fields.
///
/// The distinction is load-bearing for the resolver: an `Unanswered` field is
/// still pending, a `Skipped` one is not. For text fields this mirrors the
/// `None` / `""` / value convention of [`super::parsers::optional_text`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Answer<T> {
    #[default]
    Unanswered,
    Skipped,
    Given(T),
}

impl<T> Answer<T> {
    /// True while the question has not been answered or skipped.
    pub fn is_pending(&self) -> bool {
        matches!(self, Answer::Unanswered)
    }

    /// Returns the given value, if any.
    pub fn given(&self) -> Option<&T> {
        match self {
            Answer::Given(v) => Some(v),
            _ => None,
        }
    }
}

impl Answer<String> {
    /// Builds a text answer from the optional-text convention
    /// (`None` unanswered, `""` skipped, otherwise the text).
    pub fn from_optional_text(value: Option<String>) -> Self {
        match value {
            None => Answer::Unanswered,
            Some(s) if s.is_empty() => Answer::Skipped,
            Some(s) => Answer::Given(s),
        }
    }

    /// Renders back to the optional-text convention.
    pub fn to_optional_text(&self) -> Option<String> {
        match self {
            Answer::Unanswered => None,
            Answer::Skipped => Some(String::new()),
            Answer::Given(s) => Some(s.clone()),
        }
    }
}

/// Structured travel itinerary for one registration, filled in step by step.
///
/// Core fields (`travel_type` through `arrival_time`, plus the departure
/// mirror when `return_travel` is set) are required and pending while unset.
/// Optional fields carry the three-state [`Answer`] convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelRecord {
    pub registration_id: RegistrationId,

    pub travel_type: Option<TravelMode>,
    pub arrival: Option<ArrivalMethod>,
    pub arrival_date: Option<NaiveDate>,
    pub arrival_time: Option<NaiveTime>,

    // Commercial-air arrival block
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub pnr: Answer<String>,

    pub arrival_details: Answer<String>,
    pub hotel_arrival_time: Answer<NaiveTime>,
    pub hotel_departure_time: Answer<NaiveTime>,

    // Return-travel branch
    pub return_travel: bool,
    pub departure: Option<ArrivalMethod>,
    pub departure_date: Option<NaiveDate>,
    pub departure_time: Option<NaiveTime>,
    pub departure_airline: Answer<String>,
    pub departure_flight_number: Answer<String>,
    pub departure_pnr: Answer<String>,
    pub departure_details: Answer<String>,
}

impl TravelRecord {
    /// Creates an empty record for a registration.
    pub fn new(registration_id: RegistrationId) -> Self {
        Self {
            registration_id,
            travel_type: None,
            arrival: None,
            arrival_date: None,
            arrival_time: None,
            airline: None,
            flight_number: None,
            pnr: Answer::Unanswered,
            arrival_details: Answer::Unanswered,
            hotel_arrival_time: Answer::Unanswered,
            hotel_departure_time: Answer::Unanswered,
            return_travel: false,
            departure: None,
            departure_date: None,
            departure_time: None,
            departure_airline: Answer::Unanswered,
            departure_flight_number: Answer::Unanswered,
            departure_pnr: Answer::Unanswered,
            departure_details: Answer::Unanswered,
        }
    }

    /// True when the arrival leg is a commercial flight, which unlocks the
    /// airline/flight/PNR questions.
    pub fn has_commercial_air_arrival(&self) -> bool {
        self.travel_type == Some(TravelMode::Air) && self.arrival == Some(ArrivalMethod::Commercial)
    }

    /// True when the departure leg is a commercial flight.
    pub fn has_commercial_air_departure(&self) -> bool {
        self.travel_type == Some(TravelMode::Air)
            && self.departure == Some(ArrivalMethod::Commercial)
    }
}
