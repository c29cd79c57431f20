//! Step resolver - computes the next unanswered step.
//!
//! Pure over (session branch state, record fields): walks a fixed ordered
//! checklist and returns the first pending item. The session's terminal
//! state short-circuits everything, so finished dialogues are absorbing.

use super::record::TravelRecord;
use super::session::CaptureSession;
use super::step::Step;

/// Returns the next pending step, or `None` when nothing remains.
///
/// `None` covers both "the checklist is satisfied" and "the session is
/// already terminal"; in either case there is no further question to ask.
pub fn next_step(session: &CaptureSession, record: &TravelRecord) -> Option<Step> {
    if session.step().is_done() {
        return None;
    }

    // Core itinerary, always required, in this order.
    if record.travel_type.is_none() {
        return Some(Step::TravelType);
    }
    if record.arrival.is_none() {
        return Some(Step::Arrival);
    }
    if record.arrival_date.is_none() {
        return Some(Step::ArrivalDate);
    }
    if record.arrival_time.is_none() {
        return Some(Step::ArrivalTime);
    }

    // Commercial-air arrivals need flight identification.
    if record.has_commercial_air_arrival() {
        if blank(&record.airline) {
            return Some(Step::Airline);
        }
        if blank(&record.flight_number) {
            return Some(Step::FlightNumber);
        }
        if record.pnr.is_pending() {
            return Some(Step::Pnr);
        }
    }

    // Optional notes and hotel times: pending until answered or skipped.
    if record.arrival_details.is_pending() {
        return Some(Step::ArrivalDetails);
    }
    if record.hotel_arrival_time.is_pending() {
        return Some(Step::HotelArrivalTime);
    }
    if record.hotel_departure_time.is_pending() {
        return Some(Step::HotelDepartureTime);
    }

    // Return-travel gate: `return_travel == false` is also the shape of
    // "not yet asked", so the session's branch memory is the second signal.
    if !record.return_travel {
        if session.state().return_travel.is_none() {
            return Some(Step::ReturnTravel);
        }
    } else {
        if record.departure.is_none() {
            return Some(Step::Departure);
        }
        if record.departure_date.is_none() {
            return Some(Step::DepartureDate);
        }
        if record.departure_time.is_none() {
            return Some(Step::DepartureTime);
        }
        if record.has_commercial_air_departure() {
            if record.departure_airline.is_pending() {
                return Some(Step::DepartureAirline);
            }
            if record.departure_flight_number.is_pending() {
                return Some(Step::DepartureFlightNumber);
            }
            if record.departure_pnr.is_pending() {
                return Some(Step::DeparturePnr);
            }
        }
        if record.departure_details.is_pending() {
            return Some(Step::DepartureDetails);
        }
    }

    None
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
