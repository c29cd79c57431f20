//! Prompt catalog - step to human prompt mapping.
//!
//! Read-only configuration built once at first use and never mutated.
//! Choice steps also carry their interactive button set; button ids share
//! the `tc|<step>|<value>` namespace the webhook layer parses back.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::step::Step;

/// Namespace prefix of every capture button id.
pub const BUTTON_NAMESPACE: &str = "tc";

/// Message sent when the checklist is satisfied.
pub const COMPLETION_MESSAGE: &str = "Thanks! We've recorded your travel details. \
You can reply later to update a field (e.g., 'change airline Indigo').";

/// One interactive quick-reply button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceButton {
    pub id: &'static str,
    pub title: &'static str,
}

/// Everything the orchestrator needs to ask one question.
#[derive(Debug, Clone, Copy)]
pub struct Prompt {
    /// The question itself.
    pub text: &'static str,
    /// Corrective message sent when a reply fails to parse.
    pub retry_hint: &'static str,
    /// Button set for choice steps, `None` for free-text steps.
    pub buttons: Option<&'static [ChoiceButton]>,
}

const TRAVEL_TYPE_BUTTONS: [ChoiceButton; 3] = [
    ChoiceButton { id: "tc|travel_type|Air", title: "Air" },
    ChoiceButton { id: "tc|travel_type|Train", title: "Train" },
    ChoiceButton { id: "tc|travel_type|Car", title: "Car" },
];

const ARRIVAL_BUTTONS: [ChoiceButton; 3] = [
    ChoiceButton { id: "tc|arrival|commercial", title: "Commercial" },
    ChoiceButton { id: "tc|arrival|local_pickup", title: "Local Pickup" },
    ChoiceButton { id: "tc|arrival|self", title: "Self" },
];

const RETURN_TRAVEL_BUTTONS: [ChoiceButton; 2] = [
    ChoiceButton { id: "tc|return_travel|yes", title: "Yes" },
    ChoiceButton { id: "tc|return_travel|no", title: "No" },
];

const DEPARTURE_BUTTONS: [ChoiceButton; 3] = [
    ChoiceButton { id: "tc|departure|commercial", title: "Commercial" },
    ChoiceButton { id: "tc|departure|local_pickup", title: "Local Pickup" },
    ChoiceButton { id: "tc|departure|self", title: "Self" },
];

const CHOICE_HINT: &str = "Please tap a button or reply: commercial / local_pickup / self";

static CATALOG: Lazy<HashMap<Step, Prompt>> = Lazy::new(|| {
    let mut catalog = HashMap::new();
    catalog.insert(
        Step::TravelType,
        Prompt {
            text: "How are you traveling?",
            retry_hint: "Please tap a button or reply: Air / Train / Car",
            buttons: Some(&TRAVEL_TYPE_BUTTONS),
        },
    );
    catalog.insert(
        Step::Arrival,
        Prompt {
            text: "How will you arrive?",
            retry_hint: CHOICE_HINT,
            buttons: Some(&ARRIVAL_BUTTONS),
        },
    );
    catalog.insert(
        Step::ArrivalDate,
        Prompt {
            text: "What is your arrival date? Reply like 2025-10-03",
            retry_hint: "Please send date as YYYY-MM-DD (e.g., 2025-10-03).",
            buttons: None,
        },
    );
    catalog.insert(
        Step::ArrivalTime,
        Prompt {
            text: "What is your arrival time? Reply like 14:30 or 2:30pm",
            retry_hint: "Please send time like 14:30 or 2:30pm.",
            buttons: None,
        },
    );
    catalog.insert(
        Step::Airline,
        Prompt {
            text: "What is the airline?",
            retry_hint: "What is the airline?",
            buttons: None,
        },
    );
    catalog.insert(
        Step::FlightNumber,
        Prompt {
            text: "What is your flight number?",
            retry_hint: "What is your flight number?",
            buttons: None,
        },
    );
    catalog.insert(
        Step::Pnr,
        Prompt {
            text: "What is your PNR? (optional, reply 'skip' to skip)",
            retry_hint: "What is your PNR? (optional, reply 'skip' to skip)",
            buttons: None,
        },
    );
    catalog.insert(
        Step::ArrivalDetails,
        Prompt {
            text: "Any arrival details we should know (pickup location, notes)? (reply 'skip' to skip)",
            retry_hint: "Any arrival details we should know (pickup location, notes)? (reply 'skip' to skip)",
            buttons: None,
        },
    );
    catalog.insert(
        Step::HotelArrivalTime,
        Prompt {
            text: "What time will you reach the hotel? (HH:MM, or 'skip')",
            retry_hint: "Time looks off. Example: 13:45",
            buttons: None,
        },
    );
    catalog.insert(
        Step::HotelDepartureTime,
        Prompt {
            text: "What time will you depart the hotel? (HH:MM, or 'skip')",
            retry_hint: "Time looks off. Example: 10:00",
            buttons: None,
        },
    );
    catalog.insert(
        Step::ReturnTravel,
        Prompt {
            text: "Do you have a return journey?",
            retry_hint: "Please tap Yes/No.",
            buttons: Some(&RETURN_TRAVEL_BUTTONS),
        },
    );
    catalog.insert(
        Step::Departure,
        Prompt {
            text: "How will you depart?",
            retry_hint: CHOICE_HINT,
            buttons: Some(&DEPARTURE_BUTTONS),
        },
    );
    catalog.insert(
        Step::DepartureDate,
        Prompt {
            text: "What is your departure date? (YYYY-MM-DD)",
            retry_hint: "Send date as YYYY-MM-DD",
            buttons: None,
        },
    );
    catalog.insert(
        Step::DepartureTime,
        Prompt {
            text: "What is your departure time? (HH:MM)",
            retry_hint: "Send time like 18:20 or 6:20pm",
            buttons: None,
        },
    );
    catalog.insert(
        Step::DepartureAirline,
        Prompt {
            text: "Departure airline? (if applicable; or 'skip')",
            retry_hint: "Departure airline? (if applicable; or 'skip')",
            buttons: None,
        },
    );
    catalog.insert(
        Step::DepartureFlightNumber,
        Prompt {
            text: "Departure flight/train number? (or 'skip')",
            retry_hint: "Departure flight/train number? (or 'skip')",
            buttons: None,
        },
    );
    catalog.insert(
        Step::DeparturePnr,
        Prompt {
            text: "Departure PNR? (or 'skip')",
            retry_hint: "Departure PNR? (or 'skip')",
            buttons: None,
        },
    );
    catalog.insert(
        Step::DepartureDetails,
        Prompt {
            text: "Any departure details (pickup spot/notes)? (or 'skip')",
            retry_hint: "Any departure details (pickup spot/notes)? (or 'skip')",
            buttons: None,
        },
    );
    catalog
});

/// Returns the catalog entry for a step.
pub fn prompt(step: Step) -> &'static Prompt {
    &CATALOG[&step]
}

/// Returns the question asked for a step.
pub fn prompt_text(step: Step) -> &'static str {
    prompt(step).text
}

/// Returns the corrective message sent when a reply fails to parse.
///
/// Free-text steps accept anything, so their hint just re-asks.
pub fn retry_hint(step: Step) -> &'static str {
    prompt(step).retry_hint
}

/// Returns the button set for a choice step, `None` for free-text steps.
pub fn buttons_for(step: Step) -> Option<&'static [ChoiceButton]> {
    prompt(step).buttons
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_has_a_catalog_entry() {
        for step in Step::ALL {
            assert!(!prompt_text(step).is_empty(), "{step}");
            assert!(!retry_hint(step).is_empty(), "{step}");
        }
        assert_eq!(CATALOG.len(), Step::ALL.len());
    }

    #[test]
    fn buttons_exist_exactly_for_choice_steps() {
        for step in Step::ALL {
            assert_eq!(buttons_for(step).is_some(), step.has_buttons(), "{step}");
        }
    }

    #[test]
    fn button_ids_carry_the_namespace_and_step() {
        for step in Step::ALL {
            let Some(buttons) = buttons_for(step) else {
                continue;
            };
            for button in buttons {
                let mut parts = button.id.splitn(3, '|');
                assert_eq!(parts.next(), Some(BUTTON_NAMESPACE));
                assert_eq!(parts.next(), Some(step.as_str()));
                assert!(parts.next().is_some());
            }
        }
    }

    #[test]
    fn button_titles_fit_whatsapp_limit() {
        // Interactive reply titles are capped at 20 characters by the API.
        for step in Step::ALL {
            for button in buttons_for(step).unwrap_or(&[]) {
                assert!(button.title.len() <= 20, "{}", button.title);
            }
        }
    }
}
