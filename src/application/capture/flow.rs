//! Conversation orchestrator for the travel-detail dialogue.
//!
//! Decides whether a step is asked with buttons or text, applies inbound
//! answers to the travel record, advances the session, and detects
//! completion. State is persisted before anything is sent: a guest's answer
//! survives even when the follow-up prompt fails to go out, and the resume
//! flow reconciles later.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::capture::prompts::{buttons_for, prompt_text, retry_hint, COMPLETION_MESSAGE};
use crate::domain::capture::resolver::next_step;
use crate::domain::capture::{
    parsers, Answer, ArrivalMethod, CaptureSession, SessionStep, Step, TravelMode, TravelRecord,
};
use crate::domain::foundation::{DomainError, RegistrationId, Timestamp};
use crate::ports::{Button, CaptureStore, GatewayError, MessagingGateway, Registration};

/// Errors surfaced by the capture flow.
///
/// Gateway failures are reported *after* state has been committed; callers
/// log them and ack, they never roll anything back.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Storage(#[from] DomainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Outcome of applying a free-text answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextReply {
    /// The reply did not parse; session did not advance. Send the hint.
    Invalid { hint: String },
    /// Answer recorded; `prompt` asks the next question. Choice steps should
    /// be escalated to [`CaptureFlow::send_next_prompt`] so buttons render.
    NextPrompt { step: Step, prompt: String },
    /// The checklist is satisfied; send the completion message.
    Completed { message: String },
}

impl TextReply {
    /// True once the dialogue finished with this reply.
    pub fn is_complete(&self) -> bool {
        matches!(self, TextReply::Completed { .. })
    }
}

/// Orchestrates one registration's travel-detail dialogue.
pub struct CaptureFlow {
    captures: Arc<dyn CaptureStore>,
    gateway: Arc<dyn MessagingGateway>,
}

impl CaptureFlow {
    pub fn new(captures: Arc<dyn CaptureStore>, gateway: Arc<dyn MessagingGateway>) -> Self {
        Self { captures, gateway }
    }

    /// Ensures a session and record exist and positions the session.
    ///
    /// With `restart` (or when the previous run completed) the session is
    /// reset to the first step and branch memory cleared; otherwise it
    /// continues from the stored step. Returns the prompt for the resulting
    /// step.
    pub async fn start_or_restart(
        &self,
        registration: &Registration,
        restart: bool,
    ) -> Result<String, CaptureError> {
        let now = Timestamp::now();
        let (mut session, record) = self.captures.load_or_create(&registration.id).await?;

        if restart || session.is_complete() {
            session.restart(now);
        } else {
            session.begin(now);
        }
        self.captures.save(&session, &record).await?;

        let step = session.step().active().unwrap_or(Step::TravelType);
        Ok(prompt_text(step).to_string())
    }

    /// Re-engages a dormant guest: positions an idle session at its first
    /// step, then immediately sends the pending prompt.
    pub async fn resume_or_start(&self, registration: &Registration) -> Result<(), CaptureError> {
        let (session, _) = self.captures.load_or_create(&registration.id).await?;
        if session.step() == SessionStep::Idle {
            self.start_or_restart(registration, false).await?;
        }
        self.send_next_prompt(registration).await
    }

    /// Computes the pending step and sends its prompt (buttons for choice
    /// steps, text otherwise). Re-sending the prompt that already went out
    /// last is suppressed, so retried webhook deliveries cannot double-send.
    pub async fn send_next_prompt(&self, registration: &Registration) -> Result<(), CaptureError> {
        let now = Timestamp::now();
        let (mut session, record) = self.captures.load_or_create(&registration.id).await?;

        let Some(step) = next_step(&session, &record) else {
            if session.completion_sent() {
                return Ok(());
            }
            session.complete(now);
            self.captures.save(&session, &record).await?;
            self.gateway
                .send_text(&registration.guest_phone, COMPLETION_MESSAGE)
                .await?;
            return Ok(());
        };

        if session.already_prompted(step) {
            return Ok(());
        }
        session.mark_prompted(step, now);
        self.captures.save(&session, &record).await?;

        match buttons_for(step) {
            Some(buttons) => {
                let buttons: Vec<Button> = buttons.iter().map(Button::from).collect();
                self.gateway
                    .send_choice_buttons(
                        &registration.guest_phone,
                        prompt_text(step),
                        &buttons,
                        None,
                        None,
                    )
                    .await?;
            }
            None => {
                self.gateway
                    .send_text(&registration.guest_phone, prompt_text(step))
                    .await?;
            }
        }
        Ok(())
    }

    /// Applies a tapped button value, then advances.
    ///
    /// Invalid or stale values write nothing and fall through to
    /// `send_next_prompt`, which re-prompts (or stays silent when the
    /// current prompt already went out).
    pub async fn apply_button_choice(
        &self,
        registration: &Registration,
        step: Step,
        raw_value: &str,
    ) -> Result<(), CaptureError> {
        let (mut session, mut record) = self.captures.load_or_create(&registration.id).await?;

        let wrote = match step {
            Step::TravelType => match TravelMode::from_input(raw_value) {
                Some(mode) => {
                    record.travel_type = Some(mode);
                    true
                }
                None => false,
            },
            Step::Arrival => match ArrivalMethod::from_input(raw_value) {
                Some(method) => {
                    record.arrival = Some(method);
                    true
                }
                None => false,
            },
            Step::ReturnTravel => {
                let has_return = raw_value.eq_ignore_ascii_case("yes");
                record.return_travel = has_return;
                session.record_return_answer(has_return);
                true
            }
            Step::Departure => match ArrivalMethod::from_input(raw_value) {
                Some(method) => {
                    record.departure = Some(method);
                    true
                }
                None => false,
            },
            // Buttons only exist for the four choice steps.
            _ => false,
        };

        if wrote {
            self.captures.save(&session, &record).await?;
        }
        self.send_next_prompt(registration).await
    }

    /// Applies a free-text answer for the current step.
    ///
    /// On parse failure the session does not advance and the guest gets a
    /// corrective hint. On success the resolver picks the next step and the
    /// returned reply carries its prompt (or the completion message).
    pub async fn apply_text_answer(
        &self,
        registration: &Registration,
        text: &str,
    ) -> Result<TextReply, CaptureError> {
        let now = Timestamp::now();
        let (mut session, mut record) = self.captures.load_or_create(&registration.id).await?;

        if session.step() == SessionStep::Idle {
            session.begin(now);
        }
        let step = match session.step().active() {
            Some(step) => step,
            // Terminal: answers after completion just restate the outcome.
            None => {
                return Ok(TextReply::Completed {
                    message: COMPLETION_MESSAGE.to_string(),
                })
            }
        };

        let trimmed = text.trim();
        if !self.write_answer(&mut session, &mut record, step, trimmed) {
            return Ok(TextReply::Invalid {
                hint: retry_hint(step).to_string(),
            });
        }

        match next_step(&session, &record) {
            None => {
                session.complete(now);
                self.captures.save(&session, &record).await?;
                Ok(TextReply::Completed {
                    message: COMPLETION_MESSAGE.to_string(),
                })
            }
            Some(next) => {
                if next.has_buttons() {
                    // Leave the duplicate-prompt marker alone; the caller
                    // escalates to send_next_prompt so buttons go out.
                    session.advance_to(next, now);
                } else {
                    session.mark_prompted(next, now);
                }
                self.captures.save(&session, &record).await?;
                Ok(TextReply::NextPrompt {
                    step: next,
                    prompt: prompt_text(next).to_string(),
                })
            }
        }
    }

    /// Suspends an in-flight dialogue (explicit cross-flow request, e.g.
    /// before a staff freeform message) so unrelated replies are not
    /// consumed as travel answers. No-op without an active session.
    pub async fn pause(&self, registration_id: &RegistrationId) -> Result<(), CaptureError> {
        let Some(session) = self.captures.find_session(registration_id).await? else {
            return Ok(());
        };
        if session.is_complete() || session.step().active().is_none() {
            return Ok(());
        }

        let now = Timestamp::now();
        let (mut session, record) = self.captures.load_or_create(registration_id).await?;
        tracing::info!(registration_id = %registration_id, step = %session.step().as_str(), "pausing capture session");
        session.pause(now);
        self.captures.save(&session, &record).await?;
        Ok(())
    }

    /// Writes one answer to the record. Returns false when the reply does
    /// not parse for the step (nothing written, session unchanged).
    fn write_answer(
        &self,
        session: &mut CaptureSession,
        record: &mut TravelRecord,
        step: Step,
        text: &str,
    ) -> bool {
        match step {
            Step::TravelType => match TravelMode::from_input(text) {
                Some(mode) => {
                    record.travel_type = Some(mode);
                    true
                }
                None => false,
            },
            Step::Arrival => match ArrivalMethod::from_input(text) {
                Some(method) => {
                    record.arrival = Some(method);
                    true
                }
                None => false,
            },
            Step::ArrivalDate => match parsers::parse_date(text) {
                Some(date) => {
                    record.arrival_date = Some(date);
                    true
                }
                None => false,
            },
            Step::ArrivalTime => match parsers::parse_time(text) {
                Some(time) => {
                    record.arrival_time = Some(time);
                    true
                }
                None => false,
            },
            Step::Airline => {
                record.airline = Some(text.to_string());
                true
            }
            Step::FlightNumber => {
                record.flight_number = Some(text.to_uppercase());
                true
            }
            Step::Pnr => {
                record.pnr = Answer::from_optional_text(parsers::optional_text(text));
                true
            }
            Step::ArrivalDetails => {
                record.arrival_details = Answer::from_optional_text(parsers::optional_text(text));
                true
            }
            Step::HotelArrivalTime => {
                if parsers::is_skip_word(text) {
                    record.hotel_arrival_time = Answer::Skipped;
                    true
                } else {
                    match parsers::parse_time(text) {
                        Some(time) => {
                            record.hotel_arrival_time = Answer::Given(time);
                            true
                        }
                        None => false,
                    }
                }
            }
            Step::HotelDepartureTime => {
                if parsers::is_skip_word(text) {
                    record.hotel_departure_time = Answer::Skipped;
                    true
                } else {
                    match parsers::parse_time(text) {
                        Some(time) => {
                            record.hotel_departure_time = Answer::Given(time);
                            true
                        }
                        None => false,
                    }
                }
            }
            Step::ReturnTravel => match parsers::parse_yes_no(text) {
                Some(has_return) => {
                    record.return_travel = has_return;
                    session.record_return_answer(has_return);
                    true
                }
                None => false,
            },
            Step::Departure => match ArrivalMethod::from_input(text) {
                Some(method) => {
                    record.departure = Some(method);
                    true
                }
                None => false,
            },
            Step::DepartureDate => match parsers::parse_date(text) {
                Some(date) => {
                    record.departure_date = Some(date);
                    true
                }
                None => false,
            },
            Step::DepartureTime => match parsers::parse_time(text) {
                Some(time) => {
                    record.departure_time = Some(time);
                    true
                }
                None => false,
            },
            Step::DepartureAirline => {
                record.departure_airline =
                    Answer::from_optional_text(parsers::optional_text(text));
                true
            }
            Step::DepartureFlightNumber => {
                record.departure_flight_number =
                    Answer::from_optional_text(parsers::optional_text(text));
                true
            }
            Step::DeparturePnr => {
                record.departure_pnr = Answer::from_optional_text(parsers::optional_text(text));
                true
            }
            Step::DepartureDetails => {
                record.departure_details =
                    Answer::from_optional_text(parsers::optional_text(text));
                true
            }
        }
    }
}
