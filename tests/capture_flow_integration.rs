//! Integration tests for the travel-capture conversation.
//!
//! Drives the full webhook-to-gateway path over in-memory adapters:
//! 1. Inbound events arrive at the InboundEventHandler (as the webhook
//!    endpoint would deliver them)
//! 2. The capture flow mutates the session/record pair
//! 3. Outbound prompts land in a recording gateway
//!
//! No external dependencies; the database and transport are swapped for
//! in-memory implementations of the same ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use guestflow::application::capture::{CaptureFlow, InboundEvent, InboundEventHandler};
use guestflow::application::messaging::{SendFreeformCommand, SendFreeformHandler};
use guestflow::domain::capture::{Answer, CaptureSession, SessionStep, TravelMode, TravelRecord};
use guestflow::domain::foundation::{DomainError, RegistrationId, Timestamp, WaId};
use guestflow::domain::rsvp::RsvpStatus;
use guestflow::ports::{
    Button, CaptureStore, GatewayError, MessageLog, MessageLogEntry, MessagingGateway,
    Registration, RegistrationStore, SendTrackingStore,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestCaptureStore {
    pairs: Mutex<HashMap<RegistrationId, (CaptureSession, TravelRecord)>>,
}

impl TestCaptureStore {
    fn new() -> Self {
        Self {
            pairs: Mutex::new(HashMap::new()),
        }
    }

    fn snapshot(&self, id: &RegistrationId) -> Option<(CaptureSession, TravelRecord)> {
        self.pairs.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl CaptureStore for TestCaptureStore {
    async fn load_or_create(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<(CaptureSession, TravelRecord), DomainError> {
        let mut pairs = self.pairs.lock().unwrap();
        let pair = pairs.entry(*registration_id).or_insert_with(|| {
            (
                CaptureSession::new(*registration_id),
                TravelRecord::new(*registration_id),
            )
        });
        Ok(pair.clone())
    }

    async fn find_session(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Option<CaptureSession>, DomainError> {
        Ok(self
            .pairs
            .lock()
            .unwrap()
            .get(registration_id)
            .map(|(s, _)| s.clone()))
    }

    async fn save(
        &self,
        session: &CaptureSession,
        record: &TravelRecord,
    ) -> Result<(), DomainError> {
        self.pairs.lock().unwrap().insert(
            *session.registration_id(),
            (session.clone(), record.clone()),
        );
        Ok(())
    }
}

struct TestRegistrations {
    registrations: Mutex<HashMap<RegistrationId, Registration>>,
}

impl TestRegistrations {
    fn with(registration: Registration) -> Self {
        let mut map = HashMap::new();
        map.insert(registration.id, registration);
        Self {
            registrations: Mutex::new(map),
        }
    }
}

#[async_trait]
impl RegistrationStore for TestRegistrations {
    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, DomainError> {
        Ok(self.registrations.lock().unwrap().get(id).cloned())
    }

    async fn mark_responded(
        &self,
        id: &RegistrationId,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        if let Some(reg) = self.registrations.lock().unwrap().get_mut(id) {
            reg.responded_on = Some(at);
        }
        Ok(())
    }

    async fn update_rsvp(
        &self,
        id: &RegistrationId,
        status: RsvpStatus,
    ) -> Result<(), DomainError> {
        if let Some(reg) = self.registrations.lock().unwrap().get_mut(id) {
            reg.rsvp_status = status;
        }
        Ok(())
    }
}

struct TestSendMap {
    map: Mutex<HashMap<String, RegistrationId>>,
}

impl TestSendMap {
    fn with(wa_id: &WaId, registration_id: RegistrationId) -> Self {
        let mut map = HashMap::new();
        map.insert(wa_id.as_str().to_string(), registration_id);
        Self {
            map: Mutex::new(map),
        }
    }
}

#[async_trait]
impl SendTrackingStore for TestSendMap {
    async fn latest_for(&self, wa_id: &WaId) -> Result<Option<RegistrationId>, DomainError> {
        Ok(self.map.lock().unwrap().get(wa_id.as_str()).copied())
    }

    async fn mark_consumed(
        &self,
        _registration_id: &RegistrationId,
        _at: Timestamp,
    ) -> Result<(), DomainError> {
        Ok(())
    }
}

struct NullMessageLog;

#[async_trait]
impl MessageLog for NullMessageLog {
    async fn record(&self, _entry: MessageLogEntry) -> Result<(), DomainError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outbound {
    Text(String),
    Buttons(String),
    ResumeOpener(RegistrationId),
}

struct TestGateway {
    outbound: Mutex<Vec<Outbound>>,
    window_open: AtomicBool,
}

impl TestGateway {
    fn new() -> Self {
        Self {
            outbound: Mutex::new(Vec::new()),
            window_open: AtomicBool::new(true),
        }
    }

    fn outbound(&self) -> Vec<Outbound> {
        self.outbound.lock().unwrap().clone()
    }

    fn close_window(&self) {
        self.window_open.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessagingGateway for TestGateway {
    async fn send_text(&self, _to: &WaId, body: &str) -> Result<String, GatewayError> {
        self.outbound
            .lock()
            .unwrap()
            .push(Outbound::Text(body.to_string()));
        Ok("wamid.text".to_string())
    }

    async fn send_choice_buttons(
        &self,
        _to: &WaId,
        body: &str,
        _buttons: &[Button],
        _header: Option<&str>,
        _footer: Option<&str>,
    ) -> Result<String, GatewayError> {
        self.outbound
            .lock()
            .unwrap()
            .push(Outbound::Buttons(body.to_string()));
        Ok("wamid.buttons".to_string())
    }

    async fn send_resume_opener(
        &self,
        _to: &WaId,
        registration_id: &RegistrationId,
        _name_param: Option<&str>,
    ) -> Result<String, GatewayError> {
        self.outbound
            .lock()
            .unwrap()
            .push(Outbound::ResumeOpener(*registration_id));
        Ok("wamid.template".to_string())
    }

    fn within_24h_window(&self, _last_responded_at: Option<&Timestamp>) -> bool {
        self.window_open.load(Ordering::SeqCst)
    }
}

struct World {
    handler: InboundEventHandler,
    freeform: SendFreeformHandler,
    captures: Arc<TestCaptureStore>,
    gateway: Arc<TestGateway>,
    reg: Registration,
}

impl World {
    fn new() -> Self {
        let reg = Registration {
            id: RegistrationId::new(),
            guest_phone: WaId::parse("919876543210").unwrap(),
            guest_name: Some("Asha".to_string()),
            rsvp_status: RsvpStatus::Yes,
            responded_on: Some(Timestamp::now()),
        };
        let captures = Arc::new(TestCaptureStore::new());
        let registrations = Arc::new(TestRegistrations::with(reg.clone()));
        let send_map = Arc::new(TestSendMap::with(&reg.guest_phone, reg.id));
        let gateway = Arc::new(TestGateway::new());
        let message_log = Arc::new(NullMessageLog);
        let flow = Arc::new(CaptureFlow::new(captures.clone(), gateway.clone()));

        let handler = InboundEventHandler::new(
            flow.clone(),
            registrations.clone(),
            send_map,
            gateway.clone(),
            message_log.clone(),
        );
        let freeform = SendFreeformHandler::new(registrations, gateway.clone(), flow, message_log);

        Self {
            handler,
            freeform,
            captures,
            gateway,
            reg,
        }
    }

    async fn deliver(&self, event: InboundEvent) {
        self.handler
            .handle(self.reg.guest_phone.as_str(), event)
            .await
            .expect("event handling failed");
    }

    async fn tap(&self, button_id: &str) {
        self.deliver(InboundEvent::Button {
            button_id: button_id.to_string(),
        })
        .await;
    }

    async fn say(&self, text: &str) {
        self.deliver(InboundEvent::Text {
            body: text.to_string(),
        })
        .await;
    }

    fn last_outbound(&self) -> Outbound {
        self.gateway.outbound().last().cloned().expect("no outbound")
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn air_commercial_journey_without_return_completes() {
    let w = World::new();

    // Guest wakes the flow; first question arrives as buttons.
    w.deliver(InboundEvent::Wake).await;
    assert_eq!(
        w.last_outbound(),
        Outbound::Buttons("How are you traveling?".to_string())
    );

    w.tap("tc|travel_type|Air").await;
    assert_eq!(
        w.last_outbound(),
        Outbound::Buttons("How will you arrive?".to_string())
    );

    w.tap("tc|arrival|commercial").await;
    assert_eq!(
        w.last_outbound(),
        Outbound::Text("What is your arrival date? Reply like 2025-10-03".to_string())
    );

    w.say("2025-12-01").await;
    assert_eq!(
        w.last_outbound(),
        Outbound::Text("What is your arrival time? Reply like 14:30 or 2:30pm".to_string())
    );

    w.say("2:30pm").await;
    w.say("IndiGo").await;
    w.say("6e455").await;
    w.say("skip").await; // pnr
    w.say("Landing at T2").await; // arrival details
    w.say("16:00").await; // hotel arrival
    w.say("skip").await; // hotel departure

    // Return-travel gate arrives as buttons.
    assert_eq!(
        w.last_outbound(),
        Outbound::Buttons("Do you have a return journey?".to_string())
    );
    w.tap("tc|return_travel|no").await;

    let (session, record) = w.captures.snapshot(&w.reg.id).unwrap();
    assert!(session.is_complete());
    assert_eq!(session.step(), SessionStep::Done);
    assert_eq!(record.travel_type, Some(TravelMode::Air));
    assert_eq!(record.flight_number.as_deref(), Some("6E455"));
    assert_eq!(record.pnr, Answer::Skipped);
    assert_eq!(
        record.arrival_details,
        Answer::Given("Landing at T2".to_string())
    );
    assert!(!record.return_travel);
    assert!(record.departure.is_none());
    assert!(matches!(w.last_outbound(), Outbound::Text(body) if body.starts_with("Thanks!")));
}

#[tokio::test]
async fn return_journey_walks_the_departure_mirror() {
    let w = World::new();

    w.deliver(InboundEvent::Wake).await;
    w.tap("tc|travel_type|Air").await;
    w.tap("tc|arrival|local_pickup").await;
    w.say("2025-12-01").await;
    w.say("9:00").await;
    w.say("skip").await; // arrival details
    w.say("skip").await; // hotel arrival
    w.say("skip").await; // hotel departure
    w.tap("tc|return_travel|yes").await;

    assert_eq!(
        w.last_outbound(),
        Outbound::Buttons("How will you depart?".to_string())
    );
    w.tap("tc|departure|commercial").await;
    w.say("2025-12-05").await;
    w.say("6:20pm").await;
    w.say("Air India").await;
    w.say("AI 302").await;
    w.say("skip").await; // departure pnr
    w.say("skip").await; // departure details

    let (session, record) = w.captures.snapshot(&w.reg.id).unwrap();
    assert!(session.is_complete());
    assert!(record.return_travel);
    assert_eq!(
        record.departure_airline,
        Answer::Given("Air India".to_string())
    );
    assert_eq!(record.departure_pnr, Answer::Skipped);
}

#[tokio::test]
async fn duplicate_webhook_delivery_does_not_double_send() {
    let w = World::new();

    w.deliver(InboundEvent::Wake).await;
    let after_first = w.gateway.outbound().len();

    // The relay redelivers the same wake.
    w.deliver(InboundEvent::Wake).await;
    assert_eq!(w.gateway.outbound().len(), after_first);
}

#[tokio::test]
async fn corrective_hint_then_valid_answer_recovers() {
    let w = World::new();

    w.deliver(InboundEvent::Wake).await;
    w.tap("tc|travel_type|Train").await;
    w.tap("tc|arrival|self").await;

    w.say("first of December").await;
    assert_eq!(
        w.last_outbound(),
        Outbound::Text("Please send date as YYYY-MM-DD (e.g., 2025-10-03).".to_string())
    );

    w.say("2025-12-01").await;
    let (_, record) = w.captures.snapshot(&w.reg.id).unwrap();
    assert_eq!(
        record.arrival_date,
        chrono::NaiveDate::from_ymd_opt(2025, 12, 1)
    );
}

#[tokio::test]
async fn out_of_window_guest_gets_resume_opener() {
    let w = World::new();
    w.gateway.close_window();

    w.deliver(InboundEvent::Wake).await;

    assert_eq!(w.gateway.outbound(), vec![Outbound::ResumeOpener(w.reg.id)]);
}

#[tokio::test]
async fn resume_payload_reaches_the_paused_session() {
    let w = World::new();

    w.deliver(InboundEvent::Wake).await;
    w.tap("tc|travel_type|Car").await;

    // Resume arrives with the registration embedded; phone lookup not needed.
    w.handler
        .handle(
            "00000000000",
            InboundEvent::Resume {
                payload: format!("resume|{}", w.reg.id),
            },
        )
        .await
        .unwrap();

    assert_eq!(
        w.last_outbound(),
        Outbound::Buttons("How will you arrive?".to_string())
    );
}

#[tokio::test]
async fn freeform_send_pauses_capture_and_wake_resumes_it() {
    let w = World::new();

    w.deliver(InboundEvent::Wake).await;
    w.tap("tc|travel_type|Air").await;
    w.tap("tc|arrival|commercial").await;

    w.freeform
        .handle(SendFreeformCommand {
            registration_id: w.reg.id,
            message: "Quick update about the venue".to_string(),
        })
        .await
        .unwrap();

    let (session, _) = w.captures.snapshot(&w.reg.id).unwrap();
    assert_eq!(session.step(), SessionStep::Idle);

    // The guest's next reply is not swallowed as a travel answer; a wake
    // re-prompts the pending question instead.
    w.deliver(InboundEvent::Wake).await;
    assert_eq!(
        w.last_outbound(),
        Outbound::Text("What is your arrival date? Reply like 2025-10-03".to_string())
    );
}

#[tokio::test]
async fn post_rsvp_menu_button_launches_the_dialogue() {
    let w = World::new();

    w.tap(&format!("tc|start_travel|{}", w.reg.id)).await;

    assert_eq!(
        w.last_outbound(),
        Outbound::Buttons("How are you traveling?".to_string())
    );
}
