//! In-memory port implementations shared by application-layer tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::capture::{CaptureSession, TravelRecord};
use crate::domain::foundation::{DomainError, RegistrationId, Timestamp, WaId};
use crate::domain::rsvp::RsvpStatus;
use crate::ports::{
    Button, CaptureStore, GatewayError, MessageLog, MessageLogEntry, MessagingGateway,
    Registration, RegistrationStore, SendTrackingStore,
};

/// A registration fixture with a stable phone number.
pub fn registration() -> Registration {
    Registration {
        id: RegistrationId::new(),
        guest_phone: WaId::parse("919876543210").unwrap(),
        guest_name: Some("Asha".to_string()),
        rsvp_status: RsvpStatus::Pending,
        responded_on: Some(Timestamp::now()),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Capture store
// ════════════════════════════════════════════════════════════════════════════

pub struct InMemoryCaptureStore {
    pairs: Mutex<HashMap<RegistrationId, (CaptureSession, TravelRecord)>>,
}

impl InMemoryCaptureStore {
    pub fn new() -> Self {
        Self {
            pairs: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: &RegistrationId) -> Option<(CaptureSession, TravelRecord)> {
        self.pairs.lock().unwrap().get(id).cloned()
    }

    pub fn get_or_default(&self, id: &RegistrationId) -> (CaptureSession, TravelRecord) {
        self.get(id)
            .unwrap_or_else(|| (CaptureSession::new(*id), TravelRecord::new(*id)))
    }

    pub fn put(&self, session: CaptureSession, record: TravelRecord) {
        self.pairs
            .lock()
            .unwrap()
            .insert(*session.registration_id(), (session, record));
    }
}

#[async_trait]
impl CaptureStore for InMemoryCaptureStore {
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
            .map(|(session, _)| session.clone()))
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

// ════════════════════════════════════════════════════════════════════════════
// Messaging gateway
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        to: String,
        body: String,
    },
    Buttons {
        to: String,
        body: String,
        ids: Vec<String>,
    },
    ResumeOpener {
        to: String,
        registration_id: RegistrationId,
    },
}

pub struct RecordingGateway {
    sent: Mutex<Vec<Sent>>,
    window_open: AtomicBool,
    fail_sends: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            window_open: AtomicBool::new(true),
            fail_sends: AtomicBool::new(false),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn close_window(&self) {
        self.window_open.store(false, Ordering::SeqCst);
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    fn record(&self, message: Sent) -> Result<String, GatewayError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("injected failure".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(format!("wamid.test.{}", sent.len()))
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_text(&self, to: &WaId, body: &str) -> Result<String, GatewayError> {
        self.record(Sent::Text {
            to: to.as_str().to_string(),
            body: body.to_string(),
        })
    }

    async fn send_choice_buttons(
        &self,
        to: &WaId,
        body: &str,
        buttons: &[Button],
        _header: Option<&str>,
        _footer: Option<&str>,
    ) -> Result<String, GatewayError> {
        self.record(Sent::Buttons {
            to: to.as_str().to_string(),
            body: body.to_string(),
            ids: buttons.iter().map(|b| b.id.clone()).collect(),
        })
    }

    async fn send_resume_opener(
        &self,
        to: &WaId,
        registration_id: &RegistrationId,
        _name_param: Option<&str>,
    ) -> Result<String, GatewayError> {
        self.record(Sent::ResumeOpener {
            to: to.as_str().to_string(),
            registration_id: *registration_id,
        })
    }

    fn within_24h_window(&self, _last_responded_at: Option<&Timestamp>) -> bool {
        self.window_open.load(Ordering::SeqCst)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Registration store
// ════════════════════════════════════════════════════════════════════════════

pub struct InMemoryRegistrationStore {
    registrations: Mutex<HashMap<RegistrationId, Registration>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_registration(registration: Registration) -> Self {
        let store = Self::new();
        store.insert(registration);
        store
    }

    pub fn insert(&self, registration: Registration) {
        self.registrations
            .lock()
            .unwrap()
            .insert(registration.id, registration);
    }

    pub fn get(&self, id: &RegistrationId) -> Option<Registration> {
        self.registrations.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
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

// ════════════════════════════════════════════════════════════════════════════
// Send tracking
// ════════════════════════════════════════════════════════════════════════════

pub struct InMemorySendTracking {
    map: Mutex<HashMap<String, RegistrationId>>,
    consumed: Mutex<Vec<RegistrationId>>,
}

impl InMemorySendTracking {
    pub fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
            consumed: Mutex::new(Vec::new()),
        }
    }

    pub fn track(&self, wa_id: &WaId, registration_id: RegistrationId) {
        self.map
            .lock()
            .unwrap()
            .insert(wa_id.as_str().to_string(), registration_id);
    }

    pub fn consumed(&self) -> Vec<RegistrationId> {
        self.consumed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SendTrackingStore for InMemorySendTracking {
    async fn latest_for(&self, wa_id: &WaId) -> Result<Option<RegistrationId>, DomainError> {
        Ok(self.map.lock().unwrap().get(wa_id.as_str()).copied())
    }

    async fn mark_consumed(
        &self,
        registration_id: &RegistrationId,
        _at: Timestamp,
    ) -> Result<(), DomainError> {
        self.consumed.lock().unwrap().push(*registration_id);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Message log
// ════════════════════════════════════════════════════════════════════════════

pub struct RecordingMessageLog {
    entries: Mutex<Vec<MessageLogEntry>>,
}

impl RecordingMessageLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<MessageLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageLog for RecordingMessageLog {
    async fn record(&self, entry: MessageLogEntry) -> Result<(), DomainError> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}
