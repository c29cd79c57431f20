//! Capture session - the state machine's memory.
//!
//! One session per registration, created lazily on first interaction and
//! never deleted (it doubles as an audit trail). All resumable state lives
//! here; nothing waits in memory between webhook deliveries.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RegistrationId, Timestamp};

use super::step::{SessionStep, Step};

/// Side-channel memory for branch decisions.
///
/// `return_travel` records that the guest answered the return-travel question
/// at all. The record's boolean alone cannot distinguish "answered no" from
/// "not yet asked", so the resolver checks both signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_travel: Option<bool>,
}

impl BranchState {
    pub fn is_empty(&self) -> bool {
        self.return_travel.is_none()
    }
}

/// Per-registration dialogue state.
///
/// # Invariants
///
/// - At most one session per registration (enforced by storage).
/// - `step == Done` implies `is_complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSession {
    registration_id: RegistrationId,
    step: SessionStep,
    /// The step whose prompt was most recently sent. Used to suppress
    /// duplicate sends on retried webhook deliveries.
    last_prompt_step: Option<SessionStep>,
    state: BranchState,
    is_complete: bool,
    last_message_at: Timestamp,
    created_at: Timestamp,
}

impl CaptureSession {
    /// Creates a fresh, idle session.
    pub fn new(registration_id: RegistrationId) -> Self {
        let now = Timestamp::now();
        Self {
            registration_id,
            step: SessionStep::Idle,
            last_prompt_step: None,
            state: BranchState::default(),
            is_complete: false,
            last_message_at: now,
            created_at: now,
        }
    }

    /// Reconstitutes a session from persistence (no validation).
    pub fn reconstitute(
        registration_id: RegistrationId,
        step: SessionStep,
        last_prompt_step: Option<SessionStep>,
        state: BranchState,
        is_complete: bool,
        last_message_at: Timestamp,
        created_at: Timestamp,
    ) -> Self {
        Self {
            registration_id,
            step,
            last_prompt_step,
            state,
            is_complete,
            last_message_at,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn registration_id(&self) -> &RegistrationId {
        &self.registration_id
    }

    pub fn step(&self) -> SessionStep {
        self.step
    }

    pub fn last_prompt_step(&self) -> Option<SessionStep> {
        self.last_prompt_step
    }

    pub fn state(&self) -> &BranchState {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn last_message_at(&self) -> &Timestamp {
        &self.last_message_at
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Enters the dialogue at the first step if the session is idle.
    ///
    /// A session that is already mid-flow keeps its stored step.
    pub fn begin(&mut self, now: Timestamp) {
        if self.step == SessionStep::Idle {
            self.step = SessionStep::Active(Step::TravelType);
        }
        self.last_message_at = now;
    }

    /// Resets to the first step, clearing completion and branch memory.
    pub fn restart(&mut self, now: Timestamp) {
        self.step = SessionStep::Active(Step::TravelType);
        self.is_complete = false;
        self.state = BranchState::default();
        self.last_message_at = now;
    }

    /// Moves to a pending step without recording a prompt send.
    pub fn advance_to(&mut self, step: Step, now: Timestamp) {
        self.step = SessionStep::Active(step);
        self.last_message_at = now;
    }

    /// Moves to a step and records that its prompt is being sent.
    pub fn mark_prompted(&mut self, step: Step, now: Timestamp) {
        self.step = SessionStep::Active(step);
        self.last_prompt_step = Some(SessionStep::Active(step));
        self.last_message_at = now;
    }

    /// True if the given step's prompt was the last one sent.
    pub fn already_prompted(&self, step: Step) -> bool {
        self.last_prompt_step == Some(SessionStep::Active(step))
    }

    /// Enters the terminal state and records the completion message send.
    pub fn complete(&mut self, now: Timestamp) {
        self.step = SessionStep::Done;
        self.is_complete = true;
        self.last_prompt_step = Some(SessionStep::Done);
        self.last_message_at = now;
    }

    /// True once the completion message has gone out.
    pub fn completion_sent(&self) -> bool {
        self.last_prompt_step == Some(SessionStep::Done)
    }

    /// Suspends an in-flight dialogue so unrelated replies are not consumed
    /// as travel answers. No-op for idle or finished sessions.
    ///
    /// Clears the duplicate-prompt marker so the next resume re-asks the
    /// pending question instead of staying silent.
    pub fn pause(&mut self, now: Timestamp) {
        if self.is_complete || self.step.active().is_none() {
            return;
        }
        self.step = SessionStep::Idle;
        self.last_prompt_step = None;
        self.last_message_at = now;
    }

    /// Remembers that the return-travel question was answered.
    pub fn record_return_answer(&mut self, has_return: bool) {
        self.state.return_travel = Some(has_return);
    }
}
