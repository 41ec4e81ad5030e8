//! services/session/src/runtime/state.rs
//!
//! Defines the session-scoped mutable state owned by the controller.
//! Everything here is reconstructed from scratch on every page load; the
//! backend's question records are the only durable resume marker.

use interview_session_core::domain::{AssignedQuestion, InterviewSnapshot, SessionToken};
use interview_session_core::pin::PinEntry;

/// Which part of the flow the controller is currently driving. Terminal
/// display states (too early, too late, error, completed) end the event loop
/// and therefore never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Countdown plus PIN entry, before and after verification.
    Lobby,
    MicTest,
    Question,
    Break,
}

/// Governs whether a spontaneous recognition `Ended` signal triggers a
/// restart. A deliberate stop always installs `Never` first, then swaps in
/// the next policy after the engine has stopped, so a late `Ended` from the
/// teardown can never race a phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    Never,
    /// Keep listening while the mic-test ceiling timer is active.
    DuringMicTest,
    /// Keep listening while a question timer is active.
    DuringQuestion,
}

/// All mutable state for one candidate session. Owned exclusively by the
/// controller instance; concurrent sessions (multiple tabs) are isolated by
/// construction.
pub struct SessionState {
    pub token: SessionToken,
    pub interview: InterviewSnapshot,
    pub questions: Vec<AssignedQuestion>,
    pub current_index: usize,
    pub phase: Phase,

    pub pin: PinEntry,
    pub pin_verified: bool,
    /// Set when the pre-interview countdown has reached the scheduled time.
    /// The interview still cannot start until the PIN is verified.
    pub countdown_done: bool,

    pub mic_test_passed: bool,
    /// Whether the explicit "start interview" action is currently available.
    pub start_enabled: bool,

    /// Accumulated speech-to-text hypothesis for the current question.
    /// Replaced wholesale on every recognition result, reset per question.
    pub transcript: String,
    /// Total seconds of the current question's timer, for elapsed arithmetic.
    pub question_total: u64,
    /// The early-submit control has been revealed for the current question.
    pub early_submit_shown: bool,
    /// The current question's answer has been submitted (timer expiry and an
    /// explicit submit action converge here; only the first wins).
    pub submitted: bool,
    /// The replay control is currently usable.
    pub replay_enabled: bool,

    pub restart: RestartPolicy,
}

impl SessionState {
    pub fn new(
        token: SessionToken,
        interview: InterviewSnapshot,
        questions: Vec<AssignedQuestion>,
    ) -> Self {
        Self {
            token,
            interview,
            questions,
            current_index: 0,
            phase: Phase::Lobby,
            pin: PinEntry::new(),
            pin_verified: false,
            countdown_done: false,
            mic_test_passed: false,
            start_enabled: false,
            transcript: String::new(),
            question_total: 0,
            early_submit_shown: false,
            submitted: false,
            replay_enabled: false,
            restart: RestartPolicy::Never,
        }
    }

    /// Resets the per-question scratch state when a new question begins.
    pub fn begin_question(&mut self, total_secs: u64) {
        self.phase = Phase::Question;
        self.transcript.clear();
        self.question_total = total_secs;
        self.early_submit_shown = false;
        self.submitted = false;
        self.replay_enabled = false;
    }

    pub fn current_question(&self) -> Option<&AssignedQuestion> {
        self.questions.get(self.current_index)
    }
}
