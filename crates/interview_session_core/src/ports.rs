//! crates/interview_session_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the session runtime.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core flow to be independent of the concrete backend transport, the speech
//! engines of the host platform, and the rendering technology.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AssignedQuestion, InterviewSnapshot, SessionToken, PIN_LEN};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the
/// backend API or a speech engine).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    /// A revoked token or a rejected PIN. Carries the server's message when
    /// one was provided; callers supply their own fallback text.
    #[error("Unauthorized")]
    Unauthorized(Option<String>),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Backend Collaborator Port
//=========================================================================================

/// The token-scoped backend HTTP contract consumed by the session.
///
/// Revocation of the token surfaces as `PortError::Unauthorized` on any of
/// these operations; a missing or mismatched record as `PortError::NotFound`.
#[async_trait]
pub trait BackendService: Send + Sync {
    /// Fetches the interview record bound to the access token.
    async fn fetch_interview(&self, token: &SessionToken) -> PortResult<InterviewSnapshot>;

    /// Fetches the ordered question list assigned to the interview.
    async fn fetch_questions(&self, token: &SessionToken) -> PortResult<Vec<AssignedQuestion>>;

    /// Checks the six-digit PIN against the interview record.
    async fn verify_pin(&self, token: &SessionToken, pin: &str) -> PortResult<()>;

    /// Stores the candidate's answer for one question.
    async fn submit_answer(&self, question_id: Uuid, token: &SessionToken, answer: &str)
        -> PortResult<()>;

    /// Marks the interview completed.
    async fn complete_interview(&self, token: &SessionToken) -> PortResult<()>;
}

//=========================================================================================
// Speech Ports
//=========================================================================================

/// Text-to-speech playback of a question prompt.
#[async_trait]
pub trait SpeechSynthesisService: Send + Sync {
    /// Speaks the given text, resolving once playback ends. Engine-reported
    /// playback failures also resolve; the interview is never blocked on
    /// synthesis.
    async fn speak(&self, text: &str) -> PortResult<()>;
}

/// A lifecycle or transcript event emitted by the recognition engine.
///
/// Adapters deliver these into the session event channel; the transcript is
/// the engine's full cumulative hypothesis and replaces, never appends to,
/// the current buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionSignal {
    Transcript(String),
    /// The engine stopped on its own. Whether to restart is the runtime's
    /// decision, governed by its restart policy.
    Ended,
    /// A non-recoverable engine error. "no speech" and "aborted" conditions
    /// are swallowed by adapters and never reach the runtime.
    Failed(String),
}

/// Continuous, interim-results speech capture.
#[async_trait]
pub trait SpeechRecognitionService: Send + Sync {
    /// Begins (or resumes) continuous capture. Calling `start` while the
    /// engine is already running is a no-op, mirroring host engines that
    /// reject double starts.
    async fn start(&self) -> PortResult<()>;

    /// Deliberately stops capture. No `Ended` signal should follow a
    /// deliberate stop.
    async fn stop(&self);
}

//=========================================================================================
// Presentation Port
//=========================================================================================

/// The screens the session can display. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Error,
    TooEarly,
    TooLate,
    Waiting,
    Verified,
    MicTest,
    Interview,
    Break,
    Completed,
}

/// Visibility of the replay control during a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayControl {
    Hidden,
    Enabled,
    Disabled,
}

/// Mic-test calibration status shown to the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MicStatus {
    Idle,
    Working,
    Unsupported,
    StartFailed,
}

/// The rendering port. The flow in the runtime is defined entirely against
/// this trait, which lets the whole state machine run headlessly under test.
pub trait Presentation: Send + Sync {
    fn show_screen(&self, screen: Screen);
    fn show_error(&self, message: &str);
    /// Scheduled-date hint rendered on the too-early screen.
    fn set_scheduled_hint(&self, formatted: &str);
    fn set_countdown(&self, display: &str);

    fn set_pin_cells(&self, cells: &[Option<char>; PIN_LEN], focus: usize);
    fn flash_pin_error(&self, message: &str);
    fn clear_pin_error(&self);

    fn set_mic_timer(&self, display: &str);
    fn set_mic_preview(&self, transcript: &str);
    fn set_mic_status(&self, status: MicStatus);
    /// Enables or disables the explicit "start interview" action.
    fn set_start_enabled(&self, enabled: bool);

    fn show_transition(&self, label: &str);
    fn set_question(&self, number: usize, total: usize, text: &str);
    fn set_timer(&self, display: &str, warning: bool);
    fn set_transcript(&self, transcript: &str);
    fn set_early_submit(&self, visible: bool);
    fn set_replay(&self, control: ReplayControl);
    fn show_mic_warning(&self);

    fn set_break(&self, remaining_secs: u64, percent: u8, label: &str);
}

//=========================================================================================
// Clock and Capabilities
//=========================================================================================

/// Wall-clock time, injectable so the flow can be tested without waiting.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Speech capabilities of the host platform, probed once at startup and
/// threaded through as configuration rather than re-checked ad hoc.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub synthesis: bool,
    pub recognition: bool,
}
