//! services/session/src/runtime/event.rs
//!
//! Defines the single event vocabulary feeding the session controller.
//! Timers, the recognition adapter and the candidate's UI all converge on
//! one channel, so the whole flow is driven from one dispatch point.

use interview_session_core::ports::RecognitionSignal;

/// The four timer uses. At most one timer of each kind is ever alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Pre-interview countdown toward the scheduled start.
    Countdown,
    /// Per-question answer timer.
    Question,
    /// Fixed pause between questions.
    Break,
    /// Ceiling on the microphone calibration step.
    MicTest,
}

impl TimerKind {
    pub(crate) const COUNT: usize = 4;

    pub(crate) fn index(self) -> usize {
        match self {
            TimerKind::Countdown => 0,
            TimerKind::Question => 1,
            TimerKind::Break => 2,
            TimerKind::MicTest => 3,
        }
    }
}

/// An action taken by the candidate in the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateEvent {
    PinDigit(char),
    PinBackspace,
    PinPaste(String),
    StartMicTest,
    StartInterview,
    SubmitAnswer,
    SkipBreak,
    Replay,
}

/// Everything the controller can react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A one-second tick from a live timer. The epoch identifies which
    /// spawned timer produced the tick so ticks queued behind a cancellation
    /// can be discarded.
    Timer {
        kind: TimerKind,
        epoch: u64,
        remaining: u64,
    },
    Recognition(RecognitionSignal),
    Candidate(CandidateEvent),
}
