//! crates/interview_session_core/src/domain.rs
//!
//! Defines the pure, core data structures for the candidate session.
//! These structs are independent of any wire or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Flow Constants
//=========================================================================================

/// Fallback per-question timer in seconds when no override is configured.
pub const DEFAULT_QUESTION_TIMER_SECS: u64 = 120;
/// Remaining seconds below which the question timer is rendered in its warning state.
pub const TIMER_WARNING_SECS: u64 = 10;
/// Fixed pause between questions, in seconds.
pub const BREAK_SECS: u64 = 30;
/// Ceiling on the microphone calibration step, in seconds.
pub const MIC_TEST_LIMIT_SECS: u64 = 300;
/// Seconds after initial playback during which the replay control stays enabled.
pub const REPLAY_WINDOW_SECS: u64 = 10;
/// Extra second after the replay control is disabled before it is hidden.
pub const REPLAY_HIDE_GRACE_SECS: u64 = 1;
/// Duration of the between-question transition overlay, in milliseconds.
pub const TRANSITION_MS: u64 = 3000;
/// Number of digits in the interview PIN.
pub const PIN_LEN: usize = 6;
/// How long the PIN error indication stays visible, in milliseconds.
pub const PIN_ERROR_FLASH_MS: u64 = 400;
/// Answer text submitted when the transcript is empty at submission time.
pub const NO_ANSWER_FALLBACK: &str = "(no answer)";

/// Returns whether voluntary early submission is open for a question timer.
///
/// Early submission unlocks once 30% of the configured duration has elapsed.
/// Integer arithmetic keeps the boundary exact: for a 120s question the
/// control appears at elapsed = 36s, not 35s.
pub fn early_submit_open(total_secs: u64, elapsed_secs: u64) -> bool {
    elapsed_secs * 10 >= total_secs * 3
}

//=========================================================================================
// Session Entities
//=========================================================================================

/// The opaque identifier binding one browser session to one scheduled interview.
///
/// Extracted once from the access link and immutable for the session lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Server-side lifecycle state of an interview record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// The interview record as seen by the candidate, fetched once at init.
///
/// The PIN field is stripped server-side before this snapshot is produced.
#[derive(Debug, Clone)]
pub struct InterviewSnapshot {
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<i64>,
    pub status: InterviewStatus,
    pub token_revoked: bool,
}

/// One question assigned to this interview, in presentation order.
#[derive(Debug, Clone)]
pub struct AssignedQuestion {
    pub id: Uuid,
    pub prompt: String,
    /// Per-question timer override; `None` means the default applies.
    pub timer_secs: Option<u64>,
    /// Existing answer, if the candidate already submitted one. This is the
    /// resume marker after a page reload.
    pub answer: Option<String>,
}

impl AssignedQuestion {
    /// The timer this question actually runs with.
    pub fn effective_timer_secs(&self) -> u64 {
        match self.timer_secs {
            Some(secs) if secs > 0 => secs,
            _ => DEFAULT_QUESTION_TIMER_SECS,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.answer.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

/// Index of the first unanswered question, or `None` when everything has been
/// answered already.
///
/// Resume after a reload always recomputes this rather than incrementing a
/// stored cursor, which keeps resumption idempotent.
pub fn first_unanswered(questions: &[AssignedQuestion]) -> Option<usize> {
    questions.iter().position(|q| !q.is_answered())
}
