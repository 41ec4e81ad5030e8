//! crates/interview_session_core/src/schedule.rs
//!
//! The time-window classifier and countdown display formatting.
//!
//! `classify` is a pure function of the scheduled time and "now"; it is
//! evaluated once at load to pick the initial screen and then re-evaluated
//! on every tick of the pre-interview countdown.

use chrono::{DateTime, Utc};

/// Seconds before the scheduled start beyond which the candidate is too early.
pub const EARLY_CUTOFF_SECS: i64 = 3600;
/// Seconds after the scheduled start during which late arrival is still accepted.
pub const GRACE_WINDOW_SECS: i64 = 600;

/// Where "now" falls relative to the scheduled interview start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePhase {
    /// More than an hour before the scheduled start.
    TooEarly,
    /// Within the final hour before the scheduled start.
    Waiting,
    /// At or after the scheduled start, inside the grace window.
    Ready,
    /// More than the grace window past the scheduled start.
    TooLate,
}

/// Whole seconds until the scheduled start; negative once it has passed.
pub fn seconds_until(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (scheduled_at - now).num_seconds()
}

/// Classifies the current moment against the scheduled start.
///
/// Evaluated exactly at the scheduled instant the result is `Ready`, not
/// `Waiting`; exactly at the end of the grace window it is still `Ready`.
pub fn classify(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> TimePhase {
    let diff = seconds_until(scheduled_at, now);
    if diff > EARLY_CUTOFF_SECS {
        TimePhase::TooEarly
    } else if diff < -GRACE_WINDOW_SECS {
        TimePhase::TooLate
    } else if diff > 0 {
        TimePhase::Waiting
    } else {
        TimePhase::Ready
    }
}

/// Formats a countdown as `HH:MM:SS`, clamped at `00:00:00`.
pub fn format_countdown(total_seconds: i64) -> String {
    if total_seconds <= 0 {
        return "00:00:00".to_string();
    }
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// Formats a per-question timer as `MM:SS`.
pub fn format_timer(total_seconds: u64) -> String {
    let m = total_seconds / 60;
    let s = total_seconds % 60;
    format!("{m:02}:{s:02}")
}
