//! services/session/src/adapters/clock.rs
//!
//! The wall-clock implementation of the `Clock` port.

use chrono::{DateTime, Utc};
use interview_session_core::ports::Clock;

/// System wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
