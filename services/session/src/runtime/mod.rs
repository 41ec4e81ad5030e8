//! services/session/src/runtime/mod.rs
//!
//! The candidate session runtime: event vocabulary, timer engine, session
//! state and the flow controller.

pub mod controller;
pub mod event;
pub mod state;
pub mod timer;


pub use controller::{SessionController, SessionDeps};
pub use event::{CandidateEvent, SessionEvent, TimerKind};
