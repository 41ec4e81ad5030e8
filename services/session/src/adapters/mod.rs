//! services/session/src/adapters/mod.rs
//!
//! Declares the concrete implementations of the core service ports.

pub mod backend;
pub mod clock;
pub mod console;
pub mod speech;
