//! services/session/src/adapters/speech.rs
//!
//! Capability-absent speech engines. The interview must remain completable on
//! hosts without synthesis or recognition support: playback resolves
//! immediately and capture contributes nothing, leaving the runtime to show
//! its microphone warning and fall back to the placeholder answer.
//!
//! Real engines are host-provided; tests inject scripted fakes through the
//! same ports.

use async_trait::async_trait;
use interview_session_core::ports::{
    PortResult, SpeechRecognitionService, SpeechSynthesisService,
};

/// A synthesis engine for hosts without text-to-speech support.
/// Playback is skipped silently so the flow never blocks on it.
pub struct UnsupportedSynthesis;

#[async_trait]
impl SpeechSynthesisService for UnsupportedSynthesis {
    async fn speak(&self, _text: &str) -> PortResult<()> {
        Ok(())
    }
}

/// A recognition engine for hosts without speech-to-text support.
/// It never emits a signal; the runtime detects the absent capability up
/// front and renders the microphone warning instead of a live transcript.
pub struct UnsupportedRecognition;

#[async_trait]
impl SpeechRecognitionService for UnsupportedRecognition {
    async fn start(&self) -> PortResult<()> {
        Ok(())
    }

    async fn stop(&self) {}
}
