//! services/session/src/bin/session.rs
//!
//! Terminal entrypoint for the candidate session runtime. Wires the HTTP
//! backend adapter, capability-absent speech engines and the console
//! presenter into the controller, then bridges stdin lines into candidate
//! events so the full flow can be exercised against a live backend.
//!
//! Usage: `session <interview-token>`

use std::sync::Arc;
use std::time::Duration;

use interview_session_core::ports::Capabilities;
use session_lib::adapters::backend::HttpBackend;
use session_lib::adapters::clock::SystemClock;
use session_lib::adapters::console::ConsolePresenter;
use session_lib::adapters::speech::{UnsupportedRecognition, UnsupportedSynthesis};
use session_lib::config::Config;
use session_lib::error::SessionError;
use session_lib::runtime::{CandidateEvent, SessionController, SessionDeps, SessionEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), SessionError> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("session={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        api_base_url = %config.api_base_url,
        recognition_lang = %config.recognition_lang,
        "Starting candidate session runtime"
    );

    let token = std::env::args().nth(1);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let deps = SessionDeps {
        backend: Arc::new(HttpBackend::new(client, config.api_base_url.clone())),
        synthesis: Arc::new(UnsupportedSynthesis),
        recognition: Arc::new(UnsupportedRecognition),
        presenter: Arc::new(ConsolePresenter::new()),
        clock: Arc::new(SystemClock),
        // The terminal host has no speech engines; the runtime shows its
        // microphone notices and records placeholder answers.
        capabilities: Capabilities {
            synthesis: false,
            recognition: false,
        },
    };

    let input = tokio::spawn(read_candidate_input(events_tx.clone()));

    let controller = SessionController::new(deps, events_tx, events_rx);
    controller.run(token).await;

    input.abort();
    info!("Session ended.");
    Ok(())
}

/// Translates stdin lines into candidate events until the session ends.
async fn read_candidate_input(events: UnboundedSender<SessionEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to read candidate input: {e}");
                return;
            }
        };

        let event = match parse_command(line.trim()) {
            Some(event) => event,
            None => {
                println!("Commands: pin <digits> | back | test | start | submit | skip | replay");
                continue;
            }
        };
        if events.send(SessionEvent::Candidate(event)).is_err() {
            return;
        }
    }
}

fn parse_command(line: &str) -> Option<CandidateEvent> {
    if let Some(digits) = line.strip_prefix("pin ") {
        return Some(CandidateEvent::PinPaste(digits.to_string()));
    }
    match line {
        "back" => Some(CandidateEvent::PinBackspace),
        "test" => Some(CandidateEvent::StartMicTest),
        "start" => Some(CandidateEvent::StartInterview),
        "submit" => Some(CandidateEvent::SubmitAnswer),
        "skip" => Some(CandidateEvent::SkipBreak),
        "replay" => Some(CandidateEvent::Replay),
        _ => {
            let mut chars = line.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) if ch.is_ascii_digit() => Some(CandidateEvent::PinDigit(ch)),
                _ => None,
            }
        }
    }
}
