//! services/session/src/adapters/console.rs
//!
//! A terminal implementation of the `Presentation` port, used by the
//! `session` binary to exercise the full flow against a live backend.
//! Countdown and timer updates repaint in place; everything else prints
//! a line per change.

use std::io::Write;

use interview_session_core::domain::PIN_LEN;
use interview_session_core::ports::{MicStatus, Presentation, ReplayControl, Screen};

/// Renders the session to stdout.
pub struct ConsolePresenter;

impl ConsolePresenter {
    pub fn new() -> Self {
        Self
    }

    fn line(&self, text: &str) {
        println!("{text}");
    }

    /// Repaints a single status line (countdowns tick once per second).
    fn status(&self, text: &str) {
        print!("\r{text}        ");
        let _ = std::io::stdout().flush();
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentation for ConsolePresenter {
    fn show_screen(&self, screen: Screen) {
        let banner = match screen {
            Screen::Error => "=== Something went wrong ===",
            Screen::TooEarly => "=== You're early ===",
            Screen::TooLate => "=== The interview window has closed ===",
            Screen::Waiting => "=== Interview lobby — enter your PIN ===",
            Screen::Verified => "=== PIN verified — waiting for the start ===",
            Screen::MicTest => "=== Microphone check ===",
            Screen::Interview => "=== Interview in progress ===",
            Screen::Break => "=== Short break ===",
            Screen::Completed => "=== Interview completed. Thank you! ===",
        };
        println!();
        self.line(banner);
    }

    fn show_error(&self, message: &str) {
        self.line(&format!("Error: {message}"));
    }

    fn set_scheduled_hint(&self, formatted: &str) {
        self.line(&format!("Your interview is scheduled for {formatted}."));
    }

    fn set_countdown(&self, display: &str) {
        self.status(&format!("Starts in {display}"));
    }

    fn set_pin_cells(&self, cells: &[Option<char>; PIN_LEN], focus: usize) {
        let rendered: String = cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let ch = c.unwrap_or('_');
                if i == focus {
                    format!("[{ch}]")
                } else {
                    format!(" {ch} ")
                }
            })
            .collect();
        self.line(&format!("PIN: {rendered}"));
    }

    fn flash_pin_error(&self, message: &str) {
        self.line(&format!("PIN rejected: {message}"));
    }

    fn clear_pin_error(&self) {}

    fn set_mic_timer(&self, display: &str) {
        self.status(&format!("Time remaining: {display}"));
    }

    fn set_mic_preview(&self, transcript: &str) {
        self.line(&format!("Heard: {transcript}"));
    }

    fn set_mic_status(&self, status: MicStatus) {
        match status {
            MicStatus::Idle => {}
            MicStatus::Working => self.line("Microphone working!"),
            MicStatus::Unsupported => {
                self.line("Speech recognition is not supported on this host.")
            }
            MicStatus::StartFailed => {
                self.line("Could not start the microphone. Please check permissions.")
            }
        }
    }

    fn set_start_enabled(&self, enabled: bool) {
        if enabled {
            self.line("You may start the interview now (type 'start').");
        }
    }

    fn show_transition(&self, label: &str) {
        println!();
        self.line(&format!("--- {label} ---"));
    }

    fn set_question(&self, number: usize, total: usize, text: &str) {
        self.line(&format!("Question {number} / {total}: {text}"));
    }

    fn set_timer(&self, display: &str, warning: bool) {
        if warning {
            self.status(&format!("{display} !"));
        } else {
            self.status(display);
        }
    }

    fn set_transcript(&self, transcript: &str) {
        self.line(&format!("Transcript: {transcript}"));
    }

    fn set_early_submit(&self, visible: bool) {
        if visible {
            self.line("You may submit early (type 'submit').");
        }
    }

    fn set_replay(&self, control: ReplayControl) {
        if control == ReplayControl::Enabled {
            self.line("Replay available for a few seconds (type 'replay').");
        }
    }

    fn show_mic_warning(&self) {
        self.line("Microphone unavailable — your answer will be recorded as blank.");
    }

    fn set_break(&self, remaining_secs: u64, percent: u8, label: &str) {
        self.status(&format!("{label} — next question in {remaining_secs}s ({percent}%)"));
    }
}
