//! services/session/src/runtime/controller.rs
//!
//! The question-flow orchestrator. This is the single owner of all mutable
//! session state; timers, recognition signals and candidate actions all
//! arrive on one event channel and every screen transition happens here.
//!
//! The flow: init fetch -> time-window classification -> PIN entry with a
//! live countdown -> microphone calibration -> the per-question answer loop
//! -> completion. Terminal display states (too early, too late, error,
//! completed) end the loop.

use std::sync::Arc;
use std::time::Duration;

use interview_session_core::domain::{
    early_submit_open, first_unanswered, InterviewStatus, SessionToken, BREAK_SECS,
    MIC_TEST_LIMIT_SECS, NO_ANSWER_FALLBACK, PIN_ERROR_FLASH_MS, REPLAY_HIDE_GRACE_SECS,
    REPLAY_WINDOW_SECS, TIMER_WARNING_SECS, TRANSITION_MS,
};
use interview_session_core::pin::PinAction;
use interview_session_core::ports::{
    BackendService, Capabilities, Clock, MicStatus, PortError, Presentation, RecognitionSignal,
    ReplayControl, Screen, SpeechRecognitionService, SpeechSynthesisService,
};
use interview_session_core::schedule::{self, classify, TimePhase};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{error, info, warn};

use crate::runtime::event::{CandidateEvent, SessionEvent, TimerKind};
use crate::runtime::state::{Phase, RestartPolicy, SessionState};
use crate::runtime::timer::TimerSlots;

/// The collaborators the controller runs against, all behind ports so the
/// whole flow can be exercised headlessly.
pub struct SessionDeps {
    pub backend: Arc<dyn BackendService>,
    pub synthesis: Arc<dyn SpeechSynthesisService>,
    pub recognition: Arc<dyn SpeechRecognitionService>,
    pub presenter: Arc<dyn Presentation>,
    pub clock: Arc<dyn Clock>,
    pub capabilities: Capabilities,
}

/// Whether the event loop keeps running after handling an event.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Finished,
}

pub struct SessionController {
    deps: SessionDeps,
    events_rx: UnboundedReceiver<SessionEvent>,
    timers: TimerSlots,
}

impl SessionController {
    /// Creates a controller reading from `events_rx`. The matching sender is
    /// shared between the timer engine (internally), the recognition adapter
    /// and the host UI.
    pub fn new(
        deps: SessionDeps,
        events_tx: UnboundedSender<SessionEvent>,
        events_rx: UnboundedReceiver<SessionEvent>,
    ) -> Self {
        let timers = TimerSlots::new(events_tx);
        Self {
            deps,
            events_rx,
            timers,
        }
    }

    /// Runs one candidate session to its terminal screen.
    pub async fn run(mut self, token: Option<String>) {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            self.deps
                .presenter
                .show_error("No interview token provided. Please use the link sent to your email.");
            self.deps.presenter.show_screen(Screen::Error);
            return;
        };
        let token = SessionToken(token);

        // Interview record and question list are independent read-only
        // fetches; both must succeed before anything is shown.
        let (interview, questions) = match tokio::join!(
            self.deps.backend.fetch_interview(&token),
            self.deps.backend.fetch_questions(&token),
        ) {
            (Ok(interview), Ok(questions)) => (interview, questions),
            (Err(e), _) | (_, Err(e)) => {
                self.fail_init(e);
                return;
            }
        };

        if interview.token_revoked {
            self.fail_init(PortError::Unauthorized(None));
            return;
        }

        if interview.status == InterviewStatus::Completed {
            info!("Interview already completed; showing terminal screen.");
            self.deps.presenter.show_screen(Screen::Completed);
            return;
        }

        let mut state = SessionState::new(token, interview, questions);

        match classify(state.interview.scheduled_at, self.deps.clock.now()) {
            TimePhase::TooEarly => {
                let hint = state
                    .interview
                    .scheduled_at
                    .format("%A, %B %e, %Y at %H:%M UTC")
                    .to_string();
                self.deps.presenter.set_scheduled_hint(&hint);
                self.deps.presenter.show_screen(Screen::TooEarly);
                return;
            }
            TimePhase::TooLate => {
                self.deps.presenter.show_screen(Screen::TooLate);
                return;
            }
            TimePhase::Waiting | TimePhase::Ready => {
                self.deps.presenter.show_screen(Screen::Waiting);
                self.deps
                    .presenter
                    .set_pin_cells(state.pin.cells(), state.pin.focus());
                // If the scheduled time has already arrived this only marks
                // the countdown done; the PIN gate still has to open.
                self.start_countdown(&mut state);
            }
        }

        while let Some(event) = self.events_rx.recv().await {
            if self.handle_event(&mut state, event).await == Flow::Finished {
                break;
            }
        }
        self.timers.cancel_all();
    }

    /// All init-time failures funnel into one terminal error display.
    fn fail_init(&self, err: PortError) {
        error!("Session initialization failed: {err}");
        let message = match err {
            PortError::Unauthorized(message) => {
                message.unwrap_or_else(|| "This interview link has been revoked.".to_string())
            }
            PortError::NotFound(message) | PortError::Unexpected(message) => message,
        };
        self.deps.presenter.show_error(&message);
        self.deps.presenter.show_screen(Screen::Error);
    }

    //=====================================================================================
    // Pre-interview countdown
    //=====================================================================================

    /// Renders the countdown immediately and starts (or restarts) its timer.
    /// With the scheduled time already reached it only marks the countdown
    /// done; entering the interview is the PIN gate's decision.
    fn start_countdown(&mut self, state: &mut SessionState) {
        let diff = schedule::seconds_until(state.interview.scheduled_at, self.deps.clock.now());
        self.deps
            .presenter
            .set_countdown(&schedule::format_countdown(diff));
        if diff <= 0 {
            self.timers.cancel(TimerKind::Countdown);
            state.countdown_done = true;
            return;
        }
        self.timers.start(TimerKind::Countdown, diff as u64);
    }

    async fn on_countdown_tick(&mut self, state: &mut SessionState, remaining: u64) -> Flow {
        // Ticks only pace re-evaluation; the wall clock is authoritative.
        let now = self.deps.clock.now();
        let diff = schedule::seconds_until(state.interview.scheduled_at, now);

        if classify(state.interview.scheduled_at, now) == TimePhase::TooLate {
            self.timers.cancel(TimerKind::Countdown);
            self.deps.presenter.show_screen(Screen::TooLate);
            return Flow::Finished;
        }

        if diff <= 0 {
            self.timers.cancel(TimerKind::Countdown);
            self.deps.presenter.set_countdown("00:00:00");
            state.countdown_done = true;
            return self.try_begin_interview(state).await;
        }

        self.deps
            .presenter
            .set_countdown(&schedule::format_countdown(diff));
        if remaining == 0 {
            // The spawned counter ran out while wall-clock time remains.
            self.timers.start(TimerKind::Countdown, diff as u64);
        }
        Flow::Continue
    }

    /// Entry gate into the timed portion. Without a verified PIN the session
    /// stays parked on the countdown regardless of elapsed time, and a
    /// verification arriving after the grace window has closed is rejected
    /// here rather than letting the candidate start late.
    async fn try_begin_interview(&mut self, state: &mut SessionState) -> Flow {
        if classify(state.interview.scheduled_at, self.deps.clock.now()) == TimePhase::TooLate {
            self.timers.cancel_all();
            self.deps.presenter.show_screen(Screen::TooLate);
            return Flow::Finished;
        }
        if !state.pin_verified || !state.countdown_done {
            return Flow::Continue;
        }
        if first_unanswered(&state.questions).is_none() {
            // Everything was answered before a reload; nothing left to ask.
            return self.finish(state).await;
        }
        self.enter_mic_test(state);
        Flow::Continue
    }

    //=====================================================================================
    // PIN entry
    //=====================================================================================

    async fn on_pin_action(&mut self, state: &mut SessionState, action: PinAction) -> Flow {
        self.deps
            .presenter
            .set_pin_cells(state.pin.cells(), state.pin.focus());
        let PinAction::Complete(pin) = action else {
            return Flow::Continue;
        };

        match self.deps.backend.verify_pin(&state.token, &pin).await {
            Ok(()) => {
                info!("PIN verified.");
                state.pin_verified = true;
                self.deps.presenter.show_screen(Screen::Verified);
                // Logically the same countdown, now shown on the verified
                // screen; with the start already reached this enters the
                // interview at once.
                self.start_countdown(state);
                self.try_begin_interview(state).await
            }
            Err(err) => {
                // The server's rejection message wins; "Invalid PIN" is only
                // the fallback when none was provided.
                let message = match err {
                    PortError::Unauthorized(message) => {
                        message.unwrap_or_else(|| "Invalid PIN".to_string())
                    }
                    PortError::NotFound(message) | PortError::Unexpected(message) => message,
                };
                warn!("PIN verification failed: {message}");
                self.deps.presenter.flash_pin_error(&message);
                state.pin.clear();
                self.deps
                    .presenter
                    .set_pin_cells(state.pin.cells(), state.pin.focus());
                let presenter = self.deps.presenter.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(PIN_ERROR_FLASH_MS)).await;
                    presenter.clear_pin_error();
                });
                Flow::Continue
            }
        }
    }

    //=====================================================================================
    // Microphone calibration
    //=====================================================================================

    fn enter_mic_test(&mut self, state: &mut SessionState) {
        info!("Entering microphone calibration.");
        state.phase = Phase::MicTest;
        state.mic_test_passed = false;
        state.start_enabled = false;
        state.restart = RestartPolicy::Never;

        self.deps.presenter.show_screen(Screen::MicTest);
        self.deps.presenter.set_mic_preview("");
        self.deps
            .presenter
            .set_mic_timer(&schedule::format_timer(MIC_TEST_LIMIT_SECS));

        if self.deps.capabilities.recognition {
            self.deps.presenter.set_mic_status(MicStatus::Idle);
        } else {
            // No capture on this host: show the notice and let the candidate
            // proceed; the ceiling timer still auto-advances as a backstop.
            self.deps.presenter.set_mic_status(MicStatus::Unsupported);
            state.start_enabled = true;
            self.deps.presenter.set_start_enabled(true);
        }

        self.timers.start(TimerKind::MicTest, MIC_TEST_LIMIT_SECS);
    }

    async fn on_start_mic_test(&mut self, state: &mut SessionState) {
        if !self.deps.capabilities.recognition {
            self.deps.presenter.set_mic_status(MicStatus::Unsupported);
            state.start_enabled = true;
            self.deps.presenter.set_start_enabled(true);
            return;
        }

        state.restart = RestartPolicy::DuringMicTest;
        if let Err(e) = self.deps.recognition.start().await {
            warn!("Could not start recognition for the mic test: {e}");
            self.deps.presenter.set_mic_status(MicStatus::StartFailed);
            state.start_enabled = true;
            self.deps.presenter.set_start_enabled(true);
        }
    }

    async fn on_mic_test_tick(&mut self, state: &mut SessionState, remaining: u64) -> Flow {
        self.deps
            .presenter
            .set_mic_timer(&schedule::format_timer(remaining));
        if remaining == 0 {
            // Ceiling elapsed: calibration is forcibly marked passed.
            info!("Mic-test time limit reached; proceeding to the interview.");
            self.leave_mic_test(state).await;
            return self.enter_interview_loop(state).await;
        }
        Flow::Continue
    }

    fn on_mic_test_transcript(&mut self, state: &mut SessionState, transcript: &str) {
        self.deps.presenter.set_mic_preview(transcript);
        // Any detected speech means the mic is working.
        if !transcript.trim().is_empty() && !state.mic_test_passed {
            state.mic_test_passed = true;
            state.start_enabled = true;
            self.deps.presenter.set_mic_status(MicStatus::Working);
            self.deps.presenter.set_start_enabled(true);
        }
    }

    /// Tears down calibration capture. The `Never` policy is installed
    /// before the stop so a trailing `Ended` signal cannot restart
    /// calibration capture; entering the first question swaps in the
    /// interview-mode policy afterwards.
    async fn leave_mic_test(&mut self, state: &mut SessionState) {
        state.restart = RestartPolicy::Never;
        self.timers.cancel(TimerKind::MicTest);
        self.deps.recognition.stop().await;
    }

    //=====================================================================================
    // Question loop
    //=====================================================================================

    async fn enter_interview_loop(&mut self, state: &mut SessionState) -> Flow {
        // Skip questions that already have answers (page refresh resilience).
        let Some(index) = first_unanswered(&state.questions) else {
            return self.finish(state).await;
        };
        state.current_index = index;
        self.deps.presenter.show_screen(Screen::Interview);
        self.show_question(state).await;
        Flow::Continue
    }

    async fn show_question(&mut self, state: &mut SessionState) {
        let (prompt, total_secs) = match state.current_question() {
            Some(q) => (q.prompt.clone(), q.effective_timer_secs()),
            None => return,
        };
        let number = state.current_index + 1;
        let total = state.questions.len();
        state.begin_question(total_secs);
        state.restart = RestartPolicy::DuringQuestion;

        self.deps
            .presenter
            .show_transition(&format!("Question {number}"));
        tokio::time::sleep(Duration::from_millis(TRANSITION_MS)).await;

        self.deps.presenter.set_question(number, total, &prompt);
        self.deps.presenter.set_replay(ReplayControl::Hidden);
        self.deps.presenter.set_early_submit(false);

        // Read the question aloud before capture begins; playback failure or
        // an absent engine must not block the interview.
        if self.deps.capabilities.synthesis {
            if let Err(e) = self.deps.synthesis.speak(&prompt).await {
                warn!("Question playback failed: {e}");
            }
        }
        state.replay_enabled = true;
        self.deps.presenter.set_replay(ReplayControl::Enabled);

        self.deps.presenter.set_transcript("");
        if self.deps.capabilities.recognition {
            if let Err(e) = self.deps.recognition.start().await {
                warn!("Could not start answer capture: {e}");
            }
        } else {
            self.deps.presenter.show_mic_warning();
        }

        self.deps
            .presenter
            .set_timer(&schedule::format_timer(total_secs), false);
        self.timers.start(TimerKind::Question, total_secs);
    }

    async fn on_question_tick(&mut self, state: &mut SessionState, remaining: u64) -> Flow {
        self.deps.presenter.set_timer(
            &schedule::format_timer(remaining),
            remaining <= TIMER_WARNING_SECS,
        );

        let elapsed = state.question_total.saturating_sub(remaining);

        // The replay control outlives playback by a fixed window, then is
        // disabled and shortly after hidden entirely.
        if state.replay_enabled && elapsed >= REPLAY_WINDOW_SECS {
            state.replay_enabled = false;
            self.deps.presenter.set_replay(ReplayControl::Disabled);
        } else if elapsed == REPLAY_WINDOW_SECS + REPLAY_HIDE_GRACE_SECS {
            self.deps.presenter.set_replay(ReplayControl::Hidden);
        }

        if !state.early_submit_shown && early_submit_open(state.question_total, elapsed) {
            state.early_submit_shown = true;
            self.deps.presenter.set_early_submit(true);
        }

        if remaining == 0 {
            self.timers.cancel(TimerKind::Question);
            return self.submit_current(state).await;
        }
        Flow::Continue
    }

    fn on_replay(&mut self, state: &SessionState) {
        if !state.replay_enabled || !self.deps.capabilities.synthesis {
            return;
        }
        let Some(prompt) = state.current_question().map(|q| q.prompt.clone()) else {
            return;
        };
        // Replaying speaks the question again without touching the
        // transcript or the timers.
        let synthesis = self.deps.synthesis.clone();
        tokio::spawn(async move {
            if let Err(e) = synthesis.speak(&prompt).await {
                warn!("Question replay failed: {e}");
            }
        });
    }

    /// The single submission path. Timer expiry and explicit early submit
    /// both land here; the `submitted` flag makes the second caller a no-op.
    async fn submit_current(&mut self, state: &mut SessionState) -> Flow {
        if state.submitted || state.phase != Phase::Question {
            return Flow::Continue;
        }
        state.submitted = true;

        self.timers.cancel(TimerKind::Question);
        state.restart = RestartPolicy::Never;
        self.deps.recognition.stop().await;

        let answer = if state.transcript.trim().is_empty() {
            NO_ANSWER_FALLBACK.to_string()
        } else {
            state.transcript.clone()
        };

        let question_id = match state.current_question() {
            Some(q) => q.id,
            None => return Flow::Continue,
        };
        // Fire-and-continue: a transient backend failure must not strand the
        // candidate mid-interview.
        if let Err(e) = self
            .deps
            .backend
            .submit_answer(question_id, &state.token, &answer)
            .await
        {
            error!("Failed to submit answer for question {question_id}: {e}");
        }

        state.current_index += 1;
        if state.current_index < state.questions.len() {
            self.enter_break(state);
            Flow::Continue
        } else {
            self.finish(state).await
        }
    }

    //=====================================================================================
    // Inter-question break
    //=====================================================================================

    fn enter_break(&mut self, state: &mut SessionState) {
        state.phase = Phase::Break;
        self.deps.presenter.show_screen(Screen::Break);
        self.deps
            .presenter
            .set_break(BREAK_SECS, 0, &self.break_label(state));
        self.timers.start(TimerKind::Break, BREAK_SECS);
    }

    fn break_label(&self, state: &SessionState) -> String {
        format!(
            "Next: Question {} / {}",
            state.current_index + 1,
            state.questions.len()
        )
    }

    async fn on_break_tick(&mut self, state: &mut SessionState, remaining: u64) -> Flow {
        let percent = (((BREAK_SECS - remaining) * 100) / BREAK_SECS) as u8;
        self.deps
            .presenter
            .set_break(remaining, percent, &self.break_label(state));
        if remaining == 0 {
            self.timers.cancel(TimerKind::Break);
            return self.proceed_from_break(state).await;
        }
        Flow::Continue
    }

    async fn proceed_from_break(&mut self, state: &mut SessionState) -> Flow {
        self.deps.presenter.show_screen(Screen::Interview);
        self.show_question(state).await;
        Flow::Continue
    }

    //=====================================================================================
    // Completion
    //=====================================================================================

    async fn finish(&mut self, state: &mut SessionState) -> Flow {
        state.restart = RestartPolicy::Never;
        self.deps.recognition.stop().await;
        self.timers.cancel_all();

        if let Err(e) = self.deps.backend.complete_interview(&state.token).await {
            error!("Failed to mark interview as complete: {e}");
        }
        self.deps.presenter.show_screen(Screen::Completed);
        Flow::Finished
    }

    //=====================================================================================
    // Event dispatch
    //=====================================================================================

    async fn handle_event(&mut self, state: &mut SessionState, event: SessionEvent) -> Flow {
        match event {
            SessionEvent::Timer { kind, epoch, remaining } => {
                if !self.timers.accepts(kind, epoch) {
                    return Flow::Continue;
                }
                match kind {
                    TimerKind::Countdown => self.on_countdown_tick(state, remaining).await,
                    TimerKind::Question => self.on_question_tick(state, remaining).await,
                    TimerKind::Break => self.on_break_tick(state, remaining).await,
                    TimerKind::MicTest => self.on_mic_test_tick(state, remaining).await,
                }
            }

            SessionEvent::Recognition(signal) => self.on_recognition(state, signal).await,

            SessionEvent::Candidate(action) => self.on_candidate(state, action).await,
        }
    }

    async fn on_recognition(&mut self, state: &mut SessionState, signal: RecognitionSignal) -> Flow {
        match signal {
            RecognitionSignal::Transcript(text) => match state.phase {
                Phase::MicTest => self.on_mic_test_transcript(state, &text),
                Phase::Question => {
                    state.transcript = text;
                    self.deps.presenter.set_transcript(&state.transcript);
                }
                _ => {}
            },
            RecognitionSignal::Ended => {
                // Auto-restart keeps continuous capture alive while the
                // guarding timer still runs; deliberate stops install the
                // `Never` policy first so no restart can race them.
                let restart = match state.restart {
                    RestartPolicy::DuringQuestion => self.timers.is_active(TimerKind::Question),
                    RestartPolicy::DuringMicTest => self.timers.is_active(TimerKind::MicTest),
                    RestartPolicy::Never => false,
                };
                if restart {
                    if let Err(e) = self.deps.recognition.start().await {
                        warn!("Recognition auto-restart failed: {e}");
                    }
                }
            }
            RecognitionSignal::Failed(message) => {
                // Non-fatal: capture simply stops contributing updates.
                warn!("Speech recognition error: {message}");
            }
        }
        Flow::Continue
    }

    async fn on_candidate(&mut self, state: &mut SessionState, action: CandidateEvent) -> Flow {
        match action {
            CandidateEvent::PinDigit(ch) if state.phase == Phase::Lobby && !state.pin_verified => {
                let pin_action = state.pin.press_digit(ch);
                self.on_pin_action(state, pin_action).await
            }
            CandidateEvent::PinBackspace if state.phase == Phase::Lobby && !state.pin_verified => {
                state.pin.backspace();
                self.deps
                    .presenter
                    .set_pin_cells(state.pin.cells(), state.pin.focus());
                Flow::Continue
            }
            CandidateEvent::PinPaste(text) if state.phase == Phase::Lobby && !state.pin_verified => {
                let pin_action = state.pin.paste(&text);
                self.on_pin_action(state, pin_action).await
            }
            CandidateEvent::StartMicTest if state.phase == Phase::MicTest => {
                self.on_start_mic_test(state).await;
                Flow::Continue
            }
            CandidateEvent::StartInterview
                if state.phase == Phase::MicTest && state.start_enabled =>
            {
                self.leave_mic_test(state).await;
                self.enter_interview_loop(state).await
            }
            CandidateEvent::SubmitAnswer
                if state.phase == Phase::Question && state.early_submit_shown =>
            {
                self.submit_current(state).await
            }
            CandidateEvent::SkipBreak if state.phase == Phase::Break => {
                self.timers.cancel(TimerKind::Break);
                self.proceed_from_break(state).await
            }
            CandidateEvent::Replay if state.phase == Phase::Question => {
                self.on_replay(state);
                Flow::Continue
            }
            other => {
                // Inputs outside their phase are ignored, like clicks on
                // hidden controls.
                tracing::debug!("Ignoring out-of-phase candidate action: {other:?}");
                Flow::Continue
            }
        }
    }
}
