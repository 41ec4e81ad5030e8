//! services/session/src/runtime/timer.rs
//!
//! The repeating-tick engine behind every countdown in the session: the
//! pre-interview countdown, the per-question timer, the inter-question break
//! and the mic-test ceiling. Each use is a spawned task decrementing a
//! remaining-seconds counter once per second and reporting ticks into the
//! session event channel until it reaches zero or is cancelled.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::runtime::event::{SessionEvent, TimerKind};

/// Handle to one live repeating countdown. Cancelling guarantees no further
/// ticks are produced (ticks already queued are filtered by epoch).
struct TimerHandle {
    epoch: u64,
    token: CancellationToken,
}

impl TimerHandle {
    fn cancel(&self) {
        self.token.cancel();
    }
}

fn spawn_timer(
    kind: TimerKind,
    epoch: u64,
    secs: u64,
    events: UnboundedSender<SessionEvent>,
) -> TimerHandle {
    let token = CancellationToken::new();
    let task_token = token.clone();
    tokio::spawn(async move {
        let mut remaining = secs;
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first interval tick completes immediately; the caller already
        // rendered the initial value.
        interval.tick().await;
        loop {
            tokio::select! {
                _ = task_token.cancelled() => return,
                _ = interval.tick() => {
                    remaining = remaining.saturating_sub(1);
                    let event = SessionEvent::Timer { kind, epoch, remaining };
                    if events.send(event).is_err() {
                        return;
                    }
                    if remaining == 0 {
                        return;
                    }
                }
            }
        }
    });
    TimerHandle { epoch, token }
}

/// Owns at most one live timer per kind.
///
/// Starting a timer always cancels any predecessor of the same kind first,
/// which is what guarantees the no-duplicate-ticks invariant.
pub struct TimerSlots {
    slots: [Option<TimerHandle>; TimerKind::COUNT],
    next_epoch: u64,
    events: UnboundedSender<SessionEvent>,
}

impl TimerSlots {
    pub fn new(events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            slots: [None, None, None, None],
            next_epoch: 0,
            events,
        }
    }

    /// Starts a countdown of `secs` seconds, replacing any live timer of the
    /// same kind.
    pub fn start(&mut self, kind: TimerKind, secs: u64) {
        self.cancel(kind);
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.slots[kind.index()] = Some(spawn_timer(kind, epoch, secs, self.events.clone()));
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(handle) = self.slots[kind.index()].take() {
            handle.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        for kind in [
            TimerKind::Countdown,
            TimerKind::Question,
            TimerKind::Break,
            TimerKind::MicTest,
        ] {
            self.cancel(kind);
        }
    }

    /// Whether a timer of this kind is logically alive.
    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Whether a received tick belongs to the currently live timer of its
    /// kind. Ticks from a cancelled predecessor are stale and must be dropped.
    pub fn accepts(&self, kind: TimerKind, epoch: u64) -> bool {
        self.slots[kind.index()]
            .as_ref()
            .is_some_and(|handle| handle.epoch == epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    /// Lets a freshly spawned timer task run up to its first await before the
    /// clock is advanced; without this the task would create its interval
    /// after the advance and never see the elapsed time.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_down_to_zero_and_stops() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slots = TimerSlots::new(tx);
        slots.start(TimerKind::Break, 3);
        settle().await;

        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;

        let remaining: Vec<u64> = drain(&mut rx)
            .into_iter()
            .map(|e| match e {
                SessionEvent::Timer { remaining, .. } => remaining,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_ticking() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slots = TimerSlots::new(tx);
        slots.start(TimerKind::Question, 10);
        settle().await;

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        slots.cancel(TimerKind::Question);
        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;

        assert_eq!(drain(&mut rx).len(), 2);
        assert!(!slots.is_active(TimerKind::Question));
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_a_kind_supersedes_the_predecessor() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slots = TimerSlots::new(tx);
        slots.start(TimerKind::Countdown, 100);
        settle().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        slots.start(TimerKind::Countdown, 50);
        settle().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        // The first timer's tick is stale once its successor is live.
        match &events[0] {
            SessionEvent::Timer { kind, epoch, .. } => {
                assert!(!slots.accepts(*kind, *epoch));
            }
            other => panic!("unexpected event {other:?}"),
        }
        match &events[1] {
            SessionEvent::Timer { kind, epoch, remaining } => {
                assert!(slots.accepts(*kind, *epoch));
                assert_eq!(*remaining, 49);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
