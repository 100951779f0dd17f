//! Deterministic deadline timers driven by caller-supplied instants.
//!
//! The engine never sleeps. The binary waits on [`Timers::next_deadline`] and
//! then calls back into the controller with the current instant.

use std::time::{Duration, Instant};

/// Period of the logical session clock.
pub const LOGICAL_TICK: Duration = Duration::from_secs(1);

/// A repeating timer.
///
/// A poll fires at most once. If the caller was stalled past one or more
/// whole periods, the missed ticks are dropped and the next deadline is
/// re-based on the poll instant.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Instant,
}

impl IntervalTimer {
    #[must_use]
    pub fn start(now: Instant, period: Duration) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.next_due
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns `true` if the timer was due at `now` and has been re-armed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        let next = self.next_due + self.period;
        self.next_due = if next <= now { now + self.period } else { next };
        true
    }
}

/// Marker for the per-frame animation callback. Present only while Running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationLoop;

/// The two cancellable scheduled tasks owned by the session controller.
#[derive(Debug, Default)]
pub struct Timers {
    logical: Option<IntervalTimer>,
    animation: Option<AnimationLoop>,
}

impl Timers {
    pub(crate) fn start_logical(&mut self, now: Instant) {
        self.logical = Some(IntervalTimer::start(now, LOGICAL_TICK));
    }

    pub(crate) fn start_animation(&mut self) {
        self.animation = Some(AnimationLoop);
    }

    /// Cancel both tasks. Callers release the wake lock only after this.
    pub(crate) fn cancel_all(&mut self) {
        self.logical = None;
        self.animation = None;
    }

    pub(crate) fn poll_logical(&mut self, now: Instant) -> bool {
        self.logical.as_mut().is_some_and(|timer| timer.poll(now))
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.logical.as_ref().map(IntervalTimer::deadline)
    }

    #[must_use]
    pub fn logical_armed(&self) -> bool {
        self.logical.is_some()
    }

    #[must_use]
    pub fn animation(&self) -> Option<AnimationLoop> {
        self.animation
    }
}
