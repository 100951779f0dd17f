//! Session controller: the only owner of the session clock and the only
//! place side effects (cues, wake lock, statistics) are triggered.
//!
//! ```text
//! Idle ──start──▶ CountingDown ──0──▶ Running ◀──resume── Paused
//!   ▲                                  │  └────pause──────▶  │
//!   ├──────────────stop────────────────┴─────────────────────┘
//!   └──reset── Complete ◀──final cycle after target reached──┘
//! ```

use std::time::Instant;

use boxbreath_types::{
    EffectiveDurations, Pace, Pattern, PatternId, PhaseKind, TargetMinutes, ui::Visibility,
};
use chrono::NaiveDate;

use crate::clock::{ClockSnapshot, SessionClock, TickOutcome};
use crate::cues::{Cues, haptic_patterns};
use crate::sampler::{self, FrameSample};
use crate::scene::SceneInput;
use crate::stats::{Statistics, StatisticsLedger};
use crate::timer::Timers;

/// Number of countdown cues before a session starts.
pub const COUNTDOWN_FROM: u32 = 3;

/// User-adjustable session parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub pattern: PatternId,
    pub pace: Pace,
    pub target: Option<TargetMinutes>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            pattern: PatternId::Box,
            pace: Pace::NORMAL,
            target: None,
        }
    }
}

impl SessionSettings {
    #[must_use]
    pub fn pattern(&self) -> &'static Pattern {
        self.pattern.pattern()
    }

    #[must_use]
    pub fn durations(&self) -> EffectiveDurations {
        self.pattern().effective(self.pace)
    }
}

/// Totals of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSummary {
    pub elapsed_secs: u64,
    pub cycles: u32,
    pub final_phase: PhaseKind,
}

#[derive(Debug, Clone)]
pub enum SessionState {
    Idle,
    CountingDown { remaining: u32 },
    Running(SessionClock),
    Paused(SessionClock),
    Complete(CompletionSummary),
}

impl SessionState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::CountingDown { .. } => "counting down",
            SessionState::Running(_) => "running",
            SessionState::Paused(_) => "paused",
            SessionState::Complete(_) => "complete",
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, SessionState::Running(_))
    }

    /// Clock of a running or paused session.
    #[must_use]
    pub fn clock(&self) -> Option<&SessionClock> {
        match self {
            SessionState::Running(clock) | SessionState::Paused(clock) => Some(clock),
            _ => None,
        }
    }
}

/// What a call to [`SessionController::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Countdown(u32),
    Started,
    Ticked,
    PhaseChanged(PhaseKind),
    Completed(CompletionSummary),
}

type Today = Box<dyn Fn() -> NaiveDate + Send>;

pub struct SessionController {
    state: SessionState,
    settings: SessionSettings,
    timers: Timers,
    cues: Cues,
    statistics: Statistics,
    visibility: Visibility,
    today: Today,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("settings", &self.settings)
            .field("timers", &self.timers)
            .field("cues", &self.cues)
            .field("statistics", &self.statistics)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    pub fn new(settings: SessionSettings, cues: Cues, statistics: Statistics) -> Self {
        Self {
            state: SessionState::Idle,
            settings,
            timers: Timers::default(),
            cues,
            statistics,
            visibility: Visibility::Visible,
            today: Box::new(|| chrono::Local::now().date_naive()),
        }
    }

    /// Replace the calendar source used for streak accounting.
    #[must_use]
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + 'static) -> Self {
        self.today = Box::new(today);
        self
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn statistics(&self) -> &StatisticsLedger {
        self.statistics.ledger()
    }

    #[must_use]
    pub fn cues(&self) -> &Cues {
        &self.cues
    }

    #[must_use]
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<ClockSnapshot> {
        self.state.clock().map(SessionClock::snapshot)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// `Idle → CountingDown`. Returns whether the transition happened.
    pub fn start(&mut self, now: Instant) -> bool {
        if !self.state.is_idle() {
            return false;
        }
        self.state = SessionState::CountingDown {
            remaining: COUNTDOWN_FROM,
        };
        self.timers.start_logical(now);
        self.countdown_cue();
        tracing::info!(
            pattern = self.settings.pattern.as_str(),
            pace = %self.settings.pace,
            target_minutes = ?self.settings.target.map(TargetMinutes::minutes),
            "countdown started"
        );
        true
    }

    /// `Running → Paused`. Timers are cancelled before the wake lock goes.
    pub fn pause(&mut self) -> bool {
        let SessionState::Running(clock) = &self.state else {
            return false;
        };
        let clock = clock.clone();
        self.timers.cancel_all();
        self.cues.release_wake_lock();
        self.state = SessionState::Paused(clock);
        tracing::info!("session paused");
        true
    }

    /// `Paused → Running` without touching the counters.
    pub fn resume(&mut self, now: Instant) -> bool {
        let SessionState::Paused(clock) = &self.state else {
            return false;
        };
        let mut clock = clock.clone();
        clock.resume(now);
        self.state = SessionState::Running(clock);
        self.cues.acquire_wake_lock();
        self.timers.start_logical(now);
        self.timers.start_animation();
        tracing::info!("session resumed");
        true
    }

    /// Start, pause, or resume depending on the current state. From
    /// `Complete` this begins a fresh session.
    pub fn toggle_play(&mut self, now: Instant) -> bool {
        match self.state {
            SessionState::Idle => self.start(now),
            SessionState::Running(_) => self.pause(),
            SessionState::Paused(_) => self.resume(now),
            SessionState::Complete(_) => {
                self.reset();
                self.start(now)
            }
            SessionState::CountingDown { .. } => false,
        }
    }

    /// `CountingDown | Running | Paused → Idle`. The target is kept.
    pub fn stop(&mut self) -> bool {
        if !matches!(
            self.state,
            SessionState::CountingDown { .. } | SessionState::Running(_) | SessionState::Paused(_)
        ) {
            return false;
        }
        self.timers.cancel_all();
        self.cues.release_wake_lock();
        self.state = SessionState::Idle;
        tracing::info!("session stopped");
        true
    }

    /// Back to `Idle` from anywhere, clearing the completion and the target.
    pub fn reset(&mut self) {
        self.timers.cancel_all();
        self.cues.release_wake_lock();
        self.state = SessionState::Idle;
        self.settings.target = None;
        tracing::debug!("session reset");
    }

    /// Set a target and start immediately. Allowed from `Idle` or `Complete`.
    pub fn start_with_preset(&mut self, minutes: u32, now: Instant) -> bool {
        match self.state {
            SessionState::Idle => {}
            SessionState::Complete(_) => self.reset(),
            _ => return false,
        }
        self.settings.target = TargetMinutes::new(minutes);
        self.start(now)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn set_pattern(&mut self, pattern: PatternId) -> bool {
        if !self.state.is_idle() {
            return false;
        }
        self.settings.pattern = pattern;
        true
    }

    pub fn set_pace(&mut self, pace: Pace) -> bool {
        if !self.state.is_idle() {
            return false;
        }
        self.settings.pace = pace;
        true
    }

    pub fn set_target(&mut self, target: Option<TargetMinutes>) -> bool {
        if !self.state.is_idle() {
            return false;
        }
        self.settings.target = target;
        true
    }

    /// Free-form target entry; unparseable input means no limit.
    pub fn set_target_input(&mut self, input: &str) -> bool {
        self.set_target(TargetMinutes::parse_lenient(input))
    }

    /// Flip sound. Turning it on plays the first phase tone as a preview.
    pub fn toggle_sound(&mut self) -> bool {
        let enabled = !self.cues.sound_enabled();
        self.cues.set_sound(enabled);
        if enabled {
            self.cues.emit_tone(PhaseKind::Inhale);
        }
        enabled
    }

    /// Flip haptics. Turning them on fires a short pulse as a preview.
    pub fn toggle_haptics(&mut self) -> bool {
        let enabled = !self.cues.haptics_enabled();
        self.cues.set_haptics(enabled);
        if enabled {
            self.cues.emit_haptic(haptic_patterns::TOGGLE_ON);
        }
        enabled
    }

    /// Re-acquire the wake lock when the front-end becomes visible again
    /// during a running session. The clock is left alone.
    pub fn visibility_changed(&mut self, visibility: Visibility) {
        self.visibility = visibility;
        if visibility == Visibility::Visible && self.state.is_running() {
            self.cues.acquire_wake_lock();
        }
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Fire the logical timer if it is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<SessionEvent> {
        if !self.timers.poll_logical(now) {
            return None;
        }
        match &mut self.state {
            SessionState::CountingDown { remaining } => {
                *remaining = remaining.saturating_sub(1);
                let remaining = *remaining;
                if remaining > 0 {
                    self.countdown_cue();
                    Some(SessionEvent::Countdown(remaining))
                } else {
                    self.begin_running(now);
                    Some(SessionEvent::Started)
                }
            }
            SessionState::Running(clock) => {
                let outcome = clock.tick(self.settings.durations(), self.settings.target, now);
                match outcome {
                    TickOutcome::Counted | TickOutcome::Stalled => Some(SessionEvent::Ticked),
                    TickOutcome::PhaseChanged(phase) => {
                        self.cues.emit_tone(phase);
                        self.cues.emit_haptic(haptic_patterns::PHASE_CHANGE);
                        Some(SessionEvent::PhaseChanged(phase))
                    }
                    TickOutcome::Completed => {
                        let clock = clock.clone();
                        Some(SessionEvent::Completed(self.complete(&clock)))
                    }
                }
            }
            // Timers are cancelled on every transition out of the two
            // ticking states, so a due timer here is stale.
            SessionState::Idle | SessionState::Paused(_) | SessionState::Complete(_) => {
                self.timers.cancel_all();
                None
            }
        }
    }

    /// Interpolated animation inputs for a running session.
    #[must_use]
    pub fn sample(&self, now: Instant) -> Option<FrameSample> {
        match &self.state {
            SessionState::Running(clock) => Some(sampler::sample(
                &clock.snapshot(),
                self.settings.durations(),
                now,
            )),
            _ => None,
        }
    }

    /// Renderer inputs for the current state, `None` when nothing is drawn.
    #[must_use]
    pub fn scene_input(&self, now: Instant, timestamp_ms: f64, reduced_motion: bool) -> Option<SceneInput> {
        let (phase, frame, show_trail, complete) = match &self.state {
            SessionState::Idle | SessionState::Paused(_) => return None,
            SessionState::CountingDown { .. } => {
                (PhaseKind::Inhale, FrameSample::fixed(0.0), false, false)
            }
            SessionState::Running(clock) => {
                let frame = sampler::sample(&clock.snapshot(), self.settings.durations(), now);
                (clock.phase(), frame, true, false)
            }
            SessionState::Complete(summary) => {
                (summary.final_phase, FrameSample::fixed(1.0), true, true)
            }
        };
        Some(SceneInput {
            eased: frame.eased,
            phase,
            show_trail,
            complete,
            pulse_boost: if reduced_motion { 0.0 } else { frame.pulse_boost },
            timestamp_ms,
            reduced_motion,
        })
    }

    fn countdown_cue(&mut self) {
        self.cues.emit_tone(PhaseKind::Inhale);
        self.cues.emit_haptic(haptic_patterns::COUNTDOWN);
    }

    fn begin_running(&mut self, now: Instant) {
        let clock = SessionClock::start(self.settings.durations(), now);
        self.cues.emit_tone(clock.phase());
        self.cues.emit_haptic(haptic_patterns::PHASE_CHANGE);
        self.state = SessionState::Running(clock);
        self.cues.acquire_wake_lock();
        self.timers.start_logical(now);
        self.timers.start_animation();
        tracing::info!("session running");
    }

    fn complete(&mut self, clock: &SessionClock) -> CompletionSummary {
        let summary = CompletionSummary {
            elapsed_secs: clock.elapsed_secs(),
            cycles: clock.cycles(),
            final_phase: clock.phase(),
        };
        self.timers.cancel_all();
        self.cues.release_wake_lock();
        self.statistics
            .commit(summary.elapsed_secs, summary.cycles, (self.today)());
        self.cues.emit_haptic(haptic_patterns::COMPLETE);
        self.cues.emit_tone(PhaseKind::Wait);
        self.state = SessionState::Complete(summary);
        tracing::info!(
            elapsed_secs = summary.elapsed_secs,
            cycles = summary.cycles,
            "session complete"
        );
        summary
    }
}
