//! Session clock: phase index, per-phase countdown, elapsed total, cycles.
//!
//! Advances exactly once per logical tick. Only the session controller holds
//! a mutable clock; everything else reads a [`ClockSnapshot`].

use std::time::Instant;

use boxbreath_types::{EffectiveDurations, PHASE_COUNT, PhaseKind, TargetMinutes};

/// Result of one logical tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The current phase's countdown decreased by one.
    Counted,
    /// The clock advanced and landed on this (non-zero duration) phase.
    PhaseChanged(PhaseKind),
    /// A cycle boundary was crossed after the target was reached.
    Completed,
    /// Every phase has zero duration and no target is set; nothing changed.
    Stalled,
}

/// Read-only view of the clock used by the sampler and the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSnapshot {
    pub phase: PhaseKind,
    /// Whole seconds left in the current phase.
    pub countdown: u32,
    /// Whole seconds since the session started running.
    pub elapsed_secs: u64,
    pub cycles: u32,
    pub target_reached: bool,
    /// When the most recent phase change (or start/resume) happened.
    pub pulse_at: Option<Instant>,
    /// When the most recent logical tick (or start/resume) happened.
    pub last_tick_at: Instant,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    phase: PhaseKind,
    countdown: u32,
    elapsed_secs: u64,
    cycles: u32,
    target_reached: bool,
    pulse_at: Option<Instant>,
    last_tick_at: Instant,
}

impl SessionClock {
    /// A fresh clock positioned at the first phase with a non-zero duration.
    pub(crate) fn start(durations: EffectiveDurations, now: Instant) -> Self {
        let phase = durations
            .first_nonzero_from(PhaseKind::Inhale)
            .unwrap_or(PhaseKind::Inhale);
        Self {
            phase,
            countdown: durations.get(phase),
            elapsed_secs: 0,
            cycles: 0,
            target_reached: false,
            pulse_at: Some(now),
            last_tick_at: now,
        }
    }

    /// Re-anchor interpolation after a pause without touching counters.
    pub(crate) fn resume(&mut self, now: Instant) {
        self.pulse_at = Some(now);
        self.last_tick_at = now;
    }

    pub(crate) fn tick(
        &mut self,
        durations: EffectiveDurations,
        target: Option<TargetMinutes>,
        now: Instant,
    ) -> TickOutcome {
        if durations.all_zero() {
            return if target.is_some() {
                TickOutcome::Completed
            } else {
                TickOutcome::Stalled
            };
        }

        self.elapsed_secs += 1;
        self.last_tick_at = now;

        if let Some(target) = target
            && !self.target_reached
            && self.elapsed_secs >= target.as_secs()
        {
            self.target_reached = true;
        }

        if self.countdown > 1 {
            self.countdown -= 1;
            return TickOutcome::Counted;
        }

        for _ in 0..PHASE_COUNT {
            self.phase = self.phase.next();
            self.countdown = durations.get(self.phase);
            self.pulse_at = Some(now);

            if self.phase == PhaseKind::Inhale {
                self.cycles += 1;
                if self.target_reached {
                    return TickOutcome::Completed;
                }
            }
            if self.countdown > 0 {
                return TickOutcome::PhaseChanged(self.phase);
            }
        }

        // Unreachable with at least one non-zero phase: four advances always
        // revisit every phase.
        TickOutcome::Stalled
    }

    #[must_use]
    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            phase: self.phase,
            countdown: self.countdown,
            elapsed_secs: self.elapsed_secs,
            cycles: self.cycles,
            target_reached: self.target_reached,
            pulse_at: self.pulse_at,
            last_tick_at: self.last_tick_at,
        }
    }

    #[must_use]
    pub fn phase(&self) -> PhaseKind {
        self.phase
    }

    #[must_use]
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    #[must_use]
    pub fn target_reached(&self) -> bool {
        self.target_reached
    }
}
