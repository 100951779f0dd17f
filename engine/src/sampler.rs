//! Animation sampler: interpolates a continuous progress fraction between
//! logical ticks. Reads clock snapshots, never mutates them.

use std::f64::consts::PI;
use std::time::Instant;

use boxbreath_types::EffectiveDurations;

use crate::clock::ClockSnapshot;

/// Length of the post-phase-change pulse, in seconds.
pub const PULSE_SECS: f64 = 0.4;

/// One frame's worth of interpolated animation inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    /// Linear progress through the current phase, clamped to `[0, 1]`.
    pub progress: f64,
    /// Cosine-eased progress in `[0, 1]`.
    pub eased: f64,
    /// Additive size boost decaying over [`PULSE_SECS`] after a phase change.
    pub pulse_boost: f64,
}

impl FrameSample {
    /// A frame pinned at a fixed progress with no pulse (static scenes).
    #[must_use]
    pub fn fixed(progress: f64) -> Self {
        let progress = clamp01(progress);
        Self {
            progress,
            eased: ease(progress),
            pulse_boost: 0.0,
        }
    }
}

/// Sample the clock at `now`.
#[must_use]
pub fn sample(clock: &ClockSnapshot, durations: EffectiveDurations, now: Instant) -> FrameSample {
    let since_tick = now.saturating_duration_since(clock.last_tick_at).as_secs_f64();
    let progress = phase_progress(durations.get(clock.phase), clock.countdown, since_tick);
    let pulse_boost = clock
        .pulse_at
        .map(|at| pulse(now.saturating_duration_since(at).as_secs_f64()))
        .unwrap_or(0.0);
    FrameSample {
        progress,
        eased: ease(progress),
        pulse_boost,
    }
}

/// `clamp01((duration - (remaining - since_tick)) / duration)`, or 0 for empty phases.
#[must_use]
pub fn phase_progress(duration_secs: u32, remaining_secs: u32, since_tick_secs: f64) -> f64 {
    if duration_secs == 0 {
        return 0.0;
    }
    let duration = f64::from(duration_secs);
    let effective_remaining = f64::from(remaining_secs) - since_tick_secs;
    clamp01((duration - effective_remaining) / duration)
}

/// `0.5 - cos(π·p)/2`.
#[must_use]
pub fn ease(progress: f64) -> f64 {
    0.5 - (PI * clamp01(progress)).cos() / 2.0
}

/// `sin(π·t/0.4)` for `t` in `[0, 0.4)`, else 0.
#[must_use]
pub fn pulse(since_secs: f64) -> f64 {
    if (0.0..PULSE_SECS).contains(&since_secs) {
        (PI * since_secs / PULSE_SECS).sin()
    } else {
        0.0
    }
}

fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
