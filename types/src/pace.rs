//! Pace multiplier and session target duration.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PaceError {
    #[error("pace multiplier must be finite, got {0}")]
    NotFinite(f64),
    #[error("pace multiplier {0} is outside {min}..={max}", min = Pace::MIN, max = Pace::MAX)]
    OutOfRange(f64),
}

/// Scalar applied to every phase's base duration.
///
/// Invariant: `MIN <= value <= MAX` and the value is finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Pace(f64);

impl Pace {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 1.5;
    pub const STEP: f64 = 0.25;
    pub const NORMAL: Pace = Pace(1.0);

    /// The values reachable from the UI, fastest first.
    pub const STEPS: [Pace; 5] = [Pace(0.5), Pace(0.75), Pace(1.0), Pace(1.25), Pace(1.5)];

    pub fn new(value: f64) -> Result<Self, PaceError> {
        if !value.is_finite() {
            return Err(PaceError::NotFinite(value));
        }
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(PaceError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Clamp an arbitrary value into range. Non-finite input becomes [`Pace::NORMAL`].
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(Self::MIN, Self::MAX))
        } else {
            Self::NORMAL
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Effective duration of a phase: `round(base × pace)`.
    #[must_use]
    pub fn scale(self, base_secs: u32) -> u32 {
        (f64::from(base_secs) * self.0).round() as u32
    }

    /// One step slower (longer phases), saturating at [`Pace::MAX`].
    #[must_use]
    pub fn slower(self) -> Self {
        Self::clamped(self.0 + Self::STEP)
    }

    /// One step faster (shorter phases), saturating at [`Pace::MIN`].
    #[must_use]
    pub fn faster(self) -> Self {
        Self::clamped(self.0 - Self::STEP)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        if self.0 < 1.0 {
            "Faster"
        } else if self.0 > 1.0 {
            "Slower"
        } else {
            "Normal"
        }
    }
}

impl Default for Pace {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for Pace {
    type Error = PaceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Pace> for f64 {
    fn from(value: Pace) -> Self {
        value.0
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Optional session length in whole minutes. Existence means a limit is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetMinutes(NonZeroU32);

impl TargetMinutes {
    pub const PRESETS: [u32; 3] = [2, 5, 10];

    #[must_use]
    pub fn new(minutes: u32) -> Option<Self> {
        NonZeroU32::new(minutes).map(Self)
    }

    /// Parse free-form user input. Non-digit characters are discarded; empty,
    /// zero, or overflowing input means "no limit".
    #[must_use]
    pub fn parse_lenient(input: &str) -> Option<Self> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        digits.parse::<u32>().ok().and_then(Self::new)
    }

    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0.get()
    }

    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0.get() as u64 * 60
    }
}

impl fmt::Display for TargetMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}
