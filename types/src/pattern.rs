//! Breathing patterns and the static pattern catalog.
//!
//! A pattern is always exactly four phases in the fixed order
//! Inhale → Hold → Exhale → Wait. The array type enforces the count; the
//! constructor enforces the order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Pace;

/// Number of phases in every breathing cycle.
pub const PHASE_COUNT: usize = 4;

/// One of the four semantic phases of a breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Inhale,
    Hold,
    Exhale,
    Wait,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; PHASE_COUNT] = [
        PhaseKind::Inhale,
        PhaseKind::Hold,
        PhaseKind::Exhale,
        PhaseKind::Wait,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            PhaseKind::Inhale => 0,
            PhaseKind::Hold => 1,
            PhaseKind::Exhale => 2,
            PhaseKind::Wait => 3,
        }
    }

    /// Phase at `index`, wrapping modulo [`PHASE_COUNT`].
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % PHASE_COUNT]
    }

    /// The phase that follows this one in the cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PhaseKind::Inhale => "Inhale",
            PhaseKind::Hold => "Hold",
            PhaseKind::Exhale => "Exhale",
            PhaseKind::Wait => "Wait",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A phase with its base duration in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    kind: PhaseKind,
    base_secs: u32,
}

impl Phase {
    #[must_use]
    pub const fn kind(&self) -> PhaseKind {
        self.kind
    }

    #[must_use]
    pub const fn base_secs(&self) -> u32 {
        self.base_secs
    }
}

/// Stable identifier for a catalog pattern, used in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternId {
    #[default]
    Box,
    Relaxing,
    Energizing,
    Calming,
}

impl PatternId {
    pub const ALL: [PatternId; 4] = [
        PatternId::Box,
        PatternId::Relaxing,
        PatternId::Energizing,
        PatternId::Calming,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PatternId::Box => "box",
            PatternId::Relaxing => "relaxing",
            PatternId::Energizing => "energizing",
            PatternId::Calming => "calming",
        }
    }

    /// Next pattern in catalog order, wrapping around.
    #[must_use]
    pub fn cycle_next(self) -> Self {
        let pos = Self::ALL.iter().position(|id| *id == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn pattern(self) -> &'static Pattern {
        match self {
            PatternId::Box => &BOX,
            PatternId::Relaxing => &RELAXING,
            PatternId::Energizing => &ENERGIZING,
            PatternId::Calming => &CALMING,
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown breathing pattern: {0:?}")]
pub struct UnknownPatternError(pub String);

impl FromStr for PatternId {
    type Err = UnknownPatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == needle)
            .ok_or(UnknownPatternError(s.to_string()))
    }
}

/// An immutable breathing pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    id: PatternId,
    name: &'static str,
    description: &'static str,
    phases: [Phase; PHASE_COUNT],
}

impl Pattern {
    /// Build a pattern from base durations in Inhale, Hold, Exhale, Wait order.
    #[must_use]
    pub const fn new(
        id: PatternId,
        name: &'static str,
        description: &'static str,
        base_secs: [u32; PHASE_COUNT],
    ) -> Self {
        Self {
            id,
            name,
            description,
            phases: [
                Phase {
                    kind: PhaseKind::Inhale,
                    base_secs: base_secs[0],
                },
                Phase {
                    kind: PhaseKind::Hold,
                    base_secs: base_secs[1],
                },
                Phase {
                    kind: PhaseKind::Exhale,
                    base_secs: base_secs[2],
                },
                Phase {
                    kind: PhaseKind::Wait,
                    base_secs: base_secs[3],
                },
            ],
        }
    }

    #[must_use]
    pub const fn id(&self) -> PatternId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    #[must_use]
    pub const fn phases(&self) -> &[Phase; PHASE_COUNT] {
        &self.phases
    }

    /// Effective durations for this pattern at the given pace.
    #[must_use]
    pub fn effective(&self, pace: Pace) -> EffectiveDurations {
        EffectiveDurations(self.phases.map(|phase| pace.scale(phase.base_secs)))
    }

    /// Human-readable preview of the non-zero phases, e.g. `Inhale: 4s → Hold: 4s`.
    #[must_use]
    pub fn preview(&self, pace: Pace) -> String {
        let durations = self.effective(pace);
        self.phases
            .iter()
            .filter(|phase| durations.get(phase.kind) > 0)
            .map(|phase| format!("{}: {}s", phase.kind, durations.get(phase.kind)))
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

/// Per-phase durations after the pace multiplier has been applied and rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveDurations([u32; PHASE_COUNT]);

impl EffectiveDurations {
    #[must_use]
    pub const fn from_secs(secs: [u32; PHASE_COUNT]) -> Self {
        Self(secs)
    }

    #[must_use]
    pub const fn get(&self, kind: PhaseKind) -> u32 {
        self.0[kind.index()]
    }

    #[must_use]
    pub fn cycle_secs(&self) -> u32 {
        self.0.iter().sum()
    }

    #[must_use]
    pub fn all_zero(&self) -> bool {
        self.0.iter().all(|secs| *secs == 0)
    }

    /// First phase, starting at `from` and moving forward, with a non-zero duration.
    #[must_use]
    pub fn first_nonzero_from(&self, from: PhaseKind) -> Option<PhaseKind> {
        (0..PHASE_COUNT)
            .map(|offset| PhaseKind::from_index(from.index() + offset))
            .find(|kind| self.get(*kind) > 0)
    }

    #[must_use]
    pub const fn as_array(&self) -> [u32; PHASE_COUNT] {
        self.0
    }
}

pub static BOX: Pattern = Pattern::new(
    PatternId::Box,
    "Box Breathing",
    "Equal phases for balance",
    [4, 4, 4, 4],
);

pub static RELAXING: Pattern = Pattern::new(
    PatternId::Relaxing,
    "4-7-8 Relaxing",
    "Calming breath for sleep",
    [4, 7, 8, 0],
);

pub static ENERGIZING: Pattern = Pattern::new(
    PatternId::Energizing,
    "Energizing",
    "Quick energizing breath",
    [4, 2, 4, 0],
);

pub static CALMING: Pattern = Pattern::new(
    PatternId::Calming,
    "Calming",
    "Extended exhale for calm",
    [4, 4, 6, 2],
);

/// All catalog patterns in display order.
#[must_use]
pub fn catalog() -> [&'static Pattern; 4] {
    PatternId::ALL.map(PatternId::pattern)
}
