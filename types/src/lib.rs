//! Core domain types for boxbreath.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod color;
mod pace;
mod pattern;
pub mod ui;

pub use color::{OUTLINE_COLOR, PHASE_COLORS, Rgb, Rgba, phase_color};
pub use pace::{Pace, PaceError, TargetMinutes};
pub use pattern::{
    BOX, CALMING, ENERGIZING, EffectiveDurations, PHASE_COUNT, Pattern, PatternId, Phase,
    PhaseKind, RELAXING, UnknownPatternError, catalog,
};

/// Tone frequency (Hz) for each phase, in phase order.
pub const PHASE_FREQUENCIES: [u32; PHASE_COUNT] = [396, 528, 639, 741];

/// Format whole seconds as `MM:SS` (minutes are not wrapped at 60).
#[must_use]
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
