//! UI state types shared by the engine (ownership) and the tui (rendering/input).
//!
//! Pure data types with no IO, no async, no ratatui dependency.

/// Presentation options resolved from config and environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    /// Disable idle oscillation, pulse, and glow effects.
    pub reduced_motion: bool,
}

/// Whether the terminal currently has focus (the "tab visible" analogue).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Keyboard input mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a target duration; committed on Enter.
    TargetEntry { draft: String },
}

impl InputMode {
    #[must_use]
    pub fn is_normal(&self) -> bool {
        matches!(self, InputMode::Normal)
    }
}
