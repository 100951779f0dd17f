//! Color theme and glyphs for the boxbreath TUI.
//!
//! Uses a warm dusk palette by default with an optional high-contrast override.

use ratatui::style::{Color, Modifier, Style};

use boxbreath_engine::{PhaseKind, Rgb, UiOptions, phase_color};

/// Dusk palette constants.
mod colors {
    use super::Color;

    // === Backgrounds ===
    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // slate-900
    pub const BG_PANEL: Color = Color::Rgb(30, 41, 59); // slate-800
    pub const BG_BORDER: Color = Color::Rgb(71, 85, 105); // slate-600

    // === Foregrounds ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(254, 243, 199); // amber-100
    pub const TEXT_SECONDARY: Color = Color::Rgb(253, 230, 138); // amber-200
    pub const TEXT_MUTED: Color = Color::Rgb(148, 163, 184); // slate-400

    // === Accents ===
    pub const PRIMARY: Color = Color::Rgb(251, 191, 36); // amber-400
    pub const SUCCESS: Color = Color::Rgb(34, 197, 94); // green-500
    pub const WARNING: Color = Color::Rgb(249, 115, 22); // orange-500
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub success: Color,
    pub warning: Color,
    /// Backdrop used when blending translucent scene colors.
    pub canvas_base: Rgb,
    high_contrast: bool,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_border: colors::BG_BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            primary: colors::PRIMARY,
            success: colors::SUCCESS,
            warning: colors::WARNING,
            canvas_base: Rgb::new(15, 23, 42),
            high_contrast: false,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,
            primary: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            canvas_base: Rgb::new(0, 0, 0),
            high_contrast: true,
        }
    }

    /// Accent color for a phase.
    #[must_use]
    pub fn phase(&self, kind: PhaseKind) -> Color {
        if self.high_contrast {
            match kind {
                PhaseKind::Inhale => Color::LightRed,
                PhaseKind::Hold => Color::Yellow,
                PhaseKind::Exhale => Color::Cyan,
                PhaseKind::Wait => Color::Green,
            }
        } else {
            rgb(phase_color(kind))
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

#[must_use]
pub fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// ASCII/Unicode glyphs for the tracker and toggles.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub active: &'static str,
    pub done: &'static str,
    pub pending: &'static str,
    pub on: &'static str,
    pub off: &'static str,
    pub separator: &'static str,
    pub arrow: &'static str,
    pub paused: &'static str,
}

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            active: ">",
            done: "x",
            pending: "o",
            on: "[on]",
            off: "[off]",
            separator: " | ",
            arrow: "->",
            paused: "||",
        }
    } else {
        Glyphs {
            active: "●",
            done: "✓",
            pending: "○",
            on: "◉",
            off: "○",
            separator: " · ",
            arrow: "→",
            paused: "⏸",
        }
    }
}

/// Common text styles.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn muted(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_secondary)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_contrast_uses_named_colors() {
        let options = UiOptions {
            high_contrast: true,
            ..UiOptions::default()
        };
        let palette = palette(options);
        assert_eq!(palette.bg_dark, Color::Black);
        assert_eq!(palette.phase(PhaseKind::Exhale), Color::Cyan);
    }

    #[test]
    fn standard_phase_colors_are_rgb() {
        let palette = Palette::standard();
        assert_eq!(
            palette.phase(PhaseKind::Inhale),
            Color::Rgb(0xf9, 0x73, 0x16)
        );
    }

    #[test]
    fn ascii_glyphs_are_ascii() {
        let options = UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        };
        let g = glyphs(options);
        for glyph in [g.active, g.done, g.pending, g.on, g.off, g.separator, g.arrow, g.paused] {
            assert!(glyph.is_ascii(), "{glyph}");
        }
    }
}
