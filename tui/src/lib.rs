//! TUI rendering for boxbreath using ratatui.

mod input;
mod stage;
mod theme;

pub use input::{InputPump, handle_events};
pub use stage::{CellMetrics, Stage};
pub use theme::{Glyphs, Palette, glyphs, palette, styles};

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
};

use boxbreath_engine::{
    App, ClockSnapshot, CompletionSummary, InputMode, PhaseKind, SessionState, StatisticsLedger,
    format_clock,
};

const PANEL_HEIGHT: u16 = 7;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App, now: Instant, metrics: CellMetrics) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),            // Header
            Constraint::Min(3),               // Stage
            Constraint::Length(PANEL_HEIGHT), // Panel
            Constraint::Length(1),            // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0], &palette, &glyphs);
    draw_stage(frame, app, chunks[1], now, metrics, &palette);
    draw_panel(frame, app, chunks[2], &palette, &glyphs);
    draw_status_bar(frame, app, chunks[3], &palette, &glyphs);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let pattern = app.settings().pattern();
    let line = Line::from(vec![
        Span::styled("boxbreath", styles::title(palette)),
        Span::styled(glyphs.separator, styles::muted(palette)),
        Span::styled(pattern.name(), Style::default().fg(palette.text_primary)),
        Span::styled(glyphs.separator, styles::muted(palette)),
        Span::styled(app.state().name(), styles::muted(palette)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_stage(
    frame: &mut Frame,
    app: &mut App,
    area: Rect,
    now: Instant,
    metrics: CellMetrics,
    palette: &Palette,
) {
    app.resize(metrics.viewport(area));
    let scene = app.scene(now);
    let ascii_only = app.ui_options().ascii_only;
    frame.render_widget(
        Stage::new(&scene, metrics, palette).ascii_only(ascii_only),
        area,
    );

    let overlay: Vec<Line> = match app.state() {
        SessionState::Idle => idle_card(app, palette, ascii_only),
        SessionState::CountingDown { remaining } => vec![
            Line::from(Span::styled(
                remaining.to_string(),
                Style::default()
                    .fg(palette.phase(PhaseKind::Inhale))
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("Get ready...", styles::muted(palette))),
        ],
        SessionState::Paused(_) => vec![
            Line::from(Span::styled("Paused", styles::title(palette))),
            Line::from(Span::styled("Press Space to resume", styles::muted(palette))),
        ],
        SessionState::Running(_) | SessionState::Complete(_) => Vec::new(),
    };
    if overlay.is_empty() {
        return;
    }
    let height = (overlay.len() as u16).min(area.height);
    let top = area.y + area.height.saturating_sub(height) / 2;
    let card = Rect::new(area.x, top, area.width, height);
    frame.render_widget(Paragraph::new(overlay).alignment(Alignment::Center), card);
}

fn idle_card(app: &App, palette: &Palette, ascii_only: bool) -> Vec<Line<'static>> {
    let settings = app.settings();
    let pattern = settings.pattern();
    let mut preview = pattern.preview(settings.pace);
    if ascii_only {
        preview = preview.replace('→', "->");
    }
    vec![
        Line::from(Span::styled(pattern.name(), styles::title(palette))),
        Line::from(Span::styled(
            pattern.description(),
            Style::default().fg(palette.text_secondary),
        )),
        Line::from(""),
        Line::from(Span::styled(preview, styles::muted(palette))),
    ]
}

fn draw_panel(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let lines = match app.state() {
        SessionState::Idle | SessionState::CountingDown { .. } => {
            settings_lines(app, palette, glyphs)
        }
        SessionState::Running(clock) | SessionState::Paused(clock) => {
            session_lines(app, &clock.snapshot(), palette, glyphs)
        }
        SessionState::Complete(summary) => complete_lines(app, summary, palette, glyphs),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(palette.bg_panel));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn label(text: &str, palette: &Palette) -> Span<'static> {
    Span::styled(format!("{text:<10}"), styles::muted(palette))
}

fn value(text: impl Into<String>, palette: &Palette) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(palette.text_primary))
}

fn settings_lines(app: &App, palette: &Palette, glyphs: &Glyphs) -> Vec<Line<'static>> {
    let settings = app.settings();
    let cues = app.controller().cues();
    let toggle = |on: bool| if on { glyphs.on } else { glyphs.off };

    let duration = match app.input_mode() {
        InputMode::TargetEntry { draft } => Line::from(vec![
            label("Duration", palette),
            Span::styled(format!("{draft}_ min"), styles::key_hint(palette)),
            Span::styled("  Enter set, Esc cancel", styles::muted(palette)),
        ]),
        InputMode::Normal => Line::from(vec![
            label("Duration", palette),
            value(
                settings
                    .target
                    .map_or_else(|| "Open-ended".to_string(), |target| target.to_string()),
                palette,
            ),
        ]),
    };

    vec![
        Line::from(vec![
            label("Pace", palette),
            value(
                format!("{} ({:.2}x)", settings.pace.label(), settings.pace.value()),
                palette,
            ),
        ]),
        duration,
        Line::from(vec![
            label("Cues", palette),
            value(format!("Sound {}", toggle(cues.sound_enabled())), palette),
            Span::styled(glyphs.separator, styles::muted(palette)),
            value(format!("Haptics {}", toggle(cues.haptics_enabled())), palette),
            Span::styled(glyphs.separator, styles::muted(palette)),
            value(
                format!("Motion {}", toggle(!app.ui_options().reduced_motion)),
                palette,
            ),
        ]),
        stats_line(app.statistics(), palette, glyphs),
        Line::from(Span::styled(
            "Space start  p pattern  -/+ pace  t duration  2/5/0 presets  m/h/a cues",
            styles::key_hint(palette),
        )),
    ]
}

fn stats_line(stats: &StatisticsLedger, palette: &Palette, glyphs: &Glyphs) -> Line<'static> {
    if stats.is_empty() {
        return Line::from(vec![
            label("History", palette),
            Span::styled("No sessions yet", styles::muted(palette)),
        ]);
    }
    let sessions = if stats.total_sessions == 1 {
        "1 session".to_string()
    } else {
        format!("{} sessions", stats.total_sessions)
    };
    Line::from(vec![
        label("History", palette),
        value(sessions, palette),
        Span::styled(glyphs.separator, styles::muted(palette)),
        value(format!("{} min", stats.total_minutes), palette),
        Span::styled(glyphs.separator, styles::muted(palette)),
        value(format!("{} cycles", stats.total_cycles), palette),
        Span::styled(glyphs.separator, styles::muted(palette)),
        value(
            format!(
                "streak {} (best {})",
                stats.current_streak, stats.longest_streak
            ),
            palette,
        ),
    ])
}

fn session_lines(
    app: &App,
    snapshot: &ClockSnapshot,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Vec<Line<'static>> {
    let accent = palette.phase(snapshot.phase);
    let settings = app.settings();

    let mut phase_line = vec![
        Span::styled(
            snapshot.phase.name(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(glyphs.separator, styles::muted(palette)),
        value(format!("{}s", snapshot.countdown), palette),
    ];
    if matches!(app.state(), SessionState::Paused(_)) {
        phase_line.push(Span::styled(
            format!("  {} paused", glyphs.paused),
            Style::default().fg(palette.warning),
        ));
    }

    let mut time = vec![
        label("Elapsed", palette),
        value(format_clock(snapshot.elapsed_secs), palette),
    ];
    if let Some(target) = settings.target {
        let remaining = target.as_secs().saturating_sub(snapshot.elapsed_secs);
        time.push(Span::styled(
            format!(" ({} left)", format_clock(remaining)),
            styles::muted(palette),
        ));
    }
    time.push(Span::styled(glyphs.separator, styles::muted(palette)));
    time.push(value(format!("Cycle {}", snapshot.cycles + 1), palette));

    let finishing = if snapshot.target_reached {
        Line::from(Span::styled(
            "Finishing current cycle...",
            Style::default().fg(palette.success),
        ))
    } else {
        Line::from("")
    };

    vec![
        Line::from(phase_line),
        Line::from(tracker(app, snapshot.phase, palette, glyphs)),
        Line::from(time),
        finishing,
        Line::from(Span::styled(
            "Space pause/resume  s stop  r reset  m sound  h haptics  a motion  q quit",
            styles::key_hint(palette),
        )),
    ]
}

/// Phase tracker, skipping phases whose effective duration is zero.
fn tracker(app: &App, current: PhaseKind, palette: &Palette, glyphs: &Glyphs) -> Vec<Span<'static>> {
    let durations = app.settings().durations();
    let mut spans = Vec::new();
    for kind in PhaseKind::ALL {
        if durations.get(kind) == 0 {
            continue;
        }
        if !spans.is_empty() {
            spans.push(Span::styled(
                format!(" {} ", glyphs.arrow),
                styles::muted(palette),
            ));
        }
        let (glyph, style) = if kind == current {
            (
                glyphs.active,
                Style::default()
                    .fg(palette.phase(kind))
                    .add_modifier(Modifier::BOLD),
            )
        } else if kind.index() < current.index() {
            (glyphs.done, Style::default().fg(palette.text_secondary))
        } else {
            (glyphs.pending, styles::muted(palette))
        };
        spans.push(Span::styled(format!("{glyph} {}", kind.name()), style));
    }
    spans
}

fn complete_lines(
    app: &App,
    summary: &CompletionSummary,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "Well Done!",
            Style::default()
                .fg(palette.success)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            label("Session", palette),
            value(format_clock(summary.elapsed_secs), palette),
            Span::styled(glyphs.separator, styles::muted(palette)),
            value(format!("{} cycles", summary.cycles), palette),
        ]),
        stats_line(app.statistics(), palette, glyphs),
        Line::from(""),
        Line::from(Span::styled(
            "Space New Session  r reset  2/5/0 presets  q quit",
            styles::key_hint(palette),
        )),
    ]
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let line = match app.status_message() {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(palette.primary),
        )),
        None => Line::from(vec![
            Span::styled("q", styles::key_hint(palette)),
            Span::styled(" quit", styles::muted(palette)),
            Span::styled(glyphs.separator, styles::muted(palette)),
            Span::styled("Space", styles::key_hint(palette)),
            Span::styled(" play/pause", styles::muted(palette)),
        ]),
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxbreath_engine::{
        Cues, MemoryLedgerStore, SessionController, SessionSettings, Statistics, UiOptions,
    };
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;

    fn app(now: Instant, ui: UiOptions) -> App {
        let statistics = Statistics::load(Box::new(MemoryLedgerStore::default()));
        let controller =
            SessionController::new(SessionSettings::default(), Cues::silent(), statistics);
        App::with_controller(controller, ui, now)
    }

    fn render(app: &mut App, now: Instant) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal
            .draw(|frame| draw(frame, app, now, CellMetrics::default()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn idle_screen_shows_pattern_and_settings() {
        let now = Instant::now();
        let mut app = app(now, UiOptions::default());

        let text = render(&mut app, now);

        assert!(text.contains("Box Breathing"));
        assert!(text.contains("Equal phases for balance"));
        assert!(text.contains("Open-ended"));
        assert!(text.contains("No sessions yet"));
        assert!(app.viewport().width() > 0.0);
    }

    #[test]
    fn countdown_shows_remaining_number() {
        let now = Instant::now();
        let mut app = app(now, UiOptions::default());
        app.toggle_play(now);

        let text = render(&mut app, now);

        assert!(text.contains("Get ready..."));
        assert!(text.contains('3'));
    }

    #[test]
    fn running_screen_shows_phase_tracker_and_clock() {
        let start = Instant::now();
        let mut app = app(start, UiOptions::default());
        app.toggle_play(start);
        for secs in 1..=3 {
            app.poll(start + Duration::from_secs(secs));
        }
        let now = start + Duration::from_secs(3);

        let text = render(&mut app, now);

        assert!(text.contains("Inhale"));
        assert!(text.contains("4s"));
        assert!(text.contains("Elapsed   00:00"));
        assert!(text.contains("Cycle 1"));
    }

    #[test]
    fn ascii_mode_renders_ascii_tracker() {
        let start = Instant::now();
        let ui = UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        };
        let mut app = app(start, ui);
        app.toggle_play(start);
        for secs in 1..=3 {
            app.poll(start + Duration::from_secs(secs));
        }

        let text = render(&mut app, start + Duration::from_secs(3));

        assert!(text.contains("> Inhale -> o Hold"));
    }

    #[test]
    fn paused_screen_prompts_to_resume() {
        let start = Instant::now();
        let mut app = app(start, UiOptions::default());
        app.toggle_play(start);
        for secs in 1..=3 {
            app.poll(start + Duration::from_secs(secs));
        }
        app.toggle_play(start + Duration::from_secs(3));

        let text = render(&mut app, start + Duration::from_secs(3));

        assert!(text.contains("Press Space to resume"));
    }

    #[test]
    fn target_entry_shows_draft() {
        let now = Instant::now();
        let mut app = app(now, UiOptions::default());
        app.begin_target_entry();
        app.target_entry_push('7');

        let text = render(&mut app, now);

        assert!(text.contains("7_ min"));
    }

    #[test]
    fn status_message_replaces_default_hint() {
        let now = Instant::now();
        let mut app = app(now, UiOptions::default());
        app.toggle_sound();

        let text = render(&mut app, now);

        assert!(text.contains("Sound off"));
    }
}
