//! Full-frame renders of the app at each stage of a session.

use std::time::Instant;

use boxbreath_engine::{App, MemoryLedgerStore, SessionState, UiOptions};
use boxbreath_tui::{CellMetrics, draw};
use ratatui::{Terminal, backend::TestBackend};

use crate::common::{COUNTDOWN_SECS, Recorder, controller_on, date, one_minute_box, secs};

fn app(now: Instant) -> App {
    let controller = controller_on(
        one_minute_box(),
        Box::new(MemoryLedgerStore::default()),
        &Recorder::default(),
        date(2025, 6, 1),
    );
    App::with_controller(controller, UiOptions::default(), now)
}

fn screen(app: &mut App, now: Instant) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
    terminal
        .draw(|frame| draw(frame, app, now, CellMetrics::default()))
        .unwrap();
    let buffer = terminal.backend().buffer();
    buffer
        .content()
        .chunks(buffer.area.width as usize)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn idle_screen_lists_target_and_empty_history() {
    let now = Instant::now();
    let mut app = app(now);

    let text = screen(&mut app, now);

    assert!(text.contains("Box Breathing"));
    assert!(text.contains("Inhale: 4s → Hold: 4s → Exhale: 4s → Wait: 4s"));
    assert!(text.contains("1 min"));
    assert!(text.contains("No sessions yet"));
}

#[test]
fn completed_session_shows_summary_and_history() {
    let t0 = Instant::now();
    let mut app = app(t0);
    app.toggle_play(t0);
    let end = COUNTDOWN_SECS + 64;
    for n in 1..=end {
        app.poll(t0 + secs(n));
    }
    assert!(matches!(app.state(), SessionState::Complete(_)));

    let text = screen(&mut app, t0 + secs(end));

    assert!(text.contains("Well Done!"));
    assert!(text.contains("01:04"));
    assert!(text.contains("4 cycles"));
    assert!(text.contains("1 session"));
    assert!(text.contains("streak 1 (best 1)"));
    assert!(text.contains("Session complete: 01:04 in 4 cycles"));
}

#[test]
fn reset_after_completion_returns_to_open_ended_idle() {
    let t0 = Instant::now();
    let mut app = app(t0);
    app.toggle_play(t0);
    let end = COUNTDOWN_SECS + 64;
    for n in 1..=end {
        app.poll(t0 + secs(n));
    }

    app.reset();
    let text = screen(&mut app, t0 + secs(end + 1));

    assert!(app.state().is_idle());
    assert!(text.contains("Open-ended"));
    assert!(text.contains("1 session"));
}

#[test]
fn running_frames_redraw_between_ticks() {
    let t0 = Instant::now();
    let mut app = app(t0);
    app.toggle_play(t0);
    for n in 1..=COUNTDOWN_SECS {
        app.poll(t0 + secs(n));
    }
    assert!(app.is_animating());

    let start = t0 + secs(COUNTDOWN_SECS);
    let first = screen(&mut app, start + secs(1) / 10);
    let later = screen(&mut app, start + secs(1) * 9 / 10);

    // The indicator moves along the edge with no logical tick in between.
    assert_ne!(first, later);
}
