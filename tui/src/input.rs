//! Input handling for the boxbreath TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::debug;

use boxbreath_engine::{App, InputMode, Visibility};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    /// A message taken by [`InputPump::ready`] and not yet handled.
    pending: Option<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            pending: None,
            stop,
            join: Some(join),
        }
    }

    /// Resolve once input is waiting to be handled, or the pump has gone
    /// away. Cancel-safe.
    pub async fn ready(&mut self) {
        if self.pending.is_none() {
            self.pending = self.rx.recv().await;
        }
    }

    fn next(&mut self) -> Result<Option<InputMsg>, mpsc::error::TryRecvError> {
        match self.pending.take() {
            Some(msg) => Ok(Some(msg)),
            None => match self.rx.try_recv() {
                Ok(msg) => Ok(Some(msg)),
                Err(mpsc::error::TryRecvError::Empty) => Ok(None),
                Err(err) => Err(err),
            },
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a backpressured send unblocks.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending terminal events into `app`. Returns `true` when the app
/// should exit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.next() {
            Ok(Some(InputMsg::Event(ev))) => ev,
            Ok(Some(InputMsg::Error(msg))) => return Err(anyhow!("input error: {msg}")),
            Ok(None) => break,
            Err(_) => return Err(anyhow!("input pump disconnected")),
        };

        if apply_event(app, ev, Instant::now()) {
            return Ok(true);
        }
        processed += 1;
    }
    if processed == MAX_EVENTS_PER_FRAME {
        debug!(processed, "Input backlog deferred to next frame");
    }
    Ok(app.should_quit())
}

fn apply_event(app: &mut App, event: Event, now: Instant) -> bool {
    match event {
        Event::Key(key) => {
            if matches!(key.kind, KeyEventKind::Release) {
                return app.should_quit();
            }

            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                app.request_quit();
                return true;
            }

            if app.input_mode().is_normal() {
                handle_normal_mode(app, key, now);
            } else {
                handle_target_entry(app, key);
            }
        }
        Event::FocusGained => app.visibility_changed(Visibility::Visible),
        Event::FocusLost => app.visibility_changed(Visibility::Hidden),
        // The next draw re-derives the viewport from the frame area.
        Event::Resize(..) | Event::Mouse(_) | Event::Paste(_) => {}
    }
    app.should_quit()
}

fn handle_normal_mode(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.request_quit(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_play(now),
        KeyCode::Char('s') => app.stop(),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char('p') | KeyCode::Tab => app.next_pattern(),
        KeyCode::Char('-' | '_') => app.faster(),
        KeyCode::Char('+' | '=') => app.slower(),
        KeyCode::Char('t') => app.begin_target_entry(),
        KeyCode::Char('2') => app.start_preset(2, now),
        KeyCode::Char('5') => app.start_preset(5, now),
        KeyCode::Char('0') => app.start_preset(10, now),
        KeyCode::Char('m') => app.toggle_sound(),
        KeyCode::Char('h') => app.toggle_haptics(),
        KeyCode::Char('a') => app.toggle_reduced_motion(),
        _ => {}
    }
}

fn handle_target_entry(app: &mut App, key: KeyEvent) {
    debug_assert!(matches!(app.input_mode(), InputMode::TargetEntry { .. }));
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() => app.target_entry_push(c),
        KeyCode::Backspace => app.target_entry_backspace(),
        KeyCode::Enter => app.commit_target_entry(),
        KeyCode::Esc => app.cancel_target_entry(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxbreath_engine::{
        Cues, MemoryLedgerStore, SessionController, SessionSettings, SessionState, Statistics,
        UiOptions,
    };

    fn app(now: Instant) -> App {
        let statistics = Statistics::load(Box::new(MemoryLedgerStore::default()));
        let controller =
            SessionController::new(SessionSettings::default(), Cues::silent(), statistics);
        App::with_controller(controller, UiOptions::default(), now)
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn space_starts_the_countdown() {
        let now = Instant::now();
        let mut app = app(now);

        assert!(!apply_event(&mut app, press(KeyCode::Char(' ')), now));

        assert!(matches!(app.state(), SessionState::CountingDown { .. }));
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let now = Instant::now();
        let mut app = app(now);
        app.begin_target_entry();

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert!(apply_event(&mut app, ctrl_c, now));
        assert!(app.should_quit());
    }

    #[test]
    fn target_entry_captures_digits_until_enter() {
        let now = Instant::now();
        let mut app = app(now);

        for key in ['t', '1', '2', 'q'] {
            apply_event(&mut app, press(KeyCode::Char(key)), now);
        }
        assert!(!app.should_quit());
        assert_eq!(
            app.input_mode(),
            &InputMode::TargetEntry {
                draft: "12".to_string()
            }
        );

        apply_event(&mut app, press(KeyCode::Enter), now);

        assert!(app.input_mode().is_normal());
        assert_eq!(app.settings().target.map(|t| t.minutes()), Some(12));
        assert!(app.state().is_idle());
    }

    #[test]
    fn escape_cancels_target_entry_without_quitting() {
        let now = Instant::now();
        let mut app = app(now);
        apply_event(&mut app, press(KeyCode::Char('t')), now);

        apply_event(&mut app, press(KeyCode::Esc), now);

        assert!(app.input_mode().is_normal());
        assert!(!app.should_quit());
        assert_eq!(app.settings().target, None);
    }

    #[test]
    fn preset_key_sets_target_and_starts() {
        let now = Instant::now();
        let mut app = app(now);

        apply_event(&mut app, press(KeyCode::Char('5')), now);

        assert_eq!(app.settings().target.map(|t| t.minutes()), Some(5));
        assert!(matches!(app.state(), SessionState::CountingDown { .. }));
    }

    #[test]
    fn pace_keys_step_the_multiplier() {
        let now = Instant::now();
        let mut app = app(now);

        apply_event(&mut app, press(KeyCode::Char('+')), now);
        assert_eq!(app.settings().pace.value(), 1.25);

        apply_event(&mut app, press(KeyCode::Char('-')), now);
        apply_event(&mut app, press(KeyCode::Char('-')), now);
        assert_eq!(app.settings().pace.value(), 0.75);
    }

    #[test]
    fn motion_key_toggles_reduced_motion() {
        let now = Instant::now();
        let mut app = app(now);
        assert!(!app.ui_options().reduced_motion);

        apply_event(&mut app, press(KeyCode::Char('a')), now);
        assert!(app.ui_options().reduced_motion);
        assert_eq!(app.status_message(), Some("Reduced motion on"));

        apply_event(&mut app, press(KeyCode::Char('a')), now);
        assert!(!app.ui_options().reduced_motion);
    }

    #[test]
    fn key_release_is_ignored() {
        let now = Instant::now();
        let mut app = app(now);
        let mut release = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;

        apply_event(&mut app, Event::Key(release), now);

        assert!(app.state().is_idle());
    }
}
