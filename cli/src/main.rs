//! boxbreath CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`boxbreath_engine`] (session state) and [`boxbreath_tui`]
//! (rendering), providing RAII-based terminal management with guaranteed
//! cleanup.
//!
//! ```text
//! main() -> TerminalSession::new() -> run_app() -> App + TUI
//! ```
//!
//! # Event Loop
//!
//! The engine never sleeps; it reports its next timer deadline. Each pass:
//!
//! 1. Render frame
//! 2. Wait for input, the engine deadline, or (only while the animation
//!    loop is live) the next frame tick
//! 3. Drain input queue (non-blocking via [`boxbreath_tui::InputPump`])
//! 4. Fire due session timers (`app.poll(now)`)

use anyhow::Result;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        window_size,
    },
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, Write, stdout},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use boxbreath_engine::{App, DataDir};
use boxbreath_tui::{CellMetrics, InputPump, draw, handle_events};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Without a log file, prefer "no logs" over corrupting the TUI.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    // Primary: ~/.boxbreath/logs/boxbreath.log
    let mut candidates = vec![DataDir::resolve().join("logs").join("boxbreath.log")];

    // Fallback: ./.boxbreath/logs/boxbreath.log
    let local = PathBuf::from(".boxbreath").join("logs").join("boxbreath.log");
    if !candidates.contains(&local) {
        candidates.push(local);
    }

    candidates
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Enables raw mode, the alternate screen, and focus reporting (which drives
/// wake-lock re-acquisition). On drop, all terminal state is restored, even
/// after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, EnableFocusChange) {
            let _ = disable_raw_mode();
            let _ = execute!(out, DisableFocusChange, LeaveAlternateScreen);
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), DisableFocusChange, LeaveAlternateScreen);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableFocusChange,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut app = App::new(Instant::now());

    let result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut app).await
    };

    if let Err(err) = &result {
        tracing::error!("Exiting on error: {err:?}");
        eprintln!("Error: {err:?}");
    }
    result
}

/// Redraw cadence while animating (~60 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Resolve at the engine's next timer deadline, or never when none is armed.
async fn engine_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

fn cell_metrics() -> CellMetrics {
    match window_size() {
        Ok(size) => CellMetrics::from_window(size.columns, size.rows, size.width, size.height),
        Err(err) => {
            tracing::debug!("Terminal pixel size unavailable: {err}");
            CellMetrics::default()
        }
    }
}

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend + Write,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut metrics = cell_metrics();
    let mut last_size = terminal.size()?;
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        match terminal.size() {
            Ok(size) if size != last_size => {
                last_size = size;
                metrics = cell_metrics();
            }
            Ok(_) => {}
            Err(e) => break Err(e.into()),
        }

        let now = Instant::now();
        if let Err(e) = terminal.draw(|frame| draw(frame, app, now, metrics)) {
            break Err(e.into());
        }

        // Outside Running nothing moves between logical ticks, so only
        // input and the engine deadline wake the loop.
        let animating = app.is_animating();
        tokio::select! {
            _ = frames.tick(), if animating => {}
            () = engine_deadline(app.next_deadline()) => {}
            () = input.ready() => {}
        }

        // Non-blocking input (drain queue only)
        match handle_events(app, &mut input) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        if let Some(event) = app.poll(Instant::now()) {
            tracing::debug!(?event, "Session event");
        }
    };

    input.shutdown().await;
    result
}
