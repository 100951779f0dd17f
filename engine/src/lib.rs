//! Core engine for boxbreath - session state machine, timing, and scene math.
//!
//! This crate contains the App façade without TUI dependencies. Every
//! time-dependent call takes the current [`Instant`] from the caller.

use std::path::PathBuf;
use std::time::Instant;

pub use boxbreath_types::{
    EffectiveDurations, OUTLINE_COLOR, PHASE_COLORS, PHASE_COUNT, PHASE_FREQUENCIES, Pace,
    Pattern, PatternId, Phase, PhaseKind, Rgb, Rgba, TargetMinutes, catalog, format_clock,
    phase_color,
    ui::{InputMode, UiOptions, Visibility},
};

mod clock;
mod config;
mod controller;
mod cues;
mod gradient;
mod platform;
mod sampler;
mod scene;
mod stats;
mod timer;

pub use clock::{ClockSnapshot, SessionClock, TickOutcome};
pub use config::{
    AppConfig, BreathConfig, ConfigError, CuesConfig, REDUCED_MOTION_ENV, SessionConfig,
    config_path,
};
pub use controller::{
    COUNTDOWN_FROM, CompletionSummary, SessionController, SessionEvent, SessionSettings,
    SessionState,
};
pub use cues::{
    CueError, CueSettings, Cues, HapticOutput, Silent, ToneOutput, WakeLock, haptic_patterns,
};
pub use gradient::{GradientCache, GradientKey, RadialGradient};
pub use platform::{Inhibitor, InhibitorWakeLock, NoHaptics, TerminalBell, terminal_cues};
pub use sampler::{FrameSample, PULSE_SECS, ease, phase_progress, pulse};
pub use scene::{BoxGeometry, DrawOp, Point, Scene, SceneInput, SceneRenderer, Viewport};
pub use stats::{
    FileLedgerStore, LedgerStore, MemoryLedgerStore, STATS_FILE, Statistics, StatisticsLedger,
    StatsError, rounded_minutes,
};
pub use timer::{AnimationLoop, IntervalTimer, LOGICAL_TICK, Timers};

/// Longest target a user can type, in digits.
const TARGET_ENTRY_MAX_DIGITS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDirSource {
    System,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    pub path: PathBuf,
    pub source: DataDirSource,
}

impl DataDir {
    /// `~/.boxbreath`, or `./.boxbreath` when no home directory is known.
    #[must_use]
    pub fn resolve() -> Self {
        match dirs::home_dir() {
            Some(home) => DataDir {
                path: home.join(".boxbreath"),
                source: DataDirSource::System,
            },
            None => DataDir {
                path: PathBuf::from(".").join(".boxbreath"),
                source: DataDirSource::Fallback,
            },
        }
    }

    #[must_use]
    pub fn join(&self, path: &str) -> PathBuf {
        self.path.join(path)
    }
}

/// Application state
pub struct App {
    controller: SessionController,
    renderer: SceneRenderer,
    viewport: Viewport,
    ui: UiOptions,
    input_mode: InputMode,
    status_message: Option<String>,
    should_quit: bool,
    /// Origin of the idle-oscillation clock.
    epoch: Instant,
}

impl App {
    /// Build the app from the user config, the on-disk ledger, and terminal
    /// cue backends. Nothing here is fatal.
    pub fn new(now: Instant) -> Self {
        let (config, config_problem) = match BreathConfig::load() {
            Ok(config) => (config.unwrap_or_default(), None),
            Err(err) => (
                BreathConfig::default(),
                Some(format!("Config ignored: {err}")),
            ),
        };
        let session = config.session();
        let settings = SessionSettings {
            pattern: session.pattern,
            pace: session.pace(),
            target: session.target(),
        };

        let data_dir = DataDir::resolve();
        let statistics = Statistics::load(Box::new(FileLedgerStore::in_dir(&data_dir.path)));
        let cues = terminal_cues(config.cue_settings());
        let controller = SessionController::new(settings, cues, statistics);

        let mut app = Self::with_controller(controller, config.ui_options(), now);
        if let Some(problem) = config_problem {
            app.set_status(problem);
        } else if data_dir.source == DataDirSource::Fallback {
            app.set_status(format!(
                "Using fallback data dir: {}",
                data_dir.path.display()
            ));
        }
        app
    }

    #[must_use]
    pub fn with_controller(controller: SessionController, ui: UiOptions, now: Instant) -> Self {
        Self {
            controller,
            renderer: SceneRenderer::new(),
            viewport: Viewport::default(),
            ui,
            input_mode: InputMode::Normal,
            status_message: None,
            should_quit: false,
            epoch: now,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        self.controller.state()
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        self.controller.settings()
    }

    #[must_use]
    pub fn statistics(&self) -> &StatisticsLedger {
        self.controller.statistics()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    // ------------------------------------------------------------------
    // Time and rendering
    // ------------------------------------------------------------------

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.next_deadline()
    }

    /// Whether the frame loop should be redrawing continuously.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.controller.timers().animation().is_some()
    }

    pub fn poll(&mut self, now: Instant) -> Option<SessionEvent> {
        let event = self.controller.poll(now)?;
        if let SessionEvent::Completed(summary) = event {
            self.renderer.invalidate();
            self.set_status(format!(
                "Session complete: {} in {} cycles",
                format_clock(summary.elapsed_secs),
                summary.cycles
            ));
        }
        Some(event)
    }

    /// The frame for `now`. Logical-tick redraws and animation-frame redraws
    /// both come through here.
    pub fn scene(&mut self, now: Instant) -> Scene {
        let timestamp_ms = now.saturating_duration_since(self.epoch).as_secs_f64() * 1000.0;
        match self
            .controller
            .scene_input(now, timestamp_ms, self.ui.reduced_motion)
        {
            Some(input) => self.renderer.render(&self.viewport, &input),
            None => Scene::empty(self.viewport),
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.renderer.invalidate();
        }
    }

    /// Flip reduced motion at runtime. Takes effect on the next frame.
    pub fn toggle_reduced_motion(&mut self) {
        self.ui.reduced_motion = !self.ui.reduced_motion;
        self.set_status(if self.ui.reduced_motion {
            "Reduced motion on"
        } else {
            "Reduced motion off"
        });
    }

    pub fn visibility_changed(&mut self, visibility: Visibility) {
        self.controller.visibility_changed(visibility);
    }

    // ------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------

    pub fn toggle_play(&mut self, now: Instant) {
        self.clear_status();
        self.controller.toggle_play(now);
    }

    pub fn stop(&mut self) {
        if self.controller.stop() {
            self.renderer.invalidate();
            self.clear_status();
        }
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.renderer.invalidate();
        self.clear_status();
    }

    pub fn start_preset(&mut self, minutes: u32, now: Instant) {
        if self.controller.start_with_preset(minutes, now) {
            self.clear_status();
        } else {
            self.set_status("Stop the session before starting a preset");
        }
    }

    pub fn next_pattern(&mut self) {
        let next = self.settings().pattern.cycle_next();
        if !self.controller.set_pattern(next) {
            self.set_status("Stop the session to change the pattern");
        }
    }

    pub fn slower(&mut self) {
        let pace = self.settings().pace.slower();
        self.change_pace(pace);
    }

    pub fn faster(&mut self) {
        let pace = self.settings().pace.faster();
        self.change_pace(pace);
    }

    fn change_pace(&mut self, pace: Pace) {
        if !self.controller.set_pace(pace) {
            self.set_status("Stop the session to change the pace");
        }
    }

    pub fn toggle_sound(&mut self) {
        let on = self.controller.toggle_sound();
        self.set_status(if on { "Sound on" } else { "Sound off" });
    }

    pub fn toggle_haptics(&mut self) {
        let on = self.controller.toggle_haptics();
        self.set_status(if on { "Haptics on" } else { "Haptics off" });
    }

    // ------------------------------------------------------------------
    // Target entry
    // ------------------------------------------------------------------

    pub fn begin_target_entry(&mut self) {
        if !self.state().is_idle() {
            self.set_status("Stop the session to change the duration");
            return;
        }
        let draft = self
            .settings()
            .target
            .map(|target| target.minutes().to_string())
            .unwrap_or_default();
        self.input_mode = InputMode::TargetEntry { draft };
    }

    pub fn target_entry_push(&mut self, c: char) {
        if let InputMode::TargetEntry { draft } = &mut self.input_mode
            && c.is_ascii_digit()
            && draft.len() < TARGET_ENTRY_MAX_DIGITS
        {
            draft.push(c);
        }
    }

    pub fn target_entry_backspace(&mut self) {
        if let InputMode::TargetEntry { draft } = &mut self.input_mode {
            draft.pop();
        }
    }

    /// Apply the draft. Empty or zero means no limit.
    pub fn commit_target_entry(&mut self) {
        let InputMode::TargetEntry { draft } = std::mem::take(&mut self.input_mode) else {
            return;
        };
        if self.controller.set_target_input(&draft) {
            let message = match self.settings().target {
                Some(target) => format!("Duration set to {target}"),
                None => "No duration limit".to_string(),
            };
            self.set_status(message);
        }
    }

    pub fn cancel_target_entry(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}
