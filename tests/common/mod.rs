//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use boxbreath_engine::{
    COUNTDOWN_FROM, CueError, CueSettings, Cues, HapticOutput, LedgerStore, PhaseKind,
    SessionController, SessionSettings, SessionState, Statistics, TargetMinutes, ToneOutput,
    WakeLock,
};
use chrono::NaiveDate;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Cue backend that records every call. Clones share the log.
#[derive(Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
    held: Arc<Mutex<bool>>,
}

impl Recorder {
    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn held(&self) -> bool {
        *self.held.lock().unwrap()
    }

    pub fn cues(&self, settings: CueSettings) -> Cues {
        Cues::new(
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self.clone()),
            settings,
        )
    }

    fn push(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }
}

impl ToneOutput for Recorder {
    fn play(&mut self, phase: PhaseKind, frequency_hz: u32) -> Result<(), CueError> {
        self.push(format!("tone {phase} {frequency_hz}"));
        Ok(())
    }
}

impl HapticOutput for Recorder {
    fn vibrate(&mut self, pattern: &[u32]) -> Result<(), CueError> {
        self.push(format!("haptic {pattern:?}"));
        Ok(())
    }
}

impl WakeLock for Recorder {
    fn acquire(&mut self) -> Result<(), CueError> {
        *self.held.lock().unwrap() = true;
        self.push("acquire");
        Ok(())
    }

    fn release(&mut self) -> Result<(), CueError> {
        *self.held.lock().unwrap() = false;
        self.push("release");
        Ok(())
    }

    fn is_held(&self) -> bool {
        *self.held.lock().unwrap()
    }
}

/// A controller over `store` whose calendar always reads `today`.
pub fn controller_on(
    settings: SessionSettings,
    store: Box<dyn LedgerStore>,
    recorder: &Recorder,
    today: NaiveDate,
) -> SessionController {
    SessionController::new(
        settings,
        recorder.cues(CueSettings::default()),
        Statistics::load(store),
    )
    .with_today(move || today)
}

pub fn one_minute_box() -> SessionSettings {
    SessionSettings {
        target: TargetMinutes::new(1),
        ..SessionSettings::default()
    }
}

/// Start from Idle at `t0` and poll once per second until the session
/// leaves the ticking states or `limit` seconds pass. Returns the last
/// polled second.
pub fn run_to_completion(controller: &mut SessionController, t0: Instant, limit: u64) -> u64 {
    assert!(controller.start(t0));
    let mut n = 0;
    while n < limit {
        n += 1;
        controller.poll(t0 + secs(n));
        if matches!(controller.state(), SessionState::Complete(_)) {
            break;
        }
    }
    n
}

/// Seconds spent counting down before the clock starts.
pub const COUNTDOWN_SECS: u64 = COUNTDOWN_FROM as u64;
