//! Tone, haptic, and wake-lock side effects.
//!
//! Backends are traits so front-ends can plug in whatever the platform
//! offers. [`Cues`] wraps them with the enable flags and swallows every
//! failure after logging it; nothing here can stop a session.

use boxbreath_types::{PHASE_FREQUENCIES, PhaseKind};
use thiserror::Error;

/// Vibration patterns as alternating on/off milliseconds.
pub mod haptic_patterns {
    pub const COUNTDOWN: &[u32] = &[30];
    pub const PHASE_CHANGE: &[u32] = &[30, 50, 30];
    pub const COMPLETE: &[u32] = &[100, 50, 100, 50, 100];
    pub const TOGGLE_ON: &[u32] = &[30];
}

#[derive(Debug, Error)]
pub enum CueError {
    #[error("{0} is not supported here")]
    Unsupported(&'static str),
    #[error("{action} failed: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub trait ToneOutput: Send {
    fn play(&mut self, phase: PhaseKind, frequency_hz: u32) -> Result<(), CueError>;
}

pub trait HapticOutput: Send {
    fn vibrate(&mut self, pattern: &[u32]) -> Result<(), CueError>;
}

/// Best-effort "keep the screen awake" request.
pub trait WakeLock: Send {
    fn acquire(&mut self) -> Result<(), CueError>;
    fn release(&mut self) -> Result<(), CueError>;
    fn is_held(&self) -> bool;
}

/// Backend that does nothing and reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ToneOutput for Silent {
    fn play(&mut self, _phase: PhaseKind, _frequency_hz: u32) -> Result<(), CueError> {
        Ok(())
    }
}

impl HapticOutput for Silent {
    fn vibrate(&mut self, _pattern: &[u32]) -> Result<(), CueError> {
        Ok(())
    }
}

impl WakeLock for Silent {
    fn acquire(&mut self) -> Result<(), CueError> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), CueError> {
        Ok(())
    }

    fn is_held(&self) -> bool {
        false
    }
}

/// Which cue backends to wire up, resolved from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueSettings {
    pub sound: bool,
    pub haptics: bool,
    pub wake_lock: bool,
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            sound: true,
            haptics: true,
            wake_lock: true,
        }
    }
}

pub struct Cues {
    tone: Box<dyn ToneOutput>,
    haptic: Box<dyn HapticOutput>,
    wake_lock: Box<dyn WakeLock>,
    settings: CueSettings,
    /// Unsupported features are logged once, then stay quiet.
    reported_unsupported: Vec<&'static str>,
}

impl std::fmt::Debug for Cues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cues")
            .field("settings", &self.settings)
            .field("wake_lock_held", &self.wake_lock.is_held())
            .finish_non_exhaustive()
    }
}

impl Cues {
    pub fn new(
        tone: Box<dyn ToneOutput>,
        haptic: Box<dyn HapticOutput>,
        wake_lock: Box<dyn WakeLock>,
        settings: CueSettings,
    ) -> Self {
        Self {
            tone,
            haptic,
            wake_lock,
            settings,
            reported_unsupported: Vec::new(),
        }
    }

    /// No audible, tactile, or power-management effects.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(
            Box::new(Silent),
            Box::new(Silent),
            Box::new(Silent),
            CueSettings::default(),
        )
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.settings.sound
    }

    #[must_use]
    pub fn haptics_enabled(&self) -> bool {
        self.settings.haptics
    }

    pub fn set_sound(&mut self, enabled: bool) {
        self.settings.sound = enabled;
    }

    pub fn set_haptics(&mut self, enabled: bool) {
        self.settings.haptics = enabled;
    }

    #[must_use]
    pub fn wake_lock_held(&self) -> bool {
        self.wake_lock.is_held()
    }

    pub fn emit_tone(&mut self, phase: PhaseKind) {
        if !self.settings.sound {
            return;
        }
        let frequency = PHASE_FREQUENCIES[phase.index()];
        if let Err(err) = self.tone.play(phase, frequency) {
            self.report("tone", &err);
        }
    }

    pub fn emit_haptic(&mut self, pattern: &[u32]) {
        if !self.settings.haptics {
            return;
        }
        if let Err(err) = self.haptic.vibrate(pattern) {
            self.report("haptic", &err);
        }
    }

    pub fn acquire_wake_lock(&mut self) {
        if !self.settings.wake_lock || self.wake_lock.is_held() {
            return;
        }
        match self.wake_lock.acquire() {
            Ok(()) => tracing::debug!("wake lock acquired"),
            Err(err) => self.report("wake lock", &err),
        }
    }

    pub fn release_wake_lock(&mut self) {
        if !self.wake_lock.is_held() {
            return;
        }
        match self.wake_lock.release() {
            Ok(()) => tracing::debug!("wake lock released"),
            Err(err) => self.report("wake lock release", &err),
        }
    }

    fn report(&mut self, what: &'static str, err: &CueError) {
        match err {
            CueError::Unsupported(feature) => {
                if !self.reported_unsupported.contains(feature) {
                    self.reported_unsupported.push(feature);
                    tracing::debug!("{what} cue disabled: {err}");
                }
            }
            CueError::Io { .. } => tracing::warn!("{what} cue failed: {err}"),
        }
    }
}
