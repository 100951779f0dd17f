use serde::Deserialize;
use std::{env, fs, path::PathBuf};
use thiserror::Error;

use boxbreath_types::{Pace, PatternId, TargetMinutes, ui::UiOptions};

use crate::cues::CueSettings;

/// Environment variable that forces reduced motion when set to `1` or `true`.
pub const REDUCED_MOTION_ENV: &str = "BOXBREATH_REDUCED_MOTION";

// Default value function for serde (bool::default() is false, so only true needs a fn)
pub(crate) const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct BreathConfig {
    pub app: Option<AppConfig>,
    pub session: Option<SessionConfig>,
    pub cues: Option<CuesConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for the phase tracker and toggles.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Disable idle oscillation, pulse, and glow.
    #[serde(default)]
    pub reduced_motion: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub pattern: PatternId,
    /// Out-of-range values are clamped rather than rejected.
    pub pace: Option<f64>,
    pub target_minutes: Option<u32>,
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default = "default_true")]
    pub haptics: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pattern: PatternId::default(),
            pace: None,
            target_minutes: None,
            sound: true,
            haptics: true,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn pace(&self) -> Pace {
        self.pace.map_or(Pace::NORMAL, Pace::clamped)
    }

    /// Zero means no limit.
    #[must_use]
    pub fn target(&self) -> Option<TargetMinutes> {
        self.target_minutes.and_then(TargetMinutes::new)
    }
}

#[derive(Debug, Deserialize)]
pub struct CuesConfig {
    #[serde(default = "default_true")]
    pub wake_lock: bool,
}

impl Default for CuesConfig {
    fn default() -> Self {
        Self { wake_lock: true }
    }
}

impl BreathConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        Self::load_from(path)
    }

    /// Load from an explicit path. A missing file is `Ok(None)`.
    pub fn load_from(path: PathBuf) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Presentation options, with the environment override applied.
    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        let app = self.app.as_ref();
        UiOptions {
            ascii_only: app.is_some_and(|a| a.ascii_only),
            high_contrast: app.is_some_and(|a| a.high_contrast),
            reduced_motion: app.is_some_and(|a| a.reduced_motion)
                || reduced_motion_from_env(env::var(REDUCED_MOTION_ENV).ok().as_deref()),
        }
    }

    #[must_use]
    pub fn cue_settings(&self) -> CueSettings {
        let session = self.session.as_ref();
        CueSettings {
            sound: session.is_none_or(|s| s.sound),
            haptics: session.is_none_or(|s| s.haptics),
            wake_lock: self.cues.as_ref().is_none_or(|c| c.wake_lock),
        }
    }

    #[must_use]
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }
}

fn reduced_motion_from_env(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let v = v.trim();
        v == "1" || v.eq_ignore_ascii_case("true")
    })
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".boxbreath").join("config.toml"))
}
