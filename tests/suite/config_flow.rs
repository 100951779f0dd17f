//! Config files feeding session settings and presentation options.

use std::fs;

use boxbreath_engine::{BreathConfig, ConfigError, CueSettings, PatternId, TargetMinutes};
use tempfile::tempdir;

#[test]
fn config_file_drives_session_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[app]
ascii_only = true

[session]
pattern = "energizing"
pace = 0.75
target_minutes = 10
haptics = false
"#,
    )
    .unwrap();

    let config = BreathConfig::load_from(path).unwrap().unwrap();
    let session = config.session();

    assert_eq!(session.pattern, PatternId::Energizing);
    assert_eq!(session.pace().value(), 0.75);
    assert_eq!(session.target(), TargetMinutes::new(10));
    assert_eq!(
        config.cue_settings(),
        CueSettings {
            sound: true,
            haptics: false,
            wake_lock: true,
        }
    );
    assert!(config.ui_options().ascii_only);
    assert!(!config.ui_options().high_contrast);
}

#[test]
fn malformed_config_reports_its_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[session]\npace = \"slow\"\n").unwrap();

    let err = BreathConfig::load_from(path.clone()).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), &path);
    assert!(err.to_string().contains("config.toml"));
}
