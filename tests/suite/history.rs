//! Statistics persisted across app launches on different days.

use std::fs;
use std::time::Instant;

use boxbreath_engine::{FileLedgerStore, LedgerStore, STATS_FILE, StatisticsLedger};
use chrono::NaiveDate;
use tempfile::tempdir;

use crate::common::{Recorder, controller_on, date, one_minute_box, run_to_completion};

/// One launch: load the ledger from `dir`, complete a one-minute session on
/// `today`, and hand back what was recorded in memory.
fn session_on(dir: &std::path::Path, today: NaiveDate) -> StatisticsLedger {
    let mut controller = controller_on(
        one_minute_box(),
        Box::new(FileLedgerStore::in_dir(dir)),
        &Recorder::default(),
        today,
    );
    run_to_completion(&mut controller, Instant::now(), 600);
    controller.statistics().clone()
}

#[test]
fn streak_survives_restarts_and_resets_after_a_gap() {
    let dir = tempdir().unwrap();

    let streaks: Vec<(u32, u32)> = [
        date(2025, 6, 1),
        date(2025, 6, 1),
        date(2025, 6, 2),
        date(2025, 6, 3),
        date(2025, 6, 6),
    ]
    .into_iter()
    .map(|today| {
        let ledger = session_on(dir.path(), today);
        (ledger.current_streak, ledger.longest_streak)
    })
    .collect();

    assert_eq!(streaks, vec![(1, 1), (1, 1), (2, 2), (3, 3), (1, 3)]);

    let on_disk = FileLedgerStore::in_dir(dir.path()).load().unwrap();
    assert_eq!(on_disk.total_sessions, 5);
    assert_eq!(on_disk.total_minutes, 5);
    assert_eq!(on_disk.total_cycles, 20);
    assert_eq!(on_disk.last_session_date, Some(date(2025, 6, 6)));
}

#[test]
fn ledger_file_is_plain_json() {
    let dir = tempdir().unwrap();
    session_on(dir.path(), date(2025, 6, 1));

    let raw = fs::read_to_string(dir.path().join(STATS_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(value["total_sessions"], 1);
    assert_eq!(value["total_minutes"], 1);
    assert_eq!(value["total_cycles"], 4);
    assert_eq!(value["last_session_date"], "2025-06-01");
}

#[test]
fn corrupt_ledger_starts_from_zero_and_is_replaced() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(STATS_FILE);
    fs::write(&path, "{ not json").unwrap();

    let ledger = session_on(dir.path(), date(2025, 6, 1));

    assert_eq!(ledger.total_sessions, 1);
    let reloaded = FileLedgerStore::new(&path).load().unwrap();
    assert_eq!(reloaded, ledger);
}

#[test]
fn missing_data_dir_is_created_on_first_save() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("deeper").join(".boxbreath");

    session_on(&nested, date(2025, 6, 1));

    assert!(nested.join(STATS_FILE).is_file());
}
