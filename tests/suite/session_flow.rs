//! End-to-end session runs through the controller's public surface.

use std::time::Instant;

use boxbreath_engine::{
    CompletionSummary, MemoryLedgerStore, Pace, PatternId, PhaseKind, SessionEvent,
    SessionSettings, SessionState, TargetMinutes,
};

use crate::common::{
    COUNTDOWN_SECS, Recorder, controller_on, date, one_minute_box, run_to_completion, secs,
};

#[test]
fn one_minute_box_session_runs_start_to_finish() {
    let recorder = Recorder::default();
    let store = MemoryLedgerStore::default();
    let mut controller = controller_on(
        one_minute_box(),
        Box::new(store.clone()),
        &recorder,
        date(2025, 6, 1),
    );
    let t0 = Instant::now();

    let last = run_to_completion(&mut controller, t0, 600);

    // Four 16-second cycles reach the one-minute mark at a cycle boundary.
    assert_eq!(last, COUNTDOWN_SECS + 64);
    let SessionState::Complete(summary) = controller.state() else {
        panic!("session did not complete: {}", controller.state().name());
    };
    assert_eq!(
        summary,
        &CompletionSummary {
            elapsed_secs: 64,
            cycles: 4,
            final_phase: PhaseKind::Inhale,
        }
    );
    assert!(!recorder.held());
    assert_eq!(store.saved().map(|ledger| ledger.total_sessions), Some(1));

    let entries = recorder.entries();
    assert_eq!(
        &entries[..9],
        &[
            "tone Inhale 396",
            "haptic [30]",
            "tone Inhale 396",
            "haptic [30]",
            "tone Inhale 396",
            "haptic [30]",
            "tone Inhale 396",
            "haptic [30, 50, 30]",
            "acquire",
        ]
    );
    assert_eq!(
        &entries[entries.len() - 3..],
        &["release", "haptic [100, 50, 100, 50, 100]", "tone Wait 741"]
    );
}

#[test]
fn target_is_checked_only_at_cycle_boundaries() {
    // 4-7-8 Relaxing is a 19-second cycle. One minute lands inside the
    // fourth cycle, so the session runs on to its end.
    let recorder = Recorder::default();
    let mut controller = controller_on(
        SessionSettings {
            pattern: PatternId::Relaxing,
            target: TargetMinutes::new(1),
            ..SessionSettings::default()
        },
        Box::new(MemoryLedgerStore::default()),
        &recorder,
        date(2025, 6, 1),
    );
    let t0 = Instant::now();

    run_to_completion(&mut controller, t0, 600);

    let SessionState::Complete(summary) = controller.state() else {
        panic!("session did not complete: {}", controller.state().name());
    };
    assert_eq!(summary.elapsed_secs, 76);
    assert_eq!(summary.cycles, 4);
}

#[test]
fn faster_pace_shortens_the_session_clock() {
    let recorder = Recorder::default();
    let mut controller = controller_on(
        SessionSettings {
            pace: Pace::new(0.5).unwrap(),
            target: TargetMinutes::new(1),
            ..SessionSettings::default()
        },
        Box::new(MemoryLedgerStore::default()),
        &recorder,
        date(2025, 6, 1),
    );
    let t0 = Instant::now();

    run_to_completion(&mut controller, t0, 600);

    // 2-2-2-2 cycles: 60 seconds is exactly 7.5 cycles, so eight run.
    let SessionState::Complete(summary) = controller.state() else {
        panic!("session did not complete");
    };
    assert_eq!(summary.cycles, 8);
    assert_eq!(summary.elapsed_secs, 64);
}

#[test]
fn pause_holds_the_clock_across_a_long_gap() {
    let recorder = Recorder::default();
    let mut controller = controller_on(
        SessionSettings::default(),
        Box::new(MemoryLedgerStore::default()),
        &recorder,
        date(2025, 6, 1),
    );
    let t0 = Instant::now();
    controller.start(t0);
    for n in 1..=COUNTDOWN_SECS + 6 {
        controller.poll(t0 + secs(n));
    }
    let before = controller.snapshot().unwrap();
    assert_eq!(before.elapsed_secs, 6);

    assert!(controller.pause());
    assert!(!recorder.held());
    // Nothing fires while paused, however long the gap.
    assert!(controller.next_deadline().is_none());
    assert_eq!(controller.poll(t0 + secs(600)), None);

    let resumed_at = t0 + secs(900);
    assert!(controller.resume(resumed_at));
    assert!(recorder.held());
    let after = controller.snapshot().unwrap();
    assert_eq!(
        (after.phase, after.countdown, after.elapsed_secs, after.cycles),
        (before.phase, before.countdown, before.elapsed_secs, before.cycles)
    );

    assert_eq!(
        controller.poll(resumed_at + secs(1)),
        Some(SessionEvent::Ticked)
    );
    assert_eq!(controller.snapshot().unwrap().elapsed_secs, 7);
}

#[test]
fn stalled_caller_drops_missed_ticks() {
    let recorder = Recorder::default();
    let mut controller = controller_on(
        SessionSettings::default(),
        Box::new(MemoryLedgerStore::default()),
        &recorder,
        date(2025, 6, 1),
    );
    let t0 = Instant::now();
    controller.start(t0);
    for n in 1..=COUNTDOWN_SECS {
        controller.poll(t0 + secs(n));
    }

    // Ten seconds late: a single tick fires and the timer re-arms from now.
    let late = t0 + secs(COUNTDOWN_SECS + 10);
    assert!(controller.poll(late).is_some());
    assert!(controller.poll(late).is_none());
    assert_eq!(controller.snapshot().unwrap().elapsed_secs, 1);
    assert_eq!(controller.next_deadline(), Some(late + secs(1)));
}
