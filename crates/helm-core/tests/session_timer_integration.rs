//! Integration tests for the session timer state machine.

use helm_core::{Event, SessionMode, SessionTimer};

fn run_ticks(timer: &mut SessionTimer, n: u64) -> Vec<Event> {
    (0..n).filter_map(|_| timer.tick()).collect()
}

#[test]
fn test_completion_fires_once_per_zero_crossing() {
    let mut timer = SessionTimer::new(25, 5);
    timer.start_secs(1);

    let mut completions = usize::from(timer.tick().is_some());
    for _ in 0..5 {
        completions += usize::from(timer.check_completion().is_some());
    }
    completions += run_ticks(&mut timer, 3).len();

    assert_eq!(completions, 1);
    assert_eq!(timer.current_slice(), 0);
    assert!(!timer.is_active());
}

#[test]
fn test_level_check_on_running_phase_is_noop() {
    let mut timer = SessionTimer::new(25, 5);
    timer.start(1);
    assert!(timer.check_completion().is_none());
    run_ticks(&mut timer, 59);
    assert!(timer.check_completion().is_none());
    assert_eq!(timer.current_slice(), 1);
}

#[test]
fn test_focus_rolls_into_break_capped_by_break_length() {
    // Bank of 120s, 1-minute focus, 5-minute break.
    let mut timer = SessionTimer::new(1, 5);
    timer.adjust_bank(60);
    assert_eq!(timer.total_bank(), 120);
    timer.toggle();

    let events = run_ticks(&mut timer, 60);
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::PhaseCompleted { finished, next, total_bank_secs, .. } => {
            assert_eq!(*finished, SessionMode::Focus);
            assert_eq!(*next, Some(SessionMode::Break));
            assert_eq!(*total_bank_secs, 60);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(timer.mode(), SessionMode::Break);
    assert_eq!(timer.current_slice(), 60);
    assert!(timer.is_active());
}

#[test]
fn test_depleted_bank_halts_without_switching_mode() {
    let mut timer = SessionTimer::new(1, 1);
    timer.toggle();
    let events = run_ticks(&mut timer, 60);

    assert!(matches!(
        events.as_slice(),
        [Event::PhaseCompleted { finished: SessionMode::Focus, next: None, total_bank_secs: 0, .. }]
    ));
    assert!(timer.is_depleted());
    assert!(!timer.is_active());
    assert_eq!(timer.mode(), SessionMode::Focus);

    // Nothing left to spend: the session refuses to resume.
    assert!(timer.toggle().is_none());
    assert!(!timer.is_active());
    assert!(run_ticks(&mut timer, 10).is_empty());
    assert!(timer.check_completion().is_none());
}

#[test]
fn test_topped_up_depleted_session_runs_a_fresh_phase() {
    let mut timer = SessionTimer::new(25, 5);
    timer.start_secs(2);
    run_ticks(&mut timer, 2);
    assert!(timer.is_depleted());

    assert!(timer.adjust_bank(120).is_some());
    assert!(timer.toggle().is_some());
    assert!(timer.is_active());

    let mut completions = 0;
    for _ in 0..200 {
        completions += usize::from(timer.tick().is_some());
        completions += usize::from(timer.check_completion().is_some());
    }
    assert_eq!(completions, 1);
    assert_eq!(timer.total_bank(), 0);
    assert_eq!(timer.current_slice(), 0);
    assert!(!timer.is_active());
}

#[test]
fn test_pause_freezes_remaining_seconds() {
    let mut timer = SessionTimer::new(25, 5);
    timer.start(1);
    run_ticks(&mut timer, 10);
    assert!(timer.pause().is_some());
    assert!(timer.pause().is_none());

    run_ticks(&mut timer, 1_000);
    assert_eq!(timer.current_slice(), 50);

    timer.resume();
    run_ticks(&mut timer, 1);
    assert_eq!(timer.current_slice(), 49);
}

#[test]
fn test_full_focus_session_end_to_end() {
    let mut timer = SessionTimer::new(25, 5);
    timer.start(25);
    assert_eq!(timer.total_bank(), 1500);

    let events = run_ticks(&mut timer, 1500);
    assert_eq!(events.iter().filter(|e| e.is_completion()).count(), 1);
    assert!(!timer.is_active());
    assert_eq!(timer.current_slice(), 0);
    assert_eq!(timer.total_bank(), 0);
    assert_eq!(timer.mirror_frame().remaining_formatted, "0:00");

    // A new start clears the depleted state.
    timer.start(5);
    assert_eq!(run_ticks(&mut timer, 300).len(), 1);
}

#[test]
fn test_snapshot_serializes_with_camel_case() {
    let mut timer = SessionTimer::new(25, 5);
    timer.focus_on(1715300000000);
    let json = serde_json::to_value(timer.snapshot()).unwrap();
    assert_eq!(json["totalBank"], 1500);
    assert_eq!(json["mode"], "FOCUS");
    assert_eq!(json["isActive"], false);
    assert_eq!(json["activeTask"], 1715300000000i64);
}
