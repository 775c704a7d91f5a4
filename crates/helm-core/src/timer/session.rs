//! Session timer state machine.
//!
//! A session spends a bank of seconds across alternating FOCUS and BREAK
//! phases. The machine has no internal thread: the caller invokes `tick()`
//! once per elapsed second while the session is active.
//!
//! ## State Transitions
//!
//! ```text
//! FOCUS --slice hits 0--> BREAK --slice hits 0--> FOCUS ...
//!   any phase --slice hits 0 with bank at 0--> stopped (depleted)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new(25, 5);
//! timer.start(50);
//! // Once per second:
//! if let Some(event) = timer.tick() { /* phase completed */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::latch::CompletionLatch;
use super::mirror::{format_remaining, MirrorCommand, MirrorFrame};
use crate::calendar::ItemId;
use crate::events::Event;

/// Smallest bank `adjust_bank` will leave behind.
pub const MIN_BANK_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionMode {
    Focus,
    Break,
}

impl SessionMode {
    pub fn other(self) -> Self {
        match self {
            SessionMode::Focus => SessionMode::Break,
            SessionMode::Break => SessionMode::Focus,
        }
    }
}

/// Read-only view of the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub total_bank: u64,
    pub current_slice: u64,
    pub mode: SessionMode,
    pub is_active: bool,
    pub active_task: Option<ItemId>,
}

/// Core session state machine. The methods below are its only mutators.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    focus_secs: u64,
    break_secs: u64,
    total_bank: u64,
    current_slice: u64,
    mode: SessionMode,
    is_active: bool,
    latch: CompletionLatch,
    active_task: Option<ItemId>,
}

impl SessionTimer {
    /// Create a stopped machine at the top of a fresh FOCUS session.
    ///
    /// # Panics
    /// If either duration is zero; configuration loading rejects those.
    pub fn new(focus_minutes: u32, break_minutes: u32) -> Self {
        assert!(focus_minutes > 0, "focus duration must be positive");
        assert!(break_minutes > 0, "break duration must be positive");
        let focus_secs = u64::from(focus_minutes) * 60;
        Self {
            focus_secs,
            break_secs: u64::from(break_minutes) * 60,
            total_bank: focus_secs,
            current_slice: focus_secs,
            mode: SessionMode::Focus,
            is_active: false,
            latch: CompletionLatch::default(),
            active_task: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn total_bank(&self) -> u64 {
        self.total_bank
    }

    pub fn current_slice(&self) -> u64 {
        self.current_slice
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_depleted(&self) -> bool {
        self.total_bank == 0
    }

    pub fn active_task(&self) -> Option<ItemId> {
        self.active_task
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            total_bank: self.total_bank,
            current_slice: self.current_slice,
            mode: self.mode,
            is_active: self.is_active,
            active_task: self.active_task,
        }
    }

    pub fn mirror_frame(&self) -> MirrorFrame {
        MirrorFrame {
            remaining_formatted: format_remaining(self.current_slice),
            is_active: self.is_active,
            mode: self.mode,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new FOCUS session with a bank of `minutes`.
    pub fn start(&mut self, minutes: u32) -> Event {
        self.start_secs(u64::from(minutes) * 60)
    }

    /// Second-resolution form of [`SessionTimer::start`].
    pub fn start_secs(&mut self, secs: u64) -> Event {
        assert!(secs > 0, "session length must be positive");
        self.is_active = false;
        self.mode = SessionMode::Focus;
        self.total_bank = secs;
        self.current_slice = secs;
        self.latch.observe(self.current_slice);
        self.is_active = true;
        Event::SessionStarted {
            total_bank_secs: self.total_bank,
            at: Utc::now(),
        }
    }

    /// Flip between running and paused. Remaining seconds are untouched.
    ///
    /// A spent slice cannot be resumed: returns `None` and stays paused
    /// until `start`, `reset` or `adjust_bank` refills it.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_active {
            self.is_active = false;
            return Some(Event::SessionPaused {
                current_slice_secs: self.current_slice,
                total_bank_secs: self.total_bank,
                at: Utc::now(),
            });
        }
        if self.current_slice == 0 {
            return None;
        }
        self.is_active = true;
        Some(Event::SessionResumed {
            current_slice_secs: self.current_slice,
            total_bank_secs: self.total_bank,
            at: Utc::now(),
        })
    }

    /// Pause; a no-op when already paused.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_active {
            return None;
        }
        self.toggle()
    }

    /// Resume; a no-op when already running or when the slice is spent.
    pub fn resume(&mut self) -> Option<Event> {
        if self.is_active {
            return None;
        }
        self.toggle()
    }

    /// Grow or shrink the bank while paused, never below [`MIN_BANK_SECS`].
    ///
    /// The current slice is clipped so it never outlasts the bank. A spent
    /// slice is refilled from the new bank for the current mode, so a
    /// depleted session can be topped up and resumed. Ignored while running.
    pub fn adjust_bank(&mut self, delta_secs: i64) -> Option<Event> {
        if self.is_active {
            return None;
        }
        let bank = i64::try_from(self.total_bank)
            .unwrap_or(i64::MAX)
            .saturating_add(delta_secs)
            .max(MIN_BANK_SECS as i64);
        self.total_bank = bank as u64;
        self.current_slice = if self.current_slice == 0 {
            self.total_bank.min(self.phase_secs(self.mode))
        } else {
            self.current_slice.min(self.total_bank)
        };
        self.latch.observe(self.current_slice);
        Some(Event::BankAdjusted {
            total_bank_secs: self.total_bank,
            at: Utc::now(),
        })
    }

    /// Back to a stopped FOCUS session of the configured focus length.
    pub fn reset(&mut self) -> Event {
        self.is_active = false;
        self.mode = SessionMode::Focus;
        self.total_bank = self.focus_secs;
        self.current_slice = self.focus_secs;
        self.latch.observe(self.current_slice);
        Event::SessionReset { at: Utc::now() }
    }

    /// Attach the task being worked on; a depleted session is reset first.
    pub fn focus_on(&mut self, item: ItemId) {
        self.active_task = Some(item);
        if self.is_depleted() {
            self.reset();
        }
    }

    /// Settings changed. Future phases use the new lengths, and a paused
    /// FOCUS phase is re-seeded to the new focus length.
    pub fn apply_durations(&mut self, focus_minutes: u32, break_minutes: u32) {
        assert!(focus_minutes > 0, "focus duration must be positive");
        assert!(break_minutes > 0, "break duration must be positive");
        let focus_secs = u64::from(focus_minutes) * 60;
        self.focus_secs = focus_secs;
        self.break_secs = u64::from(break_minutes) * 60;
        if !self.is_active && self.mode == SessionMode::Focus {
            self.total_bank = focus_secs;
            self.current_slice = focus_secs;
            self.latch.observe(self.current_slice);
        }
    }

    /// Apply a command received from a mirror.
    pub fn apply_mirror(&mut self, command: MirrorCommand) -> Option<Event> {
        match command {
            MirrorCommand::Toggle => self.toggle(),
            MirrorCommand::Stop => Some(self.reset()),
        }
    }

    /// Advance one second. Returns `Some(Event::PhaseCompleted)` on the
    /// tick that takes the slice from non-zero to zero, and only then.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_active {
            return None;
        }
        let previous = self.current_slice;
        self.current_slice = previous.saturating_sub(1);
        self.total_bank = self.total_bank.saturating_sub(1);
        if previous > 0 && self.current_slice == 0 {
            return self.complete();
        }
        None
    }

    /// Level-triggered completion check for hosts that re-evaluate on every
    /// render. Guarded by the latch, so it can never complete a phase the
    /// tick edge already completed.
    pub fn check_completion(&mut self) -> Option<Event> {
        if self.is_active && self.current_slice == 0 {
            return self.complete();
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn phase_secs(&self, mode: SessionMode) -> u64 {
        match mode {
            SessionMode::Focus => self.focus_secs,
            SessionMode::Break => self.break_secs,
        }
    }

    fn complete(&mut self) -> Option<Event> {
        if !self.latch.try_engage() {
            return None;
        }
        let finished = self.mode;
        self.is_active = false;

        let next = if self.total_bank == 0 {
            None
        } else {
            let next = finished.other();
            self.mode = next;
            self.current_slice = self.total_bank.min(self.phase_secs(next));
            self.latch.observe(self.current_slice);
            self.is_active = true;
            Some(next)
        };

        Some(Event::PhaseCompleted {
            finished,
            next,
            total_bank_secs: self.total_bank,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(timer: &mut SessionTimer, n: u64) -> Vec<Event> {
        (0..n).filter_map(|_| timer.tick()).collect()
    }

    #[test]
    fn new_timer_is_stopped_at_focus_length() {
        let timer = SessionTimer::new(25, 5);
        assert_eq!(timer.total_bank(), 1500);
        assert_eq!(timer.current_slice(), 1500);
        assert_eq!(timer.mode(), SessionMode::Focus);
        assert!(!timer.is_active());
    }

    #[test]
    #[should_panic(expected = "focus duration must be positive")]
    fn zero_focus_duration_is_fatal() {
        let _ = SessionTimer::new(0, 5);
    }

    #[test]
    fn start_sets_bank_and_slice() {
        let mut timer = SessionTimer::new(25, 5);
        timer.start(50);
        assert_eq!(timer.total_bank(), 3000);
        assert_eq!(timer.current_slice(), 3000);
        assert!(timer.is_active());
    }

    #[test]
    fn ticks_do_nothing_while_paused() {
        let mut timer = SessionTimer::new(25, 5);
        timer.start(1);
        run_ticks(&mut timer, 10);
        timer.toggle();
        assert!(run_ticks(&mut timer, 500).is_empty());
        assert_eq!(timer.current_slice(), 50);
        assert_eq!(timer.total_bank(), 50);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut timer = SessionTimer::new(25, 5);
        assert!(timer.pause().is_none());
        assert!(timer.resume().is_some());
        assert!(timer.resume().is_none());
        assert!(timer.pause().is_some());
        assert!(timer.pause().is_none());
    }

    #[test]
    fn adjust_bank_only_while_paused_and_clamped() {
        let mut timer = SessionTimer::new(25, 5);
        assert!(timer.adjust_bank(600).is_some());
        assert_eq!(timer.total_bank(), 2100);

        assert!(timer.adjust_bank(-10_000).is_some());
        assert_eq!(timer.total_bank(), MIN_BANK_SECS);
        assert_eq!(timer.current_slice(), MIN_BANK_SECS);

        timer.toggle();
        assert!(timer.adjust_bank(600).is_none());
        assert_eq!(timer.total_bank(), MIN_BANK_SECS);
    }

    #[test]
    fn reset_returns_to_fresh_focus() {
        let mut timer = SessionTimer::new(25, 5);
        timer.start(3);
        run_ticks(&mut timer, 100);
        timer.reset();
        assert_eq!(timer.snapshot(), SessionSnapshot {
            total_bank: 1500,
            current_slice: 1500,
            mode: SessionMode::Focus,
            is_active: false,
            active_task: None,
        });
    }

    #[test]
    fn next_focus_phase_is_capped_by_bank() {
        let mut timer = SessionTimer::new(1, 1);
        timer.adjust_bank(120);
        timer.toggle();
        // 60s focus, 60s break, then the last 60s go to focus.
        let events = run_ticks(&mut timer, 120);
        assert_eq!(events.len(), 2);
        assert_eq!(timer.mode(), SessionMode::Focus);
        assert_eq!(timer.current_slice(), 60);
        assert_eq!(timer.total_bank(), 60);
    }

    #[test]
    fn apply_durations_reseeds_paused_focus() {
        let mut timer = SessionTimer::new(25, 5);
        timer.apply_durations(50, 10);
        assert_eq!(timer.current_slice(), 3000);

        timer.start(10);
        timer.apply_durations(30, 10);
        assert_eq!(timer.current_slice(), 600);
    }

    #[test]
    fn focus_on_resets_depleted_session() {
        let mut timer = SessionTimer::new(25, 5);
        timer.start_secs(2);
        run_ticks(&mut timer, 2);
        assert!(timer.is_depleted());

        timer.focus_on(42);
        assert_eq!(timer.active_task(), Some(42));
        assert_eq!(timer.total_bank(), 1500);
    }

    #[test]
    fn mirror_commands_map_to_toggle_and_reset() {
        let mut timer = SessionTimer::new(25, 5);
        timer.start(5);
        timer.apply_mirror(MirrorCommand::Toggle);
        assert!(!timer.is_active());
        timer.apply_mirror(MirrorCommand::Stop);
        assert_eq!(timer.total_bank(), 1500);
        assert_eq!(timer.mirror_frame().remaining_formatted, "25:00");
    }

    #[test]
    fn spent_slice_cannot_be_resumed() {
        let mut timer = SessionTimer::new(1, 1);
        timer.start_secs(2);
        run_ticks(&mut timer, 2);
        assert!(timer.toggle().is_none());
        assert!(timer.resume().is_none());
        assert!(!timer.is_active());
    }

    #[test]
    fn topping_up_refills_a_spent_slice_for_the_current_mode() {
        let mut timer = SessionTimer::new(1, 5);
        timer.start_secs(2);
        run_ticks(&mut timer, 2);
        assert!(timer.is_depleted());

        timer.adjust_bank(120);
        assert_eq!(timer.total_bank(), 120);
        assert_eq!(timer.current_slice(), 60);
        assert_eq!(timer.mode(), SessionMode::Focus);
    }
}
