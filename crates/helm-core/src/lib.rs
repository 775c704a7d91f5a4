//! # Helm Core Library
//!
//! The temporal scheduling core of Helm: everything that decides *when*
//! something happens, with no UI attached. Hosts (the `helm` CLI, or any
//! other shell) wire the collaborators in [`sinks`] and a store and then
//! drive the pieces below on a single async event loop.
//!
//! ## Architecture
//!
//! - **Session Timer**: a pure state machine spending a bank of seconds
//!   across alternating FOCUS/BREAK phases, plus an async driver that ticks
//!   it once per second while active
//! - **Notification Poller**: scans the persisted item list on a fixed
//!   cadence and fires each due reminder exactly once
//! - **Recurrence Resolver**: pure functions answering "does this item
//!   occur on this day"
//! - **Storage**: TOML configuration and a key-value item store (SQLite)
//!
//! ## Key Components
//!
//! - [`SessionTimer`] / [`SessionDriver`]: timer state machine and its loop
//! - [`NotificationPoller`]: reminder delivery
//! - [`occurs_on`]: recurrence evaluation
//! - [`CalendarItem`]: the persisted task/event record
//! - [`Config`]: application configuration management

pub mod calendar;
pub mod clock;
pub mod error;
pub mod events;
pub mod reminders;
pub mod sinks;
pub mod storage;
pub mod testing;
pub mod timer;

pub use calendar::{
    agenda_for, occurrences_between, occurrences_for, occurs_on, CalendarItem, DayAgenda, DayOfWeek,
    ItemId, ItemKind, ReminderOffset, Repeats,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use reminders::NotificationPoller;
pub use sinks::{AudioSink, DebouncedAudio, FocusRequest, Notice, NotificationSink, OnActivate, Silent};
pub use storage::{Config, ItemStore, MemoryStore, SqliteStore, ITEMS_KEY};
pub use timer::{
    CompletionHooks, MirrorCommand, MirrorFrame, SessionDriver, SessionHandle, SessionMode,
    SessionSnapshot, SessionTimer, TimerCommand,
};
