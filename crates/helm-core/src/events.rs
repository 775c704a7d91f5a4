use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::ItemId;
use crate::timer::SessionMode;

/// Every state change in the scheduling core produces an Event.
/// Hosts react to them; observers may refresh on `ItemsChanged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        total_bank_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        current_slice_secs: u64,
        total_bank_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        current_slice_secs: u64,
        total_bank_secs: u64,
        at: DateTime<Utc>,
    },
    BankAdjusted {
        total_bank_secs: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    /// A phase ran out. `next` is `None` when the bank is depleted.
    PhaseCompleted {
        finished: SessionMode,
        next: Option<SessionMode>,
        total_bank_secs: u64,
        at: DateTime<Utc>,
    },
    ReminderSent {
        item_id: ItemId,
        title: String,
        at: DateTime<Utc>,
    },
    /// The persisted item list under `key` was rewritten.
    ItemsChanged {
        key: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::PhaseCompleted { .. })
    }
}
