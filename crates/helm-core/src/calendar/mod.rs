mod item;
mod recurrence;
pub mod serde_fmt;

pub use item::{
    next_item_id, observe_item_ids, parse_quick_add, quick_add, reminder_instant, CalendarItem,
    DayOfWeek, ItemId, ItemKind, ReminderOffset, Repeats, Rule,
};
pub use recurrence::{agenda_for, occurrences_between, occurrences_for, occurs_on, DayAgenda};
