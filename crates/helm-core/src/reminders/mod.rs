//! Reminder evaluation and the background poller that delivers them.

mod poller;

pub use poller::NotificationPoller;

use chrono::{DateTime, Utc};

use crate::calendar::CalendarItem;
use crate::sinks::Notice;

/// Is `item`'s reminder due at `now`?
///
/// Requires `notifyAt` to be set and reached, the item not yet notified,
/// and, for tasks, not done. Events ignore `done`.
pub fn is_due(item: &CalendarItem, now: DateTime<Utc>) -> bool {
    let Some(notify_at) = item.notify_at else {
        return false;
    };
    !item.has_been_notified && !(item.is_task() && item.done) && now >= notify_at
}

/// Text shown for an item's reminder.
pub fn notice_for(item: &CalendarItem) -> Notice {
    let title = if item.title.trim().is_empty() {
        "Helm".to_string()
    } else {
        item.title.clone()
    };
    let at = item.start_time.format("%H:%M");
    let body = if item.is_task() {
        format!("Task due at {at}")
    } else {
        format!("Event at {at}")
    };
    Notice::new(title, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime, TimeZone};

    fn base() -> CalendarItem {
        let mut item = CalendarItem::task(
            "Standup",
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        );
        item.notify_at = Some(Utc.with_ymd_and_hms(2024, 5, 10, 9, 15, 0).unwrap());
        item
    }

    #[test]
    fn due_exactly_at_notify_at() {
        let item = base();
        let at = item.notify_at.unwrap();
        assert!(!is_due(&item, at - Duration::seconds(1)));
        assert!(is_due(&item, at));
        assert!(is_due(&item, at + Duration::days(3)));
    }

    #[test]
    fn flagged_done_or_unset_is_never_due() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let mut notified = base();
        notified.has_been_notified = true;
        assert!(!is_due(&notified, now));

        let mut done = base();
        done.done = true;
        assert!(!is_due(&done, now));

        let mut unset = base();
        unset.notify_at = None;
        assert!(!is_due(&unset, now));
    }

    #[test]
    fn done_flag_is_ignored_for_events() {
        let mut event = base();
        event.kind = crate::calendar::ItemKind::Event;
        event.done = true;
        assert!(is_due(&event, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn notice_text() {
        let task = base();
        assert_eq!(notice_for(&task), Notice::new("Standup", "Task due at 09:30"));

        let mut event = base();
        event.kind = crate::calendar::ItemKind::Event;
        event.title = "  ".into();
        assert_eq!(notice_for(&event), Notice::new("Helm", "Event at 09:30"));
    }
}
