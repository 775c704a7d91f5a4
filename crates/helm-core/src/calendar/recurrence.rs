//! Recurrence resolution: which items occur on which calendar day.
//!
//! Everything here is pure. Dates are compared as calendar days only;
//! time-of-day never participates. Inputs are expected to be normalised
//! already (see [`serde_fmt`](super::serde_fmt)), so nothing is parsed here.

use chrono::{Days, NaiveDate};

use super::item::{CalendarItem, DayOfWeek, Rule};

/// Does `item` produce an occurrence on `day`?
///
/// Weekly rules match on the `dayOfWeek` frozen at save time, bounded by
/// the inclusive `repeatStart`/`repeatEnd`. One-off items match their
/// `date` exactly.
pub fn occurs_on(item: &CalendarItem, day: NaiveDate) -> bool {
    match item.rule() {
        Rule::Once(date) => date == day,
        Rule::Weekly { day: weekday, starts, ends } => {
            DayOfWeek::of(day) == weekday
                && starts.map_or(true, |s| day >= s)
                && ends.map_or(true, |e| day <= e)
        }
        Rule::Unanchored => false,
    }
}

/// Items occurring on `day`, in input order.
pub fn occurrences_for(items: &[CalendarItem], day: NaiveDate) -> Vec<&CalendarItem> {
    items.iter().filter(|item| occurs_on(item, day)).collect()
}

/// Expand every day in `first..=last`, yielding `(day, item)` pairs in day order.
///
/// An inverted range yields nothing.
pub fn occurrences_between(
    items: &[CalendarItem],
    first: NaiveDate,
    last: NaiveDate,
) -> Vec<(NaiveDate, &CalendarItem)> {
    let mut out = Vec::new();
    let mut day = first;
    while day <= last {
        out.extend(occurrences_for(items, day).into_iter().map(|item| (day, item)));
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    out
}

/// A day's occurrences split for display.
#[derive(Debug, Default)]
pub struct DayAgenda<'a> {
    pub events: Vec<&'a CalendarItem>,
    /// Pending tasks first, then done ones; input order otherwise.
    pub tasks: Vec<&'a CalendarItem>,
}

pub fn agenda_for(items: &[CalendarItem], day: NaiveDate) -> DayAgenda<'_> {
    let (mut tasks, events): (Vec<_>, Vec<_>) = occurrences_for(items, day)
        .into_iter()
        .partition(|item| item.is_task());
    tasks.sort_by_key(|item| item.done);
    DayAgenda { events, tasks }
}
