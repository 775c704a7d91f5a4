//! Calendar items: tasks and events as they are persisted.
//!
//! Field names follow the stored list exactly (camelCase). Anything the
//! core does not model (colour, description, resources, ...) is kept in
//! `extra` so a read-modify-write never drops data owned by the editor.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::serde_fmt;
use crate::error::ValidationError;

/// Item identifier: milliseconds since epoch at creation, kept strictly increasing.
pub type ItemId = i64;

static LAST_ITEM_ID: AtomicI64 = AtomicI64::new(0);

/// Allocate a new item id.
///
/// Ids are wall-clock milliseconds, bumped past the last id handed out so
/// two items created within the same millisecond never collide.
pub fn next_item_id() -> ItemId {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ITEM_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_ITEM_ID.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

/// Make sure future ids sort after every id already present in `items`.
pub fn observe_item_ids(items: &[CalendarItem]) {
    if let Some(max) = items.iter().map(|i| i.id).max() {
        LAST_ITEM_ID.fetch_max(max, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeats {
    #[default]
    None,
    Weekly,
}

/// Day of week, 0 = Sunday ... 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const MONDAY: DayOfWeek = DayOfWeek(1);

    pub fn of(day: NaiveDate) -> Self {
        DayOfWeek(day.weekday().num_days_from_sunday() as u8)
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= 6 {
            Ok(DayOfWeek(value))
        } else {
            Err(ValidationError::DayOfWeek(value))
        }
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> u8 {
        day.0
    }
}

/// How long before `startTime` a reminder fires.
///
/// Stored as a string: `"none"` or a minute count (`"0"`, `"15"`, `"1440"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReminderOffset {
    #[default]
    None,
    Minutes(u32),
}

impl ReminderOffset {
    pub fn minutes(self) -> Option<u32> {
        match self {
            ReminderOffset::None => None,
            ReminderOffset::Minutes(m) => Some(m),
        }
    }
}

impl FromStr for ReminderOffset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(ReminderOffset::None);
        }
        s.parse::<u32>()
            .map(ReminderOffset::Minutes)
            .map_err(|_| ValidationError::ReminderOffset(s.to_string()))
    }
}

impl TryFrom<String> for ReminderOffset {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReminderOffset> for String {
    fn from(offset: ReminderOffset) -> String {
        offset.to_string()
    }
}

impl fmt::Display for ReminderOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderOffset::None => f.write_str("none"),
            ReminderOffset::Minutes(m) => write!(f, "{m}"),
        }
    }
}

/// The recurrence rule an item resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Occurs on exactly one calendar day.
    Once(NaiveDate),
    /// Occurs on every `day` within the optional inclusive bounds.
    Weekly {
        day: DayOfWeek,
        starts: Option<NaiveDate>,
        ends: Option<NaiveDate>,
    },
    /// No anchor at all: never occurs.
    Unanchored,
}

fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// A task or an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, with = "serde_fmt::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default = "default_start_time", with = "serde_fmt::time")]
    pub start_time: NaiveTime,
    #[serde(default, with = "serde_fmt::opt_time")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub repeats: Repeats,
    /// Frozen at save time; never re-derived from `date` by the resolver.
    #[serde(default)]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(default, with = "serde_fmt::opt_date")]
    pub repeat_start: Option<NaiveDate>,
    #[serde(default, with = "serde_fmt::opt_date")]
    pub repeat_end: Option<NaiveDate>,
    #[serde(default)]
    pub notification_offset: ReminderOffset,
    #[serde(default)]
    pub notify_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub has_been_notified: bool,
    #[serde(default)]
    pub done: bool,
    /// Editor-owned fields carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CalendarItem {
    fn blank(kind: ItemKind, title: impl Into<String>, date: NaiveDate, start_time: NaiveTime) -> Self {
        Self {
            id: next_item_id(),
            kind,
            title: title.into(),
            project: None,
            date: Some(date),
            start_time,
            end_time: None,
            repeats: Repeats::None,
            day_of_week: Some(DayOfWeek::of(date)),
            repeat_start: None,
            repeat_end: None,
            notification_offset: ReminderOffset::None,
            notify_at: None,
            has_been_notified: false,
            done: false,
            extra: serde_json::Map::new(),
        }
    }

    pub fn task(title: impl Into<String>, date: NaiveDate, start_time: NaiveTime) -> Self {
        Self::blank(ItemKind::Task, title, date, start_time)
    }

    pub fn event(
        title: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: Option<NaiveTime>,
    ) -> Self {
        let mut item = Self::blank(ItemKind::Event, title, date, start_time);
        item.end_time = end_time;
        item
    }

    /// Turn this item into a weekly rule anchored on its date's weekday.
    pub fn weekly(mut self, starts: Option<NaiveDate>, ends: Option<NaiveDate>) -> Self {
        self.repeats = Repeats::Weekly;
        self.repeat_start = starts;
        self.repeat_end = ends;
        self.day_of_week = self.date.map(DayOfWeek::of);
        self
    }

    pub fn with_reminder(mut self, offset: ReminderOffset) -> Self {
        self.notification_offset = offset;
        self
    }

    pub fn is_task(&self) -> bool {
        self.kind == ItemKind::Task
    }

    pub fn rule(&self) -> Rule {
        match (self.repeats, self.day_of_week, self.date) {
            (Repeats::Weekly, Some(day), _) => Rule::Weekly {
                day,
                starts: self.repeat_start,
                ends: self.repeat_end,
            },
            (Repeats::Weekly, None, _) => Rule::Unanchored,
            (Repeats::None, _, Some(date)) => Rule::Once(date),
            (Repeats::None, _, None) => Rule::Unanchored,
        }
    }

    /// Editor contract, applied on every save in the local timezone.
    ///
    /// See [`CalendarItem::prepare_for_save_in`].
    pub fn prepare_for_save(&mut self) {
        self.prepare_for_save_in(&Local);
    }

    /// Editor contract: derive `dayOfWeek` from `date`, drop `endTime` on
    /// tasks, recompute `notifyAt` from the offset and clear the
    /// notified flag so an edited reminder can fire again.
    pub fn prepare_for_save_in<Tz: TimeZone>(&mut self, tz: &Tz) {
        if let Some(date) = self.date {
            self.day_of_week = Some(DayOfWeek::of(date));
        }
        if self.is_task() {
            self.end_time = None;
        }
        self.notify_at = self
            .date
            .and_then(|date| reminder_instant(tz, date, self.start_time, self.notification_offset));
        self.has_been_notified = false;
    }
}

/// Absolute instant a reminder fires: local `date`+`start` minus the offset.
///
/// Returns `None` when no reminder is configured or the wall-clock time
/// does not exist in `tz` (DST gap).
pub fn reminder_instant<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    start: NaiveTime,
    offset: ReminderOffset,
) -> Option<DateTime<Utc>> {
    let minutes = offset.minutes()?;
    let start_at = tz.from_local_datetime(&date.and_time(start)).earliest()?;
    Some((start_at - Duration::minutes(i64::from(minutes))).with_timezone(&Utc))
}

/// Split quick-add text: `"Buy milk +personal"` -> (`"Buy milk"`, `Some("PERSONAL")`).
pub fn parse_quick_add(text: &str) -> (String, Option<String>) {
    match text.split_once('+') {
        Some((title, project)) => {
            let project = project.trim().to_uppercase();
            let project = (!project.is_empty()).then_some(project);
            (title.trim().to_string(), project)
        }
        None => (text.trim().to_string(), None),
    }
}

/// Build a task from quick-add text, placed at noon on `day`.
pub fn quick_add(text: &str, day: NaiveDate) -> CalendarItem {
    let (title, project) = parse_quick_add(text);
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
    let mut item = CalendarItem::task(title, day, noon);
    item.project = project;
    item
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let a = next_item_id();
        let b = next_item_id();
        let c = next_item_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn observed_ids_push_the_generator_forward() {
        let mut item = CalendarItem::task("far future", ymd(2024, 1, 1), hm(9, 0));
        item.id = i64::MAX / 2;
        observe_item_ids(std::slice::from_ref(&item));
        assert!(next_item_id() > i64::MAX / 2);
    }

    #[test]
    fn decodes_editor_written_item() {
        let json = r#"{
            "id": 1715300000000,
            "type": "event",
            "title": "Database Systems",
            "date": "2024-03-04",
            "startTime": "09:00",
            "endTime": "12:00",
            "repeats": "weekly",
            "dayOfWeek": 1,
            "repeatStart": "2024-03-01",
            "repeatEnd": "",
            "notificationOffset": "15",
            "notifyAt": null,
            "hasBeenNotified": false,
            "color": "green",
            "resources": []
        }"#;
        let item: CalendarItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, ItemKind::Event);
        assert_eq!(item.day_of_week, Some(DayOfWeek::MONDAY));
        assert_eq!(item.repeat_start, Some(ymd(2024, 3, 1)));
        assert_eq!(item.repeat_end, None);
        assert_eq!(item.notification_offset, ReminderOffset::Minutes(15));
        assert_eq!(item.extra.get("color"), Some(&serde_json::json!("green")));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["startTime"], "09:00");
        assert_eq!(back["dayOfWeek"], 1);
        assert_eq!(back["resources"], serde_json::json!([]));
    }

    #[test]
    fn rejects_day_of_week_out_of_range() {
        let json = r#"{"id": 1, "type": "event", "startTime": "09:00", "repeats": "weekly", "dayOfWeek": 7}"#;
        assert!(serde_json::from_str::<CalendarItem>(json).is_err());
    }

    #[test]
    fn prepare_for_save_computes_reminder_and_resets_flag() {
        let mut item = CalendarItem::task("Standup", ymd(2024, 5, 10), hm(9, 30))
            .with_reminder(ReminderOffset::Minutes(15));
        item.end_time = Some(hm(10, 0));
        item.has_been_notified = true;

        item.prepare_for_save_in(&Utc);

        assert_eq!(item.end_time, None);
        assert!(!item.has_been_notified);
        assert_eq!(
            item.notify_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 9, 15, 0).unwrap())
        );
        assert_eq!(item.day_of_week, Some(DayOfWeek::of(ymd(2024, 5, 10))));
    }

    #[test]
    fn prepare_for_save_without_offset_clears_reminder() {
        let mut item = CalendarItem::event("Lunch", ymd(2024, 5, 10), hm(12, 0), Some(hm(13, 0)));
        item.notify_at = Some(Utc::now());
        item.prepare_for_save_in(&Utc);
        assert_eq!(item.notify_at, None);
        assert_eq!(item.end_time, Some(hm(13, 0)));
    }

    #[test]
    fn day_before_offset_crosses_midnight() {
        let at = reminder_instant(&Utc, ymd(2024, 3, 1), hm(8, 0), ReminderOffset::Minutes(1440));
        assert_eq!(at, Some(Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap()));
    }

    #[test]
    fn quick_add_extracts_project() {
        assert_eq!(
            parse_quick_add("Buy Milk +personal"),
            ("Buy Milk".to_string(), Some("PERSONAL".to_string()))
        );
        assert_eq!(parse_quick_add("  plain  "), ("plain".to_string(), None));

        let item = quick_add("Write report +work", ymd(2024, 5, 10));
        assert!(item.is_task());
        assert_eq!(item.start_time, hm(12, 0));
        assert_eq!(item.project.as_deref(), Some("WORK"));
    }

    #[test]
    fn reminder_offset_strings() {
        assert_eq!("none".parse::<ReminderOffset>().unwrap(), ReminderOffset::None);
        assert_eq!("60".parse::<ReminderOffset>().unwrap(), ReminderOffset::Minutes(60));
        assert!("soon".parse::<ReminderOffset>().is_err());
        assert_eq!(ReminderOffset::Minutes(5).to_string(), "5");
    }
}
