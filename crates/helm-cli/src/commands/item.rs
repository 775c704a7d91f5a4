//! Task and event management commands for CLI.

use chrono::{Days, Local, NaiveDate, NaiveTime};
use clap::Subcommand;
use helm_core::calendar::serde_fmt::{parse_date, parse_time};
use helm_core::calendar::{observe_item_ids, quick_add};
use helm_core::{
    occurrences_between, CalendarItem, Config, ItemId, ItemKind, ReminderOffset, SqliteStore,
    ITEMS_KEY,
};

#[derive(Subcommand)]
pub enum ItemAction {
    /// Add a task (or an event with --event)
    Add {
        /// Title; a trailing "+project" tags the item
        text: String,
        /// Day (YYYY-MM-DD), default today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Start time (HH:MM), default 12:00
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// End time (HH:MM), events only
        #[arg(long, value_parser = parse_time)]
        end: Option<NaiveTime>,
        /// Create an event instead of a task
        #[arg(long)]
        event: bool,
        /// Repeat every week on the same weekday
        #[arg(long)]
        weekly: bool,
        /// First day of a weekly repeat (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, requires = "weekly")]
        from: Option<NaiveDate>,
        /// Last day of a weekly repeat (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, requires = "weekly")]
        until: Option<NaiveDate>,
        /// Reminder offset in minutes, or "none"; default from config
        #[arg(long)]
        remind: Option<ReminderOffset>,
    },
    /// List occurrences, day by day
    List {
        /// First day (YYYY-MM-DD), default today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Number of days to show
        #[arg(long, default_value = "1")]
        days: u64,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Mark a task done
    Done {
        /// Item ID
        id: ItemId,
    },
    /// Delete an item
    Remove {
        /// Item ID
        id: ItemId,
    },
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn run(action: ItemAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = SqliteStore::open()?;
    let mut items = db.load_items(ITEMS_KEY)?;

    match action {
        ItemAction::Add {
            text,
            date,
            time,
            end,
            event,
            weekly,
            from,
            until,
            remind,
        } => {
            observe_item_ids(&items);
            let mut item = quick_add(&text, date.unwrap_or_else(today));
            if item.title.is_empty() {
                return Err("title must not be empty".into());
            }
            if let Some(time) = time {
                item.start_time = time;
            }
            if event {
                item.kind = ItemKind::Event;
                item.end_time = end;
            }
            if weekly {
                item = item.weekly(from, until);
            }
            let offset = match remind {
                Some(offset) => offset,
                None => Config::load()?.notifications.default_reminder,
            };
            item = item.with_reminder(offset);
            item.prepare_for_save();

            let id = item.id;
            items.push(item);
            db.save_items(ITEMS_KEY, &items)?;
            println!("Item created: {id}");
        }
        ItemAction::List { date, days, json } => {
            let first = date.unwrap_or_else(today);
            let last = first
                .checked_add_days(Days::new(days.saturating_sub(1)))
                .unwrap_or(NaiveDate::MAX);
            let hits = occurrences_between(&items, first, last);
            if json {
                let rows: Vec<_> = hits
                    .iter()
                    .map(|(day, item)| serde_json::json!({ "day": day.to_string(), "item": item }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if hits.is_empty() {
                println!("nothing scheduled");
            } else {
                for (day, item) in hits {
                    println!("{}", describe(day, item));
                }
            }
        }
        ItemAction::Done { id } => {
            let item = items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| format!("item {id} not found"))?;
            if !item.is_task() {
                return Err(format!("item {id} is an event, not a task").into());
            }
            item.done = true;
            db.save_items(ITEMS_KEY, &items)?;
            println!("Item done: {id}");
        }
        ItemAction::Remove { id } => {
            let before = items.len();
            items.retain(|i| i.id != id);
            if items.len() == before {
                return Err(format!("item {id} not found").into());
            }
            db.save_items(ITEMS_KEY, &items)?;
            println!("Item removed: {id}");
        }
    }
    Ok(())
}

fn describe(day: NaiveDate, item: &CalendarItem) -> String {
    let when = match item.end_time {
        Some(end) => format!("{}-{}", item.start_time.format("%H:%M"), end.format("%H:%M")),
        None => item.start_time.format("%H:%M").to_string(),
    };
    let mark = match (item.kind, item.done) {
        (ItemKind::Event, _) => "event",
        (ItemKind::Task, true) => "done",
        (ItemKind::Task, false) => "task",
    };
    let project = item
        .project
        .as_deref()
        .map(|p| format!(" +{p}"))
        .unwrap_or_default();
    format!("{day}  {when:<11} [{mark}] {}{project}  ({})", item.title, item.id)
}
