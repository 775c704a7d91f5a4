//! Background reminder poller.
//!
//! Each pass reads the whole item list, shows one notice per due item,
//! flags those items and writes the list back in a single `set`. Passes
//! never overlap: the next one is scheduled only after the previous
//! read-evaluate-write cycle has finished.
//!
//! A failed write after notices were shown is not retried. The flags are
//! lost with it, so the same reminders fire again on the next pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;

use super::{is_due, notice_for};
use crate::clock::Clock;
use crate::events::Event;
use crate::sinks::{FocusRequest, NotificationSink};
use crate::storage::{ItemStore, ITEMS_KEY};

const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

pub struct NotificationPoller<S> {
    store: S,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink>,
    focus: Arc<dyn FocusRequest>,
    key: String,
    period: Duration,
    events: Option<broadcast::Sender<Event>>,
}

impl<S: ItemStore> NotificationPoller<S> {
    pub fn new(
        store: S,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
        focus: Arc<dyn FocusRequest>,
    ) -> Self {
        Self {
            store,
            clock,
            sink,
            focus,
            key: ITEMS_KEY.to_string(),
            period: DEFAULT_PERIOD,
            events: None,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Forward every event `run` produces to `events`.
    pub fn with_events(mut self, events: broadcast::Sender<Event>) -> Self {
        self.events = Some(events);
        self
    }

    /// One read-evaluate-write pass.
    ///
    /// Returns a `ReminderSent` per notified item, followed by
    /// `ItemsChanged` if the flagged list was persisted. A failed read
    /// yields nothing; the next pass retries.
    pub async fn poll_once(&self) -> Vec<Event> {
        let mut items = match self.store.get(&self.key).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "reminder pass skipped: store read failed");
                return Vec::new();
            }
        };

        let now = self.clock.now();
        let mut events = Vec::new();
        for item in items.iter_mut().filter(|item| is_due(item, now)) {
            let focus = Arc::clone(&self.focus);
            self.sink
                .show(&notice_for(item), Box::new(move || focus.request_focus()));
            item.has_been_notified = true;
            tracing::info!(item_id = item.id, title = %item.title, "reminder sent");
            events.push(Event::ReminderSent {
                item_id: item.id,
                title: item.title.clone(),
                at: now,
            });
        }
        tracing::debug!(due = events.len(), total = items.len(), "reminder pass");

        if events.is_empty() {
            return events;
        }

        match self.store.set(&self.key, &items).await {
            Ok(()) => events.push(Event::ItemsChanged {
                key: self.key.clone(),
                at: now,
            }),
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    notified = events.len(),
                    error = %e,
                    "reminder flags not persisted; these items will fire again next pass"
                );
            }
        }
        events
    }

    /// Poll every `period` until `shutdown` flips to `true` or its sender
    /// is dropped. The first pass runs immediately.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if *shutdown.borrow() {
            return;
        }
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(key = %self.key, period_ms = self.period.as_millis() as u64, "reminder poller started");

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    for event in self.poll_once().await {
                        if let Some(tx) = &self.events {
                            let _ = tx.send(event);
                        }
                    }
                }
            }
        }
        tracing::info!("reminder poller stopped");
    }
}
