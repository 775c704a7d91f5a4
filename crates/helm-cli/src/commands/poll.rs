//! `helm poll`: one reminder pass, for cron-style use.

use std::sync::Arc;

use helm_core::{Config, NotificationPoller, NotificationSink, Silent, SqliteStore, SystemClock};

use crate::host::{DesktopNotifier, LogFocus};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = SqliteStore::open()?;
    let notifier: Arc<dyn NotificationSink> = if config.notifications.enabled {
        Arc::new(DesktopNotifier)
    } else {
        Arc::new(Silent)
    };
    let poller = NotificationPoller::new(store, Arc::new(SystemClock), notifier, Arc::new(LogFocus));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let events = runtime.block_on(poller.poll_once());
    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
