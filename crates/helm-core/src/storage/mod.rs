mod config;
pub mod database;
pub mod memory;

pub use config::{Config, NotificationsConfig, PollerConfig, TimerSettings};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use crate::calendar::CalendarItem;
use crate::error::StoreError;

/// Namespace the item list lives under.
pub const ITEMS_KEY: &str = "tasks";

/// Key-value store holding whole item lists.
///
/// A missing key reads as an empty list. `set` replaces the list in one
/// write; implementations must make that write all-or-nothing.
pub trait ItemStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Vec<CalendarItem>, StoreError>> + Send;

    fn set(
        &self,
        key: &str,
        items: &[CalendarItem],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<S: ItemStore> ItemStore for Arc<S> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Vec<CalendarItem>, StoreError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &str,
        items: &[CalendarItem],
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).set(key, items)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `HELM_DATA_DIR` wins when set; otherwise `~/.config/helm`, or
/// `~/.config/helm-dev` with `HELM_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("HELM_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HELM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("helm-dev")
            } else {
                base_dir.join("helm")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
