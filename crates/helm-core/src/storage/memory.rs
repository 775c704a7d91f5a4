//! In-process item store with switchable failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::ItemStore;
use crate::calendar::CalendarItem;
use crate::error::StoreError;

#[derive(Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<String, Vec<CalendarItem>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(key: &str, items: Vec<CalendarItem>) -> Self {
        let store = Self::default();
        store.put(key, items);
        store
    }

    /// Replace a list directly, bypassing the write counter.
    pub fn put(&self, key: &str, items: Vec<CalendarItem>) {
        self.lists
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), items);
    }

    pub fn snapshot(&self, key: &str) -> Vec<CalendarItem> {
        self.lists
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ItemStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Vec<CalendarItem>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        Ok(self.snapshot(key))
    }

    async fn set(&self, key: &str, items: &[CalendarItem]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        self.put(key, items.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
