//! Recording doubles for the outbound collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::sinks::{AudioSink, FocusRequest, Notice, NotificationSink, OnActivate};

#[derive(Debug, Default)]
pub struct CountingAudio {
    plays: AtomicUsize,
}

impl CountingAudio {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AudioSink for CountingAudio {
    fn play(&self) {
        self.plays.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct CountingFocus {
    requests: AtomicUsize,
}

impl CountingFocus {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl FocusRequest for CountingFocus {
    fn request_focus(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Keeps every shown notice and its click handler.
#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notice>>,
    handlers: Mutex<Vec<Option<OnActivate>>>,
}

impl RecordingNotifier {
    pub fn shown(&self) -> Vec<Notice> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self) -> usize {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Simulate a click on the `index`-th notice. Returns `false` if there is
    /// no such notice or it was already clicked.
    pub fn click(&self, index: usize) -> bool {
        let handler = self
            .handlers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(index)
            .and_then(Option::take);
        match handler {
            Some(on_activate) => {
                on_activate();
                true
            }
            None => false,
        }
    }
}

impl NotificationSink for RecordingNotifier {
    fn show(&self, notice: &Notice, on_activate: OnActivate) {
        self.shown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice.clone());
        self.handlers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Some(on_activate));
    }
}
