//! Outbound collaborators: desktop notices, audio, window focus.
//!
//! The core only calls these; showing a notice, playing a sound and
//! raising a window all belong to the host.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

/// Callback run when the user activates a shown notice.
pub type OnActivate = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// The notice shown when a timer phase runs out.
    pub fn session_complete() -> Self {
        Self::new("Helm", "Session Complete")
    }
}

pub trait NotificationSink: Send + Sync {
    /// Show `notice` without blocking. `on_activate` runs at most once,
    /// if and when the user clicks the notice.
    fn show(&self, notice: &Notice, on_activate: OnActivate);
}

/// "Bring the primary surface to the front." Fire and forget.
pub trait FocusRequest: Send + Sync {
    fn request_focus(&self);
}

pub trait AudioSink: Send + Sync {
    fn play(&self);
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn show(&self, notice: &Notice, on_activate: OnActivate) {
        (**self).show(notice, on_activate)
    }
}

impl<T: FocusRequest + ?Sized> FocusRequest for Arc<T> {
    fn request_focus(&self) {
        (**self).request_focus()
    }
}

impl<T: AudioSink + ?Sized> AudioSink for Arc<T> {
    fn play(&self) {
        (**self).play()
    }
}

/// Drops `play()` calls arriving within `window` of the last accepted one.
pub struct DebouncedAudio<A> {
    inner: A,
    window: Duration,
    last_played: Mutex<Option<Instant>>,
}

impl<A: AudioSink> DebouncedAudio<A> {
    pub fn new(inner: A, window: Duration) -> Self {
        Self {
            inner,
            window,
            last_played: Mutex::new(None),
        }
    }
}

impl<A: AudioSink> AudioSink for DebouncedAudio<A> {
    fn play(&self) {
        let now = Instant::now();
        let mut last = self.last_played.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(prev) = *last {
            if now.duration_since(prev) < self.window {
                tracing::debug!("audio debounced");
                return;
            }
        }
        *last = Some(now);
        drop(last);
        self.inner.play();
    }
}

/// Sinks that do nothing, for hosts without a desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl NotificationSink for Silent {
    fn show(&self, _notice: &Notice, _on_activate: OnActivate) {}
}

impl FocusRequest for Silent {
    fn request_focus(&self) {}
}

impl AudioSink for Silent {
    fn play(&self) {}
}
