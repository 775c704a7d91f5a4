//! Async host loop around [`SessionTimer`].
//!
//! The driver owns the machine and is its only caller. Commands arrive on
//! an mpsc channel and are applied before any pending tick, so a pause
//! issued mid-second is never overtaken by a stale tick. The one-second
//! ticker exists only while the session is active and is re-armed from
//! scratch on every activation and on every `Start`.
//!
//! ```text
//!  SessionHandle ──TimerCommand──▶ SessionDriver ──MirrorFrame──▶ watch
//!                                        │
//!                                        ├──Event──▶ broadcast
//!                                        └──PhaseCompleted──▶ audio + notice
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Instant, Interval};

use super::mirror::{MirrorCommand, MirrorFrame};
use super::session::{SessionSnapshot, SessionTimer};
use crate::calendar::ItemId;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::sinks::{AudioSink, FocusRequest, Notice, NotificationSink};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

#[derive(Debug)]
pub enum TimerCommand {
    Start { minutes: u32 },
    Toggle,
    Pause,
    Resume,
    AdjustBank { delta_secs: i64 },
    Reset,
    FocusOn(ItemId),
    Mirror(MirrorCommand),
    ApplyDurations { focus_minutes: u32, break_minutes: u32 },
    Status(oneshot::Sender<SessionSnapshot>),
}

/// Side effects fired once per completed phase.
#[derive(Clone)]
pub struct CompletionHooks {
    pub audio: Arc<dyn AudioSink>,
    pub notifier: Arc<dyn NotificationSink>,
    pub focus: Arc<dyn FocusRequest>,
}

impl CompletionHooks {
    fn fire(&self) {
        self.audio.play();
        let focus = Arc::clone(&self.focus);
        self.notifier
            .show(&Notice::session_complete(), Box::new(move || focus.request_focus()));
    }
}

/// Cheap, cloneable front door to a running driver.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<TimerCommand>,
    frames: watch::Receiver<MirrorFrame>,
    events: broadcast::Sender<Event>,
}

impl SessionHandle {
    /// # Errors
    /// `CoreError::DriverStopped` once the driver loop has exited.
    pub async fn send(&self, command: TimerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::DriverStopped)
    }

    /// Snapshot taken after every command queued before this one.
    pub async fn status(&self) -> Result<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(TimerCommand::Status(tx)).await?;
        rx.await.map_err(|_| CoreError::DriverStopped)
    }

    /// Latest mirror frame; updated at tick resolution.
    pub fn frames(&self) -> watch::Receiver<MirrorFrame> {
        self.frames.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

pub struct SessionDriver {
    timer: SessionTimer,
    hooks: CompletionHooks,
    period: Duration,
    commands: mpsc::Receiver<TimerCommand>,
    frames: watch::Sender<MirrorFrame>,
    events: broadcast::Sender<Event>,
}

impl SessionDriver {
    pub fn new(timer: SessionTimer, hooks: CompletionHooks, period: Duration) -> (Self, SessionHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (frame_tx, frame_rx) = watch::channel(timer.mirror_frame());
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        let handle = SessionHandle {
            commands: cmd_tx,
            frames: frame_rx,
            events: event_tx.clone(),
        };
        let driver = Self {
            timer,
            hooks,
            period,
            commands: cmd_rx,
            frames: frame_tx,
            events: event_tx,
        };
        (driver, handle)
    }

    /// Run until `shutdown` flips to `true` (or its sender is dropped) or
    /// every handle is gone. Returns the machine in its final state.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> SessionTimer {
        if *shutdown.borrow() {
            return self.timer;
        }
        let mut ticker = None;
        self.sync_ticker(&mut ticker);

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                command = self.commands.recv() => match command {
                    Some(command) => {
                        if self.handle(command) {
                            ticker = None;
                        }
                    }
                    None => break,
                },
                _ = next_tick(&mut ticker) => {
                    let event = self.timer.tick().or_else(|| self.timer.check_completion());
                    if let Some(event) = event {
                        self.emit(event);
                    }
                }
            }
            self.sync_ticker(&mut ticker);
            self.frames.send_replace(self.timer.mirror_frame());
        }

        tracing::debug!("session driver stopped");
        self.timer
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply one command. Returns `true` when a new countdown began and
    /// the ticker must restart from a full period.
    fn handle(&mut self, command: TimerCommand) -> bool {
        let restarted = matches!(&command, TimerCommand::Start { minutes } if *minutes > 0);
        let event = match command {
            TimerCommand::Start { minutes: 0 } => {
                tracing::warn!("ignoring start with a zero-minute bank");
                None
            }
            TimerCommand::Start { minutes } => Some(self.timer.start(minutes)),
            TimerCommand::Toggle => self.timer.toggle(),
            TimerCommand::Pause => self.timer.pause(),
            TimerCommand::Resume => self.timer.resume(),
            TimerCommand::AdjustBank { delta_secs } => self.timer.adjust_bank(delta_secs),
            TimerCommand::Reset => Some(self.timer.reset()),
            TimerCommand::FocusOn(item) => {
                self.timer.focus_on(item);
                None
            }
            TimerCommand::Mirror(command) => self.timer.apply_mirror(command),
            TimerCommand::ApplyDurations {
                focus_minutes,
                break_minutes,
            } => {
                if focus_minutes == 0 || break_minutes == 0 {
                    tracing::warn!(focus_minutes, break_minutes, "ignoring non-positive durations");
                } else {
                    self.timer.apply_durations(focus_minutes, break_minutes);
                }
                None
            }
            TimerCommand::Status(reply) => {
                let _ = reply.send(self.timer.snapshot());
                None
            }
        };
        if let Some(event) = event {
            self.emit(event);
        }
        restarted
    }

    fn emit(&self, event: Event) {
        if let Event::PhaseCompleted { finished, next, total_bank_secs, .. } = &event {
            tracing::info!(?finished, ?next, total_bank_secs, "phase completed");
            self.hooks.fire();
        } else {
            tracing::debug!(?event, "session event");
        }
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn sync_ticker(&self, ticker: &mut Option<Interval>) {
        match (self.timer.is_active(), ticker.is_some()) {
            (true, false) => {
                *ticker = Some(tokio::time::interval_at(Instant::now() + self.period, self.period));
            }
            (false, true) => *ticker = None,
            _ => {}
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
