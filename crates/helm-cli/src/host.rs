//! Desktop collaborators wired into the core by the `helm` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use helm_core::{AudioSink, FocusRequest, Notice, NotificationSink, OnActivate};
use notify_rust::Notification;
use tokio::sync::mpsc;

const APP_NAME: &str = "Helm";

const SOUND_CANDIDATES: [(&str, &str); 3] = [
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Desktop notifications through the platform notification server.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl NotificationSink for DesktopNotifier {
    fn show(&self, notice: &Notice, on_activate: OnActivate) {
        let mut notification = Notification::new();
        notification
            .summary(&notice.title)
            .body(&notice.body)
            .appname(APP_NAME)
            .icon("alarm-clock");

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            notification.action("default", "Open");
            let shown = present(
                || notification.show(),
                move |handle| {
                    handle.wait_for_action(|action| {
                        if action == "default" {
                            on_activate();
                        }
                    })
                },
            );
            if let Err(e) = shown {
                tracing::warn!(error = %e, title = %notice.title, "notification failed");
            }
        }

        #[cfg(not(all(unix, not(target_os = "macos"))))]
        {
            drop(on_activate);
            if let Err(e) = notification.show() {
                tracing::warn!(error = %e, title = %notice.title, "notification failed");
            }
        }
    }
}

/// Show synchronously, then hand the handle to `wait` on its own thread.
///
/// The notice has reached the server when this returns, so a short-lived
/// process can exit right after without losing it. Only the wait for a
/// click outlives the call.
#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
fn present<H, E>(
    show: impl FnOnce() -> Result<H, E>,
    wait: impl FnOnce(H) + Send + 'static,
) -> Result<(), E>
where
    H: Send + 'static,
{
    let handle = show()?;
    std::thread::spawn(move || wait(handle));
    Ok(())
}

/// Plays a sound file through `paplay`/`aplay` without waiting for it.
#[derive(Debug, Clone, Default)]
pub struct CommandAudio {
    custom_sound: Option<PathBuf>,
}

impl CommandAudio {
    pub fn new(custom_sound: Option<String>) -> Self {
        Self {
            custom_sound: custom_sound.map(PathBuf::from),
        }
    }

    fn pick(&self) -> Option<(&'static str, PathBuf)> {
        if let Some(path) = &self.custom_sound {
            if path.exists() {
                return Some(("paplay", path.clone()));
            }
            tracing::warn!(path = %path.display(), "custom sound not found, using default");
        }
        SOUND_CANDIDATES
            .iter()
            .find(|(_, file)| Path::new(file).exists())
            .map(|(cmd, file)| (*cmd, PathBuf::from(file)))
    }
}

impl AudioSink for CommandAudio {
    fn play(&self) {
        let Some((cmd, file)) = self.pick() else {
            tracing::debug!("no sound file available");
            return;
        };
        let spawned = Command::new(cmd)
            .arg(&file)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if let Err(e) = spawned {
            tracing::warn!(command = cmd, error = %e, "sound player failed to start");
        }
    }
}

/// Forwards focus requests to the host loop.
#[derive(Debug, Clone)]
pub struct ChannelFocus {
    tx: mpsc::UnboundedSender<()>,
}

impl ChannelFocus {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FocusRequest for ChannelFocus {
    fn request_focus(&self) {
        let _ = self.tx.send(());
    }
}

/// For one-shot commands with no surface to raise.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFocus;

impl FocusRequest for LogFocus {
    fn request_focus(&self) {
        tracing::info!("focus requested");
    }
}
