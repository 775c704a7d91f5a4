//! `helm run`: the long-lived host process.
//!
//! Runs the session driver and the reminder poller on one current-thread
//! runtime and reads timer commands from stdin, one per line.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use helm_core::{
    CompletionHooks, Config, DebouncedAudio, MirrorCommand, MirrorFrame, NotificationPoller,
    NotificationSink, SessionDriver, SessionHandle, SessionTimer, Silent, SqliteStore, SystemClock,
    TimerCommand,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::host::{ChannelFocus, CommandAudio, DesktopNotifier};

#[derive(Args)]
pub struct RunArgs {
    /// Print mirror frames to stdout as JSON lines
    #[arg(long)]
    pub mirror: bool,
}

/// One parsed stdin line.
#[derive(Debug)]
enum Input {
    Timer(TimerCommand),
    Status,
    /// Re-read the config file and apply new phase lengths.
    Reload,
    Quit,
}

fn required<'a>(arg: Option<&'a str>, verb: &str, what: &str) -> Result<&'a str, String> {
    arg.ok_or_else(|| format!("usage: {verb} <{what}>"))
}

fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let input = match verb.to_ascii_lowercase().as_str() {
        "start" => {
            let minutes = required(arg, verb, "minutes")?
                .parse::<u32>()
                .map_err(|e| format!("invalid minutes: {e}"))?;
            if minutes == 0 {
                return Err("session length must be positive".into());
            }
            Input::Timer(TimerCommand::Start { minutes })
        }
        "toggle" => Input::Timer(TimerCommand::Mirror(MirrorCommand::Toggle)),
        "stop" => Input::Timer(TimerCommand::Mirror(MirrorCommand::Stop)),
        "pause" => Input::Timer(TimerCommand::Pause),
        "resume" => Input::Timer(TimerCommand::Resume),
        "reset" => Input::Timer(TimerCommand::Reset),
        "adjust" => {
            let delta_secs = required(arg, verb, "seconds")?
                .parse::<i64>()
                .map_err(|e| format!("invalid seconds: {e}"))?;
            Input::Timer(TimerCommand::AdjustBank { delta_secs })
        }
        "focus" => {
            let id = required(arg, verb, "item id")?
                .parse::<i64>()
                .map_err(|e| format!("invalid item id: {e}"))?;
            Input::Timer(TimerCommand::FocusOn(id))
        }
        "status" => Input::Status,
        "reload" => Input::Reload,
        "quit" | "exit" => Input::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(input))
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(host(config, args.mirror))
}

async fn print_status(handle: &SessionHandle) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = handle.status().await?;
    println!("{}", serde_json::to_string(&snapshot)?);
    Ok(())
}

async fn print_frames(mut frames: watch::Receiver<MirrorFrame>) {
    let mut last: Option<MirrorFrame> = None;
    while frames.changed().await.is_ok() {
        let frame = frames.borrow_and_update().clone();
        if last.as_ref() == Some(&frame) {
            continue;
        }
        match serde_json::to_string(&frame) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "mirror frame not serializable"),
        }
        last = Some(frame);
    }
}

async fn host(config: Config, mirror: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;

    let (focus, mut focus_requests) = ChannelFocus::channel();
    let focus = Arc::new(focus);
    let notifier: Arc<dyn NotificationSink> = if config.notifications.enabled {
        Arc::new(DesktopNotifier)
    } else {
        Arc::new(Silent)
    };
    let audio = DebouncedAudio::new(
        CommandAudio::new(config.notifications.custom_sound.clone()),
        Duration::from_millis(config.notifications.audio_debounce_ms),
    );

    let hooks = CompletionHooks {
        audio: Arc::new(audio),
        notifier: Arc::clone(&notifier),
        focus: focus.clone(),
    };
    let (driver, handle) = SessionDriver::new(
        SessionTimer::new(config.timer.focus_duration, config.timer.break_duration),
        hooks,
        Duration::from_millis(config.timer.tick_interval_ms),
    );
    let poller = NotificationPoller::new(store, Arc::new(SystemClock), notifier, focus)
        .with_period(Duration::from_millis(config.poller.interval_ms));

    let (shutdown, shutdown_rx) = watch::channel(false);
    let driver_task = tokio::spawn(driver.run(shutdown_rx.clone()));
    let poller_task = tokio::spawn(async move { poller.run(shutdown_rx).await });
    if mirror {
        tokio::spawn(print_frames(handle.frames()));
    }
    tracing::info!(mirror, "helm host running");

    let outcome = serve(&handle, &mut focus_requests).await;

    let _ = shutdown.send(true);
    join_logged("session driver", driver_task).await;
    join_logged("reminder poller", poller_task).await;
    outcome
}

/// Await a background task, logging a panic or cancellation.
async fn join_logged<T>(name: &str, task: JoinHandle<T>) -> Option<T> {
    match task.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(task = name, error = %e, "background task failed");
            None
        }
    }
}

/// Read stdin and focus requests until quit, Ctrl-C or an I/O error.
async fn serve(
    handle: &SessionHandle,
    focus_requests: &mut mpsc::UnboundedReceiver<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
            Some(()) = focus_requests.recv() => {
                tracing::info!("focus requested");
                print_status(handle).await?;
            }
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match parse_input(&line) {
                    Ok(Some(Input::Timer(command))) => handle.send(command).await?,
                    Ok(Some(Input::Status)) => print_status(handle).await?,
                    Ok(Some(Input::Reload)) => match Config::load() {
                        Ok(config) => {
                            handle
                                .send(TimerCommand::ApplyDurations {
                                    focus_minutes: config.timer.focus_duration,
                                    break_minutes: config.timer.break_duration,
                                })
                                .await?;
                        }
                        Err(e) => eprintln!("error: {e}"),
                    },
                    Ok(Some(Input::Quit)) => break,
                    Ok(None) => {}
                    Err(message) => eprintln!("error: {message}"),
                },
                None => {
                    tracing::debug!("stdin closed; waiting for Ctrl-C");
                    stdin_open = false;
                }
            },
        }
    }
    Ok(())
}
