mod driver;
mod latch;
mod mirror;
mod session;

pub use driver::{CompletionHooks, SessionDriver, SessionHandle, TimerCommand};
pub use latch::CompletionLatch;
pub use mirror::{format_remaining, MirrorCommand, MirrorFrame};
pub use session::{SessionMode, SessionSnapshot, SessionTimer, MIN_BANK_SECS};
