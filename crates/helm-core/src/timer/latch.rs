/// Guard letting a phase completion through at most once per zero-crossing.
///
/// Engaged when a completion is taken; released only once the slice it
/// guards has moved away from zero again (a new phase, `start`, `reset`).
/// Re-evaluating completion while the slice sits at zero is therefore
/// always a no-op, however often the host asks.
#[derive(Debug, Clone, Default)]
pub struct CompletionLatch {
    engaged: bool,
}

impl CompletionLatch {
    /// Take the latch. Returns `false` if it is already held.
    pub fn try_engage(&mut self) -> bool {
        if self.engaged {
            return false;
        }
        self.engaged = true;
        true
    }

    /// Feed the current slice; a non-zero slice releases the latch.
    pub fn observe(&mut self, current_slice: u64) {
        if current_slice > 0 {
            self.engaged = false;
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }
}
