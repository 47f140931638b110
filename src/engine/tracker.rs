use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

struct TrackerState {
    errors: usize,
    last_reset: Instant,
    backoff: bool,
}

/// Rate limiter for error escalation: a fixed-window counter with a backoff
/// latch. Keeps persistent failures (a dead controller, an unplugged cable)
/// from turning into log storms.
pub struct ErrorTracker {
    state: Mutex<TrackerState>,
    window: Duration,
    max_errors: usize,
}

impl ErrorTracker {
    pub fn new(window: Duration, max_errors: usize) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                errors: 0,
                last_reset: Instant::now(),
                backoff: false,
            }),
            window,
            max_errors,
        }
    }

    /// Record one error. Returns the latch state after accounting: `true`
    /// means the caller should throttle.
    pub fn track_error(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        if now.duration_since(state.last_reset) > self.window {
            state.errors = 0;
            state.last_reset = now;
            state.backoff = false;
        }

        state.errors += 1;

        if state.errors >= self.max_errors && !state.backoff {
            state.backoff = true;
            return true;
        }

        state.backoff
    }

    /// Manually clear the window and latch.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.errors = 0;
        state.last_reset = Instant::now();
        state.backoff = false;
    }

    /// Non-mutating read of the latch.
    pub fn in_backoff(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .backoff
    }
}
