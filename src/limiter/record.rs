//! Rate Record Module
//!
//! Per-key counter for the fixed-window rate limiter.

// == Rate Record ==
/// Request count inside the current window for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRecord {
    /// Requests counted in the current window
    pub count: u32,
    /// End of the current window (Unix milliseconds)
    pub window_reset_at: u64,
}

impl RateRecord {
    /// Creates an empty record whose window closes `window_ms` after `now_ms`.
    pub fn new(now_ms: u64, window_ms: u64) -> Self {
        Self {
            count: 0,
            window_reset_at: now_ms.saturating_add(window_ms),
        }
    }

    /// Counts one request at `now_ms`.
    ///
    /// Once the window has closed the count restarts at 1 (the current
    /// request) and a fresh window opens at `now_ms`.
    pub fn hit(&mut self, now_ms: u64, window_ms: u64) -> u32 {
        if now_ms > self.window_reset_at {
            self.count = 1;
            self.window_reset_at = now_ms.saturating_add(window_ms);
        } else {
            self.count = self.count.saturating_add(1);
        }
        self.count
    }

    /// True when the window closed more than `grace_ms` before `now_ms`.
    pub fn is_stale_at(&self, now_ms: u64, grace_ms: u64) -> bool {
        now_ms > self.window_reset_at.saturating_add(grace_ms)
    }
}
