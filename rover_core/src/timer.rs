//! Polling countdown timer on top of the shared monotonic clock.

use rover_traits::clock::Clock;
use std::sync::Arc;
use std::time::Instant;

/// Countdown that is polled rather than awaited.
///
/// The timeout is evaluated lazily in `is_timeout()` and latched once
/// reached, until the next `start()` or `restart()`.
///
/// Time is read as whole milliseconds since the timer was created, so the
/// elapsed time is the difference of two millisecond stamps.
pub struct Timer {
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    duration_ms: u32,
    started_ms: u64,
    running: bool,
    timeout: bool,
}

impl core::fmt::Debug for Timer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Timer")
            .field("duration_ms", &self.duration_ms)
            .field("running", &self.running)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Timer {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let epoch = clock.now();
        Self {
            clock,
            epoch,
            duration_ms: 0,
            started_ms: 0,
            running: false,
            timeout: false,
        }
    }

    /// Start counting down `duration_ms` from now.
    pub fn start(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
        self.restart();
    }

    /// Start again with the duration of the previous `start()`.
    pub fn restart(&mut self) {
        self.started_ms = self.now_ms();
        self.timeout = false;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.timeout = false;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// `false` while stopped; otherwise `true` once the duration has elapsed.
    pub fn is_timeout(&mut self) -> bool {
        if !self.running {
            return false;
        }
        if !self.timeout && u64::from(self.duration_ms) <= self.elapsed_ms() {
            self.timeout = true;
        }
        self.timeout
    }

    /// Milliseconds since the last start, independent of running/timeout state.
    pub fn current_duration(&self) -> u32 {
        u32::try_from(self.elapsed_ms()).unwrap_or(u32::MAX)
    }

    /// Configured duration in ms.
    pub fn duration(&self) -> u32 {
        self.duration_ms
    }

    fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    fn elapsed_ms(&self) -> u64 {
        self.now_ms().saturating_sub(self.started_ms)
    }
}
