//! Fixed-rate frame pacing on the tokio clock.

use log::debug;
use tokio::time::{self, Duration, Instant};

/// Deadline-based frame scheduler.
///
/// Deadlines advance by exactly one interval, so short sleeps do not drift.
/// When a frame overruns its deadline the next one starts immediately and the
/// schedule restarts from now; missed frames are dropped, not replayed.
#[derive(Debug)]
pub struct FrameClock {
    interval: Duration,
    next: Instant,
    frames: u64,
    overruns: u64,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now() + interval,
            frames: 0,
            overruns: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Wait for the next frame deadline.
    pub async fn tick(&mut self) {
        let now = Instant::now();
        if now < self.next {
            time::sleep_until(self.next).await;
            self.next += self.interval;
        } else {
            self.overruns += 1;
            debug!(
                "frame {} overran by {:?}",
                self.frames,
                now.duration_since(self.next)
            );
            self.next = now + self.interval;
        }
        self.frames += 1;
    }

    /// Restart the schedule from now, e.g. after a pause.
    pub fn rebase(&mut self) {
        self.next = Instant::now() + self.interval;
    }
}
