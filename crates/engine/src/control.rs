//! Cooperative loop control shared between the input thread and the loop.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tokio::time::{self, Duration};

#[derive(Debug, Default)]
struct Flags {
    paused: AtomicBool,
    steps: AtomicU32,
    stop: AtomicBool,
    restart: AtomicBool,
    wake: Notify,
}

/// Cheap clonable handle; every clone controls the same loop.
#[derive(Debug, Clone, Default)]
pub struct LoopControl {
    flags: Arc<Flags>,
}

impl LoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::Acquire)
    }

    pub fn set_paused(&self, paused: bool) {
        self.flags.paused.store(paused, Ordering::Release);
        self.flags.wake.notify_one();
    }

    /// Returns the new pause state.
    pub fn toggle_pause(&self) -> bool {
        let paused = !self.flags.paused.fetch_xor(true, Ordering::AcqRel);
        self.flags.wake.notify_one();
        paused
    }

    /// Queue one single step. Only honoured while paused.
    pub fn request_step(&self) {
        self.flags.steps.fetch_add(1, Ordering::AcqRel);
        self.flags.wake.notify_one();
    }

    /// Consume one queued step, if any.
    pub fn take_step(&self) -> bool {
        self.flags
            .steps
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    pub fn stop(&self) {
        self.flags.stop.store(true, Ordering::Release);
        self.flags.wake.notify_one();
    }

    pub fn should_stop(&self) -> bool {
        self.flags.stop.load(Ordering::Acquire)
    }

    pub fn request_restart(&self) {
        self.flags.restart.store(true, Ordering::Release);
        self.flags.wake.notify_one();
    }

    /// Consume a pending restart request.
    pub fn take_restart(&self) -> bool {
        self.flags.restart.swap(false, Ordering::AcqRel)
    }

    /// Sleep while paused, waking early on any control change.
    pub async fn idle(&self, poll: Duration) {
        tokio::select! {
            _ = self.flags.wake.notified() => {}
            _ = time::sleep(poll) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_reports_new_state() {
        let control = LoopControl::new();
        assert!(control.toggle_pause());
        assert!(control.is_paused());
        assert!(!control.toggle_pause());
        assert!(!control.is_paused());
    }

    #[test]
    fn steps_are_consumed_once() {
        let control = LoopControl::new();
        control.request_step();
        control.request_step();
        assert!(control.take_step());
        assert!(control.take_step());
        assert!(!control.take_step());
    }

    #[test]
    fn clones_share_state() {
        let control = LoopControl::new();
        let remote = control.clone();
        remote.request_restart();
        remote.stop();
        assert!(control.take_restart());
        assert!(!control.take_restart());
        assert!(control.should_stop());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_wakes_on_control_change() {
        let control = LoopControl::new();
        let remote = control.clone();
        let start = time::Instant::now();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(5)).await;
            remote.set_paused(false);
        });
        control.idle(Duration::from_millis(100)).await;
        assert_eq!(start.elapsed(), Duration::from_millis(5));
    }
}
