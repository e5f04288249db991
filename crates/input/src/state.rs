//! Shared "currently pressed" key state.
//!
//! Supports terminals that do not emit key release events by using a timeout:
//! a key counts as held until its release event arrives or, when the terminal
//! never sends releases, until `release_timeout` passes without a repeat.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::debug;

use crate::core::{InputFeed, PressedKeys};
use crate::types::DEFAULT_KEY_RELEASE_TIMEOUT_MS;

#[derive(Debug, Default)]
struct Keys {
    /// Key name to the time of its last press or repeat.
    held: HashMap<String, Instant>,
    /// Set once the terminal has sent a release event.
    has_release_events: bool,
}

/// Cheap clonable handle; the capture thread writes, the loop reads.
#[derive(Debug, Clone)]
pub struct KeyboardState {
    keys: Arc<Mutex<Keys>>,
    release_timeout: Duration,
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS as u64))
    }
}

impl KeyboardState {
    pub fn new(release_timeout: Duration) -> Self {
        Self {
            keys: Arc::new(Mutex::new(Keys::default())),
            release_timeout,
        }
    }

    pub fn release_timeout(&self) -> Duration {
        self.release_timeout
    }

    fn lock(&self) -> MutexGuard<'_, Keys> {
        self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn press(&self, name: &str) {
        self.press_at(name, Instant::now());
    }

    pub fn press_at(&self, name: &str, at: Instant) {
        self.lock().held.insert(name.to_string(), at);
    }

    pub fn release(&self, name: &str) {
        let mut keys = self.lock();
        if !keys.has_release_events {
            debug!("terminal reports key releases");
            keys.has_release_events = true;
        }
        keys.held.remove(name);
    }

    pub fn clear(&self) {
        self.lock().held.clear();
    }

    pub fn has_release_events(&self) -> bool {
        self.lock().has_release_events
    }

    /// Keys held at `now`, dropping the ones that timed out.
    pub fn snapshot_at(&self, now: Instant) -> PressedKeys {
        let timeout = self.release_timeout;
        let mut keys = self.lock();
        if !keys.has_release_events {
            keys.held
                .retain(|_, pressed| now.saturating_duration_since(*pressed) <= timeout);
        }
        PressedKeys::from_keys(keys.held.keys().cloned())
    }
}

impl InputFeed for KeyboardState {
    fn snapshot(&self) -> PressedKeys {
        self.snapshot_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taps_expire_without_release_events() {
        let state = KeyboardState::new(Duration::from_millis(150));
        let t0 = Instant::now();
        state.press_at("a", t0);
        assert!(state.snapshot_at(t0 + Duration::from_millis(100)).contains("a"));
        assert!(state.snapshot_at(t0 + Duration::from_millis(151)).is_empty());
    }

    #[test]
    fn repeats_keep_a_key_held() {
        let state = KeyboardState::new(Duration::from_millis(150));
        let t0 = Instant::now();
        state.press_at("d", t0);
        state.press_at("d", t0 + Duration::from_millis(120));
        assert!(state.snapshot_at(t0 + Duration::from_millis(200)).contains("d"));
    }

    #[test]
    fn release_events_disable_the_timeout() {
        let state = KeyboardState::new(Duration::from_millis(150));
        let t0 = Instant::now();
        state.press_at("w", t0);
        state.press_at("a", t0);
        state.release("a");
        assert!(state.has_release_events());
        let keys = state.snapshot_at(t0 + Duration::from_secs(5));
        assert!(keys.contains("w"));
        assert!(!keys.contains("a"));
    }

    #[test]
    fn clones_share_keys() {
        let state = KeyboardState::default();
        let writer = state.clone();
        writer.press("space");
        assert!(state.snapshot().contains("space"));
        writer.clear();
        assert!(state.snapshot().is_empty());
    }
}
