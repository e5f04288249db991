//! Background keyboard listener.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use log::{info, warn};

use crate::map::{control_action, key_name, ControlAction};
use crate::state::KeyboardState;

/// How long one `poll` blocks before the stop flag is rechecked.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Owns the listener thread; dropping it stops and joins the thread.
pub struct InputCapture {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputCapture {
    /// Start listening. Movement keys go to `state`, control keys to
    /// `on_control`. The thread ends by itself after a quit key.
    pub fn spawn<F>(state: KeyboardState, mut on_control: F) -> Result<Self>
    where
        F: FnMut(ControlAction) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("tofu-byte-input".into())
            .spawn(move || {
                if let Err(err) = listen(&state, &stop_flag, &mut on_control) {
                    warn!("input thread failed: {err:#}");
                    on_control(ControlAction::Quit);
                }
            })?;
        info!("input capture started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("input thread panicked");
            }
        }
    }
}

impl Drop for InputCapture {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn listen(
    state: &KeyboardState,
    stop: &AtomicBool,
    on_control: &mut dyn FnMut(ControlAction),
) -> Result<()> {
    while !stop.load(Ordering::Acquire) {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if route_key(state, &key, on_control) == Some(ControlAction::Quit) {
                    break;
                }
            }
            Event::FocusLost => state.clear(),
            _ => {}
        }
    }
    Ok(())
}

/// Apply one key event. Returns the control action it triggered, if any.
pub fn route_key(
    state: &KeyboardState,
    key: &KeyEvent,
    on_control: &mut dyn FnMut(ControlAction),
) -> Option<ControlAction> {
    match key.kind {
        KeyEventKind::Press => {
            if let Some(action) = control_action(key) {
                on_control(action);
                return Some(action);
            }
            if let Some(name) = key_name(key) {
                state.press(&name);
            }
        }
        KeyEventKind::Repeat => {
            if let Some(name) = key_name(key) {
                state.press(&name);
            }
        }
        KeyEventKind::Release => {
            if let Some(name) = key_name(key) {
                state.release(&name);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InputFeed;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn movement_keys_update_state() {
        let state = KeyboardState::default();
        let mut actions = Vec::new();
        let mut sink = |a: ControlAction| actions.push(a);
        route_key(&state, &key(KeyCode::Left, KeyEventKind::Press), &mut sink);
        route_key(&state, &key(KeyCode::Char(' '), KeyEventKind::Press), &mut sink);
        route_key(&state, &key(KeyCode::Left, KeyEventKind::Release), &mut sink);
        let keys = state.snapshot();
        assert!(keys.contains("space"));
        assert!(!keys.contains("left"));
        assert!(actions.is_empty());
    }

    #[test]
    fn control_keys_bypass_state() {
        let state = KeyboardState::default();
        let mut actions = Vec::new();
        let mut sink = |a: ControlAction| actions.push(a);
        let routed = route_key(&state, &key(KeyCode::Char('p'), KeyEventKind::Press), &mut sink);
        assert_eq!(routed, Some(ControlAction::TogglePause));
        // Auto-repeat does not fire a control key twice.
        route_key(&state, &key(KeyCode::Char('p'), KeyEventKind::Repeat), &mut sink);
        assert_eq!(actions, vec![ControlAction::TogglePause]);
    }
}
