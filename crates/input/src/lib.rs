//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events to lower-case key names, keeps the set of
//! currently held keys for the simulation to sample once per tick, and routes
//! control keys (quit, pause, step, restart) to the application. Terminals
//! without key-release events are handled with a release timeout.

pub mod capture;
pub mod map;
pub mod state;

pub use tofu_byte_core as core;
pub use tofu_byte_types as types;

pub use capture::{route_key, InputCapture};
pub use map::{control_action, key_name, should_quit, ControlAction};
pub use state::KeyboardState;
