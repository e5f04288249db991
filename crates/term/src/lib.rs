//! Terminal module - draws the scene in a real terminal
//!
//! A small, game-oriented rendering layer. The [`Display`] receives mounts
//! and frames from the simulation, [`GameView`] lays the play area and HUD out
//! in a [`FrameBuffer`], and [`TerminalRenderer`] flushes only the cells that
//! changed since the previous frame.
//!
//! Everything except [`TerminalRenderer`] is pure and can be unit-tested.

pub mod display;
pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tofu_byte_core as core;
pub use tofu_byte_types as types;

pub use display::{contact_color, Display};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, GameView, Hud, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
