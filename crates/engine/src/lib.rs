//! Engine crate - pacing and control of the simulation
//!
//! - [`clock`]: deadline-based frame scheduler on the tokio clock
//! - [`control`]: pause, single-step, stop and restart flags shared with input
//! - [`runner`]: the async loop driving a [`Game`](core::Game)
//! - [`perf`]: per-phase timing for the instrumented loop
//! - [`config`]: `TOFU_BYTE_*` environment configuration

pub mod clock;
pub mod config;
pub mod control;
pub mod perf;
pub mod runner;

pub use tofu_byte_core as core;
pub use tofu_byte_types as types;

pub use clock::FrameClock;
pub use config::{DebugFlags, EngineConfig};
pub use control::LoopControl;
pub use perf::{PerfProbe, PerfReport};
pub use runner::{GameLoop, LoopExit, Presenter, RunMode};
