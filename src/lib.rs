//! Tofu Byte (workspace facade crate).
//!
//! Re-exports the workspace crates under short names and hosts the pieces the
//! binary wires together: argument parsing ([`cli`]) and the terminal
//! presenter plus map chain driver ([`app`]).

pub mod app;
pub mod cli;

pub use tofu_byte_core as core;
pub use tofu_byte_engine as engine;
pub use tofu_byte_input as input;
pub use tofu_byte_term as term;
pub use tofu_byte_types as types;
