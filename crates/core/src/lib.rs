//! Core game logic module - pure, deterministic, and testable
//!
//! This crate holds the whole simulation of the platformer: the player state
//! machine, the tile collision engine, the map format and the per-tick scene
//! pipeline. It never touches a terminal; rendering goes through the
//! [`RenderSink`](render::RenderSink) trait and input comes in as an
//! [`InputSource`](input::InputSource).
//!
//! # Module Structure
//!
//! - [`faze`]: frame counter to animation glyph mapping
//! - [`player`]: the player entity and its state machine
//! - [`entity`]: map objects (floor, spikes, stars, ...) and their reactions
//! - [`collision`]: axis-separated tile probing
//! - [`scene`]: live entity set and the ordered tick phases
//! - [`map`]: JSON descriptors, the type registry and map chains
//! - [`stats`]: points, life points and play time
//! - [`game`]: lifecycle around a scene
//! - [`editor`]: direct manipulation of a map in edit mode
//! - [`rng`]: seeded LCG for cosmetic randomness
//!
//! # Example
//!
//! ```
//! use tofu_byte_core::map::{create_empty_map, MapData};
//! use tofu_byte_core::render::NullSink;
//! use tofu_byte_core::{Game, PressedKeys};
//!
//! let desc = create_empty_map("demo", &[]);
//! let map = MapData::from_descriptor(&desc, "demo").unwrap();
//!
//! let mut game = Game::new(12345);
//! game.load(map, &mut NullSink).unwrap();
//! game.start();
//!
//! let keys = PressedKeys::from_keys(["d"]);
//! game.tick(&keys, &mut NullSink);
//! assert_eq!(game.scoreboard().timer.ticks(), 1);
//! ```
//!
//! # Timing
//!
//! One call to [`Game::tick`] is one simulation step at
//! [`TARGET_FPS`](types::TARGET_FPS). The core has no clock of its own; the
//! engine crate paces ticks.

pub mod collision;
pub mod editor;
pub mod entity;
pub mod faze;
pub mod game;
pub mod input;
pub mod map;
pub mod player;
pub mod render;
pub mod rng;
pub mod scene;
pub mod stats;

pub use tofu_byte_types as types;

// Re-export commonly used types for convenience
pub use collision::{CollisionEngine, CollisionEvent};
pub use editor::Editor;
pub use entity::{Entity, EntityId, EntityKind, ObjectSpec, SpikeFacing};
pub use faze::Faze;
pub use game::{Game, GameSummary, Lifecycle};
pub use input::{InputFeed, InputSource, KeyBindings, PressedKeys};
pub use map::{load_map, MapChain, MapData, MapDescriptor, MapError};
pub use player::{Player, State, StateId, StateKind};
pub use render::{Drawable, Frame, LayerKey, RenderSink, Role};
pub use rng::SimpleRng;
pub use scene::{Scene, TickPhase};
pub use stats::{PlayTimer, PointSystem, Scoreboard};
