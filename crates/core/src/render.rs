//! Render module - what the simulation hands to a presentation layer
//!
//! The core never draws. It mounts [`Drawable`]s into a [`RenderSink`] and
//! pushes a new [`Frame`] only when an entity's computed content differs from
//! the last one it produced.

use crate::entity::EntityId;
use crate::types::{Offset, Side, Size};

/// What an entity is, for styling purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Player,
    Floor,
    Hazard,
    Collectible,
    Goal,
    Light,
    Text,
    Boundary,
}

/// Rendered content of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// One string per tile row.
    pub lines: Vec<String>,
    pub role: Role,
    /// Side of the last collision this tick, for contact debugging.
    pub contact: Option<Side>,
    /// Player color phase in `[0, 1000)`; zero for everything else.
    pub tint: u16,
}

impl Frame {
    pub fn single(glyph: impl Into<String>, role: Role) -> Self {
        Self {
            lines: vec![glyph.into()],
            role,
            contact: None,
            tint: 0,
        }
    }
}

/// Draw order key. Lower layers are drawn first; ties fall back to type name
/// and then creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerKey {
    pub layer_number: i32,
    pub type_name: &'static str,
    pub id: EntityId,
}

/// Geometry and visibility of a mounted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drawable {
    pub key: LayerKey,
    pub pos: Offset,
    pub size: Size,
    pub visible: bool,
}

impl Drawable {
    pub fn id(&self) -> EntityId {
        self.key.id
    }
}

/// Receiver of drawables.
///
/// Implementations treat unknown ids as a no-op; a missing mount is a UI
/// glitch, never a simulation error.
pub trait RenderSink {
    fn mount(&mut self, drawable: Drawable);
    fn unmount(&mut self, id: EntityId);
    /// Geometry, layer or visibility of a mounted drawable changed.
    fn place(&mut self, drawable: Drawable);
    /// Recompute draw order after any layer number changed.
    fn resort_layers(&mut self);
    /// Content changed since the last frame pushed for `id`.
    fn redraw(&mut self, id: EntityId, frame: &Frame);
}

/// Sink that drops everything. Useful for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn mount(&mut self, _drawable: Drawable) {}
    fn unmount(&mut self, _id: EntityId) {}
    fn place(&mut self, _drawable: Drawable) {}
    fn resort_layers(&mut self) {}
    fn redraw(&mut self, _id: EntityId, _frame: &Frame) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_key_orders_numerically_before_type_and_id() {
        let a = LayerKey {
            layer_number: 2,
            type_name: "Floor",
            id: EntityId(1),
        };
        let b = LayerKey {
            layer_number: 10,
            type_name: "Floor",
            id: EntityId(0),
        };
        let c = LayerKey {
            layer_number: 2,
            type_name: "Star",
            id: EntityId(0),
        };
        let mut keys = vec![b, c, a];
        keys.sort();
        assert_eq!(keys, vec![a, c, b]);
    }
}
