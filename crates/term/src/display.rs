//! Display: the terminal-side [`RenderSink`].
//!
//! Keeps the latest drawable and frame for every mounted entity, in layer
//! order, and composes them into a [`FrameBuffer`] on demand. Composition is
//! pure so it can be unit-tested without a terminal.

use std::collections::HashMap;

use log::trace;

use crate::core::render::{Drawable, Frame, RenderSink, Role};
use crate::core::EntityId;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Side, DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Play-area background.
pub const PLAY_BG: Rgb = Rgb::new(14, 14, 22);

#[derive(Debug, Clone)]
struct Mounted {
    drawable: Drawable,
    frame: Option<Frame>,
}

#[derive(Debug, Clone, Default)]
pub struct Display {
    items: HashMap<EntityId, Mounted>,
    /// Mounted ids, lowest layer first.
    order: Vec<EntityId>,
    /// Color members by the side of their last collision.
    contact_dir: bool,
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contact_dir(mut self, enabled: bool) -> Self {
        self.contact_dir = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn drawable(&self, id: EntityId) -> Option<&Drawable> {
        self.items.get(&id).map(|m| &m.drawable)
    }

    pub fn frame(&self, id: EntityId) -> Option<&Frame> {
        self.items.get(&id).and_then(|m| m.frame.as_ref())
    }

    pub fn draw_order(&self) -> &[EntityId] {
        &self.order
    }

    /// Drop every mounted member.
    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    /// Draw every visible member with a frame, lowest layer first. Members
    /// are clipped to the play area, whose top-left cell lands at `origin`.
    pub fn compose(&self, fb: &mut FrameBuffer, origin: (u16, u16)) {
        for id in &self.order {
            let Some(Mounted {
                drawable,
                frame: Some(frame),
            }) = self.items.get(id)
            else {
                continue;
            };
            if !drawable.visible {
                continue;
            }
            let style = self.style_for(frame);
            for (dy, line) in frame.lines.iter().enumerate() {
                let y = drawable.pos.y + dy as i32;
                if !(0..DISPLAY_HEIGHT).contains(&y) {
                    continue;
                }
                for (dx, ch) in line.chars().enumerate() {
                    let x = drawable.pos.x + dx as i32;
                    // Spaces are transparent so lower layers show through.
                    if ch == ' ' || !(0..DISPLAY_WIDTH).contains(&x) {
                        continue;
                    }
                    fb.put_char(origin.0 + x as u16, origin.1 + y as u16, ch, style);
                }
            }
        }
    }

    fn style_for(&self, frame: &Frame) -> CellStyle {
        let base = CellStyle {
            fg: role_color(frame),
            bg: PLAY_BG,
            bold: matches!(frame.role, Role::Player | Role::Collectible | Role::Goal),
            dim: frame.role == Role::Boundary,
        };
        if !self.contact_dir {
            return base;
        }
        match frame.contact {
            Some(side) => CellStyle {
                fg: contact_color(side),
                ..base
            },
            None => base,
        }
    }
}

fn role_color(frame: &Frame) -> Rgb {
    match frame.role {
        Role::Player => Rgb::from_phase(frame.tint),
        Role::Floor => Rgb::new(200, 200, 205),
        Role::Hazard => Rgb::new(220, 80, 80),
        Role::Collectible => Rgb::new(240, 220, 80),
        Role::Goal => Rgb::new(100, 220, 120),
        Role::Light => Rgb::new(255, 200, 120),
        Role::Text => Rgb::new(170, 170, 200),
        Role::Boundary => Rgb::new(120, 60, 60),
    }
}

/// Debug palette for the side of the last collision.
pub fn contact_color(side: Side) -> Rgb {
    match side {
        Side::Bottom => Rgb::new(230, 50, 50),
        Side::Top => Rgb::new(240, 230, 60),
        Side::Right => Rgb::new(60, 220, 80),
        Side::Left => Rgb::new(70, 110, 240),
    }
}

impl RenderSink for Display {
    fn mount(&mut self, drawable: Drawable) {
        let id = drawable.id();
        let previous = self.items.insert(
            id,
            Mounted {
                drawable,
                frame: None,
            },
        );
        if previous.is_none() {
            self.order.push(id);
        }
    }

    fn unmount(&mut self, id: EntityId) {
        if self.items.remove(&id).is_some() {
            self.order.retain(|other| *other != id);
        } else {
            trace!("unmount of unknown {id:?}");
        }
    }

    fn place(&mut self, drawable: Drawable) {
        match self.items.get_mut(&drawable.id()) {
            Some(mounted) => mounted.drawable = drawable,
            None => trace!("place of unknown {:?}", drawable.id()),
        }
    }

    fn resort_layers(&mut self) {
        let items = &self.items;
        self.order.retain(|id| items.contains_key(id));
        self.order
            .sort_by_key(|id| items.get(id).map(|m| m.drawable.key));
    }

    fn redraw(&mut self, id: EntityId, frame: &Frame) {
        match self.items.get_mut(&id) {
            Some(mounted) => mounted.frame = Some(frame.clone()),
            None => trace!("redraw of unknown {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::LayerKey;
    use crate::types::{Offset, Size};

    fn drawable(id: u32, layer_number: i32, type_name: &'static str, pos: Offset) -> Drawable {
        Drawable {
            key: LayerKey {
                layer_number,
                type_name,
                id: EntityId(id),
            },
            pos,
            size: Size::new(1, 1),
            visible: true,
        }
    }

    #[test]
    fn resort_orders_by_layer_key() {
        let mut display = Display::new();
        display.mount(drawable(0, 10, "Floor", Offset::ZERO));
        display.mount(drawable(1, 2, "Star", Offset::ZERO));
        display.mount(drawable(2, 2, "Floor", Offset::ZERO));
        display.resort_layers();
        assert_eq!(
            display.draw_order(),
            &[EntityId(2), EntityId(1), EntityId(0)]
        );
    }

    #[test]
    fn higher_layer_wins_the_cell() {
        let mut display = Display::new();
        display.mount(drawable(0, 1, "Floor", Offset::new(1, 0)));
        display.mount(drawable(1, 5, "Star", Offset::new(1, 0)));
        display.resort_layers();
        display.redraw(EntityId(1), &Frame::single("*", Role::Collectible));
        display.redraw(EntityId(0), &Frame::single("▀▀", Role::Floor));

        let mut fb = FrameBuffer::new(4, 1);
        display.compose(&mut fb, (0, 0));
        assert_eq!(fb.row_string(0), " *▀ ");
    }

    #[test]
    fn hidden_and_unmounted_members_are_not_drawn() {
        let mut display = Display::new();
        display.mount(drawable(0, 1, "Star", Offset::new(0, 0)));
        display.mount(drawable(1, 1, "Star", Offset::new(1, 0)));
        display.redraw(EntityId(0), &Frame::single("*", Role::Collectible));
        display.redraw(EntityId(1), &Frame::single("*", Role::Collectible));
        let mut hidden = drawable(0, 1, "Star", Offset::new(0, 0));
        hidden.visible = false;
        display.place(hidden);
        display.unmount(EntityId(1));

        let mut fb = FrameBuffer::new(2, 1);
        display.compose(&mut fb, (0, 0));
        assert_eq!(fb.row_string(0), "  ");
        assert_eq!(display.len(), 1);
    }

    #[test]
    fn members_outside_the_play_area_are_clipped() {
        let mut display = Display::new();
        display.mount(drawable(0, 1, "Floor", Offset::new(-1, 0)));
        display.redraw(EntityId(0), &Frame::single("ab", Role::Floor));
        let mut fb = FrameBuffer::new(3, 1);
        display.compose(&mut fb, (1, 0));
        assert_eq!(fb.row_string(0), " b ");
    }

    #[test]
    fn contact_debug_recolors_by_side() {
        let mut display = Display::new().with_contact_dir(true);
        display.mount(drawable(0, 1, "Floor", Offset::ZERO));
        let mut frame = Frame::single("▀", Role::Floor);
        frame.contact = Some(Side::Left);
        display.redraw(EntityId(0), &frame);
        let mut fb = FrameBuffer::new(1, 1);
        display.compose(&mut fb, (0, 0));
        assert_eq!(fb.get(0, 0).unwrap().style.fg, contact_color(Side::Left));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut display = Display::new();
        display.redraw(EntityId(7), &Frame::single("x", Role::Text));
        display.unmount(EntityId(7));
        display.place(drawable(7, 0, "Text", Offset::ZERO));
        assert!(display.is_empty());
    }
}
