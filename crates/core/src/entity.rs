//! Entity module - static map objects and their capabilities
//!
//! Every object kind a map can contain is a variant of [`EntityKind`]. The
//! shared behavior (`occupies_tile`, `blocks_movement`, `on_collision`,
//! `render`, record conversion) dispatches on that tag, so adding a kind means
//! one new arm per capability and one registry entry in [`crate::map`].

use std::fmt;

use serde_json::{Map, Value};

use crate::collision::CollisionEvent;
use crate::faze::Faze;
use crate::map::ObjectRecord;
use crate::player::Player;
use crate::render::{Drawable, Frame, LayerKey, Role};
use crate::rng::SimpleRng;
use crate::types::{GameEvent, Offset, Rect, Side, Size, DEFAULT_LAYER_NUMBER};

const STAR_FRAMES: &[&str] = &["▪", "◆"];
const END_BALL_FRAMES: &[&str] = &["🬖🬅", "🬋🬋", "🬈🬢", "🬉🬓", "🬦🬄"];
const LIGHT_FRAMES: &[&str] = &["🬷", "🬳", "🬯", "🬶", "🬲", "🬮", "▟"];
const LIGHT_BASE: &str = "🬗";

/// Stable identity of a scene member, assigned in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which way a spike row points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpikeFacing {
    Up,
    Down,
}

/// Closed set of map object kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Floor,
    Spikes(SpikeFacing),
    Light,
    Star,
    EndBall,
    Text(String),
    KillingBoundary,
}

impl EntityKind {
    pub const FLOOR: &'static str = "Floor";
    pub const SPIKES: &'static str = "Spikes";
    pub const SPIKES_DOWN: &'static str = "SpikesDown";
    pub const LIGHT: &'static str = "Light";
    pub const STAR: &'static str = "Star";
    pub const END_BALL: &'static str = "EndBall";
    pub const TEXT: &'static str = "Text";
    /// Tag as spelled in existing map files.
    pub const KILLING_BOUNDARY: &'static str = "KillingBondary";

    pub fn type_name(&self) -> &'static str {
        match self {
            EntityKind::Floor => Self::FLOOR,
            EntityKind::Spikes(SpikeFacing::Up) => Self::SPIKES,
            EntityKind::Spikes(SpikeFacing::Down) => Self::SPIKES_DOWN,
            EntityKind::Light => Self::LIGHT,
            EntityKind::Star => Self::STAR,
            EntityKind::EndBall => Self::END_BALL,
            EntityKind::Text(_) => Self::TEXT,
            EntityKind::KillingBoundary => Self::KILLING_BOUNDARY,
        }
    }

    /// Physically obstructs movement.
    pub fn blocks(&self) -> bool {
        matches!(
            self,
            EntityKind::Floor | EntityKind::Spikes(_) | EntityKind::KillingBoundary
        )
    }

    /// Fires `on_collision` on overlap.
    pub fn triggers(&self) -> bool {
        matches!(
            self,
            EntityKind::Floor
                | EntityKind::Spikes(_)
                | EntityKind::Star
                | EntityKind::EndBall
                | EntityKind::KillingBoundary
        )
    }

    pub fn resizable(&self) -> bool {
        matches!(
            self,
            EntityKind::Floor
                | EntityKind::Spikes(_)
                | EntityKind::Text(_)
                | EntityKind::KillingBoundary
        )
    }

    pub fn default_size(&self) -> Size {
        match self {
            EntityKind::Floor | EntityKind::Spikes(_) => Size::new(4, 1),
            EntityKind::Light => Size::new(1, 2),
            EntityKind::Star | EntityKind::KillingBoundary => Size::new(1, 1),
            EntityKind::EndBall => Size::new(2, 1),
            EntityKind::Text(value) => Size::new(text_width(value), 1),
        }
    }

    pub fn min_size(&self) -> Size {
        Size::new(1, 1)
    }

    pub fn max_size(&self) -> Size {
        match self {
            EntityKind::Spikes(_) => Size::new(-1, 1),
            _ => Size::UNBOUNDED,
        }
    }

    pub fn default_layer_number(&self) -> i32 {
        match self {
            EntityKind::KillingBoundary => 0,
            _ => DEFAULT_LAYER_NUMBER,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            EntityKind::Floor => Role::Floor,
            EntityKind::Spikes(_) => Role::Hazard,
            EntityKind::Light => Role::Light,
            EntityKind::Star => Role::Collectible,
            EntityKind::EndBall => Role::Goal,
            EntityKind::Text(_) => Role::Text,
            EntityKind::KillingBoundary => Role::Boundary,
        }
    }
}

fn text_width(value: &str) -> i32 {
    (value.chars().count() as i32).max(1)
}

/// Everything needed to construct an entity, as resolved from a map record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSpec {
    pub kind: EntityKind,
    pub pos: Offset,
    pub size: Size,
    pub layer_number: i32,
}

impl ObjectSpec {
    /// Spec with the kind's default size and layer.
    pub fn with_defaults(kind: EntityKind, pos: Offset) -> Self {
        let size = kind.default_size();
        let layer_number = kind.default_layer_number();
        Self {
            kind,
            pos,
            size,
            layer_number,
        }
    }
}

/// A live map object.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    pos: Offset,
    size: Size,
    layer_number: i32,
    editable: bool,
    should_remove: bool,
    last_collision: Option<Side>,
    anim: Option<Faze>,
    curr_frame: Option<Frame>,
    /// Record fields this version does not interpret.
    extra: Map<String, Value>,
}

impl Entity {
    pub fn new(id: EntityId, spec: ObjectSpec, rng: &mut SimpleRng) -> Self {
        let anim = match spec.kind {
            EntityKind::Star => Some(Faze::new(rng.range_inclusive(10, 20), STAR_FRAMES)),
            EntityKind::EndBall => Some(Faze::new(25, END_BALL_FRAMES)),
            EntityKind::Light => {
                let mut faze = Faze::new(8, LIGHT_FRAMES);
                faze.get_random_frame(rng);
                Some(faze)
            }
            _ => None,
        };
        let size = spec.size.clamp(spec.kind.min_size(), spec.kind.max_size());
        Self {
            id,
            kind: spec.kind,
            pos: spec.pos,
            size,
            layer_number: spec.layer_number,
            editable: false,
            should_remove: false,
            last_collision: None,
            anim,
            curr_frame: None,
            extra: Map::new(),
        }
    }

    /// Attach the uninterpreted record fields written back by [`Entity::to_record`].
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn pos(&self) -> Offset {
        self.pos
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn layer_number(&self) -> i32 {
        self.layer_number
    }

    pub fn editable(&self) -> bool {
        self.editable
    }

    pub fn should_remove(&self) -> bool {
        self.should_remove
    }

    pub fn last_collision(&self) -> Option<Side> {
        self.last_collision
    }

    pub fn is_collider(&self) -> bool {
        self.kind.blocks() || self.kind.triggers()
    }

    /// Boundaries are only shown while editing.
    pub fn visible(&self) -> bool {
        match self.kind {
            EntityKind::KillingBoundary => self.editable,
            _ => true,
        }
    }

    pub fn layer_key(&self) -> LayerKey {
        LayerKey {
            layer_number: self.layer_number,
            type_name: self.type_name(),
            id: self.id,
        }
    }

    pub fn drawable(&self) -> Drawable {
        Drawable {
            key: self.layer_key(),
            pos: self.pos,
            size: self.size,
            visible: self.visible(),
        }
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn move_by(&mut self, delta: Offset) {
        self.pos += delta;
    }

    pub fn set_layer_number(&mut self, layer_number: i32) {
        self.layer_number = layer_number;
    }

    /// Resize within the kind's limits. Returns false for fixed-size kinds.
    pub fn set_size(&mut self, size: Size) -> bool {
        if !self.kind.resizable() {
            return false;
        }
        self.size = size.clamp(self.kind.min_size(), self.kind.max_size());
        true
    }

    /// Replace the text of a text object; its width follows the text.
    pub fn set_text(&mut self, value: &str) -> bool {
        let EntityKind::Text(current) = &mut self.kind else {
            return false;
        };
        *current = value.to_owned();
        self.size.width = text_width(value);
        true
    }

    pub fn update_clear_values(&mut self) {
        self.last_collision = None;
    }

    /// Footprint test used by the collision engine.
    pub fn occupies_tile(&self, pos: Offset) -> bool {
        match self.kind {
            EntityKind::Spikes(facing) => {
                self.rect().contains(pos) || self.in_dead_zone(facing, pos)
            }
            EntityKind::KillingBoundary => !self.rect().contains(pos),
            _ => self.rect().contains(pos),
        }
    }

    /// Whether a collision should stop the player on that axis.
    pub fn blocks_movement(&self, event: &CollisionEvent) -> bool {
        if let EntityKind::Spikes(facing) = self.kind {
            if self.in_dead_zone(facing, event.target_pos) {
                return false;
            }
        }
        self.kind.blocks()
    }

    /// Trigger side effects of touching this object.
    pub fn on_collision(
        &mut self,
        event: &CollisionEvent,
        player: &mut Player,
        events: &mut Vec<GameEvent>,
    ) {
        self.last_collision = Some(event.side);
        match self.kind {
            EntityKind::Spikes(facing) => {
                let contact = match facing {
                    SpikeFacing::Up => Side::Bottom,
                    SpikeFacing::Down => Side::Top,
                };
                let hit = self.in_dead_zone(facing, event.player_pos)
                    || self.rect().contains(event.player_pos)
                    || (self.rect().contains(event.target_pos) && event.side == contact);
                if hit {
                    player.damage(events);
                }
            }
            EntityKind::KillingBoundary => {
                player.damage(events);
            }
            EntityKind::Star => {
                if !self.should_remove {
                    events.push(GameEvent::PointCollected(1));
                    self.should_remove = true;
                }
            }
            EntityKind::EndBall => {
                if !self.should_remove {
                    events.push(GameEvent::EndBallCollected);
                    player.win();
                    self.should_remove = true;
                }
            }
            EntityKind::Floor | EntityKind::Light | EntityKind::Text(_) => {}
        }
    }

    /// One-tile band next to the pointed edge of a spike row, inset by one
    /// tile on each end. Not blocking, but deadly.
    fn in_dead_zone(&self, facing: SpikeFacing, pos: Offset) -> bool {
        let x_ok = self.pos.x + 1 <= pos.x && pos.x < self.pos.x + self.size.width - 1;
        let row = match facing {
            SpikeFacing::Up => self.pos.y - 1,
            SpikeFacing::Down => self.pos.y + self.size.height,
        };
        x_ok && pos.y == row
    }

    /// Compute the current frame, advancing cosmetic animation.
    pub fn render(&mut self, rng: &mut SimpleRng) -> Frame {
        let lines = match &self.kind {
            EntityKind::Floor => floor_lines(self.size),
            EntityKind::Spikes(facing) => {
                let (a, b) = match facing {
                    SpikeFacing::Up => ('◢', '◣'),
                    SpikeFacing::Down => ('◥', '◤'),
                };
                let mut row = String::new();
                for i in 0..self.size.width.max(0) {
                    row.push(if i % 2 == 0 { a } else { b });
                }
                vec![row]
            }
            EntityKind::Light => {
                let top = match self.anim.as_mut() {
                    Some(faze) => faze.get_random_frame(rng),
                    None => LIGHT_FRAMES[0],
                };
                vec![top.to_owned(), LIGHT_BASE.to_owned()]
            }
            EntityKind::Star | EntityKind::EndBall => {
                let glyph = self.anim.as_mut().map(Faze::get_frame).unwrap_or("");
                vec![glyph.to_owned()]
            }
            EntityKind::Text(value) => vec![value.clone()],
            EntityKind::KillingBoundary => boundary_lines(self.size),
        };
        Frame {
            lines,
            role: self.kind.role(),
            contact: self.last_collision,
            tint: 0,
        }
    }

    /// Per-tick cosmetic refresh. Returns the new frame if it changed.
    ///
    /// Stars and lights only refresh on roughly one tick in three.
    pub fn reload(&mut self, rng: &mut SimpleRng) -> Option<Frame> {
        if matches!(self.kind, EntityKind::Star | EntityKind::Light) && !rng.one_in(3) {
            return None;
        }
        self.refresh(rng)
    }

    /// Re-render unconditionally, keeping the dirty check.
    pub fn refresh(&mut self, rng: &mut SimpleRng) -> Option<Frame> {
        let frame = self.render(rng);
        if self.curr_frame.as_ref() == Some(&frame) {
            return None;
        }
        self.curr_frame = Some(frame.clone());
        Some(frame)
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.curr_frame.as_ref()
    }

    /// Record form, as written back by the editor.
    pub fn to_record(&self) -> ObjectRecord {
        let text_value = match &self.kind {
            EntityKind::Text(value) => Some(value.clone()),
            _ => None,
        };
        ObjectRecord {
            type_name: self.type_name().to_owned(),
            pos: Some([self.pos.x, self.pos.y]),
            size: Some([self.size.width, self.size.height]),
            layer_number: Some(self.layer_number),
            text_value,
            extra: self.extra.clone(),
        }
    }

    /// Spec for a copy of this object at another position.
    pub fn to_spec(&self) -> ObjectSpec {
        ObjectSpec {
            kind: self.kind.clone(),
            pos: self.pos,
            size: self.size,
            layer_number: self.layer_number,
        }
    }
}

fn floor_lines(size: Size) -> Vec<String> {
    let w = size.width.max(1) as usize;
    let h = size.height.max(1) as usize;
    if w == 1 {
        return vec!["█".to_owned(); h];
    }
    let row = |left: &str, mid: &str, right: &str| {
        let mut s = String::with_capacity(w * 4);
        s.push_str(left);
        for _ in 0..w - 2 {
            s.push_str(mid);
        }
        s.push_str(right);
        s
    };
    if h == 1 {
        return vec![row("🬴", "🬰", "🬸")];
    }
    let mut lines = Vec::with_capacity(h);
    lines.push(row("🬕", "🬂", "🬨"));
    for _ in 0..h - 2 {
        lines.push(row("▌", " ", "▐"));
    }
    lines.push(row("🬲", "🬭", "🬷"));
    lines
}

fn boundary_lines(size: Size) -> Vec<String> {
    let w = size.width.max(1) as usize;
    let h = size.height.max(1) as usize;
    (0..h)
        .map(|y| {
            (0..w)
                .map(|x| {
                    let edge_x = x == 0 || x + 1 == w;
                    let edge_y = y == 0 || y + 1 == h;
                    match (edge_x, edge_y) {
                        (true, true) => '+',
                        (false, true) => '╌',
                        (true, false) => '┆',
                        (false, false) => ' ',
                    }
                })
                .collect()
        })
        .collect()
}
