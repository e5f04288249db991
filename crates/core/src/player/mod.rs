//! Player module - the distinguished entity driven by input
//!
//! The player owns its authoritative position, velocity, contact flags and the
//! single active [`State`]. Each tick the scene calls, in order:
//! [`Player::update_clear_values`], [`Player::handle_input`],
//! [`Player::on_collision`] (per blocking event), [`Player::update_states`],
//! [`Player::change_color`] and [`Player::show`].

pub mod state;

use log::trace;
use serde_json::{Map, Value};

use crate::collision::CollisionEvent;
use crate::entity::EntityId;
use crate::map::ObjectRecord;
use crate::render::{Drawable, Frame, LayerKey, Role};
use crate::types::{DirectionSet, GameEvent, Offset, Side, Size, DEFAULT_LAYER_NUMBER};

pub use state::{Body, State, StateId, StateKind};

/// Map type tag of the player record.
pub const PLAYER_TYPE: &str = "Player";

#[derive(Debug, Clone)]
pub struct Player {
    id: EntityId,
    body: Body,
    state: State,
    starting_pos: Offset,
    layer_number: i32,
    hue: u16,
    curr_frame: Option<Frame>,
    transitions: u64,
    extra: Map<String, Value>,
}

impl Player {
    pub fn new(id: EntityId, start_pos: Offset, layer_number: i32) -> Self {
        Self {
            id,
            body: Body {
                offset: start_pos,
                ..Body::default()
            },
            state: State::new(StateKind::Start),
            starting_pos: start_pos,
            layer_number,
            hue: 0,
            curr_frame: None,
            transitions: 0,
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn offset(&self) -> Offset {
        self.body.offset
    }

    pub fn velocity(&self) -> Offset {
        self.body.velocity
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn is_on_ground(&self) -> bool {
        self.body.is_on_ground
    }

    pub fn is_on_roof(&self) -> bool {
        self.body.is_on_roof
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_id(&self) -> StateId {
        self.state.id()
    }

    pub fn starting_pos(&self) -> Offset {
        self.starting_pos
    }

    pub fn layer_number(&self) -> i32 {
        self.layer_number
    }

    pub fn set_layer_number(&mut self, layer_number: i32) {
        self.layer_number = layer_number;
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }

    /// Number of state replacements since creation.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Teleport, used by tests and scripted setups.
    pub fn set_offset(&mut self, offset: Offset) {
        self.body.offset = offset;
    }

    /// Editor move: the player tile and its spawn point travel together.
    pub fn move_by(&mut self, delta: Offset) {
        self.starting_pos += delta;
        self.body.offset += delta;
    }

    /// Replace the active state atomically.
    pub fn change_state(&mut self, mut next: State) {
        trace!("player state {:?} -> {:?}", self.state.id(), next.id());
        self.state.exit();
        next.enter();
        self.state = next;
        self.transitions += 1;
    }

    /// Back to the spawn point in the Start state.
    pub fn reset(&mut self) {
        self.body = Body {
            offset: self.starting_pos,
            ..Body::default()
        };
        self.change_state(State::new(StateKind::Start));
    }

    /// Park the player in the editor pose.
    pub fn edit_state(&mut self) {
        self.change_state(State::new(StateKind::Edit));
    }

    /// Tick step 1: drop contact flags and restart from the state's drift.
    pub fn update_clear_values(&mut self) {
        self.body.is_on_ground = false;
        self.body.is_on_roof = false;
        self.body.velocity = self.state.direction();
    }

    /// Tick step 2.
    pub fn handle_input(&mut self, dirs: DirectionSet) {
        if let Some(next) = self.state.handle_input(&mut self.body, dirs) {
            self.change_state(next);
        }
    }

    /// Tick step 3, for every event whose object blocks movement.
    pub fn on_collision(&mut self, event: &CollisionEvent) {
        let v = self.body.velocity;
        match event.side {
            Side::Bottom => {
                self.body.is_on_ground = true;
                self.body.velocity = Offset::new(v.x, 0);
            }
            Side::Top => {
                self.body.is_on_roof = true;
                self.body.velocity = Offset::new(v.x, 0);
            }
            Side::Left | Side::Right => {
                self.body.velocity = Offset::new(0, v.y);
            }
        }
    }

    /// Tick step 4.
    pub fn update_states(&mut self, events: &mut Vec<GameEvent>) {
        if let Some(next) = self.state.update(&mut self.body, events) {
            self.change_state(next);
        }
    }

    /// Start dying unless the active state is immortal.
    ///
    /// Returns true if the hit landed.
    pub fn damage(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.state.immortal() {
            return false;
        }
        self.change_state(State::new(StateKind::Dying));
        events.push(GameEvent::HpChange(-1));
        true
    }

    pub fn win(&mut self) {
        self.change_state(State::new(StateKind::Win));
    }

    /// Tick step 6: rotate the color phase.
    pub fn change_color(&mut self) {
        self.hue = (self.hue + 50) % 1000;
    }

    /// Tick step 7: advance the state animation; returns the frame if it changed.
    pub fn show(&mut self) -> Option<Frame> {
        let glyph = self.state.get_frame();
        let frame = Frame {
            tint: self.hue,
            ..Frame::single(glyph, Role::Player)
        };
        if self.curr_frame.as_ref() == Some(&frame) {
            return None;
        }
        self.curr_frame = Some(frame.clone());
        Some(frame)
    }

    pub fn layer_key(&self) -> LayerKey {
        LayerKey {
            layer_number: self.layer_number,
            type_name: PLAYER_TYPE,
            id: self.id,
        }
    }

    pub fn drawable(&self) -> Drawable {
        Drawable {
            key: self.layer_key(),
            pos: self.body.offset,
            size: Size::new(1, 1),
            visible: true,
        }
    }

    pub fn to_record(&self) -> ObjectRecord {
        ObjectRecord {
            type_name: PLAYER_TYPE.to_owned(),
            pos: Some([self.starting_pos.x, self.starting_pos.y]),
            size: None,
            layer_number: Some(self.layer_number),
            text_value: None,
            extra: self.extra.clone(),
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(EntityId::default(), Offset::ZERO, DEFAULT_LAYER_NUMBER)
    }
}
