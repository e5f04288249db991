//! Scene module - the live entity set and the per-tick pipeline
//!
//! A scene is built from resolved [`MapData`] and owns every live object, the
//! collider subset and the player. One tick runs the phases of [`TickPhase`]
//! in order; nothing outside the scene can observe a half-finished tick.
//!
//! Invariants:
//! - `colliders ⊆ objects`
//! - the player is never a collider

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::collision::{CollisionEngine, CollisionEvent};
use crate::entity::{Entity, EntityId, ObjectSpec};
use crate::input::{InputSource, KeyBindings};
use crate::map::{MapData, MapError, MapMetadata, Spawn};
use crate::player::Player;
use crate::render::RenderSink;
use crate::rng::SimpleRng;
use crate::types::{DirectionSet, GameEvent, Offset};

/// One step of the per-tick pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TickPhase {
    /// Reset transient contact state.
    Clear,
    /// Read logical directions and feed them to the player state.
    Input,
    /// Probe colliders, fire triggers, stop blocked axes.
    Collisions,
    /// Advance the player state machine.
    States,
    /// Sweep objects marked for removal.
    Remove,
    /// Score bookkeeping outside the scene.
    Stats,
    /// Cosmetic animation and player color.
    Effects,
    /// Push the player frame.
    Show,
}

impl TickPhase {
    pub const ALL: [TickPhase; 8] = [
        TickPhase::Clear,
        TickPhase::Input,
        TickPhase::Collisions,
        TickPhase::States,
        TickPhase::Remove,
        TickPhase::Stats,
        TickPhase::Effects,
        TickPhase::Show,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TickPhase::Clear => "clear",
            TickPhase::Input => "input",
            TickPhase::Collisions => "coll",
            TickPhase::States => "states",
            TickPhase::Remove => "remove",
            TickPhase::Stats => "med",
            TickPhase::Effects => "effects",
            TickPhase::Show => "show",
        }
    }
}

pub struct Scene {
    objects: BTreeMap<EntityId, Entity>,
    colliders: BTreeSet<EntityId>,
    player: Player,
    collision: CollisionEngine,
    rng: SimpleRng,
    bindings: KeyBindings,
    editable: bool,
    next_id: u32,
    events: Vec<GameEvent>,
    directions: DirectionSet,
    last_collisions: Vec<CollisionEvent>,
    player_drawn_at: Option<Offset>,
    metadata: MapMetadata,
}

impl Scene {
    /// Build a scene and mount every member into `sink`.
    ///
    /// With `editable` set, objects become editable and the player is parked
    /// in its edit pose.
    pub fn load(
        map: &MapData,
        seed: u32,
        editable: bool,
        sink: &mut dyn RenderSink,
    ) -> Result<Self, MapError> {
        let mut rng = SimpleRng::new(seed);
        let mut objects = BTreeMap::new();
        let mut colliders = BTreeSet::new();
        let mut player = None;

        for (i, spawn) in map.spawns.iter().enumerate() {
            let id = EntityId(i as u32);
            let extra = map.extras.get(i).cloned().unwrap_or_default();
            match spawn {
                Spawn::Player { pos, layer_number } => {
                    if player.is_some() {
                        return Err(MapError::MultiplePlayers(2));
                    }
                    player = Some(Player::new(id, *pos, *layer_number).with_extra(extra));
                }
                Spawn::Object(spec) => {
                    let mut entity = Entity::new(id, spec.clone(), &mut rng).with_extra(extra);
                    entity.set_editable(editable);
                    if entity.is_collider() {
                        colliders.insert(id);
                    }
                    objects.insert(id, entity);
                }
            }
        }
        let mut player = player.ok_or(MapError::MissingPlayer)?;
        if editable {
            player.edit_state();
        }

        let mut scene = Self {
            objects,
            colliders,
            player,
            collision: CollisionEngine::new(),
            rng,
            bindings: KeyBindings::default(),
            editable,
            next_id: map.spawns.len() as u32,
            events: Vec::new(),
            directions: DirectionSet::empty(),
            last_collisions: Vec::new(),
            player_drawn_at: None,
            metadata: map.metadata.clone(),
        };
        scene.mount_all(sink);
        info!(
            "scene `{}` loaded: {} objects, {} colliders{}",
            scene.metadata.name,
            scene.objects.len(),
            scene.colliders.len(),
            if editable { " (editable)" } else { "" }
        );
        Ok(scene)
    }

    fn mount_all(&mut self, sink: &mut dyn RenderSink) {
        for obj in self.objects.values_mut() {
            sink.mount(obj.drawable());
            if let Some(frame) = obj.refresh(&mut self.rng) {
                sink.redraw(obj.id(), &frame);
            }
        }
        sink.mount(self.player.drawable());
        self.player_drawn_at = Some(self.player.offset());
        sink.resort_layers();
    }

    /// Unmount every member. The scene is unusable for rendering afterwards.
    pub fn unmount_all(&self, sink: &mut dyn RenderSink) {
        for id in self.objects.keys() {
            sink.unmount(*id);
        }
        sink.unmount(self.player.id());
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn metadata(&self) -> &MapMetadata {
        &self.metadata
    }

    pub fn editable(&self) -> bool {
        self.editable
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn objects(&self) -> impl Iterator<Item = &Entity> {
        self.objects.values()
    }

    pub fn object(&self, id: EntityId) -> Option<&Entity> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.objects.get_mut(&id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// True for any live member, the player included.
    pub fn contains(&self, id: EntityId) -> bool {
        id == self.player.id() || self.objects.contains_key(&id)
    }

    pub fn colliders(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.colliders.iter().copied()
    }

    pub fn is_collider(&self, id: EntityId) -> bool {
        self.colliders.contains(&id)
    }

    /// `colliders ⊆ objects` and the player is not a collider.
    pub fn invariants_hold(&self) -> bool {
        !self.colliders.contains(&self.player.id())
            && self.colliders.iter().all(|id| self.objects.contains_key(id))
    }

    /// Directions read during the last input phase.
    pub fn directions(&self) -> DirectionSet {
        self.directions
    }

    /// Collision events of the last collision phase.
    pub fn last_collisions(&self) -> &[CollisionEvent] {
        &self.last_collisions
    }

    pub fn collision_tests(&self) -> u64 {
        self.collision.tests_performed()
    }

    /// Events produced since the last drain.
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run all phases once and return the events they produced.
    pub fn tick(&mut self, input: &dyn InputSource, sink: &mut dyn RenderSink) -> Vec<GameEvent> {
        for phase in TickPhase::ALL {
            self.run_phase(phase, input, sink);
        }
        self.take_events()
    }

    pub fn run_phase(
        &mut self,
        phase: TickPhase,
        input: &dyn InputSource,
        sink: &mut dyn RenderSink,
    ) {
        match phase {
            TickPhase::Clear => self.update_clear_values(),
            TickPhase::Input => self.handle_input(input),
            TickPhase::Collisions => self.check_collisions(),
            TickPhase::States => self.player.update_states(&mut self.events),
            TickPhase::Remove => self.remove_objects(sink),
            // Filled in by `Game`, which owns the scoreboard.
            TickPhase::Stats => {}
            TickPhase::Effects => self.update_effects(sink),
            TickPhase::Show => self.show_player(sink),
        }
    }

    fn update_clear_values(&mut self) {
        self.player.update_clear_values();
        for obj in self.objects.values_mut() {
            obj.update_clear_values();
        }
    }

    fn handle_input(&mut self, input: &dyn InputSource) {
        self.directions = self.bindings.read_directions(input);
        self.player.handle_input(self.directions);
    }

    fn check_collisions(&mut self) {
        let events = self.collision.gather_collisions(
            self.player.offset(),
            self.player.velocity(),
            &self.objects,
            &self.colliders,
        );

        let mut blocked = Vec::new();
        for event in &events {
            let Some(obj) = self.objects.get_mut(&event.obj) else {
                continue;
            };
            if obj.blocks_movement(event) {
                blocked.push(*event);
            }
            if obj.kind().triggers() {
                obj.on_collision(event, &mut self.player, &mut self.events);
            }
        }
        for event in &blocked {
            self.player.on_collision(event);
        }
        self.last_collisions = events;
    }

    fn remove_objects(&mut self, sink: &mut dyn RenderSink) {
        let doomed: Vec<EntityId> = self
            .objects
            .values()
            .filter(|o| o.should_remove())
            .map(Entity::id)
            .collect();
        for id in doomed {
            self.remove_object(id, sink);
        }
    }

    /// Cosmetic refresh of every object plus the player color.
    fn update_effects(&mut self, sink: &mut dyn RenderSink) {
        for obj in self.objects.values_mut() {
            if let Some(frame) = obj.reload(&mut self.rng) {
                sink.redraw(obj.id(), &frame);
            }
        }
        self.player.change_color();
    }

    fn show_player(&mut self, sink: &mut dyn RenderSink) {
        if self.player_drawn_at != Some(self.player.offset()) {
            sink.place(self.player.drawable());
            self.player_drawn_at = Some(self.player.offset());
        }
        if let Some(frame) = self.player.show() {
            sink.redraw(self.player.id(), &frame);
        }
    }

    /// Add a new object and mount it.
    pub fn add_object(&mut self, spec: ObjectSpec, sink: &mut dyn RenderSink) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let mut entity = Entity::new(id, spec, &mut self.rng);
        entity.set_editable(self.editable);
        if entity.is_collider() {
            self.colliders.insert(id);
        }
        sink.mount(entity.drawable());
        if let Some(frame) = entity.refresh(&mut self.rng) {
            sink.redraw(id, &frame);
        }
        self.objects.insert(id, entity);
        sink.resort_layers();
        id
    }

    /// Remove an object from the live and collider sets and unmount it.
    pub fn remove_object(&mut self, id: EntityId, sink: &mut dyn RenderSink) -> Option<Entity> {
        self.colliders.remove(&id);
        let removed = self.objects.remove(&id)?;
        sink.unmount(id);
        debug!("removed {} {}", removed.type_name(), id);
        Some(removed)
    }

    /// Push geometry and content of one object after an edit.
    pub fn refresh_object(&mut self, id: EntityId, sink: &mut dyn RenderSink) {
        let Some(obj) = self.objects.get_mut(&id) else {
            return;
        };
        sink.place(obj.drawable());
        if let Some(frame) = obj.refresh(&mut self.rng) {
            sink.redraw(id, &frame);
        }
    }

    /// Push the player geometry after an edit or reset.
    pub fn refresh_player(&mut self, sink: &mut dyn RenderSink) {
        sink.place(self.player.drawable());
        self.player_drawn_at = Some(self.player.offset());
    }

    /// Send the player back to its spawn point.
    pub fn respawn_player(&mut self, sink: &mut dyn RenderSink) {
        info!("player respawn at {:?}", self.player.starting_pos());
        self.player.reset();
        self.refresh_player(sink);
    }

    /// Topmost member whose footprint covers `pos`, the player included.
    pub fn member_at(&self, pos: Offset) -> Option<EntityId> {
        let player_hit = (self.player.offset() == pos).then(|| self.player.layer_key());
        self.objects
            .values()
            .filter(|o| o.rect().contains(pos))
            .map(Entity::layer_key)
            .chain(player_hit)
            .max()
            .map(|key| key.id)
    }
}
