//! Editor module - direct manipulation of a map
//!
//! The editor loads a scene in edit mode and never runs collisions or the
//! player state machine. Every operation works on the current selection and
//! pushes the changed geometry to the render sink right away.

use std::collections::BTreeSet;
use std::path::Path;

use log::{debug, info};

use crate::entity::EntityId;
use crate::input::PressedKeys;
use crate::map::{resolve, MapData, MapDescriptor, MapError, MapMetadata, ObjectRecord, Spawn};
use crate::render::RenderSink;
use crate::scene::{Scene, TickPhase};
use crate::types::{Offset, Size, DISPLAY_HEIGHT, DISPLAY_WIDTH, GAME_VERSION};

/// Distance between an object and its copy.
const COPY_OFFSET: i32 = 2;

pub struct Editor {
    scene: Scene,
    metadata: MapMetadata,
    hp: i32,
    selection: BTreeSet<EntityId>,
}

impl Editor {
    pub fn load(map: &MapData, seed: u32, sink: &mut dyn RenderSink) -> Result<Self, MapError> {
        let scene = Scene::load(map, seed, true, sink)?;
        Ok(Self {
            scene,
            metadata: map.metadata.clone(),
            hp: map.config.hp,
            selection: BTreeSet::new(),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn metadata(&self) -> &MapMetadata {
        &self.metadata
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp;
    }

    pub fn set_name(&mut self, name: &str) {
        self.metadata.name = name.to_owned();
    }

    /// Cosmetic refresh only: animations and the player frame.
    pub fn update(&mut self, sink: &mut dyn RenderSink) {
        let idle = PressedKeys::new();
        self.scene.run_phase(TickPhase::Effects, &idle, sink);
        self.scene.run_phase(TickPhase::Show, &idle, sink);
    }

    // Selection

    pub fn selection(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.selection.iter().copied()
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selection.contains(&id)
    }

    fn player_selected(&self) -> bool {
        self.selection.contains(&self.scene.player().id())
    }

    /// Add the topmost member at `pos` to the selection.
    pub fn select_at(&mut self, pos: Offset) -> Option<EntityId> {
        let id = self.scene.member_at(pos)?;
        self.selection.insert(id);
        Some(id)
    }

    pub fn select(&mut self, id: EntityId) -> bool {
        self.scene.contains(id) && self.selection.insert(id)
    }

    pub fn deselect(&mut self, id: EntityId) -> bool {
        self.selection.remove(&id)
    }

    pub fn select_all(&mut self) {
        self.selection = self.scene.objects().map(|o| o.id()).collect();
        self.selection.insert(self.scene.player().id());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected ids without the player.
    fn selected_objects(&self) -> Vec<EntityId> {
        let player = self.scene.player().id();
        self.selection.iter().copied().filter(|id| *id != player).collect()
    }

    // Geometry

    pub fn move_selected(&mut self, delta: Offset, sink: &mut dyn RenderSink) {
        for id in self.selected_objects() {
            if let Some(obj) = self.scene.object_mut(id) {
                obj.move_by(delta);
            }
            self.scene.refresh_object(id, sink);
        }
        if self.player_selected() {
            self.scene.player_mut().move_by(delta);
            self.scene.refresh_player(sink);
        }
    }

    /// Grow or shrink every selected resizable object by `delta`.
    pub fn resize_selected(&mut self, delta: Offset, sink: &mut dyn RenderSink) {
        for id in self.selected_objects() {
            let resized = self
                .scene
                .object_mut(id)
                .is_some_and(|obj| obj.set_size(obj.size().resize(delta)));
            if resized {
                self.scene.refresh_object(id, sink);
            }
        }
    }

    pub fn set_size(&mut self, size: Size, sink: &mut dyn RenderSink) {
        for id in self.selected_objects() {
            let resized = self
                .scene
                .object_mut(id)
                .is_some_and(|obj| obj.set_size(size));
            if resized {
                self.scene.refresh_object(id, sink);
            }
        }
    }

    pub fn set_layer_number(&mut self, layer_number: i32, sink: &mut dyn RenderSink) {
        for id in self.selected_objects() {
            if let Some(obj) = self.scene.object_mut(id) {
                obj.set_layer_number(layer_number);
            }
            self.scene.refresh_object(id, sink);
        }
        if self.player_selected() {
            self.scene.player_mut().set_layer_number(layer_number);
            self.scene.refresh_player(sink);
        }
        sink.resort_layers();
    }

    /// Replace the text of every selected text object.
    pub fn set_text(&mut self, value: &str, sink: &mut dyn RenderSink) {
        for id in self.selected_objects() {
            let changed = self
                .scene
                .object_mut(id)
                .is_some_and(|obj| obj.set_text(value));
            if changed {
                self.scene.refresh_object(id, sink);
            }
        }
    }

    // Membership

    /// Delete the selected objects. The player is never deleted.
    pub fn delete_selected(&mut self, sink: &mut dyn RenderSink) -> usize {
        let mut deleted = 0;
        for id in self.selected_objects() {
            if self.scene.remove_object(id, sink).is_some() {
                self.selection.remove(&id);
                deleted += 1;
            }
        }
        deleted
    }

    /// Duplicate the selection next to itself and select the copies.
    ///
    /// Copies go two tiles down-right, or up-left if any selected object would
    /// leave the display. Nothing happens while the player is selected.
    pub fn copy_selected(&mut self, sink: &mut dyn RenderSink) -> Vec<EntityId> {
        if self.player_selected() {
            debug!("copy refused: player selected");
            return Vec::new();
        }
        let specs: Vec<_> = self
            .selected_objects()
            .into_iter()
            .filter_map(|id| self.scene.object(id))
            .map(|obj| obj.to_spec())
            .collect();

        let leaves_display = specs.iter().any(|spec| {
            spec.pos.y + COPY_OFFSET >= DISPLAY_HEIGHT || spec.pos.x + COPY_OFFSET >= DISPLAY_WIDTH
        });
        let shift = if leaves_display { -COPY_OFFSET } else { COPY_OFFSET };

        let copies: Vec<EntityId> = specs
            .into_iter()
            .map(|mut spec| {
                spec.pos += Offset::new(shift, shift);
                self.scene.add_object(spec, sink)
            })
            .collect();
        self.selection = copies.iter().copied().collect();
        copies
    }

    /// Create an object of a registered type with its default geometry.
    pub fn add_object(
        &mut self,
        type_name: &str,
        pos: Offset,
        sink: &mut dyn RenderSink,
    ) -> Result<EntityId, MapError> {
        let record = ObjectRecord::new(type_name, pos).with_size(Size::new(1, 1));
        match resolve(&record)? {
            Spawn::Player { .. } => Err(MapError::MultiplePlayers(2)),
            Spawn::Object(mut spec) => {
                spec.size = spec.kind.default_size();
                let id = self.scene.add_object(spec, sink);
                debug!("added {type_name} {id} at {pos:?}");
                Ok(id)
            }
        }
    }

    // Persistence

    /// Map descriptor of the current state, members in creation order.
    pub fn to_descriptor(&self) -> MapDescriptor {
        let player = self.scene.player();
        let mut records: Vec<_> = self
            .scene
            .objects()
            .map(|obj| (obj.id(), obj.to_record()))
            .chain(std::iter::once((player.id(), player.to_record())))
            .collect();
        records.sort_by_key(|(id, _)| *id);

        MapDescriptor {
            name: Some(self.metadata.name.clone()),
            game_version: Some(GAME_VERSION.to_owned()),
            authors: Some(self.metadata.authors.clone()),
            hp: self.hp,
            objects: records.into_iter().map(|(_, record)| record).collect(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        let desc = self.to_descriptor();
        desc.save(path)?;
        info!(
            "editor saved `{}` ({} objects)",
            self.metadata.name,
            desc.objects.len()
        );
        Ok(())
    }
}
