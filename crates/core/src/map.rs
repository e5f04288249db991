//! Map module - descriptor format, type registry and map chains
//!
//! A map file is JSON:
//!
//! ```json
//! {
//!   "name": "intro",
//!   "game_version": "0.1.0",
//!   "authors": ["Cvaniak"],
//!   "hp": 3,
//!   "objects": [
//!     {"type": "Player", "pos": [10, 10]},
//!     {"type": "Floor", "pos": [5, 12], "size": [20, 1], "layer_number": 1},
//!     {"type": "Star", "pos": [14, 10]}
//!   ]
//! }
//! ```
//!
//! Every `type` is resolved through [`REGISTRY`]; an unknown tag fails the
//! whole load. `name`, `game_version` and `authors` are optional, `hp` is
//! required. Resizable kinds require `size`; fixed-size kinds fall back to
//! their natural size.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::entity::{EntityKind, ObjectSpec, SpikeFacing};
use crate::player::PLAYER_TYPE;
use crate::types::{
    Offset, Size, APP_AUTHOR, DEFAULT_LAYER_NUMBER, EMPTY_MAP_PLAYER_POS, GAME_VERSION,
};

/// Failure to turn a map file into playable data.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to access map file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid map JSON in {origin}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode map `{name}`")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown object type `{0}`")]
    UnknownType(String),
    #[error("object `{type_name}` is missing required field `{field}`")]
    MissingField {
        type_name: String,
        field: &'static str,
    },
    #[error("map has no Player object")]
    MissingPlayer,
    #[error("map has {0} Player objects, expected exactly one")]
    MultiplePlayers(usize),
    #[error("no maps found in {}", path.display())]
    EmptyChain { path: PathBuf },
}

/// One entry of the `objects` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<[i32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<[i32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_number: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_value: Option<String>,
    /// Fields this version does not know about, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ObjectRecord {
    pub fn new(type_name: &str, pos: Offset) -> Self {
        Self {
            type_name: type_name.to_owned(),
            pos: Some([pos.x, pos.y]),
            size: None,
            layer_number: None,
            text_value: None,
            extra: Map::new(),
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some([size.width, size.height]);
        self
    }

    fn pos(&self) -> Result<Offset, MapError> {
        self.pos
            .map(|[x, y]| Offset::new(x, y))
            .ok_or_else(|| self.missing("pos"))
    }

    fn size(&self) -> Result<Size, MapError> {
        self.size
            .map(|[w, h]| Size::new(w, h))
            .ok_or_else(|| self.missing("size"))
    }

    fn missing(&self, field: &'static str) -> MapError {
        MapError::MissingField {
            type_name: self.type_name.clone(),
            field,
        }
    }
}

/// Top-level map file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    pub hp: i32,
    pub objects: Vec<ObjectRecord>,
}

impl MapDescriptor {
    pub fn from_json(origin: &str, json: &str) -> Result<Self, MapError> {
        serde_json::from_str(json).map_err(|source| MapError::Parse {
            origin: origin.to_owned(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self, MapError> {
        let json = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&path.display().to_string(), &json)
    }

    pub fn to_json_pretty(&self) -> Result<String, MapError> {
        serde_json::to_string_pretty(self).map_err(|source| MapError::Serialize {
            name: self.name.clone().unwrap_or_default(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|source| MapError::Io {
            path: path.to_owned(),
            source,
        })?;
        info!("map saved to {}", path.display());
        Ok(())
    }
}

/// A resolved map object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spawn {
    Object(ObjectSpec),
    Player { pos: Offset, layer_number: i32 },
}

/// Constructor from a record, keyed by type tag.
pub type Factory = fn(&ObjectRecord) -> Result<Spawn, MapError>;

/// Static type-name to constructor registry.
pub const REGISTRY: &[(&str, Factory)] = &[
    (PLAYER_TYPE, spawn_player),
    (EntityKind::FLOOR, spawn_floor),
    (EntityKind::SPIKES, spawn_spikes),
    (EntityKind::SPIKES_DOWN, spawn_spikes_down),
    (EntityKind::LIGHT, spawn_light),
    (EntityKind::STAR, spawn_star),
    (EntityKind::END_BALL, spawn_end_ball),
    (EntityKind::TEXT, spawn_text),
    (EntityKind::KILLING_BOUNDARY, spawn_killing_boundary),
    ("KillingBoundary", spawn_killing_boundary),
];

pub fn lookup(type_name: &str) -> Option<Factory> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, factory)| *factory)
}

/// Resolve one record through the registry.
pub fn resolve(record: &ObjectRecord) -> Result<Spawn, MapError> {
    let factory =
        lookup(&record.type_name).ok_or_else(|| MapError::UnknownType(record.type_name.clone()))?;
    factory(record)
}

/// Text shown by a text object whose record has no `text_value`.
pub const DEFAULT_TEXT: &str = "Lorem ipsum";

fn spawn_player(record: &ObjectRecord) -> Result<Spawn, MapError> {
    Ok(Spawn::Player {
        pos: record.pos()?,
        layer_number: record.layer_number.unwrap_or(DEFAULT_LAYER_NUMBER),
    })
}

fn resizable(record: &ObjectRecord, kind: EntityKind) -> Result<Spawn, MapError> {
    let layer_number = record
        .layer_number
        .unwrap_or_else(|| kind.default_layer_number());
    Ok(Spawn::Object(ObjectSpec {
        pos: record.pos()?,
        size: record.size()?,
        layer_number,
        kind,
    }))
}

fn fixed(record: &ObjectRecord, kind: EntityKind) -> Result<Spawn, MapError> {
    let mut spec = ObjectSpec::with_defaults(kind, record.pos()?);
    if let Some(layer_number) = record.layer_number {
        spec.layer_number = layer_number;
    }
    Ok(Spawn::Object(spec))
}

fn spawn_floor(record: &ObjectRecord) -> Result<Spawn, MapError> {
    resizable(record, EntityKind::Floor)
}

fn spawn_spikes(record: &ObjectRecord) -> Result<Spawn, MapError> {
    resizable(record, EntityKind::Spikes(SpikeFacing::Up))
}

fn spawn_spikes_down(record: &ObjectRecord) -> Result<Spawn, MapError> {
    resizable(record, EntityKind::Spikes(SpikeFacing::Down))
}

fn spawn_killing_boundary(record: &ObjectRecord) -> Result<Spawn, MapError> {
    resizable(record, EntityKind::KillingBoundary)
}

fn spawn_text(record: &ObjectRecord) -> Result<Spawn, MapError> {
    let value = record
        .text_value
        .clone()
        .unwrap_or_else(|| DEFAULT_TEXT.to_owned());
    resizable(record, EntityKind::Text(value))
}

fn spawn_light(record: &ObjectRecord) -> Result<Spawn, MapError> {
    fixed(record, EntityKind::Light)
}

fn spawn_star(record: &ObjectRecord) -> Result<Spawn, MapError> {
    fixed(record, EntityKind::Star)
}

fn spawn_end_ball(record: &ObjectRecord) -> Result<Spawn, MapError> {
    fixed(record, EntityKind::EndBall)
}

/// Descriptive fields of a map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapMetadata {
    pub name: String,
    pub game_version: String,
    pub authors: Vec<String>,
}

/// Gameplay parameters derived from a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapConfig {
    pub hp: i32,
    /// Number of stars.
    pub points: i32,
    /// The map is won by reaching an end ball rather than by collecting stars.
    pub winning_ball: bool,
}

/// A fully resolved, playable map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapData {
    pub metadata: MapMetadata,
    pub config: MapConfig,
    pub spawns: Vec<Spawn>,
    /// Uninterpreted record fields, indexed like `spawns`. Missing entries are empty.
    pub extras: Vec<Map<String, Value>>,
}

impl MapData {
    /// Resolve every record. `fallback_name` is used when the file has no name.
    pub fn from_descriptor(desc: &MapDescriptor, fallback_name: &str) -> Result<Self, MapError> {
        let spawns = desc
            .objects
            .iter()
            .map(resolve)
            .collect::<Result<Vec<_>, _>>()?;

        let players = spawns
            .iter()
            .filter(|s| matches!(s, Spawn::Player { .. }))
            .count();
        match players {
            0 => return Err(MapError::MissingPlayer),
            1 => {}
            n => return Err(MapError::MultiplePlayers(n)),
        }

        let count = |tag: &str| desc.objects.iter().filter(|o| o.type_name == tag).count();
        let config = MapConfig {
            hp: desc.hp,
            points: count(EntityKind::STAR) as i32,
            winning_ball: count(EntityKind::END_BALL) > 0,
        };
        let metadata = MapMetadata {
            name: desc.name.clone().unwrap_or_else(|| fallback_name.to_owned()),
            game_version: desc
                .game_version
                .clone()
                .unwrap_or_else(|| GAME_VERSION.to_owned()),
            authors: desc
                .authors
                .clone()
                .unwrap_or_else(|| vec![APP_AUTHOR.to_owned()]),
        };
        debug!(
            "resolved map `{}`: {} objects, {} stars",
            metadata.name,
            spawns.len(),
            config.points
        );
        let extras = desc.objects.iter().map(|o| o.extra.clone()).collect();
        Ok(Self {
            metadata,
            config,
            spawns,
            extras,
        })
    }
}

/// Read and resolve a map file. The file stem names maps without a `name`.
pub fn load_map(path: &Path) -> Result<MapData, MapError> {
    let desc = MapDescriptor::read(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let data = MapData::from_descriptor(&desc, &stem)?;
    info!("loaded map `{}` from {}", data.metadata.name, path.display());
    Ok(data)
}

/// Descriptor of a new map holding only the player.
pub fn create_empty_map(name: &str, authors: &[String]) -> MapDescriptor {
    let authors = if authors.is_empty() {
        vec![APP_AUTHOR.to_owned()]
    } else {
        authors.to_vec()
    };
    MapDescriptor {
        name: Some(name.to_owned()),
        game_version: Some(GAME_VERSION.to_owned()),
        authors: Some(authors),
        hp: 1,
        objects: vec![ObjectRecord::new(PLAYER_TYPE, EMPTY_MAP_PLAYER_POS)],
    }
}

/// Ordered list of maps played one after another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapChain {
    current_index: usize,
    maps: Vec<PathBuf>,
}

impl MapChain {
    pub fn new(maps: Vec<PathBuf>) -> Self {
        Self {
            current_index: 0,
            maps,
        }
    }

    /// Every `*.json` file of a directory, sorted by file name.
    pub fn from_dir(dir: &Path) -> Result<Self, MapError> {
        let io_err = |source| MapError::Io {
            path: dir.to_owned(),
            source,
        };
        let mut maps = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                maps.push(path);
            }
        }
        if maps.is_empty() {
            return Err(MapError::EmptyChain {
                path: dir.to_owned(),
            });
        }
        maps.sort();
        Ok(Self::new(maps))
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn maps(&self) -> &[PathBuf] {
        &self.maps
    }

    pub fn current_map(&self) -> Option<&Path> {
        self.maps.get(self.current_index).map(PathBuf::as_path)
    }

    pub fn has_next_map(&self) -> bool {
        self.current_index + 1 < self.maps.len()
    }

    /// Advance; returns false (and stays put) on the last map.
    pub fn next_map(&mut self) -> bool {
        if !self.has_next_map() {
            return false;
        }
        self.current_index += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "hp": 2,
        "objects": [
            {"type": "Player", "pos": [1, 1]},
            {"type": "Floor", "pos": [0, 3], "size": [8, 1]},
            {"type": "Star", "pos": [4, 2]},
            {"type": "Star", "pos": [5, 2], "layer_number": 4},
            {"type": "Text", "pos": [0, 0], "size": [4, 1]}
        ]
    }"#;

    #[test]
    fn resolves_sample_with_defaults() {
        let desc = MapDescriptor::from_json("sample", SAMPLE).unwrap();
        let data = MapData::from_descriptor(&desc, "sample").unwrap();
        assert_eq!(data.metadata.name, "sample");
        assert_eq!(data.metadata.game_version, GAME_VERSION);
        assert_eq!(data.metadata.authors, vec![APP_AUTHOR.to_owned()]);
        assert_eq!(data.config.points, 2);
        assert!(!data.config.winning_ball);
        assert_eq!(data.spawns.len(), 5);

        let Spawn::Object(star) = &data.spawns[3] else {
            panic!("expected object");
        };
        assert_eq!(star.size, Size::new(1, 1));
        assert_eq!(star.layer_number, 4);

        let Spawn::Object(text) = &data.spawns[4] else {
            panic!("expected object");
        };
        assert_eq!(text.kind, EntityKind::Text(DEFAULT_TEXT.to_owned()));
    }

    #[test]
    fn unknown_type_fails_load() {
        let desc = MapDescriptor::from_json(
            "bad",
            r#"{"hp": 1, "objects": [
                {"type": "Player", "pos": [0, 0]},
                {"type": "Lava", "pos": [0, 0]}
            ]}"#,
        )
        .unwrap();
        let err = MapData::from_descriptor(&desc, "bad").unwrap_err();
        assert!(matches!(err, MapError::UnknownType(ref t) if t == "Lava"));
    }

    #[test]
    fn resizable_kinds_require_size() {
        let desc = MapDescriptor::from_json(
            "bad",
            r#"{"hp": 1, "objects": [
                {"type": "Player", "pos": [0, 0]},
                {"type": "Floor", "pos": [0, 0]}
            ]}"#,
        )
        .unwrap();
        let err = MapData::from_descriptor(&desc, "bad").unwrap_err();
        assert!(matches!(err, MapError::MissingField { field: "size", .. }));
    }

    #[test]
    fn missing_hp_is_a_parse_error() {
        let err = MapDescriptor::from_json("bad", r#"{"objects": []}"#).unwrap_err();
        assert!(matches!(err, MapError::Parse { .. }));
    }

    #[test]
    fn encoding_and_decoding_failures_are_told_apart() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let err = MapError::Serialize {
            name: "broken".into(),
            source,
        };
        assert_eq!(err.to_string(), "failed to encode map `broken`");

        let json = create_empty_map("ok", &[]).to_json_pretty().unwrap();
        assert!(MapDescriptor::from_json("ok", &json).is_ok());
        assert!(matches!(
            MapDescriptor::from_json("bad", "{"),
            Err(MapError::Parse { .. })
        ));
    }

    #[test]
    fn player_count_is_validated() {
        let none = MapDescriptor::from_json("x", r#"{"hp": 1, "objects": []}"#).unwrap();
        assert!(matches!(
            MapData::from_descriptor(&none, "x"),
            Err(MapError::MissingPlayer)
        ));
        let two = MapDescriptor::from_json(
            "x",
            r#"{"hp": 1, "objects": [
                {"type": "Player", "pos": [0, 0]},
                {"type": "Player", "pos": [1, 0]}
            ]}"#,
        )
        .unwrap();
        assert!(matches!(
            MapData::from_descriptor(&two, "x"),
            Err(MapError::MultiplePlayers(2))
        ));
    }

    #[test]
    fn killing_boundary_defaults_to_layer_zero() {
        let record = ObjectRecord::new("KillingBondary", Offset::ZERO).with_size(Size::new(60, 30));
        let Spawn::Object(spec) = resolve(&record).unwrap() else {
            panic!("expected object");
        };
        assert_eq!(spec.layer_number, 0);
        assert_eq!(spec.kind, EntityKind::KillingBoundary);
    }

    #[test]
    fn unknown_record_fields_survive_round_trip() {
        let json = r#"{"type": "Floor", "pos": [1, 2], "size": [3, 1], "color": "red"}"#;
        let record: ObjectRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.extra.get("color"), Some(&Value::from("red")));
        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["color"], "red");
    }

    #[test]
    fn empty_map_has_only_player() {
        let desc = create_empty_map("fresh", &[]);
        let data = MapData::from_descriptor(&desc, "ignored").unwrap();
        assert_eq!(data.metadata.name, "fresh");
        assert_eq!(data.config.hp, 1);
        assert_eq!(
            data.spawns,
            vec![Spawn::Player {
                pos: EMPTY_MAP_PLAYER_POS,
                layer_number: DEFAULT_LAYER_NUMBER
            }]
        );
    }

    #[test]
    fn map_chain_advances_until_last() {
        let mut chain = MapChain::new(vec!["a.json".into(), "b.json".into()]);
        assert_eq!(chain.current_map(), Some(Path::new("a.json")));
        assert!(chain.has_next_map());
        assert!(chain.next_map());
        assert_eq!(chain.current_map(), Some(Path::new("b.json")));
        assert!(!chain.has_next_map());
        assert!(!chain.next_map());
        assert_eq!(chain.current_index(), 1);
    }
}
