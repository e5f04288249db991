//! Map files: parsing, validation, persistence and chains.

use std::path::PathBuf;

use tofu_byte::core::map::{
    create_empty_map, load_map, MapChain, MapData, MapDescriptor, MapError,
};
use tofu_byte::types::{Offset, EMPTY_MAP_PLAYER_POS};

fn maps_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("maps")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tofu-byte-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn resolve(json: &str) -> Result<MapData, MapError> {
    let desc = MapDescriptor::from_json("inline", json)?;
    MapData::from_descriptor(&desc, "inline")
}

#[test]
fn bundled_maps_load() {
    let chain = MapChain::from_dir(&maps_dir()).unwrap();
    assert!(chain.maps().len() >= 2);
    for path in chain.maps() {
        let map = load_map(path).unwrap();
        assert!(map.config.hp > 0, "{}", path.display());
    }
}

#[test]
fn chain_from_dir_is_sorted() {
    let chain = MapChain::from_dir(&maps_dir()).unwrap();
    let mut sorted = chain.maps().to_vec();
    sorted.sort();
    assert_eq!(chain.maps(), sorted.as_slice());
    assert_eq!(chain.current_index(), 0);
}

#[test]
fn empty_dir_is_an_error() {
    let dir = scratch_dir("empty-chain");
    assert!(matches!(
        MapChain::from_dir(&dir),
        Err(MapError::EmptyChain { .. })
    ));
}

#[test]
fn config_counts_stars_and_end_balls() {
    let map = resolve(
        r#"{"hp": 4, "objects": [
            {"type": "Player", "pos": [1, 1]},
            {"type": "Star", "pos": [2, 1]},
            {"type": "Star", "pos": [3, 1]},
            {"type": "EndBall", "pos": [5, 1]}
        ]}"#,
    )
    .unwrap();
    assert_eq!(map.config.hp, 4);
    assert_eq!(map.config.points, 2);
    assert!(map.config.winning_ball);
    assert_eq!(map.metadata.name, "inline");
}

#[test]
fn invalid_maps_are_rejected() {
    assert!(matches!(
        resolve(r#"{"hp": 1, "objects": [{"type": "Floor", "pos": [0, 0], "size": [2, 1]}]}"#),
        Err(MapError::MissingPlayer)
    ));
    assert!(matches!(
        resolve(
            r#"{"hp": 1, "objects": [
                {"type": "Player", "pos": [0, 0]},
                {"type": "Player", "pos": [1, 0]}
            ]}"#
        ),
        Err(MapError::MultiplePlayers(2))
    ));
    assert!(matches!(
        resolve(r#"{"hp": 1, "objects": [{"type": "Ladder", "pos": [0, 0]}]}"#),
        Err(MapError::UnknownType(t)) if t == "Ladder"
    ));
    assert!(matches!(
        resolve(
            r#"{"hp": 1, "objects": [
                {"type": "Player", "pos": [0, 0]},
                {"type": "Floor", "pos": [0, 1]}
            ]}"#
        ),
        Err(MapError::MissingField { field: "size", .. })
    ));
    assert!(matches!(
        resolve(r#"{"objects": []}"#),
        Err(MapError::Parse { .. })
    ));
}

#[test]
fn missing_file_reports_its_path() {
    let err = load_map(&PathBuf::from("/nonexistent/tofu.json")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/tofu.json"));
}

#[test]
fn saved_descriptor_reads_back_with_unknown_fields() {
    let json = r#"{"name": "keep", "hp": 2, "objects": [
        {"type": "Player", "pos": [3, 4], "color": "teal"},
        {"type": "Text", "pos": [0, 0], "size": [5, 1], "text_value": "hello"}
    ]}"#;
    let desc = MapDescriptor::from_json("keep", json).unwrap();
    let path = scratch_dir("roundtrip").join("keep.json");
    desc.save(&path).unwrap();

    let back = MapDescriptor::read(&path).unwrap();
    assert_eq!(back, desc);
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["objects"][0]["color"], "teal");
    assert_eq!(value["objects"][1]["text_value"], "hello");
}

#[test]
fn new_maps_hold_only_the_player() {
    let desc = create_empty_map("blank", &[]);
    assert_eq!(desc.hp, 1);
    assert_eq!(desc.objects.len(), 1);
    let map = MapData::from_descriptor(&desc, "unused").unwrap();
    assert_eq!(map.metadata.name, "blank");
    assert_eq!(EMPTY_MAP_PLAYER_POS, Offset::new(10, 10));
}
