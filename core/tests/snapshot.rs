//! Snapshot layout: root keys, per-section shape and default omission.

mod common;

use gamesave_core::{
    script::ScriptValue,
    snapshot::{keys, SnapshotAssembler, SAVEGAME_VERSION},
    types::{Color, UseDirection, Vec2},
    value::TaggedValue,
};

const SAVETIME: i64 = 1_700_000_000;

fn assemble(world: &gamesave_core::world::World) -> TaggedValue {
    SnapshotAssembler::new(world, 958).assemble(SAVETIME)
}

#[test]
fn root_has_the_fixed_key_set() {
    let snapshot = assemble(&common::build_world());
    let mut found: Vec<&str> = snapshot.as_hash().keys().map(String::as_str).collect();
    found.sort_unstable();
    let mut expected = vec![
        "actors", "callbacks", "currentRoom", "dialog", "easy_mode", "gameGUID",
        "gameScene", "gameTime", "globals", "inputState", "inventory", "objects",
        "rooms", "savebuild", "savetime", "selectedActor", "version",
    ];
    expected.sort_unstable();
    assert_eq!(found, expected);

    assert_eq!(snapshot[keys::VERSION].get_int(), SAVEGAME_VERSION);
    assert_eq!(snapshot[keys::SAVEBUILD].get_int(), 958);
    assert_eq!(snapshot[keys::SAVETIME].get_int(), SAVETIME);
    assert_eq!(snapshot[keys::CURRENT_ROOM].get_string(), "Street");
    assert_eq!(snapshot[keys::SELECTED_ACTOR].get_string(), "ray");
    assert!(!snapshot[keys::GAME_GUID].get_string().is_empty());
}

#[test]
fn actor_fields_omit_defaults() {
    let snapshot = assemble(&common::build_world());
    let ray = &snapshot["actors"]["ray"];

    assert_eq!(ray["_pos"].get_string(), "{120,80}");
    assert_eq!(ray["_costume"].get_string(), "RayAnimation");
    assert_eq!(ray["_roomKey"].get_string(), "Street");
    assert_eq!(ray["_dir"].get_int(), 1);
    assert_eq!(ray["_lockFacing"].get_int(), 0);
    for omitted in ["_renderOffset", "_offset", "_color", "_volume", "_useDir", "_usePos", "_costumeSheet"] {
        assert!(!ray.contains_key(omitted), "{omitted} should be omitted at its default");
    }
}

#[test]
fn non_default_actor_fields_are_written() {
    let mut world = common::build_world();
    let ray = world.actor_mut("ray").expect("ray");
    ray.render_offset = Vec2::new(0.0, 30.0);
    ray.color = Color::rgba(255, 0, 0, 255);
    ray.use_direction = Some(UseDirection::Left);
    ray.use_position = Some(Vec2::new(10.0, 20.0));
    ray.volume = Some(0.5);

    let snapshot = assemble(&world);
    let ray = &snapshot["actors"]["ray"];
    assert_eq!(ray["_renderOffset"].get_string(), "{0,30}");
    assert_eq!(ray["_color"].get_int(), 0xFF00_00FF);
    assert_eq!(ray["_useDir"].get_int(), 4);
    assert_eq!(ray["_usePos"].get_string(), "{10,20}");
    assert_eq!(ray["_volume"].get_double(), 0.5);
}

#[test]
fn roomless_actor_writes_explicit_null() {
    let snapshot = assemble(&common::build_world());
    let reyes = &snapshot["actors"]["reyes"];
    assert!(reyes.contains_key("_roomKey"));
    assert!(reyes["_roomKey"].is_null());
}

#[test]
fn unkeyed_actors_are_not_saved() {
    let mut world = common::build_world();
    world.add_actor(gamesave_core::world::Actor::new(""));
    let snapshot = assemble(&world);
    assert_eq!(snapshot["actors"].as_hash().len(), 2);
}

#[test]
fn objects_and_pseudo_objects_are_separate() {
    let mut world = common::build_world();
    world.object_mut("key_brass").expect("key").hidden = true;

    let snapshot = assemble(&world);
    let objects = &snapshot["objects"];
    assert!(objects.contains_key("key_brass"));
    assert!(objects.contains_key("lamp"));
    assert!(!objects.contains_key("manhole"), "spots are not saved");
    assert!(!objects.contains_key("box"), "pseudo objects live under their room");

    assert_eq!(objects["key_brass"]["_hidden"].get_int(), 1);
    assert_eq!(objects["lamp"]["_state"].get_int(), 1);
    assert!(!objects["map"].contains_key("_state"));
    assert!(!objects["map"].contains_key("_touchable"));

    let closet = &snapshot["rooms"]["Closet"];
    assert!(closet["_pseudoObjects"].contains_key("box"));
    assert!(!snapshot["rooms"]["Street"].contains_key("_pseudoObjects"));
}

#[test]
fn inventory_has_six_slots() {
    let snapshot = assemble(&common::build_world());
    let slots = snapshot["inventory"]["slots"].as_array();
    assert_eq!(slots.len(), 6);

    let objects: Vec<&str> = slots[0]["objects"].as_array().iter().map(|v| v.get_string()).collect();
    assert_eq!(objects, ["key_brass", "map"]);
    assert_eq!(slots[0]["scroll"].get_int(), 3);

    assert!(slots[1]["objects"].as_array().is_empty());
    let empty: TaggedValue = [("scroll", TaggedValue::from(0))].into_iter().collect();
    assert_eq!(slots[2], empty);
}

#[test]
fn callbacks_keep_ids_and_counter() {
    let mut world = common::build_world();
    let first = world.add_callback("openGate", 1500, ScriptValue::from("north"));
    let second = world.add_callback("honk", 250, ScriptValue::Null);

    let section = SnapshotAssembler::new(&world, 958).callbacks();
    let records = section["callbacks"].as_array();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["guid"].get_int(), first);
    assert_eq!(records[0]["function"].get_string(), "openGate");
    assert_eq!(records[0]["time"].get_int(), 1500);
    assert_eq!(records[0]["param"].get_string(), "north");
    assert_eq!(records[1]["guid"].get_int(), second);
    assert!(!records[1].contains_key("param"), "null argument is omitted");
    assert_eq!(section["nextGuid"].get_int(), second + 1);
}

#[test]
fn game_scene_lists_icon_slots() {
    let mut world = common::build_world();
    world.force_talkie_text = true;
    let scene = SnapshotAssembler::new(&world, 958).game_scene();

    assert_eq!(scene["actorsSelectable"].get_int(), 1);
    assert_eq!(scene["actorsTempUnselectable"].get_int(), 0);
    assert_eq!(scene["forceTalkieText"].get_int(), 1);

    let slots = scene["selectableActors"].as_array();
    assert_eq!(slots.len(), 6);
    assert_eq!(slots[0]["_actorKey"].get_string(), "ray");
    assert_eq!(slots[0]["selectable"].get_int(), 1);
    assert_eq!(slots[1]["selectable"].get_int(), 0);
    assert!(!slots[3].contains_key("_actorKey"));
}

#[test]
fn globals_and_easy_mode() {
    let mut world = common::build_world();
    world.globals.borrow_mut().set("easy_mode", 1);
    let hero = common::actor_table(&world, "ray");
    world.globals.borrow_mut().set("hero", hero);

    let snapshot = assemble(&world);
    assert_eq!(snapshot["easy_mode"].get_int(), 1);
    assert_eq!(snapshot["globals"]["act"].get_int(), 2);
    assert_eq!(snapshot["globals"]["chapter"].get_string(), "The Street");
    assert_eq!(snapshot["globals"]["hero"]["_actorKey"].get_string(), "ray");
}

#[test]
fn container_is_json() {
    let snapshot = assemble(&common::build_world());
    let text = serde_json::to_string(&snapshot).expect("serialize");
    let back: TaggedValue = serde_json::from_str(&text).expect("parse");
    assert_eq!(back, snapshot);
}
