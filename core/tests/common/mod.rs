//! Shared fixtures: a small two-actor world and scratch directories.
#![allow(dead_code)]

use gamesave_core::{
    script::ScriptValue,
    types::Vec2,
    world::{Actor, Object, ObjectKind, Room, World},
};
use std::path::PathBuf;

/// Street (with two pickups, a lamp and a spot), an empty Void, and a
/// pseudo room Closet holding its own `box`. `ray` stands in Street with
/// both pickups; `reyes` has no room.
pub fn build_world() -> World {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut world = World::new();

    let street = world.add_room(Room::new("Street"));
    street.add_object(Object::new("key_brass"));
    street.add_object(Object::new("map"));
    let lamp = street.add_object(Object::new("lamp"));
    lamp.table.borrow_mut().set("initState", 1);
    lamp.state = 1;
    street.add_object(Object::new("manhole").with_kind(ObjectKind::Spot));

    world.add_room(Room::new("Void"));

    let closet = world.add_room(Room::pseudo("Closet"));
    closet.add_object(Object::new("box"));

    let ray = world.add_actor(Actor::new("ray"));
    ray.position = Vec2::new(120.0, 80.0);
    ray.room = Some("Street".to_string());
    ray.load_costume("Costumes/RayAnimation.json", "");
    ray.pick_up("key_brass");
    ray.pick_up("map");
    ray.inventory_offset = 3;

    world.add_actor(Actor::new("reyes"));

    world.set_icon_slot(0, "ray", true);
    world.set_icon_slot(1, "reyes", false);
    world.current_actor = Some("ray".to_string());
    world.current_room = Some("Street".to_string());

    world.dialogs.register_definition("RayStreetDialog");
    world.dialogs.register_definition("Act2Dialog");

    world.globals.borrow_mut().set("act", 2);
    world.globals.borrow_mut().set("chapter", "The Street");
    world
}

pub fn actor_table(world: &World, key: &str) -> gamesave_core::script::TableRef {
    world.actor(key).expect("actor exists").table.clone()
}

pub fn global(world: &World, key: &str) -> ScriptValue {
    world.globals.borrow().get(key)
}

/// Fresh, empty directory under the system temp dir.
pub fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gamesave-{tag}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
