//! Object graph bridge: plain values round-trip, entity tables never
//! expand, references resolve to the live entity.

mod common;

use gamesave_core::{
    bridge::{self, MAX_CAPTURE_DEPTH},
    script::{new_table, ScriptValue},
    value::{HashValue, TaggedValue},
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::rc::Rc;

/// Random reference-free tree. Keys never collide with identity sentinels.
fn random_value(rng: &mut Pcg64Mcg, depth: u32) -> TaggedValue {
    let kind = if depth >= 4 { rng.gen_range(0..4) } else { rng.gen_range(0..6) };
    match kind {
        0 => TaggedValue::Null,
        1 => TaggedValue::Integer(rng.gen()),
        2 => TaggedValue::Double(rng.gen_range(-1.0e6..1.0e6)),
        3 => TaggedValue::String(random_key(rng)),
        4 => (0..rng.gen_range(0..5))
            .map(|_| random_value(rng, depth + 1))
            .collect(),
        _ => {
            let mut hash = HashValue::new();
            for _ in 0..rng.gen_range(0..5) {
                let key = random_key(rng);
                let value = random_value(rng, depth + 1);
                hash.insert(key, value);
            }
            TaggedValue::Hash(hash)
        }
    }
}

fn random_key(rng: &mut Pcg64Mcg) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789 ";
    let len = rng.gen_range(0..10);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[test]
fn plain_values_round_trip_through_the_script_layer() {
    let world = common::build_world();
    let mut rng = Pcg64Mcg::seed_from_u64(0x5A7E_6A3E);

    for case in 0..500 {
        let original = random_value(&mut rng, 0);
        let back = bridge::capture(&bridge::materialize(&original, &world));
        assert_eq!(back, original, "round-trip diverged on case {case}");
    }
}

#[test]
fn integers_and_doubles_keep_their_kind() {
    let world = common::build_world();
    let two = bridge::materialize(&TaggedValue::Integer(2), &world);
    let two_f = bridge::materialize(&TaggedValue::Double(2.0), &world);
    assert_eq!(two, ScriptValue::Integer(2));
    assert_eq!(two_f, ScriptValue::Float(2.0));
    assert_eq!(bridge::capture(&ScriptValue::Bool(true)), TaggedValue::Integer(1));
}

#[test]
fn entity_tables_are_captured_as_references() {
    let world = common::build_world();
    let ray = common::actor_table(&world, "ray");
    let reyes = common::actor_table(&world, "reyes");

    // A reference cycle between two actors.
    ray.borrow_mut().set("partner", reyes.clone());
    reyes.borrow_mut().set("partner", ray.clone());

    let captured = bridge::capture(&ScriptValue::Table(ray.clone()));
    let expected: TaggedValue = [("_actorKey", TaggedValue::from("ray"))].into_iter().collect();
    assert_eq!(captured, expected);

    let fields = bridge::capture_fields(&ray);
    assert!(!fields.contains_key("_actorKey"), "own sentinel must not be captured");
    assert_eq!(fields["partner"]["_actorKey"].get_string(), "reyes");
    assert_eq!(fields["partner"].as_hash().len(), 1, "referenced actor must not expand");
}

#[test]
fn pseudo_objects_carry_their_room_scope() {
    let world = common::build_world();
    let boxed = world.room("Closet").and_then(|r| r.object("box")).expect("box").table.clone();

    let captured = bridge::capture(&ScriptValue::Table(boxed.clone()));
    assert_eq!(captured["_objectKey"].get_string(), "box");
    assert_eq!(captured["_roomKey"].get_string(), "Closet");

    let resolved = bridge::materialize(&captured, &world);
    let table = resolved.as_table().expect("resolves to a table");
    assert!(Rc::ptr_eq(table, &boxed), "must resolve to the pseudo room's own copy");
}

#[test]
fn references_resolve_to_live_entities() {
    let world = common::build_world();
    let reference: TaggedValue = [("_objectKey", TaggedValue::from("map"))].into_iter().collect();
    let resolved = bridge::materialize(&reference, &world);
    let map = world.object("map").expect("map").table.clone();
    assert!(Rc::ptr_eq(resolved.as_table().expect("table"), &map));

    let room: TaggedValue = [("_roomKey", TaggedValue::from("Void"))].into_iter().collect();
    let resolved = bridge::materialize(&room, &world);
    assert!(Rc::ptr_eq(resolved.as_table().expect("table"), &world.room("Void").expect("Void").table));
}

#[test]
fn unknown_reference_becomes_null_without_failing_the_container() {
    let world = common::build_world();
    let mut hash = TaggedValue::hash();
    hash.insert("ghost", TaggedValue::from_iter([("_actorKey", TaggedValue::from("nobody"))]));
    hash.insert("score", 7);

    let value = bridge::materialize(&hash, &world);
    let table = value.as_table().expect("table");
    assert!(table.borrow().get("ghost").is_null());
    assert_eq!(table.borrow().get_int("score"), Some(7));
}

#[test]
fn over_deep_nesting_is_cut_off() {
    let root = new_table();
    let mut tail = root.clone();
    for _ in 0..(MAX_CAPTURE_DEPTH + 8) {
        let next = new_table();
        tail.borrow_mut().set("next", next.clone());
        tail = next;
    }

    let captured = bridge::capture(&ScriptValue::Table(root));
    let mut cursor = &captured;
    for _ in 0..MAX_CAPTURE_DEPTH {
        cursor = &cursor["next"];
    }
    assert!(cursor.is_hash(), "values up to the limit are kept");
    assert!(cursor["next"].is_null(), "values past the limit are written as null");
}
