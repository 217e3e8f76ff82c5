//! Object graph bridge: script values to tagged values and back.
//!
//! Entity tables reference each other freely (an actor's table can hold
//! a room, the room an object, the object the actor). Capturing never
//! follows those links: a table that carries an identity sentinel is
//! written as a by-name EntityReference and its state is captured once,
//! from the world's own entity lists.
//!
//! Sentinel precedence, on both sides: actor, then object (with an
//! optional room scope), then room.

use crate::{
    resolver::Resolver,
    script::{new_array, new_table, ScriptTable, ScriptValue, TableRef},
    value::{HashValue, TaggedValue},
};

pub const ACTOR_KEY:  &str = "_actorKey";
pub const ROOM_KEY:   &str = "_roomKey";
pub const OBJECT_KEY: &str = "_objectKey";

/// Identity sentinels in precedence order.
pub const IDENTITY_KEYS: [&str; 3] = [ACTOR_KEY, OBJECT_KEY, ROOM_KEY];

/// Nesting limit for plain tables. Deeper values are written as Null.
pub const MAX_CAPTURE_DEPTH: usize = 64;

// ── Capture ────────────────────────────────────────────────────

/// Capture any script value. Entity tables become EntityReferences.
pub fn capture(value: &ScriptValue) -> TaggedValue {
    capture_at(value, 0)
}

/// Capture the slots of an entity's own table.
///
/// The table itself is not short-circuited and its identity sentinels
/// are left out; entity tables nested inside it still are.
pub fn capture_fields(table: &TableRef) -> TaggedValue {
    let table = table.borrow();
    let fields: HashValue = table
        .iter()
        .filter(|(key, _)| !IDENTITY_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), capture_at(value, 1)))
        .collect();
    TaggedValue::Hash(fields)
}

fn capture_at(value: &ScriptValue, depth: usize) -> TaggedValue {
    if depth > MAX_CAPTURE_DEPTH {
        log::warn!("save: value nested deeper than {MAX_CAPTURE_DEPTH} levels written as null");
        return TaggedValue::Null;
    }
    match value {
        ScriptValue::Null       => TaggedValue::Null,
        ScriptValue::Bool(b)    => TaggedValue::from(*b),
        ScriptValue::Integer(i) => TaggedValue::Integer(*i),
        ScriptValue::Float(f)   => TaggedValue::Double(*f),
        ScriptValue::String(s)  => TaggedValue::String(s.clone()),
        ScriptValue::Array(a)   => a
            .borrow()
            .iter()
            .map(|item| capture_at(item, depth + 1))
            .collect(),
        ScriptValue::Table(t) => {
            let table = t.borrow();
            match entity_reference(&table) {
                Some(reference) => reference,
                None => table
                    .iter()
                    .map(|(key, item)| (key.clone(), capture_at(item, depth + 1)))
                    .collect(),
            }
        }
    }
}

/// EntityReference for a table carrying an identity sentinel.
fn entity_reference(table: &ScriptTable) -> Option<TaggedValue> {
    if let Some(actor) = table.get_str(ACTOR_KEY) {
        return Some([(ACTOR_KEY, TaggedValue::from(actor))].into_iter().collect());
    }
    if let Some(object) = table.get_str(OBJECT_KEY) {
        let mut reference = HashValue::new();
        reference.insert(OBJECT_KEY.to_string(), TaggedValue::from(object));
        if let Some(room) = table.get_str(ROOM_KEY) {
            reference.insert(ROOM_KEY.to_string(), TaggedValue::from(room));
        }
        return Some(TaggedValue::Hash(reference));
    }
    table
        .get_str(ROOM_KEY)
        .map(|room| [(ROOM_KEY, TaggedValue::from(room))].into_iter().collect())
}

/// True when `value` is a Hash carrying an identity sentinel.
pub fn is_entity_reference(value: &TaggedValue) -> bool {
    IDENTITY_KEYS.iter().any(|key| value.contains_key(key))
}

// ── Materialize ────────────────────────────────────────────────

/// Build a script value from a tagged value.
///
/// EntityReferences resolve to the existing entity table. A lookup miss
/// is logged and yields Null; it never fails the surrounding value.
pub fn materialize(value: &TaggedValue, resolver: &dyn Resolver) -> ScriptValue {
    match value {
        TaggedValue::Null       => ScriptValue::Null,
        TaggedValue::Integer(i) => ScriptValue::Integer(*i),
        TaggedValue::Double(d)  => ScriptValue::Float(*d),
        TaggedValue::String(s)  => ScriptValue::String(s.clone()),
        TaggedValue::Array(items) => {
            let array = new_array(Vec::with_capacity(items.len()));
            for item in items {
                let element = materialize(item, resolver);
                array.borrow_mut().push(element);
            }
            ScriptValue::Array(array)
        }
        TaggedValue::Hash(_) if is_entity_reference(value) => resolve_reference(value, resolver),
        TaggedValue::Hash(entries) => {
            let table = new_table();
            for (key, item) in entries {
                let slot = materialize(item, resolver);
                table.borrow_mut().set(key.clone(), slot);
            }
            ScriptValue::Table(table)
        }
    }
}

fn resolve_reference(value: &TaggedValue, resolver: &dyn Resolver) -> ScriptValue {
    let resolved = if value.contains_key(ACTOR_KEY) {
        let name = value[ACTOR_KEY].get_string();
        let found = resolver.actor(name);
        if found.is_none() {
            log::warn!("load: actor {name} not found");
        }
        found
    } else if value.contains_key(OBJECT_KEY) {
        let name = value[OBJECT_KEY].get_string();
        let found = if value.contains_key(ROOM_KEY) {
            resolver.object_in_room(value[ROOM_KEY].get_string(), name)
        } else {
            resolver.object_global(name)
        };
        if found.is_none() {
            log::warn!("load: object {name} not found");
        }
        found
    } else {
        let name = value[ROOM_KEY].get_string();
        let found = resolver.room(name);
        if found.is_none() {
            log::warn!("load: room {name} not found");
        }
        found
    };
    resolved.map(ScriptValue::Table).unwrap_or_default()
}
