//! Restore: overlay a parsed snapshot onto the live world.
//!
//! EXECUTION ORDER (fixed, never reordered):
//!   1. Version gate (the only fatal step), then `preLoad`
//!   2. Game scene
//!   3. Dialog history
//!   4. Callbacks
//!   5. Globals
//!   6. Actors
//!   7. Inventory
//!   8. Rooms (and pseudo objects)
//!   9. Game time, input state, selected actor, current room
//!  10. Global objects
//!  11. `SAVEBUILD`, then `postLoad`
//!
//! RULES:
//!   - Entities are looked up by identity, never created or removed.
//!   - An entity absent from the snapshot is left untouched.
//!   - A lookup miss skips that one entry and is counted in the report.
//!   - Nothing is rolled back: steps already applied stay applied.

use crate::{
    bridge::{self, ACTOR_KEY, ROOM_KEY},
    dialog::{self, DialogConditionState},
    error::{SaveError, SaveResult},
    resolver::Resolver,
    script::{ScriptHost, ScriptValue, TableRef},
    snapshot::{fields::*, keys, SAVEGAME_VERSION},
    types::{Color, Facing, UseDirection, Vec2, ACTOR_ICON_SLOTS},
    value::TaggedValue,
    world::{Callback, SelectableMode, World, DEFAULT_RENDER_OFFSET},
};
use std::time::Duration;

/// Engine-owned actor fields; never copied onto the script table.
const ACTOR_FIELDS: [&str; 13] = [
    POS, COSTUME, COSTUME_SHEET, ROOM_KEY, COLOR, DIR, USE_DIR,
    LOCK_FACING, VOLUME, USE_POS, RENDER_OFFSET, OFFSET, ANIMATIONS,
];

/// Engine-owned object fields; never copied onto the script table.
const OBJECT_FIELDS: [&str; 6] = [STATE, TOUCHABLE, OFFSET, HIDDEN, ROTATION, COLOR];

/// What a restore applied and what it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub actors_applied:  usize,
    pub rooms_applied:   usize,
    pub objects_applied: usize,
    pub dialog_states:   usize,
    pub callbacks:       usize,
    /// Entities, objects or references that could not be found.
    pub lookup_misses:   usize,
}

pub struct RestoreCoordinator<'a> {
    world:  &'a mut World,
    host:   &'a mut dyn ScriptHost,
    report: RestoreReport,
}

impl<'a> RestoreCoordinator<'a> {
    pub fn new(world: &'a mut World, host: &'a mut dyn ScriptHost) -> Self {
        Self { world, host, report: RestoreReport::default() }
    }

    /// Apply `snapshot`. Fails only on a version mismatch, before any mutation.
    pub fn apply(mut self, snapshot: &TaggedValue) -> SaveResult<RestoreReport> {
        let version = snapshot[keys::VERSION].get_int();
        if version != SAVEGAME_VERSION {
            log::warn!("Cannot load savegame version {version}");
            return Err(SaveError::VersionMismatch { expected: SAVEGAME_VERSION, actual: version });
        }

        self.host.call("preLoad", &[]);

        self.load_game_scene(&snapshot[keys::GAME_SCENE]);
        self.load_dialog(&snapshot[keys::DIALOG]);
        self.load_callbacks(&snapshot[keys::CALLBACKS]);
        self.load_globals(&snapshot[keys::GLOBALS]);
        self.load_actors(&snapshot[keys::ACTORS]);
        self.load_inventory(&snapshot[keys::INVENTORY]);
        self.load_rooms(&snapshot[keys::ROOMS]);
        self.load_scalars(snapshot);
        self.load_objects(&snapshot[keys::OBJECTS]);

        let savebuild = snapshot[keys::SAVEBUILD].get_int();
        self.world.root.borrow_mut().set("SAVEBUILD", savebuild);
        self.host.call("postLoad", &[]);

        log::debug!("load: {:?}", self.report);
        Ok(self.report)
    }

    // ── Steps ──────────────────────────────────────────────────

    fn load_game_scene(&mut self, scene: &TaggedValue) {
        self.world.selectable_mode = SelectableMode {
            on:                     scene["actorsSelectable"].get_int() != 0,
            temporary_unselectable: scene["actorsTempUnselectable"].get_int() != 0,
        };
        self.world.force_talkie_text = scene["forceTalkieText"].get_int() != 0;

        for entry in scene["selectableActors"].as_array() {
            let key = entry[ACTOR_KEY].get_string();
            if key.is_empty() {
                continue;
            }
            let selectable = entry["selectable"].get_int() != 0;
            if !self.world.set_actor_slot_selectable(key, selectable) {
                log::warn!("load: actor {key} has no icon slot");
                self.report.lookup_misses += 1;
            }
        }
    }

    fn load_dialog(&mut self, section: &TaggedValue) {
        let mut states: Vec<DialogConditionState> = Vec::new();
        for key in section.as_hash().keys() {
            match dialog::decode(key, &*self.world) {
                Some(state) => states.push(state),
                None => self.report.lookup_misses += 1,
            }
        }
        self.report.dialog_states = states.len();
        self.world.dialogs.replace_states(states);
    }

    fn load_callbacks(&mut self, section: &TaggedValue) {
        let callbacks: Vec<Callback> = section["callbacks"]
            .as_array()
            .iter()
            .map(|entry| Callback {
                id:         entry["guid"].get_int(),
                method:     entry["function"].get_string().to_string(),
                elapsed_ms: entry["time"].get_int(),
                argument:   bridge::materialize(&entry["param"], &*self.world),
            })
            .collect();
        self.report.callbacks = callbacks.len();
        self.world.callbacks = callbacks;
        self.world.next_callback_id = section["nextGuid"].get_int();
    }

    /// Merge into `g` key by key; keys absent from the save keep their value.
    fn load_globals(&mut self, section: &TaggedValue) {
        let globals = self.world.globals.clone();
        for (key, value) in section.as_hash() {
            let value = bridge::materialize(value, &*self.world);
            globals.borrow_mut().set(key.clone(), value);
        }
    }

    fn load_actors(&mut self, section: &TaggedValue) {
        for index in 0..self.world.actors.len() {
            let key = self.world.actors[index].key.clone();
            if key.is_empty() {
                continue;
            }
            let hash = &section[key.as_str()];
            if !hash.is_hash() {
                continue;
            }
            self.load_actor(index, hash);
            self.report.actors_applied += 1;
        }
    }

    fn load_actor(&mut self, index: usize, hash: &TaggedValue) {
        let room = match &hash[ROOM_KEY] {
            TaggedValue::String(name) if !name.is_empty() => {
                if self.world.room(name).is_some() {
                    Some(Some(name.clone()))
                } else {
                    log::warn!("load: room {name} not found");
                    self.report.lookup_misses += 1;
                    None
                }
            }
            _ => Some(None),
        };

        let actor = &mut self.world.actors[index];
        actor.color = read_color(hash, COLOR);
        actor.position = read_pos(hash, POS).unwrap_or(Vec2::ZERO);
        actor.load_costume(hash[COSTUME].get_string(), hash[COSTUME_SHEET].get_string());
        if let Some(room) = room {
            actor.room = room;
        }
        actor.facing = Facing::from_i64(hash[DIR].get_int()).unwrap_or_default();
        actor.use_direction = if hash.contains_key(USE_DIR) {
            UseDirection::from_i64(hash[USE_DIR].get_int())
        } else {
            None
        };
        actor.lock_facing = Facing::from_i64(hash[LOCK_FACING].get_int());
        actor.volume = hash
            .contains_key(VOLUME)
            .then(|| hash[VOLUME].get_double() as f32);
        actor.use_position = read_pos(hash, USE_POS);
        actor.render_offset = read_pos(hash, RENDER_OFFSET).unwrap_or(DEFAULT_RENDER_OFFSET);
        actor.offset = read_pos(hash, OFFSET).unwrap_or(Vec2::ZERO);

        let table = actor.table.clone();
        let key = actor.key.clone();
        self.merge_script_fields(&table, hash, &ACTOR_FIELDS, &key);
        self.host.call_method(&table, "postLoad", &[]);
    }

    /// Restore each icon slot's inventory. Object keys that cannot be
    /// resolved at this point are dropped with a warning.
    fn load_inventory(&mut self, section: &TaggedValue) {
        let slots = section["slots"].as_array();
        for index in 0..ACTOR_ICON_SLOTS {
            let Some(actor_key) = self.world.icon_slots[index].actor.clone() else {
                continue;
            };
            let Some(slot) = slots.get(index) else {
                log::warn!("load: inventory slot {index} missing");
                continue;
            };

            let mut objects = Vec::new();
            for object in slot["objects"].as_array() {
                let object_key = object.get_string();
                if self.world.object_global(object_key).is_some() {
                    objects.push(object_key.to_string());
                } else {
                    log::warn!("load: inventory object {object_key} not found");
                    self.report.lookup_misses += 1;
                }
            }

            match self.world.actor_mut(&actor_key) {
                Some(actor) => {
                    actor.clear_inventory();
                    for object in objects {
                        actor.pick_up(object);
                    }
                    actor.inventory_offset = slot["scroll"].get_int();
                }
                None => {
                    log::warn!("load: inventory actor {actor_key} not found");
                    self.report.lookup_misses += 1;
                }
            }
        }
    }

    fn load_rooms(&mut self, section: &TaggedValue) {
        for (name, room_hash) in section.as_hash() {
            let Some(room_index) = self.world.rooms.iter().position(|r| &r.name == name) else {
                log::debug!("load: room '{name}' not loaded because it has not been found");
                self.report.lookup_misses += 1;
                continue;
            };

            if let TaggedValue::Hash(pseudo_objects) = &room_hash[PSEUDO_OBJECTS] {
                for (object_key, object_hash) in pseudo_objects {
                    let position = self.world.rooms[room_index]
                        .objects
                        .iter()
                        .position(|o| &o.key == object_key);
                    match position {
                        Some(object_index) => self.load_object(room_index, object_index, object_hash),
                        None => {
                            log::debug!(
                                "load: room '{name}' object '{object_key}' not loaded because it has not been found"
                            );
                            self.report.lookup_misses += 1;
                        }
                    }
                }
            }

            let table = self.world.rooms[room_index].table.clone();
            self.merge_script_fields(&table, room_hash, &[], name);
            self.host.call_method(&table, "postLoad", &[]);
            self.report.rooms_applied += 1;
        }
    }

    fn load_scalars(&mut self, snapshot: &TaggedValue) {
        let seconds = snapshot[keys::GAME_TIME].get_double();
        self.world.game_time = Duration::try_from_secs_f64(seconds).unwrap_or_default();
        self.world.input_state = snapshot[keys::INPUT_STATE].get_int();

        let selected = snapshot[keys::SELECTED_ACTOR].get_string();
        if self.world.actor(selected).is_some() {
            self.world.current_actor = Some(selected.to_string());
        } else {
            log::warn!("load: selected actor '{selected}' not found");
            self.report.lookup_misses += 1;
        }

        let room = snapshot[keys::CURRENT_ROOM].get_string();
        if self.world.room(room).is_some() {
            self.world.current_room = Some(room.to_string());
        } else {
            log::warn!("load: current room '{room}' not found");
            self.report.lookup_misses += 1;
        }
    }

    fn load_objects(&mut self, section: &TaggedValue) {
        for (key, hash) in section.as_hash() {
            if key.is_empty() {
                continue;
            }
            match self.world.locate_global_object(key) {
                Some((room_index, object_index)) => self.load_object(room_index, object_index, hash),
                None => {
                    log::debug!("load: object '{key}' not loaded because it has not been found");
                    self.report.lookup_misses += 1;
                }
            }
        }
    }

    // ── Shared overlays ────────────────────────────────────────

    /// Per-object overlay, shared by global and pseudo objects.
    /// Absent fields fall back to the table's `initState` / `initTouchable`
    /// or to the engine defaults.
    fn load_object(&mut self, room_index: usize, object_index: usize, hash: &TaggedValue) {
        let object = &mut self.world.rooms[room_index].objects[object_index];
        let table = object.table.clone();
        let (init_state, init_touchable) = {
            let t = table.borrow();
            (
                t.get_int("initState").unwrap_or(0),
                t.get("initTouchable").as_int().map(|v| v != 0).unwrap_or(true),
            )
        };

        object.state = if hash.contains_key(STATE) { hash[STATE].get_int() } else { init_state };
        object.touchable = if hash.contains_key(TOUCHABLE) {
            hash[TOUCHABLE].get_int() != 0
        } else {
            init_touchable
        };
        object.offset = read_pos(hash, OFFSET).unwrap_or(Vec2::ZERO);
        object.hidden = hash[HIDDEN].get_int() != 0;
        object.rotation = hash[ROTATION].get_double() as f32;
        object.color = read_color(hash, COLOR);

        let key = object.key.clone();
        self.merge_script_fields(&table, hash, &OBJECT_FIELDS, &key);
        self.report.objects_applied += 1;
    }

    /// Copy every script field of `hash` onto `table`. Keys starting with
    /// `_` belong to the engine: known ones were applied by the caller,
    /// unknown ones are logged and dropped.
    fn merge_script_fields(
        &mut self,
        table: &TableRef,
        hash: &TaggedValue,
        engine_fields: &[&str],
        owner: &str,
    ) {
        for (key, value) in hash.as_hash() {
            if key.is_empty() || key.starts_with('_') {
                if key != PSEUDO_OBJECTS && !engine_fields.contains(&key.as_str()) {
                    log::trace!(
                        "load: {owner} property '{key}' not loaded (type={})",
                        value.type_name()
                    );
                }
                continue;
            }
            let slot: ScriptValue = bridge::materialize(value, &*self.world);
            table.borrow_mut().set(key.clone(), slot);
        }
    }
}

fn read_pos(hash: &TaggedValue, key: &str) -> Option<Vec2> {
    if !hash.contains_key(key) {
        return None;
    }
    Some(Vec2::parse_save_string(hash[key].get_string()).unwrap_or(Vec2::ZERO))
}

fn read_color(hash: &TaggedValue, key: &str) -> Color {
    if hash.contains_key(key) {
        Color::from_integer(hash[key].get_int() as u32)
    } else {
        Color::WHITE
    }
}
