//! Snapshot assembly: the live world to one tagged value tree.
//!
//! A snapshot is a Hash with a fixed key set, one sub-tree per section.
//! Each section is built independently and tolerates missing optional
//! data. Fields equal to their documented default are omitted; the load
//! side reads an absent field as that default.

use crate::{
    bridge::{self, ACTOR_KEY, ROOM_KEY},
    dialog,
    script::ScriptValue,
    types::{Color, Vec2},
    value::{HashValue, TaggedValue},
    world::{Actor, Object, ObjectKind, World, DEFAULT_RENDER_OFFSET},
};

/// The only savegame version this core reads or writes.
pub const SAVEGAME_VERSION: i64 = 2;

/// Root keys.
pub mod keys {
    pub const VERSION:        &str = "version";
    pub const SAVEBUILD:      &str = "savebuild";
    pub const GAME_GUID:      &str = "gameGUID";
    pub const CURRENT_ROOM:   &str = "currentRoom";
    pub const SELECTED_ACTOR: &str = "selectedActor";
    pub const GAME_TIME:      &str = "gameTime";
    pub const INPUT_STATE:    &str = "inputState";
    pub const SAVETIME:       &str = "savetime";
    pub const EASY_MODE:      &str = "easy_mode";
    pub const ACTORS:         &str = "actors";
    pub const ROOMS:          &str = "rooms";
    pub const OBJECTS:        &str = "objects";
    pub const INVENTORY:      &str = "inventory";
    pub const CALLBACKS:      &str = "callbacks";
    pub const DIALOG:         &str = "dialog";
    pub const GLOBALS:        &str = "globals";
    pub const GAME_SCENE:     &str = "gameScene";
}

/// Engine-owned entity fields. Script fields never start with `_`.
pub mod fields {
    pub const POS:            &str = "_pos";
    pub const COSTUME:        &str = "_costume";
    pub const COSTUME_SHEET:  &str = "_costumeSheet";
    pub const DIR:            &str = "_dir";
    pub const LOCK_FACING:    &str = "_lockFacing";
    pub const VOLUME:         &str = "_volume";
    pub const USE_DIR:        &str = "_useDir";
    pub const USE_POS:        &str = "_usePos";
    pub const RENDER_OFFSET:  &str = "_renderOffset";
    pub const OFFSET:         &str = "_offset";
    pub const COLOR:          &str = "_color";
    pub const STATE:          &str = "_state";
    pub const TOUCHABLE:      &str = "_touchable";
    pub const HIDDEN:         &str = "_hidden";
    pub const ROTATION:       &str = "_rotation";
    pub const PSEUDO_OBJECTS: &str = "_pseudoObjects";
    pub const ANIMATIONS:     &str = "_animations";
}

use fields::*;

pub struct SnapshotAssembler<'a> {
    world:     &'a World,
    savebuild: i64,
}

impl<'a> SnapshotAssembler<'a> {
    pub fn new(world: &'a World, savebuild: i64) -> Self {
        Self { world, savebuild }
    }

    /// Build the complete snapshot. `savetime` is Unix seconds.
    pub fn assemble(&self, savetime: i64) -> TaggedValue {
        let world = self.world;
        let mut root = HashValue::new();
        root.insert(keys::ACTORS.into(),     self.actors());
        root.insert(keys::CALLBACKS.into(),  self.callbacks());
        root.insert(keys::DIALOG.into(),     self.dialog());
        root.insert(keys::GAME_SCENE.into(), self.game_scene());
        root.insert(keys::GLOBALS.into(),    self.globals());
        root.insert(keys::INVENTORY.into(),  self.inventory());
        root.insert(keys::OBJECTS.into(),    self.objects());
        root.insert(keys::ROOMS.into(),      self.rooms());

        root.insert(keys::CURRENT_ROOM.into(),   world.current_room.clone().unwrap_or_default().into());
        root.insert(keys::SELECTED_ACTOR.into(), world.current_actor.clone().unwrap_or_default().into());
        root.insert(keys::GAME_TIME.into(),      world.game_time.as_secs_f64().into());
        root.insert(keys::INPUT_STATE.into(),    world.input_state.into());
        root.insert(keys::EASY_MODE.into(),      self.easy_mode().into());
        root.insert(keys::GAME_GUID.into(),      world.game_guid.as_str().into());
        root.insert(keys::SAVEBUILD.into(),      self.savebuild.into());
        root.insert(keys::SAVETIME.into(),       savetime.into());
        root.insert(keys::VERSION.into(),        SAVEGAME_VERSION.into());

        log::debug!(
            "snapshot: {} actors, {} rooms, {} callbacks",
            root[keys::ACTORS].as_hash().len(),
            root[keys::ROOMS].as_hash().len(),
            world.callbacks.len()
        );
        TaggedValue::Hash(root)
    }

    // ── Sections ───────────────────────────────────────────────

    /// Actors keyed by identity. Actors with an empty key are skipped.
    pub fn actors(&self) -> TaggedValue {
        self.world
            .actors
            .iter()
            .filter(|a| !a.key.is_empty())
            .map(|a| (a.key.clone(), actor_hash(a)))
            .collect()
    }

    /// Room script fields, plus `_pseudoObjects` for pseudo rooms.
    pub fn rooms(&self) -> TaggedValue {
        self.world
            .rooms
            .iter()
            .map(|room| {
                let mut hash = bridge::capture_fields(&room.table);
                if room.pseudo {
                    let objects: TaggedValue = room
                        .objects
                        .iter()
                        .map(|o| (o.key.clone(), object_hash(o)))
                        .collect();
                    hash.insert(PSEUDO_OBJECTS, objects);
                }
                (room.name.clone(), hash)
            })
            .collect()
    }

    /// Objects of kind `Object` outside pseudo rooms.
    pub fn objects(&self) -> TaggedValue {
        self.world
            .rooms
            .iter()
            .filter(|room| !room.pseudo)
            .flat_map(|room| room.objects.iter())
            .filter(|o| o.kind == ObjectKind::Object)
            .map(|o| (o.key.clone(), object_hash(o)))
            .collect()
    }

    pub fn inventory(&self) -> TaggedValue {
        let slots: TaggedValue = self
            .world
            .icon_slots
            .iter()
            .map(|slot| -> TaggedValue {
                let actor = slot.actor.as_deref().and_then(|key| self.world.actor(key));
                match actor {
                    Some(actor) => {
                        let objects: TaggedValue = actor
                            .inventory
                            .iter()
                            .map(|key| TaggedValue::from(key.as_str()))
                            .collect();
                        [
                            ("objects", objects),
                            ("scroll", actor.inventory_offset.into()),
                        ]
                        .into_iter()
                        .collect()
                    }
                    None => [("scroll", TaggedValue::from(0))].into_iter().collect(),
                }
            })
            .collect();
        [("slots", slots)].into_iter().collect()
    }

    pub fn callbacks(&self) -> TaggedValue {
        let callbacks: TaggedValue = self
            .world
            .callbacks
            .iter()
            .map(|cb| -> TaggedValue {
                let mut hash: TaggedValue = [
                    ("function", TaggedValue::from(cb.method.as_str())),
                    ("guid", cb.id.into()),
                    ("time", cb.elapsed_ms.into()),
                ]
                .into_iter()
                .collect();
                if !cb.argument.is_null() {
                    hash.insert("param", bridge::capture(&cb.argument));
                }
                hash
            })
            .collect();
        [
            ("callbacks", callbacks),
            ("nextGuid", self.world.next_callback_id.into()),
        ]
        .into_iter()
        .collect()
    }

    /// Dialog history keyed by encoded state; temp-once lines are left out.
    pub fn dialog(&self) -> TaggedValue {
        self.world
            .dialogs
            .states()
            .iter()
            .filter_map(|state| {
                dialog::encode(state).map(|key| (key, TaggedValue::from(dialog::flag_for(state.mode))))
            })
            .collect()
    }

    /// The whole `g` namespace in one bridge call.
    pub fn globals(&self) -> TaggedValue {
        bridge::capture(&ScriptValue::Table(self.world.globals.clone()))
    }

    pub fn game_scene(&self) -> TaggedValue {
        let world = self.world;
        let selectable_actors: TaggedValue = world
            .icon_slots
            .iter()
            .map(|slot| -> TaggedValue {
                match &slot.actor {
                    Some(key) => [
                        (ACTOR_KEY, TaggedValue::from(key.as_str())),
                        ("selectable", slot.selectable.into()),
                    ]
                    .into_iter()
                    .collect(),
                    None => [("selectable", TaggedValue::from(0))].into_iter().collect(),
                }
            })
            .collect();
        [
            ("actorsSelectable", TaggedValue::from(world.selectable_mode.on)),
            ("actorsTempUnselectable", world.selectable_mode.temporary_unselectable.into()),
            ("forceTalkieText", world.force_talkie_text.into()),
            ("selectableActors", selectable_actors),
        ]
        .into_iter()
        .collect()
    }

    fn easy_mode(&self) -> i64 {
        self.world.globals.borrow().get("easy_mode").as_int().unwrap_or(0)
    }
}

fn actor_hash(actor: &Actor) -> TaggedValue {
    let mut hash = bridge::capture_fields(&actor.table);
    hash.insert(COSTUME, actor.costume_name());
    hash.insert(DIR, actor.facing as i64);
    hash.insert(LOCK_FACING, actor.lock_facing.map(|f| f as i64).unwrap_or(0));
    hash.insert(POS, actor.position.to_save_string());
    if let Some(volume) = actor.volume {
        hash.insert(VOLUME, volume);
    }
    if let Some(use_dir) = actor.use_direction {
        hash.insert(USE_DIR, use_dir as i64);
        hash.insert(USE_POS, actor.use_position.unwrap_or(Vec2::ZERO).to_save_string());
    }
    if actor.render_offset != DEFAULT_RENDER_OFFSET {
        hash.insert(RENDER_OFFSET, actor.render_offset.to_save_string());
    }
    if actor.offset != Vec2::ZERO {
        hash.insert(OFFSET, actor.offset.to_save_string());
    }
    if actor.color != Color::WHITE {
        hash.insert(COLOR, i64::from(actor.color.to_integer()));
    }
    if !actor.costume_sheet.is_empty() {
        hash.insert(COSTUME_SHEET, actor.costume_sheet.as_str());
    }
    hash.insert(ROOM_KEY, TaggedValue::from(actor.room.clone()));
    hash
}

fn object_hash(object: &Object) -> TaggedValue {
    let mut hash = bridge::capture_fields(&object.table);
    if object.state != 0 {
        hash.insert(STATE, object.state);
    }
    if !object.touchable {
        hash.insert(TOUCHABLE, false);
    }
    if object.offset != Vec2::ZERO {
        hash.insert(OFFSET, object.offset.to_save_string());
    }
    hash.insert(HIDDEN, object.hidden);
    hash.insert(ROTATION, object.rotation);
    if object.color != Color::WHITE {
        hash.insert(COLOR, i64::from(object.color.to_integer()));
    }
    hash
}
