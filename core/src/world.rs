//! The live world graph: rooms, actors, objects and the session state
//! around them.
//!
//! RULE: Entities are created only by world authoring (the builder
//! methods below). Save and load read and overlay them; they never add
//! or remove one.

use crate::{
    bridge::{ACTOR_KEY, OBJECT_KEY, ROOM_KEY},
    dialog::DialogManager,
    resolver::Resolver,
    script::{new_table, ScriptValue, TableRef},
    types::{Color, EntityKey, Facing, UseDirection, Vec2, ACTOR_ICON_SLOTS},
};
use std::path::Path;
use std::time::Duration;

/// Actor render offset when none was set by a script.
pub const DEFAULT_RENDER_OFFSET: Vec2 = Vec2::new(0.0, 45.0);

// ── Actors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Actor {
    /// Identity key. Empty for engine-internal actors, which are never saved.
    pub key:              EntityKey,
    pub table:            TableRef,
    pub position:         Vec2,
    /// Costume file path as loaded by the animation layer.
    pub costume:          String,
    pub costume_sheet:    String,
    pub facing:           Facing,
    pub lock_facing:      Option<Facing>,
    pub volume:           Option<f32>,
    pub use_direction:    Option<UseDirection>,
    pub use_position:     Option<Vec2>,
    pub render_offset:    Vec2,
    pub offset:           Vec2,
    pub color:            Color,
    pub room:             Option<EntityKey>,
    /// Object keys in pickup order.
    pub inventory:        Vec<EntityKey>,
    pub inventory_offset: i64,
}

impl Actor {
    pub fn new(key: impl Into<EntityKey>) -> Self {
        let key = key.into();
        let table = new_table();
        if !key.is_empty() {
            table.borrow_mut().set(ACTOR_KEY, key.as_str());
        }
        Self {
            key,
            table,
            position:         Vec2::ZERO,
            costume:          String::new(),
            costume_sheet:    String::new(),
            facing:           Facing::Front,
            lock_facing:      None,
            volume:           None,
            use_direction:    None,
            use_position:     None,
            render_offset:    DEFAULT_RENDER_OFFSET,
            offset:           Vec2::ZERO,
            color:            Color::WHITE,
            room:             None,
            inventory:        Vec::new(),
            inventory_offset: 0,
        }
    }

    /// Costume file name without directories or extension.
    pub fn costume_name(&self) -> String {
        Path::new(&self.costume)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn load_costume(&mut self, costume: &str, sheet: &str) {
        self.costume = costume.to_string();
        self.costume_sheet = sheet.to_string();
    }

    pub fn pick_up(&mut self, object_key: impl Into<EntityKey>) {
        self.inventory.push(object_key.into());
    }

    pub fn clear_inventory(&mut self) {
        self.inventory.clear();
    }
}

// ── Objects ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectKind {
    #[default]
    Object,
    Spot,
    Trigger,
    Prop,
}

#[derive(Debug)]
pub struct Object {
    pub key:       EntityKey,
    pub kind:      ObjectKind,
    pub table:     TableRef,
    /// Index of the current state animation.
    pub state:     i64,
    pub touchable: bool,
    pub offset:    Vec2,
    pub hidden:    bool,
    pub rotation:  f32,
    pub color:     Color,
}

impl Object {
    pub fn new(key: impl Into<EntityKey>) -> Self {
        let key = key.into();
        let table = new_table();
        table.borrow_mut().set(OBJECT_KEY, key.as_str());
        Self {
            key,
            kind:      ObjectKind::Object,
            table,
            state:     0,
            touchable: true,
            offset:    Vec2::ZERO,
            hidden:    false,
            rotation:  0.0,
            color:     Color::WHITE,
        }
    }

    pub fn with_kind(mut self, kind: ObjectKind) -> Self {
        self.kind = kind;
        self
    }
}

// ── Rooms ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Room {
    pub name:    EntityKey,
    pub table:   TableRef,
    /// Pseudo rooms hold private object copies, saved under the room.
    pub pseudo:  bool,
    pub objects: Vec<Object>,
}

impl Room {
    pub fn new(name: impl Into<EntityKey>) -> Self {
        let name = name.into();
        let table = new_table();
        table.borrow_mut().set(ROOM_KEY, name.as_str());
        Self { name, table, pseudo: false, objects: Vec::new() }
    }

    pub fn pseudo(name: impl Into<EntityKey>) -> Self {
        Self { pseudo: true, ..Self::new(name) }
    }

    /// Add an object. Objects of a pseudo room are scoped to it by name.
    pub fn add_object(&mut self, object: Object) -> &mut Object {
        if self.pseudo {
            object.table.borrow_mut().set(ROOM_KEY, self.name.as_str());
        }
        self.objects.push(object);
        let last = self.objects.len() - 1;
        &mut self.objects[last]
    }

    pub fn object(&self, key: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.key == key)
    }

    pub fn object_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.objects.iter_mut().find(|o| o.key == key)
    }
}

// ── Session state ──────────────────────────────────────────────

/// A deferred one-shot script call.
#[derive(Debug, Clone)]
pub struct Callback {
    pub id:         i64,
    pub method:     String,
    pub elapsed_ms: i64,
    pub argument:   ScriptValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorIconSlot {
    pub actor:      Option<EntityKey>,
    pub selectable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectableMode {
    pub on:                     bool,
    pub temporary_unselectable: bool,
}

pub struct World {
    pub game_guid:         String,
    pub rooms:             Vec<Room>,
    pub actors:            Vec<Actor>,
    /// Script root table; holds `g` and engine-set globals such as `SAVEBUILD`.
    pub root:              TableRef,
    /// The global namespace `g`.
    pub globals:           TableRef,
    pub callbacks:         Vec<Callback>,
    pub next_callback_id:  i64,
    pub dialogs:           DialogManager,
    pub icon_slots:        [ActorIconSlot; ACTOR_ICON_SLOTS],
    pub selectable_mode:   SelectableMode,
    pub force_talkie_text: bool,
    pub game_time:         Duration,
    pub input_state:       i64,
    pub current_room:      Option<EntityKey>,
    pub current_actor:     Option<EntityKey>,
}

impl Default for World {
    fn default() -> Self { Self::new() }
}

impl World {
    pub fn new() -> Self {
        let root = new_table();
        let globals = new_table();
        root.borrow_mut().set("g", globals.clone());
        Self {
            game_guid:         uuid::Uuid::new_v4().to_string(),
            rooms:             Vec::new(),
            actors:            Vec::new(),
            root,
            globals,
            callbacks:         Vec::new(),
            next_callback_id:  1,
            dialogs:           DialogManager::new(),
            icon_slots:        Default::default(),
            selectable_mode:   SelectableMode { on: true, temporary_unselectable: false },
            force_talkie_text: false,
            game_time:         Duration::ZERO,
            input_state:       0,
            current_room:      None,
            current_actor:     None,
        }
    }

    // ── Authoring ──────────────────────────────────────────────

    pub fn add_room(&mut self, room: Room) -> &mut Room {
        self.rooms.push(room);
        let last = self.rooms.len() - 1;
        &mut self.rooms[last]
    }

    pub fn add_actor(&mut self, actor: Actor) -> &mut Actor {
        self.actors.push(actor);
        let last = self.actors.len() - 1;
        &mut self.actors[last]
    }

    /// Put an actor in an icon slot (0-based).
    pub fn set_icon_slot(&mut self, slot: usize, actor: &str, selectable: bool) {
        if let Some(s) = self.icon_slots.get_mut(slot) {
            s.actor = Some(actor.to_string());
            s.selectable = selectable;
        }
    }

    /// Set the selectable flag of the slot holding `actor`.
    pub fn set_actor_slot_selectable(&mut self, actor: &str, selectable: bool) -> bool {
        match self.icon_slots.iter_mut().find(|s| s.actor.as_deref() == Some(actor)) {
            Some(slot) => {
                slot.selectable = selectable;
                true
            }
            None => false,
        }
    }

    /// Schedule a callback and return its id.
    pub fn add_callback(&mut self, method: &str, elapsed_ms: i64, argument: ScriptValue) -> i64 {
        let id = self.next_callback_id;
        self.next_callback_id += 1;
        self.callbacks.push(Callback { id, method: method.to_string(), elapsed_ms, argument });
        id
    }

    // ── Lookup ─────────────────────────────────────────────────

    pub fn actor(&self, key: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| !a.key.is_empty() && a.key == key)
    }

    pub fn actor_mut(&mut self, key: &str) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| !a.key.is_empty() && a.key == key)
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name)
    }

    pub fn room_mut(&mut self, name: &str) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.name == name)
    }

    /// First global object with this key, as (room index, object index).
    /// Pseudo rooms are skipped: their copies are reached through the room.
    pub fn locate_global_object(&self, key: &str) -> Option<(usize, usize)> {
        self.rooms
            .iter()
            .enumerate()
            .filter(|(_, room)| !room.pseudo)
            .find_map(|(r, room)| room.objects.iter().position(|o| o.key == key).map(|o| (r, o)))
    }

    /// Global object by key; never a pseudo-room copy.
    pub fn object(&self, key: &str) -> Option<&Object> {
        self.locate_global_object(key).map(|(r, o)| &self.rooms[r].objects[o])
    }

    pub fn object_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.locate_global_object(key).map(move |(r, o)| &mut self.rooms[r].objects[o])
    }
}

impl Resolver for World {
    fn actor(&self, key: &str) -> Option<TableRef> {
        World::actor(self, key).map(|a| a.table.clone())
    }

    fn room(&self, name: &str) -> Option<TableRef> {
        World::room(self, name).map(|r| r.table.clone())
    }

    fn object_global(&self, key: &str) -> Option<TableRef> {
        World::object(self, key).map(|o| o.table.clone())
    }

    fn object_in_room(&self, room: &str, key: &str) -> Option<TableRef> {
        World::room(self, room)
            .and_then(|r| r.object(key))
            .map(|o| o.table.clone())
    }

    fn has_dialog(&self, name: &str) -> bool {
        self.dialogs.has_definition(name)
    }
}
