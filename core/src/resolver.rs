//! Entity lookup capability.
//!
//! RULE: The persistence core never reaches into engine internals to
//! find an entity. Every by-name lookup goes through a `Resolver`, so
//! restore can be exercised against any world that implements it.

use crate::script::TableRef;

pub trait Resolver {
    /// Script table of the actor with this key.
    fn actor(&self, key: &str) -> Option<TableRef>;

    /// Script table of the room with this name.
    fn room(&self, name: &str) -> Option<TableRef>;

    /// Script table of the first global object with this key. Objects held
    /// by pseudo rooms are only reachable through `object_in_room`.
    fn object_global(&self, key: &str) -> Option<TableRef>;

    /// Script table of the object with this key inside one room.
    fn object_in_room(&self, room: &str, key: &str) -> Option<TableRef>;

    /// True when a dialog definition with exactly this name is registered.
    fn has_dialog(&self, name: &str) -> bool;
}
