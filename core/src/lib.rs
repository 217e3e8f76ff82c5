//! gamesave-core: savegame persistence for the adventure runtime.
//!
//! Save walks the live world into a `TaggedValue` tree and writes it;
//! load reads the tree back and overlays it onto the already-built world.

pub mod bridge;
pub mod config;
pub mod dialog;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod restore;
pub mod script;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod value;
pub mod world;
