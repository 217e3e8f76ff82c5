//! The savegame system — the one entry point for saving and loading.
//!
//! SAVE ORDER (fixed):
//!   1. Screenshot (slot saves, when enabled)
//!   2. `preSave` hook
//!   3. Snapshot assembly
//!   4. Atomic write
//!   5. `postSave` hook
//!
//! RULES:
//!   - One save or load at a time. A nested call (e.g. from a hook) fails
//!     with `SaveError::Busy` and touches nothing.
//!   - Loading reads the whole file before the world is touched.
//!   - Hooks report through the script host, never through errors.

use crate::{
    config::PersistenceConfig,
    error::{SaveError, SaveResult},
    restore::{RestoreCoordinator, RestoreReport},
    script::ScriptHost,
    snapshot::SnapshotAssembler,
    store::{self, SaveStore, SavegameSlot, AUTOSAVE_SLOT},
    world::World,
};
use chrono::Utc;
use std::cell::Cell;
use std::path::Path;

/// Writes a screenshot of the current frame to `path`.
pub trait ScreenCapture {
    fn capture(&mut self, path: &Path) -> std::io::Result<()>;
}

pub struct SaveGameSystem {
    pub config: PersistenceConfig,
    busy:       Cell<bool>,
}

/// Clears the busy flag when the operation ends, however it ends.
struct BusyGuard<'a>(&'a Cell<bool>);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> SaveResult<Self> {
        if flag.replace(true) {
            return Err(SaveError::Busy);
        }
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl SaveGameSystem {
    pub fn new(config: PersistenceConfig) -> Self {
        Self { config, busy: Cell::new(false) }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    // ── Paths ──────────────────────────────────────────────────

    /// Write `world` to `path`.
    pub fn save_game(&self, path: &Path, world: &World, host: &mut dyn ScriptHost) -> SaveResult<()> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.write_snapshot(path, world, host)
    }

    /// Overlay the savegame at `path` onto `world`.
    pub fn load_game(
        &self,
        path: &Path,
        world: &mut World,
        host: &mut dyn ScriptHost,
    ) -> SaveResult<RestoreReport> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let snapshot = store::read_savegame(path)?;
        let report = RestoreCoordinator::new(world, host).apply(&snapshot)?;
        log::info!(
            "Loaded {}: {} actors, {} rooms, {} objects, {} lookup misses",
            path.display(),
            report.actors_applied,
            report.rooms_applied,
            report.objects_applied,
            report.lookup_misses
        );
        Ok(report)
    }

    // ── Slots ──────────────────────────────────────────────────

    /// Save to slot `index` (1-based), screenshot first when enabled.
    pub fn save_slot(
        &self,
        index: u32,
        world: &World,
        host: &mut dyn ScriptHost,
        screen: Option<&mut dyn ScreenCapture>,
    ) -> SaveResult<()> {
        self.check_slot(index)?;
        let _guard = BusyGuard::acquire(&self.busy)?;
        let saves = SaveStore::open(&self.config.save_dir)?;
        if self.config.capture_screenshots {
            if let Some(screen) = screen {
                screen.capture(&saves.screenshot_file(index))?;
            }
        }
        self.write_snapshot(&saves.slot_file(index), world, host)
    }

    pub fn load_slot(
        &self,
        index: u32,
        world: &mut World,
        host: &mut dyn ScriptHost,
    ) -> SaveResult<RestoreReport> {
        self.check_slot(index)?;
        let path = self.config.save_dir.join(store::slot_path(index));
        self.load_game(&path, world, host)
    }

    /// Save to the autosave slot. Returns `false` when autosave is off.
    pub fn auto_save(
        &self,
        world: &World,
        host: &mut dyn ScriptHost,
        screen: Option<&mut dyn ScreenCapture>,
    ) -> SaveResult<bool> {
        if !self.config.auto_save {
            return Ok(false);
        }
        self.save_slot(AUTOSAVE_SLOT, world, host, screen)?;
        Ok(true)
    }

    pub fn list_slots(&self) -> Vec<SavegameSlot> {
        store::list_slots(&self.config.save_dir, self.config.slot_count)
    }

    // ── Internals ──────────────────────────────────────────────

    fn check_slot(&self, index: u32) -> SaveResult<()> {
        if index == 0 || index > self.config.slot_count {
            return Err(SaveError::SlotOutOfRange { slot: index, max: self.config.slot_count });
        }
        Ok(())
    }

    fn write_snapshot(&self, path: &Path, world: &World, host: &mut dyn ScriptHost) -> SaveResult<()> {
        host.call("preSave", &[]);
        let snapshot = SnapshotAssembler::new(world, self.config.savebuild)
            .assemble(Utc::now().timestamp());
        store::write_savegame(path, &snapshot)?;
        host.call("postSave", &[]);
        log::info!("Saved {}", path.display());
        Ok(())
    }
}
