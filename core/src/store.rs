//! Savegame files on disk.
//!
//! RULE: Only store.rs touches the filesystem for savegames.
//! The engine hands it a finished snapshot; it never inspects the world.
//!
//! Container: one TaggedValue tree per file, pretty JSON. Writes go to a
//! temporary sibling first and are renamed over the target, so a slot is
//! either the old save or the new one, never a torn mix.

use crate::{
    error::SaveResult,
    snapshot::keys,
    value::TaggedValue,
};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Slot the picker labels as the autosave.
pub const AUTOSAVE_SLOT: u32 = 1;

/// File name of a numbered slot.
pub fn slot_path(index: u32) -> String {
    format!("Savegame{index}.save")
}

/// File name of a slot's screenshot.
pub fn screenshot_path(index: u32) -> String {
    format!("Savegame{index}.png")
}

pub fn write_savegame(path: &Path, snapshot: &TaggedValue) -> SaveResult<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json)?;
    if let Err(e) = fs::rename(&tmp, path) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            log::warn!("store: cannot remove {}: {cleanup}", tmp.display());
        }
        return Err(e.into());
    }
    log::debug!("store: wrote {}", path.display());
    Ok(())
}

pub fn read_savegame(path: &Path) -> SaveResult<TaggedValue> {
    let text = fs::read_to_string(path)?;
    let snapshot = serde_json::from_str(&text)?;
    Ok(snapshot)
}

// ── Save directory ─────────────────────────────────────────────

pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    /// Open (or create) the save directory at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> SaveResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn slot_file(&self, index: u32) -> PathBuf {
        self.dir.join(slot_path(index))
    }

    pub fn screenshot_file(&self, index: u32) -> PathBuf {
        self.dir.join(screenshot_path(index))
    }
}

// ── Slot picker ────────────────────────────────────────────────

/// The three header values the picker shows for a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotMetadata {
    pub easy_mode: bool,
    pub save_time: DateTime<Utc>,
    pub game_time: Duration,
}

impl SlotMetadata {
    pub fn from_snapshot(snapshot: &TaggedValue) -> Self {
        let savetime = snapshot[keys::SAVETIME].get_int();
        let game_time = snapshot[keys::GAME_TIME].get_double();
        Self {
            easy_mode: snapshot[keys::EASY_MODE].get_int() != 0,
            save_time: Utc.timestamp_opt(savetime, 0).single().unwrap_or_default(),
            game_time: Duration::try_from_secs_f64(game_time).unwrap_or_default(),
        }
    }

    /// Local save time, e.g. `Mar 04 at 21:07`, with ` (easy)` for easy mode.
    pub fn save_time_string(&self) -> String {
        let local = self.save_time.with_timezone(&Local);
        let mut s = local.format("%b %d at %H:%M").to_string();
        if self.easy_mode {
            s.push_str(" (easy)");
        }
        s
    }

    /// Played time, e.g. `1 minute`, `42 minutes`, `2 hours 1 minute`.
    pub fn game_time_string(&self) -> String {
        let total_min = self.game_time.as_secs() / 60;
        if total_min < 60 {
            return format!("{total_min} {}", plural(total_min, "minute"));
        }
        let hours = total_min / 60;
        let min = total_min % 60;
        format!("{hours} {} {min} {}", plural(hours, "hour"), plural(min, "minute"))
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 { unit.to_string() } else { format!("{unit}s") }
}

/// Read only the picker header of a savegame.
pub fn peek_slot_metadata(path: &Path) -> SaveResult<SlotMetadata> {
    let snapshot = read_savegame(path)?;
    Ok(SlotMetadata::from_snapshot(&snapshot))
}

#[derive(Debug, Clone)]
pub struct SavegameSlot {
    /// 1-based slot number.
    pub slot:     u32,
    pub path:     PathBuf,
    /// `None` when the slot holds no readable savegame.
    pub metadata: Option<SlotMetadata>,
}

impl SavegameSlot {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_none()
    }

    pub fn is_autosave(&self) -> bool {
        self.slot == AUTOSAVE_SLOT
    }
}

/// One entry per slot `1..=count`, in order.
pub fn list_slots(dir: &Path, count: u32) -> Vec<SavegameSlot> {
    (1..=count)
        .map(|slot| {
            let path = dir.join(slot_path(slot));
            let metadata = if path.exists() {
                match peek_slot_metadata(&path) {
                    Ok(m) => Some(m),
                    Err(e) => {
                        log::warn!("store: cannot read {}: {e}", path.display());
                        None
                    }
                }
            } else {
                None
            };
            SavegameSlot { slot, path, metadata }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(minutes: u64) -> SlotMetadata {
        SlotMetadata {
            easy_mode: false,
            save_time: Utc.timestamp_opt(0, 0).unwrap(),
            game_time: Duration::from_secs(minutes * 60),
        }
    }

    #[test]
    fn slot_paths_are_numbered() {
        assert_eq!(slot_path(1), "Savegame1.save");
        assert_eq!(slot_path(9), "Savegame9.save");
        assert_eq!(screenshot_path(3), "Savegame3.png");
    }

    #[test]
    fn game_time_string_pluralises() {
        assert_eq!(metadata(0).game_time_string(), "0 minutes");
        assert_eq!(metadata(1).game_time_string(), "1 minute");
        assert_eq!(metadata(42).game_time_string(), "42 minutes");
        assert_eq!(metadata(61).game_time_string(), "1 hour 1 minute");
        assert_eq!(metadata(65).game_time_string(), "1 hour 5 minutes");
        assert_eq!(metadata(60).game_time_string(), "1 hour 0 minutes");
        assert_eq!(metadata(121).game_time_string(), "2 hours 1 minute");
        assert_eq!(metadata(150).game_time_string(), "2 hours 30 minutes");
    }

    #[test]
    fn save_time_string_marks_easy_mode() {
        let mut m = metadata(0);
        assert!(!m.save_time_string().ends_with("(easy)"));
        m.easy_mode = true;
        assert!(m.save_time_string().ends_with(" (easy)"));
        assert!(m.save_time_string().contains(" at "));
    }

    #[test]
    fn metadata_reads_header_fields() {
        let mut snapshot = TaggedValue::hash();
        snapshot.insert(keys::EASY_MODE, 1);
        snapshot.insert(keys::SAVETIME, 1_600_000_000i64);
        snapshot.insert(keys::GAME_TIME, 3725.5);
        let m = SlotMetadata::from_snapshot(&snapshot);
        assert!(m.easy_mode);
        assert_eq!(m.save_time.timestamp(), 1_600_000_000);
        assert_eq!(m.game_time.as_secs(), 3725);
        assert_eq!(m.game_time_string(), "1 hour 2 minutes");
    }

    #[test]
    fn failed_rename_removes_the_temporary_file() {
        let dir = std::env::temp_dir().join(format!("gamesave-store-{}", uuid::Uuid::new_v4()));
        let target = dir.join(slot_path(1));
        // A non-empty directory in the slot's place makes the rename fail.
        fs::create_dir_all(target.join("occupied")).expect("create blocking dir");

        let result = write_savegame(&target, &TaggedValue::hash());
        assert!(result.is_err(), "renaming over a directory must fail");
        assert!(!dir.join("Savegame1.save.tmp").exists(), "temporary file must be cleaned up");
        assert!(target.is_dir());
    }

    #[test]
    fn negative_game_time_reads_as_zero() {
        let mut snapshot = TaggedValue::hash();
        snapshot.insert(keys::GAME_TIME, -5.0);
        assert_eq!(SlotMetadata::from_snapshot(&snapshot).game_time, Duration::ZERO);
    }
}
