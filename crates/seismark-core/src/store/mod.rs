// crates/seismark-core/src/store/mod.rs
//
// The annotation side-store: one row per trace group in `{folder}/data.csv`.
//
// The whole table lives in memory and is rewritten to disk after every
// mutation. There is exactly one writer (the UI thread), so no locking; a
// failed write leaves the in-memory table as mutated and the error with the
// caller.

pub mod csv_io;
pub mod migration;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
pub use migration::SchemaVersion;

pub const DATA_FILE: &str = "data.csv";

/// A `p_wave_frame` cell as found on disk.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameCell {
    Empty,
    /// Bare number written by single-marker versions.
    Legacy(u64),
    List(Vec<u64>),
}

impl FrameCell {
    fn into_frames(self) -> Option<Vec<u64>> {
        match self {
            FrameCell::Empty         => None,
            FrameCell::Legacy(frame) => Some(vec![frame]),
            FrameCell::List(frames)  => Some(frames),
        }
    }
}

/// The persisted state of one trace group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub group_key:     String,
    /// `None` = never annotated, `Some([])` = reviewed with no arrival.
    pub p_wave_frames: Option<Vec<u64>>,
    pub needs_review:  bool,
    /// Soft delete. The row and its marks stay; only visibility changes.
    pub deleted:       bool,
}

impl AnnotationRecord {
    pub fn new(group_key: impl Into<String>) -> Self {
        Self { group_key: group_key.into(), p_wave_frames: None, needs_review: false, deleted: false }
    }

    pub fn has_marks(&self) -> bool {
        self.p_wave_frames.as_ref().is_some_and(|f| !f.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationTable {
    rows: BTreeMap<String, AnnotationRecord>,
}

impl AnnotationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, group_key: &str) -> Option<&AnnotationRecord> {
        self.rows.get(group_key)
    }

    pub fn contains(&self, group_key: &str) -> bool {
        self.rows.contains_key(group_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.rows.values()
    }

    /// Insert a default row if `group_key` is absent. Returns whether a row was added.
    pub fn upsert_group(&mut self, group_key: &str) -> bool {
        if self.rows.contains_key(group_key) {
            return false;
        }
        self.rows.insert(group_key.to_string(), AnnotationRecord::new(group_key));
        true
    }

    /// Replace the group's whole mark list.
    pub fn set_arrival_frames(&mut self, group_key: &str, frames: Vec<u64>) -> Result<(), StoreError> {
        self.row_mut(group_key)?.p_wave_frames = Some(frames);
        Ok(())
    }

    /// Flip `needs_review` and return the new value.
    pub fn toggle_review(&mut self, group_key: &str) -> Result<bool, StoreError> {
        let row = self.row_mut(group_key)?;
        row.needs_review = !row.needs_review;
        Ok(row.needs_review)
    }

    pub fn mark_deleted(&mut self, group_key: &str) -> Result<(), StoreError> {
        self.row_mut(group_key)?.deleted = true;
        Ok(())
    }

    fn row_mut(&mut self, group_key: &str) -> Result<&mut AnnotationRecord, StoreError> {
        self.rows
            .get_mut(group_key)
            .ok_or_else(|| StoreError::UnknownGroup(group_key.to_string()))
    }

    fn from_raw(raw: csv_io::RawTable) -> Result<Self, StoreError> {
        let mut table = Self::new();
        for row in raw.rows {
            if table.rows.contains_key(&row.group_key) {
                return Err(StoreError::DuplicateGroup(row.group_key));
            }
            let record = AnnotationRecord {
                group_key:     row.group_key.clone(),
                p_wave_frames: row.frames.into_frames(),
                needs_review:  row.needs_review,
                deleted:       row.deleted.unwrap_or(false),
            };
            table.rows.insert(row.group_key, record);
        }
        Ok(table)
    }
}

/// What `load` did besides parsing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadReport {
    /// Set when the file was in an older layout and has been rewritten.
    pub migrated_from: Option<SchemaVersion>,
    pub backup:        Option<PathBuf>,
}

/// Load the table at `path`. A missing file is an empty table. An existing file
/// is backed up first, migrated to the current layout if needed, and written
/// back when a migration ran.
pub fn load(path: &Path) -> Result<(AnnotationTable, LoadReport), StoreError> {
    if !path.exists() {
        info!("[store] {} does not exist yet, starting empty", path.display());
        return Ok((AnnotationTable::new(), LoadReport::default()));
    }

    let mut report = LoadReport { backup: write_backup(path)?, ..LoadReport::default() };

    let mut raw = csv_io::read_raw(path)?;
    let found = migration::migrate(&mut raw);
    let table = AnnotationTable::from_raw(raw)?;

    if found < SchemaVersion::CURRENT {
        info!("[store] {} migrated from {found:?}, writing back", path.display());
        save(&table, path)?;
        report.migrated_from = Some(found);
    }
    info!("[store] loaded {} rows from {}", table.len(), path.display());
    Ok((table, report))
}

pub fn save(table: &AnnotationTable, path: &Path) -> Result<(), StoreError> {
    csv_io::write_table(table, path)?;
    debug!("[store] wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// `data.csv` → `data.csv.20240131_154502.bak`
pub fn backup_path(path: &Path, stamp: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{stamp}.bak"));
    path.with_file_name(name)
}

/// Copy `path` to a timestamped sibling. An existing backup with the same
/// stamp is left alone.
fn write_backup(path: &Path) -> Result<Option<PathBuf>, StoreError> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup = backup_path(path, &stamp);
    if backup.exists() {
        warn!("[store] backup {} already exists, not overwriting", backup.display());
        return Ok(None);
    }
    std::fs::copy(path, &backup).map_err(|e| StoreError::io(&backup, e))?;
    info!("[store] backed up {} to {}", path.display(), backup.display());
    Ok(Some(backup))
}

/// The table bound to its file. Every mutating method saves before returning.
#[derive(Debug)]
pub struct AnnotationStore {
    path:  PathBuf,
    table: AnnotationTable,
}

impl AnnotationStore {
    /// Open `{folder}/data.csv`.
    pub fn open(folder: &Path) -> Result<(Self, LoadReport), StoreError> {
        Self::open_file(folder.join(DATA_FILE))
    }

    pub fn open_file(path: PathBuf) -> Result<(Self, LoadReport), StoreError> {
        let (table, report) = load(&path)?;
        Ok((Self { path, table }, report))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &AnnotationTable {
        &self.table
    }

    pub fn get(&self, group_key: &str) -> Option<&AnnotationRecord> {
        self.table.get(group_key)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        save(&self.table, &self.path)
    }

    /// Seed default rows for every key not yet in the table. Returns how many
    /// rows were added; saves only when that is non-zero.
    pub fn upsert_groups<'a, I>(&mut self, keys: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let added = keys.into_iter().filter(|k| self.table.upsert_group(k)).count();
        if added > 0 {
            info!("[store] seeded {added} new rows");
            self.save()?;
        }
        Ok(added)
    }

    pub fn set_arrival_frames(&mut self, group_key: &str, frames: Vec<u64>) -> Result<(), StoreError> {
        self.table.set_arrival_frames(group_key, frames)?;
        self.save()
    }

    /// Persist "reviewed, no arrival" (`[]`).
    pub fn clear_arrival_frames(&mut self, group_key: &str) -> Result<(), StoreError> {
        self.set_arrival_frames(group_key, Vec::new())
    }

    pub fn toggle_review(&mut self, group_key: &str) -> Result<bool, StoreError> {
        let value = self.table.toggle_review(group_key)?;
        self.save()?;
        Ok(value)
    }

    pub fn mark_deleted(&mut self, group_key: &str) -> Result<(), StoreError> {
        self.table.mark_deleted(group_key)?;
        self.save()
    }
}
