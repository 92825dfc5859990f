// crates/seismark-core/src/store/migration.rs
//
// Schema versions of data.csv and the steps between them.
//
//   V1  trace_path, p_wave_frame, needs_review              (bare float per row)
//   V2  … + deleted                                         (bare float per row)
//   V3  … + deleted, p_wave_frame is a JSON list of frames  (current)
//
// A file is classified once on load; every step from its version up to
// CURRENT runs in order, and the caller writes the result back before use.

use tracing::info;

use super::csv_io::RawTable;
use super::FrameCell;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchemaVersion {
    /// No `deleted` column.
    V1 = 1,
    /// `deleted` present, at least one bare-number frame cell.
    V2 = 2,
    /// `deleted` present, every frame cell is empty or a list.
    V3 = 3,
}

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::V3;

    pub fn detect(raw: &RawTable) -> Self {
        if !raw.has_deleted {
            SchemaVersion::V1
        } else if raw.rows.iter().any(|r| matches!(r.frames, FrameCell::Legacy(_))) {
            SchemaVersion::V2
        } else {
            SchemaVersion::V3
        }
    }
}

/// Bring `raw` up to [`SchemaVersion::CURRENT`]. Returns the version it started at.
pub fn migrate(raw: &mut RawTable) -> SchemaVersion {
    let found = SchemaVersion::detect(raw);
    let mut at = found;
    while at < SchemaVersion::CURRENT {
        at = match at {
            SchemaVersion::V1 => {
                backfill_deleted(raw);
                SchemaVersion::V2
            }
            SchemaVersion::V2 => {
                let n = wrap_scalar_frames(raw);
                info!("[store] migrated {n} single-arrival cells to frame lists");
                SchemaVersion::V3
            }
            SchemaVersion::V3 => SchemaVersion::V3,
        };
    }
    found
}

fn backfill_deleted(raw: &mut RawTable) {
    for row in &mut raw.rows {
        row.deleted.get_or_insert(false);
    }
    raw.has_deleted = true;
    info!("[store] back-filled deleted=false on {} rows", raw.rows.len());
}

/// `x` → `[x]`. Returns how many cells changed.
fn wrap_scalar_frames(raw: &mut RawTable) -> usize {
    let mut n = 0;
    for row in &mut raw.rows {
        if let FrameCell::Legacy(frame) = row.frames {
            row.frames = FrameCell::List(vec![frame]);
            n += 1;
        }
    }
    n
}
