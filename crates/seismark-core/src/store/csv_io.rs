// crates/seismark-core/src/store/csv_io.rs
//
// Reading and writing the data.csv layout:
//
//   trace_path,p_wave_frame,needs_review,deleted
//   eq001/STA1,"[200,500]",False,False
//
// Reading is lenient about shape (missing columns, bare numbers, pandas-style
// booleans and NaN) and reports what it found so migration can decide what to
// do. Writing always produces the current layout, via a temp file + rename so
// a crash mid-write never leaves a truncated table behind.

use std::io::Write;
use std::path::Path;

use super::{AnnotationTable, FrameCell};
use crate::error::StoreError;

pub const COL_KEY:     &str = "trace_path";
pub const COL_FRAMES:  &str = "p_wave_frame";
pub const COL_REVIEW:  &str = "needs_review";
pub const COL_DELETED: &str = "deleted";

/// One row as read from disk, before migration.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRow {
    pub group_key:    String,
    pub frames:       FrameCell,
    pub needs_review: bool,
    /// `None` when the file has no `deleted` column.
    pub deleted:      Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    pub has_deleted: bool,
    pub rows:        Vec<RawRow>,
}

pub fn read_raw(path: &Path) -> Result<RawTable, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;

    let headers = reader.headers().map_err(|e| StoreError::csv(path, e))?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);

    let key_idx = col(COL_KEY)
        .ok_or(StoreError::MissingColumn { path: path.to_path_buf(), column: COL_KEY })?;
    let frames_idx  = col(COL_FRAMES);
    let review_idx  = col(COL_REVIEW);
    let deleted_idx = col(COL_DELETED);

    let mut table = RawTable { has_deleted: deleted_idx.is_some(), rows: Vec::new() };

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| StoreError::csv(path, e))?;
        // Row numbers are 1-based and the header is row 1.
        let row_no = i + 2;
        let cell = |idx: Option<usize>| idx.and_then(|j| record.get(j)).unwrap_or("").trim();

        let group_key = cell(Some(key_idx));
        if group_key.is_empty() {
            continue;
        }

        table.rows.push(RawRow {
            group_key:    group_key.to_string(),
            frames:       parse_frames(cell(frames_idx), row_no)?,
            needs_review: parse_bool(cell(review_idx), row_no, COL_REVIEW)?,
            deleted:      match deleted_idx {
                Some(_) => Some(parse_bool(cell(deleted_idx), row_no, COL_DELETED)?),
                None    => None,
            },
        });
    }
    Ok(table)
}

/// The `p_wave_frame` cell: a JSON list, `[]` for "reviewed, no arrival".
pub fn encode_frames(group_key: &str, frames: &[u64]) -> Result<String, StoreError> {
    serde_json::to_string(frames).map_err(|source| StoreError::Encode { group: group_key.to_string(), source })
}

pub fn write_table(table: &AnnotationTable, path: &Path) -> Result<(), StoreError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        writer
            .write_record([COL_KEY, COL_FRAMES, COL_REVIEW, COL_DELETED])
            .map_err(|e| StoreError::csv(path, e))?;
        for record in table.iter() {
            let frames = match &record.p_wave_frames {
                Some(frames) => encode_frames(&record.group_key, frames)?,
                None         => String::new(),
            };
            writer
                .write_record([
                    record.group_key.as_str(),
                    frames.as_str(),
                    py_bool(record.needs_review),
                    py_bool(record.deleted),
                ])
                .map_err(|e| StoreError::csv(path, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(path, e))?;
    }
    tmp.as_file_mut().flush().map_err(|e| StoreError::io(path, e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}

// ── Cell parsing ──────────────────────────────────────────────────────────────

fn is_null(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell == "None" || cell == "null"
}

/// Frames are stored as sample indices; negative values (marks dragged before
/// the start of the trace by older versions) clamp to 0.
fn to_frame(v: f64) -> Option<u64> {
    if !v.is_finite() {
        return None;
    }
    if v < 0.0 {
        tracing::warn!("[store] negative frame {v} clamped to 0");
        return Some(0);
    }
    Some(v.round() as u64)
}

pub(crate) fn parse_frames(cell: &str, row: usize) -> Result<FrameCell, StoreError> {
    let malformed = || StoreError::MalformedCell { row, column: COL_FRAMES, value: cell.to_string() };

    if is_null(cell) {
        return Ok(FrameCell::Empty);
    }
    if cell.starts_with('[') {
        let values: Vec<f64> = serde_json::from_str(cell).map_err(|_| malformed())?;
        let frames = values.into_iter().map(to_frame).collect::<Option<Vec<_>>>().ok_or_else(malformed)?;
        return Ok(FrameCell::List(frames));
    }
    let value: f64 = cell.parse().map_err(|_| malformed())?;
    to_frame(value).map(FrameCell::Legacy).ok_or_else(malformed)
}

pub(crate) fn parse_bool(cell: &str, row: usize, column: &'static str) -> Result<bool, StoreError> {
    match cell {
        "True" | "true" | "TRUE" | "1" | "1.0" => Ok(true),
        "False" | "false" | "FALSE" | "0" | "0.0" => Ok(false),
        c if is_null(c) => Ok(false),
        c => Err(StoreError::MalformedCell { row, column, value: c.to_string() }),
    }
}

fn py_bool(v: bool) -> &'static str {
    if v { "True" } else { "False" }
}
