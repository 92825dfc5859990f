// crates/seismark-core/src/markers.rs
//
// The arrival marks shown for the active trace group.
//
//   Empty ──add──▶ Populated ──select──▶ Selected
//     ▲               │  ▲                  │
//     └─delete/clear──┘  └──delete_selected─┘
//
// Marks live in display time (seconds from the first displayed sample) and
// are keyed by Uuid so a drag or a delete always hits the mark the user
// grabbed. Frames only appear at the store boundary: `enter` converts
// persisted frames to times, `commit` converts back. A mark read from the
// store keeps its frame until the user moves it.

use indexmap::IndexMap;
use tracing::{debug, warn};

pub use uuid::Uuid;

use crate::error::StoreError;
use crate::helpers::time::{frame_to_time, time_to_frame};
use crate::store::{AnnotationRecord, AnnotationStore};

/// Where a mark lands when added without an explicit time.
pub const DEFAULT_MARK_SECONDS: f64 = 5.0;

/// The time base of the displayed vertical channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeBase {
    pub sampling_rate:    f64,
    /// Filter offset trimmed from the front, 0 when unfiltered.
    pub offset_seconds:   f64,
    /// Length of the displayed channel.
    pub duration_seconds: f64,
}

impl TimeBase {
    pub fn new(sampling_rate: f64, offset_seconds: f64, duration_seconds: f64) -> Self {
        Self { sampling_rate, offset_seconds, duration_seconds }
    }

    pub fn clamp(&self, time_seconds: f64) -> f64 {
        time_seconds.clamp(0.0, self.duration_seconds.max(0.0))
    }

    pub fn to_frame(&self, time_seconds: f64) -> u64 {
        time_to_frame(time_seconds, self.sampling_rate, self.offset_seconds)
    }

    pub fn to_time(&self, frame: u64) -> f64 {
        frame_to_time(frame, self.sampling_rate, self.offset_seconds)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrivalMark {
    pub id:              Uuid,
    pub time_seconds:    f64,
    pub selected:        bool,
    /// Frame this mark was read from, cleared by a move.
    pub persisted_frame: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerPhase {
    Empty,
    Populated,
    Selected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Frames written for the group, in mark order.
    Committed(Vec<u64>),
    /// No marks on screen; the persisted value was left as it was.
    NothingToCommit,
}

#[derive(Clone, Debug, Default)]
pub struct MarkerSession {
    group_key: Option<String>,
    time_base: Option<TimeBase>,
    /// Insertion order is commit order.
    marks:     IndexMap<Uuid, ArrivalMark>,
    /// Set by any edit since `enter` or the last commit.
    dirty:     bool,
}

impl MarkerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_key(&self) -> Option<&str> {
        self.group_key.as_deref()
    }

    pub fn time_base(&self) -> Option<TimeBase> {
        self.time_base
    }

    /// Marks in insertion order.
    pub fn marks(&self) -> impl ExactSizeIterator<Item = &ArrivalMark> + '_ {
        self.marks.values()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&ArrivalMark> {
        self.marks.get(&id)
    }

    pub fn selected(&self) -> Option<&ArrivalMark> {
        self.marks.values().find(|m| m.selected)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn phase(&self) -> MarkerPhase {
        if self.marks.is_empty() {
            MarkerPhase::Empty
        } else if self.marks.values().any(|m| m.selected) {
            MarkerPhase::Selected
        } else {
            MarkerPhase::Populated
        }
    }

    /// Switch to `group_key`. Uncommitted marks are dropped; persisted frames
    /// (if any) become marks in `time_base`.
    pub fn enter(&mut self, group_key: &str, record: Option<&AnnotationRecord>, time_base: TimeBase) {
        if self.dirty {
            debug!("[markers] dropping uncommitted marks of {:?}", self.group_key);
        }
        self.marks.clear();
        self.dirty     = false;
        self.group_key = Some(group_key.to_string());
        self.time_base = Some(time_base);

        let frames = record.and_then(|r| r.p_wave_frames.as_deref()).unwrap_or_default();
        for &frame in frames {
            let t = time_base.to_time(frame);
            let clamped = time_base.clamp(t);
            if clamped != t {
                warn!("[markers] {group_key}: frame {frame} is outside the displayed trace, shown at {clamped:.3} s");
            }
            let id = Uuid::new_v4();
            self.marks.insert(id, ArrivalMark { id, time_seconds: clamped, selected: false, persisted_frame: Some(frame) });
        }
    }

    /// Forget the group entirely (display cleared).
    pub fn leave(&mut self) {
        *self = Self::default();
    }

    /// Re-express the current marks in a new time base (filter toggled or its
    /// offset changed) without touching the store. Ids and selection survive.
    pub fn rebase(&mut self, time_base: TimeBase) {
        if let Some(old) = self.time_base.replace(time_base) {
            for mark in self.marks.values_mut() {
                let frame = mark.persisted_frame.unwrap_or_else(|| old.to_frame(mark.time_seconds));
                mark.time_seconds = time_base.clamp(time_base.to_time(frame));
            }
        }
    }

    /// Add a mark at `time_seconds` (default [`DEFAULT_MARK_SECONDS`]),
    /// clamped into the trace. Returns its id, or `None` with no active group.
    pub fn add(&mut self, time_seconds: Option<f64>) -> Option<Uuid> {
        let time_base = self.time_base?;
        let id = Uuid::new_v4();
        let t = time_base.clamp(time_seconds.unwrap_or(DEFAULT_MARK_SECONDS));
        self.marks.insert(id, ArrivalMark { id, time_seconds: t, selected: false, persisted_frame: None });
        self.dirty = true;
        Some(id)
    }

    /// Drag update. Returns the clamped time actually stored.
    pub fn move_to(&mut self, id: Uuid, time_seconds: f64) -> Option<f64> {
        let time_base = self.time_base?;
        let mark = self.marks.get_mut(&id)?;
        mark.time_seconds    = time_base.clamp(time_seconds);
        mark.persisted_frame = None;
        self.dirty = true;
        Some(mark.time_seconds)
    }

    /// Select exactly one mark. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: Uuid) -> bool {
        if !self.marks.contains_key(&id) {
            return false;
        }
        for mark in self.marks.values_mut() {
            mark.selected = mark.id == id;
        }
        true
    }

    pub fn deselect(&mut self) {
        for mark in self.marks.values_mut() {
            mark.selected = false;
        }
    }

    pub fn delete_selected(&mut self) -> Option<ArrivalMark> {
        let id = self.selected()?.id;
        self.dirty = true;
        self.marks.shift_remove(&id)
    }

    /// The current marks as frames, in mark order.
    pub fn frames(&self) -> Vec<u64> {
        match self.time_base {
            Some(tb) => self
                .marks
                .values()
                .map(|m| m.persisted_frame.unwrap_or_else(|| tb.to_frame(m.time_seconds)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether some mark already sits on the sample of `time_seconds`.
    pub fn occupies(&self, time_seconds: f64) -> bool {
        let Some(tb) = self.time_base else {
            return false;
        };
        let frame = tb.to_frame(tb.clamp(time_seconds));
        self.frames().contains(&frame)
    }

    /// Write the marks through the store. With no marks the persisted value is
    /// left untouched; retracting an arrival is [`MarkerSession::clear`].
    pub fn commit(&mut self, store: &mut AnnotationStore) -> Result<CommitOutcome, StoreError> {
        let Some(key) = self.group_key.as_deref() else {
            return Ok(CommitOutcome::NothingToCommit);
        };
        if self.marks.is_empty() {
            return Ok(CommitOutcome::NothingToCommit);
        }
        let frames = self.frames();
        store.set_arrival_frames(key, frames.clone())?;
        self.dirty = false;
        debug!("[markers] {key}: committed {frames:?}");
        Ok(CommitOutcome::Committed(frames))
    }

    /// Remove every mark and persist "reviewed, no arrival".
    pub fn clear(&mut self, store: &mut AnnotationStore) -> Result<(), StoreError> {
        let Some(key) = self.group_key.as_deref() else {
            return Ok(());
        };
        self.marks.clear();
        store.clear_arrival_frames(key)?;
        self.dirty = false;
        Ok(())
    }
}
