// crates/seismark-core/src/navigation.rs
//
// The visible, ordered group list and moving through it.
//
// Visibility is recomputed from scratch from (scan order, table, selection);
// nothing is updated incrementally.

use serde::{Deserialize, Serialize};

use crate::store::{AnnotationRecord, AnnotationTable};

/// One list-filter checkbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriState {
    #[default]
    Ignore,
    RequireTrue,
    RequireFalse,
}

impl TriState {
    /// Checkbox click order: unchecked → checked → crossed → unchecked.
    pub fn cycle(self) -> Self {
        match self {
            TriState::Ignore       => TriState::RequireTrue,
            TriState::RequireTrue  => TriState::RequireFalse,
            TriState::RequireFalse => TriState::Ignore,
        }
    }

    pub fn admits(self, value: bool) -> bool {
        match self {
            TriState::Ignore       => true,
            TriState::RequireTrue  => value,
            TriState::RequireFalse => !value,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub review:    TriState,
    pub has_mark:  TriState,
    /// `Ignore` still hides discarded groups; only `RequireTrue` shows them.
    pub discarded: TriState,
}

impl FilterSelection {
    pub fn admits(&self, record: &AnnotationRecord) -> bool {
        let discarded_ok = match self.discarded {
            TriState::RequireTrue => record.deleted,
            TriState::Ignore | TriState::RequireFalse => !record.deleted,
        };
        self.review.admits(record.needs_review) && self.has_mark.admits(record.has_marks()) && discarded_ok
    }
}

/// Keys from `scan_order` that pass `selection`, in scan order. Keys with no
/// row yet are judged as a default row.
pub fn compute_visible(scan_order: &[String], table: &AnnotationTable, selection: &FilterSelection) -> Vec<String> {
    scan_order
        .iter()
        .filter(|key| match table.get(key) {
            Some(record) => selection.admits(record),
            None         => selection.admits(&AnnotationRecord::new(key.as_str())),
        })
        .cloned()
        .collect()
}

/// Group to show after the visible list changed: the previous one if still
/// visible, else the first visible, else nothing.
pub fn preserve_selection(visible: &[String], previous: Option<&str>) -> Option<String> {
    match previous {
        Some(prev) if visible.iter().any(|k| k == prev) => Some(prev.to_string()),
        _ => visible.first().cloned(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl Boundary {
    pub fn message(self) -> &'static str {
        match self {
            Boundary::Start => "This is the first trace in the list.",
            Boundary::End   => "This is the last trace in the list.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavOutcome {
    Moved(String),
    Boundary(Boundary),
}

/// Step through `visible` from `current`. Never wraps. A current group that is
/// not in the list (or none at all) steps onto the first entry.
pub fn navigate(visible: &[String], current: Option<&str>, direction: Direction) -> NavOutcome {
    let boundary = match direction {
        Direction::Next     => Boundary::End,
        Direction::Previous => Boundary::Start,
    };
    let Some(pos) = current.and_then(|c| visible.iter().position(|k| k == c)) else {
        return match visible.first() {
            Some(first) => NavOutcome::Moved(first.clone()),
            None        => NavOutcome::Boundary(boundary),
        };
    };
    let target = match direction {
        Direction::Next     => pos.checked_add(1).filter(|&i| i < visible.len()),
        Direction::Previous => pos.checked_sub(1),
    };
    match target {
        Some(i) => NavOutcome::Moved(visible[i].clone()),
        None    => NavOutcome::Boundary(boundary),
    }
}
