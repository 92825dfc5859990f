// crates/seismark-core/src/commands.rs
//
// Every user action in SeisMark is expressed as a SessionCommand.
// Modules emit these; app.rs processes them after the UI pass.
// Adding a new feature = add a variant here + one match arm in app.rs.

use std::path::PathBuf;
use uuid::Uuid;

use crate::media_types::ScanMode;
use crate::navigation::{Direction, FilterSelection};
use crate::params::{FilterParams, TriggerParams};

#[derive(Debug, Clone)]
pub enum SessionCommand {
    // ── Folder ───────────────────────────────────────────────────────────────
    /// Show the native folder picker; the result arrives as OpenFolder.
    PickFolder,
    OpenFolder(PathBuf),
    Rescan,
    SetScanMode(ScanMode),

    // ── Trace list ───────────────────────────────────────────────────────────
    SelectGroup(String),
    Navigate(Direction),
    SetFilterSelection(FilterSelection),
    /// Re-read the active group from disk (caches are kept).
    Reload,

    // ── Signal transforms ────────────────────────────────────────────────────
    /// Parameters from the filter dialog. Validated before anything changes.
    ApplyFilter(FilterParams),
    ToggleFilter,
    ApplyTrigger(TriggerParams),
    ToggleTrigger,

    // ── Marks ────────────────────────────────────────────────────────────────
    /// `None` places the mark at the default time.
    AddMark(Option<f64>),
    /// Emitted every frame of a drag, not only on release.
    MoveMark { id: Uuid, time_seconds: f64 },
    SelectMark(Uuid),
    DeleteSelectedMark,
    Commit,
    /// Space: commit, then step to the next visible group.
    CommitAndAdvance,
    /// Persist "reviewed, no arrival" for the active group.
    ClearMarks,

    // ── Triage ───────────────────────────────────────────────────────────────
    ToggleReview,
    /// Opens the yes/no confirmation; only ConfirmDiscard mutates.
    RequestDiscard,
    ConfirmDiscard,

    // ── View / UI ────────────────────────────────────────────────────────────
    ResetView,
    ToggleZoomMode,
    OpenFilterDialog,
    OpenTriggerDialog,
    /// Escape: close dialogs, leave zoom mode, drop mark selection.
    ClearModes,
    DismissMessage,
}
