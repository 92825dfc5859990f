// crates/seismark-media/src/workbench.rs
//
// The whole annotate-and-triage flow behind one API:
//
//   open_folder → scan → store seeded → visible list → select
//   select      → load (cached) → filter (cached) → spectrogram → marks → trigger
//   commit      → frames written through the store → visible list rebuilt
//
// Everything runs synchronously on the caller's thread. Loads, filters and
// validation fail before touching the session; store write failures leave the
// in-memory table mutated and are returned. Automatic moves (open, navigate,
// commit-and-advance) step over groups that fail to load and name them in the
// status line.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use seismark_core::error::{FilterError, StoreError, TriggerError};
use seismark_core::markers::{ArrivalMark, CommitOutcome, TimeBase, Uuid};
use seismark_core::media_types::{ScanMode, Spectrogram, TraceGroup, Waveform};
use seismark_core::navigation::{self, Direction, FilterSelection, NavOutcome};
use seismark_core::params::{FilterParams, TriggerParams};
use seismark_core::state::SessionState;
use seismark_core::store::{AnnotationStore, LoadReport};

use crate::cache::WaveformCache;
use crate::scan::scan;
use crate::spectrogram::compute_spectrogram;
use crate::trigger::{self, TriggerReport};

pub use crate::error::WorkbenchError;

/// What is on screen for the active group.
#[derive(Clone, Debug)]
pub struct Display {
    pub group_key:   String,
    pub waveform:    Arc<Waveform>,
    /// Index into `waveform.channels` of the plotted channel.
    pub vertical:    usize,
    pub spectrogram: Arc<Spectrogram>,
    pub filtered:    bool,
    pub time_base:   TimeBase,
    pub trigger:     Option<TriggerReport>,
}

#[derive(Default)]
pub struct Workbench {
    state:   SessionState,
    groups:  HashMap<String, TraceGroup>,
    cache:   WaveformCache,
    display: Option<Display>,
}

impl Workbench {
    pub fn new(state: SessionState) -> Self {
        Self { state, ..Self::default() }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn display(&self) -> Option<&Display> {
        self.display.as_ref()
    }

    pub fn group(&self, group_key: &str) -> Option<&TraceGroup> {
        self.groups.get(group_key)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.state.status = Some(status.into());
    }

    fn store_mut(&mut self) -> Result<&mut AnnotationStore, WorkbenchError> {
        self.state.store.as_mut().ok_or(WorkbenchError::Store(StoreError::NoStore))
    }

    fn active_key(&self) -> Result<String, WorkbenchError> {
        self.state.active_group.clone().ok_or(WorkbenchError::NoActiveGroup)
    }

    // ── Folder ──────────────────────────────────────────────────────────────

    /// Scan `folder`, open its data.csv and show the first visible group that
    /// loads. Scan and store errors leave the previous session in place.
    pub fn open_folder(&mut self, folder: &Path) -> Result<LoadReport, WorkbenchError> {
        let groups = scan(folder, self.state.scan_mode)?;
        let (store, report) = AnnotationStore::open(folder)?;
        info!("[workbench] opened {} ({} groups)", folder.display(), groups.len());

        self.state.folder = Some(folder.to_path_buf());
        self.state.store  = Some(store);
        self.state.active_group = None;
        self.state.markers.leave();
        self.display = None;
        self.cache.clear();
        self.install_groups(groups)?;
        Ok(report)
    }

    /// Re-walk the current folder. The in-memory table is kept.
    pub fn rescan(&mut self) -> Result<(), WorkbenchError> {
        let folder = self.state.folder.clone().ok_or(WorkbenchError::NoFolder)?;
        let groups = scan(&folder, self.state.scan_mode)?;
        self.cache.clear();
        self.install_groups(groups)
    }

    pub fn set_scan_mode(&mut self, mode: ScanMode) -> Result<(), WorkbenchError> {
        if self.state.scan_mode == mode {
            return Ok(());
        }
        self.state.scan_mode = mode;
        if self.state.folder.is_some() {
            self.rescan()?;
        }
        Ok(())
    }

    fn install_groups(&mut self, groups: Vec<TraceGroup>) -> Result<(), WorkbenchError> {
        self.state.group_keys = groups.iter().map(|g| g.group_key.clone()).collect();
        self.groups = groups.into_iter().map(|g| (g.group_key.clone(), g)).collect();

        let seeded = match self.state.store.as_mut() {
            Some(store) => store.upsert_groups(self.state.group_keys.iter().map(String::as_str)),
            None        => Ok(0),
        };
        let followed = self.refresh_and_follow();
        seeded?;
        followed
    }

    pub fn folder(&self) -> Option<&PathBuf> {
        self.state.folder.as_ref()
    }

    // ── Trace list ──────────────────────────────────────────────────────────

    /// Show `group_key`. Load failures leave the current display as it was.
    /// A filter or trigger that cannot run on this group is reported in the
    /// status line and the group is shown without it.
    pub fn select(&mut self, group_key: &str) -> Result<(), WorkbenchError> {
        let group = self
            .groups
            .get(group_key)
            .ok_or_else(|| WorkbenchError::UnknownGroup(group_key.to_string()))?;
        let raw = self.cache.raw(group)?;

        self.state.status = None;
        let display = self.build_display(raw);
        let record = self.state.store.as_ref().and_then(|s| s.get(group_key));
        self.state.markers.enter(group_key, record, display.time_base);
        self.state.active_group = Some(group_key.to_string());
        self.display = Some(display);
        self.propose_trigger_mark();
        Ok(())
    }

    fn build_display(&mut self, raw: Arc<Waveform>) -> Display {
        let (waveform, filtered) = match self.state.active_filter().cloned() {
            Some(params) => match self.cache.filtered(&raw, &params) {
                Ok(wf) => (wf, true),
                Err(e) => {
                    warn!("[workbench] {}: {e}", raw.group_key);
                    self.state.status = Some(format!("Filter not applied: {e}"));
                    (raw, false)
                }
            },
            None => (raw, false),
        };
        self.display_for(waveform, filtered)
    }

    fn display_for(&self, waveform: Arc<Waveform>, filtered: bool) -> Display {
        let vertical = waveform.vertical_index().unwrap_or(0);
        let (rate, duration, spectrogram) = match waveform.channels.get(vertical) {
            Some(ch) => (ch.sampling_rate, ch.duration(), compute_spectrogram(ch)),
            None     => (1.0, 0.0, Spectrogram::default()),
        };
        let offset = match (filtered, self.state.filter_params.as_ref()) {
            (true, Some(p)) => p.offset_seconds,
            _ => 0.0,
        };
        Display {
            group_key:   waveform.group_key.clone(),
            waveform,
            vertical,
            spectrogram: Arc::new(spectrogram),
            filtered,
            time_base:   TimeBase::new(rate, offset, duration),
            trigger:     None,
        }
    }

    /// Re-render the active group from the caches.
    pub fn reload(&mut self) -> Result<(), WorkbenchError> {
        let key = self.active_key()?;
        self.select(&key)
    }

    pub fn navigate(&mut self, direction: Direction) -> Result<NavOutcome, WorkbenchError> {
        match navigation::navigate(&self.state.visible, self.state.active_group.as_deref(), direction) {
            NavOutcome::Moved(key) => self.land(key, direction),
            boundary => Ok(boundary),
        }
    }

    /// Select `key`, or the first group after it in `direction` that loads.
    /// Reaching the end of the list leaves the current display as it was.
    fn land(&mut self, mut key: String, direction: Direction) -> Result<NavOutcome, WorkbenchError> {
        let mut skipped: Vec<String> = Vec::new();
        let outcome = loop {
            match self.select(&key) {
                Ok(()) => break NavOutcome::Moved(key),
                Err(WorkbenchError::Load(e)) => {
                    warn!("[workbench] skipping {key}: {e}");
                    let next = navigation::navigate(&self.state.visible, Some(key.as_str()), direction);
                    skipped.push(key);
                    match next {
                        NavOutcome::Moved(k) => key = k,
                        boundary => break boundary,
                    }
                }
                Err(e) => return Err(e),
            }
        };
        if !skipped.is_empty() {
            self.state.status = Some(format!("Skipped unreadable: {}", skipped.join(", ")));
        }
        Ok(outcome)
    }

    /// Move the selection to `key` after the visible list changed. If nothing
    /// from `key` onward loads and the active group is hidden, the display is
    /// cleared.
    fn follow(&mut self, key: String) -> Result<NavOutcome, WorkbenchError> {
        if self.state.active_group.as_deref() == Some(key.as_str()) {
            return Ok(NavOutcome::Moved(key));
        }
        let outcome = self.land(key, Direction::Next)?;
        if let NavOutcome::Boundary(_) = outcome {
            let active = self.state.active_group.as_deref();
            if !self.state.visible.iter().any(|k| Some(k.as_str()) == active) {
                self.clear_display();
            }
        }
        Ok(outcome)
    }

    pub fn set_filter_selection(&mut self, selection: FilterSelection) -> Result<(), WorkbenchError> {
        self.state.filter_selection = selection;
        self.refresh_and_follow()
    }

    /// Rebuild the visible list and keep, move or clear the selection.
    fn refresh_and_follow(&mut self) -> Result<(), WorkbenchError> {
        match self.state.refresh_visible() {
            Some(key) => self.follow(key).map(|_| ()),
            None => {
                self.clear_display();
                Ok(())
            }
        }
    }

    fn clear_display(&mut self) {
        self.state.active_group = None;
        self.state.markers.leave();
        self.display = None;
    }

    /// Step after a commit or discard: the next entry of the list as it was
    /// before the change, if it is still visible afterwards.
    fn advance_from(&mut self, before: &[String]) -> Result<NavOutcome, WorkbenchError> {
        let outcome = navigation::navigate(before, self.state.active_group.as_deref(), Direction::Next);
        let preserved = self.state.refresh_visible();
        if let NavOutcome::Moved(key) = &outcome {
            if self.state.visible.iter().any(|k| k == key) {
                return self.follow(key.clone());
            }
        }
        match preserved {
            Some(key) => {
                self.follow(key)?;
            }
            None => self.clear_display(),
        }
        Ok(outcome)
    }

    // ── Signal transforms ───────────────────────────────────────────────────

    /// Validate and switch on `params`. On any error the filter settings and
    /// the display are unchanged.
    pub fn apply_filter(&mut self, params: FilterParams) -> Result<(), WorkbenchError> {
        params.validate()?;
        let filtered = match self.display_key() {
            Some(key) => {
                let raw = self.raw_for(&key)?;
                Some(self.cache.filtered(&raw, &params)?)
            }
            None => None,
        };
        info!("[workbench] filter set: {}", params.describe());
        self.state.filter_params  = Some(params);
        self.state.filter_enabled = true;
        if let Some(wf) = filtered {
            self.swap_display(wf, true);
        }
        Ok(())
    }

    /// Flip the filter. Returns the new on/off state.
    pub fn toggle_filter(&mut self) -> Result<bool, WorkbenchError> {
        let params = self.state.filter_params.clone().ok_or(FilterError::NotConfigured)?;
        let enable = !self.state.filter_enabled;
        let next = match self.display_key() {
            Some(key) => {
                let raw = self.raw_for(&key)?;
                Some(if enable { self.cache.filtered(&raw, &params)? } else { raw })
            }
            None => None,
        };
        self.state.filter_enabled = enable;
        if let Some(wf) = next {
            self.swap_display(wf, enable);
        }
        info!("[workbench] filter {}", if enable { "on" } else { "off" });
        Ok(enable)
    }

    fn display_key(&self) -> Option<String> {
        self.display.as_ref().map(|d| d.group_key.clone())
    }

    fn raw_for(&mut self, group_key: &str) -> Result<Arc<Waveform>, WorkbenchError> {
        let group = self
            .groups
            .get(group_key)
            .ok_or_else(|| WorkbenchError::UnknownGroup(group_key.to_string()))?;
        Ok(self.cache.raw(group)?)
    }

    /// Replace the displayed waveform of the active group, keeping its marks.
    fn swap_display(&mut self, waveform: Arc<Waveform>, filtered: bool) {
        let mut display = self.display_for(waveform, filtered);
        if self.state.active_trigger().is_some() {
            display.trigger = self.display.as_ref().and_then(|d| d.trigger.clone());
        }
        self.state.markers.rebase(display.time_base);
        self.display = Some(display);
        if self.state.active_trigger().is_some() {
            self.refresh_detections();
        }
    }

    /// Validate and switch on the trigger, then propose a mark on the current
    /// group. Returns the proposed time, if any.
    pub fn apply_trigger(&mut self, params: TriggerParams) -> Result<Option<f64>, WorkbenchError> {
        params.validate()?;
        let report = match &self.display {
            Some(d) => Some(trigger::run(&d.waveform, &params)?),
            None    => None,
        };
        self.state.trigger_params  = Some(params);
        self.state.trigger_enabled = true;
        Ok(report.and_then(|r| self.accept_trigger_report(r)))
    }

    pub fn toggle_trigger(&mut self) -> Result<bool, WorkbenchError> {
        let params = self.state.trigger_params.clone().ok_or(TriggerError::NotConfigured)?;
        let enable = !self.state.trigger_enabled;
        let report = match (&self.display, enable) {
            (Some(d), true) => Some(trigger::run(&d.waveform, &params)?),
            _ => None,
        };
        self.state.trigger_enabled = enable;
        match report {
            Some(r) => {
                self.accept_trigger_report(r);
            }
            None => {
                if let Some(d) = self.display.as_mut() {
                    d.trigger = None;
                }
            }
        }
        Ok(enable)
    }

    fn propose_trigger_mark(&mut self) {
        let (Some(params), Some(display)) = (self.state.active_trigger(), self.display.as_ref()) else {
            return;
        };
        let result = trigger::run(&display.waveform, params);
        match result {
            Ok(report) => {
                self.accept_trigger_report(report);
            }
            Err(e) => {
                warn!("[workbench] trigger not run: {e}");
                self.state.status = Some(format!("Trigger not run: {e}"));
            }
        }
    }

    /// Recompute the shaded windows without proposing a mark.
    fn refresh_detections(&mut self) {
        let (Some(params), Some(display)) = (self.state.active_trigger(), self.display.as_ref()) else {
            return;
        };
        let report = trigger::run(&display.waveform, params).ok();
        if let Some(d) = self.display.as_mut() {
            d.trigger = report;
        }
    }

    /// Show the detections and propose the earliest onset, unless a mark
    /// already sits on that sample (a committed pick reloaded, or the trigger
    /// switched back on).
    fn accept_trigger_report(&mut self, report: TriggerReport) -> Option<f64> {
        let earliest = report.earliest;
        if let Some(d) = self.display.as_mut() {
            d.trigger = Some(report);
        }
        let t = earliest?;
        if !self.state.markers.occupies(t) {
            self.state.markers.add(Some(t));
        }
        Some(t)
    }

    // ── Marks ───────────────────────────────────────────────────────────────

    pub fn add_mark(&mut self, time_seconds: Option<f64>) -> Result<Uuid, WorkbenchError> {
        let t = time_seconds.unwrap_or(self.state.default_mark_seconds);
        self.state.markers.add(Some(t)).ok_or(WorkbenchError::NoActiveGroup)
    }

    pub fn move_mark(&mut self, id: Uuid, time_seconds: f64) -> Option<f64> {
        self.state.markers.move_to(id, time_seconds)
    }

    pub fn select_mark(&mut self, id: Uuid) -> bool {
        self.state.markers.select(id)
    }

    pub fn deselect_marks(&mut self) {
        self.state.markers.deselect();
    }

    pub fn delete_selected_mark(&mut self) -> Option<ArrivalMark> {
        self.state.markers.delete_selected()
    }

    pub fn commit(&mut self) -> Result<CommitOutcome, WorkbenchError> {
        self.active_key()?;
        let store = self.state.store.as_mut().ok_or(WorkbenchError::NoFolder)?;
        let outcome = self.state.markers.commit(store)?;
        self.refresh_and_follow()?;
        Ok(outcome)
    }

    /// Commit, then move to the next visible group.
    pub fn commit_and_advance(&mut self) -> Result<(CommitOutcome, NavOutcome), WorkbenchError> {
        self.active_key()?;
        let before = self.state.visible.clone();
        let store = self.state.store.as_mut().ok_or(WorkbenchError::NoFolder)?;
        let outcome = self.state.markers.commit(store)?;
        let nav = self.advance_from(&before)?;
        Ok((outcome, nav))
    }

    /// Remove all marks and persist "reviewed, no arrival".
    pub fn clear_marks(&mut self) -> Result<(), WorkbenchError> {
        self.active_key()?;
        let store = self.state.store.as_mut().ok_or(WorkbenchError::NoFolder)?;
        self.state.markers.clear(store)?;
        self.refresh_and_follow()
    }

    // ── Triage ──────────────────────────────────────────────────────────────

    /// Flip the review tag of the active group. Returns the new value.
    pub fn toggle_review(&mut self) -> Result<bool, WorkbenchError> {
        let key = self.active_key()?;
        let value = self.store_mut()?.toggle_review(&key)?;
        self.refresh_and_follow()?;
        Ok(value)
    }

    /// Soft-delete the active group and move on. The row keeps its marks.
    pub fn discard_active(&mut self) -> Result<NavOutcome, WorkbenchError> {
        let key = self.active_key()?;
        let before = self.state.visible.clone();
        self.store_mut()?.mark_deleted(&key)?;
        info!("[workbench] discarded {key}");
        self.advance_from(&before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::sac;
    use seismark_core::markers::MarkerPhase;
    use seismark_core::navigation::{Boundary, TriState};
    use tempfile::TempDir;

    /// 60 s at 100 Hz of a small alternating signal with a burst at `burst_s`.
    fn write_group(root: &Path, event: &str, station: &str, burst_s: f32) {
        let dir = root.join(event).join(station);
        std::fs::create_dir_all(&dir).unwrap();
        let samples: Vec<f32> = (0..6000)
            .map(|i| {
                let base = if i % 2 == 0 { 0.1 } else { -0.1 };
                if i as f32 >= burst_s * 100.0 { base * 50.0 } else { base }
            })
            .collect();
        for cmp in ["BHZ", "BHN"] {
            let bytes = sac::encode("XX", station, cmp, 0.01, &samples, false);
            std::fs::write(dir.join(format!("XX.{station}..{cmp}.sac")), bytes).unwrap();
        }
    }

    fn folder_with(groups: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (event, station) in groups {
            write_group(dir.path(), event, station, 30.0);
        }
        dir
    }

    fn opened(groups: &[(&str, &str)]) -> (TempDir, Workbench) {
        let dir = folder_with(groups);
        let mut wb = Workbench::new(SessionState::new());
        wb.open_folder(dir.path()).unwrap();
        (dir, wb)
    }

    fn first_mark(wb: &Workbench) -> f64 {
        wb.state().markers.marks().next().unwrap().time_seconds
    }

    fn write_truncated(root: &Path, event: &str, station: &str) {
        let dir = root.join(event).join(station);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("XX.{station}..BHZ.sac")), b"SACSAC\0").unwrap();
    }

    fn frames_of(wb: &Workbench, key: &str) -> Option<Vec<u64>> {
        wb.state().store.as_ref().unwrap().get(key).unwrap().p_wave_frames.clone()
    }

    #[test]
    fn empty_folder_opens_with_nothing_visible() {
        let dir = tempfile::tempdir().unwrap();
        let mut wb = Workbench::new(SessionState::new());
        wb.open_folder(dir.path()).unwrap();
        assert!(wb.state().group_keys.is_empty());
        assert!(wb.state().visible.is_empty());
        assert!(wb.display().is_none());
        assert_eq!(wb.state().loaded_counts(), (0, 0));
    }

    #[test]
    fn open_seeds_store_and_selects_first() {
        let (dir, wb) = opened(&[("eq002", "STA1"), ("eq001", "STA1")]);
        assert_eq!(wb.state().visible, ["eq001/STA1", "eq002/STA1"]);
        assert_eq!(wb.state().active_group.as_deref(), Some("eq001/STA1"));
        let d = wb.display().unwrap();
        assert_eq!(d.waveform.channels.len(), 2);
        assert_eq!(d.waveform.channels[d.vertical].id, "XX.STA1..BHZ");
        assert!(!d.spectrogram.is_empty());
        assert!(dir.path().join("data.csv").exists());
    }

    #[test]
    fn two_mark_round_trip() {
        let (dir, mut wb) = opened(&[("eq001", "STA1")]);
        wb.add_mark(Some(2.0)).unwrap();
        wb.add_mark(Some(5.0)).unwrap();
        assert_eq!(wb.commit().unwrap(), CommitOutcome::Committed(vec![200, 500]));

        let mut again = Workbench::new(SessionState::new());
        again.open_folder(dir.path()).unwrap();
        let times: Vec<f64> = again.state().markers.marks().map(|m| m.time_seconds).collect();
        assert_eq!(times, vec![2.0, 5.0]);
    }

    #[test]
    fn filtered_offset_scenario() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1")]);
        wb.apply_filter(FilterParams::bandpass(1.0, 10.0, 1.0)).unwrap();
        assert_eq!(wb.display().unwrap().time_base.offset_seconds, 1.0);
        wb.add_mark(Some(3.0)).unwrap();
        assert_eq!(wb.commit().unwrap(), CommitOutcome::Committed(vec![400]));

        wb.reload().unwrap();
        assert_eq!(first_mark(&wb), 3.0);

        wb.toggle_filter().unwrap();
        assert_eq!(first_mark(&wb), 4.0);
        wb.reload().unwrap();
        assert_eq!(first_mark(&wb), 4.0);
    }

    #[test]
    fn toggling_filter_keeps_uncommitted_marks_on_their_frames() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1")]);
        wb.apply_filter(FilterParams::highpass(1.0, 1.0)).unwrap();
        let id = wb.add_mark(Some(3.0)).unwrap();
        assert!(!wb.toggle_filter().unwrap());
        assert_eq!(wb.state().markers.get(id).unwrap().time_seconds, 4.0);
        assert_eq!(wb.state().markers.frames(), vec![400]);
    }

    #[test]
    fn invalid_bandpass_leaves_filter_state_and_display() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1")]);
        let before = Arc::clone(&wb.display().unwrap().waveform);
        let err = wb.apply_filter(FilterParams::bandpass(10.0, 5.0, 0.0)).unwrap_err();
        assert!(matches!(err, WorkbenchError::Filter(FilterError::InvertedBand { .. })));
        assert!(wb.state().filter_params.is_none());
        assert!(!wb.state().filter_enabled);
        assert!(Arc::ptr_eq(&before, &wb.display().unwrap().waveform));
    }

    #[test]
    fn filter_above_nyquist_leaves_previous_filter() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1")]);
        wb.apply_filter(FilterParams::lowpass(5.0, 0.0)).unwrap();
        assert!(wb.apply_filter(FilterParams::lowpass(80.0, 0.0)).is_err());
        assert_eq!(wb.state().filter_params, Some(FilterParams::lowpass(5.0, 0.0)));
        assert!(wb.display().unwrap().filtered);
    }

    #[test]
    fn sta_equal_lta_leaves_trigger_state() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1")]);
        let err = wb.apply_trigger(TriggerParams::new(5.0, 5.0, 3.0)).unwrap_err();
        assert!(matches!(err, WorkbenchError::Trigger(TriggerError::WindowOrder { .. })));
        assert!(wb.state().trigger_params.is_none());
        assert!(!wb.state().trigger_enabled);
        assert_eq!(wb.state().markers.phase(), MarkerPhase::Empty);
    }

    #[test]
    fn trigger_proposes_earliest_onset_without_committing() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1")]);
        let proposed = wb.apply_trigger(TriggerParams::new(0.5, 10.0, 3.0)).unwrap();
        assert_eq!(proposed, Some(30.0));
        assert_eq!(wb.state().markers.len(), 1);
        assert!(wb.state().markers.is_dirty());
        assert_eq!(frames_of(&wb, "eq001/STA1"), None);
        assert_eq!(wb.display().unwrap().trigger.as_ref().unwrap().channels.len(), 2);
    }

    #[test]
    fn toggles_without_parameters_are_not_configured() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1")]);
        assert!(matches!(wb.toggle_filter(), Err(WorkbenchError::Filter(FilterError::NotConfigured))));
        assert!(matches!(wb.toggle_trigger(), Err(WorkbenchError::Trigger(TriggerError::NotConfigured))));
    }

    #[test]
    fn navigation_stops_at_both_ends() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1"), ("eq001", "STA2")]);
        assert_eq!(wb.navigate(Direction::Previous).unwrap(), NavOutcome::Boundary(Boundary::Start));
        assert_eq!(wb.navigate(Direction::Next).unwrap(), NavOutcome::Moved("eq001/STA2".into()));
        assert_eq!(wb.navigate(Direction::Next).unwrap(), NavOutcome::Boundary(Boundary::End));
        assert_eq!(wb.state().active_group.as_deref(), Some("eq001/STA2"));
    }

    #[test]
    fn commit_and_advance_moves_on() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1"), ("eq001", "STA2")]);
        wb.add_mark(None).unwrap();
        let (outcome, nav) = wb.commit_and_advance().unwrap();
        assert_eq!(outcome, CommitOutcome::Committed(vec![500]));
        assert_eq!(nav, NavOutcome::Moved("eq001/STA2".into()));
        assert_eq!(wb.state().active_group.as_deref(), Some("eq001/STA2"));
    }

    #[test]
    fn commit_under_unmarked_filter_advances_to_next() {
        let (_dir, mut wb) = opened(&[("a", "S1"), ("a", "S2"), ("a", "S3")]);
        wb.set_filter_selection(FilterSelection { has_mark: TriState::RequireFalse, ..Default::default() }).unwrap();
        wb.navigate(Direction::Next).unwrap();
        wb.add_mark(Some(1.0)).unwrap();
        let (_, nav) = wb.commit_and_advance().unwrap();
        assert_eq!(nav, NavOutcome::Moved("a/S3".into()));
        assert_eq!(wb.state().visible, ["a/S1", "a/S3"]);
        assert_eq!(wb.state().active_group.as_deref(), Some("a/S3"));
    }

    #[test]
    fn discard_hides_group_but_keeps_its_row() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1"), ("eq001", "STA2")]);
        wb.add_mark(Some(2.0)).unwrap();
        wb.commit().unwrap();
        assert!(wb.toggle_review().unwrap());

        let nav = wb.discard_active().unwrap();
        assert_eq!(nav, NavOutcome::Moved("eq001/STA2".into()));
        assert_eq!(wb.state().visible, ["eq001/STA2"]);
        let row = wb.state().store.as_ref().unwrap().get("eq001/STA1").unwrap().clone();
        assert!(row.deleted && row.needs_review);
        assert_eq!(row.p_wave_frames, Some(vec![200]));

        wb.set_filter_selection(FilterSelection { discarded: TriState::RequireTrue, ..Default::default() }).unwrap();
        assert_eq!(wb.state().visible, ["eq001/STA1"]);
        assert_eq!(wb.state().active_group.as_deref(), Some("eq001/STA1"));
    }

    #[test]
    fn discarding_last_visible_clears_display() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1")]);
        assert_eq!(wb.discard_active().unwrap(), NavOutcome::Boundary(Boundary::End));
        assert!(wb.state().visible.is_empty());
        assert!(wb.display().is_none());
        assert!(wb.state().active_group.is_none());
    }

    #[test]
    fn selection_is_kept_when_still_visible() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1"), ("eq001", "STA2")]);
        wb.navigate(Direction::Next).unwrap();
        let id = wb.add_mark(Some(1.0)).unwrap();
        wb.set_filter_selection(FilterSelection { review: TriState::RequireFalse, ..Default::default() }).unwrap();
        assert_eq!(wb.state().active_group.as_deref(), Some("eq001/STA2"));
        assert!(wb.state().markers.get(id).is_some());
    }

    #[test]
    fn empty_commit_is_a_no_op_and_clear_is_explicit() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1")]);
        wb.add_mark(Some(2.0)).unwrap();
        wb.commit().unwrap();
        let id = wb.state().markers.marks().next().unwrap().id;
        wb.select_mark(id);
        wb.delete_selected_mark().unwrap();
        assert_eq!(wb.commit().unwrap(), CommitOutcome::NothingToCommit);
        assert_eq!(frames_of(&wb, "eq001/STA1"), Some(vec![200]));

        wb.clear_marks().unwrap();
        assert_eq!(frames_of(&wb, "eq001/STA1"), Some(vec![]));
    }

    #[test]
    fn load_error_names_group_and_leaves_display() {
        let dir = folder_with(&[("eq001", "STA1")]);
        let bad = dir.path().join("eq002").join("STA9");
        std::fs::create_dir_all(&bad).unwrap();
        std::fs::write(bad.join("XX.STA9..BHZ.sac"), b"garbage").unwrap();

        let mut wb = Workbench::new(SessionState::new());
        wb.open_folder(dir.path()).unwrap();
        let err = wb.select("eq002/STA9").unwrap_err();
        assert!(err.to_string().starts_with("eq002/STA9: "), "{err}");
        assert_eq!(wb.state().active_group.as_deref(), Some("eq001/STA1"));
        assert!(wb.display().is_some());
    }

    #[test]
    fn operations_without_folder_fail_cleanly() {
        let mut wb = Workbench::new(SessionState::new());
        assert!(matches!(wb.rescan(), Err(WorkbenchError::NoFolder)));
        assert!(matches!(wb.commit(), Err(WorkbenchError::NoActiveGroup)));
        assert!(matches!(wb.add_mark(None), Err(WorkbenchError::NoActiveGroup)));
        assert!(matches!(wb.select("x"), Err(WorkbenchError::UnknownGroup(_))));
    }

    #[test]
    fn open_steps_over_an_unreadable_first_group() {
        let dir = folder_with(&[("eq002", "STA1")]);
        write_truncated(dir.path(), "eq001", "STA1");

        let mut wb = Workbench::new(SessionState::new());
        wb.open_folder(dir.path()).unwrap();
        assert_eq!(wb.state().visible, ["eq001/STA1", "eq002/STA1"]);
        assert_eq!(wb.state().active_group.as_deref(), Some("eq002/STA1"));
        assert!(wb.display().is_some());
        assert!(wb.state().status.as_deref().unwrap().contains("eq001/STA1"));

        assert_eq!(wb.navigate(Direction::Previous).unwrap(), NavOutcome::Boundary(Boundary::Start));
        assert_eq!(wb.state().active_group.as_deref(), Some("eq002/STA1"));
    }

    #[test]
    fn open_with_only_unreadable_groups_still_reports() {
        let dir = tempfile::tempdir().unwrap();
        write_truncated(dir.path(), "eq001", "STA1");
        std::fs::write(dir.path().join("data.csv"), "trace_path,p_wave_frame\neq001/STA1,523.0\n").unwrap();

        let mut wb = Workbench::new(SessionState::new());
        let report = wb.open_folder(dir.path()).unwrap();
        assert!(report.backup.is_some());
        assert!(wb.display().is_none());
        assert!(wb.state().active_group.is_none());
        assert_eq!(wb.navigate(Direction::Next).unwrap(), NavOutcome::Boundary(Boundary::End));
    }

    #[test]
    fn navigation_skips_an_unreadable_middle_group() {
        let dir = folder_with(&[("a", "S1"), ("a", "S3")]);
        write_truncated(dir.path(), "a", "S2");

        let mut wb = Workbench::new(SessionState::new());
        wb.open_folder(dir.path()).unwrap();
        assert_eq!(wb.navigate(Direction::Next).unwrap(), NavOutcome::Moved("a/S3".into()));
        assert!(wb.state().status.as_deref().unwrap().contains("a/S2"));
        assert_eq!(wb.navigate(Direction::Previous).unwrap(), NavOutcome::Moved("a/S1".into()));
    }

    #[test]
    fn committed_trigger_pick_is_not_proposed_again() {
        let (_dir, mut wb) = opened(&[("eq001", "STA1")]);
        wb.apply_trigger(TriggerParams::new(0.5, 10.0, 3.0)).unwrap();
        assert_eq!(wb.commit().unwrap(), CommitOutcome::Committed(vec![3000]));

        wb.reload().unwrap();
        assert_eq!(wb.state().markers.frames(), vec![3000]);
        assert_eq!(wb.commit().unwrap(), CommitOutcome::Committed(vec![3000]));

        assert!(!wb.toggle_trigger().unwrap());
        assert!(wb.toggle_trigger().unwrap());
        assert_eq!(wb.state().markers.frames(), vec![3000]);
        assert!(wb.display().unwrap().trigger.is_some());
    }
}
