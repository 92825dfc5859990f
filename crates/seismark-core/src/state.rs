// crates/seismark-core/src/state.rs
// Pure session data: no egui, no decoders, no runtime handles.
// SessionState is what the UI renders from; Preferences is the serde slice of
// it that survives a restart.
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::markers::{MarkerSession, DEFAULT_MARK_SECONDS};
use crate::media_types::ScanMode;
use crate::navigation::{self, FilterSelection};
use crate::params::{FilterParams, TriggerParams};
use crate::store::{AnnotationRecord, AnnotationStore};

#[derive(Debug, Default)]
pub struct SessionState {
    pub folder:           Option<PathBuf>,
    pub scan_mode:        ScanMode,
    /// Every group key from the last scan, in scan order.
    pub group_keys:       Vec<String>,
    /// `group_keys` filtered by `filter_selection`. Rebuilt, never patched.
    pub visible:          Vec<String>,
    pub active_group:     Option<String>,
    pub markers:          MarkerSession,
    pub filter_selection: FilterSelection,
    pub store:            Option<AnnotationStore>,

    // ── Signal transforms ─────────────────────────────────────────────────────
    /// Last parameters that passed validation. Kept while the filter is off
    /// so the toggle key can turn it back on.
    pub filter_params:    Option<FilterParams>,
    pub filter_enabled:   bool,
    pub trigger_params:   Option<TriggerParams>,
    pub trigger_enabled:  bool,
    pub default_mark_seconds: f64,

    // ── Runtime-only ──────────────────────────────────────────────────────────
    /// One-line status shown under the plot.
    pub status:           Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self { default_mark_seconds: DEFAULT_MARK_SECONDS, ..Self::default() }
    }

    pub fn from_preferences(prefs: &Preferences) -> Self {
        let mut state = Self::new();
        prefs.apply_to(&mut state);
        state
    }

    /// The filter that is shaping the display right now, if any.
    pub fn active_filter(&self) -> Option<&FilterParams> {
        if self.filter_enabled { self.filter_params.as_ref() } else { None }
    }

    pub fn active_trigger(&self) -> Option<&TriggerParams> {
        if self.trigger_enabled { self.trigger_params.as_ref() } else { None }
    }

    pub fn active_record(&self) -> Option<&AnnotationRecord> {
        let key = self.active_group.as_deref()?;
        self.store.as_ref()?.get(key)
    }

    pub fn is_tagged_for_review(&self) -> bool {
        self.active_record().is_some_and(|r| r.needs_review)
    }

    /// "Loaded Traces: visible/total"
    pub fn loaded_counts(&self) -> (usize, usize) {
        (self.visible.len(), self.group_keys.len())
    }

    /// Rebuild `visible` and return the group that should now be active.
    pub fn refresh_visible(&mut self) -> Option<String> {
        self.visible = match &self.store {
            Some(store) => navigation::compute_visible(&self.group_keys, store.table(), &self.filter_selection),
            None        => Vec::new(),
        };
        navigation::preserve_selection(&self.visible, self.active_group.as_deref())
    }
}

/// Durable user settings, stored through eframe's app storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub last_folder:          Option<PathBuf>,
    pub scan_mode:            ScanMode,
    pub filter_params:        Option<FilterParams>,
    pub filter_enabled:       bool,
    pub trigger_params:       Option<TriggerParams>,
    pub trigger_enabled:      bool,
    pub default_mark_seconds: f64,
    pub filter_selection:     FilterSelection,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            last_folder:          None,
            scan_mode:            ScanMode::default(),
            filter_params:        None,
            filter_enabled:       false,
            trigger_params:       None,
            trigger_enabled:      false,
            default_mark_seconds: DEFAULT_MARK_SECONDS,
            filter_selection:     FilterSelection::default(),
        }
    }
}

impl Preferences {
    pub fn capture(state: &SessionState) -> Self {
        Self {
            last_folder:          state.folder.clone(),
            scan_mode:            state.scan_mode,
            filter_params:        state.filter_params.clone(),
            filter_enabled:       state.filter_enabled,
            trigger_params:       state.trigger_params.clone(),
            trigger_enabled:      state.trigger_enabled,
            default_mark_seconds: state.default_mark_seconds,
            filter_selection:     state.filter_selection,
        }
    }

    /// Copy into a fresh state. Stored parameters that no longer validate are
    /// dropped rather than carried into the session.
    pub fn apply_to(&self, state: &mut SessionState) {
        state.scan_mode            = self.scan_mode;
        state.filter_params        = self.filter_params.clone().filter(|p| p.validate().is_ok());
        state.filter_enabled       = self.filter_enabled && state.filter_params.is_some();
        state.trigger_params       = self.trigger_params.clone().filter(|p| p.validate().is_ok());
        state.trigger_enabled      = self.trigger_enabled && state.trigger_params.is_some();
        state.default_mark_seconds = if self.default_mark_seconds.is_finite() && self.default_mark_seconds >= 0.0 {
            self.default_mark_seconds
        } else {
            DEFAULT_MARK_SECONDS
        };
        state.filter_selection     = self.filter_selection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::TriState;

    #[test]
    fn preferences_round_trip_through_json() {
        let prefs = Preferences {
            last_folder:     Some(PathBuf::from("/data/run1")),
            filter_params:   Some(FilterParams::bandpass(1.0, 10.0, 0.5)),
            filter_enabled:  true,
            filter_selection: FilterSelection { review: TriState::RequireTrue, ..Default::default() },
            ..Preferences::default()
        };
        let json = serde_json::to_string(&prefs).unwrap();
        assert_eq!(serde_json::from_str::<Preferences>(&json).unwrap(), prefs);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let prefs: Preferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.default_mark_seconds, 5.0);
    }

    #[test]
    fn invalid_stored_filter_is_dropped() {
        let prefs = Preferences {
            filter_params:  Some(FilterParams::bandpass(10.0, 5.0, 0.0)),
            filter_enabled: true,
            ..Preferences::default()
        };
        let state = SessionState::from_preferences(&prefs);
        assert!(state.filter_params.is_none());
        assert!(!state.filter_enabled);
        assert!(state.active_filter().is_none());
    }

    #[test]
    fn counts_are_visible_over_total() {
        let mut state = SessionState::new();
        state.group_keys = vec!["a".into(), "b".into(), "c".into()];
        state.visible    = vec!["b".into()];
        assert_eq!(state.loaded_counts(), (1, 3));
    }

    #[test]
    fn refresh_without_store_clears_visible() {
        let mut state = SessionState::new();
        state.group_keys = vec!["a".into()];
        state.active_group = Some("a".into());
        assert_eq!(state.refresh_visible(), None);
        assert!(state.visible.is_empty());
    }
}
