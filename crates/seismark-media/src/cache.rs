// crates/seismark-media/src/cache.rs
//
// Decoded and filtered waveforms by group key, for the life of a folder
// session. Entries are never invalidated by file changes on disk; the filtered
// entry is replaced only when the filter parameters differ.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use seismark_core::error::FilterError;
use seismark_core::media_types::{TraceGroup, Waveform};
use seismark_core::params::FilterParams;

use crate::decode::load_group;
use crate::error::LoadError;
use crate::filter::apply_filter;

#[derive(Default)]
pub struct WaveformCache {
    raw:      HashMap<String, Arc<Waveform>>,
    filtered: HashMap<String, (FilterParams, Arc<Waveform>)>,
}

impl WaveformCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
        self.filtered.clear();
    }

    pub fn is_loaded(&self, group_key: &str) -> bool {
        self.raw.contains_key(group_key)
    }

    /// Decoded waveform, loading it on first use. A failed load caches nothing.
    pub fn raw(&mut self, group: &TraceGroup) -> Result<Arc<Waveform>, LoadError> {
        if let Some(wf) = self.raw.get(&group.group_key) {
            return Ok(Arc::clone(wf));
        }
        let wf = Arc::new(load_group(group)?);
        debug!("[cache] loaded {} ({} channels)", group.group_key, wf.channels.len());
        self.raw.insert(group.group_key.clone(), Arc::clone(&wf));
        Ok(wf)
    }

    /// Filtered derivative of an already-loaded waveform.
    pub fn filtered(&mut self, raw: &Waveform, params: &FilterParams) -> Result<Arc<Waveform>, FilterError> {
        if let Some((cached_params, wf)) = self.filtered.get(&raw.group_key) {
            if cached_params == params {
                return Ok(Arc::clone(wf));
            }
        }
        let wf = Arc::new(apply_filter(raw, params)?);
        self.filtered.insert(raw.group_key.clone(), (params.clone(), Arc::clone(&wf)));
        Ok(wf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seismark_core::media_types::Channel;

    fn wf() -> Waveform {
        Waveform { group_key: "g".into(), channels: vec![Channel::new("XX.S..BHZ", 100.0, vec![0.0; 500])] }
    }

    #[test]
    fn filtered_entry_follows_params_and_keeps_raw() {
        let mut cache = WaveformCache::new();
        let raw = wf();
        let a = cache.filtered(&raw, &FilterParams::highpass(1.0, 1.0)).unwrap();
        let again = cache.filtered(&raw, &FilterParams::highpass(1.0, 1.0)).unwrap();
        assert!(Arc::ptr_eq(&a, &again));
        let b = cache.filtered(&raw, &FilterParams::highpass(1.0, 2.0)).unwrap();
        assert_eq!(b.channels[0].samples.len(), 300);
        assert_eq!(raw.channels[0].samples.len(), 500);
    }

    #[test]
    fn failed_filter_caches_nothing() {
        let mut cache = WaveformCache::new();
        assert!(cache.filtered(&wf(), &FilterParams::lowpass(80.0, 0.0)).is_err());
        assert!(cache.filtered.is_empty());
    }

    #[test]
    fn failed_load_caches_nothing() {
        let mut cache = WaveformCache::new();
        let group = TraceGroup { group_key: "g".into(), component_file_paths: vec!["/nonexistent/x.sac".into()] };
        assert!(cache.raw(&group).is_err());
        assert!(!cache.is_loaded("g"));
    }
}
