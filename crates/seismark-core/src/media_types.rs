// crates/seismark-core/src/media_types.rs
//
// Types that flow between seismark-media and the rest of the app.
// Plain data only, no decoding or filtering.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// How a data folder is split into trace groups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    /// `folder/{event}/.../{station}/*.sac`, keyed `"{event}/{station}"`.
    #[default]
    EventStation,
    /// `folder/**/{prefix}.*.{sac|mseed}`, keyed by the file name before the first `.`.
    FilenamePrefix,
}

/// One annotation unit: the component files of one event at one station.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceGroup {
    pub group_key:            String,
    pub component_file_paths: Vec<PathBuf>,
}

/// One decoded component.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// `NET.STA.LOC.CHA`
    pub id:            String,
    pub sampling_rate: f64,
    pub samples:       Vec<f64>,
}

impl Channel {
    pub fn new(id: impl Into<String>, sampling_rate: f64, samples: Vec<f64>) -> Self {
        Self { id: id.into(), sampling_rate, samples }
    }

    /// Component code: the last character of the channel code (`Z`, `N`, `E`, `1`, …).
    pub fn component(&self) -> Option<char> {
        self.id.rsplit('.').next().and_then(|cha| cha.chars().last())
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self.component(), Some('Z' | 'z'))
    }

    /// Length of the channel in seconds (`samples / rate`).
    pub fn duration(&self) -> f64 {
        if self.sampling_rate > 0.0 {
            self.samples.len() as f64 / self.sampling_rate
        } else {
            0.0
        }
    }
}

/// The decoded multi-channel time series of one TraceGroup.
///
/// Never mutated after construction: filtering builds a new Waveform so the
/// unfiltered original stays retrievable from the cache.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    pub group_key: String,
    pub channels:  Vec<Channel>,
}

impl Waveform {
    /// Index of the channel used for plotting, triggering and frame conversion.
    /// First `*Z` channel, else the first channel.
    pub fn vertical_index(&self) -> Option<usize> {
        self.channels
            .iter()
            .position(Channel::is_vertical)
            .or(if self.channels.is_empty() { None } else { Some(0) })
    }

    pub fn vertical(&self) -> Option<&Channel> {
        self.vertical_index().map(|i| &self.channels[i])
    }

    pub fn has_true_vertical(&self) -> bool {
        self.channels.iter().any(Channel::is_vertical)
    }
}

/// Time-frequency decomposition of one channel for display.
///
/// `power` is row-major by time bin: `power[t * freqs.len() + f]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrogram {
    pub times: Vec<f64>,
    pub freqs: Vec<f64>,
    pub power: Vec<f32>,
}

impl Spectrogram {
    pub fn is_empty(&self) -> bool {
        self.times.is_empty() || self.freqs.is_empty()
    }

    pub fn value(&self, time_bin: usize, freq_bin: usize) -> f32 {
        self.power[time_bin * self.freqs.len() + freq_bin]
    }

    /// (min, max) of the whole matrix, used as the colour levels.
    pub fn levels(&self) -> (f32, f32) {
        self.power.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
    }
}

/// One STA/LTA detection as sample indices into its channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    pub onset_frame:  usize,
    pub offset_frame: usize,
}

/// A channel's detections converted to seconds in that channel's time base.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelDetections {
    pub channel_id: String,
    /// (onset_seconds, offset_seconds), ascending by onset.
    pub windows:    Vec<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(id: &str) -> Channel {
        Channel::new(id, 100.0, vec![0.0; 250])
    }

    #[test]
    fn component_is_last_char_of_channel_code() {
        assert_eq!(ch("XX.STA1.00.BHZ").component(), Some('Z'));
        assert_eq!(ch("XX.STA1..HHN").component(), Some('N'));
        assert!(ch("XX.STA1..HHZ").is_vertical());
    }

    #[test]
    fn duration_is_samples_over_rate() {
        assert!((ch("A.B..BHZ").duration() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn vertical_prefers_z_then_falls_back_to_first() {
        let wf = Waveform {
            group_key: "eq001/STA1".into(),
            channels:  vec![ch("XX.STA1..BHN"), ch("XX.STA1..BHZ"), ch("XX.STA1..BHE")],
        };
        assert_eq!(wf.vertical_index(), Some(1));

        let no_z = Waveform { group_key: "g".into(), channels: vec![ch("XX.S..BHN")] };
        assert_eq!(no_z.vertical_index(), Some(0));
        assert!(!no_z.has_true_vertical());

        let empty = Waveform { group_key: "g".into(), channels: vec![] };
        assert_eq!(empty.vertical_index(), None);
    }

    #[test]
    fn spectrogram_levels_span_matrix() {
        let s = Spectrogram {
            times: vec![0.5, 1.0],
            freqs: vec![1.0, 2.0],
            power: vec![0.2, 3.0, -1.0, 0.5],
        };
        assert_eq!(s.levels(), (-1.0, 3.0));
        assert_eq!(s.value(1, 0), -1.0);
    }
}
