// crates/seismark-media/src/sta_lta.rs
//
// Classic STA/LTA characteristic function and threshold-crossing onsets.

use seismark_core::error::TriggerError;
use seismark_core::media_types::{Channel, Detection};
use seismark_core::params::TriggerParams;

/// Ratio of short- to long-term mean energy. The first `nlta - 1` values are
/// zero (the long window is not yet full).
pub fn classic_sta_lta(samples: &[f64], nsta: usize, nlta: usize) -> Vec<f64> {
    let n = samples.len();
    let mut cumsum = Vec::with_capacity(n);
    let mut acc = 0.0;
    for x in samples {
        acc += x * x;
        cumsum.push(acc);
    }

    let window_mean = |i: usize, len: usize| -> f64 {
        let upper = cumsum[i];
        let lower = if i >= len { cumsum[i - len] } else { 0.0 };
        (upper - lower) / len as f64
    };

    let zeroed = nlta.saturating_sub(1).min(n);
    (0..n)
        .map(|i| {
            if i < zeroed {
                return 0.0;
            }
            let lta = window_mean(i, nlta).max(f64::MIN_POSITIVE);
            window_mean(i, nsta) / lta
        })
        .collect()
}

/// Runs of `cft > threshold`: onset is the first sample above, offset the
/// last one before it falls back.
pub fn trigger_onset(cft: &[f64], threshold: f64) -> Vec<Detection> {
    let mut out = Vec::new();
    let mut onset = None;
    for (i, &v) in cft.iter().enumerate() {
        match (onset, v > threshold) {
            (None, true) => onset = Some(i),
            (Some(on), false) => {
                out.push(Detection { onset_frame: on, offset_frame: i - 1 });
                onset = None;
            }
            _ => {}
        }
    }
    if let Some(on) = onset {
        out.push(Detection { onset_frame: on, offset_frame: cft.len() - 1 });
    }
    out
}

/// Detections on one channel, ascending by onset. No detections is `Ok(vec![])`.
pub fn detect_sta_lta(channel: &Channel, params: &TriggerParams) -> Result<Vec<Detection>, TriggerError> {
    let (nsta, nlta) = params.window_samples(channel.sampling_rate)?;
    let cft = classic_sta_lta(&channel.samples, nsta, nlta);
    Ok(trigger_onset(&cft, params.threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quiet noise-like signal with a burst starting at `at`.
    fn burst(n: usize, at: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let base = if i % 2 == 0 { 0.1 } else { -0.1 };
                if i >= at { base * 50.0 } else { base }
            })
            .collect()
    }

    #[test]
    fn warmup_is_zero() {
        let cft = classic_sta_lta(&burst(100, 1000), 5, 20);
        assert!(cft[..19].iter().all(|&v| v == 0.0));
        assert!((cft[19] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn burst_is_detected_at_its_start() {
        let samples = burst(3000, 2000);
        let dets = trigger_onset(&classic_sta_lta(&samples, 50, 1000), 3.0);
        assert_eq!(dets.len(), 1);
        let d = dets[0];
        assert!(d.onset_frame >= 2000 && d.onset_frame < 2010, "onset {}", d.onset_frame);
        assert!(d.offset_frame > d.onset_frame);
    }

    #[test]
    fn runs_become_onset_offset_pairs() {
        let cft = [0.0, 4.0, 5.0, 1.0, 0.0, 6.0, 2.0, 7.0];
        let dets = trigger_onset(&cft, 3.0);
        let pairs: Vec<(usize, usize)> = dets.iter().map(|d| (d.onset_frame, d.offset_frame)).collect();
        assert_eq!(pairs, vec![(1, 2), (5, 5), (7, 7)]);
        assert!(trigger_onset(&[0.0, 1.0], 3.0).is_empty());
    }

    #[test]
    fn channel_shorter_than_lta_has_no_detections() {
        let ch = Channel::new("XX.S..BHZ", 100.0, burst(500, 100));
        assert!(detect_sta_lta(&ch, &TriggerParams::new(0.5, 10.0, 3.0)).unwrap().is_empty());
    }
}
