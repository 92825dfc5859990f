// crates/seismark-media/src/trigger.rs
//
// STA/LTA over every channel of the displayed waveform, reduced to one
// proposed arrival: the earliest onset on any channel.

use tracing::{debug, info};

use seismark_core::error::TriggerError;
use seismark_core::media_types::{ChannelDetections, Waveform};
use seismark_core::params::TriggerParams;

use crate::sta_lta::detect_sta_lta;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerReport {
    /// Earliest onset across channels, seconds in the displayed time base.
    pub earliest: Option<f64>,
    /// Channels with at least one detection.
    pub channels: Vec<ChannelDetections>,
}

/// Run the detector on each channel. Parameters are validated before any
/// channel is touched.
pub fn run(waveform: &Waveform, params: &TriggerParams) -> Result<TriggerReport, TriggerError> {
    params.validate()?;
    let mut report = TriggerReport::default();

    for ch in &waveform.channels {
        let detections = detect_sta_lta(ch, params)?;
        if detections.is_empty() {
            continue;
        }
        let windows: Vec<(f64, f64)> = detections
            .iter()
            .map(|d| (d.onset_frame as f64 / ch.sampling_rate, d.offset_frame as f64 / ch.sampling_rate))
            .collect();
        let first = windows[0].0;
        debug!("[trigger] {}: {} detection(s), first at {first:.3} s", ch.id, windows.len());
        report.earliest = Some(report.earliest.map_or(first, |e: f64| e.min(first)));
        report.channels.push(ChannelDetections { channel_id: ch.id.clone(), windows });
    }

    match report.earliest {
        Some(t) => info!("[trigger] {}: earliest onset {t:.3} s", waveform.group_key),
        None    => info!("[trigger] {}: no detections", waveform.group_key),
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seismark_core::media_types::Channel;

    fn burst_channel(id: &str, at: usize) -> Channel {
        let samples = (0..3000)
            .map(|i| {
                let base = if i % 2 == 0 { 0.1 } else { -0.1 };
                if i >= at { base * 50.0 } else { base }
            })
            .collect();
        Channel::new(id, 100.0, samples)
    }

    #[test]
    fn earliest_onset_across_channels() {
        let wf = Waveform {
            group_key: "eq001/STA1".into(),
            channels:  vec![burst_channel("XX.S..BHZ", 2200), burst_channel("XX.S..BHN", 2000)],
        };
        let report = run(&wf, &TriggerParams::new(0.5, 10.0, 3.0)).unwrap();
        assert_eq!(report.channels.len(), 2);
        assert_eq!(report.earliest, Some(20.0));
    }

    #[test]
    fn quiet_waveform_has_no_proposal() {
        let wf = Waveform { group_key: "g".into(), channels: vec![burst_channel("XX.S..BHZ", 10_000)] };
        let report = run(&wf, &TriggerParams::new(0.5, 10.0, 3.0)).unwrap();
        assert_eq!(report, TriggerReport::default());
    }

    #[test]
    fn sta_equal_lta_is_rejected() {
        let wf = Waveform { group_key: "g".into(), channels: vec![burst_channel("XX.S..BHZ", 2000)] };
        assert_eq!(
            run(&wf, &TriggerParams::new(5.0, 5.0, 3.0)),
            Err(TriggerError::WindowOrder { sta: 5.0, lta: 5.0 })
        );
    }
}
