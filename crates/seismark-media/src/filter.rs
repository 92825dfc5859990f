// crates/seismark-media/src/filter.rs
//
// Butterworth filtering + offset trim, producing a new Waveform.
//
// Each corner is a 4-pole Butterworth built as two cascaded RBJ biquads
// (bilinear transform), run once forward (causal, like a recorder's
// anti-alias chain). Bandpass = highpass at min_freq then lowpass at max_freq.

use std::f64::consts::PI;

use tracing::debug;

use seismark_core::error::FilterError;
use seismark_core::media_types::{Channel, Waveform};
use seismark_core::params::FilterParams;

/// Channels shorter than this are rejected rather than filtered.
pub const MIN_SAMPLES: usize = 8;

/// Per-section Q of a 4th-order Butterworth: 1 / (2 cos(π/8)), 1 / (2 cos(3π/8)).
const BUTTERWORTH_Q: [f64; 2] = [0.541_196_100_146_197, 1.306_562_964_876_376_5];

#[derive(Clone, Copy, Debug, Default)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    fn from_raw(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self { b0: b0 / a0, b1: b1 / a0, b2: b2 / a0, a1: a1 / a0, a2: a2 / a0, z1: 0.0, z2: 0.0 }
    }

    fn low_pass(cutoff_hz: f64, q: f64, sample_rate: f64) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);
        Self::from_raw(
            (1.0 - cos_w0) / 2.0,
            1.0 - cos_w0,
            (1.0 - cos_w0) / 2.0,
            1.0 + alpha,
            -2.0 * cos_w0,
            1.0 - alpha,
        )
    }

    fn high_pass(cutoff_hz: f64, q: f64, sample_rate: f64) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);
        Self::from_raw(
            (1.0 + cos_w0) / 2.0,
            -(1.0 + cos_w0),
            (1.0 + cos_w0) / 2.0,
            1.0 + alpha,
            -2.0 * cos_w0,
            1.0 - alpha,
        )
    }

    /// Transposed direct form II.
    fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }
}

fn sections(params: &FilterParams, sample_rate: f64) -> Vec<Biquad> {
    let (hp, lp) = params.corners();
    let mut out = Vec::with_capacity(4);
    if let Some(fc) = hp {
        out.extend(BUTTERWORTH_Q.iter().map(|&q| Biquad::high_pass(fc, q, sample_rate)));
    }
    if let Some(fc) = lp {
        out.extend(BUTTERWORTH_Q.iter().map(|&q| Biquad::low_pass(fc, q, sample_rate)));
    }
    out
}

/// Samples trimmed from the front of a channel at `sampling_rate`.
pub fn offset_samples(params: &FilterParams, sampling_rate: f64) -> usize {
    (params.offset_seconds * sampling_rate).round().max(0.0) as usize
}

/// Per-channel checks done before any channel is filtered.
fn check_channel(ch: &Channel, params: &FilterParams) -> Result<(), FilterError> {
    if ch.samples.len() < MIN_SAMPLES {
        return Err(FilterError::TooShort { channel: ch.id.clone(), samples: ch.samples.len(), required: MIN_SAMPLES });
    }
    let nyquist = ch.sampling_rate / 2.0;
    let (hp, lp) = params.corners();
    for freq in [hp, lp].into_iter().flatten() {
        if freq >= nyquist {
            return Err(FilterError::AboveNyquist { channel: ch.id.clone(), freq, nyquist });
        }
    }
    if offset_samples(params, ch.sampling_rate) >= ch.samples.len() {
        return Err(FilterError::OffsetBeyondEnd { channel: ch.id.clone(), offset: params.offset_seconds });
    }
    Ok(())
}

pub fn filter_channel(ch: &Channel, params: &FilterParams) -> Result<Channel, FilterError> {
    check_channel(ch, params)?;
    let mut chain = sections(params, ch.sampling_rate);
    let trim = offset_samples(params, ch.sampling_rate);
    let samples = ch
        .samples
        .iter()
        .map(|&x| chain.iter_mut().fold(x, |acc, s| s.process(acc)))
        .skip(trim)
        .collect();
    Ok(Channel::new(ch.id.clone(), ch.sampling_rate, samples))
}

/// Filter every channel of `waveform` and trim the offset. The input is never
/// touched; on error nothing has been produced.
pub fn apply_filter(waveform: &Waveform, params: &FilterParams) -> Result<Waveform, FilterError> {
    params.validate()?;
    for ch in &waveform.channels {
        check_channel(ch, params)?;
    }
    let channels = waveform
        .channels
        .iter()
        .map(|ch| filter_channel(ch, params))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("[filter] {}: {}", waveform.group_key, params.describe());
    Ok(Waveform { group_key: waveform.group_key.clone(), channels })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, rate: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * freq * i as f64 / rate).sin()).collect()
    }

    fn rms(x: &[f64]) -> f64 {
        (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
    }

    fn wf(samples: Vec<f64>) -> Waveform {
        Waveform { group_key: "eq001/STA1".into(), channels: vec![Channel::new("XX.STA1..BHZ", 100.0, samples)] }
    }

    #[test]
    fn lowpass_attenuates_above_corner() {
        let input = wf(sine(20.0, 100.0, 2000));
        let out = apply_filter(&input, &FilterParams::lowpass(2.0, 0.0)).unwrap();
        let tail = &out.channels[0].samples[500..];
        assert!(rms(tail) < 0.01, "rms {}", rms(tail));
    }

    #[test]
    fn highpass_removes_dc_and_passes_band() {
        let out = apply_filter(&wf(vec![5.0; 2000]), &FilterParams::highpass(1.0, 0.0)).unwrap();
        assert!(out.channels[0].samples[1500..].iter().all(|v| v.abs() < 1e-3));

        let out = apply_filter(&wf(sine(10.0, 100.0, 2000)), &FilterParams::highpass(1.0, 0.0)).unwrap();
        let r = rms(&out.channels[0].samples[500..]);
        assert!((r - 0.5f64.sqrt()).abs() < 0.05, "rms {r}");
    }

    #[test]
    fn bandpass_passes_centre() {
        let out = apply_filter(&wf(sine(5.0, 100.0, 3000)), &FilterParams::bandpass(1.0, 20.0, 0.0)).unwrap();
        let r = rms(&out.channels[0].samples[1000..]);
        assert!(r > 0.6, "rms {r}");
    }

    #[test]
    fn offset_trims_from_start() {
        let input = wf(vec![0.0; 1000]);
        let out = apply_filter(&input, &FilterParams::lowpass(10.0, 1.0)).unwrap();
        assert_eq!(out.channels[0].samples.len(), 900);
        assert_eq!(input.channels[0].samples.len(), 1000);
    }

    #[test]
    fn invalid_bandpass_is_rejected() {
        let err = apply_filter(&wf(vec![0.0; 100]), &FilterParams::bandpass(10.0, 5.0, 0.0)).unwrap_err();
        assert_eq!(err, FilterError::InvertedBand { min: 10.0, max: 5.0 });
    }

    #[test]
    fn corner_at_nyquist_is_rejected() {
        let err = apply_filter(&wf(vec![0.0; 100]), &FilterParams::lowpass(50.0, 0.0)).unwrap_err();
        assert!(matches!(err, FilterError::AboveNyquist { nyquist, .. } if nyquist == 50.0));
    }

    #[test]
    fn short_or_overtrimmed_channels_are_rejected() {
        assert!(matches!(
            apply_filter(&wf(vec![0.0; 4]), &FilterParams::highpass(1.0, 0.0)),
            Err(FilterError::TooShort { samples: 4, required: MIN_SAMPLES, .. })
        ));
        assert!(matches!(
            apply_filter(&wf(vec![0.0; 100]), &FilterParams::highpass(1.0, 1.0)),
            Err(FilterError::OffsetBeyondEnd { .. })
        ));
    }
}
