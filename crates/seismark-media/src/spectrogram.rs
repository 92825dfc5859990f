// crates/seismark-media/src/spectrogram.rs
//
// Display spectrogram of one channel: mean removed, 128-sample Hann segments
// overlapping by 115, each zero-padded to 1024 points. One-sided PSD
// (density scaling), square-rooted, DC row dropped.

use realfft::RealFftPlanner;
use tracing::warn;

use seismark_core::media_types::{Channel, Spectrogram};

pub const NFFT:     usize = 128;
pub const NOVERLAP: usize = 115;
pub const PAD_TO:   usize = 1024;

/// Symmetric Hann window (`0.5 − 0.5 cos(2πn / (M − 1))`).
fn hann(len: usize) -> Vec<f64> {
    let denom = (len.max(2) - 1) as f64;
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * n as f64 / denom).cos())
        .collect()
}

pub fn compute_spectrogram(channel: &Channel) -> Spectrogram {
    let n = channel.samples.len();
    let fs = channel.sampling_rate;
    if n == 0 || !(fs > 0.0) {
        return Spectrogram::default();
    }

    let mean = channel.samples.iter().sum::<f64>() / n as f64;
    let mut data: Vec<f64> = channel.samples.iter().map(|x| x - mean).collect();
    if data.len() < NFFT {
        data.resize(NFFT, 0.0);
    }

    let step = NFFT - NOVERLAP;
    let segments = (data.len() - NOVERLAP) / step;
    let window = hann(NFFT);
    let win_energy: f64 = window.iter().map(|w| w * w).sum();

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(PAD_TO);
    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();
    let bins = spectrum.len();

    // Row 0 (DC) is dropped.
    let freqs: Vec<f64> = (1..bins).map(|k| k as f64 * fs / PAD_TO as f64).collect();
    let mut times = Vec::with_capacity(segments);
    let mut power = Vec::with_capacity(segments * freqs.len());

    for seg in 0..segments {
        let start = seg * step;
        input.iter_mut().for_each(|v| *v = 0.0);
        for (i, (x, w)) in data[start..start + NFFT].iter().zip(&window).enumerate() {
            input[i] = x * w;
        }
        if let Err(e) = fft.process(&mut input, &mut spectrum) {
            warn!("[spectrogram] {}: FFT failed: {e}", channel.id);
            return Spectrogram::default();
        }

        times.push((start + NFFT / 2) as f64 / fs);
        for (k, c) in spectrum.iter().enumerate().skip(1) {
            // Nyquist is unpaired and (with an even PAD_TO) the last bin.
            let one_sided = if k == bins - 1 { 1.0 } else { 2.0 };
            let psd = one_sided * c.norm_sqr() / (fs * win_energy);
            power.push(psd.sqrt() as f32);
        }
    }

    Spectrogram { times, freqs, power }
}
