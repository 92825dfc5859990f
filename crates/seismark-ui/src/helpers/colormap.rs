// crates/seismark-ui/src/helpers/colormap.rs
//
// Spectrogram → texture. A 256-entry lookup table over a three-stop gradient
// (black, teal, yellow); values are scaled linearly between the matrix
// minimum and maximum.

use egui::ColorImage;
use seismark_core::media_types::Spectrogram;

const LUT_SIZE: usize = 256;

const STOPS: [(f32, [u8; 3]); 3] = [
    (0.0, [0, 0, 0]),
    (0.5, [33, 145, 140]),
    (1.0, [250, 230, 0]),
];

pub struct ColorLut {
    table: Vec<[u8; 3]>,
}

impl Default for ColorLut {
    fn default() -> Self {
        let table = (0..LUT_SIZE)
            .map(|i| gradient(i as f32 / (LUT_SIZE - 1) as f32))
            .collect();
        Self { table }
    }
}

fn gradient(t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let upper = STOPS.iter().position(|(pos, _)| *pos >= t).unwrap_or(STOPS.len() - 1).max(1);
    let (p0, c0) = STOPS[upper - 1];
    let (p1, c1) = STOPS[upper];
    let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f).round() as u8;
    [mix(c0[0], c1[0]), mix(c0[1], c1[1]), mix(c0[2], c1[2])]
}

impl ColorLut {
    /// Colour of `value` with `levels = (lo, hi)` mapped onto the gradient.
    pub fn lookup(&self, value: f32, (lo, hi): (f32, f32)) -> [u8; 3] {
        let range = hi - lo;
        if !(range > 0.0) {
            return self.table[0];
        }
        let t = ((value - lo) / range).clamp(0.0, 1.0);
        self.table[(t * (LUT_SIZE - 1) as f32) as usize]
    }

    /// One pixel per (time, frequency) bin; highest frequency on the top row.
    pub fn image(&self, sg: &Spectrogram) -> ColorImage {
        let (w, h) = (sg.times.len(), sg.freqs.len());
        if sg.is_empty() {
            return ColorImage::new([1, 1], egui::Color32::BLACK);
        }
        let levels = sg.levels();
        let mut rgb = Vec::with_capacity(w * h * 3);
        for row in 0..h {
            let f = h - 1 - row;
            for t in 0..w {
                rgb.extend_from_slice(&self.lookup(sg.value(t, f), levels));
            }
        }
        ColorImage::from_rgb([w, h], &rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_hits_its_stops() {
        assert_eq!(gradient(0.0), [0, 0, 0]);
        assert_eq!(gradient(0.5), [33, 145, 140]);
        assert_eq!(gradient(1.0), [250, 230, 0]);
        assert_eq!(gradient(2.0), [250, 230, 0]);
    }

    #[test]
    fn lookup_scales_between_levels() {
        let lut = ColorLut::default();
        assert_eq!(lut.lookup(1.0, (1.0, 3.0)), [0, 0, 0]);
        assert_eq!(lut.lookup(3.0, (1.0, 3.0)), [250, 230, 0]);
        assert_eq!(lut.lookup(5.0, (2.0, 2.0)), [0, 0, 0]);
    }

    #[test]
    fn image_puts_high_frequencies_on_top() {
        let sg = Spectrogram {
            times: vec![0.5, 1.0],
            freqs: vec![1.0, 2.0],
            power: vec![0.0, 1.0, 0.0, 1.0],
        };
        let img = ColorLut::default().image(&sg);
        assert_eq!(img.size, [2, 2]);
        assert_eq!(img.pixels[0], egui::Color32::from_rgb(250, 230, 0));
        assert_eq!(img.pixels[2], egui::Color32::from_rgb(0, 0, 0));
    }
}
