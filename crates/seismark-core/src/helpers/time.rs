// crates/seismark-core/src/helpers/time.rs
//
// Frame <-> display-time conversion and human-readable timestamps.
//
// Display time is seconds from the start of the *displayed* channel. When a
// filter is active its offset has been trimmed off the front, so display time
// 0 sits `offset_seconds` into the recording. Persisted marks are frame indices
// into the untrimmed recording, which keeps them valid whichever filter is on.

/// Convert a displayed mark time to a persisted frame index.
///
/// `frame = round(t · rate) + round(offset · rate)`, clamped at 0.
///
/// ```
/// use seismark_core::helpers::time::time_to_frame;
/// assert_eq!(time_to_frame(2.0, 100.0, 0.0), 200);
/// assert_eq!(time_to_frame(3.0, 100.0, 1.0), 400);
/// assert_eq!(time_to_frame(-0.5, 100.0, 0.0), 0);
/// ```
pub fn time_to_frame(time_seconds: f64, sampling_rate: f64, offset_seconds: f64) -> u64 {
    let frame = (time_seconds * sampling_rate).round() + (offset_seconds * sampling_rate).round();
    if frame.is_finite() && frame > 0.0 { frame as u64 } else { 0 }
}

/// Convert a persisted frame index back to displayed time. Exact inverse of
/// [`time_to_frame`] whenever the time is a whole sample. The offset is
/// rounded the same way the filter trims it, so display time 0 is always the
/// first retained sample.
///
/// ```
/// use seismark_core::helpers::time::frame_to_time;
/// assert_eq!(frame_to_time(500, 100.0, 0.0), 5.0);
/// assert_eq!(frame_to_time(400, 100.0, 1.0), 3.0);
/// ```
pub fn frame_to_time(frame: u64, sampling_rate: f64, offset_seconds: f64) -> f64 {
    let offset_frames = (offset_seconds * sampling_rate).round();
    (frame as f64 - offset_frames) / sampling_rate
}

/// Format a mark time as seconds with millisecond precision.
///
/// Used on marker labels and the status bar.
///
/// ```
/// use seismark_core::helpers::time::format_time;
/// assert_eq!(format_time(0.0),     "0.000 s");
/// assert_eq!(format_time(12.3456), "12.346 s");
/// ```
pub fn format_time(s: f64) -> String {
    format!("{s:.3} s")
}

/// Format a channel length as a compact human-readable string.
///
/// | Range         | Format       | Example   |
/// |---------------|--------------|-----------|
/// | ≥ 3600 s      | `H:MM:SS`    | `1:04:35` |
/// | ≥ 60 s        | `M:SS`       | `3:07`    |
/// | < 60 s        | `S.Xs`       | `4.2s`    |
///
/// ```
/// use seismark_core::helpers::time::format_duration;
/// assert_eq!(format_duration(4.2),    "4.2s");
/// assert_eq!(format_duration(187.0),  "3:07");
/// assert_eq!(format_duration(3875.0), "1:04:35");
/// ```
pub fn format_duration(secs: f64) -> String {
    if secs >= 3600.0 {
        format!(
            "{}:{:02}:{:02}",
            secs as u64 / 3600,
            (secs as u64 % 3600) / 60,
            secs as u64 % 60,
        )
    } else if secs >= 60.0 {
        format!("{}:{:02}", secs as u64 / 60, secs as u64 % 60)
    } else {
        format!("{secs:.1}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_within_one_sample_without_offset() {
        for &rate in &[20.0, 40.0, 100.0, 200.0] {
            for i in 0..500 {
                let t = i as f64 * 0.0137;
                let back = frame_to_time(time_to_frame(t, rate, 0.0), rate, 0.0);
                assert!((back - t).abs() <= 1.0 / rate, "t={t} rate={rate} back={back}");
            }
        }
    }

    #[test]
    fn round_trip_is_exact_on_sample_grid_with_offset() {
        let rate = 100.0;
        for k in 0..300u64 {
            for o in [0.0, 0.5, 1.0, 2.37] {
                let t = k as f64 / rate;
                let back = frame_to_time(time_to_frame(t, rate, o), rate, o);
                assert_eq!(back, t, "k={k} o={o}");
            }
        }
    }

    #[test]
    fn round_trip_with_offset_is_bounded_off_grid() {
        let rate = 50.0;
        let o = 0.733;
        for i in 0..200 {
            let t = i as f64 * 0.0291;
            let back = frame_to_time(time_to_frame(t, rate, o), rate, o);
            assert!((back - t).abs() <= 1.0 / rate);
        }
    }

    #[test]
    fn filtered_offset_scenario() {
        assert_eq!(time_to_frame(3.0, 100.0, 1.0), 400);
        assert_eq!(frame_to_time(400, 100.0, 1.0), 3.0);
    }
}
