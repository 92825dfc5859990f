// crates/seismark-core/src/params.rs
//
// Filter and trigger parameters. Validation here is structural only;
// per-channel checks (Nyquist, data length) happen in seismark-media where the
// waveform is known.

use serde::{Deserialize, Serialize};
use crate::error::{FilterError, TriggerError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    Bandpass,
    Highpass,
    Lowpass,
}

impl FilterKind {
    pub const ALL: [FilterKind; 3] = [FilterKind::Bandpass, FilterKind::Highpass, FilterKind::Lowpass];

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::Bandpass => "bandpass",
            FilterKind::Highpass => "highpass",
            FilterKind::Lowpass  => "lowpass",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub kind:           FilterKind,
    pub min_freq:       Option<f64>,
    pub max_freq:       Option<f64>,
    /// Seconds trimmed from the start of every filtered channel.
    #[serde(default)]
    pub offset_seconds: f64,
}

impl FilterParams {
    pub fn bandpass(min_freq: f64, max_freq: f64, offset_seconds: f64) -> Self {
        Self { kind: FilterKind::Bandpass, min_freq: Some(min_freq), max_freq: Some(max_freq), offset_seconds }
    }

    pub fn highpass(min_freq: f64, offset_seconds: f64) -> Self {
        Self { kind: FilterKind::Highpass, min_freq: Some(min_freq), max_freq: None, offset_seconds }
    }

    pub fn lowpass(max_freq: f64, offset_seconds: f64) -> Self {
        Self { kind: FilterKind::Lowpass, min_freq: None, max_freq: Some(max_freq), offset_seconds }
    }

    /// Build from the configuration dialog's text fields. Blank min/max mean
    /// "not given"; a blank offset means 0.
    pub fn from_inputs(kind: FilterKind, min: &str, max: &str, offset: &str) -> Result<Self, FilterError> {
        let params = Self {
            kind,
            min_freq:       parse_optional(min, "Min Freq").map_err(filter_nan)?,
            max_freq:       parse_optional(max, "Max Freq").map_err(filter_nan)?,
            offset_seconds: parse_optional(offset, "Offset").map_err(filter_nan)?.unwrap_or(0.0),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        let label = self.kind.label();
        match self.kind {
            FilterKind::Bandpass => {
                let min = self.min_freq.ok_or(FilterError::MissingMinFreq(label))?;
                let max = self.max_freq.ok_or(FilterError::MissingMaxFreq(label))?;
                if min <= 0.0 || max <= 0.0 {
                    return Err(FilterError::NonPositiveFrequency);
                }
                if min >= max {
                    return Err(FilterError::InvertedBand { min, max });
                }
            }
            FilterKind::Highpass => {
                let min = self.min_freq.ok_or(FilterError::MissingMinFreq(label))?;
                if min <= 0.0 {
                    return Err(FilterError::NonPositiveFrequency);
                }
            }
            FilterKind::Lowpass => {
                let max = self.max_freq.ok_or(FilterError::MissingMaxFreq(label))?;
                if max <= 0.0 {
                    return Err(FilterError::NonPositiveFrequency);
                }
            }
        }
        if !(self.offset_seconds >= 0.0) {
            return Err(FilterError::NegativeOffset);
        }
        Ok(())
    }

    /// Cutoffs actually used by the filter: (highpass corner, lowpass corner).
    pub fn corners(&self) -> (Option<f64>, Option<f64>) {
        match self.kind {
            FilterKind::Bandpass => (self.min_freq, self.max_freq),
            FilterKind::Highpass => (self.min_freq, None),
            FilterKind::Lowpass  => (None, self.max_freq),
        }
    }

    /// One-line summary for titles and status messages.
    pub fn describe(&self) -> String {
        let band = match self.corners() {
            (Some(lo), Some(hi)) => format!("{lo}–{hi} Hz"),
            (Some(lo), None)     => format!("> {lo} Hz"),
            (None, Some(hi))     => format!("< {hi} Hz"),
            (None, None)         => String::new(),
        };
        format!("{} {band}, offset {} s", self.kind.label(), self.offset_seconds)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerParams {
    pub sta_seconds: f64,
    pub lta_seconds: f64,
    pub threshold:   f64,
}

impl TriggerParams {
    pub fn new(sta_seconds: f64, lta_seconds: f64, threshold: f64) -> Self {
        Self { sta_seconds, lta_seconds, threshold }
    }

    /// Build from the configuration dialog's text fields; all three are required.
    pub fn from_inputs(sta: &str, lta: &str, threshold: &str) -> Result<Self, TriggerError> {
        let required = |text: &str, field: &'static str| -> Result<f64, TriggerError> {
            parse_optional(text, field)
                .map_err(trigger_nan)?
                .ok_or(TriggerError::InvalidNumber { field, value: String::new() })
        };
        let params = Self {
            sta_seconds: required(sta, "STA")?,
            lta_seconds: required(lta, "LTA")?,
            threshold:   required(threshold, "Threshold")?,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), TriggerError> {
        if !(self.sta_seconds > 0.0) || !(self.lta_seconds > 0.0) {
            return Err(TriggerError::NonPositiveWindow);
        }
        if self.sta_seconds >= self.lta_seconds {
            return Err(TriggerError::WindowOrder { sta: self.sta_seconds, lta: self.lta_seconds });
        }
        if !(self.threshold > 0.0) {
            return Err(TriggerError::NonPositiveThreshold);
        }
        Ok(())
    }

    /// (nsta, nlta) in samples, truncated as the classic detector expects.
    pub fn window_samples(&self, sampling_rate: f64) -> Result<(usize, usize), TriggerError> {
        self.validate()?;
        let nsta = (self.sta_seconds * sampling_rate) as usize;
        let nlta = (self.lta_seconds * sampling_rate) as usize;
        if nsta == 0 {
            return Err(TriggerError::WindowTooShort { sta: self.sta_seconds, sampling_rate });
        }
        Ok((nsta, nlta))
    }
}

// ── Text-field parsing ────────────────────────────────────────────────────────

struct NotANumber {
    field: &'static str,
    value: String,
}

fn parse_optional(text: &str, field: &'static str) -> Result<Option<f64>, NotANumber> {
    let t = text.trim();
    if t.is_empty() {
        return Ok(None);
    }
    t.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| NotANumber { field, value: t.to_string() })
}

fn filter_nan(e: NotANumber) -> FilterError {
    FilterError::InvalidNumber { field: e.field, value: e.value }
}

fn trigger_nan(e: NotANumber) -> TriggerError {
    TriggerError::InvalidNumber { field: e.field, value: e.value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_bandpass_is_rejected() {
        let err = FilterParams::bandpass(10.0, 5.0, 0.0).validate().unwrap_err();
        assert_eq!(err, FilterError::InvertedBand { min: 10.0, max: 5.0 });
    }

    #[test]
    fn equal_bandpass_corners_are_rejected() {
        assert!(matches!(
            FilterParams::bandpass(5.0, 5.0, 0.0).validate(),
            Err(FilterError::InvertedBand { .. })
        ));
    }

    #[test]
    fn highpass_requires_min_and_lowpass_requires_max() {
        let hp = FilterParams { kind: FilterKind::Highpass, min_freq: None, max_freq: Some(3.0), offset_seconds: 0.0 };
        assert_eq!(hp.validate(), Err(FilterError::MissingMinFreq("highpass")));
        let lp = FilterParams { kind: FilterKind::Lowpass, min_freq: Some(3.0), max_freq: None, offset_seconds: 0.0 };
        assert_eq!(lp.validate(), Err(FilterError::MissingMaxFreq("lowpass")));
        assert!(FilterParams::highpass(1.0, 0.0).validate().is_ok());
        assert!(FilterParams::lowpass(1.0, 0.0).validate().is_ok());
    }

    #[test]
    fn negative_offset_is_rejected() {
        assert_eq!(FilterParams::highpass(1.0, -0.5).validate(), Err(FilterError::NegativeOffset));
    }

    #[test]
    fn dialog_inputs_parse_blank_as_missing() {
        let p = FilterParams::from_inputs(FilterKind::Highpass, "2", "", "").unwrap();
        assert_eq!(p, FilterParams::highpass(2.0, 0.0));

        let err = FilterParams::from_inputs(FilterKind::Bandpass, "2", "", "1").unwrap_err();
        assert_eq!(err, FilterError::MissingMaxFreq("bandpass"));

        let err = FilterParams::from_inputs(FilterKind::Lowpass, "", "abc", "").unwrap_err();
        assert!(matches!(err, FilterError::InvalidNumber { field: "Max Freq", .. }));
    }

    #[test]
    fn corners_follow_kind() {
        let bp = FilterParams::bandpass(1.0, 8.0, 0.0);
        assert_eq!(bp.corners(), (Some(1.0), Some(8.0)));
        let hp = FilterParams { kind: FilterKind::Highpass, min_freq: Some(1.0), max_freq: Some(8.0), offset_seconds: 0.0 };
        assert_eq!(hp.corners(), (Some(1.0), None));
    }

    #[test]
    fn sta_not_less_than_lta_is_rejected() {
        let err = TriggerParams::new(5.0, 5.0, 3.0).validate().unwrap_err();
        assert_eq!(err, TriggerError::WindowOrder { sta: 5.0, lta: 5.0 });
        assert!(TriggerParams::new(6.0, 5.0, 3.0).validate().is_err());
        assert!(TriggerParams::new(1.0, 10.0, 3.0).validate().is_ok());
    }

    #[test]
    fn trigger_inputs_are_all_required() {
        assert!(TriggerParams::from_inputs("1", "10", "3.5").is_ok());
        assert!(matches!(
            TriggerParams::from_inputs("1", "", "3.5"),
            Err(TriggerError::InvalidNumber { field: "LTA", .. })
        ));
        assert_eq!(
            TriggerParams::from_inputs("5", "5", "2"),
            Err(TriggerError::WindowOrder { sta: 5.0, lta: 5.0 })
        );
    }

    #[test]
    fn window_samples_truncate() {
        let p = TriggerParams::new(0.5, 10.0, 3.0);
        assert_eq!(p.window_samples(100.0), Ok((50, 1000)));
        let tiny = TriggerParams::new(0.001, 10.0, 3.0);
        assert!(matches!(tiny.window_samples(100.0), Err(TriggerError::WindowTooShort { .. })));
    }
}
