// crates/seismark-core/src/error.rs
//
// Error taxonomy shared by the core and seismark-media.
// Validation errors (Filter/Trigger) are raised before any session state is
// touched; StoreError is the persistence failure surfaced to the UI.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Minimum frequency is required for {0} filter")]
    MissingMinFreq(&'static str),

    #[error("Maximum frequency is required for {0} filter")]
    MissingMaxFreq(&'static str),

    #[error("Minimum frequency ({min} Hz) must be less than maximum frequency ({max} Hz) for bandpass filter")]
    InvertedBand { min: f64, max: f64 },

    #[error("Filter frequencies must be positive")]
    NonPositiveFrequency,

    #[error("{freq} Hz is at or above the Nyquist frequency ({nyquist} Hz) of {channel}")]
    AboveNyquist { channel: String, freq: f64, nyquist: f64 },

    #[error("Filter offset must not be negative")]
    NegativeOffset,

    #[error("Offset of {offset} s leaves no samples in {channel}")]
    OffsetBeyondEnd { channel: String, offset: f64 },

    #[error("{channel} has {samples} samples, at least {required} are needed to filter")]
    TooShort { channel: String, samples: usize, required: usize },

    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("No filter parameters have been set")]
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TriggerError {
    #[error("STA ({sta} s) must be less than LTA ({lta} s)")]
    WindowOrder { sta: f64, lta: f64 },

    #[error("STA and LTA windows must be positive")]
    NonPositiveWindow,

    #[error("Trigger threshold must be positive")]
    NonPositiveThreshold,

    #[error("STA window of {sta} s is shorter than one sample at {sampling_rate} Hz")]
    WindowTooShort { sta: f64, sampling_rate: f64 },

    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("No trigger parameters have been set")]
    NotConfigured,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("data_file path not set, open a data folder first")]
    NoStore,

    #[error("{}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Csv {
        path:   PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}, column {column}: cannot read {value:?}")]
    MalformedCell { row: usize, column: &'static str, value: String },

    #[error("{}: missing required column {column}", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{group}: cannot encode arrival frames: {source}")]
    Encode {
        group:  String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} is not in the annotation table")]
    UnknownGroup(String),

    #[error("{0} appears more than once in the annotation table")]
    DuplicateGroup(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv { path: path.into(), source }
    }
}
