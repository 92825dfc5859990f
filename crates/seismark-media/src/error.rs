// crates/seismark-media/src/error.rs

use std::path::PathBuf;

use seismark_core::error::{FilterError, StoreError, TriggerError};

/// A single waveform file could not be turned into channels.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("file ends after {have} bytes, {need} needed")]
    Truncated { have: usize, need: usize },

    #[error("bad header: {0}")]
    BadHeader(String),

    #[error("unsupported MiniSEED encoding {0}")]
    UnsupportedEncoding(u8),

    #[error("unrecognised waveform format (extension {0:?})")]
    UnsupportedFormat(String),

    #[error("not an evenly sampled time series")]
    NotEvenlySampled,
}

/// A trace group failed to load. Always names the group.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{group_key}: {}: {source}", path.display())]
    File {
        group_key: String,
        path:      PathBuf,
        #[source]
        source:    DecodeError,
    },

    #[error("{0}: no channels decoded")]
    EmptyGroup(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("{}: not a readable folder", .0.display())]
    NotAFolder(PathBuf),
}

/// Everything a Workbench operation can fail with. The UI renders the
/// `Display` text in a modal.
#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Trigger(#[from] TriggerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("open a data folder first")]
    NoFolder,

    #[error("no trace is selected")]
    NoActiveGroup,

    #[error("{0} is not part of the scanned folder")]
    UnknownGroup(String),
}
