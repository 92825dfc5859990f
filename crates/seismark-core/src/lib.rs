// crates/seismark-core/src/lib.rs
//
// Pure session data: no egui, no decoders, no runtime handles.
//
// Module map:
//   media_types    waveform / trace-group / spectrogram values shared with seismark-media
//   params         filter + trigger parameters and their validation
//   store          the data.csv side-store (load, migrate, backup, write-through)
//   markers        the per-group arrival-mark session
//   navigation     tri-state list filters and the visible ordered group list
//   state          SessionState + Preferences, the values the UI renders from
//   commands       every user action as a SessionCommand

pub mod commands;
pub mod error;
pub mod helpers;
pub mod markers;
pub mod media_types;
pub mod navigation;
pub mod params;
pub mod state;
pub mod store;

pub use error::{FilterError, StoreError, TriggerError};
