// crates/seismark-media/src/lib.rs
//
// No egui dependency. Decoding, DSP and the annotate/triage flow; the UI
// drives everything through Workbench.
//
// To add a new waveform format:
//   1. Create a module under decode/
//   2. Add its extension to scan::WAVEFORM_EXTENSIONS
//   3. Dispatch to it from decode::decode_file

pub mod cache;
pub mod decode;
pub mod error;
pub mod filter;
pub mod scan;
pub mod spectrogram;
pub mod sta_lta;
pub mod trigger;
pub mod workbench;

// Re-export the main public API so seismark-ui imports are simple.
pub use error::{DecodeError, LoadError, ScanError, WorkbenchError};
pub use trigger::TriggerReport;
pub use workbench::{Display, Workbench};
