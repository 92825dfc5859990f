// crates/seismark-media/src/decode/mod.rs
//
// Waveform files → Channels.
//
//   sac.rs    binary SAC, one channel per file
//   mseed.rs  MiniSEED 2, any number of channels per file
//
// `load_group` is the only entry the rest of the crate uses.

pub mod mseed;
pub mod sac;

use std::path::Path;

use tracing::{debug, warn};

use seismark_core::media_types::{Channel, TraceGroup, Waveform};

use crate::error::{DecodeError, LoadError};

/// Decode every component file of `group`, in discovery order, into one
/// Waveform. The first failing file aborts the load.
pub fn load_group(group: &TraceGroup) -> Result<Waveform, LoadError> {
    let mut channels = Vec::new();
    for path in &group.component_file_paths {
        let decoded = decode_file(path).map_err(|source| LoadError::File {
            group_key: group.group_key.clone(),
            path:      path.clone(),
            source,
        })?;
        debug!("[decode] {} → {} channel(s)", path.display(), decoded.len());
        channels.extend(decoded);
    }
    if channels.is_empty() {
        return Err(LoadError::EmptyGroup(group.group_key.clone()));
    }

    let waveform = Waveform { group_key: group.group_key.clone(), channels };
    if !waveform.has_true_vertical() {
        warn!("[decode] {}: no Z component, using {} as vertical",
            group.group_key, waveform.channels[0].id);
    }
    Ok(waveform)
}

pub fn decode_file(path: &Path) -> Result<Vec<Channel>, DecodeError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "sac" => {
            let bytes = std::fs::read(path)?;
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            Ok(vec![sac::parse(&bytes, stem)?])
        }
        "mseed" | "miniseed" => {
            let bytes = std::fs::read(path)?;
            mseed::parse(&bytes)
        }
        _ => Err(DecodeError::UnsupportedFormat(ext)),
    }
}

/// Headers often carry the rate in single precision (100 Hz stored as
/// 99.99999...). Snap to the integer when that close so frames convert exactly.
pub fn snap_rate(rate: f64) -> f64 {
    let nearest = rate.round();
    if nearest > 0.0 && ((rate - nearest) / nearest).abs() < 1e-6 { nearest } else { rate }
}

// ── Byte access ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ByteOrder {
    Little,
    Big,
}

/// Bounds-checked fixed-width reads in one byte order.
#[derive(Clone, Copy)]
pub(crate) struct Reader<'a> {
    pub data:  &'a [u8],
    pub order: ByteOrder,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, order }
    }

    pub fn bytes<const N: usize>(&self, at: usize) -> Result<[u8; N], DecodeError> {
        self.data
            .get(at..at + N)
            .and_then(|s| s.try_into().ok())
            .ok_or(DecodeError::Truncated { have: self.data.len(), need: at + N })
    }

    pub fn u8(&self, at: usize) -> Result<u8, DecodeError> {
        Ok(self.bytes::<1>(at)?[0])
    }

    pub fn u16(&self, at: usize) -> Result<u16, DecodeError> {
        let b = self.bytes(at)?;
        Ok(match self.order {
            ByteOrder::Little => u16::from_le_bytes(b),
            ByteOrder::Big    => u16::from_be_bytes(b),
        })
    }

    pub fn i16(&self, at: usize) -> Result<i16, DecodeError> {
        Ok(self.u16(at)? as i16)
    }

    pub fn u32(&self, at: usize) -> Result<u32, DecodeError> {
        let b = self.bytes(at)?;
        Ok(match self.order {
            ByteOrder::Little => u32::from_le_bytes(b),
            ByteOrder::Big    => u32::from_be_bytes(b),
        })
    }

    pub fn i32(&self, at: usize) -> Result<i32, DecodeError> {
        Ok(self.u32(at)? as i32)
    }

    pub fn f32(&self, at: usize) -> Result<f32, DecodeError> {
        Ok(f32::from_bits(self.u32(at)?))
    }

    pub fn f64(&self, at: usize) -> Result<f64, DecodeError> {
        let b = self.bytes(at)?;
        Ok(match self.order {
            ByteOrder::Little => f64::from_le_bytes(b),
            ByteOrder::Big    => f64::from_be_bytes(b),
        })
    }

    /// Fixed-width ASCII field, trailing spaces and NULs trimmed.
    pub fn ascii(&self, at: usize, len: usize) -> Result<String, DecodeError> {
        let raw = self
            .data
            .get(at..at + len)
            .ok_or(DecodeError::Truncated { have: self.data.len(), need: at + len })?;
        Ok(String::from_utf8_lossy(raw).trim_end_matches(|c: char| c == '\0' || c == ' ').trim_start().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_snap_only_when_close() {
        assert_eq!(snap_rate(99.999_999_4), 100.0);
        assert_eq!(snap_rate(40.0), 40.0);
        assert_eq!(snap_rate(0.1), 0.1);
        assert_eq!(snap_rate(19.95), 19.95);
    }

    #[test]
    fn reader_reports_truncation() {
        let r = Reader::new(&[1, 2, 3], ByteOrder::Big);
        assert_eq!(r.u16(0).unwrap(), 0x0102);
        assert!(matches!(r.u32(0), Err(DecodeError::Truncated { have: 3, need: 4 })));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.wav");
        std::fs::write(&p, b"RIFF").unwrap();
        assert!(matches!(decode_file(&p), Err(DecodeError::UnsupportedFormat(e)) if e == "wav"));
    }

    #[test]
    fn failing_component_names_group_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("XX.STA1..BHZ.sac");
        std::fs::write(&p, b"too short").unwrap();
        let group = TraceGroup { group_key: "eq001/STA1".into(), component_file_paths: vec![p] };
        let err = load_group(&group).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("eq001/STA1: "), "{text}");
        assert!(text.contains("XX.STA1..BHZ.sac"), "{text}");
    }

    #[test]
    fn group_without_files_is_empty() {
        let group = TraceGroup { group_key: "g".into(), component_file_paths: vec![] };
        assert!(matches!(load_group(&group), Err(LoadError::EmptyGroup(k)) if k == "g"));
    }
}
