// crates/seismark-media/src/decode/sac.rs
//
// Binary SAC, header version 6, evenly sampled time series only.
//
// Layout:
//   0..280    70 × f32   (DELTA = word 0)
//   280..440  40 × i32   (NVHDR = 6, NPTS = 9, IFTYPE = 15, LEVEN = 35)
//   440..632  character block, 8-byte fields (KEVNM is 16)
//   632..     NPTS × f32 samples
//
// Byte order is whichever makes NVHDR read as 6.

use seismark_core::media_types::Channel;

use super::{snap_rate, ByteOrder, Reader};
use crate::error::DecodeError;

const HEADER_LEN: usize = 632;
const INT_BASE:   usize = 280;
const CHAR_BASE:  usize = 440;

const W_DELTA:  usize = 0;
const I_NVHDR:  usize = 6;
const I_NPTS:   usize = 9;
const I_IFTYPE: usize = 15;
const I_LEVEN:  usize = 35;

const K_STNM:   usize = 0;
const K_HOLE:   usize = 24;
const K_CMPNM:  usize = 160;
const K_NETWK:  usize = 168;

const NVHDR:    i32 = 6;
const ITIME:    i32 = 1;
const UNDEFINED: &str = "-12345";

fn int_at(i: usize) -> usize {
    INT_BASE + 4 * i
}

fn detect_order(bytes: &[u8]) -> Result<ByteOrder, DecodeError> {
    for order in [ByteOrder::Little, ByteOrder::Big] {
        if Reader::new(bytes, order).i32(int_at(I_NVHDR))? == NVHDR {
            return Ok(order);
        }
    }
    Err(DecodeError::BadHeader("SAC header version is not 6 in either byte order".into()))
}

/// `stem` supplies the component code when the header leaves KCMPNM undefined.
pub fn parse(bytes: &[u8], stem: &str) -> Result<Channel, DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::Truncated { have: bytes.len(), need: HEADER_LEN });
    }
    let r = Reader::new(bytes, detect_order(bytes)?);

    if r.i32(int_at(I_IFTYPE))? != ITIME || r.i32(int_at(I_LEVEN))? != 1 {
        return Err(DecodeError::NotEvenlySampled);
    }
    let delta = r.f32(4 * W_DELTA)? as f64;
    if !(delta > 0.0) || !delta.is_finite() {
        return Err(DecodeError::BadHeader(format!("DELTA = {delta}")));
    }
    let npts = r.i32(int_at(I_NPTS))?;
    let npts = usize::try_from(npts).map_err(|_| DecodeError::BadHeader(format!("NPTS = {npts}")))?;
    let need = HEADER_LEN + 4 * npts;
    if bytes.len() < need {
        return Err(DecodeError::Truncated { have: bytes.len(), need });
    }

    let samples = (0..npts)
        .map(|i| r.f32(HEADER_LEN + 4 * i).map(f64::from))
        .collect::<Result<Vec<_>, _>>()?;

    let field = |offset: usize| -> Result<String, DecodeError> {
        let s = r.ascii(CHAR_BASE + offset, 8)?;
        Ok(if s == UNDEFINED { String::new() } else { s })
    };
    let mut cha = field(K_CMPNM)?;
    if cha.is_empty() {
        cha = stem.rsplit('.').next().unwrap_or_default().to_string();
    }
    let id = format!("{}.{}.{}.{}", field(K_NETWK)?, field(K_STNM)?, field(K_HOLE)?, cha);

    Ok(Channel::new(id, snap_rate(1.0 / delta), samples))
}

/// Minimal SAC writer for fixtures.
#[cfg(test)]
pub(crate) fn encode(
    network: &str,
    station: &str,
    component: &str,
    delta: f32,
    samples: &[f32],
    big_endian: bool,
) -> Vec<u8> {
    let f32b = |v: f32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let i32b = |v: i32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };

    let mut out = Vec::with_capacity(HEADER_LEN + 4 * samples.len());
    for w in 0..70 {
        out.extend_from_slice(&f32b(if w == W_DELTA { delta } else { -12345.0 }));
    }
    for i in 0..40 {
        let v = match i {
            I_NVHDR  => NVHDR,
            I_NPTS   => samples.len() as i32,
            I_IFTYPE => ITIME,
            I_LEVEN  => 1,
            _        => -12345,
        };
        out.extend_from_slice(&i32b(v));
    }
    let mut chars = [b' '; HEADER_LEN - CHAR_BASE];
    for slot in (0..chars.len()).step_by(8) {
        chars[slot..slot + 6].copy_from_slice(UNDEFINED.as_bytes());
    }
    let mut put = |offset: usize, text: &str| {
        let mut field = [b' '; 8];
        field[..text.len()].copy_from_slice(text.as_bytes());
        chars[offset..offset + 8].copy_from_slice(&field);
    };
    put(K_STNM, station);
    put(K_HOLE, "");
    put(K_NETWK, network);
    if !component.is_empty() {
        put(K_CMPNM, component);
    }
    out.extend_from_slice(&chars);
    for &s in samples {
        out.extend_from_slice(&f32b(s));
    }
    out
}
