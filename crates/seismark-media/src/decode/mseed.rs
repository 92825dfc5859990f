// crates/seismark-media/src/decode/mseed.rs
//
// MiniSEED 2 data records.
//
//   0..48   fixed header (station 8, location 13, channel 15, network 18,
//           BTIME 20, nsamp 30, rate factor 32, rate multiplier 34,
//           data offset 44, first blockette 46)
//   48..    blockettes; 1000 is required (encoding, word order, 2^n length)
//   data    at the data offset, to the end of the record
//
// Header byte order is taken from the BTIME year; data byte order from
// blockette 1000. Records of the same NET.STA.LOC.CHA are concatenated in
// file order.

use tracing::debug;

use seismark_core::media_types::Channel;

use super::{snap_rate, ByteOrder, Reader};
use crate::error::DecodeError;

const FIXED_HEADER: usize = 48;
const STEIM_FRAME:  usize = 64;
const MAX_BLOCKETTES: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Encoding {
    Int16,
    Int32,
    Float32,
    Float64,
    Steim1,
    Steim2,
}

impl Encoding {
    fn from_code(code: u8) -> Result<Self, DecodeError> {
        Ok(match code {
            1  => Encoding::Int16,
            3  => Encoding::Int32,
            4  => Encoding::Float32,
            5  => Encoding::Float64,
            10 => Encoding::Steim1,
            11 => Encoding::Steim2,
            other => return Err(DecodeError::UnsupportedEncoding(other)),
        })
    }
}

struct Record {
    id:            String,
    sampling_rate: f64,
    samples:       Vec<f64>,
    length:        usize,
}

pub fn parse(bytes: &[u8]) -> Result<Vec<Channel>, DecodeError> {
    let mut channels: Vec<Channel> = Vec::new();
    let mut at = 0;
    while at + FIXED_HEADER <= bytes.len() {
        let record = read_record(&bytes[at..])?;
        at += record.length;
        if record.samples.is_empty() {
            continue;
        }

        match channels.iter_mut().find(|c| c.id == record.id) {
            Some(ch) => {
                if ch.sampling_rate != record.sampling_rate {
                    return Err(DecodeError::BadHeader(format!(
                        "{}: sampling rate changes from {} to {} Hz",
                        record.id, ch.sampling_rate, record.sampling_rate
                    )));
                }
                ch.samples.extend(record.samples);
            }
            None => channels.push(Channel::new(record.id, record.sampling_rate, record.samples)),
        }
    }
    if channels.is_empty() {
        return Err(DecodeError::BadHeader("no data records".into()));
    }
    Ok(channels)
}

fn header_order(rec: &[u8]) -> Result<ByteOrder, DecodeError> {
    let year = Reader::new(rec, ByteOrder::Big).u16(20)?;
    Ok(if (1900..=2100).contains(&year) { ByteOrder::Big } else { ByteOrder::Little })
}

fn read_record(rec: &[u8]) -> Result<Record, DecodeError> {
    let h = Reader::new(rec, header_order(rec)?);

    let quality = h.u8(6)?;
    if !matches!(quality, b'D' | b'R' | b'Q' | b'M') {
        return Err(DecodeError::BadHeader(format!("record quality indicator {:?}", quality as char)));
    }

    let station  = h.ascii(8, 5)?;
    let location = h.ascii(13, 2)?;
    let channel  = h.ascii(15, 3)?;
    let network  = h.ascii(18, 2)?;
    let nsamp    = h.u16(30)? as usize;
    let factor   = h.i16(32)?;
    let mult     = h.i16(34)?;
    let data_off = h.u16(44)? as usize;
    let first_bl = h.u16(46)? as usize;

    // Blockette 1000
    let mut next = first_bl;
    let mut b1000 = None;
    for _ in 0..MAX_BLOCKETTES {
        if next == 0 {
            break;
        }
        let kind = h.u16(next)?;
        if kind == 1000 {
            b1000 = Some((h.u8(next + 4)?, h.u8(next + 5)?, h.u8(next + 6)?));
            break;
        }
        next = h.u16(next + 2)? as usize;
    }
    let (encoding, word_order, exponent) =
        b1000.ok_or_else(|| DecodeError::BadHeader("blockette 1000 missing".into()))?;

    if !(7..=20).contains(&exponent) {
        return Err(DecodeError::BadHeader(format!("record length 2^{exponent}")));
    }
    let length = 1usize << exponent;
    if rec.len() < length {
        return Err(DecodeError::Truncated { have: rec.len(), need: length });
    }

    let id = format!("{network}.{station}.{location}.{channel}");
    let sampling_rate = snap_rate(rate(factor, mult));
    if nsamp > 0 && !(sampling_rate > 0.0) {
        return Err(DecodeError::NotEvenlySampled);
    }
    if data_off < FIXED_HEADER || data_off > length {
        return Err(DecodeError::BadHeader(format!("data offset {data_off}")));
    }

    let data_order = if word_order == 0 { ByteOrder::Little } else { ByteOrder::Big };
    let data = Reader::new(&rec[data_off..length], data_order);
    let samples = match Encoding::from_code(encoding)? {
        Encoding::Int16   => (0..nsamp).map(|i| data.i16(2 * i).map(f64::from)).collect::<Result<Vec<_>, _>>()?,
        Encoding::Int32   => (0..nsamp).map(|i| data.i32(4 * i).map(f64::from)).collect::<Result<Vec<_>, _>>()?,
        Encoding::Float32 => (0..nsamp).map(|i| data.f32(4 * i).map(f64::from)).collect::<Result<Vec<_>, _>>()?,
        Encoding::Float64 => (0..nsamp).map(|i| data.f64(8 * i)).collect::<Result<Vec<_>, _>>()?,
        Encoding::Steim1  => steim(&data, nsamp, unpack_steim1)?,
        Encoding::Steim2  => steim(&data, nsamp, unpack_steim2)?,
    };
    debug!("[decode] mseed record {id}: {nsamp} samples, encoding {encoding}, {length} bytes");

    Ok(Record { id, sampling_rate, samples, length })
}

/// SEED sample rate from factor and multiplier.
fn rate(factor: i16, mult: i16) -> f64 {
    let (f, m) = (f64::from(factor), f64::from(if mult == 0 { 1 } else { mult }));
    match (factor > 0, m > 0.0) {
        _ if factor == 0 => 0.0,
        (true, true)   => f * m,
        (true, false)  => -f / m,
        (false, true)  => -m / f,
        (false, false) => 1.0 / (f * m),
    }
}

// ── Steim compression ─────────────────────────────────────────────────────────

fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// Differences packed in one data word, by its 2-bit control code.
fn unpack_steim1(code: u32, word: u32, out: &mut Vec<i32>) -> Result<(), DecodeError> {
    match code {
        0 => {}
        1 => out.extend((0..4).rev().map(|k| sign_extend((word >> (8 * k)) & 0xff, 8))),
        2 => out.extend((0..2).rev().map(|k| sign_extend((word >> (16 * k)) & 0xffff, 16))),
        _ => out.push(word as i32),
    }
    Ok(())
}

fn unpack_steim2(code: u32, word: u32, out: &mut Vec<i32>) -> Result<(), DecodeError> {
    let dnib = word >> 30;
    let (count, bits) = match (code, dnib) {
        (0, _) => return Ok(()),
        (1, _) => (4, 8),
        (2, 1) => (1, 30),
        (2, 2) => (2, 15),
        (2, 3) => (3, 10),
        (3, 0) => (5, 6),
        (3, 1) => (6, 5),
        (3, 2) => (7, 4),
        _ => return Err(DecodeError::BadHeader(format!("Steim-2 code {code}/{dnib}"))),
    };
    let mask = (1u32 << bits) - 1;
    out.extend((0..count).rev().map(|k| sign_extend((word >> (bits * k)) & mask, bits)));
    Ok(())
}

/// Integrate Steim differences. The first difference belongs to the previous
/// record and is skipped; X0 from frame 0 seeds the integration.
fn steim(
    data: &Reader<'_>,
    nsamp: usize,
    unpack: fn(u32, u32, &mut Vec<i32>) -> Result<(), DecodeError>,
) -> Result<Vec<f64>, DecodeError> {
    if nsamp == 0 {
        return Ok(Vec::new());
    }
    let frames = data.data.len() / STEIM_FRAME;
    let mut diffs: Vec<i32> = Vec::with_capacity(nsamp);
    let mut x0 = None;

    'frames: for f in 0..frames {
        let base = f * STEIM_FRAME;
        let control = data.u32(base)?;
        for w in 1..16 {
            let word = data.u32(base + 4 * w)?;
            if f == 0 && w <= 2 {
                if w == 1 {
                    x0 = Some(word as i32);
                }
                continue;
            }
            let code = (control >> (30 - 2 * w as u32)) & 0b11;
            unpack(code, word, &mut diffs)?;
            if diffs.len() >= nsamp {
                break 'frames;
            }
        }
    }

    let x0 = x0.ok_or(DecodeError::Truncated { have: data.data.len(), need: STEIM_FRAME })?;
    if diffs.len() < nsamp {
        return Err(DecodeError::BadHeader(format!("Steim data holds {} of {nsamp} samples", diffs.len())));
    }
    let mut samples = Vec::with_capacity(nsamp);
    let mut current = x0;
    samples.push(f64::from(current));
    for &d in &diffs[1..nsamp] {
        current = current.wrapping_add(d);
        samples.push(f64::from(current));
    }
    Ok(samples)
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// One 512-byte big-endian record with the given encoding and raw data bytes.
#[cfg(test)]
pub(crate) fn encode_record(
    station: &str,
    channel: &str,
    rate_factor: i16,
    nsamp: u16,
    encoding: u8,
    data: &[u8],
) -> Vec<u8> {
    let mut rec = vec![0u8; 512];
    rec[0..6].copy_from_slice(b"000001");
    rec[6] = b'D';
    rec[7] = b' ';
    let mut text = |at: usize, len: usize, s: &str| {
        let mut field = vec![b' '; len];
        field[..s.len()].copy_from_slice(s.as_bytes());
        rec[at..at + len].copy_from_slice(&field);
    };
    text(8, 5, station);
    text(13, 2, "00");
    text(15, 3, channel);
    text(18, 2, "XX");
    rec[20..22].copy_from_slice(&2024u16.to_be_bytes());
    rec[22..24].copy_from_slice(&100u16.to_be_bytes());
    rec[30..32].copy_from_slice(&nsamp.to_be_bytes());
    rec[32..34].copy_from_slice(&rate_factor.to_be_bytes());
    rec[34..36].copy_from_slice(&1i16.to_be_bytes());
    rec[39] = 1;
    rec[44..46].copy_from_slice(&64u16.to_be_bytes());
    rec[46..48].copy_from_slice(&48u16.to_be_bytes());
    // blockette 1000
    rec[48..50].copy_from_slice(&1000u16.to_be_bytes());
    rec[50..52].copy_from_slice(&0u16.to_be_bytes());
    rec[52] = encoding;
    rec[53] = 1;
    rec[54] = 9;
    rec[64..64 + data.len()].copy_from_slice(data);
    rec
}

#[cfg(test)]
mod tests {
    use super::*;

    fn be_words(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    fn int32_record(station: &str, channel: &str, samples: &[i32]) -> Vec<u8> {
        let data: Vec<u8> = samples.iter().flat_map(|s| s.to_be_bytes()).collect();
        encode_record(station, channel, 100, samples.len() as u16, 3, &data)
    }

    #[test]
    fn int32_records_concatenate_per_channel() {
        let mut file = int32_record("STA1", "BHZ", &[1, 2, 3]);
        file.extend(int32_record("STA1", "BHN", &[7, 8]));
        file.extend(int32_record("STA1", "BHZ", &[4, 5]));

        let chans = parse(&file).unwrap();
        assert_eq!(chans.len(), 2);
        assert_eq!(chans[0].id, "XX.STA1.00.BHZ");
        assert_eq!(chans[0].samples, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(chans[0].sampling_rate, 100.0);
        assert_eq!(chans[1].samples, vec![7.0, 8.0]);
    }

    #[test]
    fn int16_and_float_encodings() {
        let data: Vec<u8> = [-3i16, 4].iter().flat_map(|s| s.to_be_bytes()).collect();
        let chans = parse(&encode_record("S", "HHZ", 40, 2, 1, &data)).unwrap();
        assert_eq!(chans[0].samples, vec![-3.0, 4.0]);

        let data: Vec<u8> = [0.5f32, -1.25].iter().flat_map(|s| s.to_be_bytes()).collect();
        let chans = parse(&encode_record("S", "HHZ", 40, 2, 4, &data)).unwrap();
        assert_eq!(chans[0].samples, vec![0.5, -1.25]);

        let data: Vec<u8> = [2.0f64].iter().flat_map(|s| s.to_be_bytes()).collect();
        assert_eq!(parse(&encode_record("S", "HHZ", 40, 1, 5, &data)).unwrap()[0].samples, vec![2.0]);
    }

    #[test]
    fn steim1_frame_integrates_differences() {
        // samples 10 12 9 9 20 21 19; first difference belongs to the previous record
        let control = (1 << 24) | (1 << 22);
        let w3 = u32::from_be_bytes([0, 2, (-3i8) as u8, 0]);
        let w4 = u32::from_be_bytes([11, 1, (-2i8) as u8, 0]);
        let mut words = vec![control, 10, 19, w3, w4];
        words.resize(16, 0);
        let chans = parse(&encode_record("S", "BHZ", 100, 7, 10, &be_words(&words))).unwrap();
        assert_eq!(chans[0].samples, vec![10.0, 12.0, 9.0, 9.0, 20.0, 21.0, 19.0]);
    }

    #[test]
    fn steim2_word_layouts() {
        let mut out = Vec::new();
        // dnib 10: two 15-bit values, -1 and 300
        let word = (0b10 << 30) | ((0x7fff & (-1i32 as u32)) << 15) | 300;
        unpack_steim2(2, word, &mut out).unwrap();
        assert_eq!(out, vec![-1, 300]);

        out.clear();
        // dnib 00: five 6-bit values 1 -2 3 -4 5
        let vals = [1i32, -2, 3, -4, 5];
        let word = vals.iter().fold(0u32, |acc, &v| (acc << 6) | (v as u32 & 0x3f));
        unpack_steim2(3, word, &mut out).unwrap();
        assert_eq!(out, vals.to_vec());

        assert!(unpack_steim2(3, 0b11 << 30, &mut out).is_err());
    }

    #[test]
    fn missing_blockette_1000_is_bad_header() {
        let mut rec = int32_record("S", "BHZ", &[1]);
        rec[48..50].copy_from_slice(&100u16.to_be_bytes());
        assert!(matches!(parse(&rec), Err(DecodeError::BadHeader(_))));
    }

    #[test]
    fn unknown_encoding_is_reported() {
        let rec = encode_record("S", "BHZ", 100, 1, 30, &[0; 4]);
        assert!(matches!(parse(&rec), Err(DecodeError::UnsupportedEncoding(30))));
    }

    #[test]
    fn rate_factor_and_multiplier() {
        assert_eq!(rate(100, 1), 100.0);
        assert_eq!(rate(1, -10), 0.1);
        assert_eq!(rate(-10, 1), 0.1);
        assert_eq!(rate(-10, -10), 0.01);
        assert_eq!(rate(0, 1), 0.0);
    }
}
