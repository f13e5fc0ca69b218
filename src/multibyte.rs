//! Unicode family codecs: UTF-8, UTF-16 and UTF-32 to and from code units
//!
//! Code units are UTF-16 values with astral characters stored as surrogate
//! pairs. Decoders are lenient: a truncated trailing sequence ends the output
//! and malformed input never fails the conversion.

use crate::detection;
use crate::options::{BomPolicy, FallbackPolicy};

const BOM_UTF16BE: [u8; 2] = [0xFE, 0xFF];
const BOM_UTF16LE: [u8; 2] = [0xFF, 0xFE];
const BOM_UTF32BE: [u8; 4] = [0x00, 0x00, 0xFE, 0xFF];
const BOM_UTF32LE: [u8; 4] = [0xFF, 0xFE, 0x00, 0x00];

const REPLACEMENT: u32 = b'?' as u32;

/// Iterator over the scalar values of a UTF-8 buffer.
///
/// A stray continuation byte yields `?`. Iteration stops at a sequence cut
/// short by the end of input.
pub struct Utf8Scalars<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Utf8Scalars<'a> {
    /// Decode `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn continuation(&self, offset: usize) -> u32 {
        u32::from(self.data[self.pos + offset] & 0x3F)
    }
}

impl Iterator for Utf8Scalars<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let lead = *self.data.get(self.pos)?;
        let width = match lead >> 4 {
            0..=7 => 1,
            12 | 13 => 2,
            14 => 3,
            15 => 4,
            _ => {
                self.pos += 1;
                return Some(REPLACEMENT);
            }
        };
        if self.pos + width > self.data.len() {
            self.pos = self.data.len();
            return None;
        }

        let lead = u32::from(lead);
        let code = match width {
            1 => lead,
            2 => ((lead & 0x1F) << 6) | self.continuation(1),
            3 => ((lead & 0x0F) << 12) | (self.continuation(1) << 6) | self.continuation(2),
            _ => {
                ((lead & 0x07) << 18)
                    | (self.continuation(1) << 12)
                    | (self.continuation(2) << 6)
                    | self.continuation(3)
            }
        };
        self.pos += width;
        Some(code)
    }
}

/// Iterator over the scalar values of a code unit buffer.
///
/// A high surrogate followed by a low surrogate is combined; any other
/// surrogate is yielded unchanged.
pub fn unit_scalars(units: &[u16]) -> impl Iterator<Item = u32> + '_ {
    let mut i = 0;
    std::iter::from_fn(move || {
        let c = u32::from(*units.get(i)?);
        i += 1;
        if (0xD800..=0xDBFF).contains(&c)
            && let Some(&next) = units.get(i)
            && (0xDC00..=0xDFFF).contains(&next)
        {
            i += 1;
            return Some(0x10000 + ((c - 0xD800) << 10) + (u32::from(next) - 0xDC00));
        }
        Some(c)
    })
}

/// Append `code_point` to `out` as UTF-16 code units
#[inline]
pub fn push_scalar(code_point: u32, out: &mut Vec<u16>) {
    match code_point {
        0..=0xFFFF => out.push(code_point as u16),
        0x10000..=0x10FFFF => {
            let c = code_point - 0x10000;
            out.push((0xD800 + (c >> 10)) as u16);
            out.push((0xDC00 + (c & 0x3FF)) as u16);
        }
        _ => out.push(REPLACEMENT as u16),
    }
}

/// Append `code_point` to `out` as UTF-8. Surrogates encode as three bytes.
#[inline]
pub fn push_utf8(code_point: u32, out: &mut Vec<u8>) {
    let c = code_point;
    if c < 0x80 {
        out.push(c as u8);
    } else if c < 0x800 {
        out.extend_from_slice(&[0xC0 | (c >> 6) as u8, 0x80 | (c & 0x3F) as u8]);
    } else if c < 0x10000 {
        out.extend_from_slice(&[
            0xE0 | (c >> 12) as u8,
            0x80 | ((c >> 6) & 0x3F) as u8,
            0x80 | (c & 0x3F) as u8,
        ]);
    } else {
        out.extend_from_slice(&[
            0xF0 | ((c >> 18) & 0x07) as u8,
            0x80 | ((c >> 12) & 0x3F) as u8,
            0x80 | ((c >> 6) & 0x3F) as u8,
            0x80 | (c & 0x3F) as u8,
        ]);
    }
}

/// Decode UTF-8 into code units
pub fn utf8_to_units(data: &[u8]) -> Vec<u16> {
    let mut units = Vec::with_capacity(data.len());
    for code_point in Utf8Scalars::new(data) {
        push_scalar(code_point, &mut units);
    }
    units
}

/// Encode code units as UTF-8
pub fn units_to_utf8(units: &[u16]) -> Vec<u8> {
    let mut output = Vec::with_capacity(units.len() * 3);
    for code_point in unit_scalars(units) {
        push_utf8(code_point, &mut output);
    }
    output
}

/// Encode code units as ASCII, passing non-ASCII characters to `fallback`
pub fn units_to_ascii(units: &[u16], fallback: FallbackPolicy) -> Vec<u8> {
    let mut output = Vec::with_capacity(units.len());
    for code_point in unit_scalars(units) {
        if code_point < 0x80 {
            output.push(code_point as u8);
        } else {
            fallback.write(code_point, &mut output);
        }
    }
    output
}

fn bom_len16(data: &[u8]) -> usize {
    if data.starts_with(&BOM_UTF16BE) || data.starts_with(&BOM_UTF16LE) {
        2
    } else {
        0
    }
}

fn bom_len32(data: &[u8]) -> usize {
    if data.starts_with(&BOM_UTF32BE) || data.starts_with(&BOM_UTF32LE) {
        4
    } else {
        0
    }
}

/// Encode code units as big-endian UTF-16 without a mark
pub fn units_to_utf16be(units: &[u16]) -> Vec<u8> {
    units.iter().flat_map(|u| u.to_be_bytes()).collect()
}

/// Encode code units as little-endian UTF-16 without a mark
pub fn units_to_utf16le(units: &[u16]) -> Vec<u8> {
    units.iter().flat_map(|u| u.to_le_bytes()).collect()
}

/// Encode code units as UTF-16: big-endian unless `bom` asks for a mark
pub fn units_to_utf16(units: &[u16], bom: BomPolicy) -> Vec<u8> {
    let mut output = Vec::with_capacity(units.len() * 2 + 2);
    match bom {
        BomPolicy::None => output.extend(units.iter().flat_map(|u| u.to_be_bytes())),
        BomPolicy::BigEndian => {
            output.extend_from_slice(&BOM_UTF16BE);
            output.extend(units.iter().flat_map(|u| u.to_be_bytes()));
        }
        BomPolicy::LittleEndian => {
            output.extend_from_slice(&BOM_UTF16LE);
            output.extend(units.iter().flat_map(|u| u.to_le_bytes()));
        }
    }
    output
}

fn decode16(data: &[u8], little_endian: bool) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            }
        })
        .collect()
}

/// Decode big-endian UTF-16, skipping a leading mark of either order
pub fn utf16be_to_units(data: &[u8]) -> Vec<u16> {
    decode16(&data[bom_len16(data)..], false)
}

/// Decode little-endian UTF-16, skipping a leading mark of either order
pub fn utf16le_to_units(data: &[u8]) -> Vec<u16> {
    decode16(&data[bom_len16(data)..], true)
}

/// Byte order of unlabelled UTF-16 and the length of its mark.
fn utf16_order(data: &[u8]) -> (bool, usize) {
    if data.starts_with(&BOM_UTF16BE) {
        (false, 2)
    } else if data.starts_with(&BOM_UTF16LE) {
        (true, 2)
    } else {
        (detection::is_utf16le(data), 0)
    }
}

/// Decode UTF-16 of either order, from its mark or the zero-byte heuristic
pub fn utf16_to_units(data: &[u8]) -> Vec<u16> {
    let (little_endian, skip) = utf16_order(data);
    decode16(&data[skip..], little_endian)
}

fn swap_pairs(data: &[u8], swap: bool) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    for pair in data.chunks_exact(2) {
        if swap {
            output.extend_from_slice(&[pair[1], pair[0]]);
        } else {
            output.extend_from_slice(pair);
        }
    }
    output
}

/// Re-encode UTF-16 of either order as big-endian, dropping the mark
pub fn utf16_to_utf16be(data: &[u8]) -> Vec<u8> {
    let (little_endian, skip) = utf16_order(data);
    swap_pairs(&data[skip..], little_endian)
}

/// Re-encode UTF-16 of either order as little-endian, dropping the mark
pub fn utf16_to_utf16le(data: &[u8]) -> Vec<u8> {
    let (little_endian, skip) = utf16_order(data);
    swap_pairs(&data[skip..], !little_endian)
}

fn labelled_to_utf16(data: &[u8], source_le: bool, bom: BomPolicy) -> Vec<u8> {
    let body = &data[bom_len16(data)..];
    let mut output = Vec::with_capacity(body.len() + 2);
    match bom {
        BomPolicy::None => {}
        BomPolicy::BigEndian => output.extend_from_slice(&BOM_UTF16BE),
        BomPolicy::LittleEndian => output.extend_from_slice(&BOM_UTF16LE),
    }
    output.extend(swap_pairs(body, source_le != bom.is_little_endian()));
    output
}

/// Re-encode big-endian UTF-16 as UTF-16 under `bom`
pub fn utf16be_to_utf16(data: &[u8], bom: BomPolicy) -> Vec<u8> {
    labelled_to_utf16(data, false, bom)
}

/// Re-encode little-endian UTF-16 as UTF-16 under `bom`
pub fn utf16le_to_utf16(data: &[u8], bom: BomPolicy) -> Vec<u8> {
    labelled_to_utf16(data, true, bom)
}

/// Swap the byte order of labelled UTF-16, dropping any mark
pub fn swap_utf16(data: &[u8]) -> Vec<u8> {
    swap_pairs(&data[bom_len16(data)..], true)
}

fn encode32(units: &[u16], little_endian: bool, output: &mut Vec<u8>) {
    for code_point in unit_scalars(units) {
        if little_endian {
            output.extend_from_slice(&code_point.to_le_bytes());
        } else {
            output.extend_from_slice(&code_point.to_be_bytes());
        }
    }
}

/// Encode code units as big-endian UTF-32 without a mark
pub fn units_to_utf32be(units: &[u16]) -> Vec<u8> {
    let mut output = Vec::with_capacity(units.len() * 4);
    encode32(units, false, &mut output);
    output
}

/// Encode code units as little-endian UTF-32 without a mark
pub fn units_to_utf32le(units: &[u16]) -> Vec<u8> {
    let mut output = Vec::with_capacity(units.len() * 4);
    encode32(units, true, &mut output);
    output
}

/// Encode code units as UTF-32: big-endian unless `bom` asks for a mark
pub fn units_to_utf32(units: &[u16], bom: BomPolicy) -> Vec<u8> {
    let mut output = Vec::with_capacity(units.len() * 4 + 4);
    match bom {
        BomPolicy::None => {}
        BomPolicy::BigEndian => output.extend_from_slice(&BOM_UTF32BE),
        BomPolicy::LittleEndian => output.extend_from_slice(&BOM_UTF32LE),
    }
    encode32(units, bom.is_little_endian(), &mut output);
    output
}

fn decode32(data: &[u8], little_endian: bool) -> Vec<u16> {
    let mut units = Vec::with_capacity(data.len() / 2);
    for quad in data.chunks_exact(4) {
        let quad = [quad[0], quad[1], quad[2], quad[3]];
        let code_point = if little_endian {
            u32::from_le_bytes(quad)
        } else {
            u32::from_be_bytes(quad)
        };
        push_scalar(code_point, &mut units);
    }
    units
}

/// Decode big-endian UTF-32, skipping a leading mark of either order
pub fn utf32be_to_units(data: &[u8]) -> Vec<u16> {
    decode32(&data[bom_len32(data)..], false)
}

/// Decode little-endian UTF-32, skipping a leading mark of either order
pub fn utf32le_to_units(data: &[u8]) -> Vec<u16> {
    decode32(&data[bom_len32(data)..], true)
}

/// Decode UTF-32 of either order, from its mark or the zero-run heuristic
pub fn utf32_to_units(data: &[u8]) -> Vec<u16> {
    if data.starts_with(&BOM_UTF32BE) {
        decode32(&data[4..], false)
    } else if data.starts_with(&BOM_UTF32LE) {
        decode32(&data[4..], true)
    } else {
        decode32(data, detection::is_utf32le(data))
    }
}
