//! Shift_JIS, EUC-JP and ISO-2022-JP codecs
//!
//! The three encodings share the JIS X 0208 character set and differ only in
//! how a row/cell pair is laid out in bytes, so conversions among them are
//! closed-form byte arithmetic. Only the step to or from Unicode consults
//! [`JisTables`].
//!
//! Decoders map byte pairs with no table entry to `?`. Encoders hand
//! characters with no representation to a [`FallbackPolicy`]. Input that ends
//! in the middle of a multi-byte character or an escape sequence ends the
//! output.

use crate::multibyte::{push_scalar, push_utf8};
use crate::options::FallbackPolicy;
use crate::tables::JisTables;

const ESC: u8 = 0x1B;
const SS2: u8 = 0x8E;
const SS3: u8 = 0x8F;
const PLACEHOLDER: u8 = b'?';

/// Unicode block of half-width katakana, `U+FF61..=U+FF9F`
const HALFWIDTH_KATAKANA: std::ops::RangeInclusive<u32> = 0xFF61..=0xFF9F;
/// Offset from a 7-bit JIS X 0201 katakana byte to its code point
const KATAKANA_OFFSET: u32 = 0xFF40;

/// Character set selected by the last ISO-2022-JP escape sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeState {
    /// `ESC ( B`
    #[default]
    Ascii,
    /// `ESC $ B` (also entered by `ESC $ @`)
    Jisx0208,
    /// `ESC ( I`
    HalfwidthKatakana,
    /// `ESC $ ( D`
    Jisx0212,
}

impl EscapeState {
    /// Escape sequence that selects this state
    pub fn escape_sequence(self) -> &'static [u8] {
        match self {
            EscapeState::Ascii => b"\x1b(B",
            EscapeState::Jisx0208 => b"\x1b$B",
            EscapeState::HalfwidthKatakana => b"\x1b(I",
            EscapeState::Jisx0212 => b"\x1b$(D",
        }
    }
}

/// Shift_JIS bytes of a JIS row/cell pair
pub fn sjis_pair_from_jis(b1: u8, b2: u8) -> (u8, u8) {
    let row = b1 >> 1;
    if b1 & 0x01 != 0 {
        let lead = if row < 0x2F {
            row + 0x71
        } else {
            row.wrapping_sub(0x4F)
        };
        let trail = if b2 > 0x5F {
            b2.wrapping_add(0x20)
        } else {
            b2.wrapping_add(0x1F)
        };
        (lead, trail)
    } else {
        let lead = if row <= 0x2F {
            row + 0x70
        } else {
            row.wrapping_sub(0x50)
        };
        (lead, b2.wrapping_add(0x7E))
    }
}

/// JIS row/cell pair of a Shift_JIS double-byte character
pub fn jis_pair_from_sjis(lead: u8, trail: u8) -> (u8, u8) {
    let b1 = u16::from(lead) << 1;
    let (b1, b2) = if trail < 0x9F {
        let b1 = if b1 < 0x13F { b1.wrapping_sub(0xE1) } else { b1.wrapping_sub(0x61) };
        let b2 = if trail > 0x7E {
            trail.wrapping_sub(0x20)
        } else {
            trail.wrapping_sub(0x1F)
        };
        (b1, b2)
    } else {
        let b1 = if b1 < 0x13F { b1.wrapping_sub(0xE0) } else { b1.wrapping_sub(0x60) };
        (b1, trail.wrapping_sub(0x7E))
    };
    ((b1 & 0xFF) as u8, b2)
}

#[inline]
fn is_sjis_katakana(b: u8) -> bool {
    (0xA1..=0xDF).contains(&b)
}

#[inline]
fn jis_code(b1: u8, b2: u8) -> u16 {
    (u16::from(b1) << 8) | u16::from(b2)
}

/// One decoded ISO-2022-JP character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JisChar {
    Ascii(u8),
    Katakana(u8),
    Jisx0208(u8, u8),
    Jisx0212(u8, u8),
}

/// Splits an ISO-2022-JP byte stream into characters, tracking escapes.
struct JisChars<'a> {
    data: &'a [u8],
    pos: usize,
    state: EscapeState,
}

impl<'a> JisChars<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            state: EscapeState::Ascii,
        }
    }

    fn byte(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    /// Consume the escape sequence at the cursor. Unknown introducers select
    /// ASCII and use up three bytes.
    fn escape(&mut self) {
        let (state, len) = match (self.byte(1), self.byte(2), self.byte(3)) {
            (Some(b'$'), Some(b'B' | b'@'), _) => (EscapeState::Jisx0208, 3),
            (Some(b'('), Some(b'I'), _) => (EscapeState::HalfwidthKatakana, 3),
            (Some(b'$'), Some(b'('), Some(b'D')) => (EscapeState::Jisx0212, 4),
            _ => (EscapeState::Ascii, 3),
        };
        self.state = state;
        self.pos += len;
    }
}

impl Iterator for JisChars<'_> {
    type Item = JisChar;

    fn next(&mut self) -> Option<JisChar> {
        while self.byte(0)? == ESC {
            self.escape();
        }

        let b1 = self.byte(0)?;
        let c = match self.state {
            EscapeState::Ascii => JisChar::Ascii(b1),
            EscapeState::HalfwidthKatakana => JisChar::Katakana(b1),
            EscapeState::Jisx0208 => JisChar::Jisx0208(b1, self.byte(1)?),
            EscapeState::Jisx0212 => JisChar::Jisx0212(b1, self.byte(1)?),
        };
        self.pos += match c {
            JisChar::Ascii(_) | JisChar::Katakana(_) => 1,
            JisChar::Jisx0208(..) | JisChar::Jisx0212(..) => 2,
        };
        Some(c)
    }
}

/// Accumulates ISO-2022-JP output, emitting an escape on every mode change.
struct JisWriter {
    output: Vec<u8>,
    state: EscapeState,
}

impl JisWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
            state: EscapeState::Ascii,
        }
    }

    fn switch(&mut self, state: EscapeState) {
        if self.state != state {
            self.state = state;
            self.output.extend_from_slice(state.escape_sequence());
        }
    }

    fn push(&mut self, state: EscapeState, bytes: &[u8]) {
        self.switch(state);
        self.output.extend_from_slice(bytes);
    }

    fn finish(mut self) -> Vec<u8> {
        self.switch(EscapeState::Ascii);
        self.output
    }
}

/// ISO-2022-JP to Shift_JIS. JIS X 0212 characters become `?`.
pub fn jis_to_sjis(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    for c in JisChars::new(data) {
        match c {
            JisChar::Ascii(b) => output.push(b),
            JisChar::Katakana(b) => output.push(b.wrapping_add(0x80)),
            JisChar::Jisx0208(b1, b2) => {
                let (lead, trail) = sjis_pair_from_jis(b1, b2);
                output.extend_from_slice(&[lead, trail]);
            }
            JisChar::Jisx0212(..) => output.push(PLACEHOLDER),
        }
    }
    output
}

/// ISO-2022-JP to EUC-JP
pub fn jis_to_eucjp(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    for c in JisChars::new(data) {
        match c {
            JisChar::Ascii(b) => output.push(b),
            JisChar::Katakana(b) => output.extend_from_slice(&[SS2, b.wrapping_add(0x80)]),
            JisChar::Jisx0208(b1, b2) => {
                output.extend_from_slice(&[b1.wrapping_add(0x80), b2.wrapping_add(0x80)])
            }
            JisChar::Jisx0212(b1, b2) => {
                output.extend_from_slice(&[SS3, b1.wrapping_add(0x80), b2.wrapping_add(0x80)])
            }
        }
    }
    output
}

/// Shift_JIS to ISO-2022-JP
pub fn sjis_to_jis(data: &[u8]) -> Vec<u8> {
    let mut writer = JisWriter::with_capacity(data.len() + 8);
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if is_sjis_katakana(b) {
            writer.push(EscapeState::HalfwidthKatakana, &[b - 0x80]);
            i += 1;
        } else if b >= 0x80 {
            let Some(&trail) = data.get(i + 1) else {
                break;
            };
            let (b1, b2) = jis_pair_from_sjis(b, trail);
            writer.push(EscapeState::Jisx0208, &[b1, b2]);
            i += 2;
        } else {
            writer.push(EscapeState::Ascii, &[b]);
            i += 1;
        }
    }
    writer.finish()
}

/// Shift_JIS to EUC-JP
pub fn sjis_to_eucjp(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len() + data.len() / 2);
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if is_sjis_katakana(b) {
            output.extend_from_slice(&[SS2, b]);
            i += 1;
        } else if b >= 0x80 {
            let Some(&trail) = data.get(i + 1) else {
                break;
            };
            let (b1, b2) = jis_pair_from_sjis(b, trail);
            output.extend_from_slice(&[b1.wrapping_add(0x80), b2.wrapping_add(0x80)]);
            i += 2;
        } else {
            output.push(b);
            i += 1;
        }
    }
    output
}

/// EUC-JP to ISO-2022-JP
pub fn eucjp_to_jis(data: &[u8]) -> Vec<u8> {
    let mut writer = JisWriter::with_capacity(data.len() + 8);
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        match b {
            SS2 => {
                let Some(&kana) = data.get(i + 1) else {
                    break;
                };
                writer.push(EscapeState::HalfwidthKatakana, &[kana.wrapping_sub(0x80)]);
                i += 2;
            }
            SS3 => {
                let (Some(&b1), Some(&b2)) = (data.get(i + 1), data.get(i + 2)) else {
                    break;
                };
                writer.push(
                    EscapeState::Jisx0212,
                    &[b1.wrapping_sub(0x80), b2.wrapping_sub(0x80)],
                );
                i += 3;
            }
            0x8F.. => {
                let Some(&trail) = data.get(i + 1) else {
                    break;
                };
                writer.push(
                    EscapeState::Jisx0208,
                    &[b.wrapping_sub(0x80), trail.wrapping_sub(0x80)],
                );
                i += 2;
            }
            _ => {
                writer.push(EscapeState::Ascii, &[b]);
                i += 1;
            }
        }
    }
    writer.finish()
}

/// EUC-JP to Shift_JIS. JIS X 0212 characters become `?`.
pub fn eucjp_to_sjis(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        match b {
            SS3 => {
                if i + 2 >= data.len() {
                    break;
                }
                output.push(PLACEHOLDER);
                i += 3;
            }
            SS2 => {
                let Some(&kana) = data.get(i + 1) else {
                    break;
                };
                output.push(kana);
                i += 2;
            }
            0x8F.. => {
                let Some(&trail) = data.get(i + 1) else {
                    break;
                };
                let (lead, trail) =
                    sjis_pair_from_jis(b.wrapping_sub(0x80), trail.wrapping_sub(0x80));
                output.extend_from_slice(&[lead, trail]);
                i += 2;
            }
            _ => {
                output.push(b);
                i += 1;
            }
        }
    }
    output
}

fn jis0208_scalar(tables: &JisTables, b1: u8, b2: u8) -> u32 {
    tables
        .from_jis0208(jis_code(b1, b2))
        .unwrap_or(u32::from(PLACEHOLDER))
}

fn jis0212_scalar(tables: &JisTables, b1: u8, b2: u8) -> u32 {
    tables
        .from_jis0212(jis_code(b1, b2))
        .unwrap_or(u32::from(PLACEHOLDER))
}

/// Decode Shift_JIS, passing each scalar value to `emit`
pub fn decode_sjis(data: &[u8], emit: &mut dyn FnMut(u32)) {
    let tables = JisTables::get();
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if is_sjis_katakana(b) {
            emit(KATAKANA_OFFSET + u32::from(b - 0x80));
            i += 1;
        } else if b >= 0x80 {
            let Some(&trail) = data.get(i + 1) else {
                break;
            };
            let (b1, b2) = jis_pair_from_sjis(b, trail);
            emit(jis0208_scalar(tables, b1, b2));
            i += 2;
        } else {
            emit(u32::from(b));
            i += 1;
        }
    }
}

/// Decode EUC-JP, passing each scalar value to `emit`
pub fn decode_eucjp(data: &[u8], emit: &mut dyn FnMut(u32)) {
    let tables = JisTables::get();
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        match b {
            SS2 => {
                let Some(&kana) = data.get(i + 1) else {
                    break;
                };
                emit(KATAKANA_OFFSET + u32::from(kana.wrapping_sub(0x80)));
                i += 2;
            }
            SS3 => {
                let (Some(&b1), Some(&b2)) = (data.get(i + 1), data.get(i + 2)) else {
                    break;
                };
                emit(jis0212_scalar(tables, b1.wrapping_sub(0x80), b2.wrapping_sub(0x80)));
                i += 3;
            }
            0x80.. => {
                let Some(&trail) = data.get(i + 1) else {
                    break;
                };
                emit(jis0208_scalar(tables, b.wrapping_sub(0x80), trail.wrapping_sub(0x80)));
                i += 2;
            }
            _ => {
                emit(u32::from(b));
                i += 1;
            }
        }
    }
}

/// Decode ISO-2022-JP, passing each scalar value to `emit`
pub fn decode_jis(data: &[u8], emit: &mut dyn FnMut(u32)) {
    let tables = JisTables::get();
    for c in JisChars::new(data) {
        emit(match c {
            JisChar::Ascii(b) => u32::from(b),
            JisChar::Katakana(b) => KATAKANA_OFFSET + u32::from(b),
            JisChar::Jisx0208(b1, b2) => jis0208_scalar(tables, b1, b2),
            JisChar::Jisx0212(b1, b2) => jis0212_scalar(tables, b1, b2),
        });
    }
}

/// Signature shared by the scalar decoders
pub type ScalarDecoder = fn(&[u8], &mut dyn FnMut(u32));

/// Collect the output of a scalar decoder as UTF-8
pub fn decode_to_utf8(data: &[u8], decode: ScalarDecoder) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len() * 3 / 2);
    decode(data, &mut |c| push_utf8(c, &mut output));
    output
}

/// Collect the output of a scalar decoder as code units
pub fn decode_to_units(data: &[u8], decode: ScalarDecoder) -> Vec<u16> {
    let mut units = Vec::with_capacity(data.len());
    decode(data, &mut |c| push_scalar(c, &mut units));
    units
}

/// JIS X 0208 code usable inside EUC-JP and ISO-2022-JP (rows 1-94 only)
fn seven_bit_jis0208(tables: &JisTables, code_point: u32) -> Option<u16> {
    tables.jis0208(code_point).filter(|&jis| jis >> 8 <= 0x7E)
}

/// Code point the tables list for a character with several common Unicode
/// spellings. Yen sign and overline are the JIS X 0201 forms of `\` and `~`.
fn fold_variant(code_point: u32) -> u32 {
    match code_point {
        0x00A5 => 0x5C,
        0x203E => 0x7E,
        0x301C => 0xFF5E,
        0x2016 => 0x2225,
        0x2212 => 0xFF0D,
        0x00A2 => 0xFFE0,
        0x00A3 => 0xFFE1,
        0x00AC => 0xFFE2,
        0x2014 => 0x2015,
        other => other,
    }
}

/// Encode scalar values as Shift_JIS
pub fn encode_sjis(scalars: impl IntoIterator<Item = u32>, fallback: FallbackPolicy) -> Vec<u8> {
    let tables = JisTables::get();
    let mut output = Vec::new();
    for original in scalars {
        let c = fold_variant(original);
        if c < 0x80 {
            output.push(c as u8);
        } else if HALFWIDTH_KATAKANA.contains(&c) {
            output.push((c - KATAKANA_OFFSET) as u8 + 0x80);
        } else if let Some(jis) = tables.jis0208(c) {
            let (lead, trail) = sjis_pair_from_jis((jis >> 8) as u8, jis as u8);
            output.extend_from_slice(&[lead, trail]);
        } else {
            fallback.write(original, &mut output);
        }
    }
    output
}

/// Encode scalar values as EUC-JP
pub fn encode_eucjp(scalars: impl IntoIterator<Item = u32>, fallback: FallbackPolicy) -> Vec<u8> {
    let tables = JisTables::get();
    let mut output = Vec::new();
    for original in scalars {
        let c = fold_variant(original);
        if c < 0x80 {
            output.push(c as u8);
        } else if HALFWIDTH_KATAKANA.contains(&c) {
            output.extend_from_slice(&[SS2, (c - KATAKANA_OFFSET) as u8 + 0x80]);
        } else if let Some(jis) = seven_bit_jis0208(tables, c) {
            let [b1, b2] = jis.to_be_bytes();
            output.extend_from_slice(&[b1 + 0x80, b2 + 0x80]);
        } else if let Some(jis) = tables.jis0212(c) {
            let [b1, b2] = jis.to_be_bytes();
            output.extend_from_slice(&[SS3, b1 + 0x80, b2 + 0x80]);
        } else {
            fallback.write(original, &mut output);
        }
    }
    output
}

/// Encode scalar values as ISO-2022-JP, ending in ASCII mode
pub fn encode_jis(scalars: impl IntoIterator<Item = u32>, fallback: FallbackPolicy) -> Vec<u8> {
    let tables = JisTables::get();
    let mut writer = JisWriter::with_capacity(0);
    for original in scalars {
        let c = fold_variant(original);
        if c < 0x80 {
            writer.push(EscapeState::Ascii, &[c as u8]);
        } else if HALFWIDTH_KATAKANA.contains(&c) {
            writer.push(EscapeState::HalfwidthKatakana, &[(c - KATAKANA_OFFSET) as u8]);
        } else if let Some(jis) = seven_bit_jis0208(tables, c) {
            writer.push(EscapeState::Jisx0208, &jis.to_be_bytes());
        } else if let Some(jis) = tables.jis0212(c) {
            writer.push(EscapeState::Jisx0212, &jis.to_be_bytes());
        } else {
            writer.switch(EscapeState::Ascii);
            fallback.write(original, &mut writer.output);
        }
    }
    writer.finish()
}
