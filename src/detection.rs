//! Encoding detection by structural validation
//!
//! Every supported encoding has a predicate that answers whether a buffer is
//! plausibly in that encoding. Predicates take any slice of code values
//! (`u8` bytes, `u16` code units or `u32` scalars), so detection works on raw
//! bytes and on already decoded text alike. A value above `0xFF` rules out
//! every byte-oriented encoding.
//!
//! [`EncodingDetector`] runs the predicates over a candidate list and returns
//! the first hit, so candidate order decides between encodings that accept
//! the same input (pure ASCII is valid UTF-8, EUC-JP and Shift_JIS).

use crate::{Encoding, registry};

const ESC: u32 = 0x1B;

/// Outcome of running every candidate predicate over a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    /// First matching candidate, if any
    pub encoding: Option<Encoding>,
    /// Whether the buffer starts with a byte order mark
    pub bom_detected: bool,
    /// Every matching candidate, in candidate order
    pub candidates: Vec<Encoding>,
}

/// Encoding detector over an ordered candidate list
#[derive(Debug, Clone)]
pub struct EncodingDetector {
    candidates: Vec<Encoding>,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self {
            candidates: registry::preference_order().to_vec(),
        }
    }
}

impl EncodingDetector {
    /// Create a detector using the default preference order
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector that only tries `candidates`, in the given order
    pub fn with_candidates(candidates: Vec<Encoding>) -> Self {
        Self { candidates }
    }

    /// Candidates tried by this detector
    pub fn candidates(&self) -> &[Encoding] {
        &self.candidates
    }

    /// First candidate whose predicate accepts `data`.
    ///
    /// Empty input has no encoding.
    pub fn detect<T: Copy + Into<u32>>(&self, data: &[T]) -> Option<Encoding> {
        if data.is_empty() {
            return None;
        }
        self.candidates
            .iter()
            .copied()
            .find(|&encoding| is_encoding(encoding, data))
    }

    /// Run every candidate and report all matches
    pub fn analyze<T: Copy + Into<u32>>(&self, data: &[T]) -> DetectionResult {
        let candidates: Vec<Encoding> = if data.is_empty() {
            Vec::new()
        } else {
            self.candidates
                .iter()
                .copied()
                .filter(|&encoding| is_encoding(encoding, data))
                .collect()
        };

        DetectionResult {
            encoding: candidates.first().copied(),
            bom_detected: detect_bom(data).is_some(),
            candidates,
        }
    }
}

/// Byte order mark at the start of `data` and its length in values.
///
/// UTF-32 marks are checked first since `FF FE 00 00` also starts with the
/// UTF-16LE mark.
pub fn detect_bom<T: Copy + Into<u32>>(data: &[T]) -> Option<(Encoding, usize)> {
    let starts_with = |bom: &[u8]| {
        data.len() >= bom.len()
            && data.iter().zip(bom).all(|(&v, &b)| v.into() == u32::from(b))
    };

    if starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        Some((Encoding::UTF32BE, 4))
    } else if starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        Some((Encoding::UTF32LE, 4))
    } else if starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some((Encoding::UTF8, 3))
    } else if starts_with(&[0xFE, 0xFF]) {
        Some((Encoding::UTF16BE, 2))
    } else if starts_with(&[0xFF, 0xFE]) {
        Some((Encoding::UTF16LE, 2))
    } else {
        None
    }
}

/// Dispatch to the predicate for `encoding`
pub fn is_encoding<T: Copy + Into<u32>>(encoding: Encoding, data: &[T]) -> bool {
    match encoding {
        Encoding::UTF32 => is_utf32(data),
        Encoding::UTF32BE => is_utf32be(data),
        Encoding::UTF32LE => is_utf32le(data),
        Encoding::UTF16 => is_utf16(data),
        Encoding::UTF16BE => is_utf16be(data),
        Encoding::UTF16LE => is_utf16le(data),
        Encoding::BINARY => is_binary(data),
        Encoding::ASCII => is_ascii(data),
        Encoding::JIS => is_jis(data),
        Encoding::UTF8 => is_utf8(data),
        Encoding::EUCJP => is_eucjp(data),
        Encoding::SJIS => is_sjis(data),
        Encoding::UNICODE => is_unicode(data),
    }
}

#[inline]
fn at<T: Copy + Into<u32>>(data: &[T], i: usize) -> Option<u32> {
    data.get(i).map(|&v| v.into())
}

/// Control bytes `00..07` or `FF` anywhere before a wide value
pub fn is_binary<T: Copy + Into<u32>>(data: &[T]) -> bool {
    for &v in data {
        let c = v.into();
        if c > 0xFF {
            return false;
        }
        if c <= 0x07 || c == 0xFF {
            return true;
        }
    }
    false
}

/// 7-bit values without ESC
pub fn is_ascii<T: Copy + Into<u32>>(data: &[T]) -> bool {
    data.iter().all(|&v| {
        let c = v.into();
        c < 0x80 && c != ESC
    })
}

/// 7-bit values containing a recognised ISO-2022-JP escape introducer
pub fn is_jis<T: Copy + Into<u32>>(data: &[T]) -> bool {
    let len = data.len();
    for (i, &v) in data.iter().enumerate() {
        let b = v.into();
        if b >= 0x80 {
            return false;
        }
        if b != ESC {
            continue;
        }
        if i + 2 >= len {
            return false;
        }
        let found = match (data[i + 1].into(), data[i + 2].into()) {
            // JIS X 0208 (1978, 1983, 1990+) and JIS X 0212
            (0x24, 0x28 | 0x40 | 0x42) => true,
            (0x26, 0x40) => true,
            // ASCII, half-width katakana, JIS X 0201 Roman
            (0x28, 0x42 | 0x49 | 0x4A) => true,
            _ => false,
        };
        if found {
            return true;
        }
    }
    false
}

/// EUC-JP: ASCII, `8E` kana pairs, `8F` JIS X 0212 triples, `A1..FE` pairs
pub fn is_eucjp<T: Copy + Into<u32>>(data: &[T]) -> bool {
    let len = data.len();
    let mut i = 0;
    while i < len {
        let b = data[i].into();
        if b < 0x80 {
            i += 1;
            continue;
        }
        match b {
            0x8E => {
                if i + 1 >= len || !(0xA1..=0xDF).contains(&data[i + 1].into()) {
                    return false;
                }
                i += 2;
            }
            0x8F => {
                if i + 2 >= len
                    || !(0xA2..=0xED).contains(&data[i + 1].into())
                    || !(0xA1..=0xFE).contains(&data[i + 2].into())
                {
                    return false;
                }
                i += 3;
            }
            0xA1..=0xFE => {
                if i + 1 >= len || !(0xA1..=0xFE).contains(&data[i + 1].into()) {
                    return false;
                }
                i += 2;
            }
            _ => return false,
        }
    }
    true
}

/// Shift_JIS lead/trail structure
pub fn is_sjis<T: Copy + Into<u32>>(data: &[T]) -> bool {
    let len = data.len();
    let mut i = 0;

    // A leading run of high values is accepted as-is.
    while let Some(b) = at(data, i) {
        if b <= 0x80 {
            break;
        }
        if b > 0xFF {
            return false;
        }
        i += 1;
    }

    while i < len {
        let b = data[i].into();
        if b <= 0x80 || (0xA1..=0xDF).contains(&b) {
            i += 1;
            continue;
        }
        if b == 0xA0 || b > 0xEF || i + 1 >= len {
            return false;
        }
        let trail = data[i + 1].into();
        if !(0x40..=0xFC).contains(&trail) || trail == 0x7F {
            return false;
        }
        i += 2;
    }
    true
}

/// Well-formed UTF-8 over printable ASCII, TAB, LF and CR
pub fn is_utf8<T: Copy + Into<u32>>(data: &[T]) -> bool {
    let len = data.len();
    let mut i = 0;
    while i < len {
        let b = data[i].into();
        if b > 0xFF {
            return false;
        }
        if matches!(b, 0x09 | 0x0A | 0x0D | 0x20..=0x7E) {
            i += 1;
            continue;
        }

        // (sequence length, allowed range of the second byte)
        let (width, second) = match b {
            0xC2..=0xDF => (2, 0x80..=0xBF),
            0xE0 => (3, 0xA0..=0xBF),
            0xE1..=0xEC | 0xEE | 0xEF => (3, 0x80..=0xBF),
            0xED => (3, 0x80..=0x9F),
            0xF0 => (4, 0x90..=0xBF),
            0xF1..=0xF3 => (4, 0x80..=0xBF),
            0xF4 => (4, 0x80..=0x8F),
            _ => return false,
        };
        if i + width - 1 >= len || !second.contains(&data[i + 1].into()) {
            return false;
        }
        if !data[i + 2..i + width]
            .iter()
            .all(|&c| (0x80..=0xBF).contains(&c.into()))
        {
            return false;
        }
        i += width;
    }
    true
}

/// Offset of the first zero value, or `None` if a wide value comes first.
fn first_zero<T: Copy + Into<u32>>(data: &[T]) -> Option<usize> {
    for (i, &v) in data.iter().enumerate() {
        match v.into() {
            0 => return Some(i),
            c if c > 0xFF => return None,
            _ => {}
        }
    }
    None
}

/// UTF-16 of either byte order
pub fn is_utf16<T: Copy + Into<u32>>(data: &[T]) -> bool {
    if data.len() < 2 {
        return false;
    }
    if matches!(
        detect_bom(data),
        Some((Encoding::UTF16BE | Encoding::UTF16LE | Encoding::UTF32LE, _))
    ) {
        return true;
    }

    let Some(pos) = first_zero(data) else {
        return false;
    };
    let ascii = |c: Option<u32>| c.is_some_and(|c| (0x01..0x80).contains(&c));
    ascii(at(data, pos + 1)) || (pos > 0 && ascii(at(data, pos - 1)))
}

/// UTF-16 big-endian: `FE FF` mark or first zero at an even offset
pub fn is_utf16be<T: Copy + Into<u32>>(data: &[T]) -> bool {
    if data.len() < 2 {
        return false;
    }
    if matches!(detect_bom(data), Some((Encoding::UTF16BE, _))) {
        return true;
    }
    first_zero(data).is_some_and(|pos| pos % 2 == 0)
}

/// UTF-16 little-endian: `FF FE` mark or first zero at an odd offset
pub fn is_utf16le<T: Copy + Into<u32>>(data: &[T]) -> bool {
    if data.len() < 2 {
        return false;
    }
    if matches!(
        detect_bom(data),
        Some((Encoding::UTF16LE | Encoding::UTF32LE, _))
    ) {
        return true;
    }
    first_zero(data).is_some_and(|pos| pos % 2 == 1)
}

/// Offset of the first run of three zero values
fn first_zero_run<T: Copy + Into<u32>>(data: &[T]) -> Option<usize> {
    for (i, &v) in data.iter().enumerate() {
        let c = v.into();
        if c > 0xFF {
            return None;
        }
        if c == 0 && at(data, i + 1) == Some(0) && at(data, i + 2) == Some(0) {
            return Some(i);
        }
    }
    None
}

/// UTF-32 of either byte order
pub fn is_utf32<T: Copy + Into<u32>>(data: &[T]) -> bool {
    if data.len() < 4 {
        return false;
    }
    if matches!(detect_bom(data), Some((Encoding::UTF32BE | Encoding::UTF32LE, _))) {
        return true;
    }

    let Some(pos) = first_zero_run(data) else {
        return false;
    };
    let ascii = |c: Option<u32>| c.is_some_and(|c| (0x01..=0x7F).contains(&c));
    ascii(at(data, pos + 3)) || (pos > 0 && ascii(at(data, pos - 1)))
}

/// UTF-32 big-endian: `00 00 FE FF` mark or a zero run at a 4-aligned offset
pub fn is_utf32be<T: Copy + Into<u32>>(data: &[T]) -> bool {
    if data.len() < 4 {
        return false;
    }
    if matches!(detect_bom(data), Some((Encoding::UTF32BE, _))) {
        return true;
    }
    first_zero_run(data).is_some_and(|pos| pos % 4 == 0)
}

/// UTF-32 little-endian: `FF FE 00 00` mark or a zero run at offset `1 mod 4`
pub fn is_utf32le<T: Copy + Into<u32>>(data: &[T]) -> bool {
    if data.len() < 4 {
        return false;
    }
    if matches!(detect_bom(data), Some((Encoding::UTF32LE, _))) {
        return true;
    }
    first_zero_run(data).is_some_and(|pos| pos % 4 == 1)
}

/// Every value is a Unicode code point
pub fn is_unicode<T: Copy + Into<u32>>(data: &[T]) -> bool {
    data.iter().all(|&v| v.into() <= 0x10FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SJIS_HELLO: &[u8] = &[0x82, 0xB1, 0x82, 0xF1, 0x82, 0xC9, 0x82, 0xBF, 0x82, 0xCD];
    const EUC_HELLO: &[u8] = &[0xA4, 0xB3, 0xA4, 0xF3, 0xA4, 0xCB, 0xA4, 0xC1, 0xA4, 0xCF];
    const JIS_HELLO: &[u8] = &[
        0x1B, 0x24, 0x42, 0x24, 0x33, 0x24, 0x73, 0x24, 0x4B, 0x24, 0x41, 0x24, 0x4F, 0x1B, 0x28,
        0x42,
    ];

    #[test]
    fn test_binary() {
        assert!(is_binary(&[0x41u8, 0x00, 0x42]));
        assert!(is_binary(&[0xFFu8]));
        assert!(!is_binary(b"hello"));
        assert!(!is_binary(&[0x3042u16, 0x00]));
    }

    #[test]
    fn test_ascii() {
        assert!(is_ascii(b"hello, world\r\n"));
        assert!(is_ascii::<u8>(&[]));
        assert!(!is_ascii(&[0x41u8, 0x1B]));
        assert!(!is_ascii(&[0x80u8]));
        assert!(!is_ascii(&[0x3042u16]));
    }

    #[test]
    fn test_jis() {
        assert!(is_jis(JIS_HELLO));
        assert!(is_jis(b"\x1b(Ihello"));
        assert!(is_jis(b"\x1b$(D"));
        assert!(is_jis(b"\x1b$@"));
        assert!(is_jis(b"\x1b&@"));
        assert!(is_jis(b"\x1b(J"));
        assert!(!is_jis(b"plain ascii"));
        // ESC too close to the end
        assert!(!is_jis(b"abc\x1b$"));
        assert!(!is_jis(SJIS_HELLO));
    }

    #[test]
    fn test_eucjp() {
        assert!(is_eucjp(EUC_HELLO));
        assert!(is_eucjp(&[0x8Eu8, 0xC6, 0x8E, 0xCE]));
        assert!(is_eucjp(&[0x8Fu8, 0xCB, 0xC6]));
        assert!(is_eucjp(b"ascii only"));
        assert!(!is_eucjp(&[0xA4u8]));
        assert!(!is_eucjp(&[0x8Fu8, 0xA1, 0xA1]));
        assert!(!is_eucjp(SJIS_HELLO));
    }

    #[test]
    fn test_sjis() {
        assert!(is_sjis(SJIS_HELLO));
        assert!(is_sjis(&[0xC6u8, 0xCE, 0xDD]));
        assert!(is_sjis(b"ascii only"));
        assert!(!is_sjis(&[0x41u8, 0x82]));
        assert!(!is_sjis(&[0x41u8, 0x82, 0x7F]));
        assert!(!is_sjis(&[0x41u8, 0xF0, 0x40]));
        assert!(!is_sjis(&[0x3042u16]));
    }

    #[test]
    fn test_utf8() {
        assert!(is_utf8("こんにちは\tworld\n".as_bytes()));
        assert!(is_utf8("𠮷".as_bytes()));
        assert!(!is_utf8(&[0x41u8, 0x00]));
        // overlong and surrogate forms
        assert!(!is_utf8(&[0xE0u8, 0x80, 0x80]));
        assert!(!is_utf8(&[0xEDu8, 0xA0, 0x80]));
        assert!(!is_utf8(&[0xF4u8, 0x90, 0x80, 0x80]));
        // truncated
        assert!(!is_utf8(&[0xE3u8, 0x81]));
        assert!(!is_utf8(SJIS_HELLO));
    }

    #[test]
    fn test_utf16() {
        assert!(is_utf16(&[0xFEu8, 0xFF, 0x30, 0x42]));
        assert!(is_utf16(&[0xFFu8, 0xFE, 0x42, 0x30]));
        assert!(is_utf16(&[0x00u8, 0x41, 0x00, 0x42]));
        assert!(is_utf16(&[0x41u8, 0x00, 0x42, 0x00]));
        assert!(!is_utf16(b"AB"));
        assert!(!is_utf16(&[0x41u8]));

        assert!(is_utf16be(&[0x00u8, 0x41]));
        assert!(!is_utf16be(&[0x41u8, 0x00]));
        assert!(is_utf16le(&[0x41u8, 0x00]));
        assert!(!is_utf16le(&[0x00u8, 0x41]));
    }

    #[test]
    fn test_utf32() {
        assert!(is_utf32(&[0x00u8, 0x00, 0xFE, 0xFF]));
        assert!(is_utf32(&[0xFFu8, 0xFE, 0x00, 0x00]));
        assert!(is_utf32(&[0x00u8, 0x00, 0x00, 0x41]));
        assert!(is_utf32(&[0x41u8, 0x00, 0x00, 0x00]));
        assert!(!is_utf32(&[0x00u8, 0x00, 0x00]));
        assert!(!is_utf32(b"ABCD"));

        assert!(is_utf32be(&[0x00u8, 0x00, 0x00, 0x41]));
        assert!(!is_utf32be(&[0x41u8, 0x00, 0x00, 0x00]));
        assert!(is_utf32le(&[0x41u8, 0x00, 0x00, 0x00]));
        assert!(!is_utf32le(&[0x00u8, 0x00, 0x00, 0x41]));
    }

    #[test]
    fn test_unicode() {
        assert!(is_unicode(&[0x41u32, 0x3042, 0x10FFFF]));
        assert!(!is_unicode(&[0x110000u32]));
        assert!(is_unicode(&[0xD842u16, 0xDFB7]));
    }

    #[test]
    fn test_detect_bom() {
        assert_eq!(detect_bom(&[0xFFu8, 0xFE, 0x00, 0x00]), Some((Encoding::UTF32LE, 4)));
        assert_eq!(detect_bom(&[0xFFu8, 0xFE, 0x41, 0x00]), Some((Encoding::UTF16LE, 2)));
        assert_eq!(detect_bom(&[0xEFu8, 0xBB, 0xBF]), Some((Encoding::UTF8, 3)));
        assert_eq!(detect_bom(b"no"), None);
    }

    #[test]
    fn test_detector_preference_order() {
        let detector = EncodingDetector::new();
        assert_eq!(detector.detect(SJIS_HELLO), Some(Encoding::SJIS));
        assert_eq!(detector.detect(EUC_HELLO), Some(Encoding::EUCJP));
        assert_eq!(detector.detect(JIS_HELLO), Some(Encoding::JIS));
        assert_eq!(detector.detect("こんにちは".as_bytes()), Some(Encoding::UTF8));
        assert_eq!(detector.detect(b"hello"), Some(Encoding::ASCII));
        assert_eq!(detector.detect::<u8>(&[]), None);

        let units: Vec<u16> = "こんにちは".encode_utf16().collect();
        assert_eq!(detector.detect(&units), Some(Encoding::UNICODE));
    }

    #[test]
    fn test_detector_with_candidates() {
        let detector = EncodingDetector::with_candidates(vec![Encoding::SJIS, Encoding::UTF8]);
        assert_eq!(detector.detect(b"hello"), Some(Encoding::SJIS));
        assert_eq!(detector.detect(JIS_HELLO), Some(Encoding::SJIS));

        let detector = EncodingDetector::with_candidates(vec![Encoding::UTF8]);
        assert_eq!(detector.detect(SJIS_HELLO), None);
    }

    #[test]
    fn test_analyze() {
        let result = EncodingDetector::new().analyze(b"hello");
        assert_eq!(result.encoding, Some(Encoding::ASCII));
        assert!(!result.bom_detected);
        assert_eq!(
            result.candidates,
            [
                Encoding::ASCII,
                Encoding::UTF8,
                Encoding::EUCJP,
                Encoding::SJIS,
                Encoding::UNICODE
            ]
        );

        let result = EncodingDetector::new().analyze(&[0xFEu8, 0xFF, 0x30, 0x42]);
        assert_eq!(result.encoding, Some(Encoding::UTF16));
        assert!(result.bom_detected);
    }
}
