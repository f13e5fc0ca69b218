//! # JisConv - Japanese Character Encoding Detection and Conversion
//!
//! Detects and converts text between the legacy Japanese encodings and the
//! Unicode family without relying on any platform encoding service.
//!
//! ## Features
//!
//! - **Japanese encodings**: Shift_JIS, EUC-JP (with JIS X 0212), ISO-2022-JP
//! - **Unicode family**: UTF-8, UTF-16 and UTF-32 in either byte order, with or without a BOM
//! - **Detection** by structural validation in a fixed preference order
//! - **Lenient decoding**: malformed input never fails a conversion
//!
//! ## Quick Start
//!
//! ```rust
//! use jisconv::{Encoding, Translator};
//!
//! // "こんにちは" in Shift_JIS
//! let sjis = [0x82, 0xB1, 0x82, 0xF1, 0x82, 0xC9, 0x82, 0xBF, 0x82, 0xCD];
//!
//! let translator = Translator::new(Encoding::SJIS, Encoding::EUCJP);
//! let euc = translator.convert(&sjis);
//! assert_eq!(euc, [0xA4, 0xB3, 0xA4, 0xF3, 0xA4, 0xCB, 0xA4, 0xC1, 0xA4, 0xCF]);
//!
//! assert_eq!(jisconv::detect(&sjis[..], "AUTO").unwrap(), Some(Encoding::SJIS));
//! let text = jisconv::convert(&sjis[..], "UNICODE", None).unwrap();
//! assert_eq!(text.to_string(), "こんにちは");
//! ```

#![deny(missing_docs)]

use std::fmt;
use std::str::FromStr;

pub mod detection;
pub mod japanese;
pub mod multibyte;
pub mod options;
pub mod registry;
mod tables;
pub mod text;

use detection::EncodingDetector;
use multibyte::{Utf8Scalars, unit_scalars};
use options::{BomPolicy, ConvertOptions, FallbackPolicy, OutputType};

/// Result type for encoding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring a detection or conversion.
///
/// Conversions themselves never fail: unmappable characters go through the
/// fallback policy and malformed input is decoded leniently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Encoding name that matches no registered alias
    UnknownEncoding {
        /// The name as given
        name: String,
    },
    /// Option value that could not be parsed
    InvalidOption {
        /// Option name
        option: &'static str,
        /// The rejected value
        value: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownEncoding { name } => write!(f, "Unknown encoding: {:?}", name),
            Error::InvalidOption { option, value } => {
                write!(f, "Invalid value {:?} for option '{}'", value, option)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Supported character encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// UTF-32, byte order from the BOM or content
    UTF32,
    /// UTF-32 big endian
    UTF32BE,
    /// UTF-32 little endian
    UTF32LE,
    /// UTF-16, byte order from the BOM or content
    UTF16,
    /// UTF-16 big endian
    UTF16BE,
    /// UTF-16 little endian
    UTF16LE,
    /// Arbitrary binary data, never converted
    BINARY,
    /// ASCII (7-bit, 0-127)
    ASCII,
    /// ISO-2022-JP
    JIS,
    /// UTF-8
    UTF8,
    /// EUC-JP
    EUCJP,
    /// Shift_JIS
    SJIS,
    /// UTF-16 code units held as 16-bit values rather than bytes
    UNICODE,
}

impl Encoding {
    /// Every supported encoding
    pub const ALL: [Encoding; 13] = [
        Encoding::UTF32,
        Encoding::UTF32BE,
        Encoding::UTF32LE,
        Encoding::UTF16,
        Encoding::UTF16BE,
        Encoding::UTF16LE,
        Encoding::BINARY,
        Encoding::ASCII,
        Encoding::JIS,
        Encoding::UTF8,
        Encoding::EUCJP,
        Encoding::SJIS,
        Encoding::UNICODE,
    ];

    /// Canonical name of the encoding
    pub fn name(self) -> &'static str {
        match self {
            Encoding::UTF32 => "UTF32",
            Encoding::UTF32BE => "UTF32BE",
            Encoding::UTF32LE => "UTF32LE",
            Encoding::UTF16 => "UTF16",
            Encoding::UTF16BE => "UTF16BE",
            Encoding::UTF16LE => "UTF16LE",
            Encoding::BINARY => "BINARY",
            Encoding::ASCII => "ASCII",
            Encoding::JIS => "JIS",
            Encoding::UTF8 => "UTF8",
            Encoding::EUCJP => "EUCJP",
            Encoding::SJIS => "SJIS",
            Encoding::UNICODE => "UNICODE",
        }
    }

    /// Conventional spelling of the encoding name
    pub fn display_name(self) -> &'static str {
        match self {
            Encoding::UTF32 => "UTF-32",
            Encoding::UTF32BE => "UTF-32BE",
            Encoding::UTF32LE => "UTF-32LE",
            Encoding::UTF16 => "UTF-16",
            Encoding::UTF16BE => "UTF-16BE",
            Encoding::UTF16LE => "UTF-16LE",
            Encoding::BINARY => "Binary",
            Encoding::ASCII => "US-ASCII",
            Encoding::JIS => "ISO-2022-JP",
            Encoding::UTF8 => "UTF-8",
            Encoding::EUCJP => "EUC-JP",
            Encoding::SJIS => "Shift_JIS",
            Encoding::UNICODE => "Unicode code units",
        }
    }

    /// One-line description
    pub fn description(self) -> &'static str {
        match self {
            Encoding::UTF32 => "Unicode Transformation Format 32-bit, byte order from BOM or content",
            Encoding::UTF32BE => "Unicode Transformation Format 32-bit, big-endian",
            Encoding::UTF32LE => "Unicode Transformation Format 32-bit, little-endian",
            Encoding::UTF16 => "Unicode Transformation Format 16-bit, byte order from BOM or content",
            Encoding::UTF16BE => "Unicode Transformation Format 16-bit, big-endian",
            Encoding::UTF16LE => "Unicode Transformation Format 16-bit, little-endian",
            Encoding::BINARY => "Non-text data, passed through unchanged",
            Encoding::ASCII => "American Standard Code for Information Interchange (7-bit)",
            Encoding::JIS => "7-bit Japanese encoding switching character sets with escape sequences",
            Encoding::UTF8 => "Unicode Transformation Format 8-bit, variable-length encoding",
            Encoding::EUCJP => "Extended Unix Code for Japanese, JIS X 0208 and JIS X 0212",
            Encoding::SJIS => "Shift_JIS as used by Windows (CP932), JIS X 0208 and half-width katakana",
            Encoding::UNICODE => "Sequence of UTF-16 code units rather than bytes",
        }
    }

    /// Whether ASCII text is stored unchanged
    pub fn is_ascii_compatible(self) -> bool {
        matches!(
            self,
            Encoding::ASCII | Encoding::UTF8 | Encoding::EUCJP | Encoding::SJIS | Encoding::JIS
        )
    }

    /// Whether a character may take more than one byte
    pub fn is_multibyte(self) -> bool {
        !matches!(self, Encoding::ASCII | Encoding::BINARY | Encoding::UNICODE)
    }

    /// Byte order mark of the encoding, if it has a fixed one
    pub fn bom(self) -> Option<&'static [u8]> {
        match self {
            Encoding::UTF16BE => Some(&[0xFE, 0xFF]),
            Encoding::UTF16LE => Some(&[0xFF, 0xFE]),
            Encoding::UTF32BE => Some(&[0x00, 0x00, 0xFE, 0xFF]),
            Encoding::UTF32LE => Some(&[0xFF, 0xFE, 0x00, 0x00]),
            _ => None,
        }
    }

    /// Position in the auto-detection order, if auto-detection tries it
    pub fn priority(self) -> Option<usize> {
        registry::preference_order().iter().position(|&e| e == self)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        registry::canonicalize(s).ok_or_else(|| Error::UnknownEncoding {
            name: s.to_string(),
        })
    }
}

/// Data to detect or convert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// A string, processed as its UTF-16 code units
    Text(&'a str),
    /// Raw bytes
    Bytes(&'a [u8]),
    /// Code units or other 16-bit values
    Units(&'a [u16]),
}

impl Input<'_> {
    /// Number of values in the input
    pub fn len(&self) -> usize {
        match self {
            Input::Text(s) => s.encode_utf16().count(),
            Input::Bytes(b) => b.len(),
            Input::Units(u) => u.len(),
        }
    }

    /// Whether the input holds no values
    pub fn is_empty(&self) -> bool {
        match self {
            Input::Text(s) => s.is_empty(),
            Input::Bytes(b) => b.is_empty(),
            Input::Units(u) => u.is_empty(),
        }
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(s: &'a str) -> Self {
        Input::Text(s)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(s: &'a String) -> Self {
        Input::Text(s)
    }
}

impl<'a> From<&'a [u8]> for Input<'a> {
    fn from(b: &'a [u8]) -> Self {
        Input::Bytes(b)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Input<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Input::Bytes(b)
    }
}

impl<'a> From<&'a Vec<u8>> for Input<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Input::Bytes(b)
    }
}

impl<'a> From<&'a [u16]> for Input<'a> {
    fn from(u: &'a [u16]) -> Self {
        Input::Units(u)
    }
}

impl<'a> From<&'a Vec<u16>> for Input<'a> {
    fn from(u: &'a Vec<u16>) -> Self {
        Input::Units(u)
    }
}

/// Result of a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Bytes, the natural result for byte encodings
    Bytes(Vec<u8>),
    /// 16-bit values, the natural result for `UNICODE`
    Units(Vec<u16>),
    /// A string
    Text(String),
}

impl Output {
    /// Bytes, if this is a byte result
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Output::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Code units, if this is a 16-bit result
    pub fn as_units(&self) -> Option<&[u16]> {
        match self {
            Output::Units(u) => Some(u),
            _ => None,
        }
    }

    /// String, if this is a text result
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Output::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Number of values in the result. Text counts UTF-16 code units, as
    /// [`Input::len`] does.
    pub fn len(&self) -> usize {
        match self {
            Output::Bytes(b) => b.len(),
            Output::Units(u) => u.len(),
            Output::Text(s) => s.encode_utf16().count(),
        }
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes for writing out. Code units and text are written as UTF-8.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Output::Bytes(b) => b,
            Output::Units(u) => text::code_to_string(&u).into_bytes(),
            Output::Text(s) => s.into_bytes(),
        }
    }

    fn shape(self, output: OutputType) -> Output {
        match (output, self) {
            (OutputType::Array, natural) => natural,
            (OutputType::String, Output::Bytes(b)) => Output::Text(text::bytes_to_string(&b)),
            (OutputType::String, Output::Units(u)) => Output::Text(text::code_to_string(&u)),
            (OutputType::ArrayBuffer, Output::Bytes(b)) => {
                Output::Units(b.into_iter().map(u16::from).collect())
            }
            (_, shaped) => shaped,
        }
    }
}

impl fmt::Display for Output {
    /// Bytes show one character per byte, code units decode as UTF-16.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Bytes(b) => f.write_str(&text::bytes_to_string(b)),
            Output::Units(u) => f.write_str(&text::code_to_string(u)),
            Output::Text(s) => f.write_str(s),
        }
    }
}

/// Candidate encodings for detection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Candidates<'a> {
    /// The default preference order
    #[default]
    Auto,
    /// Encoding names, resolved when detection runs
    Names(Vec<&'a str>),
    /// Resolved encodings
    Encodings(Vec<Encoding>),
}

impl Candidates<'_> {
    /// Resolve to the ordered list of encodings to try.
    ///
    /// An empty name list means the default preference order.
    pub fn resolve(&self) -> Result<Vec<Encoding>> {
        let encodings = match self {
            Candidates::Auto => Vec::new(),
            Candidates::Names(names) => names
                .iter()
                .map(|name| name.parse())
                .collect::<Result<Vec<Encoding>>>()?,
            Candidates::Encodings(encodings) => encodings.clone(),
        };
        if encodings.is_empty() {
            Ok(registry::preference_order().to_vec())
        } else {
            Ok(encodings)
        }
    }
}

impl<'a> From<&'a str> for Candidates<'a> {
    /// `"AUTO"`, a single name, or a comma separated list
    fn from(s: &'a str) -> Self {
        if s.trim().eq_ignore_ascii_case("AUTO") {
            return Candidates::Auto;
        }
        Candidates::Names(
            s.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }
}

impl<'a> From<&'a [&'a str]> for Candidates<'a> {
    fn from(names: &'a [&'a str]) -> Self {
        Candidates::Names(names.to_vec())
    }
}

impl<'a> From<&'a [Encoding]> for Candidates<'a> {
    fn from(encodings: &'a [Encoding]) -> Self {
        Candidates::Encodings(encodings.to_vec())
    }
}

impl From<Encoding> for Candidates<'_> {
    fn from(encoding: Encoding) -> Self {
        Candidates::Encodings(vec![encoding])
    }
}

impl<'a> From<Option<&'a str>> for Candidates<'a> {
    fn from(s: Option<&'a str>) -> Self {
        s.map(Candidates::from).unwrap_or_default()
    }
}

/// Byte value of a code unit fed to a byte encoding
fn narrow(unit: u16) -> u8 {
    u8::try_from(unit).unwrap_or(b'?')
}

/// Converter between two encodings
#[derive(Debug, Clone)]
pub struct Translator {
    from: Encoding,
    to: Encoding,
    fallback: FallbackPolicy,
    bom: BomPolicy,
}

impl Translator {
    /// Create a new translator between two encodings
    pub fn new(from: Encoding, to: Encoding) -> Self {
        Self {
            from,
            to,
            fallback: FallbackPolicy::default(),
            bom: BomPolicy::default(),
        }
    }

    /// Policy for characters the target cannot represent
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Byte order mark policy for UTF-16 and UTF-32 targets
    pub fn with_bom(mut self, bom: BomPolicy) -> Self {
        self.bom = bom;
        self
    }

    /// Take the fallback and byte order mark policies set in `options`
    pub fn with_options(mut self, options: &ConvertOptions) -> Self {
        if let Some(fallback) = options.fallback {
            self.fallback = fallback;
        }
        if let Some(bom) = options.bom {
            self.bom = bom;
        }
        self
    }

    /// Get source encoding
    pub fn from_encoding(&self) -> Encoding {
        self.from
    }

    /// Get target encoding
    pub fn to_encoding(&self) -> Encoding {
        self.to
    }

    /// Whether the input is returned unchanged
    pub fn is_passthrough(&self) -> bool {
        self.from == self.to || self.from == Encoding::BINARY || self.to == Encoding::BINARY
    }

    /// Convert bytes to bytes.
    ///
    /// A `UNICODE` source reads each byte as one code unit and a `UNICODE`
    /// target is returned as big-endian UTF-16.
    pub fn convert(&self, input: &[u8]) -> Vec<u8> {
        match self.translate(Input::Bytes(input)) {
            Output::Bytes(b) => b,
            Output::Units(u) => multibyte::units_to_utf16be(&u),
            Output::Text(s) => s.into_bytes(),
        }
    }

    /// Convert `input` into the natural result kind of the target.
    ///
    /// Bytes handed to a `UNICODE` source are widened to code units. Code
    /// units handed to a byte source are read as bytes, and any unit above
    /// `0xFF` becomes `?`.
    pub fn translate(&self, input: Input<'_>) -> Output {
        if self.is_passthrough() {
            return match input {
                Input::Text(s) => Output::Units(text::string_to_code(s)),
                Input::Bytes(b) => Output::Bytes(b.to_vec()),
                Input::Units(u) => Output::Units(u.to_vec()),
            };
        }

        if self.from == Encoding::UNICODE {
            let units = match input {
                Input::Text(s) => text::string_to_code(s),
                Input::Bytes(b) => b.iter().map(|&b| u16::from(b)).collect(),
                Input::Units(u) => u.to_vec(),
            };
            return Output::Bytes(self.encode(&units));
        }

        let narrowed: Vec<u8>;
        let bytes: &[u8] = match input {
            Input::Bytes(b) => b,
            Input::Units(u) => {
                narrowed = u.iter().map(|&u| narrow(u)).collect();
                &narrowed
            }
            Input::Text(s) => {
                narrowed = s.encode_utf16().map(narrow).collect();
                &narrowed
            }
        };

        if self.to == Encoding::UNICODE {
            Output::Units(self.decode(bytes))
        } else if let Some(direct) = self.convert_direct(bytes) {
            Output::Bytes(direct)
        } else {
            Output::Bytes(self.encode(&self.decode(bytes)))
        }
    }

    /// Byte-to-byte pairs that skip the code unit form
    fn convert_direct(&self, input: &[u8]) -> Option<Vec<u8>> {
        use Encoding::*;

        let output = match (self.from, self.to) {
            (JIS, SJIS) => japanese::jis_to_sjis(input),
            (JIS, EUCJP) => japanese::jis_to_eucjp(input),
            (SJIS, JIS) => japanese::sjis_to_jis(input),
            (SJIS, EUCJP) => japanese::sjis_to_eucjp(input),
            (EUCJP, JIS) => japanese::eucjp_to_jis(input),
            (EUCJP, SJIS) => japanese::eucjp_to_sjis(input),

            (SJIS, UTF8) => japanese::decode_to_utf8(input, japanese::decode_sjis),
            (EUCJP, UTF8) => japanese::decode_to_utf8(input, japanese::decode_eucjp),
            (JIS, UTF8) => japanese::decode_to_utf8(input, japanese::decode_jis),
            (UTF8 | ASCII, SJIS) => japanese::encode_sjis(Utf8Scalars::new(input), self.fallback),
            (UTF8 | ASCII, EUCJP) => japanese::encode_eucjp(Utf8Scalars::new(input), self.fallback),
            (UTF8 | ASCII, JIS) => japanese::encode_jis(Utf8Scalars::new(input), self.fallback),

            (UTF16, UTF16BE) => multibyte::utf16_to_utf16be(input),
            (UTF16, UTF16LE) => multibyte::utf16_to_utf16le(input),
            (UTF16BE, UTF16) => multibyte::utf16be_to_utf16(input, self.bom),
            (UTF16LE, UTF16) => multibyte::utf16le_to_utf16(input, self.bom),
            (UTF16BE, UTF16LE) | (UTF16LE, UTF16BE) => multibyte::swap_utf16(input),
            _ => return None,
        };
        Some(output)
    }

    /// Decode the source encoding into code units
    fn decode(&self, input: &[u8]) -> Vec<u16> {
        match self.from {
            Encoding::UTF32 => multibyte::utf32_to_units(input),
            Encoding::UTF32BE => multibyte::utf32be_to_units(input),
            Encoding::UTF32LE => multibyte::utf32le_to_units(input),
            Encoding::UTF16 => multibyte::utf16_to_units(input),
            Encoding::UTF16BE => multibyte::utf16be_to_units(input),
            Encoding::UTF16LE => multibyte::utf16le_to_units(input),
            Encoding::ASCII | Encoding::UTF8 => multibyte::utf8_to_units(input),
            Encoding::JIS => japanese::decode_to_units(input, japanese::decode_jis),
            Encoding::EUCJP => japanese::decode_to_units(input, japanese::decode_eucjp),
            Encoding::SJIS => japanese::decode_to_units(input, japanese::decode_sjis),
            Encoding::BINARY | Encoding::UNICODE => input.iter().map(|&b| u16::from(b)).collect(),
        }
    }

    /// Encode code units into the target encoding
    fn encode(&self, units: &[u16]) -> Vec<u8> {
        match self.to {
            Encoding::UTF32 => multibyte::units_to_utf32(units, self.bom),
            Encoding::UTF32BE => multibyte::units_to_utf32be(units),
            Encoding::UTF32LE => multibyte::units_to_utf32le(units),
            Encoding::UTF16 => multibyte::units_to_utf16(units, self.bom),
            Encoding::UTF16BE => multibyte::units_to_utf16be(units),
            Encoding::UTF16LE => multibyte::units_to_utf16le(units),
            Encoding::ASCII => multibyte::units_to_ascii(units, self.fallback),
            Encoding::UTF8 => multibyte::units_to_utf8(units),
            Encoding::JIS => japanese::encode_jis(unit_scalars(units), self.fallback),
            Encoding::EUCJP => japanese::encode_eucjp(unit_scalars(units), self.fallback),
            Encoding::SJIS => japanese::encode_sjis(unit_scalars(units), self.fallback),
            Encoding::BINARY | Encoding::UNICODE => units.iter().map(|&u| u as u8).collect(),
        }
    }
}

/// Detect the encoding of `input`.
///
/// Candidates are tried in order and the first whose structure matches wins.
/// Returns `Ok(None)` for empty input or when no candidate matches.
///
/// ```
/// use jisconv::{detect, Encoding};
///
/// let euc: [u8; 4] = [0xC6, 0xFC, 0xCB, 0xDC];
/// assert_eq!(detect(&euc, "AUTO").unwrap(), Some(Encoding::EUCJP));
/// assert_eq!(detect(&euc, "SJIS,EUCJP").unwrap(), Some(Encoding::SJIS));
/// assert!(detect(&euc, "foo").is_err());
/// ```
pub fn detect<'a, 'c>(
    input: impl Into<Input<'a>>,
    candidates: impl Into<Candidates<'c>>,
) -> Result<Option<Encoding>> {
    let input = input.into();
    if input.is_empty() {
        return Ok(None);
    }

    let detector = EncodingDetector::with_candidates(candidates.into().resolve()?);
    Ok(match input {
        Input::Text(s) => detector.detect(&text::string_to_code(s)),
        Input::Bytes(b) => detector.detect(b),
        Input::Units(u) => detector.detect(u),
    })
}

/// Convert `input` to the encoding named `to`.
///
/// `from` names the source encoding. `None`, `"AUTO"` or a comma separated
/// list detects it first; input of undetectable encoding is returned as-is.
pub fn convert<'a>(input: impl Into<Input<'a>>, to: &str, from: Option<&str>) -> Result<Output> {
    let mut options = ConvertOptions::new(to);
    options.from = from.map(str::to_string);
    convert_with(input, &options)
}

/// Convert `input` as described by `options`
///
/// ```
/// use jisconv::{convert_with, options::{ConvertOptions, FallbackPolicy}};
///
/// let options = ConvertOptions::new("SJIS")
///     .with_from("UNICODE")
///     .with_fallback(FallbackPolicy::HtmlEntity);
/// let sjis = convert_with("𠮷", &options).unwrap();
/// assert_eq!(sjis.to_string(), "&#134071;");
/// ```
pub fn convert_with<'a>(input: impl Into<Input<'a>>, options: &ConvertOptions) -> Result<Output> {
    let input = input.into();

    let to: Encoding = options
        .to
        .as_deref()
        .ok_or_else(|| Error::InvalidOption {
            option: "to",
            value: String::new(),
        })?
        .parse()?;

    let output_type = options.output.unwrap_or(match input {
        Input::Text(_) => OutputType::String,
        _ => OutputType::Array,
    });

    let from = match options.from.as_deref() {
        Some(name) if !name.trim().eq_ignore_ascii_case("AUTO") && !name.contains(',') => {
            Some(name.parse()?)
        }
        candidates => detect(input, candidates)?,
    };

    // Undetectable input passes through.
    let from = from.unwrap_or(to);

    let translator = Translator::new(from, to).with_options(options);
    Ok(translator.translate(input).shape(output_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SJIS_HELLO: [u8; 10] = [0x82, 0xB1, 0x82, 0xF1, 0x82, 0xC9, 0x82, 0xBF, 0x82, 0xCD];
    const EUC_HELLO: [u8; 10] = [0xA4, 0xB3, 0xA4, 0xF3, 0xA4, 0xCB, 0xA4, 0xC1, 0xA4, 0xCF];
    const JIS_HELLO: [u8; 16] = [
        0x1B, 0x24, 0x42, 0x24, 0x33, 0x24, 0x73, 0x24, 0x4B, 0x24, 0x41, 0x24, 0x4F, 0x1B, 0x28,
        0x42,
    ];

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn bytes(output: Output) -> Vec<u8> {
        match output {
            Output::Bytes(b) => b,
            other => panic!("expected bytes, got {:?}", other),
        }
    }

    #[test]
    fn test_encoding_properties() {
        assert_eq!(Encoding::SJIS.name(), "SJIS");
        assert_eq!(Encoding::SJIS.display_name(), "Shift_JIS");
        assert!(Encoding::EUCJP.is_ascii_compatible());
        assert!(!Encoding::UTF16.is_ascii_compatible());
        assert!(Encoding::JIS.is_multibyte());
        assert!(!Encoding::ASCII.is_multibyte());
        assert_eq!(Encoding::UTF16LE.bom(), Some(&[0xFF, 0xFE][..]));
        assert_eq!(Encoding::SJIS.bom(), None);
        assert_eq!(Encoding::UTF32.priority(), Some(0));
        assert_eq!(Encoding::UTF16BE.priority(), None);
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("Shift_JIS".parse::<Encoding>().unwrap(), Encoding::SJIS);
        assert_eq!("iso-2022-jp".parse::<Encoding>().unwrap(), Encoding::JIS);
        assert_eq!(
            "foo".parse::<Encoding>(),
            Err(Error::UnknownEncoding { name: "foo".into() })
        );
        for encoding in Encoding::ALL {
            assert_eq!(encoding.name().parse::<Encoding>().unwrap(), encoding);
            assert_eq!(encoding.to_string(), encoding.name());
        }
    }

    #[test]
    fn test_translator_japanese_pairs() {
        let cases: [(Encoding, &[u8]); 3] = [
            (Encoding::SJIS, &SJIS_HELLO),
            (Encoding::EUCJP, &EUC_HELLO),
            (Encoding::JIS, &JIS_HELLO),
        ];
        for (from, input) in cases {
            for (to, expected) in cases {
                assert_eq!(Translator::new(from, to).convert(input), expected, "{from} -> {to}");
            }
            let utf8 = Translator::new(from, Encoding::UTF8).convert(input);
            assert_eq!(utf8, "こんにちは".as_bytes());
            assert_eq!(Translator::new(Encoding::UTF8, from).convert(&utf8), input);
        }
    }

    #[test]
    fn test_translator_units() {
        let translator = Translator::new(Encoding::SJIS, Encoding::UNICODE);
        assert_eq!(
            translator.translate(Input::Bytes(&SJIS_HELLO)),
            Output::Units(units("こんにちは"))
        );

        let translator = Translator::new(Encoding::UNICODE, Encoding::EUCJP);
        assert_eq!(
            translator.translate(Input::Text("こんにちは")),
            Output::Bytes(EUC_HELLO.to_vec())
        );
    }

    #[test]
    fn test_translator_composes_through_units() {
        let utf16 = Translator::new(Encoding::SJIS, Encoding::UTF16).convert(&SJIS_HELLO);
        assert_eq!(utf16, multibyte::units_to_utf16be(&units("こんにちは")));

        let utf32 = Translator::new(Encoding::EUCJP, Encoding::UTF32LE).convert(&EUC_HELLO);
        assert_eq!(
            Translator::new(Encoding::UTF32LE, Encoding::SJIS).convert(&utf32),
            SJIS_HELLO
        );

        let ascii = Translator::new(Encoding::SJIS, Encoding::ASCII).convert(&[0x41, 0x82, 0xA0]);
        assert_eq!(ascii, b"A?");
    }

    #[test]
    fn test_translator_passthrough() {
        let data = [0x00, 0xFF, 0x82];
        assert!(Translator::new(Encoding::BINARY, Encoding::UTF8).is_passthrough());
        assert_eq!(Translator::new(Encoding::BINARY, Encoding::UTF8).convert(&data), data);
        assert_eq!(Translator::new(Encoding::SJIS, Encoding::BINARY).convert(&data), data);
        assert_eq!(Translator::new(Encoding::SJIS, Encoding::SJIS).convert(&data), data);
    }

    #[test]
    fn test_detect_facade() {
        assert_eq!(detect(&SJIS_HELLO, "AUTO").unwrap(), Some(Encoding::SJIS));
        assert_eq!(detect(&EUC_HELLO, Candidates::Auto).unwrap(), Some(Encoding::EUCJP));
        assert_eq!(detect(&JIS_HELLO, None::<&str>).unwrap(), Some(Encoding::JIS));
        assert_eq!(detect("こんにちは", "AUTO").unwrap(), Some(Encoding::UNICODE));
        assert_eq!(detect(&b""[..], "AUTO").unwrap(), None);
        assert_eq!(detect(&SJIS_HELLO, "UTF8").unwrap(), None);
        assert_eq!(detect(&SJIS_HELLO, " utf-8 , sjis ").unwrap(), Some(Encoding::SJIS));

        let names: &[&str] = &["EUCJP", "SJIS"];
        assert_eq!(detect(&EUC_HELLO, names).unwrap(), Some(Encoding::EUCJP));
        let encodings: &[Encoding] = &[Encoding::UTF8, Encoding::SJIS];
        assert_eq!(detect(&SJIS_HELLO, encodings).unwrap(), Some(Encoding::SJIS));

        assert_eq!(
            detect(&SJIS_HELLO, "SJIS,foo"),
            Err(Error::UnknownEncoding { name: "foo".into() })
        );
    }

    #[test]
    fn test_convert_facade() {
        let output = convert(&SJIS_HELLO, "EUCJP", Some("SJIS")).unwrap();
        assert_eq!(bytes(output), EUC_HELLO);

        // source detected
        let output = convert(&SJIS_HELLO, "UTF8", None).unwrap();
        assert_eq!(bytes(output), "こんにちは".as_bytes());
        let output = convert(&EUC_HELLO, "SJIS", Some("SJIS,EUCJP")).unwrap();
        assert_eq!(bytes(output), EUC_HELLO);

        let output = convert(&SJIS_HELLO, "UNICODE", Some("AUTO")).unwrap();
        assert_eq!(output, Output::Units(units("こんにちは")));
    }

    #[test]
    fn test_convert_text_input_defaults_to_string() {
        let output = convert("こんにちは", "SJIS", Some("UNICODE")).unwrap();
        assert_eq!(output, Output::Text(text::bytes_to_string(&SJIS_HELLO)));

        let options = ConvertOptions::new("SJIS").with_output(OutputType::Array);
        assert_eq!(bytes(convert_with("こんにちは", &options).unwrap()), SJIS_HELLO);
    }

    #[test]
    fn test_convert_output_types() {
        let options = ConvertOptions::new("UNICODE")
            .with_from("SJIS")
            .with_output(OutputType::String);
        assert_eq!(
            convert_with(&SJIS_HELLO, &options).unwrap(),
            Output::Text("こんにちは".into())
        );

        let options = ConvertOptions::new("EUCJP")
            .with_from("SJIS")
            .with_output(OutputType::ArrayBuffer);
        assert_eq!(
            convert_with(&SJIS_HELLO, &options).unwrap(),
            Output::Units(EUC_HELLO.iter().map(|&b| u16::from(b)).collect())
        );
    }

    #[test]
    fn test_convert_surrogate_pair_fallback() {
        let surrogates: &[u16] = &[0xD842, 0xDFB7];
        let utf8 = convert(surrogates, "UTF8", Some("UNICODE")).unwrap();
        assert_eq!(bytes(utf8), [0xF0, 0xA0, 0xAE, 0xB7]);

        let cases = [
            (FallbackPolicy::Placeholder, &b"?"[..]),
            (FallbackPolicy::HtmlEntity, &b"&#134071;"[..]),
            (FallbackPolicy::HtmlEntityHex, &b"&#x20bb7;"[..]),
            (FallbackPolicy::Ignore, &b""[..]),
        ];
        for (fallback, expected) in cases {
            let options = ConvertOptions::new("SJIS")
                .with_from("UNICODE")
                .with_fallback(fallback);
            assert_eq!(bytes(convert_with(surrogates, &options).unwrap()), expected);
        }
    }

    #[test]
    fn test_convert_utf16_bom() {
        let options = ConvertOptions::new("UTF16")
            .with_from("UNICODE")
            .with_bom(BomPolicy::LittleEndian);
        assert_eq!(
            bytes(convert_with(&units("あ"), &options).unwrap()),
            [0xFF, 0xFE, 0x42, 0x30]
        );

        let output = convert(&units("あ"), "UTF16", Some("UNICODE")).unwrap();
        assert_eq!(bytes(output), [0x30, 0x42]);

        let back = convert(&[0xFF, 0xFE, 0x42, 0x30], "UNICODE", Some("UTF16")).unwrap();
        assert_eq!(back, Output::Units(units("あ")));
    }

    #[test]
    fn test_wide_units_for_byte_source() {
        let output = convert(&units("あ"), "UTF8", Some("SJIS")).unwrap();
        assert_eq!(bytes(output), b"?");

        let wide: &[u16] = &[0x41, 0x82, 0xA0, 0x3042];
        let output = convert(wide, "UNICODE", Some("SJIS")).unwrap();
        assert_eq!(output, Output::Units(units("Aあ?")));
    }

    #[test]
    fn test_input_and_output_lengths_agree() {
        let text = "あ𠮷b";
        let input = Input::from(text);
        let output = Output::Text(text.to_string());
        assert_eq!(input.len(), 4);
        assert_eq!(output.len(), input.len());
        assert!(!output.is_empty());
        assert!(Output::Text(String::new()).is_empty());
    }

    #[test]
    fn test_convert_undetectable_passes_through() {
        let output = convert(&SJIS_HELLO, "EUCJP", Some("UTF8,ASCII")).unwrap();
        assert_eq!(bytes(output), SJIS_HELLO);
    }

    #[test]
    fn test_convert_errors() {
        assert_eq!(
            convert(&SJIS_HELLO, "KOI8-R", Some("SJIS")).unwrap_err(),
            Error::UnknownEncoding { name: "KOI8-R".into() }
        );
        assert!(matches!(
            convert_with(&SJIS_HELLO, &ConvertOptions::default()),
            Err(Error::InvalidOption { option: "to", .. })
        ));
    }

    #[test]
    fn test_object_options_win() {
        let object: ConvertOptions = serde_json::from_str(r#"{"to": "EUCJP"}"#).unwrap();
        let options = object.merge_over(ConvertOptions::new("UTF8").with_from("SJIS"));
        assert_eq!(bytes(convert_with(&SJIS_HELLO, &options).unwrap()), EUC_HELLO);
    }

    #[test]
    fn test_round_trip_through_every_unicode_form() {
        let text = "このテキストは JIS で書かれています。ﾆﾎﾝ 𠮷";
        let source = units(text);
        for to in [
            Encoding::UTF8,
            Encoding::UTF16,
            Encoding::UTF16BE,
            Encoding::UTF16LE,
            Encoding::UTF32,
            Encoding::UTF32BE,
            Encoding::UTF32LE,
        ] {
            let encoded = Translator::new(Encoding::UNICODE, to).translate(Input::Units(&source));
            let Output::Bytes(encoded) = encoded else {
                panic!("expected bytes for {to}");
            };
            let decoded = Translator::new(to, Encoding::UNICODE).translate(Input::Bytes(&encoded));
            assert_eq!(decoded, Output::Units(source.clone()), "{to}");
        }
    }
}
