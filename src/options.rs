//! Conversion options
//!
//! [`ConvertOptions`] is the object form of a conversion request. It can be
//! built in code or deserialized from JSON, which is how the CLI's
//! `--options` flag supplies it. The policy enums parse from the same
//! strings in both places.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::{Error, Result};

/// What to emit for a character the target encoding cannot represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum FallbackPolicy {
    /// A single `?`
    #[default]
    Placeholder,
    /// A decimal character reference, `&#134071;`
    HtmlEntity,
    /// A lowercase hexadecimal character reference, `&#x20bb7;`
    HtmlEntityHex,
    /// Nothing; the character is dropped
    Ignore,
}

impl FallbackPolicy {
    /// Append the replacement for `code_point` to `out`
    pub fn write(self, code_point: u32, out: &mut Vec<u8>) {
        match self {
            FallbackPolicy::Placeholder => out.push(b'?'),
            FallbackPolicy::HtmlEntity => out.extend_from_slice(format!("&#{code_point};").as_bytes()),
            FallbackPolicy::HtmlEntityHex => {
                out.extend_from_slice(format!("&#x{code_point:x};").as_bytes())
            }
            FallbackPolicy::Ignore => {}
        }
    }

    /// Option string for this policy
    pub fn name(self) -> &'static str {
        match self {
            FallbackPolicy::Placeholder => "placeholder",
            FallbackPolicy::HtmlEntity => "html-entity",
            FallbackPolicy::HtmlEntityHex => "html-entity-hex",
            FallbackPolicy::Ignore => "ignore",
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "placeholder" => Ok(FallbackPolicy::Placeholder),
            "html-entity" => Ok(FallbackPolicy::HtmlEntity),
            "html-entity-hex" => Ok(FallbackPolicy::HtmlEntityHex),
            "ignore" | "error" => Ok(FallbackPolicy::Ignore),
            _ => Err(Error::InvalidOption {
                option: "fallback",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for FallbackPolicy {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order mark handling for UTF-16 and UTF-32 output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "BomValue")]
pub enum BomPolicy {
    /// No mark; output is big-endian
    #[default]
    None,
    /// Big-endian output preceded by its mark
    BigEndian,
    /// Little-endian output preceded by its mark
    LittleEndian,
}

impl BomPolicy {
    /// Whether output is little-endian under this policy
    pub fn is_little_endian(self) -> bool {
        self == BomPolicy::LittleEndian
    }
}

impl From<bool> for BomPolicy {
    fn from(flag: bool) -> Self {
        if flag {
            BomPolicy::BigEndian
        } else {
            BomPolicy::None
        }
    }
}

impl FromStr for BomPolicy {
    type Err = Error;

    /// `true` and anything starting with `B` select big-endian, empty,
    /// `false` and `none` disable the mark, anything else is little-endian.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("none") {
            Ok(BomPolicy::None)
        } else if s.eq_ignore_ascii_case("true") || s.starts_with(['B', 'b']) {
            Ok(BomPolicy::BigEndian)
        } else {
            Ok(BomPolicy::LittleEndian)
        }
    }
}

/// `bom` accepts a flag or a byte order name
#[derive(Deserialize)]
#[serde(untagged)]
enum BomValue {
    Flag(bool),
    Name(String),
}

impl TryFrom<BomValue> for BomPolicy {
    type Error = Error;

    fn try_from(value: BomValue) -> Result<Self> {
        match value {
            BomValue::Flag(flag) => Ok(flag.into()),
            BomValue::Name(name) => name.parse(),
        }
    }
}

/// Shape of a conversion result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum OutputType {
    /// Bytes for byte encodings, code units for `UNICODE`
    #[default]
    Array,
    /// A string built from the result values
    String,
    /// Fixed-width 16-bit units
    ArrayBuffer,
}

impl FromStr for OutputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "array" => Ok(OutputType::Array),
            "string" => Ok(OutputType::String),
            "arraybuffer" => Ok(OutputType::ArrayBuffer),
            _ => Err(Error::InvalidOption {
                option: "type",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for OutputType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Object form of a conversion request.
///
/// ```
/// use jisconv::options::{ConvertOptions, FallbackPolicy};
///
/// let options: ConvertOptions =
///     serde_json::from_str(r#"{"to": "SJIS", "fallback": "html-entity"}"#).unwrap();
/// assert_eq!(options.to.as_deref(), Some("SJIS"));
/// assert_eq!(options.fallback, Some(FallbackPolicy::HtmlEntity));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Target encoding name
    pub to: Option<String>,
    /// Source encoding name, `AUTO`, or a comma separated candidate list
    pub from: Option<String>,
    /// Result shape
    #[serde(rename = "type")]
    pub output: Option<OutputType>,
    /// Policy for unrepresentable characters
    pub fallback: Option<FallbackPolicy>,
    /// Byte order mark policy for UTF-16/UTF-32 output
    pub bom: Option<BomPolicy>,
}

impl ConvertOptions {
    /// Options converting to `to`, everything else at defaults
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: Some(to.into()),
            ..Self::default()
        }
    }

    /// Set the source encoding or candidate list
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the result shape
    pub fn with_output(mut self, output: OutputType) -> Self {
        self.output = Some(output);
        self
    }

    /// Set the fallback policy
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Set the byte order mark policy
    pub fn with_bom(mut self, bom: BomPolicy) -> Self {
        self.bom = Some(bom);
        self
    }

    /// Combine with `base`, keeping every field set on `self`
    pub fn merge_over(self, base: ConvertOptions) -> ConvertOptions {
        ConvertOptions {
            to: self.to.or(base.to),
            from: self.from.or(base.from),
            output: self.output.or(base.output),
            fallback: self.fallback.or(base.fallback),
            bom: self.bom.or(base.bom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_write() {
        let mut out = Vec::new();
        FallbackPolicy::Placeholder.write(0x20BB7, &mut out);
        FallbackPolicy::HtmlEntity.write(0x20BB7, &mut out);
        FallbackPolicy::HtmlEntityHex.write(0x20BB7, &mut out);
        FallbackPolicy::Ignore.write(0x20BB7, &mut out);
        assert_eq!(out, b"?&#134071;&#x20bb7;");
    }

    #[test]
    fn test_fallback_parse() {
        assert_eq!("html-entity".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::HtmlEntity);
        assert_eq!("HTML-Entity-Hex".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::HtmlEntityHex);
        assert_eq!("ignore".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Ignore);
        assert_eq!("error".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Ignore);
        assert!(matches!(
            "entity".parse::<FallbackPolicy>(),
            Err(Error::InvalidOption { option: "fallback", .. })
        ));
    }

    #[test]
    fn test_bom_parse() {
        assert_eq!("BE".parse::<BomPolicy>().unwrap(), BomPolicy::BigEndian);
        assert_eq!("big".parse::<BomPolicy>().unwrap(), BomPolicy::BigEndian);
        assert_eq!("true".parse::<BomPolicy>().unwrap(), BomPolicy::BigEndian);
        assert_eq!("LE".parse::<BomPolicy>().unwrap(), BomPolicy::LittleEndian);
        assert_eq!("".parse::<BomPolicy>().unwrap(), BomPolicy::None);
        assert_eq!(BomPolicy::from(true), BomPolicy::BigEndian);
        assert_eq!(BomPolicy::from(false), BomPolicy::None);
    }

    #[test]
    fn test_output_type_parse() {
        assert_eq!("ArrayBuffer".parse::<OutputType>().unwrap(), OutputType::ArrayBuffer);
        assert_eq!("string".parse::<OutputType>().unwrap(), OutputType::String);
        assert!("buffer".parse::<OutputType>().is_err());
    }

    #[test]
    fn test_deserialize_options() {
        let options: ConvertOptions = serde_json::from_str(
            r#"{"to": "UTF16", "from": "SJIS,EUCJP", "type": "string", "bom": "LE"}"#,
        )
        .unwrap();
        assert_eq!(options.to.as_deref(), Some("UTF16"));
        assert_eq!(options.from.as_deref(), Some("SJIS,EUCJP"));
        assert_eq!(options.output, Some(OutputType::String));
        assert_eq!(options.bom, Some(BomPolicy::LittleEndian));
        assert_eq!(options.fallback, None);

        let options: ConvertOptions = serde_json::from_str(r#"{"bom": true}"#).unwrap();
        assert_eq!(options.bom, Some(BomPolicy::BigEndian));

        assert!(serde_json::from_str::<ConvertOptions>(r#"{"fallback": "nope"}"#).is_err());
    }

    #[test]
    fn test_merge_over() {
        let base = ConvertOptions::new("SJIS")
            .with_from("UTF8")
            .with_fallback(FallbackPolicy::Ignore);
        let merged = ConvertOptions::new("EUCJP").merge_over(base);
        assert_eq!(merged.to.as_deref(), Some("EUCJP"));
        assert_eq!(merged.from.as_deref(), Some("UTF8"));
        assert_eq!(merged.fallback, Some(FallbackPolicy::Ignore));
        assert_eq!(merged.output, None);
    }
}
