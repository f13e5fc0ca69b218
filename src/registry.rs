//! Encoding names, aliases and the detection preference order
//!
//! Names are matched after uppercasing and removing every character that is
//! not `A-Z` or `0-9`, so `"Shift_JIS"`, `"shift-jis"` and `"SHIFTJIS"` are
//! the same query. Names that are not registered fall back to a fuzzy match
//! on the longest shared prefix or suffix, which resolves vendor spellings
//! such as `"eucJP-open"` or `"SJIS-win"`.

use crate::Encoding;

/// Alias table in lookup order. Ties in fuzzy matching go to the earlier entry.
static ALIASES: &[(&str, Encoding)] = &[
    ("UTF32", Encoding::UTF32),
    ("UTF32BE", Encoding::UTF32BE),
    ("UCS4", Encoding::UTF32BE),
    ("UTF32LE", Encoding::UTF32LE),
    ("UTF16", Encoding::UTF16),
    ("UTF16BE", Encoding::UTF16BE),
    ("UCS2", Encoding::UTF16BE),
    ("UTF16LE", Encoding::UTF16LE),
    ("BINARY", Encoding::BINARY),
    ("ASCII", Encoding::ASCII),
    ("ISO646", Encoding::ASCII),
    ("CP367", Encoding::ASCII),
    ("USASCII", Encoding::ASCII),
    ("JIS", Encoding::JIS),
    ("ISO2022JP", Encoding::JIS),
    ("UTF8", Encoding::UTF8),
    ("EUCJP", Encoding::EUCJP),
    ("SJIS", Encoding::SJIS),
    ("SHIFTJIS", Encoding::SJIS),
    ("CP932", Encoding::SJIS),
    ("MSKANJI", Encoding::SJIS),
    ("WINDOWS31J", Encoding::SJIS),
    ("UNICODE", Encoding::UNICODE),
];

/// Encodings tried by auto-detection, cheapest and most specific first.
static PREFERENCE_ORDER: &[Encoding] = &[
    Encoding::UTF32,
    Encoding::UTF16,
    Encoding::BINARY,
    Encoding::ASCII,
    Encoding::JIS,
    Encoding::UTF8,
    Encoding::EUCJP,
    Encoding::SJIS,
    Encoding::UNICODE,
];

/// Uppercase `name` and drop everything outside `[A-Z0-9]`.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Resolve a free-form encoding name to its canonical encoding.
///
/// Exact alias matches win. Otherwise every alias is scored by the longer of
/// its common prefix and common suffix with the normalized query, and the
/// best score wins (first alias on ties). Returns `None` when the query is
/// empty after normalization or shares no leading or trailing character with
/// any alias.
///
/// ```
/// use jisconv::{Encoding, registry::canonicalize};
///
/// assert_eq!(canonicalize("Shift_JIS"), Some(Encoding::SJIS));
/// assert_eq!(canonicalize("eucJP-open"), Some(Encoding::EUCJP));
/// assert_eq!(canonicalize("ucs-2"), Some(Encoding::UTF16BE));
/// ```
pub fn canonicalize(name: &str) -> Option<Encoding> {
    let expect = normalize(name);
    if expect.is_empty() {
        return None;
    }

    if let Some(&(_, encoding)) = ALIASES.iter().find(|(alias, _)| *alias == expect) {
        return Some(encoding);
    }

    let query = expect.as_bytes();
    let mut best: Option<(usize, Encoding)> = None;
    for &(alias, encoding) in ALIASES {
        let alias = alias.as_bytes();
        let score = common_prefix(alias, query).max(common_suffix(alias, query));
        if score > 0 && best.is_none_or(|(hit, _)| score > hit) {
            best = Some((score, encoding));
        }
    }

    best.map(|(_, encoding)| encoding)
}

/// Encodings tried, in order, when detection has no caller-supplied candidates.
pub fn preference_order() -> &'static [Encoding] {
    PREFERENCE_ORDER
}

/// Every registered alias of `encoding`, canonical name first.
pub fn aliases_of(encoding: Encoding) -> Vec<&'static str> {
    ALIASES
        .iter()
        .filter(|(_, e)| *e == encoding)
        .map(|(alias, _)| *alias)
        .collect()
}
