//! JIS X 0208 and JIS X 0212 conversion tables
//!
//! JIS codes are stored as `(lead << 8) | trail` with both bytes in the
//! 7-bit `0x21..` range, the row/cell form used on the wire by ISO-2022-JP.
//! Shift_JIS and EUC-JP reach these codes through byte arithmetic, so only
//! the JIS <-> Unicode step needs a table.

use std::collections::HashMap;
use std::sync::OnceLock;

use encoding_index_japanese::{jis0208, jis0212};

/// Pointers covered by the JIS X 0208 index, including the vendor rows
/// addressed by Shift_JIS lead bytes `F0..FC`.
const JIS0208_POINTERS: u16 = 11104;
/// Pointers covered by the JIS X 0212 index (94 rows of 94 cells).
const JIS0212_POINTERS: u16 = 94 * 94;
/// The index returns this for unassigned pointers.
const UNASSIGNED: u32 = 0xFFFF;

static TABLES: OnceLock<JisTables> = OnceLock::new();

/// Bidirectional JIS <-> Unicode tables, built once per process.
#[derive(Debug)]
pub struct JisTables {
    unicode_to_jis0208: HashMap<u32, u16>,
    unicode_to_jis0212: HashMap<u32, u16>,
    jis0208_to_unicode: HashMap<u16, u32>,
    jis0212_to_unicode: HashMap<u16, u32>,
}

impl JisTables {
    /// Shared tables, building them on first use.
    pub fn get() -> &'static JisTables {
        TABLES.get_or_init(JisTables::build)
    }

    fn build() -> Self {
        let unicode_to_jis0208 = forward_table(JIS0208_POINTERS, jis0208::forward);
        let unicode_to_jis0212 = forward_table(JIS0212_POINTERS, jis0212::forward);

        let mut jis0208_to_unicode = invert(&unicode_to_jis0208);
        // Vendor duplicates lose the forward slot but must still decode.
        for pointer in 0..JIS0208_POINTERS {
            let code_point = jis0208::forward(pointer);
            if code_point != UNASSIGNED {
                jis0208_to_unicode
                    .entry(pointer_to_jis(pointer))
                    .or_insert(code_point);
            }
        }
        let jis0212_to_unicode = invert(&unicode_to_jis0212);

        Self {
            unicode_to_jis0208,
            unicode_to_jis0212,
            jis0208_to_unicode,
            jis0212_to_unicode,
        }
    }

    /// JIS X 0208 code for a Unicode scalar value.
    #[inline]
    pub fn jis0208(&self, code_point: u32) -> Option<u16> {
        self.unicode_to_jis0208.get(&code_point).copied()
    }

    /// JIS X 0212 code for a Unicode scalar value.
    #[inline]
    pub fn jis0212(&self, code_point: u32) -> Option<u16> {
        self.unicode_to_jis0212.get(&code_point).copied()
    }

    /// Unicode scalar value for a JIS X 0208 code.
    #[inline]
    pub fn from_jis0208(&self, jis: u16) -> Option<u32> {
        self.jis0208_to_unicode.get(&jis).copied()
    }

    /// Unicode scalar value for a JIS X 0212 code.
    #[inline]
    pub fn from_jis0212(&self, jis: u16) -> Option<u32> {
        self.jis0212_to_unicode.get(&jis).copied()
    }
}

/// Row/cell code for a 0-based index pointer.
fn pointer_to_jis(pointer: u16) -> u16 {
    let row = pointer / 94;
    let cell = pointer % 94;
    ((row + 0x21) << 8) | (cell + 0x21)
}

/// Unicode -> JIS map. The lowest pointer wins for characters listed twice.
fn forward_table(pointers: u16, lookup: fn(u16) -> u32) -> HashMap<u32, u16> {
    let mut table = HashMap::with_capacity(pointers as usize);
    for pointer in 0..pointers {
        let code_point = lookup(pointer);
        if code_point != UNASSIGNED {
            table.entry(code_point).or_insert_with(|| pointer_to_jis(pointer));
        }
    }
    table
}

fn invert(table: &HashMap<u32, u16>) -> HashMap<u16, u32> {
    table.iter().map(|(&unicode, &jis)| (jis, unicode)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_to_jis() {
        assert_eq!(pointer_to_jis(0), 0x2121);
        assert_eq!(pointer_to_jis(93), 0x217E);
        assert_eq!(pointer_to_jis(94), 0x2221);
    }

    #[test]
    fn test_jis0208_lookups() {
        let tables = JisTables::get();
        // あ, 日, 。
        assert_eq!(tables.jis0208(0x3042), Some(0x2422));
        assert_eq!(tables.jis0208(0x65E5), Some(0x467C));
        assert_eq!(tables.jis0208(0x3002), Some(0x2123));
        assert_eq!(tables.from_jis0208(0x2422), Some(0x3042));
        assert_eq!(tables.from_jis0208(0x3D71), Some(0x66F8));
        assert_eq!(tables.jis0208(0x20BB7), None);
    }

    #[test]
    fn test_jis0212_lookups() {
        let tables = JisTables::get();
        assert_eq!(tables.jis0208(0x736C), None);
        assert_eq!(tables.jis0212(0x736C), Some(0x4B46));
        assert_eq!(tables.from_jis0212(0x4B46), Some(0x736C));
    }

    #[test]
    fn test_tables_round_trip() {
        let tables = JisTables::get();
        for (&unicode, &jis) in &tables.unicode_to_jis0208 {
            assert_eq!(tables.from_jis0208(jis), Some(unicode));
        }
        for (&unicode, &jis) in &tables.unicode_to_jis0212 {
            assert_eq!(tables.from_jis0212(jis), Some(unicode));
        }
    }

    #[test]
    fn test_repeated_init_returns_same_tables() {
        assert!(std::ptr::eq(JisTables::get(), JisTables::get()));
    }
}
