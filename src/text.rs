//! Conversion between code unit buffers and strings
//!
//! Large buffers are materialized in chunks of [`APPLY_BUFFER_SIZE`] units.
//! Each chunk is decoded in bulk with [`String::from_utf16`]; a chunk holding
//! a lone surrogate is decoded unit by unit instead, replacing the surrogate
//! with U+FFFD. Once a bulk decode has failed the process stops trying the
//! bulk path. Both paths produce the same string for well-formed input.

use std::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of code units decoded in one step
pub const APPLY_BUFFER_SIZE: usize = 65533;

const UNPROBED: u8 = 0;
const BULK: u8 = 1;
const UNIT_BY_UNIT: u8 = 2;

static STRATEGY: AtomicU8 = AtomicU8::new(UNPROBED);

/// End of the next chunk starting at `start`, moved back one unit rather
/// than separating a high surrogate from its low half.
fn chunk_end(units: &[u16], start: usize) -> usize {
    let end = (start + APPLY_BUFFER_SIZE).min(units.len());
    if end < units.len() && end > start + 1 && (0xD800..=0xDBFF).contains(&units[end - 1]) {
        end - 1
    } else {
        end
    }
}

fn decode_lossy(chunk: &[u16], output: &mut String) {
    output.extend(
        char::decode_utf16(chunk.iter().copied())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

/// Build a string from UTF-16 code units
pub fn code_to_string(units: &[u16]) -> String {
    let mut output = String::with_capacity(units.len());
    let mut start = 0;
    while start < units.len() {
        let end = chunk_end(units, start);
        let chunk = &units[start..end];

        if STRATEGY.load(Ordering::Relaxed) == UNIT_BY_UNIT {
            decode_lossy(chunk, &mut output);
        } else {
            match String::from_utf16(chunk) {
                Ok(decoded) => {
                    let _ = STRATEGY.compare_exchange(
                        UNPROBED,
                        BULK,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    );
                    output.push_str(&decoded);
                }
                Err(_) => {
                    STRATEGY.store(UNIT_BY_UNIT, Ordering::Relaxed);
                    decode_lossy(chunk, &mut output);
                }
            }
        }
        start = end;
    }
    output
}

/// Explode a string into UTF-16 code units
pub fn string_to_code(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Build a string with one character per byte value
pub fn bytes_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
