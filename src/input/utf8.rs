//! UTF-8 Boundary Helpers
//!
//! A byte-capacity buffer can fill up in the middle of a multi-byte
//! character. These helpers find the last complete character so a
//! truncated line never ends in a partial sequence.
//!
//! A UTF-8 character can be 1-4 bytes:
//! - 1 byte:  0xxxxxxx (ASCII)
//! - 2 bytes: 110xxxxx 10xxxxxx
//! - 3 bytes: 1110xxxx 10xxxxxx 10xxxxxx
//! - 4 bytes: 11110xxx 10xxxxxx 10xxxxxx 10xxxxxx

/// Check if byte is a UTF-8 continuation byte (10xxxxxx)
#[inline]
pub fn is_continuation(byte: u8) -> bool {
    (byte & 0b11000000) == 0b10000000
}

/// Get expected length of UTF-8 sequence from first byte
#[inline]
pub fn sequence_length(first_byte: u8) -> usize {
    match first_byte {
        0x00..=0x7F => 1, // ASCII
        0xC0..=0xDF => 2, // 2-byte sequence
        0xE0..=0xEF => 3, // 3-byte sequence
        0xF0..=0xF7 => 4, // 4-byte sequence
        _ => 1,           // Invalid, treat as single byte
    }
}

/// Length of `bytes` once a trailing incomplete sequence is cut off.
///
/// Only the last four bytes are examined. Bytes that are not UTF-8 at all
/// are left alone; this only guards against splitting a character.
pub fn complete_prefix_len(bytes: &[u8]) -> usize {
    let mut i = bytes.len();
    while i > 0 && i > bytes.len().saturating_sub(4) {
        i -= 1;
        if !is_continuation(bytes[i]) {
            let expected_len = sequence_length(bytes[i]);
            let available = bytes.len() - i;

            if available < expected_len {
                return i;
            }
            break;
        }
    }

    bytes.len()
}
