//! Tautology Injection Detection Module
//!
//! Looks for the classic always-true disjunction appended to a WHERE
//! clause (`... WHERE name='x' OR 1=1`) and reports it when both sides
//! of the comparison are the same text. Nothing is special-cased: `2=2`
//! and `'hack'='hack'` are caught the same way as `1=1`.
//!
//! Only the first `OR` after the first `WHERE`, and the first `=` after
//! that `OR`, are examined. Other operators (`LIKE`, `<>`) are ignored.

use std::fmt;

const WHERE_MARKER: &str = "where";
const OR_MARKER: &str = "or";
const QUOTE: u8 = b'\'';
const EQUALS: u8 = b'=';
const TERMINATOR: u8 = b';';

/// Outcome of inspecting one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TautologyFinding {
    /// No always-true comparison found
    Clean,
    /// `OR <left> = <right>` with identical operands
    Detected {
        /// Trimmed, lower-cased text before the `=`
        left_operand: String,
        /// Trimmed, lower-cased text after the `=`
        right_operand: String,
    },
}

impl TautologyFinding {
    pub fn is_detected(&self) -> bool {
        matches!(self, TautologyFinding::Detected { .. })
    }

    /// Matched operands, if any
    pub fn operands(&self) -> Option<(&str, &str)> {
        match self {
            TautologyFinding::Clean => None,
            TautologyFinding::Detected {
                left_operand,
                right_operand,
            } => Some((left_operand, right_operand)),
        }
    }
}

impl fmt::Display for TautologyFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TautologyFinding::Clean => write!(f, "no tautology"),
            TautologyFinding::Detected {
                left_operand,
                right_operand,
            } => write!(
                f,
                "tautology attack using 'OR {}={}'",
                left_operand, right_operand
            ),
        }
    }
}

/// Stateless tautology detector
#[derive(Debug, Clone, Copy, Default)]
pub struct TautologyGuard;

impl TautologyGuard {
    pub fn new() -> Self {
        Self
    }

    /// Inspect a statement; the input is never modified
    pub fn inspect(&self, statement: &str) -> TautologyFinding {
        let lowered = statement.to_lowercase();

        match compared_operands(&lowered) {
            Some((left, right)) if left == right => {
                TautologyFinding::Detected {
                    left_operand: left.to_string(),
                    right_operand: right.to_string(),
                }
            }
            _ => TautologyFinding::Clean,
        }
    }
}

/// Trimmed operands of the first `OR x = y` following the first `WHERE`
fn compared_operands(lowered: &str) -> Option<(&str, &str)> {
    let where_pos = find_keyword(lowered, 0, WHERE_MARKER)?;
    let or_pos = find_keyword(lowered, where_pos + WHERE_MARKER.len(), OR_MARKER)?;

    let left_start = or_pos + OR_MARKER.len();
    let eq_pos = find_unquoted(lowered, left_start, EQUALS)?;

    let right_start = eq_pos + 1;
    let right_end = find_unquoted(lowered, right_start, TERMINATOR).unwrap_or(lowered.len());

    Some((
        lowered[left_start..eq_pos].trim(),
        lowered[right_start..right_end].trim(),
    ))
}

/// Byte offsets at or after `from` that sit outside single-quoted literals.
///
/// `from` must itself be outside a literal. An escaped quote (`''`) toggles
/// twice and so needs no special handling.
fn unquoted_offsets(bytes: &[u8], from: usize) -> impl Iterator<Item = usize> + '_ {
    let mut in_literal = false;
    (from..bytes.len()).filter(move |&i| {
        if bytes[i] == QUOTE {
            in_literal = !in_literal;
            return false;
        }
        !in_literal
    })
}

fn find_unquoted(text: &str, from: usize, needle: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    unquoted_offsets(bytes, from).find(|&i| bytes[i] == needle)
}

/// First standalone `keyword` at or after `from`, outside literals
fn find_keyword(text: &str, from: usize, keyword: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let needle = keyword.as_bytes();

    unquoted_offsets(bytes, from).find(|&i| {
        let end = i + needle.len();
        bytes[i..].starts_with(needle)
            && (i == 0 || !is_word_byte(bytes[i - 1]))
            && bytes.get(end).map_or(true, |&b| !is_word_byte(b))
    })
}

/// Identifier characters; any non-ASCII byte counts as part of a word
#[inline]
fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || !byte.is_ascii()
}
