//! Bounded input module
//!
//! This module provides:
//! - A fixed-capacity line buffer that never grows
//! - A line reader that truncates and drains overlong lines
//! - UTF-8 boundary helpers so truncation never splits a character

pub mod bounded_reader;
pub mod utf8;

pub use bounded_reader::{fill_line, read_line, BoundedLineReader, InputBuffer, ReadError};
