//! Bounded Line Reader
//!
//! CRITICAL: The destination buffer is allocated once with a fixed
//! capacity and never grows. At most `capacity - 1` content bytes are
//! stored and the NUL terminator always lands inside the allocation,
//! no matter how long the incoming line is.
//!
//! Whatever does not fit is drained up to the next line terminator so
//! the following read starts on a fresh line.

use std::borrow::Cow;
use std::io::{self, BufRead};

use log::debug;
use thiserror::Error;

use super::utf8;
use crate::config::GuardConfig;
use crate::telemetry::audit_truncated;

const LINE_TERMINATOR: u8 = b'\n';

/// Fixed-capacity line buffer
pub struct InputBuffer {
    /// Pre-allocated storage, `capacity` bytes, never resized
    storage: Box<[u8]>,
    /// Content length, always `< storage.len()`
    len: usize,
    /// More input was on the line than fit
    truncated: bool,
}

impl InputBuffer {
    /// Create an empty buffer; `capacity` counts the terminator
    pub fn with_capacity(capacity: usize) -> Result<Self, ReadError> {
        if capacity == 0 {
            return Err(ReadError::ZeroCapacity);
        }

        Ok(Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
            truncated: false,
        })
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Largest number of content bytes this buffer can hold
    pub fn max_content_len(&self) -> usize {
        self.storage.len() - 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the last read dropped part of its line
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Content without the terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// Content followed by its NUL terminator
    pub fn as_bytes_with_terminator(&self) -> &[u8] {
        &self.storage[..=self.len]
    }

    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Empty the buffer for reuse; capacity is unchanged
    pub fn clear(&mut self) {
        self.len = 0;
        self.truncated = false;
        self.storage[0] = 0;
    }

    /// Bytes of free room before the terminator slot
    fn room(&self) -> usize {
        self.max_content_len() - self.len
    }

    /// Append bytes that are known to fit
    fn append(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= self.room());
        let end = self.len + bytes.len();
        self.storage[self.len..end].copy_from_slice(bytes);
        self.len = end;
    }

    fn terminate(&mut self) {
        self.storage[self.len] = 0;
    }
}

impl std::fmt::Debug for InputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputBuffer")
            .field("capacity", &self.capacity())
            .field("content", &self.to_string_lossy())
            .field("truncated", &self.truncated)
            .finish()
    }
}

/// Errors from a bounded read
#[derive(Debug, Error)]
pub enum ReadError {
    /// The source was exhausted before any byte of a new line arrived
    #[error("end of input")]
    EndOfInput,
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,
    #[error("input read failed: {0}")]
    Io(#[from] io::Error),
}

/// Where a single fill step left the current line
enum LineState {
    Open,
    Complete,
    Overflow,
}

/// Read one line from `source` into a new buffer of `capacity` bytes
pub fn read_line<R: BufRead + ?Sized>(
    source: &mut R,
    capacity: usize,
) -> Result<InputBuffer, ReadError> {
    let mut buffer = InputBuffer::with_capacity(capacity)?;
    fill_line(source, &mut buffer)?;
    Ok(buffer)
}

/// Read one line from `source` into `buffer`, replacing its content
pub fn fill_line<R: BufRead + ?Sized>(
    source: &mut R,
    buffer: &mut InputBuffer,
) -> Result<(), ReadError> {
    buffer.clear();
    let mut saw_input = false;

    loop {
        let room = buffer.room();
        let (used, state) = {
            let available = match source.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ReadError::Io(e)),
            };

            if available.is_empty() {
                if !saw_input {
                    return Err(ReadError::EndOfInput);
                }
                (0, LineState::Complete)
            } else {
                saw_input = true;
                // One byte past the room shows whether the line ends right at capacity
                let window = &available[..available.len().min(room + 1)];

                match window.iter().position(|&b| b == LINE_TERMINATOR) {
                    Some(pos) => {
                        buffer.append(&window[..pos]);
                        (pos + 1, LineState::Complete)
                    }
                    None if window.len() > room => {
                        buffer.append(&window[..room]);
                        (room, LineState::Overflow)
                    }
                    None => {
                        buffer.append(window);
                        (window.len(), LineState::Open)
                    }
                }
            }
        };
        source.consume(used);

        match state {
            LineState::Open => {}
            LineState::Complete => break,
            LineState::Overflow => {
                let kept = utf8::complete_prefix_len(buffer.as_bytes());
                buffer.len = kept;
                buffer.truncated = true;
                // Kept content stays terminated even if the drain fails
                buffer.terminate();
                source.skip_until(LINE_TERMINATOR)?;
                debug!(
                    "Line exceeded {} byte buffer, kept {} bytes and drained the rest",
                    buffer.capacity(),
                    buffer.len
                );
                break;
            }
        }
    }

    buffer.terminate();
    Ok(())
}

/// Line reader bound to one source and one capacity
pub struct BoundedLineReader<R> {
    source: R,
    capacity: usize,
    /// Emit an audit event when a line is truncated
    audit: bool,
}

impl<R: BufRead> BoundedLineReader<R> {
    /// Create a reader producing buffers of `capacity` bytes
    pub fn new(source: R, capacity: usize) -> Result<Self, ReadError> {
        if capacity == 0 {
            return Err(ReadError::ZeroCapacity);
        }

        Ok(Self {
            source,
            capacity,
            audit: false,
        })
    }

    /// Create a reader using the configured capacity and audit setting
    pub fn from_config(source: R, config: &GuardConfig) -> Result<Self, ReadError> {
        let mut reader = Self::new(source, config.input_capacity)?;
        reader.audit = config.audit_enabled;
        Ok(reader)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read the next line into a fresh buffer
    pub fn read_line(&mut self) -> Result<InputBuffer, ReadError> {
        let mut buffer = InputBuffer::with_capacity(self.capacity)?;
        self.read_into(&mut buffer)?;
        Ok(buffer)
    }

    /// Read the next line into a caller-owned buffer, bounded by its capacity
    pub fn read_into(&mut self, buffer: &mut InputBuffer) -> Result<(), ReadError> {
        fill_line(&mut self.source, buffer)?;

        if buffer.is_truncated() && self.audit {
            audit_truncated(buffer.capacity(), buffer.len()).emit();
        }

        Ok(())
    }

    /// Give back the underlying source
    pub fn into_inner(self) -> R {
        self.source
    }
}
