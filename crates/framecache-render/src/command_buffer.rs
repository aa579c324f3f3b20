#![forbid(unsafe_code)]

//! Bounded, append-only command storage for one frame.
//!
//! # Invariants
//!
//! 1. `bytes.len() <= capacity` at all times; the backing allocation is made
//!    once and never grows.
//! 2. A push either writes a whole record or nothing.
//! 3. `bytes` is always a sequence of complete, decodable records.

use tracing::warn;

use crate::command::Command;
use crate::error::RecordError;

/// Default capacity: 512 KiB.
pub const DEFAULT_CAPACITY: usize = 512 * 1024;

/// One decoded record plus the raw bytes it was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub command: Command<'a>,
    pub bytes: &'a [u8],
}

/// Fixed-capacity byte buffer of encoded commands.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    bytes: Vec<u8>,
    capacity: usize,
    commands: usize,
    dropped: usize,
    free_requests: usize,
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl CommandBuffer {
    /// Create a buffer holding at most `capacity` bytes of records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
            commands: 0,
            dropped: 0,
            free_requests: 0,
        }
    }

    /// Append a command.
    ///
    /// If the record does not fit, the buffer is left untouched, a warning is
    /// logged, and the command is counted as dropped.
    pub fn push(&mut self, command: &Command<'_>) -> Result<(), RecordError> {
        let needed = command.encoded_len();
        let remaining = self.remaining();
        if needed > remaining || u32::try_from(needed).is_err() {
            self.dropped += 1;
            warn!(needed, remaining, "exhausted command buffer, dropping command");
            return Err(RecordError::BufferExhausted { needed, remaining });
        }
        command.encode(&mut self.bytes);
        debug_assert!(self.bytes.len() <= self.capacity);
        self.commands += 1;
        if matches!(command, Command::FreeFont { .. }) {
            self.free_requests += 1;
        }
        Ok(())
    }

    /// Iterate records in the order they were recorded.
    #[inline]
    pub fn iter(&self) -> Records<'_> {
        Records {
            rest: &self.bytes,
        }
    }

    /// Drop all records. Keeps the allocation.
    pub fn reset(&mut self) {
        self.bytes.clear();
        self.commands = 0;
        self.dropped = 0;
        self.free_requests = 0;
    }

    /// Write cursor in bytes.
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of commands recorded this frame.
    #[inline]
    pub fn command_count(&self) -> usize {
        self.commands
    }

    /// Number of commands dropped for lack of space this frame.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Whether any `FreeFont` was recorded this frame.
    #[inline]
    pub fn has_free_requests(&self) -> bool {
        self.free_requests > 0
    }
}

impl<'a> IntoIterator for &'a CommandBuffer {
    type Item = Record<'a>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the records of a [`CommandBuffer`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let Some((command, size)) = Command::decode(self.rest) else {
            debug_assert!(false, "command buffer holds a malformed record");
            self.rest = &[];
            return None;
        };
        let (bytes, rest) = self.rest.split_at(size);
        self.rest = rest;
        Some(Record { command, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecache_core::{Color, FontId, Rect};

    fn rect_cmd(x: i32) -> Command<'static> {
        Command::DrawRect {
            rect: Rect::new(x, 0, 10, 10),
            color: Color::RED,
        }
    }

    #[test]
    fn records_come_back_in_order() {
        let mut buf = CommandBuffer::with_capacity(1024);
        buf.push(&rect_cmd(1)).unwrap();
        buf.push(&Command::SetClip {
            rect: Rect::new(0, 0, 5, 5),
        })
        .unwrap();
        buf.push(&rect_cmd(2)).unwrap();

        let cmds: Vec<_> = buf.iter().map(|r| r.command).collect();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[0], rect_cmd(1));
        assert_eq!(cmds[2], rect_cmd(2));
        assert_eq!(buf.command_count(), 3);
    }

    #[test]
    fn record_bytes_match_encoding() {
        let mut buf = CommandBuffer::with_capacity(1024);
        buf.push(&rect_cmd(7)).unwrap();
        let record = buf.iter().next().unwrap();
        let mut expected = Vec::new();
        rect_cmd(7).encode(&mut expected);
        assert_eq!(record.bytes, expected.as_slice());
    }

    #[test]
    fn overflow_is_rejected_without_partial_write() {
        let one = rect_cmd(0).encoded_len();
        let mut buf = CommandBuffer::with_capacity(one * 2 + one / 2);
        buf.push(&rect_cmd(0)).unwrap();
        buf.push(&rect_cmd(1)).unwrap();
        let before = buf.len_bytes();

        let err = buf.push(&rect_cmd(2)).unwrap_err();
        assert_eq!(
            err,
            RecordError::BufferExhausted {
                needed: one,
                remaining: one / 2
            }
        );
        assert_eq!(buf.len_bytes(), before);
        assert_eq!(buf.dropped(), 1);
        assert_eq!(buf.iter().count(), 2);
    }

    #[test]
    fn small_record_still_fits_after_large_one_is_dropped() {
        let mut buf = CommandBuffer::with_capacity(64);
        let text = "x".repeat(100);
        let big = Command::DrawText {
            rect: Rect::new(0, 0, 800, 16),
            color: Color::WHITE,
            font: FontId::new(0, 0),
            tab_width: 8,
            text: &text,
        };
        assert!(buf.push(&big).is_err());
        assert!(buf.push(&rect_cmd(0)).is_ok());
        assert_eq!(buf.iter().count(), 1);
    }

    #[test]
    fn reset_keeps_capacity_and_clears_flags() {
        let mut buf = CommandBuffer::with_capacity(256);
        buf.push(&Command::FreeFont {
            font: FontId::new(3, 0),
        })
        .unwrap();
        assert!(buf.has_free_requests());
        buf.reset();
        assert!(buf.is_empty());
        assert!(!buf.has_free_requests());
        assert_eq!(buf.remaining(), 256);
        assert_eq!(buf.command_count(), 0);
    }
}
