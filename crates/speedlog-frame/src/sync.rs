//! Byte-level marker search.
//!
//! The detector keeps the last (up to) four qualifying bytes and compares
//! them, read little-endian, against [`MARKER`]. Bytes outside
//! [`SYNC_ALPHABET`](crate::layout::SYNC_ALPHABET) are skipped entirely: they
//! are neither pushed nor do they break a partially filled window.

use crate::layout::{is_sync_byte, MARKER, MARKER_SIZE};

/// FIFO of the most recent qualifying bytes, at most [`MARKER_SIZE`] long.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteWindow {
    bytes: [u8; MARKER_SIZE],
    len: usize,
}

impl ByteWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a byte, evicting the oldest one if the window is full.
    pub fn push(&mut self, byte: u8) {
        if self.is_full() {
            self.evict_oldest();
        }
        self.bytes[self.len] = byte;
        self.len += 1;
    }

    /// Drop the oldest byte, if any.
    pub fn evict_oldest(&mut self) {
        if self.len == 0 {
            return;
        }
        self.bytes.copy_within(1..self.len, 0);
        self.len -= 1;
    }

    /// The window read as a little-endian u32, once it holds four bytes.
    pub fn value(&self) -> Option<u32> {
        self.is_full().then(|| u32::from_le_bytes(self.bytes))
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MARKER_SIZE
    }

    /// Current contents, oldest first.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Sliding-window marker detector.
#[derive(Debug, Clone, Default)]
pub struct SyncDetector {
    window: ByteWindow,
}

impl SyncDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte from the stream.
    ///
    /// Returns true exactly when this byte completes a marker. The window is
    /// cleared on a match, so marker bytes never count towards the next one.
    pub fn observe(&mut self, byte: u8) -> bool {
        if !is_sync_byte(byte) {
            return false;
        }

        self.window.push(byte);
        match self.window.value() {
            Some(MARKER) => {
                self.window.clear();
                true
            }
            Some(_) => {
                self.window.evict_oldest();
                false
            }
            None => false,
        }
    }

    /// Forget any partially matched marker.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn window(&self) -> &ByteWindow {
        &self.window
    }
}
