use bytes::{Buf, BytesMut};

use crate::codec::{decode_frame, find_sync, stale_prefix, Frame};
use crate::error::Result;

/// Default receive buffer cap: 1 KiB.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Bounded accumulator for raw link bytes.
///
/// Never holds more than `capacity` bytes. Readers size their appends to
/// [`ByteStreamBuffer::remaining_capacity`] and call
/// [`ByteStreamBuffer::make_room`] when it runs out; an append past the cap
/// still evicts the oldest bytes.
#[derive(Debug, Clone)]
pub struct ByteStreamBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl ByteStreamBuffer {
    /// Create an empty buffer with the default cap.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create an empty buffer holding at most `capacity` bytes.
    ///
    /// A zero cap is bumped to one byte.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Append bytes, evicting the oldest on overflow.
    ///
    /// Returns how many bytes were evicted.
    pub fn extend(&mut self, data: &[u8]) -> usize {
        if data.len() >= self.capacity {
            let evicted = self.buf.len() + data.len() - self.capacity;
            self.buf.clear();
            self.buf
                .extend_from_slice(&data[data.len() - self.capacity..]);
            return evicted;
        }

        let overflow = (self.buf.len() + data.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.buf.advance(overflow);
        }
        self.buf.extend_from_slice(data);
        overflow
    }

    /// Free space when the buffer holds no complete frame.
    ///
    /// Drops the bytes ahead of the earliest sync marker. With no marker,
    /// drops everything but a possible partial marker at the tail. If nothing
    /// is stale and the buffer is full, drops the single oldest byte so the
    /// stream keeps moving. A complete frame at the front is never touched.
    ///
    /// Returns how many bytes were dropped.
    pub fn make_room(&mut self, packet_size: usize) -> usize {
        if find_sync(&self.buf) == Some(0) && self.buf.len() >= packet_size {
            return 0;
        }

        let mut dropped = stale_prefix(&self.buf);
        if dropped == 0 && self.buf.len() >= self.capacity {
            dropped = 1;
        }
        self.buf.advance(dropped);
        dropped
    }

    /// Slice out the earliest complete frame of `packet_size` bytes.
    ///
    /// See [`decode_frame`] for the consumption rules.
    pub fn extract_frame(&mut self, packet_size: usize) -> Result<Option<Frame>> {
        decode_frame(&mut self.buf, packet_size)
    }

    /// Bytes currently held.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The byte cap.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Room left before appends start evicting.
    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Borrow the buffered bytes, oldest first.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Drop everything buffered.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for ByteStreamBuffer {
    fn default() -> Self {
        Self::new()
    }
}
