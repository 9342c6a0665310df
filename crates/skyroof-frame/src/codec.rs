use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::buffer::DEFAULT_BUFFER_CAPACITY;
use crate::error::{FrameError, Result};

/// Sync marker that opens every frame in both directions.
pub const SYNC_MARKER: [u8; 3] = [0x50, 0x50, 0x50];

/// Length of [`SYNC_MARKER`].
pub const SYNC_LEN: usize = SYNC_MARKER.len();

/// Command frame: marker + one opcode byte.
pub const COMMAND_FRAME_SIZE: usize = SYNC_LEN + 1;

/// A telemetry packet body sliced out of the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Bytes after the sync marker.
    pub payload: Bytes,
    /// Bytes discarded ahead of the marker (line noise, truncated frames).
    pub skipped: usize,
}

impl Frame {
    /// Create a frame around a payload.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            skipped: 0,
        }
    }

    /// The total wire size of this frame (marker + payload).
    pub fn wire_size(&self) -> usize {
        SYNC_LEN + self.payload.len()
    }
}

/// Offset of the earliest sync marker in `src`.
pub fn find_sync(src: &[u8]) -> Option<usize> {
    src.windows(SYNC_LEN).position(|w| w == SYNC_MARKER)
}

/// Leading bytes of `src` that can never begin a frame.
///
/// That is everything before the earliest marker or, with no marker at all,
/// everything except a trailing run that may be the start of one.
pub fn stale_prefix(src: &[u8]) -> usize {
    match find_sync(src) {
        Some(start) => start,
        None => {
            let tail = src
                .iter()
                .rev()
                .take(SYNC_LEN - 1)
                .take_while(|&&b| b == SYNC_MARKER[0])
                .count();
            src.len() - tail
        }
    }
}

/// Encode a command frame.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬──────────┐
/// │ Sync (3B)        │ Opcode   │
/// │ 0x50 0x50 0x50   │ (1B)     │
/// └──────────────────┴──────────┘
/// ```
pub fn encode_command(opcode: u8, dst: &mut BytesMut) {
    dst.reserve(COMMAND_FRAME_SIZE);
    dst.put_slice(&SYNC_MARKER);
    dst.put_u8(opcode);
}

/// Encode a telemetry frame, as a device controller would.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(SYNC_LEN + payload.len());
    dst.put_slice(&SYNC_MARKER);
    dst.put_slice(payload);
}

/// Decode the earliest complete frame of `packet_size` bytes from a buffer.
///
/// Returns `Ok(None)` and leaves `src` untouched if no complete frame is
/// buffered yet. On success, everything up to and including the frame is
/// consumed; the remainder stays in `src` for the next call.
pub fn decode_frame(src: &mut BytesMut, packet_size: usize) -> Result<Option<Frame>> {
    if packet_size < SYNC_LEN {
        return Err(FrameError::InvalidPacketSize {
            size: packet_size,
            min: SYNC_LEN,
        });
    }

    let Some(start) = find_sync(&src[..]) else {
        return Ok(None);
    };

    // A later marker can only end later, so an incomplete earliest frame
    // means nothing is complete yet.
    if src.len() - start < packet_size {
        return Ok(None);
    }

    src.advance(start + SYNC_LEN);
    let payload = src.split_to(packet_size - SYNC_LEN).freeze();

    Ok(Some(Frame {
        payload,
        skipped: start,
    }))
}

/// Configuration for framing one device link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Full frame size including the sync marker.
    pub packet_size: usize,
    /// Receive buffer cap in bytes. Default: 1024.
    pub buffer_capacity: usize,
}

impl FrameConfig {
    /// Config for frames of `packet_size` bytes with the default buffer cap.
    pub fn new(packet_size: usize) -> Self {
        Self {
            packet_size,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}
