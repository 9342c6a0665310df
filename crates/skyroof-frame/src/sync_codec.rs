use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_command, stale_prefix, Frame, FrameConfig};
use crate::error::FrameError;

/// `tokio_util` codec for the same sync-marker framing.
///
/// Decodes telemetry frames and encodes one-byte command opcodes. Once no
/// complete frame is left, the read buffer is trimmed back to the configured
/// cap: stale bytes ahead of the earliest marker go first, then the oldest.
#[derive(Debug, Clone, Copy)]
pub struct SyncCodec {
    config: FrameConfig,
}

impl SyncCodec {
    /// Codec for frames of `packet_size` bytes with the default buffer cap.
    pub fn new(packet_size: usize) -> Self {
        Self::with_config(FrameConfig::new(packet_size))
    }

    /// Codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }
}

impl Decoder for SyncCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        if let Some(frame) = decode_frame(src, self.config.packet_size)? {
            return Ok(Some(frame));
        }

        let cap = self.config.buffer_capacity;
        if src.len() > cap {
            let stale = stale_prefix(src);
            src.advance(stale);
        }
        if src.len() > cap {
            let excess = src.len() - cap;
            src.advance(excess);
        }
        Ok(None)
    }
}

impl Encoder<u8> for SyncCodec {
    type Error = FrameError;

    fn encode(&mut self, opcode: u8, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_command(opcode, dst);
        Ok(())
    }
}
