//! Sync-marker framing over a bounded byte buffer.
//!
//! Every frame on the wire is:
//! - A 3-byte sync marker (`0x50 0x50 0x50`)
//! - A fixed-length body whose size is set by the device schema
//!
//! There is no length prefix and no type tag; the receiver knows the packet
//! size up front. Telemetry flows device → host, one-byte command opcodes
//! flow host → device.

pub mod buffer;
pub mod codec;
pub mod error;
pub mod framed;
#[cfg(feature = "async")]
pub mod sync_codec;

pub use buffer::{ByteStreamBuffer, DEFAULT_BUFFER_CAPACITY};
pub use codec::{
    decode_frame, encode_command, encode_frame, find_sync, stale_prefix, Frame, FrameConfig,
    COMMAND_FRAME_SIZE, SYNC_LEN, SYNC_MARKER,
};
pub use error::{FrameError, Result};
pub use framed::FramedLink;
#[cfg(feature = "async")]
pub use sync_codec::SyncCodec;
