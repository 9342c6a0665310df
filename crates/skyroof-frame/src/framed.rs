use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;
use skyroof_link::SerialLink;
use tracing::{debug, trace};

use crate::buffer::ByteStreamBuffer;
use crate::codec::{encode_command, Frame, FrameConfig, COMMAND_FRAME_SIZE};
use crate::error::{FrameError, Result};

/// Frames telemetry in and commands out over one owned link.
///
/// Never blocks waiting for data: [`FramedLink::fill`] only reads what the
/// link reports as already available.
pub struct FramedLink<T> {
    inner: T,
    buf: ByteStreamBuffer,
    chunk: Vec<u8>,
    out: BytesMut,
    config: FrameConfig,
}

impl<T: SerialLink> FramedLink<T> {
    /// Wrap a link with explicit framing configuration.
    pub fn new(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: ByteStreamBuffer::with_capacity(config.buffer_capacity),
            chunk: Vec::new(),
            out: BytesMut::with_capacity(COMMAND_FRAME_SIZE),
            config,
        }
    }

    /// Move pending link bytes into the receive buffer.
    ///
    /// Reads no more than the buffer has room for, so nothing already
    /// buffered is evicted. When there is not enough room, stale bytes ahead
    /// of the earliest sync marker are dropped first. Returns the number of
    /// bytes read; zero means nothing was read this call. Callers drain
    /// frames and call again until it returns zero.
    pub fn fill(&mut self) -> Result<usize> {
        let available = self.inner.bytes_available()?;
        if available == 0 {
            return Ok(0);
        }

        if self.buf.remaining_capacity() < available.min(self.config.packet_size) {
            let dropped = self.buf.make_room(self.config.packet_size);
            if dropped > 0 {
                debug!(dropped, "receive buffer full; discarded bytes ahead of sync");
            }
        }

        let want = available.min(self.buf.remaining_capacity());
        if want == 0 {
            return Ok(0);
        }

        self.chunk.resize(want, 0);
        let read = loop {
            match self.inner.read(&mut self.chunk[..want]) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        };

        if read == 0 {
            return Err(FrameError::ConnectionClosed);
        }

        self.buf.extend(&self.chunk[..read]);
        trace!(read, buffered = self.buf.len(), "link bytes buffered");
        Ok(read)
    }

    /// Next complete frame already in the buffer, without touching the link.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        self.buf.extract_frame(self.config.packet_size)
    }

    /// Next complete frame, reading pending link bytes if none is buffered.
    pub fn poll_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(frame) = self.next_frame()? {
            return Ok(Some(frame));
        }
        self.fill()?;
        self.next_frame()
    }

    /// Encode and send a one-byte command.
    pub fn send_opcode(&mut self, opcode: u8) -> Result<()> {
        self.out.clear();
        encode_command(opcode, &mut self.out);

        let mut offset = 0usize;
        while offset < self.out.len() {
            match self.inner.write(&self.out[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying link.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// The receive buffer.
    pub fn buffer(&self) -> &ByteStreamBuffer {
        &self.buf
    }

    /// Borrow the underlying link.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying link.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the framer and return the link. Buffered bytes are dropped.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current framing configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
