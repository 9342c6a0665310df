//! Scripted in-memory link for tests, demos and bench work without hardware.
//!
//! A [`MockPort`] is the test-side handle: push inbound bytes, inspect what was
//! written, inject faults. A [`MockOpener`] hands out [`MockLink`]s that share
//! the port state, one per successful open.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::traits::{LinkOpener, SerialLink};

#[derive(Debug, Default)]
struct PortState {
    inbound: VecDeque<u8>,
    written: Vec<u8>,
    refuse_opens: usize,
    fail_next_read: bool,
    fail_next_write: bool,
    opens: usize,
    generation: u64,
}

/// Shared handle onto a simulated device port.
#[derive(Debug, Clone, Default)]
pub struct MockPort {
    state: Arc<Mutex<PortState>>,
}

impl MockPort {
    /// Create an idle port with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// An opener bound to this port.
    pub fn opener(&self) -> MockOpener {
        MockOpener { port: self.clone() }
    }

    /// Queue bytes for the device side to "transmit".
    pub fn push_bytes(&self, bytes: &[u8]) {
        self.lock().inbound.extend(bytes.iter().copied());
    }

    /// Bytes queued but not yet read by the host.
    pub fn pending_inbound(&self) -> usize {
        self.lock().inbound.len()
    }

    /// Drain everything the host has written so far.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.lock().written)
    }

    /// Refuse the next `count` open attempts.
    pub fn refuse_opens(&self, count: usize) {
        self.lock().refuse_opens = count;
    }

    /// Make the next read (or availability check) fail with a broken pipe.
    pub fn fail_next_read(&self) {
        self.lock().fail_next_read = true;
    }

    /// Make the next write fail with a broken pipe.
    pub fn fail_next_write(&self) {
        self.lock().fail_next_write = true;
    }

    /// Number of successful opens so far.
    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    fn lock(&self) -> MutexGuard<'_, PortState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Opens [`MockLink`]s onto a shared [`MockPort`].
#[derive(Debug, Clone)]
pub struct MockOpener {
    port: MockPort,
}

impl MockOpener {
    /// The port this opener connects to.
    pub fn port(&self) -> &MockPort {
        &self.port
    }
}

impl LinkOpener for MockOpener {
    type Link = MockLink;

    fn open(&mut self, config: &LinkConfig) -> Result<MockLink> {
        let mut state = self.port.lock();
        if state.refuse_opens > 0 {
            state.refuse_opens -= 1;
            return Err(LinkError::Open {
                path: config.device_path.clone(),
                baud_rate: config.baud_rate,
                source: io::Error::new(io::ErrorKind::NotFound, "mock device absent"),
            });
        }
        state.opens += 1;
        state.generation += 1;
        Ok(MockLink {
            port: self.port.clone(),
            generation: state.generation,
        })
    }
}

/// One opened handle onto a [`MockPort`].
///
/// A handle goes stale once a newer one is opened; stale handles fail every
/// operation, which catches code that keeps using a handle after a reconnect.
#[derive(Debug)]
pub struct MockLink {
    port: MockPort,
    generation: u64,
}

impl MockLink {
    fn check_current(&self, state: &PortState) -> io::Result<()> {
        if state.generation != self.generation {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "stale mock handle",
            ));
        }
        Ok(())
    }
}

impl Read for MockLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.port.lock();
        self.check_current(&state)?;
        if state.fail_next_read {
            state.fail_next_read = false;
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        let n = buf.len().min(state.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(state.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MockLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.port.lock();
        self.check_current(&state)?;
        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        state.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let state = self.port.lock();
        self.check_current(&state)
    }
}

impl SerialLink for MockLink {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let mut state = self.port.lock();
        self.check_current(&state)?;
        if state.fail_next_read {
            state.fail_next_read = false;
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        Ok(state.inbound.len())
    }
}
