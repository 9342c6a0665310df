use std::io::{self, Read, Write};

use crate::config::LinkConfig;
use crate::error::Result;

/// A connected byte link to a device controller. Implements Read + Write.
///
/// Reads are expected to be driven by [`SerialLink::bytes_available`] so a
/// tick never blocks waiting for data that has not arrived yet.
pub trait SerialLink: Read + Write {
    /// Number of bytes that can be read right now without blocking.
    fn bytes_available(&mut self) -> io::Result<usize>;
}

impl<L: SerialLink + ?Sized> SerialLink for Box<L> {
    fn bytes_available(&mut self) -> io::Result<usize> {
        (**self).bytes_available()
    }
}

/// Opens links on demand.
///
/// A supervisor owns one opener and calls it again after every failure, so
/// implementations must be cheap to retry and must not cache a broken handle.
pub trait LinkOpener {
    /// The link type produced by a successful open.
    type Link: SerialLink;

    /// Open a fresh link for `config`.
    fn open(&mut self, config: &LinkConfig) -> Result<Self::Link>;
}
