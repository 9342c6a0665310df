//! Serial link abstraction for observatory device controllers.
//!
//! Provides a unified interface over the byte links the controllers hang off:
//! - Real serial ports (USB CDC / FTDI adapters) via [`SerialPortOpener`]
//! - A scripted in-memory link for tests and demos via [`mock`]
//!
//! This is the lowest layer of skyroof. Everything else builds on top of
//! the [`SerialLink`] and [`LinkOpener`] traits provided here.

pub mod config;
pub mod error;
pub mod mock;
pub mod serial;
pub mod traits;

pub use config::{LinkConfig, DEFAULT_BAUD_RATE, DEFAULT_OPEN_TIMEOUT};
pub use error::{LinkError, Result};
pub use mock::{MockLink, MockOpener, MockPort};
pub use serial::{SerialPortLink, SerialPortOpener};
pub use traits::{LinkOpener, SerialLink};
