use std::io::{self, Read, Write};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::traits::{LinkOpener, SerialLink};

/// A real serial port, 8N1, no flow control.
pub struct SerialPortLink {
    port: Box<dyn SerialPort>,
    path: String,
}

impl Read for SerialPortLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialPortLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl SerialLink for SerialPortLink {
    fn bytes_available(&mut self) -> io::Result<usize> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(io::Error::from)
    }
}

impl std::fmt::Debug for SerialPortLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortLink")
            .field("path", &self.path)
            .finish()
    }
}

/// Opens [`SerialPortLink`]s with the `serialport` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialPortOpener;

impl LinkOpener for SerialPortOpener {
    type Link = SerialPortLink;

    fn open(&mut self, config: &LinkConfig) -> Result<SerialPortLink> {
        debug!(path = %config.device_path, baud = config.baud_rate, "opening serial port");
        let port = serialport::new(config.device_path.as_str(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.open_timeout)
            .open()
            .map_err(|err| LinkError::Open {
                path: config.device_path.clone(),
                baud_rate: config.baud_rate,
                source: err.into(),
            })?;

        info!(path = %config.device_path, baud = config.baud_rate, "serial port open");

        Ok(SerialPortLink {
            port,
            path: config.device_path.clone(),
        })
    }
}
