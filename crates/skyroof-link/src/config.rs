use std::time::Duration;

/// Baud rate spoken by both observatory controllers.
pub const DEFAULT_BAUD_RATE: u32 = 57_600;

/// Upper bound for opening a port and for any single blocking read or write.
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(2);

/// Where and how to open a device link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Device path, e.g. `/dev/ttyACM0` or `/dev/tty.usbmodem142201`.
    pub device_path: String,
    /// Line speed. Default: 57600.
    pub baud_rate: u32,
    /// Open / blocking I/O timeout. Default: 2 s.
    pub open_timeout: Duration,
}

impl LinkConfig {
    /// Config for `device_path` with default line settings.
    pub fn new(device_path: impl Into<String>) -> Self {
        Self {
            device_path: device_path.into(),
            ..Self::default()
        }
    }

    /// Override the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device_path: "/dev/ttyACM0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            open_timeout: DEFAULT_OPEN_TIMEOUT,
        }
    }
}
