use crate::command::RoofCommand;

/// Errors that can occur in device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The controller could not be opened.
    #[error("link error: {0}")]
    Link(#[from] skyroof_link::LinkError),

    /// Read or write failed on an established link.
    #[error("frame error: {0}")]
    Frame(#[from] skyroof_frame::FrameError),

    /// A telemetry payload did not match its schema.
    #[error("decode error: {0}")]
    Decode(#[from] skyroof_telemetry::DecodeError),

    /// No link is open right now.
    #[error("device not connected")]
    NotConnected,

    /// The interlock refused the command.
    #[error("{0} is not permitted by the interlock")]
    NotPermitted(RoofCommand),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
