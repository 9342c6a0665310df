/// Errors that can occur while moving frames over a link.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An I/O error occurred while reading or writing the link.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link reported pending bytes but delivered none, or accepted none on write.
    #[error("link closed")]
    ConnectionClosed,

    /// The configured packet size cannot even hold the sync marker.
    #[error("packet size {size} is smaller than the {min}-byte sync marker")]
    InvalidPacketSize { size: usize, min: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
