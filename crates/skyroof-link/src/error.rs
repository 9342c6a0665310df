/// Errors that can occur in serial link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Failed to open the configured device.
    #[error("failed to open {path} at {baud_rate} baud: {source}")]
    Open {
        path: String,
        baud_rate: u32,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_names_path_and_baud() {
        let err = LinkError::Open {
            path: "/dev/ttyACM0".to_string(),
            baud_rate: 57_600,
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let text = err.to_string();
        assert!(text.starts_with("failed to open /dev/ttyACM0 at 57600 baud"));
    }
}
