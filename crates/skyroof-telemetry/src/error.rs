/// Errors that can occur while decoding a telemetry payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The payload length does not match the schema.
    #[error("{schema}: payload is {actual} bytes, expected {expected}")]
    LengthMismatch {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An enumerated field carried a byte outside its value set.
    #[error("{schema}: field {field} has invalid value {value:#04x}")]
    InvalidEnum {
        schema: &'static str,
        field: &'static str,
        value: u8,
    },

    /// Field values do not line up with the schema's field table.
    #[error("{schema}: field values do not match the schema layout")]
    SchemaMismatch { schema: &'static str },
}

/// A name did not match any known value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
