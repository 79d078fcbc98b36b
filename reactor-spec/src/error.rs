//! # Error Types for the reaction image layout

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    // Encoding errors
    #[error("Field overflow: {len} bytes plus terminator do not fit a {width}-byte field")]
    FieldOverflow { len: usize, width: usize },

    #[error("String contains an interior NUL byte: {0:?}")]
    InteriorNul(String),

    #[error("Empty string cannot be encoded in an argument list")]
    EmptyArgument,

    #[error("{record} record of {len} bytes exceeds the u32 size prefix")]
    RecordTooLarge { record: &'static str, len: usize },

    // Decoding errors
    #[error("Truncated record: expected {expected} bytes, found {found} bytes")]
    Truncated { expected: usize, found: usize },

    #[error("Missing NUL terminator within {width} bytes")]
    MissingTerminator { width: usize },

    #[error("String field is not valid UTF-8")]
    InvalidUtf8,

    #[error("Unknown quark tag: {0:?}")]
    UnknownTag(String),

    #[error("Invalid {field} value: {value:#x}")]
    InvalidValue { field: &'static str, value: u32 },

    #[error("Size mismatch in {record}: declared {declared} bytes, consumed {consumed} bytes")]
    SizeMismatch {
        record: &'static str,
        declared: usize,
        consumed: usize,
    },

    #[error("{0} trailing bytes after the reaction section")]
    TrailingBytes(usize),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LayoutError::FieldOverflow { len: 64, width: 64 };
        assert_eq!(
            err.to_string(),
            "Field overflow: 64 bytes plus terminator do not fit a 64-byte field"
        );

        let err = LayoutError::InvalidValue { field: "method", value: 9 };
        assert_eq!(err.to_string(), "Invalid method value: 0x9");
    }

    #[test]
    fn test_truncated_display() {
        let err = LayoutError::Truncated { expected: 72, found: 10 };
        assert_eq!(
            err.to_string(),
            "Truncated record: expected 72 bytes, found 10 bytes"
        );
    }
}
