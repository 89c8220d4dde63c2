//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding or converting record values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Float values are forbidden in canonical CBOR.
    #[error("float values are forbidden in canonical CBOR")]
    FloatForbidden,

    /// Indefinite-length items are forbidden.
    #[error("indefinite-length items are forbidden")]
    IndefiniteLengthForbidden,

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Input continues past the end of the encoded value.
    #[error("trailing bytes after value")]
    TrailingBytes,

    /// Record fields must be keyed by text.
    #[error("map key is not a text string")]
    NonTextMapKey,

    /// Integer does not fit the supported i64 range.
    #[error("integer overflow")]
    IntegerOverflow,

    /// Invalid or non-canonical CBOR structure.
    #[error("invalid CBOR structure: {message}")]
    InvalidStructure {
        /// Description of the structural error.
        message: String,
    },

    /// Serde conversion failed.
    #[error("serde conversion failed: {message}")]
    Serde {
        /// Description of the conversion error.
        message: String,
    },
}

impl CodecError {
    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Creates a serde conversion error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }
}
