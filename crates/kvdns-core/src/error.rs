use thiserror::Error;

use crate::record::RecordType;

/// Result type alias for kvdns-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while encoding, decoding, parsing or validating records
#[derive(Error, Debug)]
pub enum CoreError {
    /// Stored bytes do not have the width the field requires
    #[error("field '{field}' has {actual} bytes, expected {expected}")]
    FieldWidth {
        /// Field (or owner key) being decoded
        field: &'static str,
        /// Width the field type requires
        expected: usize,
        /// Width actually stored
        actual: usize,
    },

    /// Stored string field is not valid UTF-8
    #[error("field '{0}' is not valid UTF-8")]
    FieldUtf8(&'static str),

    /// A field needed to assemble a record was not supplied
    #[error("field '{0}' is missing")]
    MissingField(&'static str),

    /// String list could not be serialized or deserialized
    #[error("string list codec error: {0}")]
    StringList(String),

    /// LOC presentation string was rejected
    #[error("invalid LOC string: {0}")]
    Loc(String),

    /// Record type mnemonic or code not supported
    #[error("unsupported record type: {0}")]
    UnsupportedType(String),

    /// Presentation tokens for a record could not be parsed
    #[error("invalid {rtype} presentation: {reason}")]
    Presentation {
        /// Record type being parsed
        rtype: RecordType,
        /// What was wrong with the input
        reason: String,
    },

    /// Record or owner name failed write-time validation
    #[error("validation failed: {0}")]
    Validation(String),
}

impl CoreError {
    /// Returns true if the error was caused by caller input rather than
    /// by bytes already in the store
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Loc(_)
                | Self::UnsupportedType(_)
                | Self::Presentation { .. }
                | Self::Validation(_)
        )
    }
}
