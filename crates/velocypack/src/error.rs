//! Error types for VelocyPack operations.

use crate::head::ValueType;

/// Error type for VelocyPack operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    // Read errors
    /// Accessor called on a value of another type.
    #[error("expecting type {expected}, found {found}")]
    InvalidValueType {
        expected: &'static str,
        found: ValueType,
    },
    /// Numeric conversion would lose information or overflow.
    #[error("number out of range")]
    NumberOutOfRange,
    /// Index beyond the length of an array, object or string.
    #[error("index {index} out of bounds (length={length})")]
    IndexOutOfBounds { index: usize, length: usize },
    /// Attribute path without any segment.
    #[error("invalid attribute path")]
    InvalidAttributePath,
    /// String payload is not valid UTF-8.
    #[error("invalid UTF-8 in string value")]
    InvalidUtf8,
    /// A custom type was encountered but no handler is configured.
    #[error("cannot handle custom type without a custom type handler")]
    NeedCustomTypeHandler,
    /// Table or layout mismatch that a well-formed buffer cannot produce.
    ///
    /// Currently never constructed: `Slice::byte_size` and the typed
    /// accessors match exhaustively on `ValueType`.
    #[error("internal error: {0}")]
    InternalError(&'static str),

    // Builder errors
    /// The builder still has open arrays or objects.
    #[error("builder value not yet sealed")]
    BuilderNotSealed,
    /// `close()` without an open array or object.
    #[error("need open array or object")]
    BuilderNeedOpenCompound,
    /// Operation requires the innermost open compound to be an array.
    #[error("need open array")]
    BuilderNeedOpenArray,
    /// Operation requires the innermost open compound to be an object.
    #[error("need open object")]
    BuilderNeedOpenObject,
    /// A key was written and its value is still missing.
    #[error("attribute key already written")]
    BuilderKeyAlreadyWritten,
    /// Object keys must be strings.
    #[error("attribute key must be a string")]
    BuilderKeyMustBeString,
    /// The innermost open compound has no member to remove.
    #[error("need subvalue in current object or array")]
    BuilderNeedSubvalue,
    /// Value type that cannot be stored at this position.
    #[error("unexpected value type {0}")]
    BuilderUnexpectedType(ValueType),
    /// Custom types are disabled by the options.
    #[error("custom types are not allowed")]
    BuilderCustomDisallowed,
    /// Object contains the same key twice and uniqueness checks are enabled.
    #[error("duplicate attribute name: {0}")]
    DuplicateAttributeName(String),

    // JSON errors
    /// Failed to parse JSON input.
    #[error("JSON parse error: {0}")]
    JsonParse(String),
    /// Failed to serialize to JSON.
    #[error("JSON serialize error: {0}")]
    JsonSerialize(String),
    /// Value has no JSON equivalent under the configured behavior.
    #[error("type {0} has no equivalent in JSON")]
    NoJsonEquivalent(ValueType),
}

impl Error {
    pub(crate) fn invalid_type(expected: &'static str, found: ValueType) -> Self {
        Error::InvalidValueType { expected, found }
    }
}

/// Result type alias for VelocyPack operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        assert_eq!(
            Error::invalid_type("array", ValueType::Object).to_string(),
            "expecting type array, found object"
        );
        assert_eq!(
            Error::InternalError("offset table out of range").to_string(),
            "internal error: offset table out of range"
        );
        assert_eq!(
            Error::BuilderUnexpectedType(ValueType::None).to_string(),
            "unexpected value type none"
        );
    }
}
