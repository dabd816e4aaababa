//! Codec errors
//!
//! Every failure the encoder or decoder can report. Any error aborts the whole
//! message: a partially populated message or a partially written buffer must be
//! discarded by the caller.

use thiserror::Error;

use super::WireType;

/// Codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A varint did not terminate within ten 7-bit groups.
    #[error("integer overflow")]
    IntegerOverflow,

    /// The input ended in the middle of a field.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A length prefix is negative when read as a signed 64-bit integer.
    #[error("negative length found during unmarshaling")]
    NegativeLength,

    #[error("wrong wire type {actual} for field {field} (expected {expected})")]
    WireTypeMismatch {
        field: &'static str,
        expected: WireType,
        actual: WireType,
    },

    /// An end-group tag outside of a group, or a group that never ends.
    #[error("unexpected end group")]
    UnexpectedEndGroup,

    /// A map value that must be a message was absent at encode time.
    #[error("map has nil element")]
    NilMapElement,

    #[error("illegal tag: field number {0}")]
    IllegalTag(u64),

    #[error("illegal wire type {0}")]
    IllegalWireType(u8),

    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    #[error("group nesting exceeds depth limit of {0}")]
    DepthLimitExceeded(usize),

    #[error("message too large: {0} bytes (max: {1})")]
    MessageTooLarge(usize, usize),

    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

impl CodecError {
    /// Whether decoding failed because the input was cut short.
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::UnexpectedEnd)
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
