//! Error types for the Bone wire format.

use crate::types::Value;

/// Errors that can occur while decoding, validating or streaming Bone values.
#[derive(Debug, thiserror::Error)]
pub enum BoneError {
    #[error("illegal type code: 0x{0:02X}")]
    IllegalTypeCode(u8),

    #[error("illegal level extension on type code 0x{0:02X}")]
    IllegalLevelExtension(u8),

    #[error("list terminated with non-zero level ({0})")]
    ListTerminatedWithLevel(usize),

    #[error("partial value left on stack (depth {0})")]
    PartialValue(usize),

    #[error("non-zero pending level ({0})")]
    PendingLevel(usize),

    #[error("reserved type code: 0x{0:02X}")]
    ReservedTypeCode(u8),

    #[error("malformed value: {0}")]
    Malformed(String),

    #[error("nesting depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BoneError {
    /// Returns `true` if the error was raised because the input ended early.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::PartialValue(_) | Self::PendingLevel(_))
    }
}

/// A failed one-shot decode.
///
/// Carries the values that completed before the failure so callers can report
/// how far decoding progressed.
#[derive(Debug, thiserror::Error)]
#[error("{error} at byte offset {offset}")]
pub struct PartialDecode {
    #[source]
    pub error: BoneError,
    /// Offset of the rejected byte, or the input length when the input ended
    /// in the middle of a value.
    pub offset: usize,
    pub values: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_protocol_phrases() {
        assert_eq!(
            BoneError::IllegalTypeCode(0x03).to_string(),
            "illegal type code: 0x03"
        );
        assert!(
            BoneError::PartialValue(2)
                .to_string()
                .starts_with("partial value left on stack")
        );
        assert!(
            BoneError::PendingLevel(1)
                .to_string()
                .starts_with("non-zero pending level")
        );
    }

    #[test]
    fn truncation_errors() {
        assert!(BoneError::PartialValue(1).is_truncation());
        assert!(BoneError::PendingLevel(3).is_truncation());
        assert!(!BoneError::IllegalTypeCode(0).is_truncation());
    }

    #[test]
    fn partial_decode_reports_offset() {
        let failure = PartialDecode {
            error: BoneError::IllegalTypeCode(0x00),
            offset: 4,
            values: Vec::new(),
        };
        assert_eq!(failure.to_string(), "illegal type code: 0x00 at byte offset 4");
    }
}
