//! Error types for anchoring
//!
//! Every anchor operation fails fast with one of these. None of them is
//! fatal: callers recover by trying another anchor kind or by surfacing an
//! "orphaned annotation" state.

use thiserror::Error;

/// Result type alias for anchoring operations
pub type Result<T> = std::result::Result<T, AnchorError>;

/// Anchoring error type
#[derive(Error, Debug)]
pub enum AnchorError {
    /// A required field (id, quote) was absent or empty at construction
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// No anchor kind implements the requested selector
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A node referenced by id does not exist in the document
    #[error("DOM lookup failed: no element with id {0:?}")]
    DomLookup(String),

    /// Quote-based resolution exhausted its strategies
    #[error("No match found")]
    NoMatchFound,

    /// Text position with start after end
    #[error("Invalid text position: start {start} is after end {end}")]
    InvalidPosition { start: usize, end: usize },

    /// Walker target outside the coordinate space
    #[error("Offset {offset} out of range (text length {length})")]
    OffsetOutOfRange { offset: isize, length: usize },

    /// A range boundary or container path cannot be resolved in this tree
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A selector was handed to an anchor kind that does not read it
    #[error("Selector mismatch: expected {expected}, found {found}")]
    SelectorMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Ignore selector could not be parsed
    #[error("Invalid ignore selector: {0}")]
    InvalidSelector(String),

    /// Selector JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnchorError {
    /// Whether a caller should move on to the next anchor kind.
    ///
    /// Malformed input (bad JSON, bad ignore selector) will fail the same
    /// way for every kind, so retrying is pointless.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AnchorError::Json(_) | AnchorError::InvalidSelector(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AnchorError::MissingParameter("quote").to_string(),
            "Missing required parameter: quote"
        );
        assert_eq!(
            AnchorError::DomLookup("missing-id".to_string()).to_string(),
            "DOM lookup failed: no element with id \"missing-id\""
        );
        assert_eq!(
            AnchorError::OffsetOutOfRange { offset: 12, length: 10 }.to_string(),
            "Offset 12 out of range (text length 10)"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(AnchorError::NoMatchFound.is_recoverable());
        assert!(AnchorError::DomLookup("x".to_string()).is_recoverable());
        assert!(!AnchorError::InvalidSelector("[".to_string()).is_recoverable());
    }
}
