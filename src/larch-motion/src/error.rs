//! Error types for edit animation.

use std::time::Duration;

use thiserror::Error;

/// Result type for animation operations.
pub type AnimateResult<T> = Result<T, AnimateError>;

/// Errors that abort an animation run.
///
/// None of these are retried internally. The first one stops the run and
/// leaves the buffer wherever the animation got to.
#[derive(Debug, Error)]
pub enum AnimateError {
    /// A character range does not fit inside the reference text.
    #[error("Character range {start}..{end} is out of range for text of {len} characters")]
    OutOfRangeIndex { start: usize, end: usize, len: usize },

    /// An opcode tag other than `insertion` or `deletion`.
    #[error("Unknown opcode type: {tag}")]
    UnknownOpcode { tag: String },

    /// An opcode with a known tag but a missing field.
    #[error("Malformed {tag} opcode: missing `{field}`")]
    MalformedOpcode { tag: String, field: &'static str },

    /// The buffer refused an edit.
    #[error("Buffer rejected edit: {0}")]
    BufferRejected(#[from] BufferError),

    /// Drift moved a position before the start of the buffer.
    #[error("Position {position} shifted by {drift} falls before the start of the buffer")]
    NegativePosition { position: usize, drift: isize },

    /// The caller-imposed deadline passed before the animation finished.
    #[error("Animation timed out after {0:?}")]
    TimedOut(Duration),

    /// An edit script document could not be parsed.
    #[error("Invalid edit script: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnimateError {
    /// Create an out-of-range error.
    pub fn out_of_range(start: usize, end: usize, len: usize) -> Self {
        Self::OutOfRangeIndex { start, end, len }
    }

    /// Create an unknown opcode error.
    pub fn unknown_opcode(tag: impl Into<String>) -> Self {
        Self::UnknownOpcode { tag: tag.into() }
    }
}

/// Errors reported by an [`EditBuffer`](crate::EditBuffer) implementation.
#[derive(Debug, Error)]
pub enum BufferError {
    /// Offset beyond the end of the document.
    #[error("Offset {offset} is past the end of the document ({len} units)")]
    InvalidPosition { offset: usize, len: usize },

    /// Offset inside a multi-unit character.
    #[error("Offset {offset} splits a character")]
    NotOnCharBoundary { offset: usize },

    /// The host refused the edit for its own reasons.
    #[error("{0}")]
    Rejected(String),

    /// Writing the document through to its backing store failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
