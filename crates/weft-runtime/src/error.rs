//! Errors returned by the parser and the edit validator.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("edits overlap: {first:?} and {second:?}")]
    Overlapping {
        first: Range<usize>,
        second: Range<usize>,
    },

    #[error("edit {range:?} is outside the previous text (length {len})")]
    OutOfBounds { range: Range<usize>, len: usize },

    /// Applying the edits to the previous length does not give the length
    /// of the new text.
    #[error("edits produce {expected} bytes but the new text has {found}")]
    LengthMismatch { expected: usize, found: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed edit: {0}")]
    MalformedEdit(#[from] EditError),

    /// Execution fuel exhausted (too many parser actions).
    #[error("parse execution limit exceeded")]
    FuelExhausted,

    #[error("parse cancelled")]
    Cancelled,

    /// The previous tree was produced with a different language.
    #[error("previous tree was parsed with language `{found}`, parser uses `{expected}`")]
    LanguageMismatch { expected: String, found: String },
}

pub type ParseResult<T> = Result<T, ParseError>;
