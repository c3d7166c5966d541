use crate::types::SourceRange;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistillError {
    #[error("Failed to initialize parser: {0}")]
    ParserInit(String),

    #[error("Source could not be parsed as a compilation unit")]
    ParseFailed,

    #[error("Comment list is not sorted by start offset (violation at index {index})")]
    UnsortedComments { index: usize },

    #[error("Comment range {comment:?} lies outside the unit range {unit:?}")]
    CommentOutOfBounds {
        comment: SourceRange,
        unit: SourceRange,
    },

    #[error("No method named '{0}' in compilation unit")]
    MethodNotFound(String),

    #[error("Statement nesting exceeds maximum depth {0}")]
    NestingTooDeep(usize),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type DistillResult<T> = Result<T, DistillError>;
