//! Cleaned comment records handed to the association engine.

use crate::error::{DistillError, DistillResult};
use crate::types::{CompactString, EntityKind, SourceRange};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentKind {
    /// Single line comment `//`
    Line,
    /// Block comment `/* */`
    Block,
}

impl From<CommentKind> for EntityKind {
    fn from(kind: CommentKind) -> Self {
        match kind {
            CommentKind::Line => EntityKind::LineComment,
            CommentKind::Block => EntityKind::BlockComment,
        }
    }
}

/// A comment as produced by extraction and cleaning.
///
/// `text` is the raw source slice including delimiters, exactly as it
/// appeared; a merged run of line comments keeps the interior whitespace
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: CompactString,
    pub range: SourceRange,
}

impl Comment {
    pub fn new(kind: CommentKind, text: &str, range: SourceRange) -> Self {
        Self {
            kind,
            text: text.into(),
            range,
        }
    }
}

/// Check the extraction collaborator's contract: comments sorted by start
/// offset, non-overlapping, and inside the unit range.
///
/// A violation is a contract error of the producer, reported once; the
/// engine never works around it with a partial result.
pub fn validate_contract(comments: &[Comment], unit: SourceRange) -> DistillResult<()> {
    for (index, comment) in comments.iter().enumerate() {
        if !unit.contains(comment.range) {
            return Err(DistillError::CommentOutOfBounds {
                comment: comment.range,
                unit,
            });
        }
        if index > 0 && comment.range.start < comments[index - 1].range.end {
            return Err(DistillError::UnsortedComments { index });
        }
    }
    Ok(())
}
