use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Identifier of a node in an entity tree.
///
/// Ids are dense arena handles; they are only meaningful for the tree
/// that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0.get()
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index as u32))
    }

    pub(crate) fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Byte-offset range of a source element, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: u32,
    pub end: u32,
}

impl SourceRange {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True iff `other` lies entirely within this range.
    pub fn contains(&self, other: SourceRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Kind of a structural entity in the output tree.
///
/// A closed enumeration matched exhaustively by the traversal; comment
/// entities share the same label space so association links stay
/// homogeneous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Method,
    Block,
    If,
    Else,
    While,
    Do,
    For,
    Foreach,
    Switch,
    Case,
    Try,
    Catch,
    Finally,
    Synchronized,
    Return,
    Break,
    Continue,
    Throw,
    Assert,
    Yield,
    VariableDeclaration,
    Assignment,
    MethodInvocation,
    Statement,
    LineComment,
    BlockComment,
}

impl EntityKind {
    pub fn is_comment(self) -> bool {
        matches!(self, EntityKind::LineComment | EntityKind::BlockComment)
    }
}

pub type CompactString = Box<str>;

pub fn compact_string(s: &str) -> CompactString {
    s.into()
}
