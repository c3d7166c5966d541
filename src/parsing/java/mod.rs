//! Java front end: parsing plus comment extraction.

pub mod comments;
pub mod parser;

pub use comments::{CommentCleaner, clean_comments, extract_comments};
pub use parser::{JavaParser, find_method};
