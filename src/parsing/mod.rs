pub mod java;

pub use java::{CommentCleaner, JavaParser, clean_comments, extract_comments, find_method};
