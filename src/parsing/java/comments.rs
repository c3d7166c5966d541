//! Comment extraction and cleaning.
//!
//! Collects the raw comment tokens of a parsed unit in source order and
//! normalizes them for the association engine. The only normalization is
//! structural: runs of line comments on consecutive lines are merged into
//! a single comment whose text is the verbatim source slice, because they
//! read as one continued remark.

use crate::comment::{Comment, CommentKind};
use crate::parsing::java::parser::node_range;
use tree_sitter::Tree;

const NODE_LINE_COMMENT: &str = "line_comment";
const NODE_BLOCK_COMMENT: &str = "block_comment";

/// Collect every comment token of the unit, in source order.
///
/// `text` is the raw slice including delimiters, exactly as it appears
/// in the source.
pub fn extract_comments(tree: &Tree, code: &str) -> Vec<Comment> {
    let mut comments = Vec::new();
    let mut cursor = tree.root_node().walk();
    loop {
        let node = cursor.node();
        match node.kind() {
            NODE_LINE_COMMENT => comments.push(Comment::new(
                CommentKind::Line,
                &code[node.byte_range()],
                node_range(node),
            )),
            NODE_BLOCK_COMMENT => comments.push(Comment::new(
                CommentKind::Block,
                &code[node.byte_range()],
                node_range(node),
            )),
            _ => {}
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return comments;
            }
        }
    }
}

/// Merges adjacent line comments and rebuilds their text from the source.
pub struct CommentCleaner<'src> {
    source: &'src str,
    comments: Vec<Comment>,
}

impl<'src> CommentCleaner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            comments: Vec::new(),
        }
    }

    /// Feed the next comment in source order.
    pub fn process(&mut self, comment: Comment) {
        if comment.kind == CommentKind::Line {
            if let Some(last) = self.comments.last_mut() {
                let gap = &self.source[last.range.end as usize..comment.range.start as usize];
                if last.kind == CommentKind::Line && is_mergeable_gap(gap) {
                    let merged =
                        crate::types::SourceRange::new(last.range.start, comment.range.end);
                    last.text = self.source[merged.start as usize..merged.end as usize].into();
                    last.range = merged;
                    return;
                }
            }
        }
        self.comments.push(comment);
    }

    pub fn into_comments(self) -> Vec<Comment> {
        self.comments
    }
}

/// Two line comments belong together when only indentation and a single
/// newline separate them.
fn is_mergeable_gap(gap: &str) -> bool {
    gap.chars().all(char::is_whitespace) && gap.matches('\n').count() == 1
}

/// Extraction and cleaning in one step.
pub fn clean_comments(source: &str, raw: Vec<Comment>) -> Vec<Comment> {
    let mut cleaner = CommentCleaner::new(source);
    for comment in raw {
        cleaner.process(comment);
    }
    cleaner.into_comments()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::java::parser::JavaParser;

    fn comments_of(code: &str) -> Vec<Comment> {
        let mut parser = JavaParser::new().expect("Failed to create parser");
        let tree = parser.parse(code).unwrap();
        extract_comments(&tree, code)
    }

    #[test]
    fn test_extraction_in_source_order() {
        let code = "class A {\n    // first\n    void foo() {\n        /* second */\n        int a = 0; // third\n    }\n}\n";
        let comments = comments_of(code);

        let texts: Vec<&str> = comments.iter().map(|c| &*c.text).collect();
        assert_eq!(texts, vec!["// first", "/* second */", "// third"]);
        assert_eq!(comments[1].kind, CommentKind::Block);
        assert!(comments[0].range.end <= comments[1].range.start);
    }

    #[test]
    fn test_adjacent_line_comments_are_merged() {
        let code = "class A {\n    void foo() {\n        // check the interesting number\n        // and some new else\n        int a = 0;\n    }\n}\n";
        let cleaned = clean_comments(code, comments_of(code));

        assert_eq!(cleaned.len(), 1);
        assert_eq!(
            &*cleaned[0].text,
            "// check the interesting number\n        // and some new else"
        );
        assert_eq!(cleaned[0].kind, CommentKind::Line);
    }

    #[test]
    fn test_blank_line_breaks_a_run() {
        let code = "class A {\n    void foo() {\n        // one\n\n        // two\n        int a = 0;\n    }\n}\n";
        let cleaned = clean_comments(code, comments_of(code));

        assert_eq!(cleaned.len(), 2);
    }

    #[test]
    fn test_block_comments_are_never_merged() {
        let code = "class A {\n    void foo() {\n        /* one */\n        /* two */\n        int a = 0;\n    }\n}\n";
        let cleaned = clean_comments(code, comments_of(code));

        assert_eq!(cleaned.len(), 2);
    }
}
