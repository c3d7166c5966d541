//! Java compiler front end, backed by tree-sitter.
//!
//! Produces the concrete syntax tree the association core consumes. The
//! core only reads node kinds, source text, and byte ranges from it.

use crate::error::{DistillError, DistillResult};
use crate::types::SourceRange;
use tree_sitter::{Node, Parser, Tree};

// Node type constants from the tree-sitter-java grammar
const NODE_METHOD_DECLARATION: &str = "method_declaration";
const NODE_CONSTRUCTOR_DECLARATION: &str = "constructor_declaration";

const FIELD_NAME: &str = "name";

/// Parser for Java source files
pub struct JavaParser {
    parser: Parser,
}

impl std::fmt::Debug for JavaParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaParser")
            .field("language", &"Java")
            .finish()
    }
}

impl JavaParser {
    /// Create a new parser instance
    pub fn new() -> DistillResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| DistillError::ParserInit(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse a compilation unit.
    pub fn parse(&mut self, code: &str) -> DistillResult<Tree> {
        self.parser
            .parse(code, None)
            .ok_or(DistillError::ParseFailed)
    }
}

/// Locate the method or constructor declaration named `name` within the
/// parsed unit.
pub fn find_method<'tree>(
    tree: &'tree Tree,
    code: &str,
    name: &str,
) -> DistillResult<Node<'tree>> {
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        if matches!(
            node.kind(),
            NODE_METHOD_DECLARATION | NODE_CONSTRUCTOR_DECLARATION
        ) {
            if let Some(id) = node.child_by_field_name(FIELD_NAME) {
                if &code[id.byte_range()] == name {
                    return Ok(node);
                }
            }
        }
        for i in (0..node.named_child_count()).rev() {
            if let Some(child) = node.named_child(i as u32) {
                stack.push(child);
            }
        }
    }
    Err(DistillError::MethodNotFound(name.to_string()))
}

/// Convert a tree-sitter node into a SourceRange
pub(crate) fn node_range(node: Node) -> SourceRange {
    SourceRange::new(node.start_byte() as u32, node.end_byte() as u32)
}
