//! Depth-first traversal of a parsed method body.
//!
//! The driver mirrors the parsed statement tree as an [`EntityTree`] and
//! invokes the [`AssociationEngine`] at the boundaries where doing so
//! reflects source order: before each child is visited, and when a
//! statement or compound body is closed. Entering a body resets the
//! "previous candidate" so proximity never reaches across a containment
//! boundary.

use crate::association::AssociationEngine;
use crate::comment::Comment;
use crate::error::{DistillError, DistillResult};
use crate::tree::EntityTree;
use crate::types::{EntityKind, NodeId};
use tracing::debug;
use tree_sitter::Node;

use crate::parsing::java::parser::node_range;

// Node type constants from the tree-sitter-java grammar
const NODE_BLOCK: &str = "block";
const NODE_IF_STATEMENT: &str = "if_statement";
const NODE_WHILE_STATEMENT: &str = "while_statement";
const NODE_DO_STATEMENT: &str = "do_statement";
const NODE_FOR_STATEMENT: &str = "for_statement";
const NODE_ENHANCED_FOR_STATEMENT: &str = "enhanced_for_statement";
const NODE_SWITCH_EXPRESSION: &str = "switch_expression";
const NODE_SWITCH_STATEMENT: &str = "switch_statement";
const NODE_TRY_STATEMENT: &str = "try_statement";
const NODE_TRY_WITH_RESOURCES_STATEMENT: &str = "try_with_resources_statement";
const NODE_SYNCHRONIZED_STATEMENT: &str = "synchronized_statement";
const NODE_LABELED_STATEMENT: &str = "labeled_statement";
const NODE_LOCAL_VARIABLE_DECLARATION: &str = "local_variable_declaration";
const NODE_EXPRESSION_STATEMENT: &str = "expression_statement";
const NODE_RETURN_STATEMENT: &str = "return_statement";
const NODE_BREAK_STATEMENT: &str = "break_statement";
const NODE_CONTINUE_STATEMENT: &str = "continue_statement";
const NODE_THROW_STATEMENT: &str = "throw_statement";
const NODE_ASSERT_STATEMENT: &str = "assert_statement";
const NODE_YIELD_STATEMENT: &str = "yield_statement";
const NODE_LINE_COMMENT: &str = "line_comment";
const NODE_BLOCK_COMMENT: &str = "block_comment";
const NODE_CATCH_CLAUSE: &str = "catch_clause";
const NODE_FINALLY_CLAUSE: &str = "finally_clause";
const NODE_CATCH_FORMAL_PARAMETER: &str = "catch_formal_parameter";
const NODE_SWITCH_GROUP: &str = "switch_block_statement_group";
const NODE_SWITCH_RULE: &str = "switch_rule";
const NODE_SWITCH_LABEL: &str = "switch_label";
const NODE_ASSIGNMENT_EXPRESSION: &str = "assignment_expression";
const NODE_METHOD_INVOCATION: &str = "method_invocation";
const NODE_IDENTIFIER: &str = "identifier";

const FIELD_NAME: &str = "name";
const FIELD_BODY: &str = "body";
const FIELD_CONDITION: &str = "condition";
const FIELD_CONSEQUENCE: &str = "consequence";
const FIELD_ALTERNATIVE: &str = "alternative";

pub(crate) const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Closed classification of the statement kinds the driver walks.
///
/// Replaces the double-dispatch visitor of classic differencing tools:
/// every kind the grammar can produce at statement position maps to one
/// variant, and the driver matches them exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementKind {
    Block,
    If,
    While,
    Do,
    For,
    Foreach,
    Switch,
    Try,
    Synchronized,
    Labeled,
    LocalVariable,
    Expression,
    Return,
    Break,
    Continue,
    Throw,
    Assert,
    Yield,
    Comment,
    Skip,
    Other,
}

fn classify(node: &Node) -> StatementKind {
    match node.kind() {
        NODE_BLOCK => StatementKind::Block,
        NODE_IF_STATEMENT => StatementKind::If,
        NODE_WHILE_STATEMENT => StatementKind::While,
        NODE_DO_STATEMENT => StatementKind::Do,
        NODE_FOR_STATEMENT => StatementKind::For,
        NODE_ENHANCED_FOR_STATEMENT => StatementKind::Foreach,
        NODE_SWITCH_EXPRESSION | NODE_SWITCH_STATEMENT => StatementKind::Switch,
        NODE_TRY_STATEMENT | NODE_TRY_WITH_RESOURCES_STATEMENT => StatementKind::Try,
        NODE_SYNCHRONIZED_STATEMENT => StatementKind::Synchronized,
        NODE_LABELED_STATEMENT => StatementKind::Labeled,
        NODE_LOCAL_VARIABLE_DECLARATION => StatementKind::LocalVariable,
        NODE_EXPRESSION_STATEMENT => StatementKind::Expression,
        NODE_RETURN_STATEMENT => StatementKind::Return,
        NODE_BREAK_STATEMENT => StatementKind::Break,
        NODE_CONTINUE_STATEMENT => StatementKind::Continue,
        NODE_THROW_STATEMENT => StatementKind::Throw,
        NODE_ASSERT_STATEMENT => StatementKind::Assert,
        NODE_YIELD_STATEMENT => StatementKind::Yield,
        NODE_LINE_COMMENT | NODE_BLOCK_COMMENT => StatementKind::Comment,
        NODE_SWITCH_LABEL => StatementKind::Skip,
        _ => StatementKind::Other,
    }
}

/// Walks a parsed method body and produces the entity tree with
/// comment associations resolved.
///
/// One driver instance handles one method; independent instances can run
/// concurrently on different files.
pub struct TraversalDriver<'src> {
    code: &'src str,
    engine: AssociationEngine,
    max_depth: usize,
}

impl<'src> TraversalDriver<'src> {
    pub fn new(code: &'src str) -> Self {
        Self {
            code,
            engine: AssociationEngine::default(),
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Convert the body of `method` into an entity tree, consuming the
    /// cleaned comment list.
    ///
    /// The comment contract (sorted, non-overlapping, inside the method
    /// range) is checked before any traversal work starts.
    pub fn convert_method(
        mut self,
        method: Node<'_>,
        comments: Vec<Comment>,
    ) -> DistillResult<EntityTree> {
        self.engine = AssociationEngine::new(comments, node_range(method))?;
        let name = method
            .child_by_field_name(FIELD_NAME)
            .map(|n| self.node_text(n))
            .unwrap_or_default();
        debug!(
            method = name,
            pending = self.engine.pending_len(),
            "converting method body"
        );

        let mut tree = EntityTree::new(EntityKind::Method, name, node_range(method));
        let root = tree.root();
        if let Some(body) = method.child_by_field_name(FIELD_BODY) {
            self.visit_body(&mut tree, root, body, 0)?;
            self.engine.resolve_inside(&mut tree, root, node_range(body));
        }
        self.engine.finish(&mut tree);
        Ok(tree)
    }

    /// Visit the statements of a brace-delimited body in source order,
    /// emitting them as children of `parent`.
    fn visit_body(
        &mut self,
        tree: &mut EntityTree,
        parent: NodeId,
        body: Node<'_>,
        depth: usize,
    ) -> DistillResult<()> {
        let mut previous = None;
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            if let Some(id) = self.visit_statement(tree, parent, previous, child, depth)? {
                previous = Some(id);
            }
        }
        Ok(())
    }

    /// Emit one statement entity and resolve the comments at its
    /// boundaries. Returns `None` for nodes that are not structural
    /// (comment tokens, switch labels).
    fn visit_statement(
        &mut self,
        tree: &mut EntityTree,
        parent: NodeId,
        previous: Option<NodeId>,
        node: Node<'_>,
        depth: usize,
    ) -> DistillResult<Option<NodeId>> {
        if depth >= self.max_depth {
            return Err(DistillError::NestingTooDeep(self.max_depth));
        }
        let range = node_range(node);

        match classify(&node) {
            StatementKind::Comment | StatementKind::Skip => Ok(None),

            StatementKind::Block => {
                let id = tree.add_child(parent, EntityKind::Block, "", range);
                self.engine.resolve_between(tree, previous, id);
                self.visit_body(tree, id, node, depth + 1)?;
                self.engine.resolve_inside(tree, id, range);
                Ok(Some(id))
            }

            StatementKind::If => self.visit_if(tree, parent, previous, node, depth),

            StatementKind::While => self.visit_loop(tree, parent, previous, node, depth, EntityKind::While),
            StatementKind::Do => self.visit_loop(tree, parent, previous, node, depth, EntityKind::Do),
            StatementKind::For => self.visit_loop(tree, parent, previous, node, depth, EntityKind::For),
            StatementKind::Foreach => {
                self.visit_loop(tree, parent, previous, node, depth, EntityKind::Foreach)
            }
            StatementKind::Synchronized => {
                self.visit_loop(tree, parent, previous, node, depth, EntityKind::Synchronized)
            }

            StatementKind::Switch => self.visit_switch(tree, parent, previous, node, depth),
            StatementKind::Try => self.visit_try(tree, parent, previous, node, depth),

            StatementKind::Labeled => {
                // the label itself carries no structure; descend into the statement
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .find(|c| c.kind() != NODE_IDENTIFIER && classify(c) != StatementKind::Comment);
                match inner {
                    Some(inner) => self.visit_statement(tree, parent, previous, inner, depth),
                    None => Ok(None),
                }
            }

            StatementKind::LocalVariable => {
                self.visit_leaf(tree, parent, previous, node, EntityKind::VariableDeclaration)
            }
            StatementKind::Expression => {
                let label = self.expression_label(node);
                self.visit_leaf(tree, parent, previous, node, label)
            }
            StatementKind::Return => self.visit_leaf(tree, parent, previous, node, EntityKind::Return),
            StatementKind::Break => self.visit_leaf(tree, parent, previous, node, EntityKind::Break),
            StatementKind::Continue => {
                self.visit_leaf(tree, parent, previous, node, EntityKind::Continue)
            }
            StatementKind::Throw => self.visit_leaf(tree, parent, previous, node, EntityKind::Throw),
            StatementKind::Assert => self.visit_leaf(tree, parent, previous, node, EntityKind::Assert),
            StatementKind::Yield => self.visit_leaf(tree, parent, previous, node, EntityKind::Yield),
            StatementKind::Other => self.visit_leaf(tree, parent, previous, node, EntityKind::Statement),
        }
    }

    /// A simple (non-compound) statement: the entity value is its
    /// normalized source text, and comments embedded within its range
    /// attach to it rather than escaping to the next sibling.
    fn visit_leaf(
        &mut self,
        tree: &mut EntityTree,
        parent: NodeId,
        previous: Option<NodeId>,
        node: Node<'_>,
        label: EntityKind,
    ) -> DistillResult<Option<NodeId>> {
        let range = node_range(node);
        let value = normalize_statement(self.node_text(node));
        let id = tree.add_child(parent, label, &value, range);
        self.engine.resolve_between(tree, previous, id);
        self.engine.resolve_inside(tree, id, range);
        Ok(Some(id))
    }

    /// Single-bodied compound constructs (loops and synchronized blocks)
    /// share one shape: header value, one nested body, trailing comments
    /// attach to the construct itself.
    fn visit_loop(
        &mut self,
        tree: &mut EntityTree,
        parent: NodeId,
        previous: Option<NodeId>,
        node: Node<'_>,
        depth: usize,
        label: EntityKind,
    ) -> DistillResult<Option<NodeId>> {
        let range = node_range(node);
        let value = self.condition_text(node);
        let id = tree.add_child(parent, label, &value, range);
        self.engine.resolve_between(tree, previous, id);
        if let Some(body) = node.child_by_field_name(FIELD_BODY) {
            self.visit_nested(tree, id, body, depth)?;
        }
        self.engine.resolve_inside(tree, id, range);
        Ok(Some(id))
    }

    fn visit_if(
        &mut self,
        tree: &mut EntityTree,
        parent: NodeId,
        previous: Option<NodeId>,
        node: Node<'_>,
        depth: usize,
    ) -> DistillResult<Option<NodeId>> {
        let range = node_range(node);
        let value = self.condition_text(node);
        let id = tree.add_child(parent, EntityKind::If, &value, range);
        self.engine.resolve_between(tree, previous, id);

        if let Some(consequence) = node.child_by_field_name(FIELD_CONSEQUENCE) {
            self.visit_nested(tree, id, consequence, depth)?;
        }
        if let Some(alternative) = node.child_by_field_name(FIELD_ALTERNATIVE) {
            if alternative.kind() == NODE_IF_STATEMENT {
                // else-if chain: the nested if becomes a child of this one
                self.visit_statement(tree, id, None, alternative, depth + 1)?;
            } else {
                let else_id =
                    tree.add_child(id, EntityKind::Else, &value, node_range(alternative));
                self.engine.resolve_between(tree, None, else_id);
                self.visit_nested(tree, else_id, alternative, depth)?;
            }
        }
        self.engine.resolve_inside(tree, id, range);
        Ok(Some(id))
    }

    fn visit_switch(
        &mut self,
        tree: &mut EntityTree,
        parent: NodeId,
        previous: Option<NodeId>,
        node: Node<'_>,
        depth: usize,
    ) -> DistillResult<Option<NodeId>> {
        let range = node_range(node);
        let value = self.condition_text(node);
        let id = tree.add_child(parent, EntityKind::Switch, &value, range);
        self.engine.resolve_between(tree, previous, id);

        if let Some(body) = node.child_by_field_name(FIELD_BODY) {
            let mut prev_case = None;
            let mut cursor = body.walk();
            for group in body.named_children(&mut cursor) {
                if !matches!(group.kind(), NODE_SWITCH_GROUP | NODE_SWITCH_RULE) {
                    continue;
                }
                let label_value = group
                    .named_child(0)
                    .filter(|c| c.kind() == NODE_SWITCH_LABEL)
                    .map(|c| normalize_statement(self.node_text(c)))
                    .unwrap_or_default();
                let case_id =
                    tree.add_child(id, EntityKind::Case, &label_value, node_range(group));
                self.engine.resolve_between(tree, prev_case, case_id);
                self.visit_body(tree, case_id, group, depth + 1)?;
                self.engine.resolve_inside(tree, case_id, node_range(group));
                prev_case = Some(case_id);
            }
        }
        self.engine.resolve_inside(tree, id, range);
        Ok(Some(id))
    }

    fn visit_try(
        &mut self,
        tree: &mut EntityTree,
        parent: NodeId,
        previous: Option<NodeId>,
        node: Node<'_>,
        depth: usize,
    ) -> DistillResult<Option<NodeId>> {
        let range = node_range(node);
        let id = tree.add_child(parent, EntityKind::Try, "", range);
        self.engine.resolve_between(tree, previous, id);

        if let Some(body) = node.child_by_field_name(FIELD_BODY) {
            self.visit_nested(tree, id, body, depth)?;
        }
        let mut cursor = node.walk();
        for clause in node.named_children(&mut cursor) {
            match clause.kind() {
                NODE_CATCH_CLAUSE => {
                    let mut param_cursor = clause.walk();
                    let param = clause
                        .named_children(&mut param_cursor)
                        .find(|c| c.kind() == NODE_CATCH_FORMAL_PARAMETER)
                        .map(|c| normalize_statement(self.node_text(c)))
                        .unwrap_or_default();
                    let catch_id =
                        tree.add_child(id, EntityKind::Catch, &param, node_range(clause));
                    self.engine.resolve_between(tree, None, catch_id);
                    if let Some(body) = clause.child_by_field_name(FIELD_BODY) {
                        self.visit_nested(tree, catch_id, body, depth)?;
                    }
                }
                NODE_FINALLY_CLAUSE => {
                    let fin_id =
                        tree.add_child(id, EntityKind::Finally, "", node_range(clause));
                    self.engine.resolve_between(tree, None, fin_id);
                    let mut block_cursor = clause.walk();
                    let block = clause
                        .named_children(&mut block_cursor)
                        .find(|c| c.kind() == NODE_BLOCK);
                    if let Some(block) = block {
                        self.visit_nested(tree, fin_id, block, depth)?;
                    }
                }
                _ => {}
            }
        }
        self.engine.resolve_inside(tree, id, range);
        Ok(Some(id))
    }

    /// Visit a construct body under `owner`. A brace-delimited block is
    /// flattened into `owner` (its statements become direct children);
    /// trailing comments inside the block attach to `owner`.
    fn visit_nested(
        &mut self,
        tree: &mut EntityTree,
        owner: NodeId,
        body: Node<'_>,
        depth: usize,
    ) -> DistillResult<()> {
        if body.kind() == NODE_BLOCK {
            self.visit_body(tree, owner, body, depth + 1)?;
            self.engine.resolve_inside(tree, owner, node_range(body));
        } else {
            self.visit_statement(tree, owner, None, body, depth + 1)?;
        }
        Ok(())
    }

    // =========================================================================
    // HELPER METHODS - Value Extraction
    // =========================================================================

    fn node_text(&self, node: Node<'_>) -> &'src str {
        let code = self.code;
        &code[node.byte_range()]
    }

    /// Condition or header of a compound statement, without the
    /// enclosing parentheses.
    fn condition_text(&self, node: Node<'_>) -> String {
        match node.child_by_field_name(FIELD_CONDITION) {
            Some(condition) => normalize_statement(strip_parens(self.node_text(condition))),
            None => self.header_text(node),
        }
    }

    /// Parenthesized header of headers without a condition field
    /// (enhanced for, synchronized, try-with-resources).
    fn header_text(&self, node: Node<'_>) -> String {
        let end = node
            .child_by_field_name(FIELD_BODY)
            .map(|b| b.start_byte())
            .unwrap_or_else(|| node.end_byte());
        let head = &self.code[node.start_byte()..end];
        match (head.find('('), head.rfind(')')) {
            (Some(open), Some(close)) if close > open => {
                normalize_statement(&head[open + 1..close])
            }
            _ => normalize_statement(head),
        }
    }

    fn expression_label(&self, node: Node<'_>) -> EntityKind {
        match node.named_child(0).map(|c| c.kind()) {
            Some(NODE_ASSIGNMENT_EXPRESSION) => EntityKind::Assignment,
            Some(NODE_METHOD_INVOCATION) => EntityKind::MethodInvocation,
            _ => EntityKind::Statement,
        }
    }
}

/// Statement text as the differencing stage prints it: embedded comments
/// removed, whitespace folded, no space around brackets and terminators.
fn normalize_statement(raw: &str) -> String {
    let stripped = strip_comments(raw);
    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for ch in stripped.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() {
                pending_space = true;
            }
            continue;
        }
        if pending_space {
            let after_open = matches!(out.chars().last(), Some('(') | Some('.'));
            if !after_open && !matches!(ch, ')' | ';' | ',' | '.') {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

/// Remove line and block comments from a source slice, leaving string
/// and character literals untouched.
fn strip_comments(raw: &str) -> String {
    #[derive(PartialEq)]
    enum Mode {
        Code,
        Str,
        Char,
        Line,
        Block,
    }

    let mut out = String::with_capacity(raw.len());
    let mut mode = Mode::Code;
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match mode {
            Mode::Code => match ch {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    mode = Mode::Line;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    mode = Mode::Block;
                }
                '"' => {
                    out.push(ch);
                    mode = Mode::Str;
                }
                '\'' => {
                    out.push(ch);
                    mode = Mode::Char;
                }
                _ => out.push(ch),
            },
            Mode::Str | Mode::Char => {
                out.push(ch);
                if ch == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if (mode == Mode::Str && ch == '"') || (mode == Mode::Char && ch == '\'') {
                    mode = Mode::Code;
                }
            }
            Mode::Line => {
                if ch == '\n' {
                    out.push(ch);
                    mode = Mode::Code;
                }
            }
            Mode::Block => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Code;
                }
            }
        }
    }
    out
}

fn strip_parens(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
    {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::java::parser::{JavaParser, find_method};

    #[test]
    fn test_classify_covers_statement_grammar_kinds() {
        let code = "class A {\n    void foo() {\n        int a = 0; // note\n        if (a > 0) {}\n        while (a > 0) { a--; }\n        return;\n    }\n}\n";
        let mut parser = JavaParser::new().expect("Failed to create parser");
        let tree = parser.parse(code).unwrap();
        let method = find_method(&tree, code, "foo").unwrap();
        let body = method.child_by_field_name(FIELD_BODY).unwrap();

        let mut cursor = body.walk();
        let kinds: Vec<StatementKind> = body
            .named_children(&mut cursor)
            .map(|c| classify(&c))
            .collect();
        assert_eq!(
            kinds,
            vec![
                StatementKind::LocalVariable,
                StatementKind::Comment,
                StatementKind::If,
                StatementKind::While,
                StatementKind::Return,
            ]
        );
    }

    #[test]
    fn test_normalize_keeps_plain_statement() {
        assert_eq!(
            normalize_statement("boolean check = (number > 0);"),
            "boolean check = (number > 0);"
        );
    }

    #[test]
    fn test_normalize_folds_multiline_statement() {
        assert_eq!(
            normalize_statement("a = (23\n            + 4);"),
            "a = (23 + 4);"
        );
    }

    #[test]
    fn test_normalize_removes_embedded_block_comment() {
        assert_eq!(
            normalize_statement("b = Math.round(Math.random() /* inner comment */);"),
            "b = Math.round(Math.random());"
        );
    }

    #[test]
    fn test_normalize_removes_trailing_line_comment() {
        assert_eq!(normalize_statement("a = b; // trailing"), "a = b;");
    }

    #[test]
    fn test_strip_comments_respects_string_literals() {
        assert_eq!(
            strip_comments(r#"s = "no /* comment */ here";"#),
            r#"s = "no /* comment */ here";"#
        );
    }

    #[test]
    fn test_strip_parens() {
        assert_eq!(strip_parens("(number > 0)"), "number > 0");
        assert_eq!(strip_parens("  ( check )  "), "check");
        assert_eq!(strip_parens("number > 0"), "number > 0");
    }
}
