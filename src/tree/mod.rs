//! Entity tree produced for the tree-differencing stage.
//!
//! Structural nodes mirror the parsed statement tree one-to-one; comment
//! nodes are leaves added as children of the code entity they annotate.
//! Ownership runs downward through `children` (arena indices); `parent`
//! and `associated` are non-owning id lookups.

use crate::types::{CompactString, EntityKind, NodeId, SourceRange};
use std::collections::VecDeque;

/// A node of the output tree: a statement, declaration, expression, or
/// comment, with cross-links to the nodes it is associated with.
#[derive(Debug, Clone)]
pub struct EntityNode {
    pub label: EntityKind,
    pub value: CompactString,
    pub range: SourceRange,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    associated: Vec<NodeId>,
}

impl EntityNode {
    fn new(label: EntityKind, value: &str, range: SourceRange) -> Self {
        Self {
            label,
            value: value.into(),
            range,
            parent: None,
            children: Vec::new(),
            associated: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Cross-links in insertion order: for a code entity the comments
    /// attached to it, for a comment entity the single code entity it
    /// was matched to.
    pub fn associated(&self) -> &[NodeId] {
        &self.associated
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_comment(&self) -> bool {
        self.label.is_comment()
    }
}

/// Arena-backed entity tree with a single root.
#[derive(Debug, Clone)]
pub struct EntityTree {
    nodes: Vec<EntityNode>,
    root: NodeId,
}

impl EntityTree {
    /// Create a tree containing only the root entity.
    pub fn new(label: EntityKind, value: &str, range: SourceRange) -> Self {
        Self {
            nodes: vec![EntityNode::new(label, value, range)],
            root: NodeId::from_index(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &EntityNode {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut EntityNode {
        &mut self.nodes[id.index()]
    }

    /// Append a new entity as the last child of `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        label: EntityKind,
        value: &str,
        range: SourceRange,
    ) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        let mut node = EntityNode::new(label, value, range);
        node.parent = Some(parent);
        self.nodes.push(node);
        self.node_mut(parent).children.push(id);
        id
    }

    /// Record the undirected association between two entities.
    ///
    /// The link is stored once on each side, preserving insertion order.
    pub fn associate(&mut self, a: NodeId, b: NodeId) {
        debug_assert!(!self.node(a).associated.contains(&b));
        debug_assert!(!self.node(b).associated.contains(&a));
        self.node_mut(a).associated.push(b);
        self.node_mut(b).associated.push(a);
    }

    /// Pre-order depth-first enumeration starting at the root.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Breadth-first enumeration starting at the root.
    pub fn breadth_first(&self) -> BreadthFirst<'_> {
        let mut queue = VecDeque::new();
        queue.push_back(self.root);
        BreadthFirst { tree: self, queue }
    }

    /// First node (in breadth-first order) whose value matches exactly.
    pub fn find_by_value(&self, value: &str) -> Option<NodeId> {
        self.breadth_first()
            .find(|id| &*self.node(*id).value == value)
    }
}

pub struct DepthFirst<'t> {
    tree: &'t EntityTree,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack.extend(node.children.iter().rev());
        Some(id)
    }
}

pub struct BreadthFirst<'t> {
    tree: &'t EntityTree,
    queue: VecDeque<NodeId>,
}

impl Iterator for BreadthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.queue.pop_front()?;
        self.queue.extend(self.tree.node(id).children.iter());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> EntityTree {
        let mut tree = EntityTree::new(EntityKind::Method, "foo", SourceRange::new(0, 100));
        let root = tree.root();
        let a = tree.add_child(
            root,
            EntityKind::VariableDeclaration,
            "int a = 0;",
            SourceRange::new(10, 20),
        );
        tree.add_child(
            a,
            EntityKind::Statement,
            "nested",
            SourceRange::new(12, 18),
        );
        tree.add_child(
            root,
            EntityKind::Return,
            "return a;",
            SourceRange::new(30, 40),
        );
        tree
    }

    #[test]
    fn test_parent_child_links() {
        let tree = sample_tree();
        let root = tree.root();

        let children = tree.node(root).children();
        assert_eq!(children.len(), 2);
        assert_eq!(tree.node(children[0]).parent(), Some(root));
        assert!(tree.node(root).parent().is_none());
    }

    #[test]
    fn test_depth_first_is_preorder() {
        let tree = sample_tree();
        let values: Vec<&str> = tree
            .depth_first()
            .map(|id| &*tree.node(id).value)
            .collect();
        assert_eq!(values, vec!["foo", "int a = 0;", "nested", "return a;"]);
    }

    #[test]
    fn test_breadth_first_order() {
        let tree = sample_tree();
        let values: Vec<&str> = tree
            .breadth_first()
            .map(|id| &*tree.node(id).value)
            .collect();
        assert_eq!(values, vec!["foo", "int a = 0;", "return a;", "nested"]);
    }

    #[test]
    fn test_associate_is_symmetric() {
        let mut tree = sample_tree();
        let root = tree.root();
        let stmt = tree.node(root).children()[0];
        let comment = tree.add_child(
            stmt,
            EntityKind::LineComment,
            "// note",
            SourceRange::new(5, 12),
        );

        tree.associate(stmt, comment);

        assert_eq!(tree.node(stmt).associated(), &[comment]);
        assert_eq!(tree.node(comment).associated(), &[stmt]);
    }

    #[test]
    fn test_find_by_value() {
        let tree = sample_tree();
        let id = tree.find_by_value("return a;").unwrap();
        assert_eq!(tree.node(id).label, EntityKind::Return);
        assert!(tree.find_by_value("missing").is_none());
    }
}
