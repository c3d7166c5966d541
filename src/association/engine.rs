//! Proximity-based comment association.
//!
//! The engine owns the pending comment cursor and is invoked by the
//! traversal driver whenever a structural node boundary is crossed. All
//! decisions use only nodes that are source-adjacent to the comment, so
//! comments are resolved strictly in source order.

use crate::comment::{Comment, validate_contract};
use crate::error::DistillResult;
use crate::tree::EntityTree;
use crate::types::{NodeId, SourceRange};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Decides which pending comments attach to which entity as the driver
/// walks the statement tree.
///
/// Invoked once per source unit; internal state is discarded afterwards.
#[derive(Debug, Default)]
pub struct AssociationEngine {
    pending: VecDeque<Comment>,
}

impl AssociationEngine {
    /// Take ownership of the cleaned comment list for one unit.
    ///
    /// Fails fast when the producer's contract (sorted, non-overlapping,
    /// inside `unit`) is violated.
    pub fn new(comments: Vec<Comment>, unit: SourceRange) -> DistillResult<Self> {
        validate_contract(&comments, unit)?;
        Ok(Self {
            pending: comments.into(),
        })
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Resolve every pending comment lying between the end of `previous`
    /// and the start of `next`.
    ///
    /// The comment goes to the entity with the smaller source-offset gap;
    /// an exact tie, or an absent `previous`, favors the following
    /// entity.
    pub fn resolve_between(
        &mut self,
        tree: &mut EntityTree,
        previous: Option<NodeId>,
        next: NodeId,
    ) {
        let next_start = tree.node(next).range.start;
        while let Some(front) = self.pending.front() {
            if front.range.end > next_start {
                break;
            }
            let dist_after = next_start - front.range.end;
            let target = match previous {
                Some(prev) => {
                    let prev_end = tree.node(prev).range.end;
                    let dist_before = front.range.start.saturating_sub(prev_end);
                    if dist_before < dist_after { prev } else { next }
                }
                None => next,
            };
            if let Some(comment) = self.pending.pop_front() {
                self.attach(tree, target, comment);
            }
        }
    }

    /// Resolve every pending comment contained in `boundary` by attaching
    /// it directly to `container`.
    ///
    /// Called when a simple statement is closed (inline comments) and
    /// when a compound body is left (trailing comments with no following
    /// statement), so in-range comments never escape to a sibling.
    pub fn resolve_inside(
        &mut self,
        tree: &mut EntityTree,
        container: NodeId,
        boundary: SourceRange,
    ) {
        while let Some(front) = self.pending.front() {
            if !boundary.contains(front.range) {
                break;
            }
            if let Some(comment) = self.pending.pop_front() {
                self.attach(tree, container, comment);
            }
        }
    }

    /// Attach any still-pending comment to the root so that every comment
    /// ends up associated with exactly one entity.
    pub fn finish(&mut self, tree: &mut EntityTree) {
        if !self.pending.is_empty() {
            debug!(
                count = self.pending.len(),
                "attaching unresolved comments to the root entity"
            );
        }
        let root = tree.root();
        while let Some(comment) = self.pending.pop_front() {
            self.attach(tree, root, comment);
        }
    }

    fn attach(&mut self, tree: &mut EntityTree, target: NodeId, comment: Comment) {
        trace!(
            target_value = &*tree.node(target).value,
            comment_range = ?comment.range,
            "associating comment"
        );
        let id = tree.add_child(target, comment.kind.into(), &comment.text, comment.range);
        tree.associate(target, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentKind;
    use crate::types::EntityKind;

    fn comment(start: u32, end: u32) -> Comment {
        Comment::new(CommentKind::Line, "// c", SourceRange::new(start, end))
    }

    /// Root 0..100 with two statements at 10..20 and 40..50.
    fn two_statement_tree() -> (EntityTree, NodeId, NodeId) {
        let mut tree = EntityTree::new(EntityKind::Method, "m", SourceRange::new(0, 100));
        let root = tree.root();
        let a = tree.add_child(root, EntityKind::Statement, "a", SourceRange::new(10, 20));
        let b = tree.add_child(root, EntityKind::Statement, "b", SourceRange::new(40, 50));
        (tree, a, b)
    }

    #[test]
    fn test_closer_previous_wins() {
        let (mut tree, a, b) = two_statement_tree();
        let mut engine =
            AssociationEngine::new(vec![comment(22, 28)], SourceRange::new(0, 100)).unwrap();

        engine.resolve_between(&mut tree, Some(a), b);

        assert_eq!(engine.pending_len(), 0);
        assert_eq!(tree.node(a).associated().len(), 1);
        assert!(tree.node(b).associated().is_empty());
    }

    #[test]
    fn test_closer_next_wins() {
        let (mut tree, a, b) = two_statement_tree();
        let mut engine =
            AssociationEngine::new(vec![comment(30, 38)], SourceRange::new(0, 100)).unwrap();

        engine.resolve_between(&mut tree, Some(a), b);

        assert!(tree.node(a).associated().is_empty());
        assert_eq!(tree.node(b).associated().len(), 1);
    }

    #[test]
    fn test_exact_tie_goes_to_next() {
        let (mut tree, a, b) = two_statement_tree();
        // gap before = 25 - 20 = 5, gap after = 40 - 35 = 5
        let mut engine =
            AssociationEngine::new(vec![comment(25, 35)], SourceRange::new(0, 100)).unwrap();

        engine.resolve_between(&mut tree, Some(a), b);

        assert!(tree.node(a).associated().is_empty());
        assert_eq!(tree.node(b).associated().len(), 1);
    }

    #[test]
    fn test_no_previous_goes_to_next() {
        let (mut tree, a, _b) = two_statement_tree();
        let mut engine =
            AssociationEngine::new(vec![comment(2, 8)], SourceRange::new(0, 100)).unwrap();

        engine.resolve_between(&mut tree, None, a);

        assert_eq!(tree.node(a).associated().len(), 1);
    }

    #[test]
    fn test_comment_after_next_start_is_not_consumed() {
        let (mut tree, a, b) = two_statement_tree();
        let mut engine =
            AssociationEngine::new(vec![comment(42, 48)], SourceRange::new(0, 100)).unwrap();

        engine.resolve_between(&mut tree, Some(a), b);

        assert_eq!(engine.pending_len(), 1);
    }

    #[test]
    fn test_resolve_inside_attaches_to_container() {
        let (mut tree, a, _b) = two_statement_tree();
        let mut engine =
            AssociationEngine::new(vec![comment(12, 18)], SourceRange::new(0, 100)).unwrap();

        engine.resolve_inside(&mut tree, a, SourceRange::new(10, 20));

        let associated = tree.node(a).associated();
        assert_eq!(associated.len(), 1);
        assert_eq!(tree.node(associated[0]).label, EntityKind::LineComment);
        // back-link
        assert_eq!(tree.node(associated[0]).associated(), &[a]);
    }

    #[test]
    fn test_resolve_inside_respects_boundary() {
        let (mut tree, a, _b) = two_statement_tree();
        let mut engine =
            AssociationEngine::new(vec![comment(25, 30)], SourceRange::new(0, 100)).unwrap();

        engine.resolve_inside(&mut tree, a, SourceRange::new(10, 20));

        assert_eq!(engine.pending_len(), 1);
        assert!(tree.node(a).associated().is_empty());
    }

    #[test]
    fn test_finish_drains_to_root() {
        let (mut tree, _a, _b) = two_statement_tree();
        let mut engine =
            AssociationEngine::new(vec![comment(60, 70), comment(80, 90)], SourceRange::new(0, 100))
                .unwrap();

        engine.finish(&mut tree);

        let root = tree.root();
        assert_eq!(engine.pending_len(), 0);
        assert_eq!(tree.node(root).associated().len(), 2);
    }

    #[test]
    fn test_contract_violation_is_reported() {
        let result = AssociationEngine::new(vec![comment(60, 70)], SourceRange::new(0, 50));
        assert!(result.is_err());
    }

    #[test]
    fn test_comments_resolved_in_source_order() {
        let (mut tree, a, b) = two_statement_tree();
        let mut engine = AssociationEngine::new(
            vec![comment(22, 24), comment(26, 28)],
            SourceRange::new(0, 100),
        )
        .unwrap();

        engine.resolve_between(&mut tree, Some(a), b);

        let associated = tree.node(a).associated();
        assert_eq!(associated.len(), 2);
        assert!(tree.node(associated[0]).range.start < tree.node(associated[1]).range.start);
    }
}
