//! Exhaustive search node representation.
//!
//! Each node represents a partial solution state in the search tree: the
//! root is the solution as the phase found it, and every child assigns one
//! more entity.

use std::fmt::{self, Debug};

use planforge_core::Score;

use super::comparator::NodeComparator;
use crate::heuristic::selector::EntityReference;

/// The part of a node that decides its place in the expandable queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRank<Sc> {
    /// Number of assignments made from the root.
    pub depth: usize,
    /// Creation order among all nodes of the phase.
    pub breadth_index: u64,
    pub score: Sc,
    pub optimistic_bound: Option<Sc>,
}

/// A node in the exhaustive search tree.
///
/// Nodes live in an arena owned by the phase and refer to their parent by
/// index. A child holds the move that assigns its entity and the move
/// that undoes it, so the working solution can walk between any two
/// nodes.
pub struct ExhaustiveSearchNode<M, Sc> {
    rank: NodeRank<Sc>,
    parent_index: Option<usize>,
    entity: Option<EntityReference>,
    step_move: Option<M>,
    undo_move: Option<M>,
}

impl<M, Sc: Score> ExhaustiveSearchNode<M, Sc> {
    /// Creates the root node.
    pub fn root(score: Sc) -> Self {
        Self {
            rank: NodeRank {
                depth: 0,
                breadth_index: 0,
                score,
                optimistic_bound: None,
            },
            parent_index: None,
            entity: None,
            step_move: None,
            undo_move: None,
        }
    }

    /// Creates a child node one layer below `parent`.
    pub fn child(
        parent_index: usize,
        parent_depth: usize,
        breadth_index: u64,
        entity: EntityReference,
        step_move: M,
        undo_move: M,
        score: Sc,
    ) -> Self {
        Self {
            rank: NodeRank {
                depth: parent_depth + 1,
                breadth_index,
                score,
                optimistic_bound: None,
            },
            parent_index: Some(parent_index),
            entity: Some(entity),
            step_move: Some(step_move),
            undo_move: Some(undo_move),
        }
    }

    #[inline]
    pub fn rank(&self) -> NodeRank<Sc> {
        self.rank
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.rank.depth
    }

    #[inline]
    pub fn score(&self) -> Sc {
        self.rank.score
    }

    #[inline]
    pub fn optimistic_bound(&self) -> Option<Sc> {
        self.rank.optimistic_bound
    }

    pub fn set_optimistic_bound(&mut self, bound: Sc) {
        self.rank.optimistic_bound = Some(bound);
    }

    #[inline]
    pub fn parent_index(&self) -> Option<usize> {
        self.parent_index
    }

    #[inline]
    pub fn entity(&self) -> Option<EntityReference> {
        self.entity
    }

    pub fn step_move(&self) -> Option<&M> {
        self.step_move.as_ref()
    }

    pub fn undo_move(&self) -> Option<&M> {
        self.undo_move.as_ref()
    }

    /// Returns true if the whole subtree can be skipped: its optimistic
    /// bound does not beat `pessimistic_bound`.
    pub fn can_prune(&self, pessimistic_bound: &Sc) -> bool {
        match &self.rank.optimistic_bound {
            Some(bound) => bound <= pessimistic_bound,
            None => false,
        }
    }
}

impl<M, Sc: Score> Debug for ExhaustiveSearchNode<M, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExhaustiveSearchNode")
            .field("depth", &self.rank.depth)
            .field("breadth_index", &self.rank.breadth_index)
            .field("entity", &self.entity)
            .field("score", &self.rank.score)
            .field("optimistic_bound", &self.rank.optimistic_bound)
            .finish()
    }
}

/// Nodes waiting to be expanded, kept sorted by a [`NodeComparator`].
///
/// The node that compares greatest sits at the end and is expanded next.
pub struct ExpandableNodeQueue<Sc: Score> {
    comparator: Box<dyn NodeComparator<Sc>>,
    entries: Vec<(NodeRank<Sc>, usize)>,
    pessimistic_bound: Option<Sc>,
}

impl<Sc: Score> ExpandableNodeQueue<Sc> {
    pub fn new(comparator: Box<dyn NodeComparator<Sc>>) -> Self {
        Self {
            comparator,
            entries: Vec::new(),
            pessimistic_bound: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pessimistic_bound = None;
    }

    /// The best pessimistic bound registered so far.
    pub fn pessimistic_bound(&self) -> Option<Sc> {
        self.pessimistic_bound
    }

    /// Queues the node stored at `node_index` in the arena.
    pub fn push(&mut self, rank: NodeRank<Sc>, node_index: usize) {
        let comparator = &self.comparator;
        let position = self
            .entries
            .partition_point(|(queued, _)| comparator.compare(queued, &rank).is_le());
        self.entries.insert(position, (rank, node_index));
    }

    /// Removes the node to expand next.
    pub fn pop(&mut self) -> Option<usize> {
        self.entries.pop().map(|(_, node_index)| node_index)
    }

    /// Records `bound` if it beats the current pessimistic bound, and drops
    /// every queued node whose optimistic bound does not exceed it.
    ///
    /// Returns the number of pruned nodes.
    pub fn register_pessimistic_bound(&mut self, bound: Sc) -> usize {
        if self.pessimistic_bound.is_some_and(|current| bound <= current) {
            return 0;
        }
        self.pessimistic_bound = Some(bound);
        let before = self.entries.len();
        self.entries
            .retain(|(rank, _)| rank.optimistic_bound.map_or(true, |opt| opt > bound));
        before - self.entries.len()
    }
}

impl<Sc: Score> Debug for ExpandableNodeQueue<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpandableNodeQueue")
            .field("comparator", &self.comparator)
            .field("len", &self.entries.len())
            .field("pessimistic_bound", &self.pessimistic_bound)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use planforge_core::SimpleScore;

    use super::super::comparator::{BreadthFirstComparator, DepthFirstComparator};
    use super::*;

    fn rank(depth: usize, breadth_index: u64, score: i64, bound: Option<i64>) -> NodeRank<SimpleScore> {
        NodeRank {
            depth,
            breadth_index,
            score: SimpleScore::of(score),
            optimistic_bound: bound.map(SimpleScore::of),
        }
    }

    #[test]
    fn test_root_node() {
        let node: ExhaustiveSearchNode<(), SimpleScore> =
            ExhaustiveSearchNode::root(SimpleScore::of(-3));

        assert_eq!(node.depth(), 0);
        assert_eq!(node.score(), SimpleScore::of(-3));
        assert!(node.parent_index().is_none());
        assert!(node.entity().is_none());
        assert!(node.step_move().is_none());
    }

    #[test]
    fn test_child_node() {
        let node = ExhaustiveSearchNode::child(
            0,
            2,
            7,
            EntityReference::new(0, 4),
            "assign",
            "unassign",
            SimpleScore::of(-1),
        );

        assert_eq!(node.depth(), 3);
        assert_eq!(node.rank().breadth_index, 7);
        assert_eq!(node.parent_index(), Some(0));
        assert_eq!(node.entity(), Some(EntityReference::new(0, 4)));
        assert_eq!(node.step_move(), Some(&"assign"));
        assert_eq!(node.undo_move(), Some(&"unassign"));
    }

    #[test]
    fn test_can_prune() {
        let mut node: ExhaustiveSearchNode<(), SimpleScore> =
            ExhaustiveSearchNode::root(SimpleScore::of(-5));
        assert!(!node.can_prune(&SimpleScore::of(0)));

        node.set_optimistic_bound(SimpleScore::of(-2));
        assert!(node.can_prune(&SimpleScore::of(0)));
        assert!(node.can_prune(&SimpleScore::of(-2)));
        assert!(!node.can_prune(&SimpleScore::of(-3)));
    }

    #[test]
    fn test_queue_pops_deepest_first() {
        let mut queue = ExpandableNodeQueue::new(Box::new(DepthFirstComparator));
        queue.push(rank(1, 1, -2, None), 1);
        queue.push(rank(2, 2, -5, None), 2);
        queue.push(rank(1, 3, -1, None), 3);

        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_queue_breadth_first_keeps_creation_order_on_ties() {
        let mut queue = ExpandableNodeQueue::new(Box::new(BreadthFirstComparator));
        queue.push(rank(1, 1, 0, None), 1);
        queue.push(rank(1, 2, 0, None), 2);
        queue.push(rank(2, 3, 0, None), 3);

        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
    }

    #[test]
    fn test_pessimistic_bound_prunes_queue() {
        let mut queue = ExpandableNodeQueue::new(Box::new(DepthFirstComparator));
        queue.push(rank(1, 1, -4, Some(-4)), 1);
        queue.push(rank(1, 2, -2, Some(-2)), 2);
        queue.push(rank(1, 3, -1, Some(-1)), 3);
        queue.push(rank(1, 4, -9, None), 4);

        assert_eq!(queue.register_pessimistic_bound(SimpleScore::of(-2)), 2);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pessimistic_bound(), Some(SimpleScore::of(-2)));

        // A worse bound changes nothing.
        assert_eq!(queue.register_pessimistic_bound(SimpleScore::of(-3)), 0);
        assert_eq!(queue.pessimistic_bound(), Some(SimpleScore::of(-2)));

        let mut left = vec![queue.pop().unwrap(), queue.pop().unwrap()];
        left.sort_unstable();
        assert_eq!(left, vec![3, 4]);
    }
}
