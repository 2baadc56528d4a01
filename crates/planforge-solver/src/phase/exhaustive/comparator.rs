//! Node orderings for exhaustive search.
//!
//! A comparator ranks expandable nodes; the greatest is expanded next. Every
//! built-in ordering ends on the breadth index, preferring older nodes, so
//! the exploration is deterministic.

use std::cmp::Ordering;
use std::fmt::Debug;

use planforge_config::NodeExplorationType;
use planforge_core::Score;

use super::node::NodeRank;

/// Orders expandable nodes. `Greater` means "expand first".
pub trait NodeComparator<Sc: Score>: Send + Debug {
    fn compare(&self, a: &NodeRank<Sc>, b: &NodeRank<Sc>) -> Ordering;
}

#[inline]
fn older_first<Sc>(a: &NodeRank<Sc>, b: &NodeRank<Sc>) -> Ordering {
    b.breadth_index.cmp(&a.breadth_index)
}

/// Deeper nodes first, then better score, then higher optimistic bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthFirstComparator;

impl<Sc: Score> NodeComparator<Sc> for DepthFirstComparator {
    fn compare(&self, a: &NodeRank<Sc>, b: &NodeRank<Sc>) -> Ordering {
        a.depth
            .cmp(&b.depth)
            .then_with(|| a.score.cmp(&b.score))
            .then_with(|| a.optimistic_bound.cmp(&b.optimistic_bound))
            .then_with(|| older_first(a, b))
    }
}

/// Shallower nodes first, then better score.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreadthFirstComparator;

impl<Sc: Score> NodeComparator<Sc> for BreadthFirstComparator {
    fn compare(&self, a: &NodeRank<Sc>, b: &NodeRank<Sc>) -> Ordering {
        b.depth
            .cmp(&a.depth)
            .then_with(|| a.score.cmp(&b.score))
            .then_with(|| older_first(a, b))
    }
}

/// Better score first, then higher optimistic bound, then deeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreFirstComparator;

impl<Sc: Score> NodeComparator<Sc> for ScoreFirstComparator {
    fn compare(&self, a: &NodeRank<Sc>, b: &NodeRank<Sc>) -> Ordering {
        a.score
            .cmp(&b.score)
            .then_with(|| a.optimistic_bound.cmp(&b.optimistic_bound))
            .then_with(|| a.depth.cmp(&b.depth))
            .then_with(|| older_first(a, b))
    }
}

/// Higher optimistic bound first, then better score, then deeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimisticBoundFirstComparator;

impl<Sc: Score> NodeComparator<Sc> for OptimisticBoundFirstComparator {
    fn compare(&self, a: &NodeRank<Sc>, b: &NodeRank<Sc>) -> Ordering {
        a.optimistic_bound
            .cmp(&b.optimistic_bound)
            .then_with(|| a.score.cmp(&b.score))
            .then_with(|| a.depth.cmp(&b.depth))
            .then_with(|| older_first(a, b))
    }
}

/// Returns the comparator for a configured exploration type.
pub fn comparator_for<Sc: Score>(exploration: NodeExplorationType) -> Box<dyn NodeComparator<Sc>> {
    match exploration {
        NodeExplorationType::DepthFirst => Box::new(DepthFirstComparator),
        NodeExplorationType::BreadthFirst => Box::new(BreadthFirstComparator),
        NodeExplorationType::ScoreFirst => Box::new(ScoreFirstComparator),
        NodeExplorationType::OptimisticBoundFirst => Box::new(OptimisticBoundFirstComparator),
    }
}

#[cfg(test)]
mod tests {
    use planforge_core::SimpleScore;

    use super::*;

    fn rank(depth: usize, breadth_index: u64, score: i64, bound: i64) -> NodeRank<SimpleScore> {
        NodeRank {
            depth,
            breadth_index,
            score: SimpleScore::of(score),
            optimistic_bound: Some(SimpleScore::of(bound)),
        }
    }

    #[test]
    fn test_depth_first() {
        let c = DepthFirstComparator;
        assert_eq!(c.compare(&rank(3, 9, -9, -9), &rank(2, 1, 0, 0)), Ordering::Greater);
        assert_eq!(c.compare(&rank(2, 9, -1, -9), &rank(2, 1, -2, 0)), Ordering::Greater);
        assert_eq!(c.compare(&rank(2, 9, -1, 0), &rank(2, 1, -1, -1)), Ordering::Greater);
        assert_eq!(c.compare(&rank(2, 1, -1, 0), &rank(2, 9, -1, 0)), Ordering::Greater);
    }

    #[test]
    fn test_breadth_first() {
        let c = BreadthFirstComparator;
        assert_eq!(c.compare(&rank(1, 9, -9, -9), &rank(2, 1, 0, 0)), Ordering::Greater);
        assert_eq!(c.compare(&rank(1, 9, 0, 0), &rank(1, 1, -1, 0)), Ordering::Greater);
        assert_eq!(c.compare(&rank(1, 1, 0, -5), &rank(1, 9, 0, 0)), Ordering::Greater);
    }

    #[test]
    fn test_score_first() {
        let c = ScoreFirstComparator;
        assert_eq!(c.compare(&rank(1, 9, 0, -9), &rank(4, 1, -1, 0)), Ordering::Greater);
        assert_eq!(c.compare(&rank(1, 9, 0, 0), &rank(4, 1, 0, -1)), Ordering::Greater);
        assert_eq!(c.compare(&rank(4, 9, 0, 0), &rank(1, 1, 0, 0)), Ordering::Greater);
    }

    #[test]
    fn test_optimistic_bound_first() {
        let c = OptimisticBoundFirstComparator;
        assert_eq!(c.compare(&rank(1, 9, -9, 0), &rank(4, 1, 0, -1)), Ordering::Greater);
        assert_eq!(c.compare(&rank(1, 9, 0, 0), &rank(4, 1, -1, 0)), Ordering::Greater);
    }

    #[test]
    fn test_comparator_for() {
        let c = comparator_for::<SimpleScore>(NodeExplorationType::BreadthFirst);
        assert_eq!(format!("{c:?}"), "BreadthFirstComparator");
    }
}
