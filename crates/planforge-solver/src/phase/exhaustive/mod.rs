//! Exhaustive search phase using branch-and-bound.
//!
//! Exhaustive search explores the entire solution space systematically,
//! using pruning to avoid exploring branches that cannot improve on the
//! best solution found so far.
//!
//! # Exploration Types
//!
//! - **Depth First**: Explores deepest nodes first (memory efficient)
//! - **Breadth First**: Explores level by level
//! - **Score First**: Explores best-scoring nodes first (greedy)
//! - **Optimistic Bound First**: Explores most promising bounds first (A*)

mod bounder;
mod comparator;
mod node;
mod phase;

#[cfg(test)]
mod tests;

pub use bounder::{
    InitializingScoreTrend, InitializingScoreTrendLevel, ScoreBounder, TrendBasedScoreBounder,
};
pub use comparator::{
    comparator_for, BreadthFirstComparator, DepthFirstComparator, NodeComparator,
    OptimisticBoundFirstComparator, ScoreFirstComparator,
};
pub use node::{ExhaustiveSearchNode, ExpandableNodeQueue, NodeRank};
pub use phase::ExhaustiveSearchPhase;
