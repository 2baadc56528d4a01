//! Heuristic components: moves and the selectors that produce them.

pub mod r#move;
pub mod selector;

pub use r#move::{ChainedChangeMove, ChangeMove, CompositeMove, EitherMove, Move, SwapMove};
pub use selector::{
    CachedEntitySelector, CachedMoveSelector, CachedValueSelector, ChainedChangeMoveSelector,
    ChangeMoveSelector, EntityReference, EntitySelector, FilteringMoveSelector,
    FromEntityValueSelector, FromSolutionEntitySelector, FromSolutionValueSelector, MoveSelector,
    SelectionCacheType, SelectionOrder, SelectorLifecycle, SwapMoveSelector, UnionMoveSelector,
    ValueSelector,
};
