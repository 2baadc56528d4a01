//! Selector decorators for caching, filtering, and combining selectors.
//!
//! Decorators wrap inner selectors to change how their elements are
//! produced without changing the element type.
//!
//! - [`CachedEntitySelector`] - materializes entities per cache scope, in
//!   original, sorted, shuffled, random or probabilistic order
//! - [`CachedValueSelector`] - the same for entity-independent values
//! - [`CachedMoveSelector`] - the same for moves
//! - [`FilteringMoveSelector`] - filters moves by predicate
//! - [`UnionMoveSelector`] - combines several move selectors

mod cache;
mod caching;
mod filtering;
mod union;

pub use cache::{SelectionProbabilityWeight, SelectionSorter};
pub use caching::{CachedEntitySelector, CachedMoveSelector, CachedValueSelector};
pub use filtering::{FilteringMoveSelector, MoveFilter};
pub use union::UnionMoveSelector;
