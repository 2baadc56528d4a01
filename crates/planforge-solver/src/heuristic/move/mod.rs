//! Move system for modifying planning solutions.
//!
//! Moves are the atomic, reversible operations the solver explores. Every
//! move wraps each variable it touches in `before_variable_changed` /
//! `after_variable_changed` notifications and registers an undo closure
//! with the score director, so a `RecordingScoreDirector` can take it back
//! after the move has been scored.
//!
//! - `ChangeMove<S, V>` - assigns a value to a basic variable
//! - `SwapMove<S, V>` - swaps the values of two entities
//! - `ChainedChangeMove<S, A>` - moves an entity to another position in a chain
//! - `CompositeMove<S, M>` - applies several moves in sequence
//! - `EitherMove<S, V>` - a change or a swap, for union selectors

mod chained;
mod change;
mod composite;
mod either;
mod swap;

#[cfg(test)]
mod tests;

use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use crate::heuristic::selector::EntityReference;

pub use chained::ChainedChangeMove;
pub use change::ChangeMove;
pub use composite::CompositeMove;
pub use either::EitherMove;
pub use swap::SwapMove;

/// A move that modifies one or more planning variables.
///
/// # Implementation Notes
/// - `do_move` must notify the director before and after every variable
///   change and register an undo closure capturing the old value
/// - `undo_move` is computed from the state *before* the move is done
/// - The tabu attributes identify the move for tabu acceptors
pub trait Move<S: PlanningSolution>: Send + Sync + Debug + Clone {
    /// Returns true if doing the move would change the solution.
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool;

    /// Executes this move on the working solution.
    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>);

    /// Returns the move that reverts this one, given the solution before it
    /// is done.
    fn undo_move(&self, score_director: &dyn ScoreDirector<S>) -> Self;

    /// Entities changed by the move.
    fn planning_entities(&self) -> SmallVec<[EntityReference; 2]>;

    /// Hashes of the values the move assigns.
    fn planning_values(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]>;

    /// Identity hash: equal moves hash equally.
    fn tabu_hash(&self) -> u64;

    fn descriptor_index(&self) -> usize;

    fn variable_name(&self) -> &'static str;
}

/// Deterministic hash used for tabu attributes.
pub(crate) fn stable_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
