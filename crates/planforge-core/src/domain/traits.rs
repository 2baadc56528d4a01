//! Core domain traits

use std::hash::Hash;

use super::lookup::LookUpKey;
use crate::score::Score;

/// Marker trait for planning solutions.
///
/// A planning solution represents both the problem definition and the
/// (potentially partial) solution. It contains:
/// - Problem facts: Immutable input data
/// - Planning entities: Things to be optimized
/// - Score: The quality of the current solution
///
/// # Example
///
/// ```
/// use planforge_core::{PlanningSolution, score::SimpleScore};
///
/// #[derive(Clone)]
/// struct NQueens {
///     n: usize,
///     rows: Vec<Option<usize>>,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for NQueens {
///     type Score = SimpleScore;
///
///     fn score(&self) -> Option<Self::Score> {
///         self.score
///     }
///
///     fn set_score(&mut self, score: Option<Self::Score>) {
///         self.score = score;
///     }
/// }
/// ```
///
/// The engine never aliases a solution: best-solution snapshots are
/// explicit `Clone` deep copies.
pub trait PlanningSolution: Clone + Send + Sync + 'static {
    /// The score type used to evaluate this solution.
    type Score: Score;

    /// Returns the current score of this solution, if calculated.
    ///
    /// Returns `None` if the solution has not been scored yet.
    fn score(&self) -> Option<Self::Score>;

    /// Sets the score of this solution.
    fn set_score(&mut self, score: Option<Self::Score>);
}

/// Marker trait for planning entities.
///
/// Entities are addressed by index inside their solution, so the trait only
/// carries the pinning flag. Pinned entities are never changed by moves or
/// placers.
pub trait PlanningEntity: Clone + Send + Sync + 'static {
    /// Returns true if this entity is pinned to its current assignment.
    fn is_pinned(&self) -> bool {
        false
    }
}

/// Trait for objects with a unique planning identifier.
///
/// Used to look up the working copy of an external object, e.g. when a
/// problem change refers to an entity of the caller's own instance.
///
/// # Example
///
/// ```
/// use planforge_core::PlanningId;
///
/// #[derive(Clone)]
/// struct Task {
///     id: i64,
///     name: String,
/// }
///
/// impl PlanningId for Task {
///     type Id = i64;
///     fn planning_id(&self) -> i64 { self.id }
/// }
/// ```
pub trait PlanningId {
    /// The type of the unique identifier.
    type Id: Eq + Hash + Clone + Send + Sync + Into<LookUpKey> + 'static;

    /// Returns the unique identifier for this object.
    ///
    /// This must never return a value that changes during solving.
    fn planning_id(&self) -> Self::Id;
}
