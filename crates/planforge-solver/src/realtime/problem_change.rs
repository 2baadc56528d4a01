//! Problem change trait for real-time planning.

use std::fmt::{self, Debug};
use std::marker::PhantomData;

use planforge_core::{PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

/// A change to the problem applied between solver steps.
///
/// # Implementation Notes
///
/// - Modify the solution through `score_director.working_solution_mut()`
/// - Wrap every change in the director's before/after notifications
///   (`before_variable_changed`, `before_entity_added`,
///   `before_problem_property_changed`, ...)
/// - Resolve externally held entities with the director's lookup methods
///   rather than by index
///
/// The solver triggers the variable listeners and rescores after `apply`.
pub trait ProblemChange<S: PlanningSolution>: Send + Debug {
    /// Applies this change to the working solution.
    fn apply(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()>;
}

/// A boxed problem change for type-erased storage.
pub type BoxedProblemChange<S> = Box<dyn ProblemChange<S>>;

/// A problem change implemented as a closure.
///
/// # Example
///
/// ```
/// use planforge_core::{PlanningSolution, SimpleScore};
/// use planforge_scoring::ScoreDirector;
/// use planforge_solver::realtime::ClosureProblemChange;
///
/// #[derive(Clone, Debug)]
/// struct Solution {
///     capacity: i64,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for Solution {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<Self::Score> { self.score }
///     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
/// }
///
/// let change = ClosureProblemChange::<Solution, _>::new("raise_capacity", |sd| {
///     sd.before_problem_property_changed();
///     sd.working_solution_mut().capacity += 10;
///     sd.after_problem_property_changed();
///     Ok(())
/// });
/// assert_eq!(change.name(), "raise_capacity");
/// ```
pub struct ClosureProblemChange<S, F> {
    name: &'static str,
    change_fn: F,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, F> ClosureProblemChange<S, F>
where
    S: PlanningSolution,
    F: Fn(&mut dyn ScoreDirector<S>) -> Result<()> + Send,
{
    /// Creates a closure-based problem change named `name` for logging.
    pub fn new(name: &'static str, change_fn: F) -> Self {
        Self {
            name,
            change_fn,
            _phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<S, F> Debug for ClosureProblemChange<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureProblemChange")
            .field("name", &self.name)
            .finish()
    }
}

impl<S, F> ProblemChange<S> for ClosureProblemChange<S, F>
where
    S: PlanningSolution,
    F: Fn(&mut dyn ScoreDirector<S>) -> Result<()> + Send,
{
    fn apply(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        (self.change_fn)(score_director)
    }
}
