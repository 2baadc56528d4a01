//! Real-time planning support.
//!
//! Problem changes are submitted through a [`SolverHandle`] while the solver
//! runs. The solver drains them one at a time between steps, triggers the
//! variable listeners, rescores the working solution and replaces the best
//! solution with the result.
//!
//! # Example
//!
//! ```
//! use planforge_core::{PlanningSolution, Result, SimpleScore};
//! use planforge_scoring::ScoreDirector;
//! use planforge_solver::realtime::ProblemChange;
//!
//! #[derive(Clone, Debug)]
//! struct Task { id: usize, priority: Option<i32> }
//!
//! #[derive(Clone, Debug)]
//! struct Schedule {
//!     tasks: Vec<Task>,
//!     score: Option<SimpleScore>,
//! }
//!
//! impl PlanningSolution for Schedule {
//!     type Score = SimpleScore;
//!     fn score(&self) -> Option<Self::Score> { self.score }
//!     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
//! }
//!
//! #[derive(Debug)]
//! struct AddTask { id: usize }
//!
//! impl ProblemChange<Schedule> for AddTask {
//!     fn apply(&self, score_director: &mut dyn ScoreDirector<Schedule>) -> Result<()> {
//!         let index = score_director.working_solution().tasks.len();
//!         score_director.before_entity_added(0, index);
//!         score_director
//!             .working_solution_mut()
//!             .tasks
//!             .push(Task { id: self.id, priority: None });
//!         score_director.after_entity_added(0, index);
//!         Ok(())
//!     }
//! }
//! ```

mod problem_change;
mod solver_handle;

pub use problem_change::{BoxedProblemChange, ClosureProblemChange, ProblemChange};
pub use solver_handle::{ProblemChangeReceiver, ProblemChangeResult, SolverHandle};
