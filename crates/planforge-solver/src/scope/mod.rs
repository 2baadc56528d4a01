//! Scope hierarchy for solver execution.
//!
//! A [`SolverScope`] lives for one `solve` call and owns the score director.
//! Each phase borrows it through a [`PhaseScope`], and each step of a phase
//! through a [`StepScope`].

mod phase;
mod solver;
mod step;


pub use phase::PhaseScope;
pub use solver::SolverScope;
pub use step::StepScope;
