//! Termination conditions for the solver and its phases.
//!
//! A termination is asked at two levels: whether the whole solve should
//! stop ([`is_solver_terminated`](Termination::is_solver_terminated)) and
//! whether the current phase should stop
//! ([`is_phase_terminated`](Termination::is_phase_terminated)). The same
//! condition measures solver-wide quantities in the first case and
//! quantities of the current phase in the second.
//!
//! Terminations also report a *time gradient*: the fraction of their budget
//! spent, in `[0, 1]`, or `-1.0` when they do not bound the run. Simulated
//! annealing cools down along it.

mod best_score;
mod composite;
mod score_calculation_count;
mod step_count;
mod time;
mod unimproved;

use std::fmt::Debug;

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use crate::scope::{PhaseScope, SolverScope};

pub use best_score::{BestScoreFeasibleTermination, BestScoreTermination};
pub use composite::{AndTermination, OrTermination};
pub use score_calculation_count::ScoreCalculationCountTermination;
pub use step_count::StepCountTermination;
pub use time::TimeTermination;
pub use unimproved::{UnimprovedStepCountTermination, UnimprovedTimeTermination};

/// Gradient reported by terminations that do not bound the run.
pub const UNSUPPORTED_TIME_GRADIENT: f64 = -1.0;

/// Trait for determining when to stop solving.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `D` - The score director type
pub trait Termination<S: PlanningSolution, D: ScoreDirector<S>>: Send + Debug {
    /// Returns true if the whole solve should stop.
    fn is_solver_terminated(&self, solver_scope: &SolverScope<S, D>) -> bool;

    /// Returns true if the current phase should stop.
    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, S, D>) -> bool;

    fn calculate_solver_time_gradient(&self, _solver_scope: &SolverScope<S, D>) -> f64 {
        UNSUPPORTED_TIME_GRADIENT
    }

    fn calculate_phase_time_gradient(&self, _phase_scope: &PhaseScope<'_, S, D>) -> f64 {
        UNSUPPORTED_TIME_GRADIENT
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Termination<S, D> for Box<dyn Termination<S, D>> {
    fn is_solver_terminated(&self, solver_scope: &SolverScope<S, D>) -> bool {
        (**self).is_solver_terminated(solver_scope)
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, S, D>) -> bool {
        (**self).is_phase_terminated(phase_scope)
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<S, D>) -> f64 {
        (**self).calculate_solver_time_gradient(solver_scope)
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, S, D>) -> f64 {
        (**self).calculate_phase_time_gradient(phase_scope)
    }
}

/// Ratio of `spent` to `limit`, capped at one.
pub(crate) fn gradient(spent: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        1.0
    } else {
        (spent / limit).min(1.0)
    }
}
