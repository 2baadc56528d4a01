//! Step count termination.

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{gradient, Termination};
use crate::scope::{PhaseScope, SolverScope};

/// Terminates after a number of steps.
///
/// Counts the steps of the whole solve, or of the current phase.
#[derive(Debug, Clone)]
pub struct StepCountTermination {
    limit: u64,
}

impl StepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Termination<S, D> for StepCountTermination {
    fn is_solver_terminated(&self, solver_scope: &SolverScope<S, D>) -> bool {
        solver_scope.total_step_count() >= self.limit
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, S, D>) -> bool {
        phase_scope.step_count() >= self.limit
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<S, D>) -> f64 {
        gradient(solver_scope.total_step_count() as f64, self.limit as f64)
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, S, D>) -> f64 {
        gradient(phase_scope.step_count() as f64, self.limit as f64)
    }
}
