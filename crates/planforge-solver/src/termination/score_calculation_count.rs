//! Score calculation count termination.

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{gradient, Termination};
use crate::scope::{PhaseScope, SolverScope};

/// Terminates after a number of score calculations.
///
/// Counts the calculations of the score director over the whole solve, or
/// since the current phase started.
#[derive(Debug, Clone)]
pub struct ScoreCalculationCountTermination {
    limit: u64,
}

impl ScoreCalculationCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Termination<S, D>
    for ScoreCalculationCountTermination
{
    fn is_solver_terminated(&self, solver_scope: &SolverScope<S, D>) -> bool {
        solver_scope.score_director().calculation_count() >= self.limit
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, S, D>) -> bool {
        phase_scope.calculation_count() >= self.limit
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<S, D>) -> f64 {
        gradient(
            solver_scope.score_director().calculation_count() as f64,
            self.limit as f64,
        )
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, S, D>) -> f64 {
        gradient(phase_scope.calculation_count() as f64, self.limit as f64)
    }
}
