//! Time-based termination.

use std::time::Duration;

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{gradient, Termination};
use crate::scope::{PhaseScope, SolverScope};

/// Terminates after a time limit.
///
/// Measures the time since solving started, or since the phase started.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use planforge_solver::termination::TimeTermination;
///
/// let term = TimeTermination::new(Duration::from_secs(30));
/// let term = TimeTermination::seconds(30);
/// let term = TimeTermination::millis(500);
/// assert_eq!(term.limit(), Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Termination<S, D> for TimeTermination {
    fn is_solver_terminated(&self, solver_scope: &SolverScope<S, D>) -> bool {
        solver_scope.elapsed() >= self.limit
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, S, D>) -> bool {
        phase_scope.elapsed() >= self.limit
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<S, D>) -> f64 {
        gradient(
            solver_scope.elapsed().as_secs_f64(),
            self.limit.as_secs_f64(),
        )
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, S, D>) -> f64 {
        gradient(phase_scope.elapsed().as_secs_f64(), self.limit.as_secs_f64())
    }
}
