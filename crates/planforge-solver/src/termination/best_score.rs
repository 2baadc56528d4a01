//! Terminations on the quality of the best solution.

use std::fmt::Debug;

use planforge_core::{PlanningSolution, Score};
use planforge_scoring::ScoreDirector;

use super::Termination;
use crate::scope::{PhaseScope, SolverScope};

/// Terminates once the best score reaches a target.
///
/// The best solution must also be fully initialized.
///
/// # Example
///
/// ```
/// use planforge_core::HardSoftScore;
/// use planforge_solver::termination::BestScoreTermination;
///
/// let term = BestScoreTermination::new(HardSoftScore::of(0, -100));
/// assert_eq!(term.target(), HardSoftScore::of(0, -100));
/// ```
#[derive(Debug, Clone)]
pub struct BestScoreTermination<Sc: Score> {
    target: Sc,
}

impl<Sc: Score> BestScoreTermination<Sc> {
    pub fn new(target: Sc) -> Self {
        Self { target }
    }

    pub fn target(&self) -> Sc {
        self.target
    }

    fn is_reached(&self, best: Option<&Sc>) -> bool {
        best.is_some_and(|score| score.is_solution_initialized() && *score >= self.target)
    }
}

impl<S, D> Termination<S, D> for BestScoreTermination<S::Score>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
{
    fn is_solver_terminated(&self, solver_scope: &SolverScope<S, D>) -> bool {
        self.is_reached(solver_scope.best_score())
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, S, D>) -> bool {
        self.is_reached(phase_scope.solver_scope().best_score())
    }
}

/// Terminates once the best solution is feasible.
#[derive(Debug, Clone, Default)]
pub struct BestScoreFeasibleTermination;

impl BestScoreFeasibleTermination {
    pub fn new() -> Self {
        Self
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Termination<S, D> for BestScoreFeasibleTermination {
    fn is_solver_terminated(&self, solver_scope: &SolverScope<S, D>) -> bool {
        solver_scope.best_score().is_some_and(|s| s.is_feasible())
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, S, D>) -> bool {
        phase_scope
            .solver_scope()
            .best_score()
            .is_some_and(|s| s.is_feasible())
    }
}
