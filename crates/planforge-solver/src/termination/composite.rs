//! Composite terminations.

use std::fmt::{self, Debug};

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{Termination, UNSUPPORTED_TIME_GRADIENT};
use crate::scope::{PhaseScope, SolverScope};

/// Terminates when any child terminates.
///
/// Reports the largest child time gradient.
pub struct OrTermination<S: PlanningSolution, D: ScoreDirector<S>> {
    terminations: Vec<Box<dyn Termination<S, D>>>,
}

impl<S: PlanningSolution, D: ScoreDirector<S>> OrTermination<S, D> {
    pub fn new(terminations: Vec<Box<dyn Termination<S, D>>>) -> Self {
        Self { terminations }
    }

    pub fn len(&self) -> usize {
        self.terminations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminations.is_empty()
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Termination<S, D> for OrTermination<S, D> {
    fn is_solver_terminated(&self, solver_scope: &SolverScope<S, D>) -> bool {
        self.terminations
            .iter()
            .any(|t| t.is_solver_terminated(solver_scope))
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, S, D>) -> bool {
        self.terminations
            .iter()
            .any(|t| t.is_phase_terminated(phase_scope))
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<S, D>) -> f64 {
        self.terminations
            .iter()
            .map(|t| t.calculate_solver_time_gradient(solver_scope))
            .fold(UNSUPPORTED_TIME_GRADIENT, f64::max)
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, S, D>) -> f64 {
        self.terminations
            .iter()
            .map(|t| t.calculate_phase_time_gradient(phase_scope))
            .fold(UNSUPPORTED_TIME_GRADIENT, f64::max)
    }
}

/// Terminates when every child terminates.
///
/// Reports the smallest supported child time gradient.
pub struct AndTermination<S: PlanningSolution, D: ScoreDirector<S>> {
    terminations: Vec<Box<dyn Termination<S, D>>>,
}

impl<S: PlanningSolution, D: ScoreDirector<S>> AndTermination<S, D> {
    pub fn new(terminations: Vec<Box<dyn Termination<S, D>>>) -> Self {
        Self { terminations }
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Debug for OrTermination<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OrTermination")
            .field(&self.terminations)
            .finish()
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Debug for AndTermination<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AndTermination")
            .field(&self.terminations)
            .finish()
    }
}

fn min_supported(gradients: impl Iterator<Item = f64>) -> f64 {
    gradients
        .filter(|g| *g >= 0.0)
        .fold(None, |min: Option<f64>, g| Some(min.map_or(g, |m| m.min(g))))
        .unwrap_or(UNSUPPORTED_TIME_GRADIENT)
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Termination<S, D> for AndTermination<S, D> {
    fn is_solver_terminated(&self, solver_scope: &SolverScope<S, D>) -> bool {
        !self.terminations.is_empty()
            && self
                .terminations
                .iter()
                .all(|t| t.is_solver_terminated(solver_scope))
    }

    fn is_phase_terminated(&self, phase_scope: &PhaseScope<'_, S, D>) -> bool {
        !self.terminations.is_empty()
            && self
                .terminations
                .iter()
                .all(|t| t.is_phase_terminated(phase_scope))
    }

    fn calculate_solver_time_gradient(&self, solver_scope: &SolverScope<S, D>) -> f64 {
        min_supported(
            self.terminations
                .iter()
                .map(|t| t.calculate_solver_time_gradient(solver_scope)),
        )
    }

    fn calculate_phase_time_gradient(&self, phase_scope: &PhaseScope<'_, S, D>) -> f64 {
        min_supported(
            self.terminations
                .iter()
                .map(|t| t.calculate_phase_time_gradient(phase_scope)),
        )
    }
}
