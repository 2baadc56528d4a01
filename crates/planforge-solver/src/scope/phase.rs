//! Phase-level scope.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;

use planforge_core::{PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

use super::SolverScope;
use crate::termination::Termination;

/// Scope for a single phase of solving.
///
/// Created when a phase starts and closed with
/// [`phase_ended`](Self::phase_ended). Tracks the phase's own step count,
/// the score of its last completed step and when it last improved the best
/// solution.
pub struct PhaseScope<'a, S: PlanningSolution, D: ScoreDirector<S>> {
    solver_scope: &'a mut SolverScope<S, D>,
    phase_index: usize,
    phase_type: &'static str,
    starting_score: S::Score,
    last_completed_step_score: S::Score,
    step_count: u64,
    start_time: Instant,
    best_score_step: u64,
    best_score_time: Instant,
    start_calculation_count: u64,
}

impl<'a, S: PlanningSolution, D: ScoreDirector<S>> PhaseScope<'a, S, D> {
    /// Opens the next phase of `solver_scope`.
    pub fn new(solver_scope: &'a mut SolverScope<S, D>, phase_type: &'static str) -> Self {
        let phase_index = solver_scope.next_phase_index();
        let starting_score = solver_scope.calculate_score();
        let start_calculation_count = solver_scope.score_director().calculation_count();
        solver_scope
            .statistics_mut()
            .start_phase(phase_index, phase_type, Some(starting_score));
        solver_scope
            .event_support()
            .fire_phase_started(phase_index, phase_type);
        tracing::info!(
            event = "phase_start",
            phase = phase_type,
            phase_index,
            score = %starting_score,
        );
        let now = Instant::now();
        Self {
            solver_scope,
            phase_index,
            phase_type,
            starting_score,
            last_completed_step_score: starting_score,
            step_count: 0,
            start_time: now,
            best_score_step: 0,
            best_score_time: now,
            start_calculation_count,
        }
    }

    /// Closes the phase: logs its totals and notifies the listeners.
    pub fn phase_ended(&mut self) {
        let duration = self.elapsed();
        let best_score = self.solver_scope.best_score().copied();
        let calculations = self.calculation_count();
        if let Some(stats) =
            self.solver_scope
                .statistics_mut()
                .end_phase(duration, best_score, calculations)
        {
            let best_score = best_score.map(|s| s.to_string()).unwrap_or_default();
            tracing::info!(
                event = "phase_end",
                phase = self.phase_type,
                phase_index = self.phase_index,
                steps = stats.step_count,
                moves_evaluated = stats.moves_evaluated,
                moves_accepted = stats.moves_accepted,
                score_calculation_count = calculations,
                score = %best_score,
                duration_ms = duration.as_millis() as u64,
            );
        }
        self.solver_scope
            .event_support()
            .fire_phase_ended(self.phase_index, self.phase_type);
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn phase_type(&self) -> &'static str {
        self.phase_type
    }

    pub fn starting_score(&self) -> S::Score {
        self.starting_score
    }

    pub fn last_completed_step_score(&self) -> S::Score {
        self.last_completed_step_score
    }

    pub fn set_last_completed_step_score(&mut self, score: S::Score) {
        self.last_completed_step_score = score;
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn increment_step_count(&mut self) -> u64 {
        self.step_count += 1;
        self.solver_scope.increment_step_count();
        self.step_count
    }

    /// Score calculations done since this phase started.
    pub fn calculation_count(&self) -> u64 {
        self.solver_scope
            .score_director()
            .calculation_count()
            .saturating_sub(self.start_calculation_count)
    }

    /// Phase steps completed since this phase last improved the best
    /// solution.
    pub fn unimproved_step_count(&self) -> u64 {
        self.step_count - self.best_score_step
    }

    /// When this phase last improved the best solution, or its start time.
    pub fn best_score_time(&self) -> Instant {
        self.best_score_time
    }

    pub fn solver_scope(&self) -> &SolverScope<S, D> {
        self.solver_scope
    }

    pub fn solver_scope_mut(&mut self) -> &mut SolverScope<S, D> {
        self.solver_scope
    }

    pub fn score_director(&self) -> &D {
        self.solver_scope.score_director()
    }

    pub fn score_director_mut(&mut self) -> &mut D {
        self.solver_scope.score_director_mut()
    }

    pub fn director_and_rng(&mut self) -> (&mut D, &mut StdRng) {
        self.solver_scope.director_and_rng()
    }

    pub fn rng(&mut self) -> &mut StdRng {
        self.solver_scope.rng()
    }

    pub fn calculate_score(&mut self) -> S::Score {
        self.solver_scope.calculate_score()
    }

    pub fn best_score(&self) -> Option<S::Score> {
        self.solver_scope.best_score().copied()
    }

    /// Offers the working solution to the best solution recaller.
    pub fn update_best_solution(&mut self, step_score: S::Score) -> bool {
        let improved = self.solver_scope.update_best_solution(step_score);
        if improved {
            self.best_score_step = self.step_count;
            self.best_score_time = Instant::now();
        }
        improved
    }

    /// Offers the working solution while a move is applied.
    pub fn update_best_solution_during_move(&mut self, move_score: S::Score) -> bool {
        let improved = self.solver_scope.update_best_solution_during_move(move_score);
        if improved {
            self.best_score_step = self.step_count;
            self.best_score_time = Instant::now();
        }
        improved
    }

    /// Returns true if the solver or this phase should stop.
    pub fn is_terminated(&self, phase_termination: Option<&dyn Termination<S, D>>) -> bool {
        self.solver_scope.is_terminated()
            || phase_termination.is_some_and(|t| t.is_phase_terminated(self))
    }

    /// Fraction of the time budget spent, in `[0, 1]`.
    ///
    /// The larger of the solver and phase gradients; zero when neither
    /// termination bounds time.
    pub fn time_gradient(&self, phase_termination: Option<&dyn Termination<S, D>>) -> f64 {
        let solver = self.solver_scope.time_gradient();
        let phase = phase_termination.map_or(-1.0, |t| t.calculate_phase_time_gradient(self));
        let gradient = solver.max(phase);
        if gradient < 0.0 {
            0.0
        } else {
            gradient.min(1.0)
        }
    }

    /// Applies queued problem changes.
    ///
    /// After any change the last completed step score is reset to the
    /// rescored working solution. Returns true if a change was applied.
    pub fn process_problem_changes(&mut self) -> Result<bool> {
        let processed = self.solver_scope.process_problem_changes()?;
        if processed {
            self.last_completed_step_score = self.solver_scope.calculate_score();
        }
        Ok(processed)
    }

    /// Checks the working score against a from-scratch calculation when the
    /// environment mode asks for it.
    pub fn assert_step_score(&mut self, step_score: S::Score, context: &str) -> Result<()> {
        if self.solver_scope.environment_mode().is_asserted() {
            self.solver_scope
                .score_director_mut()
                .assert_working_score_from_scratch(step_score, context)?;
        }
        Ok(())
    }
}
