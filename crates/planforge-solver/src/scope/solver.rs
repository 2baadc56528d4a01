//! Solver-level scope.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use planforge_config::EnvironmentMode;
use planforge_core::{PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

use crate::event::SolverEventSupport;
use crate::realtime::ProblemChangeReceiver;
use crate::recaller::BestSolutionRecaller;
use crate::statistics::SolverStatistics;
use crate::termination::Termination;

/// Seed of reproducible runs that configure none.
pub const DEFAULT_RANDOM_SEED: u64 = 0;

/// Top-level scope for the entire solving process.
///
/// Owns the score director, and with it the working solution, for the
/// duration of a solve. Generic over `D: ScoreDirector<S>` so phases drive
/// the concrete director type.
pub struct SolverScope<S: PlanningSolution, D: ScoreDirector<S>> {
    score_director: D,
    recaller: BestSolutionRecaller<S>,
    rng: StdRng,
    random_seed: Option<u64>,
    environment_mode: EnvironmentMode,
    move_thread_count: usize,
    start_time: Option<Instant>,
    total_step_count: u64,
    phase_count: usize,
    statistics: SolverStatistics<S::Score>,
    terminate_early_flag: Option<Arc<AtomicBool>>,
    termination: Option<Box<dyn Termination<S, D>>>,
    problem_changes: Option<ProblemChangeReceiver<S>>,
    problem_change_count: u64,
    last_improvement_step: u64,
    last_improvement_time: Option<Instant>,
}

impl<S: PlanningSolution, D: ScoreDirector<S>> SolverScope<S, D> {
    /// Creates a reproducible scope seeded with [`DEFAULT_RANDOM_SEED`].
    pub fn new(score_director: D) -> Self {
        Self {
            score_director,
            recaller: BestSolutionRecaller::new(),
            rng: StdRng::seed_from_u64(DEFAULT_RANDOM_SEED),
            random_seed: None,
            environment_mode: EnvironmentMode::Reproducible,
            move_thread_count: 1,
            start_time: None,
            total_step_count: 0,
            phase_count: 0,
            statistics: SolverStatistics::new(),
            terminate_early_flag: None,
            termination: None,
            problem_changes: None,
            problem_change_count: 0,
            last_improvement_step: 0,
            last_improvement_time: None,
        }
    }

    pub fn with_seed(score_director: D, seed: u64) -> Self {
        let mut scope = Self::new(score_director);
        scope.rng = StdRng::seed_from_u64(seed);
        scope.random_seed = Some(seed);
        scope
    }

    /// Sets the environment mode.
    ///
    /// A non-reproducible scope without an explicit seed draws its random
    /// numbers from OS entropy.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        if !mode.is_reproducible() && self.random_seed.is_none() {
            self.rng = StdRng::from_os_rng();
        }
        self
    }

    pub fn with_move_thread_count(mut self, count: usize) -> Self {
        self.move_thread_count = count.max(1);
        self
    }

    /// Sets the solver-level termination checked by every phase.
    pub fn with_termination(mut self, termination: Box<dyn Termination<S, D>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_problem_changes(mut self, receiver: ProblemChangeReceiver<S>) -> Self {
        self.problem_changes = Some(receiver);
        self
    }

    /// Returns true if a solver-level termination is configured.
    pub fn has_termination(&self) -> bool {
        self.termination.is_some()
    }

    pub fn set_terminate_early_flag(&mut self, flag: Arc<AtomicBool>) {
        self.terminate_early_flag = Some(flag);
    }

    /// Starts the clock and records the starting solution as the best.
    pub fn start_solving(&mut self) {
        let now = Instant::now();
        self.start_time = Some(now);
        self.total_step_count = 0;
        self.last_improvement_step = 0;
        self.last_improvement_time = Some(now);
        self.statistics = SolverStatistics::new();
        let all_processed = self.all_problem_changes_processed();
        self.recaller
            .solving_started(&mut self.score_director, Duration::ZERO, all_processed);
        if let Some(score) = self.recaller.best_score().copied() {
            self.statistics.record_improvement(Duration::ZERO, score);
        }
    }

    /// Time since [`start_solving`](Self::start_solving).
    pub fn elapsed(&self) -> Duration {
        self.start_time.map_or(Duration::ZERO, |t| t.elapsed())
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    pub fn score_director(&self) -> &D {
        &self.score_director
    }

    pub fn score_director_mut(&mut self) -> &mut D {
        &mut self.score_director
    }

    pub fn working_solution(&self) -> &S {
        self.score_director.working_solution()
    }

    pub fn calculate_score(&mut self) -> S::Score {
        self.score_director.calculate_score()
    }

    pub fn best_solution(&self) -> Option<&S> {
        self.recaller.best_solution()
    }

    pub fn best_score(&self) -> Option<&S::Score> {
        self.recaller.best_score()
    }

    pub fn event_support(&self) -> &SolverEventSupport<S> {
        self.recaller.event_support()
    }

    pub fn recaller_mut(&mut self) -> &mut BestSolutionRecaller<S> {
        &mut self.recaller
    }

    /// Offers the working solution, scored `step_score`, as the new best.
    ///
    /// Returns true if it improved on the best solution.
    pub fn update_best_solution(&mut self, step_score: S::Score) -> bool {
        let time_spent = self.elapsed();
        let all_processed = self.all_problem_changes_processed();
        let improved = self.recaller.process_working_solution_during_step(
            &self.score_director,
            step_score,
            time_spent,
            all_processed,
        );
        if improved {
            self.record_improvement(step_score, time_spent);
        }
        improved
    }

    /// Like [`update_best_solution`](Self::update_best_solution), while a
    /// move is still applied to the working solution.
    pub fn update_best_solution_during_move(&mut self, move_score: S::Score) -> bool {
        let time_spent = self.elapsed();
        let all_processed = self.all_problem_changes_processed();
        let improved = self.recaller.process_working_solution_during_move(
            &self.score_director,
            move_score,
            time_spent,
            all_processed,
        );
        if improved {
            self.record_improvement(move_score, time_spent);
        }
        improved
    }

    fn record_improvement(&mut self, score: S::Score, time_spent: Duration) {
        self.last_improvement_step = self.total_step_count;
        self.last_improvement_time = Some(Instant::now());
        self.statistics.record_improvement(time_spent, score);
    }

    /// Replaces the working solution with a clone of the best solution.
    pub fn restore_best_solution(&mut self) {
        if let Some(best) = self.recaller.best_solution() {
            let best = best.clone();
            self.score_director.set_working_solution(best);
            self.score_director.calculate_score();
        }
    }

    /// Steps completed since the last best solution improvement.
    pub fn unimproved_step_count(&self) -> u64 {
        self.total_step_count - self.last_improvement_step
    }

    pub fn last_improvement_time(&self) -> Option<Instant> {
        self.last_improvement_time
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Borrows the score director and the random generator together.
    pub fn director_and_rng(&mut self) -> (&mut D, &mut StdRng) {
        (&mut self.score_director, &mut self.rng)
    }

    pub fn random_seed(&self) -> Option<u64> {
        self.random_seed
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    pub fn move_thread_count(&self) -> usize {
        self.move_thread_count
    }

    pub fn increment_step_count(&mut self) -> u64 {
        self.total_step_count += 1;
        self.statistics.record_step();
        self.total_step_count
    }

    pub fn total_step_count(&self) -> u64 {
        self.total_step_count
    }

    /// Hands out the index of the next phase.
    pub(crate) fn next_phase_index(&mut self) -> usize {
        let index = self.phase_count;
        self.phase_count += 1;
        index
    }

    pub fn phase_count(&self) -> usize {
        self.phase_count
    }

    pub fn statistics(&self) -> &SolverStatistics<S::Score> {
        &self.statistics
    }

    pub fn statistics_mut(&mut self) -> &mut SolverStatistics<S::Score> {
        &mut self.statistics
    }

    /// Returns the collected statistics, closing the run totals.
    pub fn finish_statistics(&mut self) -> SolverStatistics<S::Score> {
        self.statistics.total_duration = self.elapsed();
        self.statistics.score_calculation_count = self.score_director.calculation_count();
        self.statistics.clone()
    }

    pub fn is_terminate_early(&self) -> bool {
        self.terminate_early_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Returns true if early termination was requested or the solver-level
    /// termination fired.
    pub fn is_terminated(&self) -> bool {
        self.is_terminate_early()
            || self
                .termination
                .as_ref()
                .is_some_and(|t| t.is_solver_terminated(self))
    }

    /// Fraction of the solver-level time budget spent, or `-1.0` if the
    /// termination does not bound time.
    pub fn time_gradient(&self) -> f64 {
        self.termination
            .as_ref()
            .map_or(-1.0, |t| t.calculate_solver_time_gradient(self))
    }

    /// Number of problem changes applied so far.
    pub fn problem_change_count(&self) -> u64 {
        self.problem_change_count
    }

    pub fn all_problem_changes_processed(&self) -> bool {
        self.problem_changes
            .as_ref()
            .map_or(true, |receiver| !receiver.has_pending())
    }

    /// Applies the queued problem changes one at a time.
    ///
    /// Each change is followed by the variable listeners and a rescore, and
    /// replaces the best solution unconditionally. Returns true if any
    /// change was applied.
    pub fn process_problem_changes(&mut self) -> Result<bool> {
        let Some(receiver) = &self.problem_changes else {
            return Ok(false);
        };
        let mut processed = false;
        while let Some(change) = receiver.try_recv() {
            change.apply(&mut self.score_director)?;
            self.score_director.trigger_variable_listeners();
            receiver.mark_processed();
            self.problem_change_count += 1;
            processed = true;

            let score = self.score_director.calculate_score();
            let time_spent = self.start_time.map_or(Duration::ZERO, |t| t.elapsed());
            tracing::debug!(
                event = "problem_change",
                change = ?change,
                score = %score,
            );
            self.recaller.replace_best_after_problem_change(
                &self.score_director,
                score,
                time_spent,
                !receiver.has_pending(),
            );
        }
        Ok(processed)
    }

    /// Gives back the solver-level termination.
    pub fn take_termination(&mut self) -> Option<Box<dyn Termination<S, D>>> {
        self.termination.take()
    }

    /// Gives back the problem change receiver.
    pub fn take_problem_changes(&mut self) -> Option<ProblemChangeReceiver<S>> {
        self.problem_changes.take()
    }

    pub fn take_best_or_working_solution(mut self) -> S {
        match self.recaller.take_best_solution() {
            Some(best) => best,
            None => self.score_director.clone_working_solution(),
        }
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> std::fmt::Debug for SolverScope<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverScope")
            .field("environment_mode", &self.environment_mode)
            .field("random_seed", &self.random_seed)
            .field("total_step_count", &self.total_step_count)
            .field("best_score", &self.recaller.best_score())
            .finish()
    }
}
