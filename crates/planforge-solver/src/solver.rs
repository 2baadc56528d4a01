//! Solver implementation.

use std::fmt::{self, Debug};
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use planforge_config::{EnvironmentMode, SolverConfig};
use planforge_core::{PlanForgeError, PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

use crate::event::{
    BestSolutionChangedEvent, PhaseLifecycleListener, SolverEventListener, StepLifecycleListener,
};
use crate::phase::Phase;
use crate::realtime::{ProblemChangeReceiver, SolverHandle};
use crate::scope::SolverScope;
use crate::statistics::SolverStatistics;
use crate::termination::Termination;

/// The main solver that optimizes planning solutions.
///
/// Runs its phases in order on one working solution, owned by the score
/// director handed to [`solve`](Solver::solve). A solver-level termination
/// and early termination through a [`SolverHandle`] stop the run at the
/// next step boundary; the best solution found so far is returned.
///
/// # Type Parameters
/// * `S` - Solution type
/// * `D` - Score director type
///
/// # Example
///
/// ```
/// use planforge_core::domain::SolutionDescriptor;
/// use planforge_core::{PlanningSolution, Result, SimpleScore};
/// use planforge_scoring::{ScoreDirector, SimpleScoreDirector};
/// use planforge_solver::phase::Phase;
/// use planforge_solver::scope::SolverScope;
/// use planforge_solver::termination::TimeTermination;
/// use planforge_solver::Solver;
///
/// #[derive(Clone, Debug)]
/// struct MySolution { score: Option<SimpleScore> }
///
/// impl PlanningSolution for MySolution {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<Self::Score> { self.score }
///     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
/// }
///
/// #[derive(Debug)]
/// struct NoOpPhase;
///
/// impl<S: PlanningSolution, D: ScoreDirector<S>> Phase<S, D> for NoOpPhase {
///     fn solve(&mut self, _: &mut SolverScope<S, D>) -> Result<()> { Ok(()) }
///     fn phase_type_name(&self) -> &'static str { "NoOp" }
/// }
///
/// type MyDirector = SimpleScoreDirector<MySolution, fn(&MySolution) -> SimpleScore>;
///
/// let mut solver: Solver<MySolution, MyDirector> = Solver::new()
///     .with_phase(Box::new(NoOpPhase))
///     .with_termination(Box::new(TimeTermination::seconds(30)));
///
/// let director = SimpleScoreDirector::new(
///     MySolution { score: None },
///     SolutionDescriptor::new("MySolution"),
///     (|_: &MySolution| SimpleScore::of(0)) as fn(&MySolution) -> SimpleScore,
/// );
/// let solved = solver.solve(director).unwrap();
/// assert_eq!(solved.score, Some(SimpleScore::of(0)));
/// ```
pub struct Solver<S: PlanningSolution, D: ScoreDirector<S>> {
    phases: Vec<Box<dyn Phase<S, D>>>,
    termination: Option<Box<dyn Termination<S, D>>>,
    environment_mode: EnvironmentMode,
    random_seed: Option<u64>,
    move_thread_count: usize,
    handle: SolverHandle<S>,
    problem_changes: Option<ProblemChangeReceiver<S>>,
    solver_listeners: Vec<Arc<dyn SolverEventListener<S>>>,
    phase_listeners: Vec<Arc<dyn PhaseLifecycleListener<S>>>,
    step_listeners: Vec<Arc<dyn StepLifecycleListener<S>>>,
    best_solution_sender: Option<UnboundedSender<BestSolutionChangedEvent<S>>>,
    statistics: Option<SolverStatistics<S::Score>>,
    config: Option<SolverConfig>,
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Debug for Solver<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("phases", &self.phases)
            .field("termination", &self.termination)
            .field("environment_mode", &self.environment_mode)
            .field("random_seed", &self.random_seed)
            .field("move_thread_count", &self.move_thread_count)
            .finish()
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Default for Solver<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Solver<S, D> {
    /// Creates a solver without phases, in reproducible mode.
    pub fn new() -> Self {
        let (handle, receiver) = SolverHandle::new();
        Solver {
            phases: Vec::new(),
            termination: None,
            environment_mode: EnvironmentMode::Reproducible,
            random_seed: None,
            move_thread_count: 1,
            handle,
            problem_changes: Some(receiver),
            solver_listeners: Vec::new(),
            phase_listeners: Vec::new(),
            step_listeners: Vec::new(),
            best_solution_sender: None,
            statistics: None,
            config: None,
        }
    }

    /// Appends a phase.
    pub fn with_phase(mut self, phase: Box<dyn Phase<S, D>>) -> Self {
        self.phases.push(phase);
        self
    }

    pub fn with_phases(mut self, phases: Vec<Box<dyn Phase<S, D>>>) -> Self {
        self.phases.extend(phases);
        self
    }

    /// Sets the termination condition of the whole solve.
    pub fn with_termination(mut self, termination: Box<dyn Termination<S, D>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_move_thread_count(mut self, count: usize) -> Self {
        self.move_thread_count = count.max(1);
        self
    }

    /// Keeps the configuration the solver was built from.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn add_solver_listener(&mut self, listener: Arc<dyn SolverEventListener<S>>) {
        self.solver_listeners.push(listener);
    }

    pub fn add_phase_listener(&mut self, listener: Arc<dyn PhaseLifecycleListener<S>>) {
        self.phase_listeners.push(listener);
    }

    pub fn add_step_listener(&mut self, listener: Arc<dyn StepLifecycleListener<S>>) {
        self.step_listeners.push(listener);
    }

    /// Returns a channel that receives every new best solution.
    ///
    /// Events are sent from the solving thread as they happen; only the
    /// most recently requested receiver is served.
    pub fn best_solution_receiver(&mut self) -> UnboundedReceiver<BestSolutionChangedEvent<S>> {
        let (tx, rx) = unbounded_channel();
        self.best_solution_sender = Some(tx);
        rx
    }

    /// A handle for submitting problem changes and terminating early from
    /// other threads.
    pub fn handle(&self) -> SolverHandle<S> {
        self.handle.clone()
    }

    /// Requests early termination of the solving process.
    ///
    /// This method is thread-safe through [`handle`](Self::handle). Returns
    /// true if the solver was solving.
    pub fn terminate_early(&self) -> bool {
        self.handle.terminate_early()
    }

    /// Returns true if the solver is currently solving.
    pub fn is_solving(&self) -> bool {
        self.handle.is_solving()
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    pub fn random_seed(&self) -> Option<u64> {
        self.random_seed
    }

    pub fn move_thread_count(&self) -> usize {
        self.move_thread_count
    }

    /// Returns the configuration if set.
    pub fn config(&self) -> Option<&SolverConfig> {
        self.config.as_ref()
    }

    /// Statistics of the last completed solve.
    pub fn statistics(&self) -> Option<&SolverStatistics<S::Score>> {
        self.statistics.as_ref()
    }

    /// Solves the working solution of `score_director`.
    ///
    /// Returns the best solution found. Fails on configuration errors and,
    /// in the asserting environment modes, on score corruption.
    pub fn solve(&mut self, score_director: D) -> Result<S> {
        if self.phases.is_empty() {
            return Err(PlanForgeError::Config(
                "the solver needs at least one phase".to_string(),
            ));
        }
        let Some(receiver) = self.problem_changes.take() else {
            return Err(PlanForgeError::InvalidState(
                "the solver is already solving".to_string(),
            ));
        };
        receiver.clear_terminate_early();
        receiver.set_solving(true);
        let terminate_early_flag = receiver.terminate_early_flag();

        let scope = match self.random_seed {
            Some(seed) => SolverScope::with_seed(score_director, seed),
            None => SolverScope::new(score_director),
        };
        let mut scope = scope
            .with_environment_mode(self.environment_mode)
            .with_move_thread_count(self.move_thread_count)
            .with_problem_changes(receiver);
        if let Some(termination) = self.termination.take() {
            scope = scope.with_termination(termination);
        }
        scope.set_terminate_early_flag(terminate_early_flag);
        self.register_listeners(&mut scope);

        scope.start_solving();
        let starting_score = scope.best_score().map(ToString::to_string).unwrap_or_default();
        tracing::info!(
            event = "solve_start",
            phases = self.phases.len(),
            environment_mode = ?self.environment_mode,
            random_seed = ?scope.random_seed(),
            move_thread_count = self.move_thread_count,
            score = %starting_score,
        );

        let outcome = self.run_phases(&mut scope);

        let terminated_early = scope.is_terminate_early();
        let statistics = scope.finish_statistics();
        if let Some(receiver) = scope.take_problem_changes() {
            receiver.set_solving(false);
            self.problem_changes = Some(receiver);
        }
        self.termination = scope.take_termination();
        outcome?;

        if let Some(best) = scope.best_solution() {
            scope
                .event_support()
                .fire_solving_ended(best, terminated_early);
        }
        let best_score = scope.best_score().map(ToString::to_string).unwrap_or_default();
        tracing::info!(
            event = "solve_end",
            steps = statistics.total_step_count,
            moves_evaluated = statistics.total_moves_evaluated,
            score_calculation_count = statistics.score_calculation_count,
            score = %best_score,
            terminated_early,
            duration_ms = statistics.total_duration.as_millis() as u64,
        );
        self.statistics = Some(statistics);
        Ok(scope.take_best_or_working_solution())
    }

    fn register_listeners(&self, scope: &mut SolverScope<S, D>) {
        let recaller = scope.recaller_mut();
        if let Some(sender) = &self.best_solution_sender {
            recaller.set_best_solution_sender(sender.clone());
        }
        let events = recaller.event_support_mut();
        for listener in &self.solver_listeners {
            events.add_solver_listener(Arc::clone(listener));
        }
        for listener in &self.phase_listeners {
            events.add_phase_listener(Arc::clone(listener));
        }
        for listener in &self.step_listeners {
            events.add_step_listener(Arc::clone(listener));
        }
    }

    fn run_phases(&mut self, scope: &mut SolverScope<S, D>) -> Result<()> {
        for phase in &mut self.phases {
            phase.solving_started(scope)?;
        }
        for phase in &mut self.phases {
            if scope.is_terminated() {
                tracing::debug!(
                    event = "phase_skipped",
                    phase = phase.phase_type_name(),
                );
                continue;
            }
            scope.process_problem_changes()?;
            phase.solve(scope)?;
        }
        for phase in &mut self.phases {
            phase.solving_ended(scope)?;
        }
        Ok(())
    }
}
