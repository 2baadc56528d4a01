//! Event system for solver monitoring and extensibility.
//!
//! Listeners registered on the solver receive notifications on the solving
//! thread, synchronously and in registration order.
//!
//! # Event Types
//!
//! - **Solver Events**: Best solution changed, solving started/ended
//! - **Phase Events**: Phase started, phase ended
//! - **Step Events**: Step started, step ended
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use planforge_core::{PlanningSolution, SimpleScore};
//! use planforge_solver::event::{BestSolutionChangedEvent, SolverEventListener, SolverEventSupport};
//!
//! #[derive(Clone, Debug)]
//! struct MySolution { score: Option<SimpleScore> }
//! impl PlanningSolution for MySolution {
//!     type Score = SimpleScore;
//!     fn score(&self) -> Option<Self::Score> { self.score }
//!     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
//! }
//!
//! #[derive(Debug)]
//! struct MyListener;
//! impl SolverEventListener<MySolution> for MyListener {
//!     fn on_best_solution_changed(&self, event: &BestSolutionChangedEvent<MySolution>) {
//!         println!("New best: {}", event.score);
//!     }
//! }
//!
//! let mut support = SolverEventSupport::<MySolution>::new();
//! support.add_solver_listener(Arc::new(MyListener));
//! assert!(support.has_solver_listeners());
//! ```

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use planforge_core::PlanningSolution;

/// A new best solution was found.
#[derive(Clone)]
pub struct BestSolutionChangedEvent<S: PlanningSolution> {
    /// A clone of the new best solution.
    pub solution: S,
    pub score: S::Score,
    /// Time since solving started.
    pub time_spent: Duration,
    /// False while problem changes are still queued.
    pub all_problem_changes_processed: bool,
}

impl<S: PlanningSolution> Debug for BestSolutionChangedEvent<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BestSolutionChangedEvent")
            .field("score", &self.score)
            .field("time_spent", &self.time_spent)
            .field(
                "all_problem_changes_processed",
                &self.all_problem_changes_processed,
            )
            .finish()
    }
}

/// Listener for solver-level events.
pub trait SolverEventListener<S: PlanningSolution>: Send + Sync + Debug {
    /// Called when a new best solution is found.
    fn on_best_solution_changed(&self, event: &BestSolutionChangedEvent<S>);

    /// Called when solving starts.
    fn on_solving_started(&self, _solution: &S) {}

    /// Called when solving ends.
    fn on_solving_ended(&self, _solution: &S, _is_terminated_early: bool) {}
}

/// Listener for phase lifecycle events.
pub trait PhaseLifecycleListener<S: PlanningSolution>: Send + Sync + Debug {
    fn on_phase_started(&self, phase_index: usize, phase_type: &str);

    fn on_phase_ended(&self, phase_index: usize, phase_type: &str);
}

/// Listener for step-level events within a phase.
pub trait StepLifecycleListener<S: PlanningSolution>: Send + Sync + Debug {
    /// `step_index` counts steps within the current phase.
    fn on_step_started(&self, step_index: u64);

    fn on_step_ended(&self, step_index: u64, score: &S::Score);
}

/// Central event broadcaster for solver events.
pub struct SolverEventSupport<S: PlanningSolution> {
    solver_listeners: Vec<Arc<dyn SolverEventListener<S>>>,
    phase_listeners: Vec<Arc<dyn PhaseLifecycleListener<S>>>,
    step_listeners: Vec<Arc<dyn StepLifecycleListener<S>>>,
}

impl<S: PlanningSolution> SolverEventSupport<S> {
    pub fn new() -> Self {
        Self {
            solver_listeners: Vec::new(),
            phase_listeners: Vec::new(),
            step_listeners: Vec::new(),
        }
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

    pub fn clear_listeners(&mut self) {
        self.solver_listeners.clear();
        self.phase_listeners.clear();
        self.step_listeners.clear();
    }

    pub fn fire_best_solution_changed(&self, event: &BestSolutionChangedEvent<S>) {
        for listener in &self.solver_listeners {
            listener.on_best_solution_changed(event);
        }
    }

    pub fn fire_solving_started(&self, solution: &S) {
        for listener in &self.solver_listeners {
            listener.on_solving_started(solution);
        }
    }

    pub fn fire_solving_ended(&self, solution: &S, is_terminated_early: bool) {
        for listener in &self.solver_listeners {
            listener.on_solving_ended(solution, is_terminated_early);
        }
    }

    pub fn fire_phase_started(&self, phase_index: usize, phase_type: &str) {
        for listener in &self.phase_listeners {
            listener.on_phase_started(phase_index, phase_type);
        }
    }

    pub fn fire_phase_ended(&self, phase_index: usize, phase_type: &str) {
        for listener in &self.phase_listeners {
            listener.on_phase_ended(phase_index, phase_type);
        }
    }

    pub fn fire_step_started(&self, step_index: u64) {
        for listener in &self.step_listeners {
            listener.on_step_started(step_index);
        }
    }

    pub fn fire_step_ended(&self, step_index: u64, score: &S::Score) {
        for listener in &self.step_listeners {
            listener.on_step_ended(step_index, score);
        }
    }

    pub fn solver_listener_count(&self) -> usize {
        self.solver_listeners.len()
    }

    pub fn phase_listener_count(&self) -> usize {
        self.phase_listeners.len()
    }

    pub fn step_listener_count(&self) -> usize {
        self.step_listeners.len()
    }

    /// Returns true if best solution events have a receiver.
    pub fn has_solver_listeners(&self) -> bool {
        !self.solver_listeners.is_empty()
    }

    pub fn has_listeners(&self) -> bool {
        !self.solver_listeners.is_empty()
            || !self.phase_listeners.is_empty()
            || !self.step_listeners.is_empty()
    }
}

impl<S: PlanningSolution> Default for SolverEventSupport<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution> Debug for SolverEventSupport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverEventSupport")
            .field("solver_listeners", &self.solver_listeners.len())
            .field("phase_listeners", &self.phase_listeners.len())
            .field("step_listeners", &self.step_listeners.len())
            .finish()
    }
}

/// A listener that counts event occurrences.
#[derive(Debug, Default)]
pub struct CountingEventListener {
    best_solution_count: AtomicUsize,
    solving_started_count: AtomicUsize,
    solving_ended_count: AtomicUsize,
    phase_started_count: AtomicUsize,
    phase_ended_count: AtomicUsize,
    step_started_count: AtomicUsize,
    step_ended_count: AtomicUsize,
}

impl CountingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_solution_count(&self) -> usize {
        self.best_solution_count.load(Ordering::SeqCst)
    }

    pub fn solving_started_count(&self) -> usize {
        self.solving_started_count.load(Ordering::SeqCst)
    }

    pub fn solving_ended_count(&self) -> usize {
        self.solving_ended_count.load(Ordering::SeqCst)
    }

    pub fn phase_started_count(&self) -> usize {
        self.phase_started_count.load(Ordering::SeqCst)
    }

    pub fn phase_ended_count(&self) -> usize {
        self.phase_ended_count.load(Ordering::SeqCst)
    }

    pub fn step_started_count(&self) -> usize {
        self.step_started_count.load(Ordering::SeqCst)
    }

    pub fn step_ended_count(&self) -> usize {
        self.step_ended_count.load(Ordering::SeqCst)
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        for counter in [
            &self.best_solution_count,
            &self.solving_started_count,
            &self.solving_ended_count,
            &self.phase_started_count,
            &self.phase_ended_count,
            &self.step_started_count,
            &self.step_ended_count,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
    }
}

impl<S: PlanningSolution> SolverEventListener<S> for CountingEventListener {
    fn on_best_solution_changed(&self, _event: &BestSolutionChangedEvent<S>) {
        self.best_solution_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_solving_started(&self, _solution: &S) {
        self.solving_started_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_solving_ended(&self, _solution: &S, _is_terminated_early: bool) {
        self.solving_ended_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl<S: PlanningSolution> PhaseLifecycleListener<S> for CountingEventListener {
    fn on_phase_started(&self, _phase_index: usize, _phase_type: &str) {
        self.phase_started_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_phase_ended(&self, _phase_index: usize, _phase_type: &str) {
        self.phase_ended_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl<S: PlanningSolution> StepLifecycleListener<S> for CountingEventListener {
    fn on_step_started(&self, _step_index: u64) {
        self.step_started_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_step_ended(&self, _step_index: u64, _score: &S::Score) {
        self.step_ended_count.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
