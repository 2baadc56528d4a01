//! Solver handle for submitting problem changes during solving.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use planforge_core::PlanningSolution;

use super::problem_change::BoxedProblemChange;
use super::ProblemChange;

/// Result of a problem change submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemChangeResult {
    /// Change was queued and will be applied at the next step boundary.
    Queued,
    /// Solver is not running, change was not queued.
    SolverNotRunning,
    /// The solver side of the queue is gone.
    QueueFull,
}

/// Handle for interacting with a running solver from another thread.
///
/// # Example
///
/// ```
/// use planforge_core::{PlanningSolution, Result, SimpleScore};
/// use planforge_scoring::ScoreDirector;
/// use planforge_solver::realtime::{ProblemChange, ProblemChangeResult, SolverHandle};
///
/// #[derive(Clone, Debug)]
/// struct Solution {
///     tasks: Vec<usize>,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for Solution {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<Self::Score> { self.score }
///     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
/// }
///
/// #[derive(Debug)]
/// struct AddTask { id: usize }
///
/// impl ProblemChange<Solution> for AddTask {
///     fn apply(&self, sd: &mut dyn ScoreDirector<Solution>) -> Result<()> {
///         sd.before_problem_property_changed();
///         sd.working_solution_mut().tasks.push(self.id);
///         sd.after_problem_property_changed();
///         Ok(())
///     }
/// }
///
/// let (handle, _rx) = SolverHandle::<Solution>::new();
///
/// handle.set_solving(true);
/// assert_eq!(handle.add_problem_change(AddTask { id: 42 }), ProblemChangeResult::Queued);
/// assert_eq!(handle.pending_problem_changes(), 1);
///
/// handle.set_solving(false);
/// assert_eq!(
///     handle.add_problem_change(AddTask { id: 43 }),
///     ProblemChangeResult::SolverNotRunning
/// );
/// ```
pub struct SolverHandle<S: PlanningSolution> {
    change_tx: Sender<BoxedProblemChange<S>>,
    solving: Arc<AtomicBool>,
    terminate_early: Arc<AtomicBool>,
    pending: Arc<AtomicUsize>,
}

impl<S: PlanningSolution> SolverHandle<S> {
    /// Creates a new solver handle and the receiver the solver drains.
    pub fn new() -> (Self, ProblemChangeReceiver<S>) {
        let (tx, rx) = mpsc::channel();
        let solving = Arc::new(AtomicBool::new(false));
        let terminate_early = Arc::new(AtomicBool::new(false));
        let pending = Arc::new(AtomicUsize::new(0));

        let handle = Self {
            change_tx: tx,
            solving: Arc::clone(&solving),
            terminate_early: Arc::clone(&terminate_early),
            pending: Arc::clone(&pending),
        };

        let receiver = ProblemChangeReceiver {
            change_rx: rx,
            solving,
            terminate_early,
            pending,
        };

        (handle, receiver)
    }

    /// Queues a problem change for the next step boundary.
    pub fn add_problem_change<P: ProblemChange<S> + 'static>(
        &self,
        change: P,
    ) -> ProblemChangeResult {
        self.add_problem_change_boxed(Box::new(change))
    }

    pub fn add_problem_change_boxed(&self, change: BoxedProblemChange<S>) -> ProblemChangeResult {
        if !self.solving.load(Ordering::SeqCst) {
            return ProblemChangeResult::SolverNotRunning;
        }

        self.pending.fetch_add(1, Ordering::SeqCst);
        match self.change_tx.send(change) {
            Ok(()) => ProblemChangeResult::Queued,
            Err(_) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                ProblemChangeResult::QueueFull
            }
        }
    }

    pub fn is_solving(&self) -> bool {
        self.solving.load(Ordering::SeqCst)
    }

    /// Requests early termination.
    ///
    /// Returns true if the solver was running. The solver stops at the next
    /// step boundary with its best solution.
    pub fn terminate_early(&self) -> bool {
        self.terminate_early.store(true, Ordering::SeqCst);
        self.solving.load(Ordering::SeqCst)
    }

    pub fn is_terminate_early_requested(&self) -> bool {
        self.terminate_early.load(Ordering::SeqCst)
    }

    /// Number of queued changes the solver has not applied yet.
    pub fn pending_problem_changes(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Sets the solving flag (used by the solver).
    pub fn set_solving(&self, solving: bool) {
        self.solving.store(solving, Ordering::SeqCst);
    }
}

impl<S: PlanningSolution> Clone for SolverHandle<S> {
    fn clone(&self) -> Self {
        Self {
            change_tx: self.change_tx.clone(),
            solving: Arc::clone(&self.solving),
            terminate_early: Arc::clone(&self.terminate_early),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<S: PlanningSolution> Debug for SolverHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverHandle")
            .field("solving", &self.solving.load(Ordering::SeqCst))
            .field("terminate_early", &self.terminate_early.load(Ordering::SeqCst))
            .field("pending", &self.pending.load(Ordering::SeqCst))
            .finish()
    }
}

/// Receiving side of a [`SolverHandle`], owned by the solver.
pub struct ProblemChangeReceiver<S: PlanningSolution> {
    change_rx: Receiver<BoxedProblemChange<S>>,
    solving: Arc<AtomicBool>,
    terminate_early: Arc<AtomicBool>,
    pending: Arc<AtomicUsize>,
}

impl<S: PlanningSolution> ProblemChangeReceiver<S> {
    /// Takes the next queued change without blocking.
    ///
    /// The change stays counted as pending until
    /// [`mark_processed`](Self::mark_processed) is called for it.
    pub fn try_recv(&self) -> Option<BoxedProblemChange<S>> {
        self.change_rx.try_recv().ok()
    }

    /// Marks one received change as applied.
    pub fn mark_processed(&self) {
        let _ = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub fn is_terminate_early_requested(&self) -> bool {
        self.terminate_early.load(Ordering::SeqCst)
    }

    /// The flag shared with every handle of this receiver.
    pub fn terminate_early_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate_early)
    }

    pub fn clear_terminate_early(&self) {
        self.terminate_early.store(false, Ordering::SeqCst);
    }

    pub fn set_solving(&self, solving: bool) {
        self.solving.store(solving, Ordering::SeqCst);
    }
}

impl<S: PlanningSolution> Debug for ProblemChangeReceiver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemChangeReceiver")
            .field("solving", &self.solving.load(Ordering::SeqCst))
            .field("pending", &self.pending.load(Ordering::SeqCst))
            .finish()
    }
}
