//! Best solution tracking.

use std::fmt::{self, Debug};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use crate::event::{BestSolutionChangedEvent, SolverEventSupport};

/// Remembers the best solution found so far and announces every new one.
///
/// A candidate beats the best when it has fewer uninitialized variables,
/// or as many and a better score. Announcements go synchronously to the
/// registered [`SolverEventListener`](crate::event::SolverEventListener)s and,
/// when a channel is attached, to an asynchronous consumer.
pub struct BestSolutionRecaller<S: PlanningSolution> {
    best_solution: Option<S>,
    best_score: Option<S::Score>,
    best_uninitialized_count: usize,
    best_solution_time: Option<Duration>,
    event_support: SolverEventSupport<S>,
    best_solution_sender: Option<UnboundedSender<BestSolutionChangedEvent<S>>>,
}

impl<S: PlanningSolution> BestSolutionRecaller<S> {
    pub fn new() -> Self {
        Self {
            best_solution: None,
            best_score: None,
            best_uninitialized_count: usize::MAX,
            best_solution_time: None,
            event_support: SolverEventSupport::new(),
            best_solution_sender: None,
        }
    }

    pub fn event_support(&self) -> &SolverEventSupport<S> {
        &self.event_support
    }

    pub fn event_support_mut(&mut self) -> &mut SolverEventSupport<S> {
        &mut self.event_support
    }

    /// Forwards every best solution event to `sender` as well.
    pub fn set_best_solution_sender(&mut self, sender: UnboundedSender<BestSolutionChangedEvent<S>>) {
        self.best_solution_sender = Some(sender);
    }

    /// Records the starting solution as the initial best.
    pub fn solving_started(
        &mut self,
        score_director: &mut dyn ScoreDirector<S>,
        time_spent: Duration,
        all_problem_changes_processed: bool,
    ) {
        let score = score_director.calculate_score();
        self.event_support
            .fire_solving_started(score_director.working_solution());
        self.update(
            score_director,
            score,
            time_spent,
            all_problem_changes_processed,
        );
    }

    /// Offers the working solution after a completed step.
    ///
    /// Returns true if it became the new best.
    pub fn process_working_solution_during_step(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        step_score: S::Score,
        time_spent: Duration,
        all_problem_changes_processed: bool,
    ) -> bool {
        if !self.is_improvement(score_director.uninitialized_variable_count(), step_score) {
            return false;
        }
        self.update(
            score_director,
            step_score,
            time_spent,
            all_problem_changes_processed,
        );
        true
    }

    /// Offers the working solution while a move is still applied.
    ///
    /// Used by exhaustive search, which reaches complete solutions only at
    /// the leaves of its search tree.
    pub fn process_working_solution_during_move(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        move_score: S::Score,
        time_spent: Duration,
        all_problem_changes_processed: bool,
    ) -> bool {
        self.process_working_solution_during_step(
            score_director,
            move_score,
            time_spent,
            all_problem_changes_processed,
        )
    }

    /// Replaces the best unconditionally with the rescored working solution.
    pub fn replace_best_after_problem_change(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        score: S::Score,
        time_spent: Duration,
        all_problem_changes_processed: bool,
    ) {
        self.update(
            score_director,
            score,
            time_spent,
            all_problem_changes_processed,
        );
    }

    fn is_improvement(&self, uninitialized_count: usize, score: S::Score) -> bool {
        match self.best_score {
            None => true,
            Some(best) => {
                uninitialized_count < self.best_uninitialized_count
                    || (uninitialized_count == self.best_uninitialized_count && score > best)
            }
        }
    }

    fn update(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        score: S::Score,
        time_spent: Duration,
        all_problem_changes_processed: bool,
    ) {
        let mut solution = score_director.clone_working_solution();
        solution.set_score(Some(score));

        if self.event_support.has_solver_listeners() || self.best_solution_sender.is_some() {
            let event = BestSolutionChangedEvent {
                solution: solution.clone(),
                score,
                time_spent,
                all_problem_changes_processed,
            };
            self.event_support.fire_best_solution_changed(&event);
            if let Some(sender) = &self.best_solution_sender {
                if sender.send(event).is_err() {
                    tracing::debug!("best solution receiver dropped");
                    self.best_solution_sender = None;
                }
            }
        }

        self.best_solution = Some(solution);
        self.best_score = Some(score);
        self.best_uninitialized_count = score_director.uninitialized_variable_count();
        self.best_solution_time = Some(time_spent);
    }

    pub fn best_solution(&self) -> Option<&S> {
        self.best_solution.as_ref()
    }

    pub fn best_score(&self) -> Option<&S::Score> {
        self.best_score.as_ref()
    }

    /// Time since solving started at which the current best was found.
    pub fn best_solution_time(&self) -> Option<Duration> {
        self.best_solution_time
    }

    pub fn take_best_solution(&mut self) -> Option<S> {
        self.best_solution.take()
    }
}

impl<S: PlanningSolution> Default for BestSolutionRecaller<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution> Debug for BestSolutionRecaller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BestSolutionRecaller")
            .field("best_score", &self.best_score)
            .field("best_uninitialized_count", &self.best_uninitialized_count)
            .field("event_support", &self.event_support)
            .field("has_channel", &self.best_solution_sender.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use planforge_core::SimpleScore;
    use planforge_test::nqueens::{nqueens_director, set_queen_row, uninitialized_director};
    use planforge_test::NQueensSolution;

    use super::*;
    use crate::event::CountingEventListener;

    fn place(director: &mut dyn ScoreDirector<NQueensSolution>, queen: usize, row: i64) {
        director.before_variable_changed(0, queen, "row");
        set_queen_row(director.working_solution_mut(), queen, Some(row));
        director.after_variable_changed(0, queen, "row");
    }

    #[test]
    fn test_starting_solution_is_initial_best() {
        let mut director = nqueens_director(&[0, 1, 2, 3]);
        let listener = Arc::new(CountingEventListener::new());
        let mut recaller = BestSolutionRecaller::new();
        recaller.event_support_mut().add_solver_listener(listener.clone());

        recaller.solving_started(&mut director, Duration::ZERO, true);

        assert_eq!(recaller.best_score(), Some(&director.calculate_score()));
        assert_eq!(listener.solving_started_count(), 1);
        assert_eq!(listener.best_solution_count(), 1);
        assert!(recaller.best_solution().is_some());
    }

    #[test]
    fn test_only_improvements_replace_best() {
        let mut director = nqueens_director(&[0, 1, 2, 3]);
        let mut recaller = BestSolutionRecaller::new();
        recaller.solving_started(&mut director, Duration::ZERO, true);
        let start = director.calculate_score();

        let worse = start - SimpleScore::of(1);
        assert!(!recaller.process_working_solution_during_step(
            &director,
            worse,
            Duration::ZERO,
            true
        ));
        assert_eq!(recaller.best_score(), Some(&start));

        let better = start + SimpleScore::of(2);
        assert!(recaller.process_working_solution_during_step(
            &director,
            better,
            Duration::from_millis(3),
            true
        ));
        assert_eq!(recaller.best_score(), Some(&better));
        assert_eq!(recaller.best_solution_time(), Some(Duration::from_millis(3)));
    }

    #[test]
    fn test_fewer_uninitialized_wins() {
        let mut director = uninitialized_director(4);
        let mut recaller = BestSolutionRecaller::new();
        recaller.solving_started(&mut director, Duration::ZERO, true);

        place(&mut director, 0, 0);
        let score = director.calculate_score();
        assert!(recaller.process_working_solution_during_step(
            &director,
            score,
            Duration::ZERO,
            true
        ));
        assert_eq!(recaller.best_solution().unwrap().queens[0].row, Some(0));
    }

    #[test]
    fn test_best_solution_carries_its_score() {
        let mut director = nqueens_director(&[0, 2, 1, 3]);
        let mut recaller = BestSolutionRecaller::new();
        recaller.solving_started(&mut director, Duration::ZERO, true);

        let best = recaller.best_solution().unwrap();
        assert_eq!(best.score, recaller.best_score().copied());
    }

    #[test]
    fn test_problem_change_replaces_worse_best() {
        let mut director = nqueens_director(&[0, 2, 1, 3]);
        let mut recaller = BestSolutionRecaller::new();
        recaller.solving_started(&mut director, Duration::ZERO, true);
        let start = director.calculate_score();

        let worse = start - SimpleScore::of(10);
        recaller.replace_best_after_problem_change(&director, worse, Duration::ZERO, true);
        assert_eq!(recaller.best_score(), Some(&worse));
    }

    #[test]
    fn test_channel_receives_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut director = nqueens_director(&[0, 1, 2, 3]);
        let mut recaller = BestSolutionRecaller::new();
        recaller.set_best_solution_sender(tx);

        recaller.solving_started(&mut director, Duration::ZERO, false);

        let event = rx.try_recv().unwrap();
        assert_eq!(Some(&event.score), recaller.best_score());
        assert!(!event.all_problem_changes_processed);
    }
}
