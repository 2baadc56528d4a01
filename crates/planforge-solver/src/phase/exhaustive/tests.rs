//! Tests for the exhaustive search phase.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use planforge_config::NodeExplorationType;
use planforge_core::{PlanForgeError, Score, SimpleScore};
use planforge_scoring::{ScoreDirector, SimpleScoreDirector};
use planforge_test::nqueens::{
    calculate_conflicts, get_queen_row, nqueens_director, row_range, set_queen_row,
    uninitialized_director, NQueensScoreFn,
};
use planforge_test::NQueensSolution;

use super::*;
use crate::heuristic::r#move::ChangeMove;
use crate::heuristic::selector::{FromSolutionEntitySelector, FromSolutionValueSelector};
use crate::phase::construction::QueuedEntityPlacer;
use crate::event::StepLifecycleListener;
use crate::phase::Phase;
use crate::realtime::{ClosureProblemChange, SolverHandle};
use crate::scope::SolverScope;

type Director = SimpleScoreDirector<NQueensSolution, NQueensScoreFn>;
type QueenMove = ChangeMove<NQueensSolution, i64>;
type QueenPlacer = QueuedEntityPlacer<
    NQueensSolution,
    i64,
    FromSolutionEntitySelector,
    FromSolutionValueSelector<NQueensSolution, i64>,
    QueenMove,
>;
type QueenSearch = ExhaustiveSearchPhase<NQueensSolution, Director, QueenMove, QueenPlacer>;

fn queen_placer() -> QueenPlacer {
    QueuedEntityPlacer::new(
        FromSolutionEntitySelector::new(0),
        FromSolutionValueSelector::countable(row_range),
        get_queen_row,
        set_queen_row,
        0,
        "row",
    )
}

fn only_down_bounder() -> Box<dyn ScoreBounder<NQueensSolution>> {
    Box::new(TrendBasedScoreBounder::new(InitializingScoreTrend::uniform(
        InitializingScoreTrendLevel::OnlyDown,
        SimpleScore::levels_count(),
    )))
}

fn started_scope(director: Director) -> SolverScope<NQueensSolution, Director> {
    let mut scope = SolverScope::new(director);
    scope.start_solving();
    scope
}

fn assert_solved(scope: &SolverScope<NQueensSolution, Director>) {
    let best = scope.best_solution().unwrap();
    assert!(best.queens.iter().all(|q| q.row.is_some()));
    assert_eq!(calculate_conflicts(best), SimpleScore::of(0));
    assert_eq!(scope.best_score().copied(), Some(SimpleScore::of(0)));
    // The working solution is left at the best solution.
    assert_eq!(scope.working_solution().rows(), best.rows());
}

#[test]
fn test_brute_force_visits_every_node() {
    let mut scope = started_scope(uninitialized_director(4));
    let mut phase: QueenSearch = ExhaustiveSearchPhase::brute_force(queen_placer());

    phase.solve(&mut scope).unwrap();

    assert_solved(&scope);
    // 4 + 16 + 64 inner nodes and 256 leaves.
    assert_eq!(scope.statistics().total_moves_evaluated, 340);
    // The root and every inner node above the last layer are expanded.
    assert_eq!(scope.total_step_count(), 85);
}

#[test]
fn test_branch_and_bound_prunes() {
    let mut scope = started_scope(uninitialized_director(4));
    let mut phase: QueenSearch =
        ExhaustiveSearchPhase::branch_and_bound(queen_placer(), only_down_bounder());
    assert_eq!(phase.exploration(), NodeExplorationType::DepthFirst);

    phase.solve(&mut scope).unwrap();

    assert_solved(&scope);
    assert!(scope.statistics().total_moves_evaluated < 340);
}

/// Bounds every completion by the known optimum of the board.
#[derive(Debug)]
struct KnownScoreBounder(SimpleScore);

impl ScoreBounder<NQueensSolution> for KnownScoreBounder {
    fn calculate_optimistic_bound(
        &self,
        _score_director: &dyn ScoreDirector<NQueensSolution>,
        _score: SimpleScore,
    ) -> SimpleScore {
        self.0
    }

    fn calculate_pessimistic_bound(
        &self,
        _score_director: &dyn ScoreDirector<NQueensSolution>,
        _score: SimpleScore,
    ) -> SimpleScore {
        self.0
    }
}

#[test]
fn test_equal_bounds_still_reach_a_leaf() {
    // On two columns every complete board has exactly one conflict.
    let mut scope = started_scope(uninitialized_director(2));
    let mut phase: QueenSearch = ExhaustiveSearchPhase::branch_and_bound(
        queen_placer(),
        Box::new(KnownScoreBounder(SimpleScore::of(-1))),
    );

    phase.solve(&mut scope).unwrap();

    let best = scope.best_solution().unwrap();
    assert!(best.queens.iter().all(|q| q.row.is_some()));
    assert_eq!(scope.best_score().copied(), Some(SimpleScore::of(-1)));
    // The first leaf sets the bound and prunes the other branch.
    assert_eq!(scope.statistics().total_moves_evaluated, 4);
}

#[test]
fn test_every_exploration_type_finds_optimum() {
    for exploration in [
        NodeExplorationType::DepthFirst,
        NodeExplorationType::BreadthFirst,
        NodeExplorationType::ScoreFirst,
        NodeExplorationType::OptimisticBoundFirst,
    ] {
        let mut scope = started_scope(uninitialized_director(5));
        let mut phase: QueenSearch =
            ExhaustiveSearchPhase::branch_and_bound(queen_placer(), only_down_bounder())
                .with_exploration(exploration);

        phase.solve(&mut scope).unwrap();

        assert_solved(&scope);
    }
}

#[test]
fn test_partially_assigned_start() {
    let mut director = uninitialized_director(4);
    set_queen_row(director.working_solution_mut(), 0, Some(2));
    let mut scope = started_scope(director);
    let mut phase: QueenSearch =
        ExhaustiveSearchPhase::branch_and_bound(queen_placer(), only_down_bounder());

    phase.solve(&mut scope).unwrap();

    assert_solved(&scope);
    assert_eq!(
        scope.best_solution().unwrap().rows(),
        vec![Some(2), Some(0), Some(3), Some(1)]
    );
}

#[test]
fn test_node_limit_ends_phase() {
    let mut scope = started_scope(uninitialized_director(4));
    let mut phase: QueenSearch =
        ExhaustiveSearchPhase::brute_force(queen_placer()).with_node_limit(3);

    phase.solve(&mut scope).unwrap();

    assert_eq!(scope.total_step_count(), 1);
    assert_eq!(scope.statistics().total_moves_evaluated, 2);
    // No complete assignment was reached.
    assert!(scope.working_solution().queens.iter().all(|q| q.row.is_none()));
}

#[test]
fn test_initialized_solution_has_nothing_to_search() {
    let mut scope = started_scope(nqueens_director(&[0, 1, 2, 3]));
    let mut phase: QueenSearch = ExhaustiveSearchPhase::brute_force(queen_placer());

    phase.solve(&mut scope).unwrap();

    assert_eq!(scope.total_step_count(), 0);
    assert_eq!(
        scope.working_solution().rows(),
        vec![Some(0), Some(1), Some(2), Some(3)]
    );
}

#[test]
fn test_random_value_selection_is_rejected() {
    let placer = QueuedEntityPlacer::new(
        FromSolutionEntitySelector::new(0),
        FromSolutionValueSelector::countable(row_range).with_random(true),
        get_queen_row,
        set_queen_row,
        0,
        "row",
    );
    let mut scope = started_scope(uninitialized_director(4));
    let mut phase: QueenSearch = ExhaustiveSearchPhase::brute_force(placer);

    let result = phase.solve(&mut scope);
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
}

/// Submits one problem change when the given step starts.
#[derive(Debug)]
struct ChangeOnStep {
    step_index: u64,
    handle: SolverHandle<NQueensSolution>,
    sent: AtomicBool,
}

impl StepLifecycleListener<NQueensSolution> for ChangeOnStep {
    fn on_step_started(&self, step_index: u64) {
        if step_index == self.step_index && !self.sent.swap(true, Ordering::SeqCst) {
            self.handle
                .add_problem_change(ClosureProblemChange::<NQueensSolution, _>::new(
                    "touch_board",
                    |sd| {
                        sd.before_problem_property_changed();
                        sd.after_problem_property_changed();
                        Ok(())
                    },
                ));
        }
    }

    fn on_step_ended(&self, _step_index: u64, _score: &SimpleScore) {}
}

#[test]
fn test_problem_change_interrupts_search() {
    let (handle, receiver) = SolverHandle::<NQueensSolution>::new();
    let mut scope =
        SolverScope::new(uninitialized_director(4)).with_problem_changes(receiver);
    scope.start_solving();
    handle.set_solving(true);
    scope
        .recaller_mut()
        .event_support_mut()
        .add_step_listener(Arc::new(ChangeOnStep {
            step_index: 2,
            handle: handle.clone(),
            sent: AtomicBool::new(false),
        }));
    let mut phase: QueenSearch = ExhaustiveSearchPhase::brute_force(queen_placer());

    phase.solve(&mut scope).unwrap();

    assert_eq!(scope.problem_change_count(), 1);
    assert_eq!(handle.pending_problem_changes(), 0);
    // The change queued during step 2 is applied before step 3.
    assert_eq!(scope.total_step_count(), 3);
    let best = scope.best_solution().unwrap();
    assert_eq!(scope.working_solution().rows(), best.rows());
    let best_score = scope.best_score().copied().unwrap();
    assert_eq!(best_score, scope.calculate_score());
}
