use planforge_config::ConstructionPickEarlyType;
use planforge_core::{HardSoftScore, Score};
use planforge_scoring::ScoreDirector;
use planforge_test::nqueens::{get_queen_row, row_range, set_queen_row, uninitialized_director};
use planforge_test::task::{
    employee_range, get_task_employee, set_task_employee, small_assignment, task_difficulty,
    task_director,
};
use planforge_test::nqueens::Queen;
use planforge_test::NQueensSolution;

use super::*;
use crate::heuristic::r#move::ChangeMove;
use crate::heuristic::selector::{
    CachedEntitySelector, FromSolutionEntitySelector, FromSolutionValueSelector,
};
use crate::phase::Phase;
use crate::realtime::{ClosureProblemChange, SolverHandle};
use crate::scope::SolverScope;
use crate::termination::StepCountTermination;

fn queen_placer() -> QueuedEntityPlacer<
    NQueensSolution,
    i64,
    FromSolutionEntitySelector,
    FromSolutionValueSelector<NQueensSolution, i64>,
    ChangeMove<NQueensSolution, i64>,
> {
    QueuedEntityPlacer::new(
        FromSolutionEntitySelector::new(0),
        FromSolutionValueSelector::countable(row_range),
        get_queen_row,
        set_queen_row,
        0,
        "row",
    )
}

#[test]
fn test_construction_initializes_every_queen() {
    let mut scope = SolverScope::new(uninitialized_director(6));
    scope.start_solving();
    let mut phase = ConstructionHeuristicPhase::new(queen_placer(), ConstructionPickEarlyType::Never);

    phase.solve(&mut scope).unwrap();

    let solution = scope.working_solution();
    assert!(solution.queens.iter().all(|q| q.row.is_some()));
    assert_eq!(scope.score_director().uninitialized_variable_count(), 0);
    assert_eq!(scope.total_step_count(), 6);
    let best = scope.best_score().copied().unwrap();
    assert!(best.is_solution_initialized());
    assert_eq!(best, scope.calculate_score());
}

#[test]
fn test_first_queen_takes_first_row_without_conflicts() {
    let mut scope = SolverScope::new(uninitialized_director(4));
    scope.start_solving();
    let mut phase = ConstructionHeuristicPhase::new(queen_placer(), ConstructionPickEarlyType::Never);

    phase.solve(&mut scope).unwrap();

    // Every row is conflict free for the first queen; ties keep the first.
    assert_eq!(get_queen_row(scope.working_solution(), 0), Some(0));
}

#[test]
fn test_pick_early_evaluates_fewer_moves() {
    let mut never_scope = SolverScope::new(uninitialized_director(6));
    never_scope.start_solving();
    ConstructionHeuristicPhase::new(queen_placer(), ConstructionPickEarlyType::Never)
        .solve(&mut never_scope)
        .unwrap();

    let mut early_scope = SolverScope::new(uninitialized_director(6));
    early_scope.start_solving();
    ConstructionHeuristicPhase::new(
        queen_placer(),
        ConstructionPickEarlyType::FirstNonDeterioratingScore,
    )
    .solve(&mut early_scope)
    .unwrap();

    assert!(
        early_scope.statistics().total_moves_evaluated
            < never_scope.statistics().total_moves_evaluated
    );
    assert_eq!(early_scope.score_director().uninitialized_variable_count(), 0);
}

#[test]
fn test_phase_termination_leaves_entities_uninitialized() {
    let mut scope = SolverScope::new(uninitialized_director(5));
    scope.start_solving();
    let mut phase = ConstructionHeuristicPhase::new(queen_placer(), ConstructionPickEarlyType::Never)
        .with_termination(Box::new(StepCountTermination::new(2)));

    phase.solve(&mut scope).unwrap();

    assert_eq!(scope.score_director().uninitialized_variable_count(), 3);
    assert_eq!(scope.best_score().map(|s| s.init_score()), Some(-3));
}

#[test]
fn test_decreasing_difficulty_skips_pinned_tasks() {
    let mut solution = small_assignment();
    solution.tasks[2] = solution.tasks[2].clone().pinned_to(0);
    let mut scope = SolverScope::new(task_director(solution));
    scope.start_solving();

    let entities =
        CachedEntitySelector::decreasing_difficulty(FromSolutionEntitySelector::new(0), task_difficulty)
            .unwrap();
    let placer: QueuedEntityPlacer<_, usize, _, _, ChangeMove<_, usize>> = QueuedEntityPlacer::new(
        entities,
        FromSolutionValueSelector::countable(employee_range),
        get_task_employee,
        set_task_employee,
        0,
        "employee",
    );
    let mut phase = ConstructionHeuristicPhase::new(placer, ConstructionPickEarlyType::Never);
    phase.solve(&mut scope).unwrap();

    let solution = scope.working_solution();
    assert_eq!(get_task_employee(solution, 2), Some(0));
    assert!(solution.tasks.iter().all(|t| t.employee.is_some()));
    let best: HardSoftScore = scope.best_score().copied().unwrap();
    assert!(best.is_solution_initialized());
}

#[test]
fn test_unassigned_candidate_is_still_scored() {
    let mut scope = SolverScope::new(uninitialized_director(4));
    scope.start_solving();
    let mut phase = ConstructionHeuristicPhase::new(
        queen_placer().with_allows_unassigned(true),
        ConstructionPickEarlyType::Never,
    );

    phase.solve(&mut scope).unwrap();

    // 4 rows plus staying unassigned, for each of the 4 queens.
    assert_eq!(scope.statistics().total_moves_evaluated, 20);
    assert_eq!(scope.score_director().uninitialized_variable_count(), 0);
}

#[test]
fn test_queen_added_by_problem_change_is_placed() {
    let (handle, receiver) = SolverHandle::<NQueensSolution>::new();
    let mut scope = SolverScope::new(uninitialized_director(4)).with_problem_changes(receiver);
    scope.start_solving();
    handle.set_solving(true);
    handle.add_problem_change(ClosureProblemChange::<NQueensSolution, _>::new(
        "add_queen",
        |sd| {
            let index = sd.working_solution().queens.len();
            sd.before_entity_added(0, index);
            sd.working_solution_mut()
                .queens
                .push(Queen::unassigned(index as i64, index as i64));
            sd.after_entity_added(0, index);
            Ok(())
        },
    ));
    let mut phase = ConstructionHeuristicPhase::new(queen_placer(), ConstructionPickEarlyType::Never);

    phase.solve(&mut scope).unwrap();

    let solution = scope.working_solution();
    assert_eq!(solution.queens.len(), 5);
    assert!(solution.queens.iter().all(|q| q.row.is_some()));
    assert_eq!(scope.score_director().uninitialized_variable_count(), 0);
    assert_eq!(scope.total_step_count(), 5);
}

#[test]
fn test_queen_removed_by_problem_change_is_not_placed() {
    let (handle, receiver) = SolverHandle::<NQueensSolution>::new();
    let mut scope = SolverScope::new(uninitialized_director(4)).with_problem_changes(receiver);
    scope.start_solving();
    handle.set_solving(true);
    handle.add_problem_change(ClosureProblemChange::<NQueensSolution, _>::new(
        "remove_queen",
        |sd| {
            sd.before_entity_removed(0, 0);
            sd.working_solution_mut().queens.remove(0);
            sd.after_entity_removed(0, 0);
            Ok(())
        },
    ));
    let mut phase = ConstructionHeuristicPhase::new(queen_placer(), ConstructionPickEarlyType::Never);

    phase.solve(&mut scope).unwrap();

    let solution = scope.working_solution();
    assert_eq!(solution.queens.len(), 3);
    assert!(solution.queens.iter().all(|q| q.row.is_some()));
    assert_eq!(scope.total_step_count(), 3);
}
