//! Tests for the local search phase.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use planforge_config::{EnvironmentMode, LocalSearchPickEarlyType};
use planforge_core::{PlanForgeError, SimpleScore};
use planforge_scoring::SimpleScoreDirector;
use planforge_test::nqueens::{
    get_queen_row, nqueens_director, row_range, set_queen_row, NQueensScoreFn,
};
use planforge_test::NQueensSolution;

use super::*;
use crate::heuristic::r#move::ChangeMove;
use crate::heuristic::selector::{
    ChangeMoveSelector, FromSolutionEntitySelector, FromSolutionValueSelector,
};
use crate::phase::Phase;
use crate::scope::SolverScope;
use crate::termination::{OrTermination, StepCountTermination, Termination, TimeTermination};

type Director = SimpleScoreDirector<NQueensSolution, NQueensScoreFn>;
type QueenMove = ChangeMove<NQueensSolution, i64>;
type QueenSelector = ChangeMoveSelector<
    NQueensSolution,
    i64,
    FromSolutionEntitySelector,
    FromSolutionValueSelector<NQueensSolution, i64>,
>;
type QueenPhase<A> =
    LocalSearchPhase<NQueensSolution, Director, QueenMove, QueenSelector, A, AcceptedForager<SimpleScore>>;

fn queen_selector() -> QueenSelector {
    ChangeMoveSelector::new(
        FromSolutionEntitySelector::new(0),
        FromSolutionValueSelector::countable(row_range),
        get_queen_row,
        set_queen_row,
        0,
        "row",
    )
}

fn queen_phase<A: Acceptor<SimpleScore>>(
    selector: QueenSelector,
    acceptor: A,
    forager: AcceptedForager<SimpleScore>,
) -> QueenPhase<A> {
    LocalSearchPhase::new(selector, acceptor, forager)
}

fn step_limit(steps: u64) -> Box<dyn Termination<NQueensSolution, Director>> {
    Box::new(StepCountTermination::new(steps))
}

fn started_scope(rows: &[i64]) -> SolverScope<NQueensSolution, Director> {
    let mut scope = SolverScope::new(nqueens_director(rows));
    scope.start_solving();
    scope
}

fn rows(scope: &SolverScope<NQueensSolution, Director>) -> Vec<Option<i64>> {
    scope.best_solution().map(|s| s.rows()).unwrap_or_default()
}

#[test]
fn test_hill_climbing_improves_best() {
    let mut scope = started_scope(&[0, 1, 2, 3]);
    let mut phase = queen_phase(
        queen_selector(),
        HillClimbingAcceptor::new(),
        AcceptedForager::new(usize::MAX),
    )
    .with_termination(step_limit(20));

    phase.solve(&mut scope).unwrap();

    let best = scope.best_score().copied().unwrap();
    assert!(best > SimpleScore::of(-6));
    assert!(scope.total_step_count() <= 20);
    assert!(scope.statistics().total_moves_evaluated > 0);
}

#[test]
fn test_local_optimum_ends_phase() {
    let mut scope = started_scope(&[1, 3, 0, 2]);
    let mut phase = queen_phase(
        queen_selector(),
        HillClimbingAcceptor::new(),
        AcceptedForager::new(usize::MAX),
    );

    phase.solve(&mut scope).unwrap();

    assert_eq!(scope.total_step_count(), 0);
    // 4 queens with 3 other rows each; the own row is not doable.
    assert_eq!(scope.statistics().total_moves_evaluated, 12);
    assert_eq!(scope.statistics().total_moves_accepted, 0);
    assert_eq!(
        scope.working_solution().rows(),
        vec![Some(1), Some(3), Some(0), Some(2)]
    );
}

#[test]
fn test_never_ending_selector_needs_termination() {
    let mut scope = started_scope(&[0, 1, 2, 3]);
    let mut phase = queen_phase(
        queen_selector().with_random(true),
        HillClimbingAcceptor::new(),
        AcceptedForager::new(1),
    );

    let result = phase.solve(&mut scope);
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
}

#[test]
fn test_never_ending_selector_needs_a_forager_that_quits() {
    let mut scope = started_scope(&[0, 1, 2, 3]);
    let mut phase = queen_phase(
        queen_selector().with_random(true),
        HillClimbingAcceptor::new(),
        AcceptedForager::new(usize::MAX),
    )
    .with_termination(step_limit(3));

    let result = phase.solve(&mut scope);
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
    assert_eq!(scope.statistics().total_moves_evaluated, 0);
}

#[test]
fn test_never_ending_selector_with_pick_early_steps() {
    let mut scope = SolverScope::with_seed(nqueens_director(&[0, 0, 0, 0, 0, 0]), 3);
    scope.start_solving();
    let limits: Vec<Box<dyn Termination<NQueensSolution, Director>>> =
        vec![step_limit(3), Box::new(TimeTermination::seconds(1))];
    let forager = AcceptedForager::new(usize::MAX)
        .with_pick_early_type(LocalSearchPickEarlyType::FirstLastStepScoreImproving);
    let mut phase = queen_phase(
        queen_selector().with_random(true),
        HillClimbingAcceptor::new(),
        forager,
    )
    .with_termination(Box::new(OrTermination::new(limits)));

    phase.solve(&mut scope).unwrap();

    assert!(scope.total_step_count() <= 3);
    assert!(scope.best_score().copied().unwrap() > SimpleScore::of(-15));
}

#[test]
fn test_random_late_acceptance() {
    let mut scope = SolverScope::with_seed(nqueens_director(&[0, 0, 0, 0, 0, 0, 0, 0]), 7);
    scope.start_solving();
    let limits: Vec<Box<dyn Termination<NQueensSolution, Director>>> =
        vec![step_limit(100), Box::new(TimeTermination::seconds(5))];
    let termination = OrTermination::new(limits);
    let mut phase = queen_phase(
        queen_selector().with_random(true),
        LateAcceptanceAcceptor::new(10),
        AcceptedForager::new(1),
    )
    .with_termination(Box::new(termination));

    phase.solve(&mut scope).unwrap();

    let best = scope.best_score().copied().unwrap();
    assert!(best > SimpleScore::of(-28));
    assert!(scope.total_step_count() <= 100);
}

#[test]
fn test_seeded_random_runs_repeat() {
    let run = || {
        let mut scope = SolverScope::with_seed(nqueens_director(&[0, 0, 0, 0, 0, 0]), 11);
        scope.start_solving();
        // The late score stays at the worst board, so every sample is accepted.
        let mut phase = queen_phase(
            queen_selector().with_random(true),
            LateAcceptanceAcceptor::new(400),
            AcceptedForager::new(3),
        )
        .with_termination(step_limit(15));
        phase.solve(&mut scope).unwrap();
        (rows(&scope), scope.statistics().total_moves_evaluated)
    };
    assert_eq!(run(), run());
}

#[test]
fn test_parallel_evaluation_matches_sequential() {
    let run = |threads: usize| {
        let mut scope = started_scope(&[0, 0, 0, 0, 0, 0]);
        let mut phase = queen_phase(
            queen_selector(),
            HillClimbingAcceptor::new(),
            AcceptedForager::new(usize::MAX),
        )
        .with_termination(step_limit(10))
        .with_move_thread_count(threads);
        phase.solve(&mut scope).unwrap();
        (
            rows(&scope),
            scope.best_score().copied(),
            scope.statistics().total_moves_evaluated,
        )
    };
    assert_eq!(run(1), run(3));
}

#[test]
fn test_entity_tabu_keeps_stepping() {
    let mut scope = started_scope(&[0, 1, 2, 3, 4, 5]);
    let mut phase = queen_phase(
        queen_selector(),
        EntityTabuAcceptor::new(2),
        AcceptedForager::new(usize::MAX),
    )
    .with_termination(step_limit(15));

    phase.solve(&mut scope).unwrap();

    // Some queen is never tabu, so every step finds a move.
    assert_eq!(scope.total_step_count(), 15);
    let best = scope.best_score().copied().unwrap();
    assert!(best > SimpleScore::of(-15));
}

#[test]
fn test_full_assert_mode_finds_no_corruption() {
    let mut scope = SolverScope::new(nqueens_director(&[0, 1, 2, 3, 4]))
        .with_environment_mode(EnvironmentMode::FullAssert);
    scope.start_solving();
    let mut phase = queen_phase(
        queen_selector(),
        LateAcceptanceAcceptor::new(5),
        AcceptedForager::new(4),
    )
    .with_termination(step_limit(8));

    assert!(phase.solve(&mut scope).is_ok());
}

#[test]
fn test_terminate_early_flag_skips_steps() {
    let mut scope = started_scope(&[0, 1, 2, 3]);
    scope.set_terminate_early_flag(Arc::new(AtomicBool::new(true)));
    let mut phase = queen_phase(
        queen_selector(),
        HillClimbingAcceptor::new(),
        AcceptedForager::new(usize::MAX),
    );

    phase.solve(&mut scope).unwrap();

    assert_eq!(scope.total_step_count(), 0);
    assert_eq!(scope.statistics().total_moves_evaluated, 0);
}
