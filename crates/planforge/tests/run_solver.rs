use planforge::config::{ExhaustiveSearchConfig, PhaseConfig};
use planforge::prelude::*;
use planforge::{PlanForgeError, SimpleScoreDirector};
use planforge_test::nqueens::{
    calculate_conflicts, get_queen_row, row_range, set_queen_row, uninitialized_director,
    NQueensScoreFn,
};
use planforge_test::NQueensSolution;

type Director = SimpleScoreDirector<NQueensSolution, NQueensScoreFn>;

fn queen_row() -> BasicVariable<NQueensSolution, i64> {
    BasicVariable::new(0, "row", get_queen_row, set_queen_row, row_range)
}

#[test]
fn default_phases_solve_within_the_step_limit() {
    let config = SolverConfig::from_toml_str(
        r#"
        random_seed = 5

        [termination]
        step_count_limit = 300
        best_score_limit = "0"
        "#,
    )
    .unwrap();

    let solved = run_solver(uninitialized_director(6), &queen_row(), &config).unwrap();

    assert!(solved.queens.iter().all(|q| q.row.is_some()));
    assert_eq!(solved.score, Some(calculate_conflicts(&solved)));
}

#[test]
fn default_local_search_needs_a_termination() {
    let result = run_solver(uninitialized_director(4), &queen_row(), &SolverConfig::new());
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
}

#[test]
fn configured_exhaustive_search_finds_the_optimum() {
    let config = SolverConfig::new().with_phase(PhaseConfig::ExhaustiveSearch(
        ExhaustiveSearchConfig::default(),
    ));
    let mut solver: Solver<NQueensSolution, Director> =
        build_solver(&config, &queen_row()).unwrap();
    assert_eq!(solver.phase_count(), 1);

    let solved = solver.solve(uninitialized_director(5)).unwrap();
    assert_eq!(solved.score, Some(SimpleScore::of(0)));
}

#[test]
fn random_hill_climbing_needs_an_accepted_count_limit() {
    let unlimited = SolverConfig::from_toml_str(
        r#"
        [termination]
        step_count_limit = 50

        [[phases]]
        type = "construction_heuristic"

        [[phases]]
        type = "local_search"
        "#,
    )
    .unwrap();
    let result = run_solver(uninitialized_director(6), &queen_row(), &unlimited);
    assert!(matches!(result, Err(PlanForgeError::Config(_))));

    let limited = SolverConfig::from_toml_str(
        r#"
        random_seed = 2

        [termination]
        step_count_limit = 50
        seconds_spent_limit = 1

        [[phases]]
        type = "construction_heuristic"

        [[phases]]
        type = "local_search"

        [phases.forager]
        accepted_count_limit = 1
        "#,
    )
    .unwrap();
    let solved = run_solver(uninitialized_director(6), &queen_row(), &limited).unwrap();
    assert_eq!(solved.score, Some(calculate_conflicts(&solved)));
}
