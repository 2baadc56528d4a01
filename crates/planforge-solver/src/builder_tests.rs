use planforge_config::{
    EntityTabuConfig, EnvironmentMode, LateAcceptanceConfig, MoveThreadCount, PhaseConfig,
    SelectionCacheType, SelectionOrder, SimulatedAnnealingConfig,
};
use planforge_core::{HardSoftScore, SimpleScore};
use planforge_scoring::SimpleScoreDirector;
use planforge_test::nqueens::{
    calculate_conflicts, get_queen_row, row_range, set_queen_row, uninitialized_director,
    NQueensScoreFn,
};
use planforge_test::NQueensSolution;

use super::*;
use crate::heuristic::r#move::ChangeMove;
use crate::heuristic::selector::{
    ChangeMoveSelector, FromSolutionEntitySelector, FromSolutionValueSelector,
};
use crate::phase::construction::QueuedEntityPlacer;
use crate::phase::Phase;

type Director = SimpleScoreDirector<NQueensSolution, NQueensScoreFn>;
type QueenMove = ChangeMove<NQueensSolution, i64>;

fn entity_tabu(size: usize) -> AcceptorConfig {
    AcceptorConfig::EntityTabu(EntityTabuConfig {
        entity_tabu_size: size,
        aspiration_enabled: true,
    })
}

fn late_acceptance(size: usize) -> AcceptorConfig {
    AcceptorConfig::LateAcceptance(LateAcceptanceConfig {
        late_acceptance_size: Some(size),
        hill_climbing_enabled: true,
    })
}

fn queen_placer() -> QueuedEntityPlacer<
    NQueensSolution,
    i64,
    FromSolutionEntitySelector,
    FromSolutionValueSelector<NQueensSolution, i64>,
    QueenMove,
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

fn queen_selector() -> ChangeMoveSelector<
    NQueensSolution,
    i64,
    FromSolutionEntitySelector,
    FromSolutionValueSelector<NQueensSolution, i64>,
> {
    ChangeMoveSelector::new(
        FromSolutionEntitySelector::new(0),
        FromSolutionValueSelector::countable(row_range),
        get_queen_row,
        set_queen_row,
        0,
        "row",
    )
}

#[test]
fn test_no_acceptor_means_hill_climbing() {
    let acceptor = AcceptorBuilder::build_all::<SimpleScore>(&[]).unwrap();
    assert!(format!("{:?}", acceptor).contains("HillClimbingAcceptor"));
}

#[test]
fn test_several_acceptors_are_combined() {
    let acceptor =
        AcceptorBuilder::build_all::<SimpleScore>(&[entity_tabu(7), late_acceptance(20)])
            .unwrap();
    let debug = format!("{:?}", acceptor);
    assert!(debug.contains("CompositeAcceptor"));
    assert!(debug.contains("EntityTabuAcceptor"));
}

#[test]
fn test_simulated_annealing_temperature_is_parsed() {
    let config = AcceptorConfig::SimulatedAnnealing(SimulatedAnnealingConfig {
        starting_temperature: "2hard/100soft".to_string(),
    });
    assert!(AcceptorBuilder::build::<HardSoftScore>(&config).is_ok());

    let bad = AcceptorConfig::SimulatedAnnealing(SimulatedAnnealingConfig {
        starting_temperature: "warm".to_string(),
    });
    let result = AcceptorBuilder::build::<HardSoftScore>(&bad);
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
}

#[test]
fn test_accepted_count_limit_defaults() {
    assert_eq!(
        ForagerBuilder::accepted_count_limit(None, &[entity_tabu(7)]),
        DEFAULT_TABU_ACCEPTED_COUNT_LIMIT
    );
    assert_eq!(
        ForagerBuilder::accepted_count_limit(None, &[late_acceptance(10)]),
        1
    );
    assert_eq!(
        ForagerBuilder::accepted_count_limit(None, &[AcceptorConfig::HillClimbing]),
        usize::MAX
    );
    assert_eq!(ForagerBuilder::accepted_count_limit(None, &[]), usize::MAX);

    let configured = ForagerConfig {
        accepted_count_limit: Some(4),
        ..ForagerConfig::default()
    };
    assert_eq!(
        ForagerBuilder::accepted_count_limit(Some(&configured), &[entity_tabu(7)]),
        4
    );
}

#[test]
fn test_empty_termination_builds_nothing() {
    let termination =
        TerminationBuilder::build::<NQueensSolution, Director>(&TerminationConfig::default())
            .unwrap();
    assert!(termination.is_none());
}

#[test]
fn test_single_termination_is_not_wrapped() {
    let config = TerminationConfig {
        step_count_limit: Some(10),
        ..TerminationConfig::default()
    };
    let termination = TerminationBuilder::build::<NQueensSolution, Director>(&config)
        .unwrap()
        .unwrap();
    assert!(format!("{:?}", termination).starts_with("StepCountTermination"));
}

#[test]
fn test_termination_composition_style() {
    let or_config = TerminationConfig {
        seconds_spent_limit: Some(5),
        best_score_limit: Some("0".to_string()),
        ..TerminationConfig::default()
    };
    let or = TerminationBuilder::build::<NQueensSolution, Director>(&or_config)
        .unwrap()
        .unwrap();
    assert!(format!("{:?}", or).starts_with("OrTermination"));

    let and_config = TerminationConfig {
        termination_composition_style: TerminationCompositionStyle::And,
        ..or_config
    };
    let and = TerminationBuilder::build::<NQueensSolution, Director>(&and_config)
        .unwrap()
        .unwrap();
    assert!(format!("{:?}", and).starts_with("AndTermination"));
}

#[test]
fn test_invalid_best_score_limit() {
    let config = TerminationConfig {
        best_score_limit: Some("0hard/0soft".to_string()),
        ..TerminationConfig::default()
    };
    let result = TerminationBuilder::build::<NQueensSolution, Director>(&config);
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
}

#[test]
fn test_entity_sorter_manner_follows_heuristic_type() {
    let mut config = ConstructionHeuristicConfig {
        construction_heuristic_type: ConstructionHeuristicType::FirstFitDecreasing,
        ..ConstructionHeuristicConfig::default()
    };
    assert_eq!(
        PhaseBuilder::entity_sorter_manner(&config),
        EntitySorterManner::DecreasingDifficulty
    );

    config.entity_sorter_manner = Some(EntitySorterManner::None);
    assert_eq!(
        PhaseBuilder::entity_sorter_manner(&config),
        EntitySorterManner::None
    );
}

#[test]
fn test_cached_move_selector_validates_order() {
    let shuffled_jit = MoveSelectorConfig {
        selection_order: Some(SelectionOrder::Shuffled),
        cache_type: Some(SelectionCacheType::JustInTime),
    };
    let result = PhaseBuilder::cached_move_selector::<NQueensSolution, QueenMove, _>(
        &shuffled_jit,
        queen_selector(),
    );
    assert!(matches!(result, Err(PlanForgeError::Config(_))));

    let shuffled_step = MoveSelectorConfig {
        selection_order: Some(SelectionOrder::Shuffled),
        cache_type: Some(SelectionCacheType::Step),
    };
    assert!(PhaseBuilder::cached_move_selector::<NQueensSolution, QueenMove, _>(
        &shuffled_step,
        queen_selector(),
    )
    .is_ok());
}

#[test]
fn test_exhaustive_search_config() {
    let config = ExhaustiveSearchConfig {
        exhaustive_search_type: ExhaustiveSearchType::BruteForce,
        node_limit: Some(3),
        ..ExhaustiveSearchConfig::default()
    };
    let mut phase: ExhaustiveSearchPhase<NQueensSolution, Director, QueenMove, _> =
        PhaseBuilder::exhaustive_search(&config, queen_placer(), None).unwrap();
    assert_eq!(
        phase.exploration(),
        planforge_config::NodeExplorationType::BreadthFirst
    );

    let mut scope = SolverScope::new(uninitialized_director(4));
    scope.start_solving();
    phase.solve(&mut scope).unwrap();
    assert_eq!(scope.total_step_count(), 1);
}

#[test]
fn test_scope_follows_config() {
    let config = SolverConfig::new()
        .with_random_seed(11)
        .with_environment_mode(EnvironmentMode::FastAssert)
        .with_move_thread_count(MoveThreadCount::Count(3));
    let scope = SolverBuilder::build_scope(&config, uninitialized_director(4)).unwrap();
    assert_eq!(scope.random_seed(), Some(11));
    assert_eq!(scope.environment_mode(), EnvironmentMode::FastAssert);
    assert_eq!(scope.move_thread_count(), 3);
    assert!(!scope.has_termination());
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SolverConfig::new().with_move_thread_count(MoveThreadCount::Count(0));
    let result = SolverBuilder::build::<NQueensSolution, Director>(&config);
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
}

fn solve_from_config(config: &SolverConfig) -> NQueensSolution {
    let mut solver: Solver<NQueensSolution, Director> = SolverBuilder::build(config).unwrap();
    for phase in &config.phases {
        let phase: Box<dyn Phase<NQueensSolution, Director>> = match phase {
            PhaseConfig::ConstructionHeuristic(ch) => {
                let built: ConstructionHeuristicPhase<NQueensSolution, Director, QueenMove, _> =
                    PhaseBuilder::construction_heuristic(ch, queen_placer()).unwrap();
                Box::new(built)
            }
            PhaseConfig::LocalSearch(ls) => {
                let built: ConfiguredLocalSearchPhase<NQueensSolution, Director, QueenMove, _> =
                    PhaseBuilder::local_search(ls, queen_selector()).unwrap();
                Box::new(built)
            }
            PhaseConfig::ExhaustiveSearch(es) => {
                let built: ExhaustiveSearchPhase<NQueensSolution, Director, QueenMove, _> =
                    PhaseBuilder::exhaustive_search(es, queen_placer(), None).unwrap();
                Box::new(built)
            }
        };
        solver = solver.with_phase(phase);
    }
    solver.solve(uninitialized_director(6)).unwrap()
}

#[test]
fn test_solver_from_toml() {
    let config = SolverConfig::from_toml_str(
        r#"
        random_seed = 3

        [termination]
        step_count_limit = 40

        [[phases]]
        type = "construction_heuristic"

        [[phases]]
        type = "local_search"

        [[phases.acceptors]]
        type = "late_acceptance"
        late_acceptance_size = 10
        "#,
    )
    .unwrap();

    let first = solve_from_config(&config);
    assert!(first.queens.iter().all(|q| q.row.is_some()));
    assert_eq!(first.score, Some(calculate_conflicts(&first)));

    let second = solve_from_config(&config);
    assert_eq!(first.rows(), second.rows());
}
