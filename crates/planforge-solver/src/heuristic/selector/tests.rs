use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use planforge_core::domain::ChainLink;
use planforge_core::PlanForgeError;
use planforge_scoring::ScoreDirector;
use planforge_test::nqueens::{get_queen_row, nqueens_director, row_range, set_queen_row};
use planforge_test::routing::{
    customer_count, get_previous, previous_candidates, routing_director, set_previous,
    small_routing, PREVIOUS,
};
use planforge_test::task::{
    employee_range, get_task_employee, set_task_employee, small_assignment, task_difficulty,
    task_director,
};
use planforge_test::{NQueensSolution, TaskAssignment, VehicleRoutingSolution};

use super::*;
use crate::heuristic::r#move::{ChangeMove, EitherMove, Move, SwapMove};

type QueenChange = ChangeMove<NQueensSolution, i64>;
type QueenEither = EitherMove<NQueensSolution, i64>;
type BoxedQueenSelector = Box<dyn MoveSelector<NQueensSolution, QueenEither>>;

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(17)
}

fn queen_change_selector<M>() -> ChangeMoveSelector<
    NQueensSolution,
    i64,
    FromSolutionEntitySelector,
    FromSolutionValueSelector<NQueensSolution, i64>,
    M,
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

fn queen_swap_selector<M>() -> SwapMoveSelector<NQueensSolution, i64, FromSolutionEntitySelector, M>
{
    SwapMoveSelector::new(
        FromSolutionEntitySelector::new(0),
        get_queen_row,
        set_queen_row,
        0,
        "row",
    )
}

#[test]
fn test_entity_selector_iterates_all_entities() {
    let director = nqueens_director(&[0, 1, 2, 3]);
    let selector = FromSolutionEntitySelector::new(0);
    let entities: Vec<usize> = EntitySelector::<NQueensSolution>::iter(&selector, &director)
        .map(|e| e.entity_index)
        .collect();
    assert_eq!(entities, vec![0, 1, 2, 3]);
    assert_eq!(EntitySelector::<NQueensSolution>::size(&selector, &director), 4);
}

#[test]
fn test_entity_selector_skips_pinned() {
    let mut solution = small_assignment();
    solution.tasks[1] = solution.tasks[1].clone().pinned_to(0);
    solution.tasks[4] = solution.tasks[4].clone().pinned_to(2);
    let director = task_director(solution);

    let selector = FromSolutionEntitySelector::new(0);
    let entities: Vec<usize> = EntitySelector::<TaskAssignment>::iter(&selector, &director)
        .map(|e| e.entity_index)
        .collect();
    assert_eq!(entities, vec![0, 2, 3, 5]);

    let mut rng = rng();
    for _ in 0..50 {
        let sampled = EntitySelector::<TaskAssignment>::sample(&selector, &director, &mut rng)
            .map(|e| e.entity_index);
        assert!(matches!(sampled, Some(0 | 2 | 3 | 5)));
    }

    let all = FromSolutionEntitySelector::new(0).with_skip_pinned(false);
    assert_eq!(EntitySelector::<TaskAssignment>::size(&all, &director), 6);
}

#[test]
fn test_change_move_selector_enumerates_entity_value_pairs() {
    let director = nqueens_director(&[0, 1, 2, 3]);
    let selector = queen_change_selector::<QueenChange>();
    let moves: Vec<QueenChange> = selector.iter_moves(&director).collect();
    assert_eq!(moves.len(), 16);
    assert_eq!(selector.size(&director), 16);
    assert!(!selector.is_never_ending());

    let doable = moves.iter().filter(|m| m.is_doable(&director)).count();
    assert_eq!(doable, 12);
}

#[test]
fn test_change_move_selector_with_unassigned_values() {
    let director = nqueens_director(&[0, 1, 2, 3]);
    let selector = queen_change_selector::<QueenChange>().with_allows_unassigned(true);
    let unassigning = selector
        .iter_moves(&director)
        .filter(|m| m.to_value().is_none())
        .count();
    assert_eq!(unassigning, 4);
    assert_eq!(selector.size(&director), 20);
}

#[test]
fn test_random_change_move_selector_samples() {
    let director = nqueens_director(&[0, 1, 2, 3]);
    let selector = queen_change_selector::<QueenChange>().with_random(true);
    assert!(selector.is_never_ending());

    let mut rng = rng();
    for _ in 0..20 {
        let m = selector.sample_move(&director, &mut rng);
        assert!(m.is_some_and(|m| m.to_value().is_some_and(|row| (0..4).contains(row))));
    }
}

#[test]
fn test_swap_move_selector_yields_unique_pairs() {
    let director = nqueens_director(&[0, 1, 2, 3]);
    let selector = queen_swap_selector::<SwapMove<NQueensSolution, i64>>();
    let pairs: Vec<(usize, usize)> = selector
        .iter_moves(&director)
        .map(|m| (m.left_entity_index(), m.right_entity_index()))
        .collect();
    assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    assert_eq!(selector.size(&director), 6);
}

#[test]
fn test_random_swap_never_pairs_an_entity_with_itself() {
    let director = nqueens_director(&[0, 1, 2, 3]);
    let selector = queen_swap_selector::<SwapMove<NQueensSolution, i64>>().with_random(true);
    let mut rng = rng();
    for _ in 0..50 {
        if let Some(m) = selector.sample_move(&director, &mut rng) {
            assert_ne!(m.left_entity_index(), m.right_entity_index());
        }
    }
}

#[test]
fn test_union_of_change_and_swap() {
    let director = nqueens_director(&[0, 1, 2, 3]);
    let union: UnionMoveSelector<NQueensSolution, QueenEither> = UnionMoveSelector::new(vec![
        Box::new(queen_change_selector::<QueenEither>()) as BoxedQueenSelector,
        Box::new(queen_swap_selector::<QueenEither>()) as BoxedQueenSelector,
    ]);
    assert_eq!(union.len(), 2);
    assert_eq!(union.iter_moves(&director).count(), 22);
    assert_eq!(union.size(&director), 22);

    let swaps = union
        .iter_moves(&director)
        .filter(|m| matches!(m, EitherMove::Swap(_)))
        .count();
    assert_eq!(swaps, 6);

    let random = UnionMoveSelector::<NQueensSolution, QueenEither>::new(vec![
        Box::new(queen_change_selector::<QueenEither>().with_random(true)) as BoxedQueenSelector,
        Box::new(queen_swap_selector::<QueenEither>().with_random(true)) as BoxedQueenSelector,
    ])
    .with_random(true);
    assert!(random.is_never_ending());
    let mut rng = rng();
    assert!(random.sample_move(&director, &mut rng).is_some());
}

#[test]
fn test_cached_entity_selector_sorts_by_difficulty() {
    let mut director = task_director(small_assignment());
    let mut rng = rng();
    let mut selector =
        CachedEntitySelector::decreasing_difficulty(FromSolutionEntitySelector::new(0), task_difficulty)
            .unwrap();

    selector.phase_started(&mut director, &mut rng).unwrap();
    let order: Vec<usize> = selector
        .iter(&director)
        .map(|e| e.entity_index)
        .collect();
    // Durations 3, 2, 4, 1, 3, 2; the sort is stable.
    assert_eq!(order, vec![2, 0, 4, 1, 5, 3]);

    selector.phase_ended(&mut director).unwrap();
    assert_eq!(selector.iter(&director).count(), 6);
}

#[test]
fn test_cached_entity_selector_shuffles_each_step() {
    let mut director = task_director(small_assignment());
    let mut rng = rng();
    let mut selector = CachedEntitySelector::<TaskAssignment, _>::new(
        FromSolutionEntitySelector::new(0),
        SelectionCacheType::Phase,
        SelectionOrder::Shuffled,
    )
    .unwrap();

    selector.phase_started(&mut director, &mut rng).unwrap();
    for _ in 0..3 {
        selector.step_started(&mut director, &mut rng).unwrap();
        let mut order: Vec<usize> = selector.iter(&director).map(|e| e.entity_index).collect();
        order.sort();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
        selector.step_ended(&mut director).unwrap();
    }
    assert!(!selector.is_never_ending());
}

#[test]
fn test_sorted_entity_selector_without_sorter_fails_at_phase_start() {
    let mut director = task_director(small_assignment());
    let mut rng = rng();
    let mut selector = CachedEntitySelector::<TaskAssignment, _>::new(
        FromSolutionEntitySelector::new(0),
        SelectionCacheType::Phase,
        SelectionOrder::Sorted,
    )
    .unwrap();
    let result = selector.phase_started(&mut director, &mut rng);
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
}

#[test]
fn test_shuffled_selection_requires_cache() {
    let result = CachedEntitySelector::<TaskAssignment, _>::new(
        FromSolutionEntitySelector::new(0),
        SelectionCacheType::JustInTime,
        SelectionOrder::Shuffled,
    );
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
}

#[test]
fn test_nested_cache_must_outlive_parent() {
    let step_cached = CachedEntitySelector::<TaskAssignment, _>::new(
        FromSolutionEntitySelector::new(0),
        SelectionCacheType::Step,
        SelectionOrder::Original,
    )
    .unwrap();
    let result = CachedEntitySelector::<TaskAssignment, _>::new(
        step_cached,
        SelectionCacheType::Phase,
        SelectionOrder::Original,
    );
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
}

#[test]
fn test_cached_value_selector_rejects_entity_dependent_child() {
    let child = FromEntityValueSelector::new(previous_candidates);
    let result = CachedValueSelector::<VehicleRoutingSolution, ChainLink<usize>, _>::new(
        child,
        SelectionCacheType::Phase,
        SelectionOrder::Original,
    );
    assert!(matches!(result, Err(PlanForgeError::Config(_))));
}

#[test]
fn test_probabilistic_value_selector_follows_weights() {
    let mut director = task_director(small_assignment());
    let mut rng = rng();
    let mut selector = CachedValueSelector::<TaskAssignment, usize, _>::new(
        FromSolutionValueSelector::countable(employee_range),
        SelectionCacheType::Phase,
        SelectionOrder::Probabilistic,
    )
    .unwrap()
    .with_probability_weight(|_: &TaskAssignment, e: &usize| if *e == 1 { 0.0 } else { 1.0 });

    selector.phase_started(&mut director, &mut rng).unwrap();
    assert!(selector.is_never_ending());
    let entity = EntityReference::new(0, 0);
    for _ in 0..100 {
        let value = selector.sample(&director, entity, &mut rng);
        assert!(matches!(value, Some(0 | 2)));
    }
}

#[test]
fn test_step_cached_move_selector_refills_each_step() {
    let mut director = task_director(small_assignment());
    let mut rng = rng();
    let change = ChangeMoveSelector::<_, _, _, _, ChangeMove<TaskAssignment, usize>>::new(
        FromSolutionEntitySelector::new(0),
        FromSolutionValueSelector::countable(employee_range),
        get_task_employee,
        set_task_employee,
        0,
        "employee",
    );
    let mut selector = CachedMoveSelector::<TaskAssignment, ChangeMove<TaskAssignment, usize>, _>::new(
        change,
        SelectionCacheType::Step,
        SelectionOrder::Shuffled,
    )
    .unwrap();

    selector.phase_started(&mut director, &mut rng).unwrap();
    selector.step_started(&mut director, &mut rng).unwrap();
    assert_eq!(selector.size(&director), 18);
    let first: Vec<u64> = selector.iter_moves(&director).map(|m| m.tabu_hash()).collect();
    selector.step_ended(&mut director).unwrap();

    selector.step_started(&mut director, &mut rng).unwrap();
    let second: Vec<u64> = selector.iter_moves(&director).map(|m| m.tabu_hash()).collect();
    assert_eq!(first.len(), second.len());
    let mut a = first.clone();
    let mut b = second.clone();
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn test_chained_selector_manages_anchor_tail_supply() {
    let mut solution = small_routing();
    solution.customers[0].previous = Some(ChainLink::Anchor(0));
    solution.customers[1].previous = Some(ChainLink::Entity(0));
    let mut director = routing_director(solution);
    let mut rng = rng();

    let mut selector = ChainedChangeMoveSelector::new(
        FromSolutionEntitySelector::new(0),
        FromEntityValueSelector::new(previous_candidates),
        customer_count,
        get_previous,
        set_previous,
        0,
        PREVIOUS,
    );
    let supplies_before = director.supply_manager().len();
    selector.phase_started(&mut director, &mut rng).unwrap();
    assert_eq!(director.supply_manager().len(), supplies_before + 1);

    let moves: Vec<_> = selector.iter_moves(&director).collect();
    // Per customer: two anchors plus every other chained customer.
    assert_eq!(moves.len(), 3 + 3 + 4 + 4 + 4);
    assert!(moves
        .iter()
        .all(|m| m.to() != Some(&ChainLink::Entity(m.entity_index()))));

    selector.phase_ended(&mut director).unwrap();
    assert_eq!(director.supply_manager().len(), supplies_before);
}
