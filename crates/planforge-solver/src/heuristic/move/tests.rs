use planforge_core::domain::ChainLink;
use planforge_scoring::{RecordingScoreDirector, ScoreDirector, ScoreDirectorExt};
use planforge_test::nqueens::{get_queen_row, nqueens_director, set_queen_row};
use planforge_test::routing::{
    anchor_tail_demand, get_previous, routing_director, set_previous, small_routing, PREVIOUS,
};
use planforge_test::{NQueensSolution, VehicleRoutingSolution};

use super::*;

type QueenChange = ChangeMove<NQueensSolution, i64>;
type QueenSwap = SwapMove<NQueensSolution, i64>;
type CustomerMove = ChainedChangeMove<VehicleRoutingSolution, usize>;

fn queen_change(queen: usize, row: i64) -> QueenChange {
    ChangeMove::new(0, queen, Some(row), get_queen_row, set_queen_row, "row")
}

fn queen_swap(left: usize, right: usize) -> QueenSwap {
    SwapMove::new(0, left, right, get_queen_row, set_queen_row, "row")
}

fn customer_move(customer: usize, to: ChainLink<usize>) -> CustomerMove {
    ChainedChangeMove::new(0, customer, Some(to), get_previous, set_previous, PREVIOUS)
}

fn rows(director: &dyn ScoreDirector<NQueensSolution>) -> Vec<Option<i64>> {
    director
        .working_solution()
        .queens
        .iter()
        .map(|q| q.row)
        .collect()
}

/// vehicle 0 -> c2 -> c0, vehicle 1 -> c1 -> c4, c3 unassigned.
fn chained_routing() -> VehicleRoutingSolution {
    let mut s = small_routing();
    s.customers[2].previous = Some(ChainLink::Anchor(0));
    s.customers[0].previous = Some(ChainLink::Entity(2));
    s.customers[1].previous = Some(ChainLink::Anchor(1));
    s.customers[4].previous = Some(ChainLink::Entity(1));
    s
}

#[test]
fn test_change_move_do_and_undo() {
    let mut director = nqueens_director(&[0, 1, 2, 3]);
    let before = director.calculate_score();
    let m = queen_change(1, 3);
    assert!(m.is_doable(&director));

    {
        let mut recording = RecordingScoreDirector::new(&mut director);
        m.do_move(&mut recording);
        assert_eq!(get_queen_row(recording.working_solution(), 1), Some(3));
        assert_ne!(recording.calculate_score(), before);
        recording.undo_changes();
    }

    assert_eq!(rows(&director), vec![Some(0), Some(1), Some(2), Some(3)]);
    assert_eq!(director.calculate_score(), before);
}

#[test]
fn test_change_move_to_current_value_is_not_doable() {
    let director = nqueens_director(&[0, 1, 2, 3]);
    assert!(!queen_change(2, 2).is_doable(&director));
}

#[test]
fn test_change_undo_move_restores_old_value() {
    let mut director = nqueens_director(&[0, 1, 2, 3]);
    let m = queen_change(0, 2);
    let undo = m.undo_move(&director);
    m.do_move(&mut director);
    undo.do_move(&mut director);
    assert_eq!(get_queen_row(director.working_solution(), 0), Some(0));
}

#[test]
fn test_swap_move_do_and_undo() {
    let mut director = nqueens_director(&[0, 2, 1, 3]);
    let before = director.calculate_score();
    let m = queen_swap(1, 2);
    assert!(m.is_doable(&director));

    {
        let mut recording = RecordingScoreDirector::new(&mut director);
        m.do_move(&mut recording);
        assert_eq!(
            rows(&recording),
            vec![Some(0), Some(1), Some(2), Some(3)]
        );
        recording.undo_changes();
    }

    assert_eq!(rows(&director), vec![Some(0), Some(2), Some(1), Some(3)]);
    assert_eq!(director.calculate_score(), before);
}

#[test]
fn test_swap_of_equal_values_is_not_doable() {
    let director = nqueens_director(&[1, 1, 2, 3]);
    assert!(!queen_swap(0, 1).is_doable(&director));
    assert!(!queen_swap(2, 2).is_doable(&director));
}

#[test]
fn test_swap_tabu_hash_ignores_direction() {
    assert_eq!(queen_swap(1, 3).tabu_hash(), queen_swap(3, 1).tabu_hash());
    assert_ne!(queen_swap(1, 3).tabu_hash(), queen_swap(1, 2).tabu_hash());
}

#[test]
fn test_change_tabu_attributes() {
    let director = nqueens_director(&[0, 1, 2, 3]);
    let m = queen_change(1, 3);
    assert_eq!(
        m.planning_entities().as_slice(),
        &[EntityReference::new(0, 1)]
    );
    assert_eq!(m.planning_values(&director).len(), 1);
    assert_eq!(m.tabu_hash(), queen_change(1, 3).tabu_hash());
    assert_ne!(m.tabu_hash(), queen_change(1, 2).tabu_hash());
}

#[test]
fn test_chained_move_relinks_neighbours() {
    let mut director = routing_director(chained_routing());
    // Move c2 from the head of vehicle 0 to behind c1 on vehicle 1.
    let m = customer_move(2, ChainLink::Entity(1));
    assert!(m.is_doable(&director));
    m.do_move(&mut director);
    director.trigger_variable_listeners();

    let solution = director.working_solution();
    assert_eq!(solution.route_of(0), vec![0]);
    assert_eq!(solution.route_of(1), vec![1, 2, 4]);
    assert_eq!(solution.customers[2].vehicle, Some(1));
    assert_eq!(solution.customers[0].vehicle, Some(0));
}

#[test]
fn test_chained_move_undo_restores_chains() {
    let mut director = routing_director(chained_routing());
    let before = director.calculate_score();

    {
        let mut recording = RecordingScoreDirector::new(&mut director);
        customer_move(0, ChainLink::Anchor(1)).do_move(&mut recording);
        assert_eq!(recording.working_solution().route_of(1), vec![0, 1, 4]);
        recording.undo_changes();
    }

    let solution = director.working_solution();
    assert_eq!(solution.route_of(0), vec![2, 0]);
    assert_eq!(solution.route_of(1), vec![1, 4]);
    assert_eq!(solution.customers[0].vehicle, Some(0));
    assert_eq!(director.calculate_score(), before);
}

#[test]
fn test_chained_move_with_anchor_tail_supply() {
    let mut director = routing_director(chained_routing());
    let key = director.demand(&anchor_tail_demand());

    customer_move(3, ChainLink::Entity(2)).do_move(&mut director);
    director.trigger_variable_listeners();
    assert_eq!(director.working_solution().route_of(0), vec![2, 3, 0]);

    assert!(director.cancel_demand(&key).unwrap());
}

#[test]
fn test_chained_move_behind_itself_is_not_doable() {
    let director = routing_director(chained_routing());
    assert!(!customer_move(2, ChainLink::Entity(2)).is_doable(&director));
    assert!(!customer_move(2, ChainLink::Anchor(0)).is_doable(&director));
}

#[test]
fn test_composite_move_undo() {
    let mut director = nqueens_director(&[0, 1, 2, 3]);
    let before = director.calculate_score();
    let composite = CompositeMove::new(vec![queen_change(0, 1), queen_change(3, 0)]);
    assert!(composite.is_doable(&director));
    assert_eq!(composite.planning_entities().len(), 2);

    {
        let mut recording = RecordingScoreDirector::new(&mut director);
        composite.do_move(&mut recording);
        assert_eq!(rows(&recording), vec![Some(1), Some(1), Some(2), Some(0)]);
        recording.undo_changes();
    }

    assert_eq!(director.calculate_score(), before);
}

#[test]
fn test_either_move_delegates() {
    let director = nqueens_director(&[0, 1, 2, 3]);
    let change: EitherMove<NQueensSolution, i64> = queen_change(0, 3).into();
    let swap: EitherMove<NQueensSolution, i64> = queen_swap(0, 3).into();
    assert!(change.is_doable(&director));
    assert!(swap.is_doable(&director));
    assert_eq!(change.tabu_hash(), queen_change(0, 3).tabu_hash());
    assert_eq!(swap.planning_entities().len(), 2);
}

#[test]
fn test_stable_hash_is_deterministic() {
    assert_eq!(stable_hash(&("a", 1u32)), stable_hash(&("a", 1u32)));
    assert_ne!(stable_hash(&("a", 1u32)), stable_hash(&("a", 2u32)));
}
