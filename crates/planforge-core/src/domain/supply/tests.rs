use super::*;

#[derive(Clone, Debug)]
struct Route {
    previous: Vec<Option<ChainLink<usize>>>,
}

fn entity_count(route: &Route) -> usize {
    route.previous.len()
}

fn previous(route: &Route, entity_index: usize) -> Option<ChainLink<usize>> {
    route.previous[entity_index].clone()
}

fn anchor_demand() -> AnchorTailDemand<Route, usize> {
    AnchorTailDemand::new(0, "previous", entity_count, previous)
}

fn inverse_demand() -> SingletonInverseDemand<Route, ChainLink<usize>> {
    SingletonInverseDemand::new(0, "previous", entity_count, previous)
}

/// Vehicle 0: 0 -> 1 -> 2, vehicle 1: 3, entity 4 unassigned.
fn route() -> Route {
    Route {
        previous: vec![
            Some(ChainLink::Anchor(0)),
            Some(ChainLink::Entity(0)),
            Some(ChainLink::Entity(1)),
            Some(ChainLink::Anchor(1)),
            None,
        ],
    }
}

/// Applies one chained variable change with before/after notifications.
fn change(
    manager: &mut SupplyManager<Route>,
    route: &mut Route,
    entity_index: usize,
    link: Option<ChainLink<usize>>,
) {
    manager.before_variable_changed(route, 0, entity_index, "previous");
    route.previous[entity_index] = link;
    manager.after_variable_changed(route, 0, entity_index, "previous");
}

#[test]
fn test_equal_demands_share_one_supply() {
    let route = route();
    let mut manager = SupplyManager::new();

    let first = manager.demand(&anchor_demand(), &route);
    let second = manager.demand(&anchor_demand(), &route);
    assert_eq!(first, second);
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.active_count(&first), 2);

    assert!(!manager.cancel(&first).unwrap());
    assert!(manager.get::<AnchorTailSupply<Route, usize>>(&first).is_some());
    assert!(manager.cancel(&second).unwrap());
    assert!(manager.is_empty());
    assert!(manager.cancel(&first).is_err());
}

#[test]
fn test_different_supply_types_use_different_keys() {
    let route = route();
    let mut manager = SupplyManager::new();

    let anchor_key = manager.demand(&anchor_demand(), &route);
    let inverse_key = manager.demand(&inverse_demand(), &route);
    assert_ne!(anchor_key, inverse_key);
    assert_eq!(manager.len(), 2);
    // Wrong type for the key.
    assert!(manager
        .get::<SingletonInverseSupply<Route, ChainLink<usize>>>(&anchor_key)
        .is_none());
}

#[test]
fn test_anchor_tail_initial_state() {
    let route = route();
    let mut manager = SupplyManager::new();
    let key = manager.demand(&anchor_demand(), &route);
    let supply = manager.get::<AnchorTailSupply<Route, usize>>(&key).unwrap();

    assert_eq!(supply.tail_of(&0), Some(2));
    assert_eq!(supply.tail_of(&1), Some(3));
    assert_eq!(supply.tail_of(&2), None);
    assert_eq!(supply.chain_of(&0), vec![0, 1, 2]);
    assert_eq!(supply.successor_of(&ChainLink::Entity(0)), Some(1));
    assert_eq!(supply.anchor_of(&route, 2), Some(0));
    assert_eq!(supply.anchor_of(&route, 4), None);
}

#[test]
fn test_anchor_tail_follows_chained_change() {
    let mut route = route();
    let mut manager = SupplyManager::new();
    let key = manager.demand(&anchor_demand(), &route);

    // Move entity 1 behind entity 3: reconnect 2 to 0, then 1 to 3.
    change(&mut manager, &mut route, 2, Some(ChainLink::Entity(0)));
    change(&mut manager, &mut route, 1, Some(ChainLink::Entity(3)));

    let supply = manager.get::<AnchorTailSupply<Route, usize>>(&key).unwrap();
    assert_eq!(supply.chain_of(&0), vec![0, 2]);
    assert_eq!(supply.chain_of(&1), vec![3, 1]);
    assert_eq!(supply.tail_of(&0), Some(2));
    assert_eq!(supply.tail_of(&1), Some(1));
}

#[test]
fn test_anchor_tail_assign_and_unassign() {
    let mut route = route();
    let mut manager = SupplyManager::new();
    let key = manager.demand(&anchor_demand(), &route);

    change(&mut manager, &mut route, 4, Some(ChainLink::Entity(3)));
    let supply = manager.get::<AnchorTailSupply<Route, usize>>(&key).unwrap();
    assert_eq!(supply.tail_of(&1), Some(4));

    change(&mut manager, &mut route, 4, None);
    change(&mut manager, &mut route, 3, None);
    let supply = manager.get::<AnchorTailSupply<Route, usize>>(&key).unwrap();
    assert_eq!(supply.tail_of(&1), None);
    assert!(supply.chain_of(&1).is_empty());
}

#[test]
fn test_inverse_supply_tracks_changes() {
    let mut route = route();
    let mut manager = SupplyManager::new();
    let key = manager.demand(&inverse_demand(), &route);

    change(&mut manager, &mut route, 4, Some(ChainLink::Entity(2)));
    let supply = manager
        .get::<SingletonInverseSupply<Route, ChainLink<usize>>>(&key)
        .unwrap();
    assert_eq!(supply.inverse_entity(&ChainLink::Entity(2)), Some(4));
    assert_eq!(supply.inverse_entity(&ChainLink::Anchor(1)), Some(3));
    assert_eq!(supply.len(), 5);
}

#[test]
fn test_reset_rebuilds_from_new_solution() {
    let route = route();
    let mut manager = SupplyManager::new();
    let key = manager.demand(&anchor_demand(), &route);

    let mut replacement = route.clone();
    replacement.previous[3] = Some(ChainLink::Entity(2));
    manager.reset_working_solution(&replacement);

    let supply = manager.get::<AnchorTailSupply<Route, usize>>(&key).unwrap();
    assert_eq!(supply.chain_of(&0), vec![0, 1, 2, 3]);
    assert_eq!(supply.tail_of(&1), None);
}

#[test]
fn test_cloned_manager_is_independent() {
    let mut route = route();
    let mut manager = SupplyManager::new();
    let key = manager.demand(&anchor_demand(), &route);
    let snapshot = manager.clone();

    change(&mut manager, &mut route, 4, Some(ChainLink::Anchor(2)));
    assert_eq!(
        manager
            .get::<AnchorTailSupply<Route, usize>>(&key)
            .unwrap()
            .tail_of(&2),
        Some(4)
    );
    assert_eq!(
        snapshot
            .get::<AnchorTailSupply<Route, usize>>(&key)
            .unwrap()
            .tail_of(&2),
        None
    );
}
