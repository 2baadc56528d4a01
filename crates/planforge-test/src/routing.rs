//! Chained vehicle routing test fixtures.
//!
//! Each vehicle anchors a chain of customers. A customer's `previous`
//! variable points either at a vehicle (the first stop) or at another
//! customer. The `vehicle` shadow variable holds the anchor of the chain a
//! customer is on and is kept current by [`VehicleAnchorListener`].
//!
//! ```text
//! vehicle 0 -> c2 -> c0
//! vehicle 1 -> c1
//! ```
//!
//! Hard: demand above a vehicle's capacity. Soft: negated Manhattan travel
//! distance from the depot through the chain and back.

use std::collections::HashMap;

use planforge_core::domain::{
    AnchorTailDemand, ChainLink, EntityDescriptor, LookUpKey, PlanningEntity, PlanningId,
    ShadowVariableContext, SolutionDescriptor, VariableDescriptor, VariableListener,
};
use planforge_core::score::HardSoftScore;
use planforge_core::PlanningSolution;
use planforge_scoring::{SimpleScoreDirector, SimpleScoreDirectorFactory};

pub type RoutingScoreFn = fn(&VehicleRoutingSolution) -> HardSoftScore;

/// Variable name of the chained variable.
pub const PREVIOUS: &str = "previous";
/// Variable name of the anchor shadow variable.
pub const VEHICLE: &str = "vehicle";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub x: i64,
    pub y: i64,
}

impl Location {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Location) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// A vehicle anchors one chain.
#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub id: i64,
    pub capacity: i64,
    pub depot: Location,
}

/// A customer entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub location: Location,
    pub demand: i64,
    pub previous: Option<ChainLink<usize>>,
    pub vehicle: Option<usize>,
}

impl Customer {
    pub fn new(id: i64, location: Location, demand: i64) -> Self {
        Self {
            id,
            location,
            demand,
            previous: None,
            vehicle: None,
        }
    }
}

impl PlanningEntity for Customer {}

impl PlanningId for Customer {
    type Id = i64;

    fn planning_id(&self) -> i64 {
        self.id
    }
}

#[derive(Clone, Debug)]
pub struct VehicleRoutingSolution {
    pub vehicles: Vec<Vehicle>,
    pub customers: Vec<Customer>,
    pub score: Option<HardSoftScore>,
}

impl VehicleRoutingSolution {
    pub fn new(vehicles: Vec<Vehicle>, customers: Vec<Customer>) -> Self {
        Self {
            vehicles,
            customers,
            score: None,
        }
    }

    /// Returns the customers of a vehicle's chain in visiting order.
    pub fn route_of(&self, vehicle: usize) -> Vec<usize> {
        let successors = self.successors();
        let mut route = Vec::new();
        let mut link = ChainLink::Anchor(vehicle);
        while let Some(&next) = successors.get(&link) {
            if route.len() > self.customers.len() {
                break;
            }
            route.push(next);
            link = ChainLink::Entity(next);
        }
        route
    }

    fn successors(&self) -> HashMap<ChainLink<usize>, usize> {
        self.customers
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.previous.clone().map(|p| (p, i)))
            .collect()
    }

    /// Follows `previous` links back to the anchor vehicle.
    pub fn anchor_of(&self, customer: usize) -> Option<usize> {
        let mut current = customer;
        for _ in 0..=self.customers.len() {
            match self.customers.get(current)?.previous.as_ref()? {
                ChainLink::Anchor(vehicle) => return Some(*vehicle),
                ChainLink::Entity(previous) => current = *previous,
            }
        }
        None
    }
}

impl PlanningSolution for VehicleRoutingSolution {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

/// Two vehicles of capacity 10 at the origin and five customers.
pub fn small_routing() -> VehicleRoutingSolution {
    let depot = Location::new(0, 0);
    VehicleRoutingSolution::new(
        vec![
            Vehicle {
                id: 100,
                capacity: 10,
                depot,
            },
            Vehicle {
                id: 101,
                capacity: 10,
                depot,
            },
        ],
        vec![
            Customer::new(1, Location::new(2, 0), 4),
            Customer::new(2, Location::new(4, 0), 3),
            Customer::new(3, Location::new(0, 3), 5),
            Customer::new(4, Location::new(0, 6), 4),
            Customer::new(5, Location::new(3, 3), 2),
        ],
    )
}

pub fn customer_count(s: &VehicleRoutingSolution) -> usize {
    s.customers.len()
}

pub fn get_previous(s: &VehicleRoutingSolution, idx: usize) -> Option<ChainLink<usize>> {
    s.customers.get(idx).and_then(|c| c.previous.clone())
}

pub fn set_previous(s: &mut VehicleRoutingSolution, idx: usize, v: Option<ChainLink<usize>>) {
    if let Some(customer) = s.customers.get_mut(idx) {
        customer.previous = v;
    }
}

/// Values a customer's `previous` can take: every vehicle, and every
/// other customer already on a chain.
pub fn previous_candidates(s: &VehicleRoutingSolution, idx: usize) -> Vec<ChainLink<usize>> {
    let anchors = (0..s.vehicles.len()).map(ChainLink::Anchor);
    let entities = s
        .customers
        .iter()
        .enumerate()
        .filter(|&(i, c)| i != idx && c.previous.is_some())
        .map(|(i, _)| ChainLink::Entity(i));
    anchors.chain(entities).collect()
}

/// Demand for the anchor/tail supply of the `previous` variable.
pub fn anchor_tail_demand() -> AnchorTailDemand<VehicleRoutingSolution, usize> {
    AnchorTailDemand::new(0, PREVIOUS, customer_count, get_previous)
}

/// Full recalculation of the routing score.
pub fn routing_score(solution: &VehicleRoutingSolution) -> HardSoftScore {
    let mut hard = 0;
    let mut soft = 0;
    for (v, vehicle) in solution.vehicles.iter().enumerate() {
        let route = solution.route_of(v);
        let demand: i64 = route.iter().map(|&c| solution.customers[c].demand).sum();
        hard -= (demand - vehicle.capacity).max(0);

        let mut at = vehicle.depot;
        for &c in &route {
            let next = solution.customers[c].location;
            soft -= at.distance_to(&next);
            at = next;
        }
        soft -= at.distance_to(&vehicle.depot);
    }
    HardSoftScore::of(hard, soft)
}

/// Keeps each customer's `vehicle` equal to the anchor of its chain.
///
/// A change to `previous` re-anchors the customer and everything trailing
/// it.
#[derive(Clone, Debug, Default)]
pub struct VehicleAnchorListener;

impl VariableListener<VehicleRoutingSolution> for VehicleAnchorListener {
    fn after_variable_changed(
        &mut self,
        ctx: &mut ShadowVariableContext<'_, VehicleRoutingSolution>,
        entity_index: usize,
    ) {
        let anchor = ctx.solution().anchor_of(entity_index);
        let successors = ctx.solution().successors();
        let mut current = Some(entity_index);
        let mut visited = 0;
        while let Some(customer) = current {
            if visited > ctx.solution().customers.len() {
                break;
            }
            if ctx.solution().customers[customer].vehicle != anchor {
                ctx.change_shadow(0, customer, VEHICLE, |s| {
                    s.customers[customer].vehicle = anchor;
                });
            }
            current = successors.get(&ChainLink::Entity(customer)).copied();
            visited += 1;
        }
    }
}

pub fn routing_descriptor() -> SolutionDescriptor<VehicleRoutingSolution> {
    SolutionDescriptor::new("VehicleRoutingSolution").with_entity(
        EntityDescriptor::new("Customer", customer_count)
            .with_planning_id(|s: &VehicleRoutingSolution, i| LookUpKey::from(s.customers[i].id))
            .with_variable(
                VariableDescriptor::chained(PREVIOUS, |s: &VehicleRoutingSolution, i| {
                    s.customers[i].previous.is_some()
                })
                .with_value_range_provider("previousCandidates"),
            )
            .with_variable(VariableDescriptor::shadow(VEHICLE, &[PREVIOUS])),
    )
}

pub fn routing_director(
    solution: VehicleRoutingSolution,
) -> SimpleScoreDirector<VehicleRoutingSolution, RoutingScoreFn> {
    SimpleScoreDirector::new(solution, routing_descriptor(), routing_score as RoutingScoreFn)
        .with_listener(0, &[PREVIOUS], VehicleAnchorListener)
}

pub fn routing_factory() -> SimpleScoreDirectorFactory<VehicleRoutingSolution, RoutingScoreFn> {
    SimpleScoreDirectorFactory::new(routing_descriptor(), routing_score as RoutingScoreFn)
        .with_listener(0, &[PREVIOUS], VehicleAnchorListener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_scoring::ScoreDirector;

    fn chained() -> VehicleRoutingSolution {
        let mut s = small_routing();
        s.customers[2].previous = Some(ChainLink::Anchor(0));
        s.customers[0].previous = Some(ChainLink::Entity(2));
        s.customers[1].previous = Some(ChainLink::Anchor(1));
        s
    }

    #[test]
    fn test_routes() {
        let s = chained();
        assert_eq!(s.route_of(0), vec![2, 0]);
        assert_eq!(s.route_of(1), vec![1]);
        assert_eq!(s.anchor_of(0), Some(0));
        assert_eq!(s.anchor_of(3), None);
    }

    #[test]
    fn test_routing_score() {
        // Vehicle 0: (0,0)->(0,3)->(2,0)->(0,0) = 3 + 5 + 2
        // Vehicle 1: (0,0)->(4,0)->(0,0) = 8
        assert_eq!(routing_score(&chained()), HardSoftScore::of(0, -18));
    }

    #[test]
    fn test_listener_sets_vehicle_on_install() {
        let director = routing_director(chained());
        let customers = &director.working_solution().customers;
        assert_eq!(customers[0].vehicle, Some(0));
        assert_eq!(customers[2].vehicle, Some(0));
        assert_eq!(customers[1].vehicle, Some(1));
        assert_eq!(customers[3].vehicle, None);
    }

    #[test]
    fn test_listener_follows_chain_move() {
        let mut director = routing_director(chained());
        director.before_variable_changed(0, 2, PREVIOUS);
        set_previous(director.working_solution_mut(), 2, Some(ChainLink::Entity(1)));
        director.after_variable_changed(0, 2, PREVIOUS);
        director.trigger_variable_listeners();

        // Customer 0 trails customer 2 and moves with it.
        let customers = &director.working_solution().customers;
        assert_eq!(customers[2].vehicle, Some(1));
        assert_eq!(customers[0].vehicle, Some(1));
    }

    #[test]
    fn test_previous_candidates() {
        let candidates = previous_candidates(&chained(), 0);
        assert_eq!(
            candidates,
            vec![
                ChainLink::Anchor(0),
                ChainLink::Anchor(1),
                ChainLink::Entity(1),
                ChainLink::Entity(2),
            ]
        );
    }
}
