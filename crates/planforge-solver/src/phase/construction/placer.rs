//! Entity placers for construction heuristic
//!
//! Placers decide which entities a construction heuristic initializes, in
//! which order, and build the candidate moves for each of them.

use std::fmt::{self, Debug};
use std::hash::Hash;
use std::marker::PhantomData;

use planforge_core::domain::ChainLink;
use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use crate::heuristic::r#move::{ChainedChangeMove, ChangeMove, Move};
use crate::heuristic::selector::{
    forward_lifecycle, EntityReference, EntitySelector, SelectorLifecycle, ValueSelector,
};

/// A move that assigns one value to one variable of one entity.
///
/// Implemented by the moves a placer can build for a placement.
pub trait PlacementMove<S: PlanningSolution, V>: Move<S> {
    fn assign(
        descriptor_index: usize,
        entity_index: usize,
        value: Option<V>,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        variable_name: &'static str,
    ) -> Self;
}

impl<S, V> PlacementMove<S, V> for ChangeMove<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    fn assign(
        descriptor_index: usize,
        entity_index: usize,
        value: Option<V>,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        variable_name: &'static str,
    ) -> Self {
        ChangeMove::new(descriptor_index, entity_index, value, getter, setter, variable_name)
    }
}

impl<S, A> PlacementMove<S, ChainLink<A>> for ChainedChangeMove<S, A>
where
    S: PlanningSolution,
    A: Clone + Eq + Hash + Send + Sync + Debug + 'static,
{
    fn assign(
        descriptor_index: usize,
        entity_index: usize,
        value: Option<ChainLink<A>>,
        getter: fn(&S, usize) -> Option<ChainLink<A>>,
        setter: fn(&mut S, usize, Option<ChainLink<A>>),
        variable_name: &'static str,
    ) -> Self {
        ChainedChangeMove::new(descriptor_index, entity_index, value, getter, setter, variable_name)
    }
}

/// An entity that needs a value assigned, with its candidate moves.
pub struct Placement<S, M> {
    pub entity: EntityReference,
    pub moves: Vec<M>,
    unassigned_index: Option<usize>,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, M> Placement<S, M> {
    pub fn new(entity: EntityReference, moves: Vec<M>) -> Self {
        Self {
            entity,
            moves,
            unassigned_index: None,
            _phantom: PhantomData,
        }
    }

    /// Appends the candidate that leaves the entity unassigned.
    ///
    /// That candidate does not change the solution, so it is not doable as
    /// a move, but it still competes with the others.
    pub fn with_unassigned_candidate(mut self, candidate: M) -> Self {
        self.unassigned_index = Some(self.moves.len());
        self.moves.push(candidate);
        self
    }

    pub fn is_unassigned_candidate(&self, index: usize) -> bool {
        self.unassigned_index == Some(index)
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Takes ownership of a move at the given index.
    pub fn take_move(&mut self, index: usize) -> M {
        self.moves.swap_remove(index)
    }
}

impl<S, M> Debug for Placement<S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Placement")
            .field("entity", &self.entity)
            .field("move_count", &self.moves.len())
            .finish()
    }
}

/// Trait for placing entities during construction.
///
/// The queue is taken when the phase starts and again after problem
/// changes. Candidate moves are built per step, against the solution as
/// construction left it so far.
pub trait EntityPlacer<S, M>: SelectorLifecycle<S> + Send + Debug
where
    S: PlanningSolution,
    M: Move<S>,
{
    /// Entities still to initialize, in placement order.
    fn entity_queue(&self, score_director: &dyn ScoreDirector<S>) -> Vec<EntityReference>;

    /// The placement of `entity`, or `None` once it is initialized.
    fn placement(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity: EntityReference,
    ) -> Option<Placement<S, M>>;

    /// Returns true if the candidates come from a never-ending selection.
    fn is_never_ending(&self) -> bool {
        false
    }
}

/// Places entities one at a time in the order of its entity selector.
///
/// Candidates assign each value of the value selector, plus the unassigned
/// value when the variable allows it. Pinned entities are never queued.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `V` - The value type
/// * `ES` - The entity selector type
/// * `VS` - The value selector type
/// * `M` - The move type built for each candidate
pub struct QueuedEntityPlacer<S, V, ES, VS, M> {
    entity_selector: ES,
    value_selector: VS,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
    descriptor_index: usize,
    variable_name: &'static str,
    allows_unassigned: bool,
    _phantom: PhantomData<fn() -> M>,
}

impl<S, V, ES, VS, M> QueuedEntityPlacer<S, V, ES, VS, M> {
    pub fn new(
        entity_selector: ES,
        value_selector: VS,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        descriptor_index: usize,
        variable_name: &'static str,
    ) -> Self {
        Self {
            entity_selector,
            value_selector,
            getter,
            setter,
            descriptor_index,
            variable_name,
            allows_unassigned: false,
            _phantom: PhantomData,
        }
    }

    /// Also offers leaving the variable unassigned.
    pub fn with_allows_unassigned(mut self, allows_unassigned: bool) -> Self {
        self.allows_unassigned = allows_unassigned;
        self
    }
}

impl<S, V, ES: Debug, VS: Debug, M> Debug for QueuedEntityPlacer<S, V, ES, VS, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedEntityPlacer")
            .field("entity_selector", &self.entity_selector)
            .field("value_selector", &self.value_selector)
            .field("variable_name", &self.variable_name)
            .field("allows_unassigned", &self.allows_unassigned)
            .finish()
    }
}

impl<S, V, ES, VS, M> SelectorLifecycle<S> for QueuedEntityPlacer<S, V, ES, VS, M>
where
    S: PlanningSolution,
    ES: EntitySelector<S>,
    VS: ValueSelector<S, V>,
{
    forward_lifecycle!(entity_selector, value_selector);
}

impl<S, V, ES, VS, M> EntityPlacer<S, M> for QueuedEntityPlacer<S, V, ES, VS, M>
where
    S: PlanningSolution,
    V: Send + 'static,
    ES: EntitySelector<S>,
    VS: ValueSelector<S, V>,
    M: PlacementMove<S, V>,
{
    fn entity_queue(&self, score_director: &dyn ScoreDirector<S>) -> Vec<EntityReference> {
        let solution = score_director.working_solution();
        self.entity_selector
            .iter(score_director)
            .filter(|entity| (self.getter)(solution, entity.entity_index).is_none())
            .collect()
    }

    fn placement(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity: EntityReference,
    ) -> Option<Placement<S, M>> {
        if (self.getter)(score_director.working_solution(), entity.entity_index).is_some() {
            return None;
        }
        let assign = |value| {
            M::assign(
                self.descriptor_index,
                entity.entity_index,
                value,
                self.getter,
                self.setter,
                self.variable_name,
            )
        };
        let moves: Vec<M> = self
            .value_selector
            .iter(score_director, entity)
            .map(|value| assign(Some(value)))
            .collect();
        let placement = Placement::new(entity, moves);
        if self.allows_unassigned {
            return Some(placement.with_unassigned_candidate(assign(None)));
        }
        Some(placement)
    }

    fn is_never_ending(&self) -> bool {
        self.entity_selector.is_never_ending() || self.value_selector.is_never_ending()
    }
}
