//! Move selectors for basic planning variables.
//!
//! Move selectors combine entity and value selectors into moves. Finite
//! selectors enumerate every move with `iter_moves`; random selectors draw
//! one move at a time with `sample_move` and never run out.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use rand::RngCore;

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use crate::heuristic::r#move::{ChangeMove, Move, SwapMove};

use super::entity::{EntityReference, EntitySelector};
use super::value::ValueSelector;
use super::{forward_lifecycle, SelectorLifecycle};

/// A selector that yields moves of type `M`.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `M` - The move type
pub trait MoveSelector<S: PlanningSolution, M: Move<S>>: SelectorLifecycle<S> + Send + Debug {
    /// Returns every move of the neighborhood.
    ///
    /// For a never-ending selector this is one pass over the underlying
    /// elements; draw from it with [`sample_move`](MoveSelector::sample_move).
    fn iter_moves<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = M> + 'a>;

    /// Draws one random move, or `None` if the neighborhood is empty.
    fn sample_move(&self, score_director: &dyn ScoreDirector<S>, rng: &mut dyn RngCore)
        -> Option<M>;

    /// Returns the number of moves in the neighborhood.
    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize;

    /// Returns true if this selector may return the same move multiple times.
    fn is_never_ending(&self) -> bool {
        false
    }
}

impl<S, M> SelectorLifecycle<S> for Box<dyn MoveSelector<S, M>>
where
    S: PlanningSolution,
    M: Move<S>,
{
    forward_lifecycle!(@boxed);
}

impl<S, M> MoveSelector<S, M> for Box<dyn MoveSelector<S, M>>
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn iter_moves<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = M> + 'a> {
        (**self).iter_moves(score_director)
    }

    fn sample_move(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<M> {
        (**self).sample_move(score_director, rng)
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        (**self).size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        (**self).is_never_ending()
    }
}

/// Generates change moves: every entity with every value, or a random
/// entity with a random value.
///
/// The produced move type `M` only needs `From<ChangeMove<S, V>>`, so the
/// selector can feed an [`EitherMove`](crate::heuristic::EitherMove) union.
pub struct ChangeMoveSelector<S, V, ES, VS, M = ChangeMove<S, V>> {
    entity_selector: ES,
    value_selector: VS,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
    descriptor_index: usize,
    variable_name: &'static str,
    allows_unassigned: bool,
    random: bool,
    _phantom: PhantomData<fn() -> M>,
}

impl<S, V, ES: Debug, VS: Debug, M> Debug for ChangeMoveSelector<S, V, ES, VS, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeMoveSelector")
            .field("entity_selector", &self.entity_selector)
            .field("value_selector", &self.value_selector)
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .field("random", &self.random)
            .finish()
    }
}

impl<S, V, ES, VS, M> ChangeMoveSelector<S, V, ES, VS, M> {
    /// Creates a change move selector.
    ///
    /// # Arguments
    /// * `entity_selector` - Selects entities to modify
    /// * `value_selector` - Selects values to assign
    /// * `getter` - Reads the variable from the solution
    /// * `setter` - Writes the variable on the solution
    /// * `descriptor_index` - Index of the entity descriptor
    /// * `variable_name` - Name of the variable
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
            random: false,
            _phantom: PhantomData,
        }
    }

    /// Also generates moves that unassign the variable.
    pub fn with_allows_unassigned(mut self, allows_unassigned: bool) -> Self {
        self.allows_unassigned = allows_unassigned;
        self
    }

    /// Draws a random entity, then a random value for it.
    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    fn change_move(&self, entity: EntityReference, value: Option<V>) -> ChangeMove<S, V> {
        ChangeMove::new(
            self.descriptor_index,
            entity.entity_index,
            value,
            self.getter,
            self.setter,
            self.variable_name,
        )
    }
}

impl<S, V, ES, VS, M> SelectorLifecycle<S> for ChangeMoveSelector<S, V, ES, VS, M>
where
    S: PlanningSolution,
    ES: EntitySelector<S>,
    VS: ValueSelector<S, V>,
{
    forward_lifecycle!(entity_selector, value_selector);
}

impl<S, V, ES, VS, M> MoveSelector<S, M> for ChangeMoveSelector<S, V, ES, VS, M>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
    ES: EntitySelector<S>,
    VS: ValueSelector<S, V>,
    M: Move<S> + From<ChangeMove<S, V>>,
{
    fn iter_moves<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = M> + 'a> {
        Box::new(
            self.entity_selector
                .iter(score_director)
                .flat_map(move |entity| {
                    let unassign = self.allows_unassigned.then_some(None);
                    self.value_selector
                        .iter(score_director, entity)
                        .map(Some)
                        .chain(unassign)
                        .map(move |value| M::from(self.change_move(entity, value)))
                }),
        )
    }

    fn sample_move(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<M> {
        let entity = self.entity_selector.sample(score_director, rng)?;
        let value = self.value_selector.sample(score_director, entity, rng)?;
        Some(M::from(self.change_move(entity, Some(value))))
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        let extra = usize::from(self.allows_unassigned);
        self.entity_selector
            .iter(score_director)
            .map(|entity| self.value_selector.size(score_director, entity) + extra)
            .sum()
    }

    fn is_never_ending(&self) -> bool {
        self.random
            || self.entity_selector.is_never_ending()
            || self.value_selector.is_never_ending()
    }
}

/// Generates swap moves between entities of one descriptor: every unique
/// pair, or a random pair.
pub struct SwapMoveSelector<S, V, ES, M = SwapMove<S, V>> {
    entity_selector: ES,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
    descriptor_index: usize,
    variable_name: &'static str,
    random: bool,
    _phantom: PhantomData<fn() -> M>,
}

impl<S, V, ES: Debug, M> Debug for SwapMoveSelector<S, V, ES, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapMoveSelector")
            .field("entity_selector", &self.entity_selector)
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .field("random", &self.random)
            .finish()
    }
}

impl<S, V, ES, M> SwapMoveSelector<S, V, ES, M> {
    pub fn new(
        entity_selector: ES,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        descriptor_index: usize,
        variable_name: &'static str,
    ) -> Self {
        Self {
            entity_selector,
            getter,
            setter,
            descriptor_index,
            variable_name,
            random: false,
            _phantom: PhantomData,
        }
    }

    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    fn swap_move(&self, left: usize, right: usize) -> SwapMove<S, V> {
        SwapMove::new(
            self.descriptor_index,
            left,
            right,
            self.getter,
            self.setter,
            self.variable_name,
        )
    }
}

impl<S, V, ES, M> SelectorLifecycle<S> for SwapMoveSelector<S, V, ES, M>
where
    S: PlanningSolution,
    ES: EntitySelector<S>,
{
    forward_lifecycle!(entity_selector);
}

impl<S, V, ES, M> MoveSelector<S, M> for SwapMoveSelector<S, V, ES, M>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
    ES: EntitySelector<S>,
    M: Move<S> + From<SwapMove<S, V>>,
{
    fn iter_moves<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = M> + 'a> {
        let entities: Vec<usize> = self
            .entity_selector
            .iter(score_director)
            .map(|e| e.entity_index)
            .collect();
        let count = entities.len();
        Box::new((0..count).flat_map(move |i| {
            let left = entities[i];
            let rights: Vec<usize> = entities[i + 1..].to_vec();
            rights
                .into_iter()
                .map(move |right| M::from(self.swap_move(left, right)))
        }))
    }

    fn sample_move(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<M> {
        let left = self.entity_selector.sample(score_director, rng)?;
        // Redraw a few times when both sides land on the same entity.
        for _ in 0..10 {
            let right = self.entity_selector.sample(score_director, rng)?;
            if right != left {
                return Some(M::from(self.swap_move(left.entity_index, right.entity_index)));
            }
        }
        None
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        let n = self.entity_selector.size(score_director);
        n * n.saturating_sub(1) / 2
    }

    fn is_never_ending(&self) -> bool {
        self.random || self.entity_selector.is_never_ending()
    }
}
