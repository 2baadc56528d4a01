//! ChainedChangeMove - moves an entity to another place in a chain.
//!
//! A chained variable points at the previous element of a chain: either an
//! anchor or another entity. Moving entity `e` behind `to` takes three
//! variable changes:
//!
//! ```text
//! before: ..p -> e -> t..      ..to -> n..
//! after:  ..p -> t..           ..to -> e -> n..
//! ```
//!
//! The trailing entity `t` is relinked to `p`, the entity `n` that followed
//! `to` is relinked to `e`, and `e` points at `to`.

use std::fmt::Debug;
use std::hash::Hash;

use smallvec::{smallvec, SmallVec};

use planforge_core::domain::{AnchorTailSupply, ChainLink, DemandKey};
use planforge_core::PlanningSolution;
use planforge_scoring::{ScoreDirector, ScoreDirectorExt};

use super::{stable_hash, Move};
use crate::heuristic::selector::EntityReference;

/// A move that places an entity behind an anchor or another entity.
///
/// Successors are found through the [`AnchorTailSupply`] of the variable
/// when one is demanded on the score director, and by scanning the entities
/// otherwise.
pub struct ChainedChangeMove<S, A> {
    descriptor_index: usize,
    entity_index: usize,
    to: Option<ChainLink<A>>,
    getter: fn(&S, usize) -> Option<ChainLink<A>>,
    setter: fn(&mut S, usize, Option<ChainLink<A>>),
    variable_name: &'static str,
}

impl<S, A> ChainedChangeMove<S, A> {
    /// Creates a chained change move.
    ///
    /// `to` of `None` takes the entity out of its chain.
    pub fn new(
        descriptor_index: usize,
        entity_index: usize,
        to: Option<ChainLink<A>>,
        getter: fn(&S, usize) -> Option<ChainLink<A>>,
        setter: fn(&mut S, usize, Option<ChainLink<A>>),
        variable_name: &'static str,
    ) -> Self {
        Self {
            descriptor_index,
            entity_index,
            to,
            getter,
            setter,
            variable_name,
        }
    }

    pub fn entity_index(&self) -> usize {
        self.entity_index
    }

    pub fn to(&self) -> Option<&ChainLink<A>> {
        self.to.as_ref()
    }
}

impl<S, A> ChainedChangeMove<S, A>
where
    S: PlanningSolution,
    A: Clone + Eq + Hash + Send + Sync + Debug + 'static,
{
    /// Returns the entity whose variable points at `link`.
    fn successor(&self, score_director: &dyn ScoreDirector<S>, link: &ChainLink<A>) -> Option<usize> {
        let key = DemandKey::new::<AnchorTailSupply<S, A>>(self.descriptor_index, self.variable_name);
        if let Some(supply) = score_director.supply::<AnchorTailSupply<S, A>>(&key) {
            return supply.successor_of(link);
        }
        let solution = score_director.working_solution();
        (0..score_director.entity_count(self.descriptor_index))
            .find(|&i| (self.getter)(solution, i).as_ref() == Some(link))
    }

    fn relink(
        &self,
        score_director: &mut dyn ScoreDirector<S>,
        entity_index: usize,
        value: Option<ChainLink<A>>,
    ) {
        let old_value = (self.getter)(score_director.working_solution(), entity_index);
        score_director.before_variable_changed(self.descriptor_index, entity_index, self.variable_name);
        (self.setter)(score_director.working_solution_mut(), entity_index, value);
        score_director.after_variable_changed(self.descriptor_index, entity_index, self.variable_name);

        let setter = self.setter;
        score_director.register_undo(Box::new(move |s: &mut S| {
            setter(s, entity_index, old_value);
        }));
    }
}

impl<S, A: Clone> Clone for ChainedChangeMove<S, A> {
    fn clone(&self) -> Self {
        Self {
            descriptor_index: self.descriptor_index,
            entity_index: self.entity_index,
            to: self.to.clone(),
            getter: self.getter,
            setter: self.setter,
            variable_name: self.variable_name,
        }
    }
}

impl<S, A: Debug> Debug for ChainedChangeMove<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainedChangeMove")
            .field("descriptor_index", &self.descriptor_index)
            .field("entity_index", &self.entity_index)
            .field("variable_name", &self.variable_name)
            .field("to", &self.to)
            .finish()
    }
}

impl<S, A> Move<S> for ChainedChangeMove<S, A>
where
    S: PlanningSolution,
    A: Clone + Eq + Hash + Send + Sync + Debug + 'static,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        if self.to == Some(ChainLink::Entity(self.entity_index)) {
            return false;
        }
        let current = (self.getter)(score_director.working_solution(), self.entity_index);
        current != self.to
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) {
        let entity = self.entity_index;
        let old_previous = (self.getter)(score_director.working_solution(), entity);
        let old_trailing = old_previous
            .as_ref()
            .and_then(|_| self.successor(score_director, &ChainLink::Entity(entity)));
        let new_trailing = self
            .to
            .as_ref()
            .and_then(|to| self.successor(score_director, to));

        if let Some(trailing) = old_trailing {
            self.relink(score_director, trailing, old_previous.clone());
        }
        if let Some(trailing) = new_trailing.filter(|&t| t != entity) {
            self.relink(score_director, trailing, Some(ChainLink::Entity(entity)));
        }
        self.relink(score_director, entity, self.to.clone());
    }

    fn undo_move(&self, score_director: &dyn ScoreDirector<S>) -> Self {
        let old_previous = (self.getter)(score_director.working_solution(), self.entity_index);
        Self {
            to: old_previous,
            ..self.clone()
        }
    }

    fn planning_entities(&self) -> SmallVec<[EntityReference; 2]> {
        smallvec![EntityReference::new(self.descriptor_index, self.entity_index)]
    }

    fn planning_values(&self, _score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        smallvec![stable_hash(&self.to)]
    }

    fn tabu_hash(&self) -> u64 {
        stable_hash(&(
            "chained_change",
            self.descriptor_index,
            self.entity_index,
            self.variable_name,
            &self.to,
        ))
    }

    fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    fn variable_name(&self) -> &'static str {
        self.variable_name
    }
}
