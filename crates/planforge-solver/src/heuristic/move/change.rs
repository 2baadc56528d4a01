//! ChangeMove - assigns a value to a planning variable.
//!
//! The move stores typed function pointers that read and write the variable
//! directly on the solution, so no value is ever boxed.

use std::fmt::Debug;
use std::hash::Hash;

use smallvec::{smallvec, SmallVec};

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{stable_hash, Move};
use crate::heuristic::selector::EntityReference;

/// A move that assigns a value to an entity's variable.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `V` - The variable value type
pub struct ChangeMove<S, V> {
    descriptor_index: usize,
    entity_index: usize,
    to_value: Option<V>,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
    variable_name: &'static str,
}

impl<S, V> ChangeMove<S, V> {
    /// Creates a change move.
    ///
    /// `to_value` of `None` unassigns the variable.
    pub fn new(
        descriptor_index: usize,
        entity_index: usize,
        to_value: Option<V>,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        variable_name: &'static str,
    ) -> Self {
        Self {
            descriptor_index,
            entity_index,
            to_value,
            getter,
            setter,
            variable_name,
        }
    }

    pub fn entity_index(&self) -> usize {
        self.entity_index
    }

    pub fn to_value(&self) -> Option<&V> {
        self.to_value.as_ref()
    }
}

impl<S, V: Clone> Clone for ChangeMove<S, V> {
    fn clone(&self) -> Self {
        Self {
            descriptor_index: self.descriptor_index,
            entity_index: self.entity_index,
            to_value: self.to_value.clone(),
            getter: self.getter,
            setter: self.setter,
            variable_name: self.variable_name,
        }
    }
}

impl<S, V: Debug> Debug for ChangeMove<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeMove")
            .field("descriptor_index", &self.descriptor_index)
            .field("entity_index", &self.entity_index)
            .field("variable_name", &self.variable_name)
            .field("to_value", &self.to_value)
            .finish()
    }
}

impl<S, V> Move<S> for ChangeMove<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        let current = (self.getter)(score_director.working_solution(), self.entity_index);
        current != self.to_value
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) {
        let old_value = (self.getter)(score_director.working_solution(), self.entity_index);

        score_director.before_variable_changed(
            self.descriptor_index,
            self.entity_index,
            self.variable_name,
        );
        (self.setter)(
            score_director.working_solution_mut(),
            self.entity_index,
            self.to_value.clone(),
        );
        score_director.after_variable_changed(
            self.descriptor_index,
            self.entity_index,
            self.variable_name,
        );

        let setter = self.setter;
        let entity_index = self.entity_index;
        score_director.register_undo(Box::new(move |s: &mut S| {
            setter(s, entity_index, old_value);
        }));
    }

    fn undo_move(&self, score_director: &dyn ScoreDirector<S>) -> Self {
        let old_value = (self.getter)(score_director.working_solution(), self.entity_index);
        Self {
            to_value: old_value,
            ..self.clone()
        }
    }

    fn planning_entities(&self) -> SmallVec<[EntityReference; 2]> {
        smallvec![EntityReference::new(self.descriptor_index, self.entity_index)]
    }

    fn planning_values(&self, _score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        smallvec![stable_hash(&self.to_value)]
    }

    fn tabu_hash(&self) -> u64 {
        stable_hash(&(
            "change",
            self.descriptor_index,
            self.entity_index,
            self.variable_name,
            &self.to_value,
        ))
    }

    fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    fn variable_name(&self) -> &'static str {
        self.variable_name
    }
}
