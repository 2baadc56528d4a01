//! SwapMove - exchanges the values of two entities.

use std::fmt::Debug;
use std::hash::Hash;

use smallvec::{smallvec, SmallVec};

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{stable_hash, Move};
use crate::heuristic::selector::EntityReference;

/// A move that swaps a variable's values between two entities of the same
/// type.
///
/// A swap is its own undo move.
///
/// # Example
/// ```
/// use planforge_solver::heuristic::r#move::SwapMove;
/// use planforge_core::PlanningSolution;
/// use planforge_core::score::SimpleScore;
///
/// #[derive(Clone)]
/// struct Sol { values: Vec<Option<i32>>, score: Option<SimpleScore> }
///
/// impl PlanningSolution for Sol {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<Self::Score> { self.score }
///     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
/// }
///
/// fn get_v(s: &Sol, idx: usize) -> Option<i32> { s.values.get(idx).copied().flatten() }
/// fn set_v(s: &mut Sol, idx: usize, v: Option<i32>) { if let Some(x) = s.values.get_mut(idx) { *x = v; } }
///
/// let swap = SwapMove::<Sol, i32>::new(0, 0, 1, get_v, set_v, "value");
/// assert_eq!(swap.left_entity_index(), 0);
/// ```
pub struct SwapMove<S, V> {
    descriptor_index: usize,
    left_entity_index: usize,
    right_entity_index: usize,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
    variable_name: &'static str,
}

impl<S, V> SwapMove<S, V> {
    pub fn new(
        descriptor_index: usize,
        left_entity_index: usize,
        right_entity_index: usize,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        variable_name: &'static str,
    ) -> Self {
        Self {
            descriptor_index,
            left_entity_index,
            right_entity_index,
            getter,
            setter,
            variable_name,
        }
    }

    pub fn left_entity_index(&self) -> usize {
        self.left_entity_index
    }

    pub fn right_entity_index(&self) -> usize {
        self.right_entity_index
    }
}

impl<S, V> Clone for SwapMove<S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V> Copy for SwapMove<S, V> {}

impl<S, V> Debug for SwapMove<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapMove")
            .field("descriptor_index", &self.descriptor_index)
            .field("left_entity_index", &self.left_entity_index)
            .field("right_entity_index", &self.right_entity_index)
            .field("variable_name", &self.variable_name)
            .finish()
    }
}

impl<S, V> Move<S> for SwapMove<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        if self.left_entity_index == self.right_entity_index {
            return false;
        }
        let solution = score_director.working_solution();
        (self.getter)(solution, self.left_entity_index)
            != (self.getter)(solution, self.right_entity_index)
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) {
        let left = self.left_entity_index;
        let right = self.right_entity_index;
        let left_value = (self.getter)(score_director.working_solution(), left);
        let right_value = (self.getter)(score_director.working_solution(), right);

        score_director.before_variable_changed(self.descriptor_index, left, self.variable_name);
        score_director.before_variable_changed(self.descriptor_index, right, self.variable_name);

        let solution = score_director.working_solution_mut();
        (self.setter)(solution, left, right_value.clone());
        (self.setter)(solution, right, left_value.clone());

        score_director.after_variable_changed(self.descriptor_index, left, self.variable_name);
        score_director.after_variable_changed(self.descriptor_index, right, self.variable_name);

        let setter = self.setter;
        score_director.register_undo(Box::new(move |s: &mut S| {
            setter(s, left, left_value);
            setter(s, right, right_value);
        }));
    }

    fn undo_move(&self, _score_director: &dyn ScoreDirector<S>) -> Self {
        *self
    }

    fn planning_entities(&self) -> SmallVec<[EntityReference; 2]> {
        smallvec![
            EntityReference::new(self.descriptor_index, self.left_entity_index),
            EntityReference::new(self.descriptor_index, self.right_entity_index),
        ]
    }

    fn planning_values(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        let solution = score_director.working_solution();
        smallvec![
            stable_hash(&(self.getter)(solution, self.left_entity_index)),
            stable_hash(&(self.getter)(solution, self.right_entity_index)),
        ]
    }

    fn tabu_hash(&self) -> u64 {
        let low = self.left_entity_index.min(self.right_entity_index);
        let high = self.left_entity_index.max(self.right_entity_index);
        stable_hash(&("swap", self.descriptor_index, low, high, self.variable_name))
    }

    fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    fn variable_name(&self) -> &'static str {
        self.variable_name
    }
}
