//! EitherMove - a change or a swap.
//!
//! Local search usually mixes change and swap moves. Union selectors need
//! one move type, so both selectors can produce this enum through `From`.

use std::fmt::Debug;
use std::hash::Hash;

use smallvec::SmallVec;

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{ChangeMove, Move, SwapMove};
use crate::heuristic::selector::EntityReference;

/// A [`ChangeMove`] or a [`SwapMove`] on the same variable type.
pub enum EitherMove<S, V> {
    Change(ChangeMove<S, V>),
    Swap(SwapMove<S, V>),
}

impl<S, V: Clone> Clone for EitherMove<S, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Change(m) => Self::Change(m.clone()),
            Self::Swap(m) => Self::Swap(*m),
        }
    }
}

impl<S, V: Debug> Debug for EitherMove<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Change(m) => m.fmt(f),
            Self::Swap(m) => m.fmt(f),
        }
    }
}

impl<S, V> From<ChangeMove<S, V>> for EitherMove<S, V> {
    fn from(m: ChangeMove<S, V>) -> Self {
        Self::Change(m)
    }
}

impl<S, V> From<SwapMove<S, V>> for EitherMove<S, V> {
    fn from(m: SwapMove<S, V>) -> Self {
        Self::Swap(m)
    }
}

impl<S, V> Move<S> for EitherMove<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        match self {
            Self::Change(m) => m.is_doable(score_director),
            Self::Swap(m) => m.is_doable(score_director),
        }
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) {
        match self {
            Self::Change(m) => m.do_move(score_director),
            Self::Swap(m) => m.do_move(score_director),
        }
    }

    fn undo_move(&self, score_director: &dyn ScoreDirector<S>) -> Self {
        match self {
            Self::Change(m) => Self::Change(m.undo_move(score_director)),
            Self::Swap(m) => Self::Swap(m.undo_move(score_director)),
        }
    }

    fn planning_entities(&self) -> SmallVec<[EntityReference; 2]> {
        match self {
            Self::Change(m) => m.planning_entities(),
            Self::Swap(m) => m.planning_entities(),
        }
    }

    fn planning_values(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        match self {
            Self::Change(m) => m.planning_values(score_director),
            Self::Swap(m) => m.planning_values(score_director),
        }
    }

    fn tabu_hash(&self) -> u64 {
        match self {
            Self::Change(m) => m.tabu_hash(),
            Self::Swap(m) => m.tabu_hash(),
        }
    }

    fn descriptor_index(&self) -> usize {
        match self {
            Self::Change(m) => m.descriptor_index(),
            Self::Swap(m) => m.descriptor_index(),
        }
    }

    fn variable_name(&self) -> &'static str {
        match self {
            Self::Change(m) => m.variable_name(),
            Self::Swap(m) => m.variable_name(),
        }
    }
}
