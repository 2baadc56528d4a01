//! CompositeMove - applies several moves in sequence.

use std::fmt::Debug;
use std::marker::PhantomData;

use smallvec::SmallVec;

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{stable_hash, Move};
use crate::heuristic::selector::EntityReference;

/// A move made of child moves done in order.
///
/// Each child registers its own undo closure, so a recording director takes
/// the whole composite back in reverse order.
pub struct CompositeMove<S, M> {
    moves: Vec<M>,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, M> CompositeMove<S, M> {
    pub fn new(moves: Vec<M>) -> Self {
        Self {
            moves,
            _phantom: PhantomData,
        }
    }

    pub fn moves(&self) -> &[M] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl<S, M: Clone> Clone for CompositeMove<S, M> {
    fn clone(&self) -> Self {
        Self::new(self.moves.clone())
    }
}

impl<S, M: Debug> Debug for CompositeMove<S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeMove")
            .field("moves", &self.moves)
            .finish()
    }
}

impl<S, M> Move<S> for CompositeMove<S, M>
where
    S: PlanningSolution,
    M: Move<S>,
{
    /// Doable if any child is doable.
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        self.moves.iter().any(|m| m.is_doable(score_director))
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) {
        for m in &self.moves {
            m.do_move(score_director);
        }
    }

    /// Children undo in reverse order.
    ///
    /// Each child undo is computed against the solution before the
    /// composite, which is exact when the children change distinct
    /// variables.
    fn undo_move(&self, score_director: &dyn ScoreDirector<S>) -> Self {
        Self::new(
            self.moves
                .iter()
                .rev()
                .map(|m| m.undo_move(score_director))
                .collect(),
        )
    }

    fn planning_entities(&self) -> SmallVec<[EntityReference; 2]> {
        let mut entities: SmallVec<[EntityReference; 2]> = SmallVec::new();
        for entity in self.moves.iter().flat_map(|m| m.planning_entities()) {
            if !entities.contains(&entity) {
                entities.push(entity);
            }
        }
        entities
    }

    fn planning_values(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        self.moves
            .iter()
            .flat_map(|m| m.planning_values(score_director))
            .collect()
    }

    fn tabu_hash(&self) -> u64 {
        let hashes: Vec<u64> = self.moves.iter().map(|m| m.tabu_hash()).collect();
        stable_hash(&("composite", hashes))
    }

    fn descriptor_index(&self) -> usize {
        self.moves.first().map_or(0, |m| m.descriptor_index())
    }

    fn variable_name(&self) -> &'static str {
        self.moves.first().map_or("", |m| m.variable_name())
    }
}
