//! Union move selector combinator.

use std::fmt::Debug;

use rand::{Rng, RngCore};

use planforge_core::{PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

use crate::heuristic::r#move::Move;
use crate::heuristic::selector::{MoveSelector, SelectorLifecycle};

/// Combines the moves of several child selectors.
///
/// In original order the children are walked one after the other. In
/// random order each sample picks a child uniformly; a child that comes up
/// empty hands over to the next one.
pub struct UnionMoveSelector<S, M> {
    children: Vec<Box<dyn MoveSelector<S, M>>>,
    random: bool,
}

impl<S, M> UnionMoveSelector<S, M> {
    pub fn new(children: Vec<Box<dyn MoveSelector<S, M>>>) -> Self {
        Self {
            children,
            random: false,
        }
    }

    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<S, M> Debug for UnionMoveSelector<S, M>
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionMoveSelector")
            .field("children", &self.children)
            .field("random", &self.random)
            .finish()
    }
}

impl<S, M> SelectorLifecycle<S> for UnionMoveSelector<S, M>
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn solving_started(
        &mut self,
        score_director: &mut dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        for child in &mut self.children {
            child.solving_started(score_director, rng)?;
        }
        Ok(())
    }

    fn phase_started(
        &mut self,
        score_director: &mut dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        for child in &mut self.children {
            child.phase_started(score_director, rng)?;
        }
        Ok(())
    }

    fn step_started(
        &mut self,
        score_director: &mut dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        for child in &mut self.children {
            child.step_started(score_director, rng)?;
        }
        Ok(())
    }

    fn step_ended(&mut self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        for child in &mut self.children {
            child.step_ended(score_director)?;
        }
        Ok(())
    }

    fn phase_ended(&mut self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        for child in &mut self.children {
            child.phase_ended(score_director)?;
        }
        Ok(())
    }

    fn solving_ended(&mut self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        for child in &mut self.children {
            child.solving_ended(score_director)?;
        }
        Ok(())
    }
}

impl<S, M> MoveSelector<S, M> for UnionMoveSelector<S, M>
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn iter_moves<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = M> + 'a> {
        Box::new(
            self.children
                .iter()
                .flat_map(move |child| child.iter_moves(score_director)),
        )
    }

    fn sample_move(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<M> {
        let count = self.children.len();
        if count == 0 {
            return None;
        }
        let first = rng.random_range(0..count);
        (0..count).find_map(|offset| {
            self.children[(first + offset) % count].sample_move(score_director, rng)
        })
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        self.children.iter().map(|c| c.size(score_director)).sum()
    }

    fn is_never_ending(&self) -> bool {
        self.random || self.children.iter().any(|c| c.is_never_ending())
    }
}
