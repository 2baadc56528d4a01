//! Filtering move selector decorator.
//!
//! Filters moves from an inner selector based on a predicate that sees the
//! working solution.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use rand::RngCore;

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use crate::heuristic::r#move::Move;
use crate::heuristic::selector::{forward_lifecycle, MoveSelector, SelectorLifecycle};

/// Predicate deciding whether a move is selected.
pub type MoveFilter<S, M> = Arc<dyn Fn(&S, &M) -> bool + Send + Sync>;

/// Sampling gives up after this many rejected moves in a row.
const MAX_SAMPLE_ATTEMPTS: usize = 100;

/// Filters moves from an inner selector using a predicate.
///
/// Only moves for which the predicate returns `true` are yielded. Random
/// sampling redraws rejected moves, up to a bounded number of attempts.
pub struct FilteringMoveSelector<S, M, Inner> {
    inner: Inner,
    predicate: MoveFilter<S, M>,
    _phantom: PhantomData<fn() -> M>,
}

impl<S, M, Inner> FilteringMoveSelector<S, M, Inner> {
    /// Creates a new filtering selector with the given predicate.
    pub fn new<F>(inner: Inner, predicate: F) -> Self
    where
        F: Fn(&S, &M) -> bool + Send + Sync + 'static,
    {
        Self {
            inner,
            predicate: Arc::new(predicate),
            _phantom: PhantomData,
        }
    }
}

impl<S, M, Inner: Debug> Debug for FilteringMoveSelector<S, M, Inner> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilteringMoveSelector")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<S, M, Inner> SelectorLifecycle<S> for FilteringMoveSelector<S, M, Inner>
where
    S: PlanningSolution,
    Inner: SelectorLifecycle<S>,
{
    forward_lifecycle!(inner);
}

impl<S, M, Inner> MoveSelector<S, M> for FilteringMoveSelector<S, M, Inner>
where
    S: PlanningSolution,
    M: Move<S>,
    Inner: MoveSelector<S, M>,
{
    fn iter_moves<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = M> + 'a> {
        let solution = score_director.working_solution();
        Box::new(
            self.inner
                .iter_moves(score_director)
                .filter(move |m| (self.predicate)(solution, m)),
        )
    }

    fn sample_move(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<M> {
        let solution = score_director.working_solution();
        (0..MAX_SAMPLE_ATTEMPTS)
            .filter_map(|_| self.inner.sample_move(score_director, rng))
            .find(|m| (self.predicate)(solution, m))
    }

    /// Upper bound: the inner selector's size.
    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        self.inner.size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        self.inner.is_never_ending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::r#move::ChangeMove;
    use crate::heuristic::selector::{
        ChangeMoveSelector, FromSolutionEntitySelector, FromSolutionValueSelector,
    };
    use planforge_test::nqueens::{get_queen_row, nqueens_director, row_range, set_queen_row};
    use planforge_test::NQueensSolution;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    type QueenMove = ChangeMove<NQueensSolution, i64>;

    fn selector() -> ChangeMoveSelector<
        NQueensSolution,
        i64,
        FromSolutionEntitySelector,
        FromSolutionValueSelector<NQueensSolution, i64>,
    > {
        ChangeMoveSelector::new(
            FromSolutionEntitySelector::new(0),
            FromSolutionValueSelector::countable(row_range),
            get_queen_row,
            set_queen_row,
            0,
            "row",
        )
    }

    #[test]
    fn test_filters_moves_by_predicate() {
        let director = nqueens_director(&[0, 1, 2, 3]);
        let filtered = FilteringMoveSelector::new(selector(), |_: &NQueensSolution, m: &QueenMove| {
            m.to_value().is_some_and(|row| *row == 0)
        });

        let moves: Vec<QueenMove> = filtered.iter_moves(&director).collect();
        assert_eq!(moves.len(), 4);
        assert!(moves.iter().all(|m| m.to_value() == Some(&0)));
    }

    #[test]
    fn test_predicate_sees_solution() {
        let director = nqueens_director(&[0, 1, 2, 3]);
        // Keep only moves that change the row.
        let filtered = FilteringMoveSelector::new(selector(), |s: &NQueensSolution, m: &QueenMove| {
            get_queen_row(s, m.entity_index()).as_ref() != m.to_value()
        });
        assert_eq!(filtered.iter_moves(&director).count(), 12);
    }

    #[test]
    fn test_sample_gives_up_when_nothing_passes() {
        let director = nqueens_director(&[0, 1, 2, 3]);
        let filtered =
            FilteringMoveSelector::new(selector().with_random(true), |_: &NQueensSolution, _: &QueenMove| false);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(filtered.sample_move(&director, &mut rng).is_none());
    }
}
